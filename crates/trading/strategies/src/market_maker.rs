//! Two-sided quoting strategy

use common::{Order, OrderType, Px, Qty, Side, Tick, Trade};
use engine::{EngineContext, Strategy};
use tracing::trace;

const USER_ID: u32 = 2;

/// How many ticks pass between quote refreshes
const QUOTE_INTERVAL: u64 = 10;

/// Quotes both sides of the tick price at a fixed half-spread
///
/// Skips a side when the position cap would be breached. Trade
/// accounting is naive spread capture (see the crate docs).
pub struct MarketMakerStrategy {
    spread: i64,
    quote_size: Qty,
    max_position: i64,
    position: i64,
    ticks_seen: u64,
    trades_seen: u64,
    total_pnl: i64,
}

impl MarketMakerStrategy {
    /// Create a market maker quoting `quote_size` at `spread / 2`
    /// ticks either side of the tick price, with a position cap
    #[must_use]
    pub fn new(spread: i64, quote_size: Qty, max_position: i64) -> Self {
        Self {
            spread,
            quote_size,
            max_position,
            position: 0,
            ticks_seen: 0,
            trades_seen: 0,
            total_pnl: 0,
        }
    }

    /// Current position in units
    #[must_use]
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Naive spread-capture P&L in price ticks
    #[must_use]
    pub fn pnl(&self) -> i64 {
        self.total_pnl
    }

    /// Number of trades observed
    #[must_use]
    pub fn trades_seen(&self) -> u64 {
        self.trades_seen
    }
}

impl Strategy for MarketMakerStrategy {
    fn on_tick(&mut self, tick: &Tick, engine: &mut EngineContext) {
        self.ticks_seen += 1;
        if self.ticks_seen % QUOTE_INTERVAL != 0 {
            return;
        }

        let mid = tick.price.as_i64();
        let can_buy = self.position < self.max_position;
        let can_sell = self.position > -self.max_position;

        if can_buy {
            trace!("quoting bid at {}", mid - self.spread / 2);
            engine.submit_order(Order::new(
                Px::from_i64(mid - self.spread / 2),
                self.quote_size,
                tick.timestamp,
                Side::Buy,
                OrderType::Limit,
                USER_ID,
            ));
        }
        if can_sell {
            trace!("quoting ask at {}", mid + self.spread / 2);
            engine.submit_order(Order::new(
                Px::from_i64(mid + self.spread / 2),
                self.quote_size,
                tick.timestamp,
                Side::Sell,
                OrderType::Limit,
                USER_ID,
            ));
        }
    }

    fn on_trade(&mut self, _trade: &Trade) {
        self.trades_seen += 1;
        // Assumes the trade is one of our quotes filling; each fill
        // captures half the quoted spread.
        self.total_pnl += self.spread / 2;
    }

    fn name(&self) -> &'static str {
        "market-maker"
    }
}
