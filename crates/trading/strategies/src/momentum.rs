//! Moving-average momentum strategy

use common::{Order, OrderType, Px, Qty, Side, Tick, Trade};
use engine::{EngineContext, Strategy};
use std::collections::VecDeque;
use tracing::trace;

const USER_ID: u32 = 1;

/// Buy when price crosses 2% above the moving average, sell when it
/// crosses 2% below
///
/// All signal math is integer fixed-point: `ma * 102 / 100` is exact
/// for realistic prices. Position is tracked optimistically at
/// submission time; trade accounting assumes involvement (see the
/// crate docs).
pub struct MomentumStrategy {
    window_size: usize,
    order_size: Qty,
    prices: VecDeque<Px>,
    position: i64,
    avg_entry_price: Px,
    total_pnl: i64,
    trades_seen: u64,
}

impl MomentumStrategy {
    /// Create a strategy with the given moving-average window and
    /// per-signal order size
    #[must_use]
    pub fn new(window_size: usize, order_size: Qty) -> Self {
        Self {
            window_size,
            order_size,
            prices: VecDeque::with_capacity(window_size + 1),
            position: 0,
            avg_entry_price: Px::ZERO,
            total_pnl: 0,
            trades_seen: 0,
        }
    }

    /// Current (optimistically tracked) position in units
    #[must_use]
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Naive realized P&L in price ticks
    #[must_use]
    pub fn pnl(&self) -> i64 {
        self.total_pnl
    }

    /// Number of trades observed
    #[must_use]
    pub fn trades_seen(&self) -> u64 {
        self.trades_seen
    }

    fn submit(&self, engine: &mut EngineContext, tick: &Tick, side: Side, quantity: Qty) {
        engine.submit_order(Order::new(
            tick.price,
            quantity,
            tick.timestamp,
            side,
            OrderType::Limit,
            USER_ID,
        ));
    }
}

impl Strategy for MomentumStrategy {
    fn on_tick(&mut self, tick: &Tick, engine: &mut EngineContext) {
        self.prices.push_back(tick.price);
        if self.prices.len() > self.window_size {
            self.prices.pop_front();
        }
        // Need a full window before trading.
        if self.prices.len() < self.window_size {
            return;
        }

        let sum: i64 = self.prices.iter().map(Px::as_i64).sum();
        let ma = sum / self.prices.len() as i64;
        let price = tick.price.as_i64();

        // 2% band around the moving average to avoid noise.
        let buy_threshold = ma * 102 / 100;
        let sell_threshold = ma * 98 / 100;

        if price > buy_threshold && self.position <= 0 {
            trace!("momentum buy signal at {} (ma {})", tick.price, ma);
            if self.position < 0 {
                self.submit(engine, tick, Side::Buy, Qty::from_i64(-self.position));
            }
            self.submit(engine, tick, Side::Buy, self.order_size);
            self.position = self.order_size.as_i64();
            self.avg_entry_price = tick.price;
        } else if price < sell_threshold && self.position >= 0 {
            trace!("momentum sell signal at {} (ma {})", tick.price, ma);
            if self.position > 0 {
                self.submit(engine, tick, Side::Sell, Qty::from_i64(self.position));
            }
            self.submit(engine, tick, Side::Sell, self.order_size);
            self.position = -self.order_size.as_i64();
            self.avg_entry_price = tick.price;
        }
    }

    fn on_trade(&mut self, trade: &Trade) {
        self.trades_seen += 1;
        // Assumes the trade is ours; sample-strategy simplification.
        if self.position > 0 {
            self.total_pnl +=
                (trade.price.as_i64() - self.avg_entry_price.as_i64()) * trade.quantity.as_i64();
        } else if self.position < 0 {
            self.total_pnl +=
                (self.avg_entry_price.as_i64() - trade.price.as_i64()) * trade.quantity.as_i64();
        }
    }

    fn name(&self) -> &'static str {
        "momentum"
    }
}
