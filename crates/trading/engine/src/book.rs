//! Per-symbol limit order book with price-time priority matching

use crate::memory::{OrderPool, OrderRef};
use common::{OrderStatus, OrderType, Px, Qty, Side, Trade};
use std::collections::{BTreeMap, VecDeque};

/// One side's resting orders at a single price
///
/// `total_quantity` caches the sum of remaining quantity across the
/// FIFO queue so per-side volume stays O(levels).
#[derive(Debug)]
struct PriceLevel {
    price: Px,
    orders: VecDeque<OrderRef>,
    total_quantity: Qty,
}

impl PriceLevel {
    fn new(price: Px) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
            total_quantity: Qty::ZERO,
        }
    }
}

/// Two-sided limit order book for one symbol
///
/// Both sides are `BTreeMap`s whose first entry is the best level: asks
/// are keyed by price, bids by negated price. Orders live in the
/// engine's [`OrderPool`]; the book only holds handles, so every
/// operation that touches order state takes the pool as a parameter.
///
/// Trades are reported through a caller-supplied sink invoked
/// synchronously, once per trade, in emission order. The sink must not
/// fail; the book makes no attempt at rollback.
pub struct OrderBook {
    symbol: String,
    bids: BTreeMap<i64, PriceLevel>,
    asks: BTreeMap<i64, PriceLevel>,
    total_trades: u64,
}

impl OrderBook {
    /// Create an empty book
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            total_trades: 0,
        }
    }

    /// Symbol this book trades
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Admit an order: match against the opposing side, then rest any
    /// limit residual at its price level
    ///
    /// Market orders are delegated to [`Self::process_market_order`].
    /// The order's final status is set by the matcher: `Filled`,
    /// `Partial` (resting with remainder), or `Pending` (resting
    /// untouched).
    pub fn add_order<F: FnMut(&Trade)>(
        &mut self,
        order_ref: OrderRef,
        pool: &mut OrderPool,
        mut emit: F,
    ) {
        if pool.get(order_ref).order_type == OrderType::Market {
            self.process_market_order(order_ref, pool, emit);
            return;
        }

        let side = pool.get(order_ref).side;
        match side {
            Side::Buy => {
                Self::match_order(&mut self.asks, order_ref, pool, &mut self.total_trades, &mut emit);
            }
            Side::Sell => {
                Self::match_order(&mut self.bids, order_ref, pool, &mut self.total_trades, &mut emit);
            }
        }

        let order = pool.get(order_ref);
        if order.status != OrderStatus::Filled {
            let key = Self::level_key(side, order.price);
            let book_side = match side {
                Side::Buy => &mut self.bids,
                Side::Sell => &mut self.asks,
            };
            let level = book_side
                .entry(key)
                .or_insert_with(|| PriceLevel::new(order.price));
            level.orders.push_back(order_ref);
            level.total_quantity += order.remaining();
        }
    }

    /// Match an order with no price constraint; the unfilled remainder
    /// is cancelled rather than rested
    pub fn process_market_order<F: FnMut(&Trade)>(
        &mut self,
        order_ref: OrderRef,
        pool: &mut OrderPool,
        mut emit: F,
    ) {
        match pool.get(order_ref).side {
            Side::Buy => {
                Self::match_order(&mut self.asks, order_ref, pool, &mut self.total_trades, &mut emit);
            }
            Side::Sell => {
                Self::match_order(&mut self.bids, order_ref, pool, &mut self.total_trades, &mut emit);
            }
        }
        let order = pool.get_mut(order_ref);
        if order.status != OrderStatus::Filled {
            order.status = OrderStatus::Cancelled;
        }
    }

    /// Cancel a resting order by id
    ///
    /// No id-to-order index is maintained, so this performs no action.
    /// TODO: keep an id map alongside the levels once strategies need
    /// working cancellation.
    pub fn cancel_order(&mut self, _order_id: u64) {}

    /// Best bid price, or zero when the bid side is empty
    #[must_use]
    pub fn best_bid(&self) -> Px {
        self.bids
            .first_key_value()
            .map_or(Px::ZERO, |(_, level)| level.price)
    }

    /// Best ask price, or zero when the ask side is empty
    #[must_use]
    pub fn best_ask(&self) -> Px {
        self.asks
            .first_key_value()
            .map_or(Px::ZERO, |(_, level)| level.price)
    }

    /// Total resting quantity on the bid side
    #[must_use]
    pub fn bid_volume(&self) -> Qty {
        Self::side_volume(&self.bids)
    }

    /// Total resting quantity on the ask side
    #[must_use]
    pub fn ask_volume(&self) -> Qty {
        Self::side_volume(&self.asks)
    }

    /// Aggregated `(price, quantity, order count)` for the top `levels`
    /// levels of each side, best first
    #[must_use]
    pub fn depth(&self, levels: usize) -> (Vec<(Px, Qty, usize)>, Vec<(Px, Qty, usize)>) {
        let snapshot = |side: &BTreeMap<i64, PriceLevel>| {
            side.values()
                .take(levels)
                .map(|level| (level.price, level.total_quantity, level.orders.len()))
                .collect()
        };
        (snapshot(&self.bids), snapshot(&self.asks))
    }

    /// Number of trades this book has executed
    #[must_use]
    pub fn total_trades(&self) -> u64 {
        self.total_trades
    }

    fn side_volume(side: &BTreeMap<i64, PriceLevel>) -> Qty {
        Qty::from_i64(
            side.values()
                .map(|level| level.total_quantity.as_i64())
                .sum(),
        )
    }

    /// Map key under which a level sorts: asks ascend by price, bids
    /// are negated so the highest price sorts first
    fn level_key(side: Side, price: Px) -> i64 {
        match side {
            Side::Buy => -price.as_i64(),
            Side::Sell => price.as_i64(),
        }
    }

    /// Sweep the opposing side until the taker is filled, the side is
    /// exhausted, or the taker's limit price stops being compatible
    ///
    /// Both the level walk and the within-level FIFO enforce price-time
    /// priority; the trade price is always the resting level's price.
    fn match_order<F: FnMut(&Trade)>(
        opposing: &mut BTreeMap<i64, PriceLevel>,
        taker_ref: OrderRef,
        pool: &mut OrderPool,
        total_trades: &mut u64,
        emit: &mut F,
    ) {
        let (taker_side, taker_limit_key) = {
            let taker = pool.get(taker_ref);
            let key = match taker.order_type {
                OrderType::Market => i64::MAX,
                // An opposing level is compatible while its key is at
                // or inside the taker's own level key.
                OrderType::Limit => Self::level_key(taker.side.opposite(), taker.price),
            };
            (taker.side, key)
        };

        loop {
            if pool.get(taker_ref).remaining().is_zero() {
                break;
            }
            let Some(mut entry) = opposing.first_entry() else {
                break;
            };
            if *entry.key() > taker_limit_key {
                break;
            }

            let level = entry.get_mut();
            let level_price = level.price;
            loop {
                if pool.get(taker_ref).remaining().is_zero() {
                    break;
                }
                let Some(&maker_ref) = level.orders.front() else {
                    break;
                };

                let (taker_id, taker_ts, taker_remaining) = {
                    let taker = pool.get(taker_ref);
                    (taker.id, taker.timestamp, taker.remaining())
                };
                let (maker_id, maker_ts, maker_remaining) = {
                    let maker = pool.get(maker_ref);
                    (maker.id, maker.timestamp, maker.remaining())
                };

                let quantity = taker_remaining.min(maker_remaining);
                let (buy_order_id, sell_order_id) = match taker_side {
                    Side::Buy => (taker_id, maker_id),
                    Side::Sell => (maker_id, taker_id),
                };
                let trade = Trade {
                    buy_order_id,
                    sell_order_id,
                    price: level_price,
                    quantity,
                    timestamp: taker_ts.max(maker_ts),
                };
                emit(&trade);
                *total_trades += 1;

                pool.get_mut(taker_ref).filled += quantity;
                let maker_done = {
                    let maker = pool.get_mut(maker_ref);
                    maker.filled += quantity;
                    if maker.remaining().is_zero() {
                        maker.status = OrderStatus::Filled;
                        true
                    } else {
                        maker.status = OrderStatus::Partial;
                        false
                    }
                };
                level.total_quantity -= quantity;
                debug_assert!(level.total_quantity.as_i64() >= 0, "level total went negative");
                if maker_done {
                    level.orders.pop_front();
                }
            }

            let exhausted = level.orders.is_empty();
            if exhausted {
                entry.remove();
            }
        }

        let taker = pool.get_mut(taker_ref);
        taker.status = if taker.remaining().is_zero() {
            OrderStatus::Filled
        } else if taker.filled.is_zero() {
            OrderStatus::Pending
        } else {
            OrderStatus::Partial
        };
    }
}
