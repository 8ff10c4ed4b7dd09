//! Proptest invariants over randomized order flow
//!
//! Every property drives a real book/pool (or a whole engine) with an
//! arbitrary order sequence and then checks the matching invariants:
//! conservation of quantity, non-crossing quotes, status coherence,
//! maker pricing, price priority, and run-to-run determinism.

use crate::test_utils::{new_log, tick, ScriptedStrategy};
use common::{Order, OrderStatus, OrderType, Px, Qty, Side, Trade, Ts};
use engine::{OrderBook, OrderPool, OrderRef, TickEngine};
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct OpSpec {
    side: Side,
    is_market: bool,
    price: i64,
    qty: i64,
}

impl OpSpec {
    fn to_template(&self, ts: u64) -> Order {
        if self.is_market {
            Order::new(
                Px::ZERO,
                Qty::from_i64(self.qty),
                Ts::from_nanos(ts),
                self.side,
                OrderType::Market,
                0,
            )
        } else {
            Order::new(
                Px::from_i64(self.price),
                Qty::from_i64(self.qty),
                Ts::from_nanos(ts),
                self.side,
                OrderType::Limit,
                0,
            )
        }
    }
}

fn arb_op() -> impl Strategy<Value = OpSpec> {
    (any::<bool>(), prop::bool::weighted(0.2), 990i64..=1010, 1i64..=500).prop_map(
        |(buy, is_market, price_step, qty)| OpSpec {
            side: if buy { Side::Buy } else { Side::Sell },
            is_market,
            price: price_step * 1000,
            qty,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn matching_preserves_book_invariants(ops in prop::collection::vec(arb_op(), 1..120)) {
        let mut pool = OrderPool::new();
        let mut book = OrderBook::new("PROP");
        let mut refs: Vec<OrderRef> = Vec::new();
        let mut by_id: HashMap<u64, OrderRef> = HashMap::new();
        let mut trades: Vec<Trade> = Vec::new();
        let mut next_id = 1u64;

        for op in &ops {
            let order_ref = pool.allocate();
            let slot = pool.get_mut(order_ref);
            *slot = op.to_template(next_id * 1000);
            slot.id = next_id;
            by_id.insert(next_id, order_ref);
            next_id += 1;

            let before = trades.len();
            book.add_order(order_ref, &mut pool, |t| trades.push(*t));
            refs.push(order_ref);

            // Price priority: one taker's fills walk prices strictly
            // from best to worse.
            let swept: Vec<i64> = trades[before..].iter().map(|t| t.price.as_i64()).collect();
            match op.side {
                Side::Buy => prop_assert!(swept.windows(2).all(|w| w[0] <= w[1])),
                Side::Sell => prop_assert!(swept.windows(2).all(|w| w[0] >= w[1])),
            }
            // FIFO: fills at one price level serve makers in admission
            // order.
            for pair in trades[before..].windows(2) {
                if pair[0].price == pair[1].price {
                    let maker = |t: &Trade| t.buy_order_id.min(t.sell_order_id);
                    prop_assert!(maker(&pair[0]) <= maker(&pair[1]));
                }
            }

            // Non-crossing book after every admission.
            let bid = book.best_bid();
            let ask = book.best_ask();
            prop_assert!(bid.is_zero() || ask.is_zero() || bid < ask);
        }

        // Status coherence and volume conservation over every order
        // ever admitted.
        let mut resting_bid = 0i64;
        let mut resting_ask = 0i64;
        let mut total_filled = 0i64;
        for &order_ref in &refs {
            let order = pool.get(order_ref);
            prop_assert!(order.filled.as_i64() >= 0);
            prop_assert!(order.filled <= order.quantity);
            prop_assert_eq!(order.initial_quantity, order.quantity);
            match order.status {
                OrderStatus::Filled => prop_assert!(order.remaining().is_zero()),
                OrderStatus::Partial => {
                    prop_assert!(!order.filled.is_zero());
                    prop_assert!(!order.remaining().is_zero());
                }
                OrderStatus::Pending => prop_assert!(order.filled.is_zero()),
                // Only market orders are ever cancelled.
                OrderStatus::Cancelled => {
                    prop_assert_eq!(order.order_type, OrderType::Market);
                }
            }
            let resting = order.order_type == OrderType::Limit
                && matches!(order.status, OrderStatus::Pending | OrderStatus::Partial);
            if resting {
                match order.side {
                    Side::Buy => resting_bid += order.remaining().as_i64(),
                    Side::Sell => resting_ask += order.remaining().as_i64(),
                }
            }
            total_filled += order.filled.as_i64();
        }
        prop_assert_eq!(book.bid_volume().as_i64(), resting_bid);
        prop_assert_eq!(book.ask_volume().as_i64(), resting_ask);

        // Trade conservation: each filled unit appears on exactly one
        // trade's buy side and one trade's sell side.
        let traded: i64 = trades.iter().map(|t| t.quantity.as_i64()).sum();
        prop_assert_eq!(total_filled, 2 * traded);
        prop_assert_eq!(book.total_trades(), trades.len() as u64);

        // Maker-price rule: the earlier-admitted (lower-id) order of a
        // pair was the resting one, and the trade printed its price.
        for trade in &trades {
            prop_assert!(trade.quantity.as_i64() > 0);
            let maker_id = trade.buy_order_id.min(trade.sell_order_id);
            let taker_id = trade.buy_order_id.max(trade.sell_order_id);
            let maker = pool.get(by_id[&maker_id]);
            let taker = pool.get(by_id[&taker_id]);
            prop_assert_eq!(trade.price, maker.price);
            if taker.order_type == OrderType::Limit {
                match taker.side {
                    Side::Buy => prop_assert!(trade.price <= taker.price),
                    Side::Sell => prop_assert!(trade.price >= taker.price),
                }
            }
            prop_assert_eq!(trade.timestamp, maker.timestamp.max(taker.timestamp));
        }

        // Depth agrees with the cached volumes and is sorted best-first
        // with no empty levels.
        let (bids, asks) = book.depth(usize::MAX);
        prop_assert_eq!(bids.iter().map(|(_, q, _)| q.as_i64()).sum::<i64>(), resting_bid);
        prop_assert_eq!(asks.iter().map(|(_, q, _)| q.as_i64()).sum::<i64>(), resting_ask);
        prop_assert!(bids.windows(2).all(|w| w[0].0 > w[1].0));
        prop_assert!(asks.windows(2).all(|w| w[0].0 < w[1].0));
        for (_, qty, count) in bids.iter().chain(asks.iter()) {
            prop_assert!(qty.as_i64() > 0);
            prop_assert!(*count > 0);
        }

        // Every level's cached total equals the sum of its resting
        // orders' remaining quantities, and no phantom levels exist.
        let mut per_level: HashMap<(Side, i64), (i64, usize)> = HashMap::new();
        for &order_ref in &refs {
            let order = pool.get(order_ref);
            let resting = order.order_type == OrderType::Limit
                && matches!(order.status, OrderStatus::Pending | OrderStatus::Partial);
            if resting {
                let slot = per_level.entry((order.side, order.price.as_i64())).or_insert((0, 0));
                slot.0 += order.remaining().as_i64();
                slot.1 += 1;
            }
        }
        prop_assert_eq!(per_level.len(), bids.len() + asks.len());
        for (side, levels) in [(Side::Buy, &bids), (Side::Sell, &asks)] {
            for (price, qty, count) in levels {
                let (expected_qty, expected_count) = per_level[&(side, price.as_i64())];
                prop_assert_eq!(qty.as_i64(), expected_qty);
                prop_assert_eq!(*count, expected_count);
            }
        }
    }

    #[test]
    fn engine_runs_are_deterministic(
        ops in prop::collection::vec(arb_op(), 1..60),
        ticks_count in 1usize..10,
    ) {
        // Chunk the op stream into per-tick scripts for one strategy.
        let per_tick = ops.len().div_ceil(ticks_count);
        let script: Vec<Vec<Order>> = ops
            .chunks(per_tick)
            .map(|chunk| chunk.iter().map(|op| op.to_template(0)).collect())
            .collect();

        let run = |script: Vec<Vec<Order>>| {
            let log = new_log();
            let mut engine = TickEngine::new();
            engine.add_strategy(Box::new(ScriptedStrategy::new("A", script, log.clone())));
            for i in 0..ticks_count {
                engine.process_tick(&tick("PROP", 1_000_000, (i as u64 + 1) * 1_000));
            }
            let events = log.borrow().clone();
            let stats = *engine.stats();
            (events, stats)
        };

        let (events_a, stats_a) = run(script.clone());
        let (events_b, stats_b) = run(script);
        prop_assert_eq!(events_a, events_b);
        prop_assert_eq!(stats_a.orders_submitted, stats_b.orders_submitted);
        prop_assert_eq!(stats_a.trades_executed, stats_b.trades_executed);
    }
}
