//! Tick engine: the event-dispatch loop driving a backtest
//!
//! One `process_tick` call is an atomic dispatch cycle: stamp the
//! engine clock, make sure the tick's symbol has a book, let every
//! strategy react in insertion order, and fan each resulting trade
//! back out to every strategy. Orders submitted during a strategy
//! callback are matched synchronously, so the book a later strategy
//! observes already reflects everything earlier strategies did on the
//! same tick.

use crate::book::OrderBook;
use crate::memory::OrderPool;
use crate::strategy::Strategy;
use common::{Order, Symbol, SymbolRegistry, Tick, Trade, Ts};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

/// Aggregate counters for one backtest run
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EngineStats {
    /// Ticks dispatched through `process_tick`
    pub ticks_processed: u64,
    /// Orders accepted by `submit_order`
    pub orders_submitted: u64,
    /// Trades emitted by the books
    pub trades_executed: u64,
    /// Wall-clock nanoseconds spent inside `process_tick`
    pub total_latency_ns: u64,
}

impl EngineStats {
    /// Mean dispatch latency per tick in microseconds (0 before any tick)
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_latency_us(&self) -> f64 {
        if self.ticks_processed == 0 {
            0.0
        } else {
            self.total_latency_ns as f64 / self.ticks_processed as f64 / 1000.0
        }
    }
}

/// Engine state a strategy may act on during `on_tick`
///
/// Owns the books, the order pool, and the run counters. Strategies
/// receive a mutable borrow for the duration of one `on_tick` call and
/// cannot retain it.
pub struct EngineContext {
    order_books: FxHashMap<Symbol, OrderBook>,
    symbols: SymbolRegistry,
    order_pool: OrderPool,
    next_order_id: u64,
    current_time: Ts,
    /// Book that `submit_order` routes to: the first one created.
    /// Order templates carry no symbol, so with multi-symbol data all
    /// flow lands here. TODO: route by symbol once templates carry one.
    default_book: Option<Symbol>,
    stats: EngineStats,
    /// Trades emitted since the last dispatch to strategies
    pending_trades: Vec<Trade>,
}

impl EngineContext {
    fn new() -> Self {
        Self {
            order_books: FxHashMap::default(),
            symbols: SymbolRegistry::new(),
            order_pool: OrderPool::new(),
            next_order_id: 1,
            current_time: Ts::from_nanos(0),
            default_book: None,
            stats: EngineStats::default(),
            pending_trades: Vec::new(),
        }
    }

    /// Submit an order template for immediate matching
    ///
    /// The template is copied into pool-owned storage; its `id` is
    /// overwritten with the next engine id and its `timestamp` with the
    /// current tick time. Silently dropped if no book exists yet.
    pub fn submit_order(&mut self, template: Order) {
        let Some(symbol) = self.default_book else {
            debug!("order submitted before any book exists; dropping");
            return;
        };

        let order_ref = self.order_pool.allocate();
        let id = self.next_order_id;
        self.next_order_id += 1;
        {
            let order = self.order_pool.get_mut(order_ref);
            *order = template;
            order.id = id;
            order.timestamp = self.current_time;
        }
        self.stats.orders_submitted += 1;

        if let Some(book) = self.order_books.get_mut(&symbol) {
            book.add_order(order_ref, &mut self.order_pool, |trade| {
                self.pending_trades.push(*trade);
            });
        }
    }

    /// Borrow the book for `symbol`, if one has been created
    #[must_use]
    pub fn get_order_book(&self, symbol: &str) -> Option<&OrderBook> {
        let symbol = self.symbols.get(symbol)?;
        self.order_books.get(&symbol)
    }

    /// Timestamp of the tick currently being dispatched
    #[must_use]
    pub fn current_time(&self) -> Ts {
        self.current_time
    }

    /// Run counters so far
    #[must_use]
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    fn ensure_book(&mut self, symbol_name: &str) {
        let symbol = self.symbols.intern(symbol_name);
        if !self.order_books.contains_key(&symbol) {
            debug!("creating order book for {}", symbol_name);
            self.order_books.insert(symbol, OrderBook::new(symbol_name));
            if self.default_book.is_none() {
                self.default_book = Some(symbol);
            }
        }
    }
}

/// Event-driven backtest engine
///
/// Owns the ordered strategy list and the [`EngineContext`]. Determinism
/// contract: for a fixed tick sequence and fixed strategy list, the
/// sequence of emitted trades is identical across runs.
pub struct TickEngine {
    ctx: EngineContext,
    strategies: Vec<Box<dyn Strategy>>,
}

impl TickEngine {
    /// Create an engine with no books and no strategies
    #[must_use]
    pub fn new() -> Self {
        Self {
            ctx: EngineContext::new(),
            strategies: Vec::new(),
        }
    }

    /// Append a strategy; dispatch follows insertion order
    pub fn add_strategy(&mut self, strategy: Box<dyn Strategy>) {
        info!("registered strategy {}", strategy.name());
        self.strategies.push(strategy);
    }

    /// Dispatch one tick through every strategy
    ///
    /// Ordering guarantees, per tick:
    /// - strategies see `on_tick` in insertion order;
    /// - a strategy's submitted orders are matched before the next
    ///   strategy's `on_tick` fires;
    /// - trades produced during a strategy's `on_tick` reach every
    ///   strategy's `on_trade`, in emission order, before the next
    ///   strategy's `on_tick` begins.
    #[allow(clippy::cast_possible_truncation)]
    pub fn process_tick(&mut self, tick: &Tick) {
        let start = Instant::now();

        self.ctx.current_time = tick.timestamp;
        self.ctx.ensure_book(&tick.symbol);

        for i in 0..self.strategies.len() {
            self.strategies[i].on_tick(tick, &mut self.ctx);
            self.dispatch_pending_trades();
        }

        self.ctx.stats.ticks_processed += 1;
        self.ctx.stats.total_latency_ns += start.elapsed().as_nanos() as u64;
    }

    /// Replay a tick sequence to completion
    pub fn run_backtest(&mut self, ticks: &[Tick]) {
        info!(
            "running backtest: {} ticks through {} strategies",
            ticks.len(),
            self.strategies.len()
        );
        for tick in ticks {
            self.process_tick(tick);
        }
        info!(
            "backtest complete: {} orders submitted, {} trades executed",
            self.ctx.stats.orders_submitted, self.ctx.stats.trades_executed
        );
    }

    /// Submit an order from outside any strategy callback
    ///
    /// Same semantics as [`EngineContext::submit_order`], with any
    /// resulting trades dispatched to the strategies before returning.
    pub fn submit_order(&mut self, template: Order) {
        self.ctx.submit_order(template);
        self.dispatch_pending_trades();
    }

    /// Borrow the book for `symbol`, if one has been created
    #[must_use]
    pub fn get_order_book(&self, symbol: &str) -> Option<&OrderBook> {
        self.ctx.get_order_book(symbol)
    }

    /// Run counters
    #[must_use]
    pub fn stats(&self) -> &EngineStats {
        self.ctx.stats()
    }

    /// Fan queued trades out to every strategy, in emission order
    fn dispatch_pending_trades(&mut self) {
        if self.ctx.pending_trades.is_empty() {
            return;
        }
        let mut trades = std::mem::take(&mut self.ctx.pending_trades);
        for trade in &trades {
            self.ctx.stats.trades_executed += 1;
            for strategy in &mut self.strategies {
                strategy.on_trade(trade);
            }
        }
        // Hand the buffer back so the next tick reuses its capacity.
        trades.clear();
        self.ctx.pending_trades = trades;
    }
}

impl Default for TickEngine {
    fn default() -> Self {
        Self::new()
    }
}
