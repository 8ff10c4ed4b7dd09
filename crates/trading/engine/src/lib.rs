//! Event-driven matching engine and backtest dispatch loop
//!
//! The engine replays a time-ordered tick stream through a set of
//! strategies. Strategies react to ticks by submitting orders; orders
//! are matched against per-symbol limit order books under price-time
//! priority, and every resulting trade is fanned back out to every
//! strategy. The whole core is single-threaded and deterministic: a
//! fixed tick sequence and a fixed strategy list always produce the
//! same trade sequence.
//!
//! Module map:
//! - [`memory`]: slab-backed order pool feeding the books
//! - [`book`]: per-symbol limit order book with FIFO price levels
//! - [`core`]: the tick engine (dispatch loop, order routing, stats)
//! - [`strategy`]: the contract strategies implement

#![warn(missing_docs)]

pub mod book;
pub mod core;
pub mod memory;
pub mod strategy;

pub use crate::core::{EngineContext, EngineStats, TickEngine};
pub use book::OrderBook;
pub use memory::{OrderPool, OrderRef, BLOCK_SIZE};
pub use strategy::Strategy;
