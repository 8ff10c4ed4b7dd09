//! Common types for the TickLab backtesting engine

#![deny(missing_docs)]
#![forbid(unsafe_code)]

pub mod instrument;
pub mod market;
pub mod types;

pub use instrument::{Symbol, SymbolRegistry};
pub use market::{Order, OrderStatus, OrderType, Side, Tick, Trade};
pub use types::{Px, Qty, Ts};
