//! Tick data sources for the backtester
//!
//! Two producers of the engine's input stream: a seeded synthetic
//! random walk and a CSV loader. Both emit time-ordered [`common::Tick`]
//! sequences; the engine does not care which one fed it.

#![warn(missing_docs)]

pub mod loader;
pub mod synthetic;

pub use loader::{load_ticks, DataError};
pub use synthetic::{generate_ticks, SyntheticConfig};
