//! Reference strategies for the tick engine
//!
//! These are deliberately simple sample implementations. They cannot
//! learn which order ids belong to them (`submit_order` returns
//! nothing), so their trade accounting assumes every trade involves
//! their own orders. Good enough for exercising the engine, not for
//! real P&L attribution.

#![warn(missing_docs)]

pub mod market_maker;
pub mod momentum;

pub use market_maker::MarketMakerStrategy;
pub use momentum::MomentumStrategy;
