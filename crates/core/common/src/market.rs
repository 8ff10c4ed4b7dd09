//! Order, trade, and tick types for the matching core

use crate::types::{Px, Qty, Ts};
use serde::{Deserialize, Serialize};

/// Order id value meaning "not yet assigned by the engine"
pub const UNASSIGNED_ORDER_ID: u64 = 0;

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Buying (rests on the bid side)
    Buy,
    /// Selling (rests on the ask side)
    Sell,
}

impl Side {
    /// The side this one trades against
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Match against best available liquidity; residual is cancelled
    Market,
    /// Match up to the limit price; residual rests on the book
    Limit,
}

/// Order lifecycle state
///
/// `Filled` and `Cancelled` are terminal. `Cancelled` is only ever set
/// by the book, for a market order that ran out of liquidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Live with no fills yet
    Pending,
    /// Live with some quantity filled
    Partial,
    /// Fully filled (terminal)
    Filled,
    /// Market order remainder discarded for lack of liquidity (terminal)
    Cancelled,
}

/// A resting or in-flight order
///
/// Cache-line aligned so pool-adjacent records do not share lines.
/// Plain `Copy` data: strategies build a template by value and the
/// engine copies it into pool-owned storage at submission, overwriting
/// `id` and `timestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(align(64))]
pub struct Order {
    /// Engine-assigned id, strictly increasing; 0 = unassigned
    pub id: u64,
    /// Limit price; ignored (zero) for market orders
    pub price: Px,
    /// Size as of admission
    pub quantity: Qty,
    /// Cumulative filled quantity, `0 <= filled <= quantity`
    pub filled: Qty,
    /// Original size, never mutated after creation (analytics)
    pub initial_quantity: Qty,
    /// Engine-stamped submission time
    pub timestamp: Ts,
    /// Buy or sell
    pub side: Side,
    /// Market or limit
    pub order_type: OrderType,
    /// Lifecycle state, maintained by the matcher
    pub status: OrderStatus,
    /// Opaque owner tag
    pub user_id: u32,
}

impl Order {
    /// Create an order template with unassigned id
    #[must_use]
    pub const fn new(
        price: Px,
        quantity: Qty,
        timestamp: Ts,
        side: Side,
        order_type: OrderType,
        user_id: u32,
    ) -> Self {
        Self {
            id: UNASSIGNED_ORDER_ID,
            price,
            quantity,
            filled: Qty::ZERO,
            initial_quantity: quantity,
            timestamp,
            side,
            order_type,
            status: OrderStatus::Pending,
            user_id,
        }
    }

    /// Unfilled quantity
    #[must_use]
    pub fn remaining(&self) -> Qty {
        self.quantity - self.filled
    }

    /// Filled fraction of the original size, in `[0.0, 1.0]`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fill_ratio(&self) -> f64 {
        if self.initial_quantity.as_i64() > 0 {
            self.filled.as_i64() as f64 / self.initial_quantity.as_i64() as f64
        } else {
            0.0
        }
    }
}

impl Default for Order {
    fn default() -> Self {
        Self::new(
            Px::ZERO,
            Qty::ZERO,
            Ts::from_nanos(0),
            Side::Buy,
            OrderType::Limit,
            0,
        )
    }
}

/// An executed match between a buy and a sell order
///
/// The price is always the resting (maker) level price. Immutable once
/// emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Id of the buying order
    pub buy_order_id: u64,
    /// Id of the selling order
    pub sell_order_id: u64,
    /// Execution price (maker side's level price)
    pub price: Px,
    /// Matched quantity
    pub quantity: Qty,
    /// Later of the two order timestamps
    pub timestamp: Ts,
}

/// A market-data event driving strategy evaluation
///
/// Price and volume are informational: the book is never updated from
/// tick content, only from strategy-submitted orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    /// Instrument symbol
    pub symbol: String,
    /// Last traded / quoted price
    pub price: Px,
    /// Traded volume
    pub volume: Qty,
    /// Event time, non-decreasing within a backtest
    pub timestamp: Ts,
    /// Aggressor side
    pub side: Side,
}
