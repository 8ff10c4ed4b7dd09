//! Slab-backed order pool
//!
//! Resting orders must stay addressable for as long as they sit on a
//! book, across an arbitrary number of later allocations. The pool
//! hands out index-based handles into fixed-size blocks that are never
//! moved or freed: growth appends a block, nothing is ever deallocated,
//! and [`OrderPool::reset`] simply rewinds the cursor between runs.
//! Keeping recently allocated orders dense in a handful of blocks also
//! keeps the matcher's working set cache-resident.

use common::Order;

/// Orders per block
pub const BLOCK_SIZE: usize = 4096;

/// Stable handle to a pool slot
///
/// Valid until the next [`OrderPool::reset`]. Resolving a handle from
/// before a reset is a logic error and panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderRef(u32);

impl OrderRef {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Bump allocator over append-only blocks of [`Order`] records
pub struct OrderPool {
    blocks: Vec<Box<[Order]>>,
    len: usize,
}

impl OrderPool {
    /// Create a pool with one block preallocated
    #[must_use]
    pub fn new() -> Self {
        Self {
            blocks: vec![Self::new_block()],
            len: 0,
        }
    }

    fn new_block() -> Box<[Order]> {
        vec![Order::default(); BLOCK_SIZE].into_boxed_slice()
    }

    /// Allocate the next slot, growing by one block on overflow
    ///
    /// The slot is reset to `Order::default()`; the caller assigns
    /// fields. Aborts the process if the allocator refuses a new block.
    #[allow(clippy::cast_possible_truncation)]
    pub fn allocate(&mut self) -> OrderRef {
        let index = self.len;
        assert!(index <= u32::MAX as usize, "order pool exhausted u32 handles");
        if index == self.blocks.len() * BLOCK_SIZE {
            self.blocks.push(Self::new_block());
        }
        self.len += 1;
        self.blocks[index / BLOCK_SIZE][index % BLOCK_SIZE] = Order::default();
        OrderRef(index as u32)
    }

    /// Read a live order
    #[must_use]
    pub fn get(&self, order_ref: OrderRef) -> &Order {
        let index = order_ref.index();
        assert!(index < self.len, "stale order ref {index}");
        &self.blocks[index / BLOCK_SIZE][index % BLOCK_SIZE]
    }

    /// Mutate a live order
    pub fn get_mut(&mut self, order_ref: OrderRef) -> &mut Order {
        let index = order_ref.index();
        assert!(index < self.len, "stale order ref {index}");
        &mut self.blocks[index / BLOCK_SIZE][index % BLOCK_SIZE]
    }

    /// Rewind the pool for reuse between backtests
    ///
    /// Does not free memory. All previously issued handles become
    /// invalid.
    pub fn reset(&mut self) {
        self.len = 0;
    }

    /// Number of live allocations
    #[must_use]
    pub fn allocated_count(&self) -> usize {
        self.len
    }

    /// Total bytes reserved across all blocks
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.blocks.len() * BLOCK_SIZE * std::mem::size_of::<Order>()
    }
}

impl Default for OrderPool {
    fn default() -> Self {
        Self::new()
    }
}
