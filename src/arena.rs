//! Order Arena - O(1) slab allocator with cache-line aligned records.
//!
//! Storage is a sequence of fixed-size blocks allocated up front and on
//! demand; a free list threaded through unused slots gives O(1) acquire
//! and release with no syscalls in the steady state. Handles are u32
//! indices, so the book never holds raw pointers into the slab.

use std::fmt;

use crate::types::{OrderId, OrderType, Price, Quantity, Side, Timestamp};

/// Sentinel value representing a null/invalid index
pub const NULL_INDEX: u32 = u32::MAX;

/// Arena handle type - stable integer indices instead of pointers.
pub type ArenaIndex = u32;

/// Slots per block. A block is 256 KiB of order records.
pub const BLOCK_SLOTS: usize = 4096;

/// A single order record - exactly 64 bytes (one cache line).
///
/// # Memory Layout
///
/// | Field      | Type    | Offset | Size |
/// |------------|---------|--------|------|
/// | id         | u64     | 0      | 8    |
/// | timestamp  | u64     | 8      | 8    |
/// | price      | i64     | 16     | 8    |
/// | quantity   | u32     | 24     | 4    |
/// | filled_qty | u32     | 28     | 4    |
/// | side       | u8      | 32     | 1    |
/// | order_type | u8      | 33     | 1    |
/// | _pad       | [u8;30] | 34     | 30   |
/// | **Total**  |         |        | 64   |
///
/// While a slot is free, its `id` field holds the free-list link.
#[repr(C, align(64))]
#[derive(Clone, Copy)]
pub struct Order {
    pub id: OrderId,
    pub timestamp: Timestamp,
    /// Fixed-point tick price; zero for market orders.
    pub price: Price,
    /// Original quantity at arrival.
    pub quantity: Quantity,
    pub filled_qty: Quantity,
    pub side: Side,
    pub order_type: OrderType,
    _pad: [u8; 30],
}

// Compile-time layout assertions: one record per cache line, and the
// free-list link must fit in the leading bytes of a free slot.
const _: () = assert!(
    std::mem::size_of::<Order>() == 64,
    "Order must be exactly 64 bytes (one cache line)"
);
const _: () = assert!(
    std::mem::align_of::<Order>() == 64,
    "Order must be 64-byte aligned"
);
const _: () = assert!(
    std::mem::size_of::<Order>() >= std::mem::size_of::<u64>(),
    "Order must have room for the free-list link"
);

impl Order {
    /// Create an empty record (free-list slot state)
    #[inline]
    pub const fn empty() -> Self {
        Self {
            id: NULL_INDEX as u64,
            timestamp: 0,
            price: 0,
            quantity: 0,
            filled_qty: 0,
            side: Side::Buy,
            order_type: OrderType::Limit,
            _pad: [0u8; 30],
        }
    }

    /// Quantity still open on this order.
    #[inline]
    pub const fn remaining(&self) -> Quantity {
        self.quantity - self.filled_qty
    }

    /// True once the order has no open quantity left.
    #[inline]
    pub const fn is_filled(&self) -> bool {
        self.filled_qty >= self.quantity
    }
}

impl fmt::Debug for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Order")
            .field("id", &self.id)
            .field("timestamp", &self.timestamp)
            .field("price", &self.price)
            .field("quantity", &self.quantity)
            .field("filled_qty", &self.filled_qty)
            .field("side", &self.side)
            .field("order_type", &self.order_type)
            .finish()
    }
}

/// Block-grown memory pool with O(1) acquire and release.
///
/// The free list is threaded through the `id` field of unused records.
/// When the free list runs dry a whole new block is chained on; blocks
/// are only returned to the allocator when the arena is dropped, so
/// indices stay valid for the arena's lifetime.
pub struct Arena {
    /// Record blocks; slot i lives in
    /// `blocks[i / BLOCK_SLOTS][i % BLOCK_SLOTS]`.
    blocks: Vec<Box<[Order]>>,

    /// Head of the free list (index of first available slot)
    free_head: ArenaIndex,

    /// Number of currently acquired records
    allocated: u32,
}

impl Arena {
    /// Create an arena with one block pre-allocated.
    pub fn new() -> Self {
        let mut arena = Self {
            blocks: Vec::new(),
            free_head: NULL_INDEX,
            allocated: 0,
        };
        arena.grow();
        arena
    }

    /// Acquire a slot. The record is uninitialized from the caller's
    /// point of view: every field must be overwritten before first read.
    ///
    /// # Complexity
    /// O(1); grows by one block on the cold path.
    #[inline]
    pub fn acquire(&mut self) -> ArenaIndex {
        if self.free_head == NULL_INDEX {
            self.grow();
        }

        let index = self.free_head;
        self.free_head = self.get(index).id as ArenaIndex;
        self.allocated += 1;
        index
    }

    /// Release a slot back to the free list.
    ///
    /// The caller guarantees no live handles to the slot remain; in
    /// particular the book must no longer reference it.
    ///
    /// # Complexity
    /// O(1)
    #[inline]
    pub fn release(&mut self, index: ArenaIndex) {
        debug_assert!((index as usize) < self.capacity(), "index out of bounds");
        debug_assert!(self.allocated > 0, "release without matching acquire");

        self.get_mut(index).id = self.free_head as u64;
        self.free_head = index;
        self.allocated -= 1;
    }

    /// Get an immutable reference to a record.
    #[inline]
    pub fn get(&self, index: ArenaIndex) -> &Order {
        debug_assert!((index as usize) < self.capacity(), "index out of bounds");
        &self.blocks[index as usize / BLOCK_SLOTS][index as usize % BLOCK_SLOTS]
    }

    /// Get a mutable reference to a record.
    #[inline]
    pub fn get_mut(&mut self, index: ArenaIndex) -> &mut Order {
        debug_assert!((index as usize) < self.capacity(), "index out of bounds");
        &mut self.blocks[index as usize / BLOCK_SLOTS][index as usize % BLOCK_SLOTS]
    }

    /// Number of currently acquired records.
    #[inline]
    pub fn allocated(&self) -> u32 {
        self.allocated
    }

    /// Total slots across all blocks.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.blocks.len() * BLOCK_SLOTS
    }

    /// True when no records are acquired.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.allocated == 0
    }

    /// Allocate one more block and chain its slots onto the free list.
    /// Allocation failure aborts the process; there is no recovery path.
    #[cold]
    fn grow(&mut self) {
        let base = self.capacity() as u32;
        let mut block = vec![Order::empty(); BLOCK_SLOTS].into_boxed_slice();

        // Chain slots forward; the last one picks up the old free head.
        for (i, slot) in block.iter_mut().enumerate() {
            slot.id = (base + i as u32 + 1) as u64;
        }
        block[BLOCK_SLOTS - 1].id = self.free_head as u64;

        self.blocks.push(block);
        self.free_head = base;
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.capacity())
            .field("allocated", &self.allocated)
            .field("free_head", &self.free_head)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_layout() {
        assert_eq!(std::mem::size_of::<Order>(), 64);
        assert_eq!(std::mem::align_of::<Order>(), 64);
    }

    #[test]
    fn test_arena_creation() {
        let arena = Arena::new();
        assert_eq!(arena.capacity(), BLOCK_SLOTS);
        assert_eq!(arena.allocated(), 0);
        assert!(arena.is_empty());
    }

    #[test]
    fn test_acquire_release() {
        let mut arena = Arena::new();

        let a = arena.acquire();
        let b = arena.acquire();
        assert_ne!(a, b);
        assert_eq!(arena.allocated(), 2);

        arena.release(a);
        assert_eq!(arena.allocated(), 1);

        // Freed slot is reused before any untouched one
        let c = arena.acquire();
        assert_eq!(c, a);

        arena.release(b);
        arena.release(c);
        assert!(arena.is_empty());
    }

    #[test]
    fn test_acquire_populate_read_back() {
        let mut arena = Arena::new();
        let idx = arena.acquire();

        let order = arena.get_mut(idx);
        order.id = 12345;
        order.timestamp = 7;
        order.price = 15025;
        order.quantity = 100;
        order.filled_qty = 40;
        order.side = Side::Sell;
        order.order_type = OrderType::Limit;

        let order = arena.get(idx);
        assert_eq!(order.id, 12345);
        assert_eq!(order.remaining(), 60);
        assert!(!order.is_filled());
    }

    #[test]
    fn test_growth_past_one_block() {
        let mut arena = Arena::new();
        let count = BLOCK_SLOTS + 10;

        let indices: Vec<_> = (0..count).map(|_| arena.acquire()).collect();
        assert_eq!(arena.allocated() as usize, count);
        assert_eq!(arena.capacity(), 2 * BLOCK_SLOTS);

        // All handles distinct
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), count);

        for idx in indices {
            arena.release(idx);
        }
        assert!(arena.is_empty());
        // Blocks are retained after release
        assert_eq!(arena.capacity(), 2 * BLOCK_SLOTS);
    }

    #[test]
    fn test_remaining_and_is_filled() {
        let mut arena = Arena::new();
        let idx = arena.acquire();
        let order = arena.get_mut(idx);
        order.quantity = 10;
        order.filled_qty = 10;
        assert!(order.is_filled());
        assert_eq!(order.remaining(), 0);
    }
}
