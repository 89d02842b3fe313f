//! Price Level - the FIFO queue of orders resting at a single price.
//!
//! Backed by a contiguous deque of arena indices rather than a linked
//! list, so the matching loop walks the level front-to-back in cache
//! order. The aggregate remaining quantity is maintained incrementally.

use std::collections::VecDeque;

use crate::arena::{Arena, ArenaIndex};
use crate::types::Quantity;

/// Orders at one price point on one side, in arrival (time-priority) order.
#[derive(Clone, Debug, Default)]
pub struct PriceLevel {
    orders: VecDeque<ArenaIndex>,
    /// Cached sum of `remaining()` over the level's contents.
    total_qty: u64,
}

impl PriceLevel {
    /// Create a new empty price level
    pub fn new() -> Self {
        Self {
            orders: VecDeque::new(),
            total_qty: 0,
        }
    }

    /// Returns true if there are no orders at this level
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Append an order to the back of the queue.
    ///
    /// # Complexity
    /// O(1) amortized
    #[inline]
    pub fn append(&mut self, arena: &Arena, index: ArenaIndex) {
        self.total_qty += arena.get(index).remaining() as u64;
        self.orders.push_back(index);
    }

    /// The earliest-arrived order at this price, if any.
    #[inline]
    pub fn front(&self) -> Option<ArenaIndex> {
        self.orders.front().copied()
    }

    /// Remove the front order, subtracting its remaining quantity as it
    /// stands at the moment of removal.
    ///
    /// # Complexity
    /// O(1)
    #[inline]
    pub fn pop_front(&mut self, arena: &Arena) -> Option<ArenaIndex> {
        let index = self.orders.pop_front()?;
        self.total_qty -= arena.get(index).remaining() as u64;
        Some(index)
    }

    /// Remove a specific order (cancellation path). O(k) in the level
    /// size; cancels are rare next to matches.
    pub fn remove(&mut self, arena: &Arena, index: ArenaIndex) -> bool {
        match self.orders.iter().position(|&i| i == index) {
            Some(pos) => {
                self.total_qty -= arena.get(index).remaining() as u64;
                self.orders.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Update the cached total after a partial fill of the front order.
    #[inline]
    pub fn reduce_total(&mut self, qty: Quantity) {
        debug_assert!(self.total_qty >= qty as u64);
        self.total_qty -= qty as u64;
    }

    /// Number of orders at this level.
    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Cached aggregate remaining quantity.
    #[inline]
    pub fn total_remaining(&self) -> u64 {
        self.total_qty
    }

    /// Iterate the resting order handles in priority order.
    pub fn iter(&self) -> impl Iterator<Item = ArenaIndex> + '_ {
        self.orders.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage_orders(arena: &mut Arena, qtys: &[Quantity]) -> Vec<ArenaIndex> {
        qtys.iter()
            .map(|&q| {
                let idx = arena.acquire();
                let order = arena.get_mut(idx);
                order.id = idx as u64 + 1;
                order.quantity = q;
                order.filled_qty = 0;
                idx
            })
            .collect()
    }

    #[test]
    fn test_empty_level() {
        let level = PriceLevel::new();
        assert!(level.is_empty());
        assert_eq!(level.order_count(), 0);
        assert_eq!(level.total_remaining(), 0);
        assert_eq!(level.front(), None);
    }

    #[test]
    fn test_append_accumulates_total() {
        let mut arena = Arena::new();
        let mut level = PriceLevel::new();
        let indices = stage_orders(&mut arena, &[100, 200, 300]);

        for &idx in &indices {
            level.append(&arena, idx);
        }

        assert_eq!(level.order_count(), 3);
        assert_eq!(level.total_remaining(), 600);
        assert_eq!(level.front(), Some(indices[0]));
    }

    #[test]
    fn test_append_uses_remaining_not_original() {
        let mut arena = Arena::new();
        let mut level = PriceLevel::new();

        let idx = arena.acquire();
        let order = arena.get_mut(idx);
        order.quantity = 100;
        order.filled_qty = 30;

        level.append(&arena, idx);
        assert_eq!(level.total_remaining(), 70);
    }

    #[test]
    fn test_pop_front_fifo() {
        let mut arena = Arena::new();
        let mut level = PriceLevel::new();
        let indices = stage_orders(&mut arena, &[10, 20, 30]);

        for &idx in &indices {
            level.append(&arena, idx);
        }

        assert_eq!(level.pop_front(&arena), Some(indices[0]));
        assert_eq!(level.total_remaining(), 50);
        assert_eq!(level.pop_front(&arena), Some(indices[1]));
        assert_eq!(level.pop_front(&arena), Some(indices[2]));
        assert!(level.is_empty());
        assert_eq!(level.total_remaining(), 0);
        assert_eq!(level.pop_front(&arena), None);
    }

    #[test]
    fn test_remove_middle() {
        let mut arena = Arena::new();
        let mut level = PriceLevel::new();
        let indices = stage_orders(&mut arena, &[10, 20, 30]);

        for &idx in &indices {
            level.append(&arena, idx);
        }

        assert!(level.remove(&arena, indices[1]));
        assert_eq!(level.order_count(), 2);
        assert_eq!(level.total_remaining(), 40);
        assert_eq!(level.front(), Some(indices[0]));

        // Already gone
        assert!(!level.remove(&arena, indices[1]));
    }

    #[test]
    fn test_reduce_total() {
        let mut arena = Arena::new();
        let mut level = PriceLevel::new();
        let indices = stage_orders(&mut arena, &[100]);
        level.append(&arena, indices[0]);

        level.reduce_total(40);
        assert_eq!(level.total_remaining(), 60);
        level.reduce_total(60);
        assert_eq!(level.total_remaining(), 0);
    }
}
