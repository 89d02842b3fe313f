//! Order Book - the central limit order book structure.
//!
//! Two sorted sides (bids descending, asks ascending) of price levels,
//! plus an id -> handle index for O(1) cancellation lookup. Bids are
//! keyed by `Reverse<Price>` so the first entry of either map is the
//! best price on that side.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::io::{self, Write};

use rustc_hash::FxHashMap;

use crate::arena::{Arena, ArenaIndex};
use crate::price_level::PriceLevel;
use crate::types::{price_to_string, OrderId, Price, Side};

/// Dual-indexed book: price-sorted levels for matching, hashed id lookup
/// for cancels. Holds only borrowed arena handles; the arena owns the
/// records.
pub struct OrderBook {
    /// Bid levels, best (highest) price first.
    pub(crate) bids: BTreeMap<Reverse<Price>, PriceLevel>,
    /// Ask levels, best (lowest) price first.
    pub(crate) asks: BTreeMap<Price, PriceLevel>,
    /// OrderId -> arena handle for every live resting order.
    lookup: FxHashMap<OrderId, ArenaIndex>,
}

impl OrderBook {
    /// Create a new empty order book
    pub fn new() -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            lookup: FxHashMap::default(),
        }
    }

    // ========================================================================
    // Order Management
    // ========================================================================

    /// Place a resting order into its side at its price, creating the
    /// level if absent, and register it in the lookup index.
    pub fn insert(&mut self, arena: &Arena, index: ArenaIndex) {
        let order = arena.get(index);
        self.lookup.insert(order.id, index);

        let level = match order.side {
            Side::Buy => self.bids.entry(Reverse(order.price)).or_default(),
            Side::Sell => self.asks.entry(order.price).or_default(),
        };
        level.append(arena, index);
    }

    /// Full cancellation path: remove the order from the lookup and its
    /// level, erasing the level if it empties. Returns the handle so the
    /// caller can release it.
    ///
    /// Must not be called while the matching loop is iterating a level;
    /// that path uses `remove_from_lookup` instead.
    pub fn cancel(&mut self, arena: &Arena, order_id: OrderId) -> Option<ArenaIndex> {
        let index = self.lookup.remove(&order_id)?;
        let order = arena.get(index);
        let (side, price) = (order.side, order.price);

        match side {
            Side::Buy => {
                if let Some(level) = self.bids.get_mut(&Reverse(price)) {
                    level.remove(arena, index);
                    if level.is_empty() {
                        self.bids.remove(&Reverse(price));
                    }
                }
            }
            Side::Sell => {
                if let Some(level) = self.asks.get_mut(&price) {
                    level.remove(arena, index);
                    if level.is_empty() {
                        self.asks.remove(&price);
                    }
                }
            }
        }

        Some(index)
    }

    /// Index-only removal, used by the matching loop after it has popped
    /// the handle from the level it is draining. Level cleanup stays with
    /// that caller; routing a mid-match removal through `cancel` would
    /// mutate the level out from under the loop.
    #[inline]
    pub fn remove_from_lookup(&mut self, order_id: OrderId) {
        self.lookup.remove(&order_id);
    }

    /// Check if an order is resting in the book.
    #[inline]
    pub fn has_order(&self, order_id: OrderId) -> bool {
        self.lookup.contains_key(&order_id)
    }

    // ========================================================================
    // Top-of-book access
    // ========================================================================

    /// Best (highest) bid price.
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next().map(|Reverse(p)| *p)
    }

    /// Best (lowest) ask price.
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }

    /// Total resting quantity at a specific price level.
    pub fn volume_at(&self, side: Side, price: Price) -> u64 {
        let level = match side {
            Side::Buy => self.bids.get(&Reverse(price)),
            Side::Sell => self.asks.get(&price),
        };
        level.map_or(0, PriceLevel::total_remaining)
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Number of bid price levels.
    pub fn bid_level_count(&self) -> usize {
        self.bids.len()
    }

    /// Number of ask price levels.
    pub fn ask_level_count(&self) -> usize {
        self.asks.len()
    }

    /// Number of live resting orders across both sides.
    pub fn order_count(&self) -> usize {
        self.lookup.len()
    }

    /// True when no orders rest on either side.
    pub fn is_book_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Bid levels in priority order (highest price first).
    pub fn bid_levels(&self) -> impl Iterator<Item = (Price, &PriceLevel)> {
        self.bids.iter().map(|(Reverse(p), level)| (*p, level))
    }

    /// Ask levels in priority order (lowest price first).
    pub fn ask_levels(&self) -> impl Iterator<Item = (Price, &PriceLevel)> {
        self.asks.iter().map(|(p, level)| (*p, level))
    }

    /// Lookup entries, for invariant audits in tests.
    pub fn resting_orders(&self) -> impl Iterator<Item = (OrderId, ArenaIndex)> + '_ {
        self.lookup.iter().map(|(&id, &idx)| (id, idx))
    }

    // ========================================================================
    // Snapshot
    // ========================================================================

    /// Write the book snapshot: asks stacked highest-to-lowest above the
    /// spread, bids highest-to-lowest below it.
    pub fn write_snapshot(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "=== ORDER BOOK ===")?;
        writeln!(out, "--- ASKS (lowest first) ---")?;
        for (price, level) in self.asks.iter().rev() {
            writeln!(
                out,
                "  {:>10}  |  {:>8}  ({} orders)",
                price_to_string(*price),
                level.total_remaining(),
                level.order_count()
            )?;
        }
        writeln!(out, "--- SPREAD ---")?;
        writeln!(out, "--- BIDS (highest first) ---")?;
        for (Reverse(price), level) in self.bids.iter() {
            writeln!(
                out,
                "  {:>10}  |  {:>8}  ({} orders)",
                price_to_string(*price),
                level.total_remaining(),
                level.order_count()
            )?;
        }
        writeln!(out, "==================")?;
        Ok(())
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBook")
            .field("best_bid", &self.best_bid())
            .field("best_ask", &self.best_ask())
            .field("bid_levels", &self.bids.len())
            .field("ask_levels", &self.asks.len())
            .field("order_count", &self.lookup.len())
            .finish()
    }
}
