//! Matching Engine - price-time priority matching over the book.
//!
//! Drives the match-then-rest policy: an incoming order sweeps the
//! opposite side best-price-first, FIFO within each level, then any
//! limit remainder rests in the book. Market remainders are discarded.
//! All ordering comes from one monotone logical counter; the engine
//! never reads a clock.

use crate::arena::{Arena, ArenaIndex};
use crate::order_book::OrderBook;
use crate::price_level::PriceLevel;
use crate::types::{OrderId, OrderType, Price, Quantity, Side, Timestamp, Trade};
use std::cmp::Reverse;

/// Outcome of a `process_order` call: the id assigned to the incoming
/// order plus every trade it produced, in execution order.
#[derive(Debug)]
pub struct OrderResult {
    pub order_id: OrderId,
    pub trades: Vec<Trade>,
}

/// The matching engine core. Owns the arena and the book; strictly
/// single-writer and synchronous, so identical input sequences produce
/// bit-identical trade output.
pub struct MatchingEngine {
    arena: Arena,
    book: OrderBook,
    next_order_id: OrderId,
    next_timestamp: Timestamp,
    trade_count: u64,
    orders_processed: u64,
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            book: OrderBook::new(),
            next_order_id: 1,
            next_timestamp: 1,
            trade_count: 0,
            orders_processed: 0,
        }
    }

    /// Process an incoming order: match against the opposite side, then
    /// rest any limit remainder. Returns the assigned id and the trades.
    ///
    /// Quantity must be positive and limit orders must carry a positive
    /// price; front-ends validate before calling.
    pub fn process_order(
        &mut self,
        side: Side,
        order_type: OrderType,
        price: Price,
        quantity: Quantity,
    ) -> OrderResult {
        self.orders_processed += 1;

        let incoming = self.arena.acquire();
        let order_id = self.next_order_id;
        self.next_order_id += 1;
        let timestamp = self.next_timestamp;
        self.next_timestamp += 1;

        {
            let order = self.arena.get_mut(incoming);
            order.id = order_id;
            order.timestamp = timestamp;
            order.price = price;
            order.quantity = quantity;
            order.filled_qty = 0;
            order.side = side;
            order.order_type = order_type;
        }

        let mut trades = Vec::new();
        match side {
            Side::Buy => self.match_buy(incoming, &mut trades),
            Side::Sell => self.match_sell(incoming, &mut trades),
        }

        let order = self.arena.get(incoming);
        if order.is_filled() {
            self.arena.release(incoming);
        } else if order_type == OrderType::Limit {
            self.book.insert(&self.arena, incoming);
        } else {
            // Market order with unfilled remainder: discarded, not rested
            self.arena.release(incoming);
        }

        OrderResult { order_id, trades }
    }

    /// Cancel a resting order by id. Returns false if the id is unknown
    /// or the order has already been filled away.
    pub fn cancel_order(&mut self, order_id: OrderId) -> bool {
        match self.book.cancel(&self.arena, order_id) {
            Some(index) => {
                self.arena.release(index);
                true
            }
            None => false,
        }
    }

    /// Match an incoming buy against the ask side, lowest price first.
    fn match_buy(&mut self, incoming: ArenaIndex, trades: &mut Vec<Trade>) {
        while !self.arena.get(incoming).is_filled() {
            let Some(ask_price) = self.book.best_ask() else {
                break;
            };
            let order = self.arena.get(incoming);
            if order.order_type == OrderType::Limit && ask_price > order.price {
                break;
            }

            while !self.arena.get(incoming).is_filled() {
                let Some(level) = self.book.asks.get_mut(&ask_price) else {
                    break;
                };
                let Some(resting_idx) = level.front() else {
                    break;
                };

                let resting = self.arena.get(resting_idx);
                let resting_id = resting.id;
                let resting_rem = resting.remaining();
                let fill_qty = self.arena.get(incoming).remaining().min(resting_rem);

                let consumed = fill_qty == resting_rem;
                if consumed {
                    // Pop while the record still carries its pre-fill
                    // remaining, so the level total drops by the full amount
                    level.pop_front(&self.arena);
                } else {
                    level.reduce_total(fill_qty);
                }

                trades.push(self.execute_trade(incoming, resting_idx, fill_qty, ask_price));

                if consumed {
                    // Index-only removal: level cleanup happens in this loop,
                    // never through the full cancel path mid-iteration
                    self.book.remove_from_lookup(resting_id);
                    self.arena.release(resting_idx);
                }
            }

            let drained = self
                .book
                .asks
                .get(&ask_price)
                .is_some_and(PriceLevel::is_empty);
            if drained {
                self.book.asks.remove(&ask_price);
            }
        }
    }

    /// Match an incoming sell against the bid side, highest price first.
    fn match_sell(&mut self, incoming: ArenaIndex, trades: &mut Vec<Trade>) {
        while !self.arena.get(incoming).is_filled() {
            let Some(bid_price) = self.book.best_bid() else {
                break;
            };
            let order = self.arena.get(incoming);
            if order.order_type == OrderType::Limit && bid_price < order.price {
                break;
            }

            while !self.arena.get(incoming).is_filled() {
                let Some(level) = self.book.bids.get_mut(&Reverse(bid_price)) else {
                    break;
                };
                let Some(resting_idx) = level.front() else {
                    break;
                };

                let resting = self.arena.get(resting_idx);
                let resting_id = resting.id;
                let resting_rem = resting.remaining();
                let fill_qty = self.arena.get(incoming).remaining().min(resting_rem);

                let consumed = fill_qty == resting_rem;
                if consumed {
                    level.pop_front(&self.arena);
                } else {
                    level.reduce_total(fill_qty);
                }

                // Resting order is the buyer here
                trades.push(self.execute_trade(resting_idx, incoming, fill_qty, bid_price));

                if consumed {
                    self.book.remove_from_lookup(resting_id);
                    self.arena.release(resting_idx);
                }
            }

            let drained = self
                .book
                .bids
                .get(&Reverse(bid_price))
                .is_some_and(PriceLevel::is_empty);
            if drained {
                self.book.bids.remove(&Reverse(bid_price));
            }
        }
    }

    /// Apply a fill to both orders and mint the trade record. The trade
    /// timestamp comes from the same counter as order arrivals.
    fn execute_trade(
        &mut self,
        buyer: ArenaIndex,
        seller: ArenaIndex,
        qty: Quantity,
        price: Price,
    ) -> Trade {
        let buyer_order_id = {
            let order = self.arena.get_mut(buyer);
            order.filled_qty += qty;
            order.id
        };
        let seller_order_id = {
            let order = self.arena.get_mut(seller);
            order.filled_qty += qty;
            order.id
        };

        self.trade_count += 1;
        let timestamp = self.next_timestamp;
        self.next_timestamp += 1;

        Trade {
            buyer_order_id,
            seller_order_id,
            price,
            quantity: qty,
            timestamp,
        }
    }

    // ========================================================================
    // Read-only views
    // ========================================================================

    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.book.best_bid()
    }

    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.book.best_ask()
    }

    #[inline]
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    #[inline]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    #[inline]
    pub fn trade_count(&self) -> u64 {
        self.trade_count
    }

    #[inline]
    pub fn orders_processed(&self) -> u64 {
        self.orders_processed
    }

    /// Compute a hash of the current state (for determinism testing)
    pub fn state_hash(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        self.book.best_bid().hash(&mut hasher);
        self.book.best_ask().hash(&mut hasher);
        self.book.order_count().hash(&mut hasher);
        self.arena.allocated().hash(&mut hasher);
        self.next_order_id.hash(&mut hasher);
        self.next_timestamp.hash(&mut hasher);
        self.trade_count.hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}
