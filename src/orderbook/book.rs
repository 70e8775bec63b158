//! Order book for one token pair.
//!
//! ## Architecture
//!
//! - **Slab**: Pre-allocated storage for validated orders
//! - **BTreeMap**: Sorted price levels, FIFO within each level
//! - **HashMap**: Outpoint to slab key, for deduplication and removal
//!
//! ## Price Ordering
//!
//! - **Bids**: Sorted high-to-low (best bid = highest price)
//! - **Asks**: Sorted low-to-high (best ask = lowest price)
//!
//! [`OrderBook::into_queues`] hands the two sides to the crossing engine in
//! exactly the order it expects.
//!
//! ## Example
//!
//! ```
//! use cell_dex::orderbook::OrderBook;
//! use cell_dex::types::{Order, OrderState, OutPoint, Script, Side};
//!
//! let mut book = OrderBook::with_capacity(16);
//! let order = Order::new(
//!     OutPoint::new([1u8; 32], 0), Side::Bid, 90_000_000_000,
//!     Script::default(), Script::default(), OrderState::new(1, 0, 1),
//! );
//!
//! assert!(book.add_order(order.clone()).is_some());
//! assert!(book.add_order(order).is_none()); // duplicate outpoint
//! assert_eq!(book.best_bid(), Some(90_000_000_000));
//! ```

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, VecDeque};

use log::debug;
use slab::Slab;

use crate::types::{LiveCell, Order, OutPoint, Side};
use crate::validator::OrderValidator;

/// Validated orders for one pair, indexed by price.
#[derive(Debug, Default)]
pub struct OrderBook {
    /// Key: slab index, Value: order
    orders: Slab<Order>,

    /// Bid levels, Reverse(price) for descending order
    bids: BTreeMap<Reverse<u64>, VecDeque<usize>>,

    /// Ask levels, ascending
    asks: BTreeMap<u64, VecDeque<usize>>,

    order_index: HashMap<OutPoint, usize>,

    bid_count: usize,

    ask_count: usize,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a book with pre-allocated capacity
    pub fn with_capacity(order_capacity: usize) -> Self {
        Self {
            orders: Slab::with_capacity(order_capacity),
            order_index: HashMap::with_capacity(order_capacity),
            ..Self::default()
        }
    }

    /// Build a book from raw cells, keeping only the fillable orders
    pub fn from_cells<'a>(
        validator: &OrderValidator,
        cells: impl IntoIterator<Item = &'a LiveCell>,
    ) -> Self {
        let mut book = Self::new();
        for order in validator.filter_orders(cells) {
            book.add_order(order);
        }
        book
    }

    // ========================================================================
    // Capacity and Size
    // ========================================================================

    #[inline]
    pub fn capacity(&self) -> usize {
        self.orders.capacity()
    }

    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn bid_count(&self) -> usize {
        self.bid_count
    }

    #[inline]
    pub fn ask_count(&self) -> usize {
        self.ask_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    #[inline]
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    #[inline]
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    // ========================================================================
    // Order Management
    // ========================================================================

    /// Add an order behind any others at its price
    ///
    /// Returns the slab key, or `None` if an order with the same outpoint
    /// is already in the book.
    pub fn add_order(&mut self, order: Order) -> Option<usize> {
        if self.order_index.contains_key(&order.id) {
            debug!("ignoring duplicate order {}", order.id);
            return None;
        }

        let id = order.id.clone();
        let price = order.price;
        let side = order.side;

        let key = self.orders.insert(order);
        self.order_index.insert(id, key);

        match side {
            Side::Bid => {
                self.bids.entry(Reverse(price)).or_default().push_back(key);
                self.bid_count += 1;
            }
            Side::Ask => {
                self.asks.entry(price).or_default().push_back(key);
                self.ask_count += 1;
            }
        }

        Some(key)
    }

    /// Remove an order by outpoint
    pub fn remove_order(&mut self, id: &OutPoint) -> Option<Order> {
        let key = self.order_index.remove(id)?;
        let order = self.orders.try_remove(key)?;

        match order.side {
            Side::Bid => {
                let level_key = Reverse(order.price);
                if let Some(level) = self.bids.get_mut(&level_key) {
                    level.retain(|k| *k != key);
                    if level.is_empty() {
                        self.bids.remove(&level_key);
                    }
                }
                self.bid_count -= 1;
            }
            Side::Ask => {
                if let Some(level) = self.asks.get_mut(&order.price) {
                    level.retain(|k| *k != key);
                    if level.is_empty() {
                        self.asks.remove(&order.price);
                    }
                }
                self.ask_count -= 1;
            }
        }

        Some(order)
    }

    #[inline]
    pub fn get_order(&self, id: &OutPoint) -> Option<&Order> {
        let key = self.order_index.get(id)?;
        self.orders.get(*key)
    }

    #[inline]
    pub fn contains_order(&self, id: &OutPoint) -> bool {
        self.order_index.contains_key(id)
    }

    // ========================================================================
    // Best Bid/Ask
    // ========================================================================

    /// Highest bid price
    #[inline]
    pub fn best_bid(&self) -> Option<u64> {
        self.bids.keys().next().map(|r| r.0)
    }

    /// Lowest ask price
    #[inline]
    pub fn best_ask(&self) -> Option<u64> {
        self.asks.keys().next().copied()
    }

    /// `best_ask - best_bid`, or `None` if either side is empty or the book
    /// crosses
    pub fn spread(&self) -> Option<u64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) if ask >= bid => Some(ask - bid),
            _ => None,
        }
    }

    /// Check if the best ask is at or below the best bid
    pub fn crosses(&self) -> bool {
        matches!((self.best_bid(), self.best_ask()), (Some(bid), Some(ask)) if ask <= bid)
    }

    // ========================================================================
    // Engine Hand-off
    // ========================================================================

    /// Drain the book into (bids descending, asks ascending)
    pub fn into_queues(self) -> (VecDeque<Order>, VecDeque<Order>) {
        let mut orders = self.orders;

        let bids = self
            .bids
            .into_values()
            .flatten()
            .filter_map(|key| orders.try_remove(key))
            .collect();
        let asks = self
            .asks
            .into_values()
            .flatten()
            .filter_map(|key| orders.try_remove(key))
            .collect();

        (bids, asks)
    }

    /// Clear all orders from the book
    pub fn clear(&mut self) {
        self.orders.clear();
        self.bids.clear();
        self.asks.clear();
        self.order_index.clear();
        self.bid_count = 0;
        self.ask_count = 0;
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
