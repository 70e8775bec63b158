//! Order book module: collects validated orders and sorts them for the
//! crossing engine.
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Add order | O(log n) |
//! | Remove order by outpoint | O(log n + k) |
//! | Best bid/ask | O(log n) |
//! | Drain into queues | O(n) |
//!
//! *k = orders at the removed order's price*

pub mod book;

pub use book::OrderBook;
