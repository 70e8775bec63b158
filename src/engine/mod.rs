//! Crossing engine for the cell-based order book.
//!
//! ## Design Principles
//!
//! The engine is designed for:
//!
//! 1. **Determinism**: Same queues always produce the same outcome
//! 2. **Fixed-Point Math**: `u128` integers with floor division only
//! 3. **Synchronous Execution**: No I/O, no async
//! 4. **Bounded Work**: Iterative loop, one emitted order per step at least
//!
//! ## Matching Rules
//!
//! - Bids are consumed highest price first, asks lowest price first
//! - A crossing settles at the average of the two limit prices
//! - The side with less demand settles fully; the other is reduced
//! - Each side pays a 0.3% fee on what it spends, collected by the operator
//!
//! ## Example
//!
//! ```
//! use cell_dex::engine::{match_orders, MatchParams};
//! use cell_dex::types::{Order, OrderState, OutPoint, Script, Side};
//!
//! let bid = Order::new(
//!     OutPoint::new([1u8; 32], 0), Side::Bid, 90_000_000_000,
//!     Script::default(), Script::default(),
//!     OrderState::new(90_270_000_000, 0, 10_000_000_000),
//! );
//! let ask = Order::new(
//!     OutPoint::new([2u8; 32], 0), Side::Ask, 110_000_000_000,
//!     Script::default(), Script::default(),
//!     OrderState::new(0, 10_030_000_000, 90_000_000_000),
//! );
//!
//! // Ask above bid: no crossing
//! let outcome = match_orders(MatchParams::default(), vec![bid], vec![ask]);
//! assert!(outcome.is_empty());
//! ```

pub mod settlement;
pub mod matcher;

pub use settlement::{apply_fill, fee, MatchParams, FEE_DEN, FEE_NUM};
pub use matcher::{match_orders, Crossing, CrossingEngine, MatchOutcome};
