//! # Cell DEX
//!
//! Off-chain matching kernel for a limit-order-book exchange on a
//! cell-based (UTXO-style) ledger.
//!
//! ## Architecture
//!
//! Each order lives in its own ledger cell. One matching round is:
//!
//! - **Codec**: Decode the 41-byte order payload of each live cell
//! - **Validator**: Keep only cells that can fill their whole order
//! - **OrderBook**: Sort bids high-to-low and asks low-to-high
//! - **Engine**: Cross the two queues, settle at the mid price, take fees
//! - **Assembler**: Build one unsigned transaction that consumes every
//!   matched cell and recreates it with its post-trade balances
//!
//! ## Design Principles
//!
//! 1. **Determinism**: The same cells always produce the same transaction
//! 2. **No Floating Point**: All math uses `u128` with floor division
//! 3. **Synchronous Execution**: No I/O or async in the kernel
//!
//! Fetching cells, signing and submitting are left to the caller.

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Order, cells, transactions, deals
pub mod types;

/// Order payload codec
pub mod codec;

/// Live cell validation
pub mod validator;

/// Order book: sorted bid and ask queues
pub mod orderbook;

/// Crossing engine: settlement and fees
pub mod engine;

/// Settlement transaction assembly
pub mod assembler;

/// Deployment configuration
pub mod config;

/// Error types
pub mod error;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use assembler::TransactionAssembler;
pub use config::EngineConfig;
pub use engine::{match_orders, CrossingEngine, MatchOutcome, MatchParams};
pub use error::DexError;
pub use orderbook::OrderBook;
pub use types::{Deal, LiveCell, MatchedOrder, OperatorCell, Order, OutPoint, RawTransaction, Script, Side};
pub use validator::OrderValidator;
