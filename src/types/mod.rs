//! Core data types for the matching kernel
//!
//! All balances are `u128`; prices are `u64` fixed-point scaled by the
//! deployment's `PRICE_SCALE`.
//!
//! ## Types
//!
//! - [`Order`]: A live Bid or Ask decoded from a ledger cell
//! - [`MatchedOrder`]: An order's final post-trade state
//! - [`OutPoint`], [`Script`], [`LiveCell`], [`OperatorCell`]: Ledger cells
//! - [`RawTransaction`]: Unsigned settlement transaction
//! - [`Deal`]: Record of a submitted settlement

mod order;
mod cell;
mod transaction;
mod deal;
pub mod price;

pub use order::{MatchedOrder, Order, OrderState, OrderStatus, Side};
pub use cell::{LiveCell, OperatorCell, OutPoint, Script};
pub use transaction::{
    CellDep, CellInput, CellOutput, DepType, PackedScript, RawTransaction, MAX_CELL_DATA,
    MAX_CELL_DEPS, MAX_SCRIPT_ARGS, MAX_TX_CELLS, MAX_WITNESS_LEN, TX_VERSION,
};
pub use deal::{Deal, DealStatus, DEAL_TIMEOUT_MS};
