//! Order types for the matching kernel.
//!
//! ## Balances
//!
//! An order cell holds two balances:
//! - `capacity`: base-asset balance in shannons
//! - `sudt_amount`: quote-token balance in token base units
//!
//! `order_amount` is the remaining demand: capacity units for an Ask,
//! token units for a Bid.
//!
//! All balances are `u128`. Prices stay `u64` on the wire and are widened
//! before any arithmetic.

use crate::types::{OutPoint, Script};

// ============================================================================
// Side enum
// ============================================================================

/// Order side: Bid or Ask
///
/// Represented as u8 in the order payload:
/// - Bid = 0
/// - Ask = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    /// Offers capacity for tokens
    #[default]
    Bid,
    /// Offers tokens for capacity
    Ask,
}

impl Side {
    /// Convert to the payload tag
    pub fn to_u8(self) -> u8 {
        match self {
            Side::Bid => 0,
            Side::Ask => 1,
        }
    }

    /// Convert from the payload tag
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Side::Bid),
            1 => Some(Side::Ask),
            _ => None,
        }
    }

    /// Returns the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

// ============================================================================
// OrderStatus enum
// ============================================================================

/// Per-order matching state within one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    /// Not yet touched by a crossing
    #[default]
    Open,
    /// Reduced by at least one crossing, still resting at its queue head
    PartiallyFilled,
    /// Fully settled and emitted
    Settled,
}

// ============================================================================
// OrderState
// ============================================================================

/// Balances carried by an order cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderState {
    /// Base-asset balance (shannons)
    pub capacity: u128,
    /// Quote-token balance
    pub sudt_amount: u128,
    /// Remaining demand
    pub order_amount: u128,
}

impl OrderState {
    pub fn new(capacity: u128, sudt_amount: u128, order_amount: u128) -> Self {
        Self {
            capacity,
            sudt_amount,
            order_amount,
        }
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// A live order decoded from a ledger cell.
///
/// ## Example
///
/// ```
/// use cell_dex::types::{Order, OrderState, OutPoint, Script, Side};
///
/// let order = Order::new(
///     OutPoint::new([1u8; 32], 0),
///     Side::Bid,
///     90_000_000_000,                                  // price (10^10 scale)
///     Script::default(),
///     Script::default(),
///     OrderState::new(90_270_000_000, 0, 10_000_000_000),
/// );
/// assert!(!order.is_filled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Outpoint of the order cell
    pub id: OutPoint,

    pub side: Side,

    /// Limit price in fixed-point (scaled by PRICE_SCALE)
    pub price: u64,

    /// Ownership lock, copied through unchanged
    pub lock: Script,

    /// Token type script, copied through unchanged
    pub type_script: Script,

    pub state: OrderState,

    pub status: OrderStatus,
}

impl Order {
    /// Create a new order in `Open` status
    pub fn new(
        id: OutPoint,
        side: Side,
        price: u64,
        lock: Script,
        type_script: Script,
        state: OrderState,
    ) -> Self {
        Self {
            id,
            side,
            price,
            lock,
            type_script,
            state,
            status: OrderStatus::Open,
        }
    }

    /// Check if the order has no remaining demand
    pub fn is_filled(&self) -> bool {
        self.state.order_amount == 0
    }

    /// Check if the order has been reduced by a crossing but not emitted
    pub fn is_partially_filled(&self) -> bool {
        self.status == OrderStatus::PartiallyFilled
    }

    /// Freeze the current state into a matched order
    pub fn to_matched(&self) -> MatchedOrder {
        MatchedOrder {
            id: self.id.clone(),
            side: self.side,
            price: self.price,
            lock: self.lock.clone(),
            type_script: self.type_script.clone(),
            state: self.state,
        }
    }
}

// ============================================================================
// MatchedOrder struct
// ============================================================================

/// Final post-trade state of an order, re-encoded as a new cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedOrder {
    pub id: OutPoint,
    pub side: Side,
    pub price: u64,
    pub lock: Script,
    pub type_script: Script,
    pub state: OrderState,
}

// ============================================================================
// Unit Tests
// ============================================================================
