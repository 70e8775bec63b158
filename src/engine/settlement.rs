//! Fixed-point fee and settlement arithmetic.
//!
//! All division is integer floor division. Rounding residue always falls
//! to the operator: a trader is never charged more than `FEE_NUM / FEE_DEN`
//! of what it spends.
//!
//! Multiplications saturate at `u128::MAX`. Orders that reach the engine
//! have passed the validator's overflow checks, so saturation only engages
//! for input the validator would have rejected.

use crate::types::price::{DEFAULT_PRICE_SCALE, SHANNONS_PER_CKB};
use crate::types::{Order, OrderStatus, Side};

/// Fee numerator: 0.3% of the spent amount
pub const FEE_NUM: u128 = 3;

/// Fee denominator
pub const FEE_DEN: u128 = 1000;

/// Operator fee on a spent amount
///
/// # Example
///
/// ```
/// use cell_dex::engine::fee;
///
/// assert_eq!(fee(90_000_000_000), 270_000_000);
/// assert_eq!(fee(333), 0);
/// ```
#[inline]
pub fn fee(amount: u128) -> u128 {
    amount.saturating_mul(FEE_NUM) / FEE_DEN
}

/// Deployment scales used by the crossing arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchParams {
    /// Scale of order prices (quote per base)
    pub price_scale: u128,
    /// Capacity/token conversion unit
    pub shannons_scale: u128,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            price_scale: DEFAULT_PRICE_SCALE,
            shannons_scale: SHANNONS_PER_CKB,
        }
    }
}

impl MatchParams {
    pub fn new(price_scale: u128, shannons_scale: u128) -> Self {
        Self {
            price_scale,
            shannons_scale,
        }
    }

    /// Average of the two limit prices, rescaled to the conversion unit
    ///
    /// `(ask + bid) * SHANNONS_SCALE / (2 * PRICE_SCALE)`
    pub fn settlement_price(&self, ask_price: u64, bid_price: u64) -> u128 {
        let sum = ask_price as u128 + bid_price as u128;
        let denominator = self.price_scale.saturating_mul(2);
        if denominator == 0 {
            return 0;
        }
        sum.saturating_mul(self.shannons_scale) / denominator
    }

    /// Capacity a bid spends to acquire `token_amount` tokens
    pub fn bid_cost(&self, settlement_price: u128, token_amount: u128) -> u128 {
        if self.shannons_scale == 0 {
            return 0;
        }
        settlement_price.saturating_mul(token_amount) / self.shannons_scale
    }

    /// Tokens an ask spends to acquire `capacity_amount` capacity
    ///
    /// Returns `None` for a zero settlement price.
    pub fn ask_cost(&self, settlement_price: u128, capacity_amount: u128) -> Option<u128> {
        if settlement_price == 0 {
            return None;
        }
        Some(capacity_amount.saturating_mul(self.shannons_scale) / settlement_price)
    }
}

/// Apply one fill to an order and return the fee charged.
///
/// The order spends `spent` on its paying side (capacity for a Bid, tokens
/// for an Ask) plus the fee, and receives `received` on the other side.
/// `order_amount` is denominated in what the order receives, so it drops by
/// `received`; a full fill zeroes it.
///
/// Returns `None` and leaves the order untouched if its paying balance
/// cannot cover `spent` plus the fee.
pub fn apply_fill(order: &mut Order, spent: u128, received: u128, full: bool) -> Option<u128> {
    let charged = fee(spent);
    let debit = spent.checked_add(charged)?;
    let mut state = order.state;

    match order.side {
        Side::Bid => {
            state.capacity = state.capacity.checked_sub(debit)?;
            state.sudt_amount = state.sudt_amount.checked_add(received)?;
        }
        Side::Ask => {
            state.sudt_amount = state.sudt_amount.checked_sub(debit)?;
            state.capacity = state.capacity.checked_add(received)?;
        }
    }

    if full {
        state.order_amount = 0;
        order.status = OrderStatus::Settled;
    } else {
        state.order_amount = state.order_amount.saturating_sub(received);
        order.status = OrderStatus::PartiallyFilled;
    }
    order.state = state;

    Some(charged)
}

// ============================================================================
// Unit Tests
// ============================================================================
