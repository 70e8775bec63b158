//! Order validator: gates live cells before they reach the engine.
//!
//! A cell becomes an [`Order`] only if its payload decodes and its balances
//! can cover the whole order, fee included:
//!
//! - **Bid**: `order_amount * price / PRICE_SCALE` plus fee must fit in
//!   `capacity - min_order_cell_capacity`
//! - **Ask**: `order_amount * PRICE_SCALE / price` plus fee must fit in
//!   `sudt_amount`
//!
//! Orders whose requirement rounds to zero are rejected too, as are orders
//! whose arithmetic would overflow `u128`.

use log::debug;

use crate::codec;
use crate::engine::{fee, MatchParams};
use crate::error::OrderError;
use crate::types::{LiveCell, Order, OrderState, Side};

/// Default minimum capacity of an order cell: 181 CKB
pub const DEFAULT_MIN_ORDER_CELL_CAPACITY: u128 = 181 * 100_000_000;

/// Checks live cells against the payload format and order economics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderValidator {
    params: MatchParams,
    min_order_cell_capacity: u128,
}

impl Default for OrderValidator {
    fn default() -> Self {
        Self::new(MatchParams::default(), DEFAULT_MIN_ORDER_CELL_CAPACITY)
    }
}

impl OrderValidator {
    pub fn new(params: MatchParams, min_order_cell_capacity: u128) -> Self {
        Self {
            params,
            min_order_cell_capacity,
        }
    }

    /// Check whether a cell is a live, fillable order
    pub fn validate(&self, cell: &LiveCell) -> bool {
        self.check(cell).is_ok()
    }

    /// Decode and check a cell, returning the order or the rejection reason
    ///
    /// # Errors
    ///
    /// * `Malformed` - payload width or side tag is wrong
    /// * `Unfillable` - balances cannot cover the order
    pub fn check(&self, cell: &LiveCell) -> Result<Order, OrderError> {
        let result = self.check_inner(cell);
        if let Err(err) = &result {
            debug!("rejected cell {}: {}", cell.out_point, err);
        }
        result
    }

    /// Keep only the fillable orders among `cells`
    pub fn filter_orders<'a>(&self, cells: impl IntoIterator<Item = &'a LiveCell>) -> Vec<Order> {
        cells
            .into_iter()
            .filter_map(|cell| self.check(cell).ok())
            .collect()
    }

    fn check_inner(&self, cell: &LiveCell) -> Result<Order, OrderError> {
        let (sudt_amount, order_amount, price, side) = codec::decode(&cell.data)?;

        if price == 0 {
            return Err(OrderError::unfillable("zero price"));
        }
        if order_amount == 0 {
            return Err(OrderError::unfillable("no remaining demand"));
        }
        if order_amount.checked_mul(self.params.shannons_scale).is_none() {
            return Err(OrderError::unfillable("order amount overflows settlement arithmetic"));
        }

        match side {
            Side::Bid => self.check_bid(cell.capacity, order_amount, price)?,
            Side::Ask => self.check_ask(sudt_amount, order_amount, price)?,
        }

        Ok(Order::new(
            cell.out_point.clone(),
            side,
            price,
            cell.lock.clone(),
            cell.type_script.clone(),
            OrderState::new(cell.capacity, sudt_amount, order_amount),
        ))
    }

    fn check_bid(&self, capacity: u128, order_amount: u128, price: u64) -> Result<(), OrderError> {
        let cost = order_amount
            .checked_mul(price as u128)
            .and_then(|v| v.checked_div(self.params.price_scale))
            .ok_or_else(|| OrderError::unfillable("bid cost overflows"))?;

        if cost == 0 {
            return Err(OrderError::unfillable("bid cost rounds to zero"));
        }

        let required = cost
            .checked_add(fee(cost))
            .ok_or_else(|| OrderError::unfillable("bid cost overflows"))?;
        let margin = capacity
            .checked_sub(self.min_order_cell_capacity)
            .ok_or_else(|| OrderError::unfillable("capacity below minimum cell size"))?;

        if required > margin {
            return Err(OrderError::unfillable(format!(
                "bid needs {} capacity, margin is {}",
                required, margin
            )));
        }
        Ok(())
    }

    fn check_ask(&self, sudt_amount: u128, order_amount: u128, price: u64) -> Result<(), OrderError> {
        let cost = order_amount
            .checked_mul(self.params.price_scale)
            .map(|v| v / price as u128)
            .ok_or_else(|| OrderError::unfillable("ask cost overflows"))?;

        if cost == 0 {
            return Err(OrderError::unfillable("ask cost rounds to zero"));
        }

        let required = cost
            .checked_add(fee(cost))
            .ok_or_else(|| OrderError::unfillable("ask cost overflows"))?;

        if required > sudt_amount {
            return Err(OrderError::unfillable(format!(
                "ask needs {} tokens, holds {}",
                required, sudt_amount
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
