//! Transaction assembler: turns a matching outcome into an unsigned
//! settlement transaction.
//!
//! ## Layout
//!
//! ```text
//! inputs:    [operator cell] ++ [each distinct matched order cell]
//! outputs:   [operator cell] ++ [each matched order, post-trade]
//! data:      [token amount]  ++ [41-byte order payload per order]
//! witnesses: one empty placeholder per input
//! ```
//!
//! The operator output collects both fee totals and pays the byte fee.
//! Output capacities are fixed-width, so the size measured before the byte
//! fee is deducted is the final size.

use log::debug;

use crate::codec;
use crate::engine::MatchOutcome;
use crate::error::AssemblyError;
use crate::types::{CellDep, CellInput, CellOutput, OperatorCell, RawTransaction};

/// Default fee rate: 1 shannon per serialized byte
pub const DEFAULT_FEE_RATE_PER_BYTE: u128 = 1;

/// Builds settlement transactions against a fixed dependency set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionAssembler {
    cell_deps: Vec<CellDep>,
    fee_rate_per_byte: u128,
}

impl TransactionAssembler {
    pub fn new(cell_deps: Vec<CellDep>, fee_rate_per_byte: u128) -> Self {
        Self {
            cell_deps,
            fee_rate_per_byte,
        }
    }

    #[inline]
    pub fn cell_deps(&self) -> &[CellDep] {
        &self.cell_deps
    }

    #[inline]
    pub fn fee_rate_per_byte(&self) -> u128 {
        self.fee_rate_per_byte
    }

    /// Byte fee for a transaction at this assembler's rate
    pub fn byte_fee(&self, tx: &RawTransaction) -> Result<u128, AssemblyError> {
        let size = tx.serialized_size()? as u128;
        Ok(size.saturating_mul(self.fee_rate_per_byte))
    }

    /// Build the settlement transaction for a matching outcome
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - nothing was matched; there is nothing to submit
    /// * `Ok(Some(tx))` - the unsigned transaction
    ///
    /// # Errors
    ///
    /// * `InsufficientOperatorCapacity` - the byte fee exceeds the operator
    ///   cell's capacity plus collected fees
    /// * `TooManyCells` - the outcome does not fit in one transaction
    pub fn build(
        &self,
        outcome: &MatchOutcome,
        operator: &OperatorCell,
    ) -> Result<Option<RawTransaction>, AssemblyError> {
        if outcome.matched_orders.is_empty() {
            debug!("no matched orders, skipping transaction assembly");
            return Ok(None);
        }

        let inputs: Vec<CellInput> = std::iter::once(operator.out_point.clone())
            .chain(outcome.consumed_order_ids())
            .map(CellInput::new)
            .collect();
        let witnesses = vec![Vec::new(); inputs.len()];

        let mut outputs_data = Vec::with_capacity(outcome.matched_orders.len() + 1);
        outputs_data.push(codec::encode_token_amount(
            operator.token_amount.saturating_add(outcome.operator_token_fee),
        ));

        let mut order_outputs = Vec::with_capacity(outcome.matched_orders.len());
        for order in &outcome.matched_orders {
            order_outputs.push(CellOutput::new(
                order.state.capacity,
                &order.lock,
                &order.type_script,
            )?);
            outputs_data.push(codec::encode(
                order.state.sudt_amount,
                order.state.order_amount,
                order.price,
                order.side,
            ));
        }

        let collected = operator
            .capacity
            .saturating_add(outcome.operator_capacity_fee);

        // Measure with the pre-fee capacity; the width is the same either way
        let draft = self.pack(operator, collected, &order_outputs, &inputs, &outputs_data, &witnesses)?;
        let byte_fee = self.byte_fee(&draft)?;

        let operator_capacity = collected.checked_sub(byte_fee).ok_or(
            AssemblyError::InsufficientOperatorCapacity {
                available: collected,
                byte_fee,
            },
        )?;

        let tx = self.pack(
            operator,
            operator_capacity,
            &order_outputs,
            &inputs,
            &outputs_data,
            &witnesses,
        )?;

        debug!(
            "assembled settlement: {} inputs, {} outputs, byte fee {}",
            tx.inputs.len(),
            tx.outputs.len(),
            byte_fee
        );

        Ok(Some(tx))
    }

    fn pack(
        &self,
        operator: &OperatorCell,
        operator_capacity: u128,
        order_outputs: &[CellOutput],
        inputs: &[CellInput],
        outputs_data: &[Vec<u8>],
        witnesses: &[Vec<u8>],
    ) -> Result<RawTransaction, AssemblyError> {
        let mut outputs = Vec::with_capacity(order_outputs.len() + 1);
        outputs.push(CellOutput::new(
            operator_capacity,
            &operator.lock,
            &operator.type_script,
        )?);
        outputs.extend_from_slice(order_outputs);

        RawTransaction::pack(
            self.cell_deps.clone(),
            inputs.to_vec(),
            outputs,
            outputs_data.to_vec(),
            witnesses.to_vec(),
        )
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
