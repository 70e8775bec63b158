//! Deal record for a submitted settlement.
//!
//! A deal ties an assembled transaction to the orders it consumes. The
//! external storage layer marks those orders pending while the deal is
//! `Pending`, and releases them once it turns `Failed`.

use crate::engine::MatchOutcome;
use crate::error::AssemblyError;
use crate::types::{OutPoint, RawTransaction};

/// Time after which an unconfirmed deal is considered failed: 10 minutes
pub const DEAL_TIMEOUT_MS: u64 = 10 * 60 * 1000;

/// Settlement status of a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DealStatus {
    /// Submitted, awaiting confirmation
    #[default]
    Pending,
    /// Confirmed on the ledger
    Done,
    /// Rejected or timed out; never retried
    Failed,
}

/// Summary of one settlement transaction.
///
/// ## Example
///
/// ```
/// use cell_dex::types::{Deal, DealStatus, DEAL_TIMEOUT_MS};
///
/// let mut deal = Deal::new([0xAB; 32], vec![], 0, 0, 1_000);
/// assert_eq!(deal.status, DealStatus::Pending);
///
/// deal.reconcile(1_000 + DEAL_TIMEOUT_MS);
/// assert_eq!(deal.status, DealStatus::Failed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deal {
    /// SHA-256 of the transaction encoding
    pub tx_hash: [u8; 32],

    /// Order cells spent by the transaction
    pub order_ids: Vec<OutPoint>,

    /// Capacity collected by the operator, before the byte fee
    pub operator_capacity_fee: u128,

    /// Tokens collected by the operator
    pub operator_token_fee: u128,

    pub status: DealStatus,

    /// Creation time in milliseconds
    pub created_at_ms: u64,
}

impl Deal {
    pub fn new(
        tx_hash: [u8; 32],
        order_ids: Vec<OutPoint>,
        operator_capacity_fee: u128,
        operator_token_fee: u128,
        created_at_ms: u64,
    ) -> Self {
        Self {
            tx_hash,
            order_ids,
            operator_capacity_fee,
            operator_token_fee,
            status: DealStatus::Pending,
            created_at_ms,
        }
    }

    /// Record a pending deal for an assembled transaction
    pub fn pending(
        tx: &RawTransaction,
        outcome: &MatchOutcome,
        now_ms: u64,
    ) -> Result<Self, AssemblyError> {
        Ok(Self::new(
            tx.hash()?,
            outcome.consumed_order_ids(),
            outcome.operator_capacity_fee,
            outcome.operator_token_fee,
            now_ms,
        ))
    }

    /// Get the transaction hash as a "0x"-prefixed hex string
    pub fn tx_hash_hex(&self) -> String {
        format!("0x{}", hex::encode(self.tx_hash))
    }

    pub fn mark_done(&mut self) {
        self.status = DealStatus::Done;
    }

    pub fn mark_failed(&mut self) {
        self.status = DealStatus::Failed;
    }

    /// Check whether a pending deal has outlived the timeout
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.status == DealStatus::Pending
            && now_ms.saturating_sub(self.created_at_ms) >= DEAL_TIMEOUT_MS
    }

    /// Fail a pending deal that has timed out
    ///
    /// Returns `true` if the status changed.
    pub fn reconcile(&mut self, now_ms: u64) -> bool {
        if self.is_expired(now_ms) {
            self.status = DealStatus::Failed;
            true
        } else {
            false
        }
    }

    /// Check if the deal's orders may be matched again
    pub fn releases_orders(&self) -> bool {
        self.status == DealStatus::Failed
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
