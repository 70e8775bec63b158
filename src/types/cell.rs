//! Ledger cell types: outpoints, scripts, live cells and the operator cell.
//!
//! `OutPoint` doubles as the order id. It is a fixed-size SSZ container so
//! it can be embedded directly into the transaction encoding.

use std::fmt;

use ssz_rs::prelude::*;

/// Reference to a ledger output: transaction hash + output index.
///
/// Globally unique and immutable; used to identify orders and to
/// deduplicate transaction inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, SimpleSerialize)]
pub struct OutPoint {
    pub tx_hash: [u8; 32],
    pub index: u32,
}

impl OutPoint {
    pub fn new(tx_hash: [u8; 32], index: u32) -> Self {
        Self { tx_hash, index }
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}:{}", hex::encode(self.tx_hash), self.index)
    }
}

/// Ownership or type script. Opaque to the kernel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Script {
    pub code_hash: [u8; 32],
    pub hash_type: u8,
    pub args: Vec<u8>,
}

impl Script {
    pub fn new(code_hash: [u8; 32], hash_type: u8, args: Vec<u8>) -> Self {
        Self {
            code_hash,
            hash_type,
            args,
        }
    }
}

/// A live cell as delivered by the external indexer.
///
/// `data` carries the raw order payload; the validator decides whether it
/// is a fillable order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveCell {
    pub out_point: OutPoint,
    /// Base-asset balance (shannons)
    pub capacity: u128,
    pub lock: Script,
    pub type_script: Script,
    pub data: Vec<u8>,
}

impl LiveCell {
    pub fn new(
        out_point: OutPoint,
        capacity: u128,
        lock: Script,
        type_script: Script,
        data: Vec<u8>,
    ) -> Self {
        Self {
            out_point,
            capacity,
            lock,
            type_script,
            data,
        }
    }
}

/// Snapshot of the operator's own cell.
///
/// Seeds each round, collects the fees, and pays the transaction byte fee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorCell {
    pub out_point: OutPoint,
    pub capacity: u128,
    pub token_amount: u128,
    pub lock: Script,
    pub type_script: Script,
}

impl OperatorCell {
    pub fn new(
        out_point: OutPoint,
        capacity: u128,
        token_amount: u128,
        lock: Script,
        type_script: Script,
    ) -> Self {
        Self {
            out_point,
            capacity,
            token_amount,
            lock,
            type_script,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_point_ssz_size() {
        let op = OutPoint::new([0xAB; 32], 5);
        let bytes = ssz_rs::serialize(&op).expect("Failed to serialize");

        // 32-byte hash + 4-byte index
        assert_eq!(bytes.len(), 36);
        assert_eq!(&bytes[32..], &5u32.to_le_bytes());
    }

    #[test]
    fn test_out_point_display() {
        let op = OutPoint::new([0u8; 32], 1);
        let s = op.to_string();
        assert!(s.starts_with("0x0000"));
        assert!(s.ends_with(":1"));
    }

    #[test]
    fn test_out_point_ordering() {
        let a = OutPoint::new([1u8; 32], 0);
        let b = OutPoint::new([1u8; 32], 1);
        let c = OutPoint::new([2u8; 32], 0);
        assert!(a < b);
        assert!(b < c);
    }
}
