//! Error types for the matching kernel.
//!
//! Every failure here is local and recoverable. Nothing in the kernel is
//! fatal to the operator process; callers decide whether to skip a cell,
//! drop a round, or fix their configuration.

use thiserror::Error;

/// Top-level error for callers that drive a whole round.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DexError {
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Order payload decoding failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Malformed payload: expected {expected} bytes, got {actual}")]
    MalformedPayload { expected: usize, actual: usize },

    #[error("Unknown side tag: {0:#04x}")]
    UnknownSide(u8),

    #[error("Invalid hex payload: {0}")]
    InvalidHex(String),
}

/// Reasons a live cell is not accepted as a fillable order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("Malformed order cell: {0}")]
    Malformed(#[from] CodecError),

    #[error("Unfillable order: {reason}")]
    Unfillable { reason: String },
}

impl OrderError {
    pub(crate) fn unfillable(reason: impl Into<String>) -> Self {
        OrderError::Unfillable {
            reason: reason.into(),
        }
    }
}

/// Transaction assembly failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("Operator capacity {available} cannot cover byte fee {byte_fee}")]
    InsufficientOperatorCapacity { available: u128, byte_fee: u128 },

    #[error("Too many {what}: {count} exceeds limit {limit}")]
    TooManyCells {
        what: &'static str,
        count: usize,
        limit: usize,
    },

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

/// Deployment configuration failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid cell dep hash {hash}: {reason}")]
    InvalidHash { hash: String, reason: String },

    #[error("Invalid scale: {0}")]
    InvalidScale(String),
}
