//! Order payload carried in the data field of an order cell.
//!
//! ## Layout
//!
//! ```text
//! offset  size  field
//! 0       16    sudt_amount   (u128, little-endian)
//! 16      16    order_amount  (u128, little-endian)
//! 32      8     price         (u64, little-endian)
//! 40      1     side          (0x00 Bid, 0x01 Ask)
//! ```
//!
//! SSZ encodes basic uints as plain little-endian and a fixed-size
//! container as the concatenation of its fields, so the derived encoding is
//! exactly the on-chain layout. Any change to field order breaks
//! settlement.

use ssz_rs::prelude::*;

use crate::error::CodecError;
use crate::types::Side;

/// Encoded width of an order payload in bytes
pub const ORDER_PAYLOAD_LEN: usize = 16 + 16 + 8 + 1;

/// Encoded width of a plain token-cell payload in bytes
pub const TOKEN_AMOUNT_LEN: usize = 16;

const HEX_PREFIX: &str = "0x";

/// Decoded order payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct OrderPayload {
    pub sudt_amount: u128,
    pub order_amount: u128,
    pub price: u64,
    /// Side as u8 (0=Bid, 1=Ask)
    pub side_raw: u8,
}

impl OrderPayload {
    pub fn new(sudt_amount: u128, order_amount: u128, price: u64, side: Side) -> Self {
        Self {
            sudt_amount,
            order_amount,
            price,
            side_raw: side.to_u8(),
        }
    }

    /// Get the order side, failing on an unknown tag
    pub fn side(&self) -> Result<Side, CodecError> {
        Side::from_u8(self.side_raw).ok_or(CodecError::UnknownSide(self.side_raw))
    }
}

/// Encode an order payload into its 41-byte form
///
/// # Example
///
/// ```
/// use cell_dex::codec::{encode, ORDER_PAYLOAD_LEN};
/// use cell_dex::types::Side;
///
/// let bytes = encode(10, 20, 30, Side::Ask);
/// assert_eq!(bytes.len(), ORDER_PAYLOAD_LEN);
/// assert_eq!(bytes[40], 0x01);
/// ```
pub fn encode(sudt_amount: u128, order_amount: u128, price: u64, side: Side) -> Vec<u8> {
    let payload = OrderPayload::new(sudt_amount, order_amount, price, side);
    // A fixed-size container of basic uints always serializes
    ssz_rs::serialize(&payload).unwrap_or_default()
}

/// Decode an order payload
///
/// # Errors
///
/// * `MalformedPayload` - input is not exactly 41 bytes
/// * `UnknownSide` - side tag is neither 0x00 nor 0x01
pub fn decode(bytes: &[u8]) -> Result<(u128, u128, u64, Side), CodecError> {
    let payload = decode_payload(bytes)?;
    let side = payload.side()?;
    Ok((payload.sudt_amount, payload.order_amount, payload.price, side))
}

/// Decode into the payload struct without interpreting the side tag
pub fn decode_payload(bytes: &[u8]) -> Result<OrderPayload, CodecError> {
    if bytes.len() != ORDER_PAYLOAD_LEN {
        return Err(CodecError::MalformedPayload {
            expected: ORDER_PAYLOAD_LEN,
            actual: bytes.len(),
        });
    }

    ssz_rs::deserialize::<OrderPayload>(bytes).map_err(|_| CodecError::MalformedPayload {
        expected: ORDER_PAYLOAD_LEN,
        actual: bytes.len(),
    })
}

/// Encode an order payload as a "0x"-prefixed hex string
pub fn encode_hex(sudt_amount: u128, order_amount: u128, price: u64, side: Side) -> String {
    to_hex(&encode(sudt_amount, order_amount, price, side))
}

/// Decode a "0x"-prefixed hex order payload
///
/// # Example
///
/// ```
/// use cell_dex::codec::{decode_hex, encode_hex};
/// use cell_dex::types::Side;
///
/// let s = encode_hex(1, 2, 3, Side::Bid);
/// assert!(s.starts_with("0x"));
/// assert_eq!(decode_hex(&s).unwrap(), (1, 2, 3, Side::Bid));
/// ```
pub fn decode_hex(s: &str) -> Result<(u128, u128, u64, Side), CodecError> {
    decode(&from_hex(s)?)
}

/// Encode a plain token-cell payload (16-byte little-endian amount)
pub fn encode_token_amount(amount: u128) -> Vec<u8> {
    amount.to_le_bytes().to_vec()
}

/// Decode a plain token-cell payload
pub fn decode_token_amount(bytes: &[u8]) -> Result<u128, CodecError> {
    let raw: [u8; TOKEN_AMOUNT_LEN] = bytes.try_into().map_err(|_| CodecError::MalformedPayload {
        expected: TOKEN_AMOUNT_LEN,
        actual: bytes.len(),
    })?;
    Ok(u128::from_le_bytes(raw))
}

/// "0x"-prefixed lowercase hex
pub fn to_hex(bytes: &[u8]) -> String {
    format!("{}{}", HEX_PREFIX, hex::encode(bytes))
}

/// Parse "0x"-prefixed hex
pub fn from_hex(s: &str) -> Result<Vec<u8>, CodecError> {
    let body = s
        .strip_prefix(HEX_PREFIX)
        .ok_or_else(|| CodecError::InvalidHex(format!("missing 0x prefix: {}", s)))?;
    hex::decode(body).map_err(|e| CodecError::InvalidHex(e.to_string()))
}

// ============================================================================
// Unit Tests
// ============================================================================
