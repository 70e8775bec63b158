//! Binary codec for the order payload stored in order cells.
//!
//! The byte layout is fixed by the on-chain script: 41 bytes, all integers
//! little-endian. See [`payload`] for the table.
//!
//! ## Example
//!
//! ```
//! use cell_dex::codec::{decode, encode};
//! use cell_dex::types::Side;
//!
//! let bytes = encode(10_000_000_000, 90_000_000_000, 90_000_000_000, Side::Ask);
//! let (sudt, amount, price, side) = decode(&bytes).unwrap();
//!
//! assert_eq!(sudt, 10_000_000_000);
//! assert_eq!(amount, 90_000_000_000);
//! assert_eq!(price, 90_000_000_000);
//! assert_eq!(side, Side::Ask);
//! ```

pub mod payload;

pub use payload::{
    decode, decode_hex, decode_payload, decode_token_amount, encode, encode_hex,
    encode_token_amount, from_hex, to_hex, OrderPayload, ORDER_PAYLOAD_LEN, TOKEN_AMOUNT_LEN,
};
