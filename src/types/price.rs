//! Fixed-point price and capacity utilities.
//!
//! ## Overview
//!
//! Prices are quote-per-base rates stored as `u64` scaled by `PRICE_SCALE`
//! (10^10 by default). Capacities are `u128` shannons, 10^8 per CKB.
//!
//! These helpers convert between human-readable decimals and the fixed-point
//! integers used everywhere else. They are for configuration and display
//! only; the matching arithmetic never touches `Decimal`.
//!
//! ## Examples
//!
//! ```
//! use cell_dex::types::price::{to_fixed_price, from_fixed_price};
//!
//! let price = to_fixed_price("9", 10_000_000_000).unwrap();
//! assert_eq!(price, 90_000_000_000);
//! assert_eq!(from_fixed_price(price, 10_000_000_000), "9");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Default price scale: 10^10
pub const DEFAULT_PRICE_SCALE: u128 = 10_000_000_000;

/// Shannons per CKB: 10^8
pub const SHANNONS_PER_CKB: u128 = 100_000_000;

/// Decimal places used when rendering capacities
const CKB_DECIMALS: u32 = 8;

// ============================================================================
// Conversion Functions
// ============================================================================

/// Parse a decimal string into a fixed-point price
///
/// # Returns
///
/// * `Some(u64)` - The fixed-point representation
/// * `None` - If parsing fails, the value is negative, or out of range
///
/// # Example
///
/// ```
/// use cell_dex::types::price::to_fixed_price;
///
/// assert_eq!(to_fixed_price("1", 10_000_000_000), Some(10_000_000_000));
/// assert_eq!(to_fixed_price("0.0000000001", 10_000_000_000), Some(1));
/// assert_eq!(to_fixed_price("-1", 10_000_000_000), None);
/// ```
pub fn to_fixed_price(s: &str, price_scale: u128) -> Option<u64> {
    let decimal = Decimal::from_str(s).ok()?;
    decimal_to_fixed(decimal, price_scale)
}

/// Convert a Decimal to fixed-point u64
pub fn decimal_to_fixed(d: Decimal, price_scale: u128) -> Option<u64> {
    if d.is_sign_negative() {
        return None;
    }

    let scale = Decimal::from_u128(price_scale)?;
    let scaled = d.checked_mul(scale)?;
    scaled.round_dp(0).to_u64()
}

/// Render a fixed-point price with trailing zeros trimmed
///
/// # Example
///
/// ```
/// use cell_dex::types::price::from_fixed_price;
///
/// assert_eq!(from_fixed_price(95_000_000_000, 10_000_000_000), "9.5");
/// ```
pub fn from_fixed_price(price: u64, price_scale: u128) -> String {
    match Decimal::from_u128(price_scale) {
        Some(scale) if !scale.is_zero() => {
            format!("{}", (Decimal::from(price) / scale).normalize())
        }
        _ => price.to_string(),
    }
}

/// Render a shannon amount as CKB with 8 decimal places
///
/// Amounts too wide for `Decimal` fall back to the raw integer.
///
/// # Example
///
/// ```
/// use cell_dex::types::price::format_ckb;
///
/// assert_eq!(format_ckb(270_000_000), "2.70000000");
/// ```
pub fn format_ckb(shannons: u128) -> String {
    i128::try_from(shannons)
        .ok()
        .and_then(|v| Decimal::try_from_i128_with_scale(v, CKB_DECIMALS).ok())
        .map(|d| format!("{:.8}", d))
        .unwrap_or_else(|| shannons.to_string())
}

// ============================================================================
// Unit Tests
// ============================================================================
