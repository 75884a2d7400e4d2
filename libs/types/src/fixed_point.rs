//! Fixed-point amount conversion between smallest-unit integers and
//! human-readable decimal strings
//!
//! Token amounts live on the ledger as non-negative integers in the token's
//! smallest unit (octas for 8-decimal tokens, micro-units for 6-decimal
//! ones). This module is the only place those integers are converted to and
//! from decimal form. Display rendering uses pure `u128` integer arithmetic
//! with half-up rounding; parsing goes through `rust_decimal` for exact
//! decimal handling and floors, matching the ledger's own truncation.
//!
//! The conversions are exact inverses for any value whose decimal expansion
//! at `decimals` digits is exact: `to_smallest_unit(to_decimal(u, d), d) == u`.

use crate::errors::AmountError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Largest decimal count we can scale without overflowing intermediates.
/// `rust_decimal` supports 28 fractional digits; every token this layer
/// mirrors uses 6 or 8.
pub const MAX_DECIMALS: u32 = 28;

fn pow10(exp: u32) -> u128 {
    10u128.pow(exp)
}

/// Render `smallest_unit / 10^decimals` with `display_decimals` fractional
/// digits, rounding half-up on the last displayed digit.
///
/// This is the display boundary: no smallest-unit integer is ever shown to a
/// user without passing through here.
pub fn to_display(smallest_unit: u64, decimals: u32, display_decimals: u32) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    let display_decimals = display_decimals.min(MAX_DECIMALS);
    let value = smallest_unit as u128;

    // Rescale to exactly `display_decimals` fractional digits.
    let scaled = if display_decimals >= decimals {
        match value.checked_mul(pow10(display_decimals - decimals)) {
            Some(scaled) => scaled,
            // Requested padding would overflow; fall back to the exact form.
            None => return to_display(smallest_unit, decimals, decimals),
        }
    } else {
        let divisor = pow10(decimals - display_decimals);
        (value + divisor / 2) / divisor
    };

    if display_decimals == 0 {
        return scaled.to_string();
    }

    let unit = pow10(display_decimals);
    format!(
        "{}.{:0width$}",
        scaled / unit,
        scaled % unit,
        width = display_decimals as usize
    )
}

/// Exact decimal value of `smallest_unit / 10^decimals`.
pub fn to_decimal(smallest_unit: u64, decimals: u32) -> Decimal {
    Decimal::from_i128_with_scale(smallest_unit as i128, decimals.min(MAX_DECIMALS))
}

/// Convert a decimal token amount to its smallest-unit integer:
/// `floor(amount * 10^decimals)`.
///
/// Negative amounts are a local precondition violation and fail fast; they
/// are never clamped to zero.
pub fn to_smallest_unit(amount: Decimal, decimals: u32) -> Result<u64, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::UnsupportedDecimals { decimals });
    }
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AmountError::Negative {
            input: amount.to_string(),
        });
    }

    // 10^28 still fits a 96-bit Decimal mantissa, so the scale factor is
    // exact for every supported decimal count. A plain u64 cast would wrap
    // above 10^19.
    let scale = Decimal::from_i128_with_scale(pow10(decimals) as i128, 0);
    let scaled = amount
        .checked_mul(scale)
        .ok_or_else(|| AmountError::Overflow {
            input: amount.to_string(),
        })?;

    scaled.floor().to_u64().ok_or_else(|| AmountError::Overflow {
        input: amount.to_string(),
    })
}

/// Parse a user-entered decimal string into a smallest-unit integer.
pub fn from_display(input: &str, decimals: u32) -> Result<u64, AmountError> {
    let amount = Decimal::from_str(input.trim()).map_err(|_| AmountError::InvalidDecimal {
        input: input.to_string(),
    })?;
    to_smallest_unit(amount, decimals)
}
