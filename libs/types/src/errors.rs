//! Error types for amount conversion and identifier validation

use thiserror::Error;

/// Errors that can occur converting between smallest-unit integers and
/// human-readable decimal amounts
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AmountError {
    /// Amounts are never negative in this domain; fail fast, never clamp
    #[error("Negative amount: {input}")]
    Negative { input: String },

    /// Value does not fit the smallest-unit integer representation
    #[error("Overflow: {input} exceeds the representable amount range")]
    Overflow { input: String },

    /// Input string is not a valid decimal number
    #[error("Invalid decimal string: '{input}'")]
    InvalidDecimal { input: String },

    /// Decimal count outside the supported range
    #[error("Unsupported decimal count: {decimals}")]
    UnsupportedDecimals { decimals: u32 },
}

/// Errors that can occur parsing account addresses
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AddressError {
    #[error("Invalid hex in address: '{input}'")]
    InvalidHex { input: String },

    #[error("Address is {got} bytes, expected at most {max}")]
    InvalidLength { got: usize, max: usize },
}
