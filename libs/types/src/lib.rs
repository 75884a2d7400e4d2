//! # PULSE Mirror Shared Types
//!
//! Shared type system for the ledger-mirroring computation layer.
//!
//! ## Design Philosophy
//!
//! - **No Precision Loss**: token amounts are stored as integers in the
//!   token's smallest unit; decimal conversion happens only at the
//!   display/parse boundary, via exact `rust_decimal` arithmetic.
//! - **Type Safety**: typed identifiers (`AccountAddress`, `TxHash`,
//!   `PollId`) prevent mixing incompatible values at compile time.
//! - **Clear Boundaries**: every number leaving this layer for presentation
//!   goes through [`fixed_point::to_display`]; raw smallest-unit values are
//!   never shown to a user directly.

pub mod coins;
pub mod errors;
pub mod fixed_point;
pub mod identifiers;

pub use coins::{Coin, DEFAULT_DISPLAY_DECIMALS};
pub use errors::{AddressError, AmountError};
pub use fixed_point::{from_display, to_decimal, to_display, to_smallest_unit};
pub use identifiers::{AccountAddress, PollId, TxHash};
