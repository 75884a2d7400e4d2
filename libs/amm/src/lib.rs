//! # PULSE/USDC Constant-Product Pool Math
//!
//! ## Purpose
//!
//! Exact mirror of the on-chain AMM arithmetic: swap quoting, price impact,
//! liquidity-position valuation, and add/remove-liquidity share math for a
//! two-reserve constant-product pool with a basis-point fee taken off the
//! input. Every operation here is a pure function over a fetched
//! [`PoolSnapshot`]; quotes are estimates of what the ledger will compute
//! and are never a substitute for confirmed settlement amounts.
//!
//! ## Integration Points
//!
//! - **Input Sources**: raw pool reserves and LP shares fetched by the
//!   state reconciler's view calls
//! - **Output Destinations**: quote views and dashboard valuations, rendered
//!   through `types::fixed_point` at the display boundary
//! - **Precision**: all domain math is integer (`u64` values, `u128`
//!   intermediates) with floor division matching the contract; rounding to
//!   basis points is half-up
//!
//! A quoted value that diverges from the ledger's own formula is a
//! correctness bug with financial consequences, so the floor/rounding rules
//! in this crate are load-bearing, not stylistic.

pub mod liquidity;
pub mod pool;

pub use liquidity::{quote_add_liquidity, quote_remove_liquidity};
pub use pool::{PoolError, PoolSnapshot, Quote, SwapDirection, SPOT_PRICE_SCALE};
