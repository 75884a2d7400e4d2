//! Poll reward accounting
//!
//! ## Purpose
//!
//! Mirrors the on-ledger poll reward rules so the dashboard can show
//! per-voter payouts and remaining pool balances without a round trip.
//! All arithmetic is integer in smallest units; division floors, matching
//! the ledger's own distribution math.
//!
//! ## Integration Points
//!
//! - **Input**: poll records fetched through the state mirror's reader
//! - **Output**: per-voter reward amounts and distributed totals
//! - **Consumers**: the state mirror's poll views and platform aggregates

pub mod poll;

pub use poll::{aggregate, DistributionMode, Poll, PollDataError};
