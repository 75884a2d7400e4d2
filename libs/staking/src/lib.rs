//! # PULSE Staking Ledger
//!
//! Per-account accounting for time-locked staking positions mirrored from
//! the ledger. Positions are immutable once created and consumed whole by an
//! unstake after their unlock time; this crate only partitions and sums
//! them, it never mutates them.
//!
//! The partition law is the crate's core invariant: for any position set and
//! any `now`, `locked_amount + unlockable_amount == total_staked`. No
//! position is double-counted or dropped, including positions with
//! durations outside the permitted catalog (those are surfaced as
//! anomalies, not discarded).

pub mod ledger;
pub mod position;

pub use ledger::{StakingLedger, StakingSummary};
pub use position::{is_permitted_duration, LockPeriod, StakePosition, LOCK_PERIODS};
