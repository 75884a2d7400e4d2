//! Stake positions and the lock-duration catalog

use serde::{Deserialize, Serialize};

/// A permitted lock duration. The catalog is closed: these values must
/// match the contract's constants exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockPeriod {
    pub days: u32,
    pub seconds: u64,
    pub label: &'static str,
}

/// Lock durations the contract accepts.
pub const LOCK_PERIODS: [LockPeriod; 7] = [
    LockPeriod { days: 7, seconds: 604_800, label: "7 days" },
    LockPeriod { days: 14, seconds: 1_209_600, label: "14 days" },
    LockPeriod { days: 21, seconds: 1_814_400, label: "21 days" },
    LockPeriod { days: 30, seconds: 2_592_000, label: "30 days" },
    LockPeriod { days: 90, seconds: 7_776_000, label: "90 days" },
    LockPeriod { days: 180, seconds: 15_552_000, label: "180 days" },
    LockPeriod { days: 365, seconds: 31_536_000, label: "1 year" },
];

/// Whether `seconds` is one of the catalog durations. A fetched position
/// with any other duration is a data anomaly.
pub fn is_permitted_duration(seconds: u64) -> bool {
    LOCK_PERIODS.iter().any(|p| p.seconds == seconds)
}

/// One time-locked position, immutable once created on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePosition {
    /// Staked amount in smallest units
    pub amount: u64,
    /// Unix seconds at creation
    pub staked_at: u64,
    /// Lock duration in seconds
    pub lock_duration: u64,
    /// `staked_at + lock_duration`
    pub unlock_at: u64,
}

impl StakePosition {
    pub fn new(amount: u64, staked_at: u64, lock_duration: u64) -> Self {
        Self {
            amount,
            staked_at,
            lock_duration,
            unlock_at: staked_at.saturating_add(lock_duration),
        }
    }

    /// The unlock boundary is inclusive: a position unlocks exactly at
    /// `unlock_at`, not one second after.
    pub fn is_unlocked(&self, now: u64) -> bool {
        now >= self.unlock_at
    }
}
