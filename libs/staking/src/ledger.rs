//! Per-account position collection and aggregates

use crate::position::{is_permitted_duration, StakePosition};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Partition of an account's stake at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StakingSummary {
    pub total_staked: u64,
    pub locked_amount: u64,
    pub unlockable_amount: u64,
}

/// An account's staking positions in creation order. Index positions are
/// meaningful only as unstake-by-index arguments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StakingLedger {
    positions: Vec<StakePosition>,
}

impl StakingLedger {
    /// Build from freshly fetched positions. Positions with durations
    /// outside the permitted catalog are kept (dropping them would corrupt
    /// the sums) but logged; `anomalies` lists them for the caller.
    pub fn from_positions(positions: Vec<StakePosition>) -> Self {
        for (index, position) in positions.iter().enumerate() {
            if !is_permitted_duration(position.lock_duration) {
                warn!(
                    index,
                    lock_duration = position.lock_duration,
                    "stake position has a duration outside the lock-period catalog"
                );
            }
        }
        Self { positions }
    }

    pub fn positions(&self) -> &[StakePosition] {
        &self.positions
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Indices of positions whose duration is not in the catalog.
    pub fn anomalies(&self) -> Vec<usize> {
        self.positions
            .iter()
            .enumerate()
            .filter(|(_, p)| !is_permitted_duration(p.lock_duration))
            .map(|(i, _)| i)
            .collect()
    }

    /// Sum of all position amounts, independent of lock state.
    pub fn total_staked(&self) -> u64 {
        self.positions
            .iter()
            .fold(0u64, |acc, p| acc.saturating_add(p.amount))
    }

    /// Sum over positions already past their unlock time.
    pub fn unlockable_amount(&self, now: u64) -> u64 {
        self.positions
            .iter()
            .filter(|p| p.is_unlocked(now))
            .fold(0u64, |acc, p| acc.saturating_add(p.amount))
    }

    /// Sum over positions still inside their lock window.
    pub fn locked_amount(&self, now: u64) -> u64 {
        self.positions
            .iter()
            .filter(|p| !p.is_unlocked(now))
            .fold(0u64, |acc, p| acc.saturating_add(p.amount))
    }

    /// All three aggregates in one pass-consistent snapshot.
    pub fn summarize(&self, now: u64) -> StakingSummary {
        StakingSummary {
            total_staked: self.total_staked(),
            locked_amount: self.locked_amount(now),
            unlockable_amount: self.unlockable_amount(now),
        }
    }
}
