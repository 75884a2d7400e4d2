//! Per-poll payout math for the two distribution regimes.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use types::{AccountAddress, PollId};

/// How a poll's reward pool reaches the voters.
///
/// Push settles the whole pool in one ledger transaction at close time;
/// pull lets each voter claim individually afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum DistributionMode {
    Pull = 0,
    Push = 1,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PollDataError {
    #[error("poll {poll}: claimer {claimer} is not a voter")]
    ClaimedNotVoter {
        poll: PollId,
        claimer: AccountAddress,
    },

    #[error("poll {poll}: committed rewards {committed} exceed pool {reward_pool}")]
    OverCommitted {
        poll: PollId,
        committed: u128,
        reward_pool: u64,
    },
}

/// A poll's reward-relevant fields as fetched from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    pub reward_pool: u64,
    /// Fixed per-vote payout; zero selects equal-split mode.
    pub reward_per_vote: u64,
    pub voters: Vec<AccountAddress>,
    pub claimed: Vec<AccountAddress>,
    /// Set when the pool was pushed out in full at close time.
    pub rewards_distributed: bool,
}

impl Poll {
    pub fn mode(&self) -> DistributionMode {
        if self.rewards_distributed {
            DistributionMode::Push
        } else {
            DistributionMode::Pull
        }
    }

    /// What one voter receives. A fixed `reward_per_vote` wins; otherwise
    /// the pool splits equally with the remainder floored away. The floor
    /// matches the ledger: dust stays in the pool and is never paid out.
    pub fn per_voter_reward(&self) -> u64 {
        if self.reward_per_vote > 0 {
            return self.reward_per_vote;
        }
        match self.voters.len() as u64 {
            0 => 0,
            n => self.reward_pool / n,
        }
    }

    /// Total already paid out. Push mode settled the whole pool at once;
    /// pull mode counts only completed claims.
    pub fn distributed_total(&self) -> u64 {
        match self.mode() {
            DistributionMode::Push => self.reward_pool,
            DistributionMode::Pull => self
                .per_voter_reward()
                .saturating_mul(self.claimed.len() as u64),
        }
    }

    /// Cross-field checks on fetched poll data. The math functions above
    /// stay total over whatever the ledger returns; this is where
    /// inconsistent data gets surfaced instead of silently absorbed.
    pub fn validate(&self) -> Result<(), PollDataError> {
        for claimer in &self.claimed {
            if !self.voters.contains(claimer) {
                return Err(PollDataError::ClaimedNotVoter {
                    poll: self.id,
                    claimer: *claimer,
                });
            }
        }
        if self.mode() == DistributionMode::Pull {
            let committed =
                self.per_voter_reward() as u128 * self.voters.len() as u128;
            if committed > self.reward_pool as u128 {
                warn!(
                    poll = %self.id,
                    committed,
                    reward_pool = self.reward_pool,
                    "poll commits more rewards than its pool holds"
                );
                return Err(PollDataError::OverCommitted {
                    poll: self.id,
                    committed,
                    reward_pool: self.reward_pool,
                });
            }
        }
        Ok(())
    }
}

/// Platform-wide distributed total. Empty input sums to zero and polls
/// without voters contribute zero rather than failing.
pub fn aggregate(polls: &[Poll]) -> u64 {
    polls
        .iter()
        .fold(0u64, |acc, p| acc.saturating_add(p.distributed_total()))
}
