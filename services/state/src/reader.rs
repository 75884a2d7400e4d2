//! Read-side ledger collaborator.
//!
//! Every method maps to one on-ledger view function and returns raw
//! integers or booleans. Each call reflects a consistent snapshot of its
//! own queried field only; callers must not assume ordering across calls.

use async_trait::async_trait;
use pulse_amm::PoolSnapshot;
use pulse_rewards::Poll;
use pulse_staking::StakePosition;
use thiserror::Error;
use types::{AccountAddress, PollId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("ledger view call failed: {reason}")]
    Network { reason: String },

    #[error("ledger returned malformed data: {reason}")]
    Malformed { reason: String },
}

/// View-function access to the ledger.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    async fn pool_info(&self) -> Result<PoolSnapshot, ReadError>;

    async fn lp_shares(&self, owner: AccountAddress) -> Result<u64, ReadError>;

    async fn staked_amount(&self, owner: AccountAddress) -> Result<u64, ReadError>;

    async fn positions_count(&self, owner: AccountAddress) -> Result<u64, ReadError>;

    async fn position(
        &self,
        owner: AccountAddress,
        index: u64,
    ) -> Result<StakePosition, ReadError>;

    async fn pool_total_staked(&self) -> Result<u64, ReadError>;

    async fn stakers_count(&self) -> Result<u64, ReadError>;

    async fn staking_initialized(&self) -> Result<bool, ReadError>;

    async fn poll_count(&self) -> Result<u64, ReadError>;

    /// `None` when the id is past the current poll count.
    async fn poll(&self, id: PollId) -> Result<Option<Poll>, ReadError>;

    async fn has_voted(&self, id: PollId, voter: AccountAddress) -> Result<bool, ReadError>;

    async fn has_claimed(&self, id: PollId, claimer: AccountAddress)
        -> Result<bool, ReadError>;
}
