//! Write-side ledger collaborator.
//!
//! Entry functions render to `(name, ordered argument strings)` exactly as
//! the ledger expects them. Submission acceptance is not execution success;
//! a submitted transaction must still be confirmed, and a confirmed abort
//! surfaces as a categorized rejection.

use crate::cache::EntityClass;
use async_trait::async_trait;
use thiserror::Error;
use types::{AccountAddress, PollId, TxHash};

/// The closed set of ledger entry points this mirror can drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryFunction {
    SwapPulseToStable { amount_in: u64, min_out: u64 },
    SwapStableToPulse { amount_in: u64, min_out: u64 },
    AddLiquidity { amount_pulse: u64, amount_stable: u64, min_shares: u64 },
    RemoveLiquidity { shares: u64, min_pulse: u64, min_stable: u64 },
    Stake { amount: u64, lock_duration: u64 },
    Unstake { position_index: u64 },
    UnstakeAll,
    Vote { poll: PollId, option_index: u64 },
    ClaimReward { poll: PollId },
    ClosePoll { poll: PollId, distribution_mode: u8 },
    DistributeRewards { poll: PollId },
    FundPoll { poll: PollId, amount: u64 },
}

impl EntryFunction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SwapPulseToStable { .. } => "swap_pulse_to_stable",
            Self::SwapStableToPulse { .. } => "swap_stable_to_pulse",
            Self::AddLiquidity { .. } => "add_liquidity",
            Self::RemoveLiquidity { .. } => "remove_liquidity",
            Self::Stake { .. } => "stake",
            Self::Unstake { .. } => "unstake",
            Self::UnstakeAll => "unstake_all",
            Self::Vote { .. } => "vote",
            Self::ClaimReward { .. } => "claim_reward",
            Self::ClosePoll { .. } => "close_poll",
            Self::DistributeRewards { .. } => "distribute_rewards",
            Self::FundPoll { .. } => "fund_poll",
        }
    }

    /// Arguments in ledger order, rendered as decimal strings.
    pub fn arguments(&self) -> Vec<String> {
        match self {
            Self::SwapPulseToStable { amount_in, min_out }
            | Self::SwapStableToPulse { amount_in, min_out } => {
                vec![amount_in.to_string(), min_out.to_string()]
            }
            Self::AddLiquidity { amount_pulse, amount_stable, min_shares } => vec![
                amount_pulse.to_string(),
                amount_stable.to_string(),
                min_shares.to_string(),
            ],
            Self::RemoveLiquidity { shares, min_pulse, min_stable } => vec![
                shares.to_string(),
                min_pulse.to_string(),
                min_stable.to_string(),
            ],
            Self::Stake { amount, lock_duration } => {
                vec![amount.to_string(), lock_duration.to_string()]
            }
            Self::Unstake { position_index } => vec![position_index.to_string()],
            Self::UnstakeAll => vec![],
            Self::Vote { poll, option_index } => {
                vec![poll.0.to_string(), option_index.to_string()]
            }
            Self::ClaimReward { poll } | Self::DistributeRewards { poll } => {
                vec![poll.0.to_string()]
            }
            Self::ClosePoll { poll, distribution_mode } => {
                vec![poll.0.to_string(), distribution_mode.to_string()]
            }
            Self::FundPoll { poll, amount } => {
                vec![poll.0.to_string(), amount.to_string()]
            }
        }
    }

    /// The entity classes whose cached state this entry function can change
    /// once it executes. `actor` scopes staking invalidation to the signer.
    pub fn touched_classes(&self, actor: AccountAddress) -> Vec<EntityClass> {
        match self {
            Self::SwapPulseToStable { .. }
            | Self::SwapStableToPulse { .. }
            | Self::AddLiquidity { .. }
            | Self::RemoveLiquidity { .. } => vec![EntityClass::Pool],
            Self::Stake { .. } | Self::Unstake { .. } | Self::UnstakeAll => {
                vec![EntityClass::Staking(actor)]
            }
            Self::Vote { .. }
            | Self::ClaimReward { .. }
            | Self::ClosePoll { .. }
            | Self::DistributeRewards { .. }
            | Self::FundPoll { .. } => {
                vec![EntityClass::Polls, EntityClass::PlatformStats]
            }
        }
    }
}

/// Why a confirmed transaction aborted, derived from known ledger abort
/// codes. Unrecognized failures fall through to `Other` with the raw
/// message truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionCategory {
    InsufficientFunds,
    AlreadyVoted,
    AlreadyClaimed,
    NotAuthorized,
    PollNotActive,
    PollEnded,
    InvalidOption,
    MaxVotersReached,
    VaultNotInitialized,
    UserRejected,
    Timeout,
    Other { message: String },
}

const RAW_MESSAGE_LIMIT: usize = 200;

impl RejectionCategory {
    /// Classify a raw failure string from the ledger or the signing layer.
    pub fn from_raw(raw: &str) -> Self {
        if raw.contains("E_FA_VAULT_NOT_INITIALIZED") {
            Self::VaultNotInitialized
        } else if raw.contains("E_NOT_AUTHORIZED") {
            Self::NotAuthorized
        } else if raw.contains("E_POLL_NOT_ACTIVE") {
            Self::PollNotActive
        } else if raw.contains("E_ALREADY_VOTED") {
            Self::AlreadyVoted
        } else if raw.contains("E_INVALID_OPTION") {
            Self::InvalidOption
        } else if raw.contains("E_POLL_ENDED") {
            Self::PollEnded
        } else if raw.contains("E_MAX_VOTERS_REACHED") {
            Self::MaxVotersReached
        } else if raw.contains("E_ALREADY_CLAIMED") {
            Self::AlreadyClaimed
        } else if raw.contains("E_INSUFFICIENT_FUNDS")
            || raw.contains("INSUFFICIENT_BALANCE")
            || raw.contains("insufficient balance")
        {
            Self::InsufficientFunds
        } else if raw.contains("rejected") || raw.contains("User rejected") {
            Self::UserRejected
        } else if raw.contains("timeout") || raw.contains("Timeout") {
            Self::Timeout
        } else {
            let message = if raw.len() > RAW_MESSAGE_LIMIT {
                let mut end = RAW_MESSAGE_LIMIT;
                while !raw.is_char_boundary(end) {
                    end -= 1;
                }
                format!("{}...", &raw[..end])
            } else {
                raw.to_string()
            };
            Self::Other { message }
        }
    }
}

impl std::fmt::Display for RejectionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientFunds => write!(f, "insufficient funds"),
            Self::AlreadyVoted => write!(f, "already voted"),
            Self::AlreadyClaimed => write!(f, "reward already claimed"),
            Self::NotAuthorized => write!(f, "not authorized"),
            Self::PollNotActive => write!(f, "poll not active"),
            Self::PollEnded => write!(f, "poll ended"),
            Self::InvalidOption => write!(f, "invalid option"),
            Self::MaxVotersReached => write!(f, "maximum voters reached"),
            Self::VaultNotInitialized => write!(f, "reward vault not initialized"),
            Self::UserRejected => write!(f, "rejected by signer"),
            Self::Timeout => write!(f, "transaction timed out"),
            Self::Other { message } => write!(f, "{message}"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WriteError {
    #[error("submission failed: {reason}")]
    Submission { reason: String },

    #[error("transaction {hash} aborted: {category}")]
    Rejected {
        hash: TxHash,
        category: RejectionCategory,
    },

    #[error("could not confirm transaction {hash}: {reason}")]
    Confirmation { hash: TxHash, reason: String },
}

/// Transaction submission to the ledger. Implementations sign elsewhere;
/// this layer only sees the accepted hash and the confirmation outcome.
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    async fn submit(
        &self,
        actor: AccountAddress,
        entry: &EntryFunction,
    ) -> Result<TxHash, WriteError>;

    async fn confirm(&self, hash: &TxHash) -> Result<(), WriteError>;
}
