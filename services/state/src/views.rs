//! Display-boundary view structs.
//!
//! Raw smallest-unit integers travel alongside their formatted strings so
//! consumers never reformat. All formatting funnels through
//! `types::fixed_point`; nothing here does float math.

use pulse_amm::{PoolSnapshot, Quote, SwapDirection};
use pulse_staking::StakePosition;
use rust_decimal::Decimal;
use serde::Serialize;
use types::{to_decimal, Coin};

#[derive(Debug, Clone, Serialize)]
pub struct PoolView {
    pub reserve_pulse: u64,
    pub reserve_stable: u64,
    pub total_lp_shares: u64,
    pub fee_bps: u32,
    pub reserve_pulse_display: String,
    pub reserve_stable_display: String,
}

impl PoolView {
    pub fn from_snapshot(snapshot: &PoolSnapshot) -> Self {
        Self {
            reserve_pulse: snapshot.reserve_pulse,
            reserve_stable: snapshot.reserve_stable,
            total_lp_shares: snapshot.total_lp_shares,
            fee_bps: snapshot.fee_bps,
            reserve_pulse_display: Coin::Pulse.format(snapshot.reserve_pulse),
            reserve_stable_display: Coin::Usdc.format(snapshot.reserve_stable),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteView {
    pub amount_in: u64,
    pub amount_out: u64,
    pub price_impact_bps: u32,
    pub amount_in_display: String,
    pub amount_out_display: String,
    /// Impact as a percentage string with two fractional digits.
    pub price_impact_percent: String,
    /// Output per one unit of input, six fractional digits.
    pub rate: String,
}

impl QuoteView {
    pub fn from_quote(quote: &Quote, direction: SwapDirection) -> Self {
        let (coin_in, coin_out) = match direction {
            SwapDirection::PulseToStable => (Coin::Pulse, Coin::Usdc),
            SwapDirection::StableToPulse => (Coin::Usdc, Coin::Pulse),
        };

        let impact = Decimal::from(quote.price_impact_bps) / Decimal::from(100u32);
        let rate = if quote.amount_in > 0 {
            let amount_in = to_decimal(quote.amount_in, coin_in.decimals());
            let amount_out = to_decimal(quote.amount_out, coin_out.decimals());
            (amount_out / amount_in).round_dp(6)
        } else {
            Decimal::ZERO
        };

        Self {
            amount_in: quote.amount_in,
            amount_out: quote.amount_out,
            price_impact_bps: quote.price_impact_bps,
            amount_in_display: coin_in.format(quote.amount_in),
            amount_out_display: coin_out.format(quote.amount_out),
            price_impact_percent: format!("{:.2}", impact.round_dp(2)),
            rate: format!("{:.6}", rate),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LpPosition {
    pub shares: u64,
    /// Share of the pool as a percentage string, two fractional digits.
    pub pool_share_percent: String,
    pub pulse_value: u64,
    pub stable_value: u64,
    pub pulse_value_display: String,
    pub stable_value_display: String,
}

impl LpPosition {
    pub fn from_shares(snapshot: &PoolSnapshot, shares: u64) -> Self {
        let (pulse_value, stable_value) = snapshot.lp_value(shares);
        let percent = if snapshot.total_lp_shares > 0 {
            let share = Decimal::from(shares) * Decimal::from(100u32)
                / Decimal::from(snapshot.total_lp_shares);
            share.round_dp(2)
        } else {
            Decimal::ZERO
        };
        Self {
            shares,
            pool_share_percent: format!("{:.2}", percent),
            pulse_value,
            stable_value,
            pulse_value_display: Coin::Pulse.format(pulse_value),
            stable_value_display: Coin::Usdc.format(stable_value),
        }
    }

    /// What an account with no shares sees.
    pub fn empty() -> Self {
        Self {
            shares: 0,
            pool_share_percent: "0.00".to_string(),
            pulse_value: 0,
            stable_value: 0,
            pulse_value_display: Coin::Pulse.format(0),
            stable_value_display: Coin::Usdc.format(0),
        }
    }
}

/// One account's staking picture plus platform-wide totals, fetched as a
/// unit so the partition numbers are from the same round of views.
#[derive(Debug, Clone, Serialize)]
pub struct StakingInfo {
    pub total_staked: u64,
    pub positions: Vec<StakePosition>,
    pub unlockable_amount: u64,
    pub locked_amount: u64,
    pub pool_total_staked: u64,
    pub stakers_count: u64,
    pub total_staked_display: String,
}

impl Default for StakingInfo {
    /// The zeroed picture served on a failed fetch. The display string is
    /// still formatted; no consumer ever sees an empty amount.
    fn default() -> Self {
        Self {
            total_staked: 0,
            positions: Vec::new(),
            unlockable_amount: 0,
            locked_amount: 0,
            pool_total_staked: 0,
            stakers_count: 0,
            total_staked_display: Coin::Pulse.format(0),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlatformStats {
    pub polls_created: u64,
    pub total_responses: u64,
    /// Smallest-unit sum of every poll's distributed rewards.
    pub rewards_distributed: u64,
    pub active_users: u64,
    pub rewards_distributed_display: String,
}
