//! Pool snapshot and swap arithmetic
//!
//! The snapshot is a read-only mirror of one fetch from the ledger. It is
//! rebuilt from fresh raw values after any confirmed write and is never
//! mutated speculatively on the client side.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Scale applied to spot prices so they stay integral until the
/// presentation boundary (`1e8`, matching the contract's view function).
pub const SPOT_PRICE_SCALE: u128 = 100_000_000;

const BPS_DENOMINATOR: u128 = 10_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The pool has no LP shares yet; quoting against it is a configuration
    /// state ("not yet available"), not a transient failure.
    #[error("Pool is not initialized")]
    Uninitialized,

    /// Fee outside 0..=10000 bps means the fetched snapshot is corrupt.
    #[error("Invalid fee: {fee_bps} bps")]
    InvalidFee { fee_bps: u32 },

    /// Intermediate product exceeded 128 bits
    #[error("Arithmetic overflow in pool math")]
    Overflow,
}

/// Which reserve the input amount is swapped against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapDirection {
    PulseToStable,
    StableToPulse,
}

/// Derived, non-persistent swap quote. Recomputed whenever the input amount
/// or the underlying snapshot changes; never stored as ledger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub amount_in: u64,
    pub amount_out: u64,
    /// Always in 0..=10000 for this formula.
    pub price_impact_bps: u32,
}

/// Read-only mirror of the pool's on-chain state at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub reserve_pulse: u64,
    pub reserve_stable: u64,
    pub total_lp_shares: u64,
    pub fee_bps: u32,
}

impl PoolSnapshot {
    /// `total_lp_shares == 0` iff both reserves are zero (uninitialized).
    pub fn is_initialized(&self) -> bool {
        self.total_lp_shares > 0
    }

    /// (reserve_in, reserve_out) for the given direction.
    fn reserves(&self, direction: SwapDirection) -> (u64, u64) {
        match direction {
            SwapDirection::PulseToStable => (self.reserve_pulse, self.reserve_stable),
            SwapDirection::StableToPulse => (self.reserve_stable, self.reserve_pulse),
        }
    }

    fn check_quotable(&self) -> Result<(), PoolError> {
        if !self.is_initialized() {
            return Err(PoolError::Uninitialized);
        }
        if self.reserve_pulse == 0 || self.reserve_stable == 0 {
            // Violates the reserve invariant for an initialized pool.
            warn!(
                reserve_pulse = self.reserve_pulse,
                reserve_stable = self.reserve_stable,
                total_lp_shares = self.total_lp_shares,
                "pool snapshot has zero reserve with outstanding LP shares"
            );
            return Err(PoolError::Uninitialized);
        }
        if self.fee_bps as u128 > BPS_DENOMINATOR {
            return Err(PoolError::InvalidFee {
                fee_bps: self.fee_bps,
            });
        }
        Ok(())
    }

    /// Input amount remaining after the proportional fee:
    /// `amount_in - floor(amount_in * fee_bps / 10000)`.
    fn amount_in_after_fee(&self, amount_in: u64) -> u64 {
        let fee = (amount_in as u128 * self.fee_bps as u128) / BPS_DENOMINATOR;
        amount_in - fee as u64
    }

    /// Exact output amount the ledger's x*y=k formula will produce:
    /// `floor(reserve_out * in_after_fee / (reserve_in + in_after_fee))`.
    ///
    /// Zero input quotes zero output; an uninitialized pool is an error.
    pub fn quote_swap(&self, amount_in: u64, direction: SwapDirection) -> Result<u64, PoolError> {
        self.check_quotable()?;
        if amount_in == 0 {
            return Ok(0);
        }

        let (reserve_in, reserve_out) = self.reserves(direction);
        let in_after_fee = self.amount_in_after_fee(amount_in) as u128;

        let numerator = reserve_out as u128 * in_after_fee;
        let denominator = reserve_in as u128 + in_after_fee;
        // denominator > 0: reserve_in > 0 past check_quotable
        Ok((numerator / denominator) as u64)
    }

    /// Price impact in basis points: `round(10000 * (1 - exec_rate / spot_rate))`.
    ///
    /// Computed from the reserve ratio directly (not the floored output) so
    /// the result mirrors the contract's `get_price_impact` view. Half-up
    /// rounding here is inferred from client call-site math and still needs
    /// validation against the live contract before being treated as
    /// authoritative.
    pub fn price_impact_bps(
        &self,
        amount_in: u64,
        direction: SwapDirection,
    ) -> Result<u32, PoolError> {
        self.check_quotable()?;
        if amount_in == 0 {
            return Ok(0);
        }

        let (reserve_in, _) = self.reserves(direction);
        let in_after_fee = self.amount_in_after_fee(amount_in) as u128;

        // exec/spot = (in_after_fee / amount_in) * (reserve_in / (reserve_in + in_after_fee))
        let denominator = (amount_in as u128)
            .checked_mul(reserve_in as u128 + in_after_fee)
            .ok_or(PoolError::Overflow)?;
        let executed = in_after_fee
            .checked_mul(reserve_in as u128)
            .ok_or(PoolError::Overflow)?;

        Ok(ratio_bps_half_up(denominator - executed, denominator))
    }

    /// Full quote: output amount plus slippage warning.
    pub fn quote(&self, amount_in: u64, direction: SwapDirection) -> Result<Quote, PoolError> {
        Ok(Quote {
            amount_in,
            amount_out: self.quote_swap(amount_in, direction)?,
            price_impact_bps: self.price_impact_bps(amount_in, direction)?,
        })
    }

    /// floor-proportional value of `shares` in both reserves;
    /// `(0, 0)` when the pool has no shares.
    pub fn lp_value(&self, shares: u64) -> (u64, u64) {
        if self.total_lp_shares == 0 {
            return (0, 0);
        }
        let total = self.total_lp_shares as u128;
        let pulse = self.reserve_pulse as u128 * shares as u128 / total;
        let stable = self.reserve_stable as u128 * shares as u128 / total;
        (pulse as u64, stable as u64)
    }

    /// Instantaneous reserve-ratio price scaled by [`SPOT_PRICE_SCALE`].
    ///
    /// `pulse_per_stable = true` quotes PULSE per unit of USDC. Conversion
    /// to a display float happens only at the presentation boundary.
    pub fn spot_price(&self, pulse_per_stable: bool) -> Result<u128, PoolError> {
        self.check_quotable()?;
        let (numerator, denominator) = if pulse_per_stable {
            (self.reserve_pulse, self.reserve_stable)
        } else {
            (self.reserve_stable, self.reserve_pulse)
        };
        Ok(numerator as u128 * SPOT_PRICE_SCALE / denominator as u128)
    }
}

/// `round(10000 * numerator / denominator)` with half-up rounding.
/// Requires `numerator <= denominator`; result is in 0..=10000.
fn ratio_bps_half_up(numerator: u128, denominator: u128) -> u32 {
    let (mut n, mut d) = (numerator, denominator);
    // Drop low bits when the scaled product would not fit 128 bits; the
    // ratio is preserved and this only triggers near u64::MAX reserves.
    while d > u128::MAX / (2 * BPS_DENOMINATOR) {
        n >>= 1;
        d >>= 1;
    }
    ((n * 2 * BPS_DENOMINATOR + d) / (2 * d)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pool(reserve_pulse: u64, reserve_stable: u64, fee_bps: u32) -> PoolSnapshot {
        PoolSnapshot {
            reserve_pulse,
            reserve_stable,
            total_lp_shares: 1_000_000,
            fee_bps,
        }
    }

    #[test]
    fn quote_matches_ledger_formula_exactly() {
        // Reference case: 1M/1M reserves, 30 bps fee, 10_000 in.
        // in_after_fee = 9970, out = floor(1_000_000 * 9970 / 1_009_970) = 9871
        let p = pool(1_000_000, 1_000_000, 30);
        assert_eq!(
            p.quote_swap(10_000, SwapDirection::PulseToStable).unwrap(),
            9_871
        );
    }

    #[test]
    fn zero_input_quotes_zero() {
        let p = pool(1_000_000, 2_000_000, 30);
        assert_eq!(p.quote_swap(0, SwapDirection::PulseToStable).unwrap(), 0);
        assert_eq!(p.price_impact_bps(0, SwapDirection::PulseToStable).unwrap(), 0);
    }

    #[test]
    fn uninitialized_pool_is_an_error() {
        let p = PoolSnapshot {
            reserve_pulse: 0,
            reserve_stable: 0,
            total_lp_shares: 0,
            fee_bps: 30,
        };
        assert_eq!(
            p.quote_swap(1_000, SwapDirection::PulseToStable),
            Err(PoolError::Uninitialized)
        );
        assert_eq!(p.lp_value(500), (0, 0));
    }

    #[test]
    fn invalid_fee_is_rejected() {
        let p = pool(1_000_000, 1_000_000, 10_001);
        assert_eq!(
            p.quote_swap(1_000, SwapDirection::PulseToStable),
            Err(PoolError::InvalidFee { fee_bps: 10_001 })
        );
    }

    #[test]
    fn direction_selects_reserves() {
        let p = pool(2_000_000, 1_000_000, 0);
        // PULSE is twice as plentiful, so 1 PULSE buys ~0.5 USDC and vice versa.
        let out_ps = p.quote_swap(10_000, SwapDirection::PulseToStable).unwrap();
        let out_sp = p.quote_swap(10_000, SwapDirection::StableToPulse).unwrap();
        assert!(out_ps < out_sp);
    }

    #[test]
    fn lp_value_is_floor_proportional() {
        let p = PoolSnapshot {
            reserve_pulse: 1_000_003,
            reserve_stable: 500_001,
            total_lp_shares: 1_000,
            fee_bps: 30,
        };
        let (pulse, stable) = p.lp_value(3);
        assert_eq!(pulse, 1_000_003u64 * 3 / 1_000);
        assert_eq!(stable, 500_001u64 * 3 / 1_000);
    }

    #[test]
    fn spot_price_is_scaled_ratio() {
        let p = pool(3_000_000, 1_000_000, 30);
        assert_eq!(p.spot_price(true).unwrap(), 3 * SPOT_PRICE_SCALE);
        assert_eq!(p.spot_price(false).unwrap(), SPOT_PRICE_SCALE / 3);
    }

    prop_compose! {
        fn arb_pool()(
            reserve_pulse in 1_000_000u64..1_000_000_000_000,
            reserve_stable in 1_000_000u64..1_000_000_000_000,
            fee_bps in 0u32..=100,
        ) -> PoolSnapshot {
            PoolSnapshot { reserve_pulse, reserve_stable, total_lp_shares: 1_000_000, fee_bps }
        }
    }

    proptest! {
        /// Output amount never decreases as the input amount grows.
        #[test]
        fn amount_out_is_monotonic(p in arb_pool(), a in 1u64..1_000_000_000, delta in 1u64..1_000_000) {
            let dir = SwapDirection::PulseToStable;
            let low = p.quote_swap(a, dir).unwrap();
            let high = p.quote_swap(a + delta, dir).unwrap();
            prop_assert!(high >= low);
        }

        /// Price impact is bounded by 10000 bps and non-decreasing in the
        /// input amount (checked with a doubling step so fee-floor jitter
        /// stays below a basis point).
        #[test]
        fn price_impact_is_monotonic_and_bounded(p in arb_pool(), a in 100_000u64..1_000_000_000) {
            let dir = SwapDirection::PulseToStable;
            let low = p.price_impact_bps(a, dir).unwrap();
            let high = p.price_impact_bps(a * 2, dir).unwrap();
            prop_assert!(low <= 10_000);
            prop_assert!(high <= 10_000);
            prop_assert!(high >= low);
        }

        /// Fee-adjusted constant-product invariant never decreases across a
        /// quoted swap.
        #[test]
        fn product_invariant_never_decreases(p in arb_pool(), a in 1u64..1_000_000_000) {
            let dir = SwapDirection::PulseToStable;
            let out = p.quote_swap(a, dir).unwrap();
            let fee = a as u128 * p.fee_bps as u128 / 10_000;
            let in_after_fee = a as u128 - fee;

            let before = p.reserve_pulse as u128 * p.reserve_stable as u128;
            let after = (p.reserve_pulse as u128 + in_after_fee)
                * (p.reserve_stable as u128 - out as u128);
            prop_assert!(after >= before);
        }

        /// Quotes never exceed the opposing reserve.
        #[test]
        fn quote_bounded_by_reserve(p in arb_pool(), a in 1u64..u64::MAX / 2) {
            let out = p.quote_swap(a, SwapDirection::StableToPulse).unwrap();
            prop_assert!(out < p.reserve_pulse);
        }
    }
}
