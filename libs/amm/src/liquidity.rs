//! Add/remove-liquidity share math
//!
//! Mirrors the contract's minting rule: the bootstrap deposit mints
//! `isqrt(a * b)` shares; every later deposit mints the floor-proportional
//! minimum of the two sides, so depositing off-ratio forfeits the excess to
//! the pool exactly as the ledger does.

use crate::pool::{PoolError, PoolSnapshot};

/// LP shares the ledger will mint for depositing `amount_pulse` and
/// `amount_stable` into the pool.
pub fn quote_add_liquidity(
    pool: &PoolSnapshot,
    amount_pulse: u64,
    amount_stable: u64,
) -> Result<u64, PoolError> {
    if amount_pulse == 0 || amount_stable == 0 {
        return Ok(0);
    }

    if !pool.is_initialized() {
        // Bootstrap deposit sets the initial price; shares are the
        // geometric mean of the two amounts.
        let product = amount_pulse as u128 * amount_stable as u128;
        return u64::try_from(isqrt(product)).map_err(|_| PoolError::Overflow);
    }

    let total = pool.total_lp_shares as u128;
    let by_pulse = amount_pulse as u128 * total / pool.reserve_pulse as u128;
    let by_stable = amount_stable as u128 * total / pool.reserve_stable as u128;
    u64::try_from(by_pulse.min(by_stable)).map_err(|_| PoolError::Overflow)
}

/// Amounts returned for burning `shares`; identical to the
/// floor-proportional position valuation.
pub fn quote_remove_liquidity(pool: &PoolSnapshot, shares: u64) -> (u64, u64) {
    pool.lp_value(shares)
}

/// Integer square root: largest `r` with `r * r <= value`.
fn isqrt(value: u128) -> u128 {
    if value < 2 {
        return value;
    }
    // Newton's method on integers converges from above.
    let mut x = 1u128 << (value.ilog2() / 2 + 1);
    loop {
        let next = (x + value / x) / 2;
        if next >= x {
            return x;
        }
        x = next;
    }
}
