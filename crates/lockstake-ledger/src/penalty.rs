// crates/lockstake-ledger/src/penalty.rs
//
// Early-withdrawal penalty computation and distribution.
//
// penalty = amount * penalty_rate_bps * weeks_remaining / 10_000, clamped to amount.
//
// The penalty is split three ways, each share rounded down:
//   - Treasury:      TREASURY_SHARE_PERCENT (10%)
//   - Rewards pool:  REWARDS_POOL_SHARE_PERCENT (40%)
//   - Burned:        BURN_SHARE_PERCENT (50%)
//
// The few units lost to rounding are burned too, so that
// burn + treasury + rewards_pool == penalty exactly.

use serde::{Deserialize, Serialize};

use lockstake_core::error::StakingError;

use crate::params::RATE_DENOMINATOR;

/// Share of the penalty sent to the treasury, in percent.
pub const TREASURY_SHARE_PERCENT: u128 = 10;

/// Share of the penalty sent to the rewards pool, in percent.
pub const REWARDS_POOL_SHARE_PERCENT: u128 = 40;

/// Nominal share of the penalty that is burned, in percent.
pub const BURN_SHARE_PERCENT: u128 = 50;

/// How a penalized withdrawal of `amount` is distributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PenaltySplit {
    /// Withdrawn amount (reduction of principal).
    pub amount: u128,
    /// Whole periods left on the lock when the penalty was assessed.
    pub weeks_remaining: u64,
    /// Total value forfeited.
    pub penalty: u128,
    /// Paid out to the withdrawing account: `amount - penalty`.
    pub payout: u128,
    /// Removed from total supply.
    pub burn: u128,
    /// Sent to the treasury address.
    pub treasury: u128,
    /// Sent to the rewards pool address.
    pub rewards_pool: u128,
}

/// Penalty on withdrawing `amount` with `weeks_remaining` periods left.
///
/// # Errors
/// Returns `StakingError::ArithmeticOverflow` only if `amount` is so large
/// that `amount * rate * weeks` cannot be represented before clamping.
pub fn compute_penalty(amount: u128, rate_bps: u32, weeks_remaining: u64) -> Result<u128, StakingError> {
    let factor = (rate_bps as u128)
        .checked_mul(weeks_remaining as u128)
        .ok_or(StakingError::ArithmeticOverflow)?;
    if factor >= RATE_DENOMINATOR {
        return Ok(amount);
    }
    let penalty = amount
        .checked_mul(factor)
        .ok_or(StakingError::ArithmeticOverflow)?
        / RATE_DENOMINATOR;
    Ok(penalty.min(amount))
}

/// Split a withdrawal into payout, burn, treasury and rewards-pool shares.
pub fn split_penalty(amount: u128, rate_bps: u32, weeks_remaining: u64) -> Result<PenaltySplit, StakingError> {
    let penalty = compute_penalty(amount, rate_bps, weeks_remaining)?;
    // penalty <= amount, and amount * 50 only overflows for amounts near u128::MAX.
    let share = |percent: u128| {
        penalty
            .checked_mul(percent)
            .map(|v| v / 100)
            .ok_or(StakingError::ArithmeticOverflow)
    };
    let treasury = share(TREASURY_SHARE_PERCENT)?;
    let rewards_pool = share(REWARDS_POOL_SHARE_PERCENT)?;
    let nominal_burn = share(BURN_SHARE_PERCENT)?;
    // Floors never sum past the penalty.
    let dust = penalty - treasury - rewards_pool - nominal_burn;
    let burn = nominal_burn + dust;

    Ok(PenaltySplit {
        amount,
        weeks_remaining,
        penalty,
        payout: amount - penalty,
        burn,
        treasury,
        rewards_pool,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn test_reference_scenario() {
        // 100 tokens, 3 bps, 10 weeks remaining: penalty 0.3 tokens.
        let split = split_penalty(100 * TOKEN, 3, 10).unwrap();
        assert_eq!(split.penalty, 3 * TOKEN / 10);
        assert_eq!(split.payout, 99 * TOKEN + 7 * TOKEN / 10);
        assert_eq!(split.burn, 15 * TOKEN / 100);
        assert_eq!(split.treasury, 3 * TOKEN / 100);
        assert_eq!(split.rewards_pool, 12 * TOKEN / 100);
    }

    #[test]
    fn test_zero_weeks_no_penalty() {
        let split = split_penalty(100 * TOKEN, 3, 0).unwrap();
        assert_eq!(split.penalty, 0);
        assert_eq!(split.payout, 100 * TOKEN);
        assert_eq!(split.burn + split.treasury + split.rewards_pool, 0);
    }

    #[test]
    fn test_penalty_clamped_to_amount() {
        // 50 bps * 300 weeks = 150%
        assert_eq!(compute_penalty(1_000, 50, 300).unwrap(), 1_000);
        let split = split_penalty(1_000, 50, 300).unwrap();
        assert_eq!(split.payout, 0);
        assert_eq!(split.treasury, 100);
        assert_eq!(split.rewards_pool, 400);
        assert_eq!(split.burn, 500);
    }

    #[test]
    fn test_rounding_remainder_goes_to_burn() {
        // penalty = 7: treasury floor(0.7) = 0, pool floor(2.8) = 2,
        // burn floor(3.5) = 3 plus 2 units of dust
        let split = split_penalty(10_000, 7, 1).unwrap();
        assert_eq!(split.penalty, 7);
        assert_eq!(split.treasury, 0);
        assert_eq!(split.rewards_pool, 2);
        assert_eq!(split.burn, 5);
    }

    #[test]
    fn test_burn_is_nominal_share_plus_dust() {
        for penalty in [1u128, 9, 99, 1_001, 123_456_789] {
            let split = split_penalty(penalty, 10_000, 1).unwrap();
            assert_eq!(split.penalty, penalty);
            let nominal = penalty * BURN_SHARE_PERCENT / 100;
            assert!(split.burn >= nominal);
            // At most one unit lost per rounded share.
            assert!(split.burn - nominal < 3);
        }
    }

    #[test]
    fn test_shares_sum_to_100() {
        assert_eq!(
            BURN_SHARE_PERCENT + TREASURY_SHARE_PERCENT + REWARDS_POOL_SHARE_PERCENT,
            100
        );
    }

    #[test]
    fn test_huge_amount_full_penalty_does_not_overflow() {
        let split = split_penalty(u128::MAX / 200, 10_000, 1).unwrap();
        assert_eq!(split.penalty, u128::MAX / 200);
        assert_eq!(split.burn + split.treasury + split.rewards_pool, split.penalty);
    }
}
