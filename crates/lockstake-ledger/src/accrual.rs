// crates/lockstake-ledger/src/accrual.rs
//
// Lazy per-account settlement of compounding rewards.
//
// An account's reward clock only advances when the account is touched.
// Settlement folds every whole period elapsed since `last_accrual_time`
// into principal:
//
//   principal := floor(principal * (10_000 + rate) / 10_000)   once per period
//
// Rounding happens at each period boundary, so the result matches applying
// the per-period reward step by step. The accrual clock advances by whole
// periods only; any fractional remainder carries to the next settlement.
// With auto-extend enabled the lock rolls forward by the same amount.

use lockstake_core::error::StakingError;
use lockstake_core::time::Timestamp;

use crate::params::{Parameters, RATE_DENOMINATOR};
use crate::record::StakeRecord;

/// Outcome of settling one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// The record after settlement.
    pub record: StakeRecord,
    /// Number of whole periods folded in.
    pub periods: u64,
    /// Principal gained.
    pub reward: u128,
}

/// Number of whole periods between `since` and `now`.
///
/// A clock that reads earlier than `since` yields zero.
pub fn elapsed_periods(since: Timestamp, now: Timestamp, period_length: u64) -> u64 {
    now.saturating_sub(since) / period_length
}

/// Apply `periods` rounds of per-period compounding to `principal`.
///
/// # Errors
/// Returns `StakingError::ArithmeticOverflow` if principal outgrows `u128`.
pub fn compound(principal: u128, rate_bps: u32, periods: u64) -> Result<u128, StakingError> {
    let mut value = principal;
    for _ in 0..periods {
        let growth = value
            .checked_mul(rate_bps as u128)
            .ok_or(StakingError::ArithmeticOverflow)?
            / RATE_DENOMINATOR;
        if growth == 0 {
            // Every later period floors to zero growth as well.
            break;
        }
        value = value
            .checked_add(growth)
            .ok_or(StakingError::ArithmeticOverflow)?;
    }
    Ok(value)
}

/// Settle `record` at `now` without mutating it.
pub fn settle(
    record: &StakeRecord,
    now: Timestamp,
    params: &Parameters,
) -> Result<Settlement, StakingError> {
    let periods = elapsed_periods(record.last_accrual_time, now, params.period_length);
    if periods == 0 {
        return Ok(Settlement {
            record: record.clone(),
            periods: 0,
            reward: 0,
        });
    }

    let principal = compound(record.principal, params.reward_rate_bps, periods)?;
    // periods * period_length <= now - last_accrual_time, so this cannot overflow.
    let advance = periods * params.period_length;

    let mut settled = record.clone();
    settled.principal = principal;
    settled.last_accrual_time += advance;
    if settled.auto_extend.is_enabled() {
        settled.lock_until = settled.lock_until.saturating_add(advance);
    }

    Ok(Settlement {
        reward: principal - record.principal,
        record: settled,
        periods,
    })
}

/// The lock expiry `record` would have if settled at `now`.
///
/// Infallible: only the lock clock is projected, principal is not compounded.
pub fn projected_lock_until(record: &StakeRecord, now: Timestamp, params: &Parameters) -> Timestamp {
    if !record.auto_extend.is_enabled() {
        return record.lock_until;
    }
    let periods = elapsed_periods(record.last_accrual_time, now, params.period_length);
    record
        .lock_until
        .saturating_add(periods.saturating_mul(params.period_length))
}

/// Whole periods left until `lock_until`, rounded up.
pub fn weeks_remaining(lock_until: Timestamp, now: Timestamp, period_length: u64) -> u64 {
    lock_until.saturating_sub(now).div_ceil(period_length)
}
