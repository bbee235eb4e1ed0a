// crates/lockstake-ledger/src/query.rs
//
// Read-only projections of the staking ledger.
//
// Queries never write state. Where a value depends on time (pending reward,
// remaining lock) the record is settled on a copy at the current clock.

use serde::{Deserialize, Serialize};

use lockstake_core::address::Address;
use lockstake_core::error::StakingError;
use lockstake_core::time::{Clock, Timestamp};
use lockstake_core::traits::TokenLedger;

use crate::accrual::{compound, projected_lock_until, weeks_remaining};
use crate::params::Parameters;
use crate::penalty::{split_penalty, PenaltySplit};
use crate::staking::StakingLedger;

/// Principal and the reward it would gain if settled now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositInfo {
    pub principal: u128,
    pub projected_reward: u128,
}

/// Stored state of an account's stake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeInfo {
    pub principal: u128,
    pub lock_until: Timestamp,
    pub auto_extend: bool,
    pub last_accrual_time: Timestamp,
}

/// Projected principal at a future period boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledAccrual {
    /// Period boundary at which this principal is reached.
    pub at: Timestamp,
    pub principal: u128,
    /// Cumulative reward over the principal settled now.
    pub reward: u128,
}

impl<T: TokenLedger, C: Clock> StakingLedger<T, C> {
    /// Sum of every account's principal as of its last settlement.
    pub fn total_staked(&self) -> u128 {
        self.total_staked
    }

    /// `account`'s principal as of its last settlement.
    pub fn total_staked_for(&self, account: &Address) -> u128 {
        self.records.get(account).map(|r| r.principal).unwrap_or(0)
    }

    /// Principal plus the reward a settlement right now would add.
    pub fn get_deposit_info(&self, account: &Address) -> Result<DepositInfo, StakingError> {
        let settlement = self.settled(account, self.clock.now())?;
        Ok(DepositInfo {
            principal: self.total_staked_for(account),
            projected_reward: settlement.reward,
        })
    }

    /// Stored principal, lock, auto-extend flag and accrual clock.
    ///
    /// Untouched accounts report zeros with auto-extend enabled.
    pub fn get_stake_info(&self, account: &Address) -> StakeInfo {
        match self.records.get(account) {
            Some(record) => StakeInfo {
                principal: record.principal,
                lock_until: record.lock_until,
                auto_extend: record.auto_extend.is_enabled(),
                last_accrual_time: record.last_accrual_time,
            },
            None => StakeInfo {
                principal: 0,
                lock_until: 0,
                auto_extend: true,
                last_accrual_time: 0,
            },
        }
    }

    /// Whole periods until a penalty-free unstake is possible, rounded up.
    ///
    /// Uses the lock as it would stand after settling now, so an
    /// auto-extending stake keeps reporting the same remaining duration.
    pub fn weeks_for_unstake(&self, account: &Address) -> u64 {
        let now = self.clock.now();
        let params = self.params.params();
        match self.records.get(account) {
            Some(record) if record.principal > 0 => weeks_remaining(
                projected_lock_until(record, now, params),
                now,
                params.period_length,
            ),
            _ => 0,
        }
    }

    /// Whether settlements roll `account`'s lock forward.
    pub fn is_stake_auto_extending(&self, account: &Address) -> bool {
        self.records
            .get(account)
            .map(|r| r.auto_extend.is_enabled())
            .unwrap_or(true)
    }

    /// What `unstake_with_penalty(account, amount)` would do right now.
    ///
    /// # Errors
    /// `InsufficientPrincipal` if `amount` exceeds the settled principal.
    pub fn preview_penalty(&self, account: &Address, amount: u128) -> Result<PenaltySplit, StakingError> {
        let now = self.clock.now();
        let params = self.params.params();
        let settlement = self.settled(account, now)?;
        if amount > settlement.record.principal {
            return Err(StakingError::InsufficientPrincipal {
                requested: amount,
                available: settlement.record.principal,
            });
        }
        let weeks = weeks_remaining(settlement.record.lock_until, now, params.period_length);
        split_penalty(amount, params.penalty_rate_bps, weeks)
    }

    /// Projected principal after each of the next `periods` period
    /// boundaries, assuming no further calls and unchanged parameters.
    pub fn reward_schedule(&self, account: &Address, periods: u64) -> Result<Vec<ScheduledAccrual>, StakingError> {
        let now = self.clock.now();
        let params = self.params.params();
        let settlement = self.settled(account, now)?;
        let base = settlement.record.principal;

        let mut schedule = Vec::new();
        let mut principal = base;
        let mut at = settlement.record.last_accrual_time;
        for _ in 0..periods {
            principal = compound(principal, params.reward_rate_bps, 1)?;
            at = at.saturating_add(params.period_length);
            schedule.push(ScheduledAccrual {
                at,
                principal,
                reward: principal - base,
            });
        }
        Ok(schedule)
    }

    /// Every account that has a stake record, with its stored principal.
    pub fn stakers(&self) -> impl Iterator<Item = (&Address, u128)> + '_ {
        self.records.iter().map(|(addr, r)| (addr, r.principal))
    }

    /// The identity allowed to change parameters.
    pub fn owner(&self) -> Address {
        self.params.owner()
    }

    /// This ledger's account on the token ledger.
    pub fn custody_address(&self) -> Address {
        self.custody
    }

    /// Current parameters.
    pub fn parameters(&self) -> &Parameters {
        self.params.params()
    }
}
