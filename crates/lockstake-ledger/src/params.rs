// crates/lockstake-ledger/src/params.rs
//
// Owner-settable global configuration of the staking ledger.
//
// Reference values:
//   - Reward rate:   20 bps per week (0.20% compounding weekly)
//   - Penalty rate:   3 bps per remaining week
//   - Lock bounds:   5 .. 104 weeks
//   - Period length: 604,800 seconds (one week)
//
// Changes take effect for subsequent settlements only; periods that were
// already folded into principal are never recomputed.

use serde::{Deserialize, Serialize};

use lockstake_core::address::Address;
use lockstake_core::error::StakingError;

/// Denominator of all rates: rates are expressed in basis points.
pub const RATE_DENOMINATOR: u128 = 10_000;

/// One week in seconds.
pub const SECONDS_PER_WEEK: u64 = 604_800;

/// Default reward rate: 20 bps per period.
pub const DEFAULT_REWARD_RATE_BPS: u32 = 20;

/// Default penalty rate: 3 bps per remaining period.
pub const DEFAULT_PENALTY_RATE_BPS: u32 = 3;

/// Default minimum lock duration in periods.
pub const DEFAULT_MIN_LOCK_WEEKS: u64 = 5;

/// Default maximum lock duration in periods.
pub const DEFAULT_MAX_LOCK_WEEKS: u64 = 104;

/// Default minimum deposit: 0.001 token (10^15 units at 18 decimals).
pub const DEFAULT_MINIMUM_DEPOSIT: u128 = 1_000_000_000_000_000;

/// Global staking parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters {
    /// Reward per compounding period, in basis points of principal.
    pub reward_rate_bps: u32,
    /// Penalty per remaining lock period, in basis points of the withdrawn amount.
    pub penalty_rate_bps: u32,
    /// Lower bound on a requested lock duration, in periods.
    pub min_lock_weeks: u64,
    /// Upper bound on a requested lock duration, in periods.
    pub max_lock_weeks: u64,
    /// Length of one compounding period in seconds. Fixed at construction.
    pub period_length: u64,
    /// Receives 10% of every early-withdrawal penalty.
    pub treasury: Option<Address>,
    /// Receives 40% of every early-withdrawal penalty.
    pub rewards_pool: Option<Address>,
    /// Smallest amount accepted by a stake call.
    pub minimum_deposit: u128,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            reward_rate_bps: DEFAULT_REWARD_RATE_BPS,
            penalty_rate_bps: DEFAULT_PENALTY_RATE_BPS,
            min_lock_weeks: DEFAULT_MIN_LOCK_WEEKS,
            max_lock_weeks: DEFAULT_MAX_LOCK_WEEKS,
            period_length: SECONDS_PER_WEEK,
            treasury: None,
            rewards_pool: None,
            minimum_deposit: DEFAULT_MINIMUM_DEPOSIT,
        }
    }
}

impl Parameters {
    /// Check the invariants every stored parameter set must satisfy.
    pub fn validate(&self) -> Result<(), StakingError> {
        if self.period_length == 0 {
            return Err(StakingError::InvalidParameter(
                "period length must be positive".to_string(),
            ));
        }
        if self.min_lock_weeks > self.max_lock_weeks {
            return Err(StakingError::InvalidParameter(format!(
                "minimum lock of {} weeks exceeds maximum of {} weeks",
                self.min_lock_weeks, self.max_lock_weeks
            )));
        }
        if self.minimum_deposit == 0 {
            return Err(StakingError::InvalidParameter(
                "minimum deposit must be positive".to_string(),
            ));
        }
        for (name, addr) in [("treasury", self.treasury), ("rewards pool", self.rewards_pool)] {
            if addr.is_some_and(|a| a.is_zero()) {
                return Err(StakingError::InvalidParameter(format!(
                    "{} address cannot be the zero address",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Clamp a requested lock duration into `[min_lock_weeks, max_lock_weeks]`.
    pub fn clamp_weeks(&self, weeks: u64) -> u64 {
        weeks.clamp(self.min_lock_weeks, self.max_lock_weeks)
    }

    /// Duration of `weeks` periods in seconds.
    pub fn weeks_to_secs(&self, weeks: u64) -> Result<u64, StakingError> {
        weeks
            .checked_mul(self.period_length)
            .ok_or(StakingError::ArithmeticOverflow)
    }

    /// Both penalty destinations, or `InvalidParameter` if either is unset.
    pub fn penalty_destinations(&self) -> Result<(Address, Address), StakingError> {
        match (self.treasury, self.rewards_pool) {
            (Some(treasury), Some(pool)) => Ok((treasury, pool)),
            (None, _) => Err(StakingError::InvalidParameter(
                "treasury address is not set".to_string(),
            )),
            (_, None) => Err(StakingError::InvalidParameter(
                "rewards pool address is not set".to_string(),
            )),
        }
    }
}

/// A named parameter change, recorded in the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "name", content = "value", rename_all = "snake_case")]
pub enum ParameterChange {
    RewardRate(u32),
    PenaltyRate(u32),
    MinLockWeeks(u64),
    MaxLockWeeks(u64),
    Treasury(Address),
    RewardsPool(Address),
    MinimumDeposit(u128),
}

/// The parameter set together with the single identity allowed to change it.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    owner: Address,
    params: Parameters,
}

impl ParameterStore {
    /// Create a store after validating the initial parameters.
    pub fn new(owner: Address, params: Parameters) -> Result<Self, StakingError> {
        params.validate()?;
        Ok(Self { owner, params })
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Apply `change` on behalf of `caller`.
    ///
    /// # Errors
    /// Returns `StakingError::Unauthorized` if `caller` is not the owner, and
    /// `StakingError::InvalidParameter` if the resulting parameter set would
    /// violate an invariant. The stored parameters are unchanged on error.
    pub fn apply(&mut self, caller: &Address, change: &ParameterChange) -> Result<(), StakingError> {
        if *caller != self.owner {
            tracing::warn!("Rejected parameter change {:?} from non-owner {}", change, caller);
            return Err(StakingError::Unauthorized);
        }

        let mut next = self.params.clone();
        match *change {
            ParameterChange::RewardRate(v) => next.reward_rate_bps = v,
            ParameterChange::PenaltyRate(v) => next.penalty_rate_bps = v,
            ParameterChange::MinLockWeeks(v) => next.min_lock_weeks = v,
            ParameterChange::MaxLockWeeks(v) => next.max_lock_weeks = v,
            ParameterChange::Treasury(a) => next.treasury = Some(a),
            ParameterChange::RewardsPool(a) => next.rewards_pool = Some(a),
            ParameterChange::MinimumDeposit(v) => next.minimum_deposit = v,
        }
        next.validate()?;

        tracing::info!("Parameter updated: {:?}", change);
        self.params = next;
        Ok(())
    }
}
