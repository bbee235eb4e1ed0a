// crates/lockstake-ledger/src/staking.rs
//
// The staking ledger: stake records and their lifecycle operations.
//
// Every mutating call follows the same shape:
//   1. Read the clock once.
//   2. Settle the target account on a copy of its record.
//   3. Validate the request and compute the new state.
//   4. Move tokens (the only step with external effects).
//   5. Commit the record, the running total and the events.
//
// Steps 1-3 never touch stored state, and step 4 is checked up front so a
// rejected call leaves both this ledger and the token ledger unchanged.

use std::collections::HashMap;

use lockstake_core::address::Address;
use lockstake_core::error::{StakingError, TokenError};
use lockstake_core::time::{Clock, Timestamp};
use lockstake_core::traits::TokenLedger;

use crate::accrual::{settle, weeks_remaining, Settlement};
use crate::events::StakingEvent;
use crate::params::{ParameterChange, ParameterStore, Parameters};
use crate::penalty::{split_penalty, PenaltySplit};
use crate::record::{AutoExtend, StakeRecord};

/// Time-locked staking ledger holding custody of a fungible token.
///
/// `T` is the token ledger the stakes are denominated in; `C` supplies the
/// transaction time. Tokens in custody are held by `custody` on the token
/// ledger, so stakers must approve `custody` as a spender before staking.
pub struct StakingLedger<T, C> {
    pub(crate) token: T,
    pub(crate) clock: C,
    pub(crate) custody: Address,
    pub(crate) params: ParameterStore,
    pub(crate) records: HashMap<Address, StakeRecord>,
    pub(crate) total_staked: u128,
    pub(crate) events: Vec<StakingEvent>,
}

impl<T: TokenLedger, C: Clock> StakingLedger<T, C> {
    /// Create a ledger.
    ///
    /// # Arguments
    /// - `token` — The token ledger stakes are held in.
    /// - `clock` — Source of transaction time.
    /// - `owner` — The only identity allowed to change parameters.
    /// - `custody` — This ledger's own account on the token ledger.
    /// - `params` — Initial parameters, including optional treasury and
    ///   rewards pool addresses.
    ///
    /// # Errors
    /// Returns `StakingError::InvalidParameter` if `params` is inconsistent
    /// or `custody` is the zero address.
    pub fn new(
        token: T,
        clock: C,
        owner: Address,
        custody: Address,
        params: Parameters,
    ) -> Result<Self, StakingError> {
        if custody.is_zero() {
            return Err(StakingError::InvalidParameter(
                "custody address cannot be the zero address".to_string(),
            ));
        }
        let params = ParameterStore::new(owner, params)?;
        tracing::info!("Staking ledger created: owner {}, custody {}", owner, custody);
        Ok(Self {
            token,
            clock,
            custody,
            params,
            records: HashMap::new(),
            total_staked: 0,
            events: Vec::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Stake registry
    // -----------------------------------------------------------------------

    /// Stake `amount` for `caller`, locked for `weeks` periods.
    pub fn stake(&mut self, caller: &Address, amount: u128, weeks: u64) -> Result<(), StakingError> {
        self.stake_for(caller, caller, amount, weeks)
    }

    /// Stake `amount` pulled from `funder` into `beneficiary`'s record.
    ///
    /// `weeks` is clamped into `[min_lock_weeks, max_lock_weeks]`. The lock
    /// is extended to `now + weeks` periods but never shortened.
    ///
    /// # Errors
    /// - `InsufficientAmount` if `amount` is below the minimum deposit.
    /// - `TransferFailed` if `funder` lacks balance or allowance.
    pub fn stake_for(
        &mut self,
        funder: &Address,
        beneficiary: &Address,
        amount: u128,
        weeks: u64,
    ) -> Result<(), StakingError> {
        let now = self.clock.now();
        let params = self.params.params();
        if amount < params.minimum_deposit {
            return Err(StakingError::InsufficientAmount {
                amount,
                minimum: params.minimum_deposit,
            });
        }

        let settlement = self.settled(beneficiary, now)?;
        let mut record = settlement.record.clone();
        record.reset_if_empty(now);

        let weeks = params.clamp_weeks(weeks);
        let requested_lock = now
            .checked_add(params.weeks_to_secs(weeks)?)
            .ok_or(StakingError::ArithmeticOverflow)?;
        record.lock_until = record.lock_until.max(requested_lock);
        record.principal = checked_add(record.principal, amount)?;
        let total = checked_add(checked_add(self.total_staked, settlement.reward)?, amount)?;

        self.token
            .transfer_from(&self.custody, funder, &self.custody, amount)?;

        tracing::info!(
            "Staked {} for {} (funded by {}), principal {}, locked until {}",
            amount,
            beneficiary,
            funder,
            record.principal,
            record.lock_until
        );
        let event = StakingEvent::Staked {
            account: *beneficiary,
            funder: *funder,
            amount,
            total: record.principal,
            lock_until: record.lock_until,
        };
        self.commit(beneficiary, &settlement, record, total, event);
        Ok(())
    }

    /// Add `amount` to `caller`'s principal without touching the lock.
    pub fn increase_staking_amount(&mut self, caller: &Address, amount: u128) -> Result<(), StakingError> {
        self.increase_staking_amount_for(caller, caller, amount)
    }

    /// Add `amount` pulled from `funder` to `beneficiary`'s principal.
    ///
    /// An empty record starts its clocks at `now`; the lock is left where
    /// it is, so such a deposit is immediately withdrawable.
    ///
    /// # Errors
    /// `TransferFailed` if `funder` lacks balance or allowance.
    pub fn increase_staking_amount_for(
        &mut self,
        funder: &Address,
        beneficiary: &Address,
        amount: u128,
    ) -> Result<(), StakingError> {
        let now = self.clock.now();

        let settlement = self.settled(beneficiary, now)?;
        let mut record = settlement.record.clone();
        record.reset_if_empty(now);
        record.principal = checked_add(record.principal, amount)?;
        let total = checked_add(checked_add(self.total_staked, settlement.reward)?, amount)?;

        self.token
            .transfer_from(&self.custody, funder, &self.custody, amount)?;

        tracing::info!(
            "Increased stake of {} by {} (funded by {}), principal {}",
            beneficiary,
            amount,
            funder,
            record.principal
        );
        let event = StakingEvent::StakeIncreased {
            account: *beneficiary,
            funder: *funder,
            amount,
            total: record.principal,
        };
        self.commit(beneficiary, &settlement, record, total, event);
        Ok(())
    }

    /// Push `caller`'s lock out by `weeks` periods.
    ///
    /// The result is capped at `max_lock_weeks` periods from now, but an
    /// existing lock beyond that cap is kept rather than shortened. An empty
    /// record is extended from `now`.
    pub fn extend_staking(&mut self, caller: &Address, weeks: u64) -> Result<(), StakingError> {
        let now = self.clock.now();
        let params = self.params.params();

        let settlement = self.settled(caller, now)?;
        let mut record = settlement.record.clone();
        record.reset_if_empty(now);

        let cap = now.saturating_add(params.weeks_to_secs(params.max_lock_weeks)?);
        let extended = record
            .lock_until
            .saturating_add(params.weeks_to_secs(weeks)?)
            .min(cap);
        record.lock_until = record.lock_until.max(extended);
        let total = checked_add(self.total_staked, settlement.reward)?;

        tracing::info!("Extended lock of {} until {}", caller, record.lock_until);
        let event = StakingEvent::LockExtended {
            account: *caller,
            lock_until: record.lock_until,
        };
        self.commit(caller, &settlement, record, total, event);
        Ok(())
    }

    /// Turn auto-extend on for `caller`.
    pub fn activate_auto_extending(&mut self, caller: &Address) -> Result<(), StakingError> {
        self.set_auto_extend(caller, true)
    }

    /// Turn auto-extend off for `caller`.
    pub fn disable_auto_extending(&mut self, caller: &Address) -> Result<(), StakingError> {
        self.set_auto_extend(caller, false)
    }

    /// Settles first, so periods that already elapsed are accounted under
    /// the old preference.
    fn set_auto_extend(&mut self, caller: &Address, enabled: bool) -> Result<(), StakingError> {
        let now = self.clock.now();
        let settlement = self.settled(caller, now)?;
        let mut record = settlement.record.clone();
        record.auto_extend = AutoExtend::from_flag(enabled);
        let total = checked_add(self.total_staked, settlement.reward)?;

        tracing::info!("Auto-extend for {} set to {}", caller, enabled);
        let event = StakingEvent::AutoExtendChanged {
            account: *caller,
            enabled,
        };
        self.commit(caller, &settlement, record, total, event);
        Ok(())
    }

    /// Withdraw `amount` penalty-free after the lock has expired.
    ///
    /// # Errors
    /// - `InsufficientPrincipal` if `amount` exceeds the settled principal
    ///   (checked before the lock, so it is reported even while locked).
    /// - `LockNotExpired` if `now < lock_until` after settlement.
    /// - `TransferFailed` if custody cannot cover `amount`.
    pub fn unstake(&mut self, caller: &Address, amount: u128) -> Result<(), StakingError> {
        let now = self.clock.now();

        let settlement = self.settled(caller, now)?;
        let mut record = settlement.record.clone();
        if amount > record.principal {
            return Err(StakingError::InsufficientPrincipal {
                requested: amount,
                available: record.principal,
            });
        }
        if record.is_locked(now) {
            return Err(StakingError::LockNotExpired {
                lock_until: record.lock_until,
                now,
            });
        }
        record.principal -= amount;
        let total = checked_add(self.total_staked, settlement.reward)? - amount;

        self.token.transfer(&self.custody, caller, amount)?;

        tracing::info!("Unstaked {} for {}, principal {}", amount, caller, record.principal);
        let event = StakingEvent::Unstaked {
            account: *caller,
            amount,
            total: record.principal,
        };
        self.commit(caller, &settlement, record, total, event);
        Ok(())
    }

    /// Withdraw `amount` at any time, forfeiting a penalty proportional to
    /// the whole periods left on the lock.
    ///
    /// `amount - penalty` goes to `caller`; the penalty is split between
    /// burning, the treasury and the rewards pool. Principal drops by the
    /// full `amount`.
    ///
    /// # Errors
    /// - `InsufficientPrincipal` if `amount` exceeds the settled principal.
    /// - `InvalidParameter` if the treasury or rewards pool is unset.
    /// - `TransferFailed` if custody cannot cover `amount`.
    pub fn unstake_with_penalty(&mut self, caller: &Address, amount: u128) -> Result<PenaltySplit, StakingError> {
        let now = self.clock.now();
        let params = self.params.params();

        let settlement = self.settled(caller, now)?;
        let mut record = settlement.record.clone();
        if amount > record.principal {
            return Err(StakingError::InsufficientPrincipal {
                requested: amount,
                available: record.principal,
            });
        }
        let (treasury, rewards_pool) = params.penalty_destinations()?;
        let weeks = weeks_remaining(record.lock_until, now, params.period_length);
        let split = split_penalty(amount, params.penalty_rate_bps, weeks)?;

        record.principal -= amount;
        let total = checked_add(self.total_staked, settlement.reward)? - amount;

        // All four movements draw on custody and sum to `amount`; with the
        // sum covered, none of them can fail halfway.
        let available = self.token.balance_of(&self.custody);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available,
            }
            .into());
        }
        self.payout_penalized(caller, &treasury, &rewards_pool, &split)?;

        tracing::info!(
            "Unstaked {} with penalty for {}: payout {}, penalty {} ({} weeks), burned {}, treasury {}, rewards pool {}",
            amount,
            caller,
            split.payout,
            split.penalty,
            split.weeks_remaining,
            split.burn,
            split.treasury,
            split.rewards_pool
        );
        let event = StakingEvent::UnstakedWithPenalty {
            account: *caller,
            split,
            total: record.principal,
        };
        self.commit(caller, &settlement, record, total, event);
        Ok(split)
    }

    fn payout_penalized(
        &mut self,
        caller: &Address,
        treasury: &Address,
        rewards_pool: &Address,
        split: &PenaltySplit,
    ) -> Result<(), TokenError> {
        for (to, amount) in [
            (caller, split.payout),
            (treasury, split.treasury),
            (rewards_pool, split.rewards_pool),
        ] {
            if amount > 0 {
                self.token.transfer(&self.custody, to, amount)?;
            }
        }
        // Supply only shrinks once every holder has been paid.
        if split.burn > 0 {
            self.token.burn(&self.custody, split.burn)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Parameter store (owner only)
    // -----------------------------------------------------------------------

    pub fn set_reward_rate_per_period(&mut self, caller: &Address, bps: u32) -> Result<(), StakingError> {
        self.change_parameter(caller, ParameterChange::RewardRate(bps))
    }

    pub fn set_penalty_rate_per_period(&mut self, caller: &Address, bps: u32) -> Result<(), StakingError> {
        self.change_parameter(caller, ParameterChange::PenaltyRate(bps))
    }

    /// # Errors
    /// `InvalidParameter` if `weeks` exceeds the current maximum.
    pub fn set_min_lock_weeks(&mut self, caller: &Address, weeks: u64) -> Result<(), StakingError> {
        self.change_parameter(caller, ParameterChange::MinLockWeeks(weeks))
    }

    /// # Errors
    /// `InvalidParameter` if `weeks` is below the current minimum.
    pub fn set_max_lock_weeks(&mut self, caller: &Address, weeks: u64) -> Result<(), StakingError> {
        self.change_parameter(caller, ParameterChange::MaxLockWeeks(weeks))
    }

    pub fn set_treasury_address(&mut self, caller: &Address, treasury: Address) -> Result<(), StakingError> {
        self.change_parameter(caller, ParameterChange::Treasury(treasury))
    }

    pub fn set_rewards_pool_address(&mut self, caller: &Address, pool: Address) -> Result<(), StakingError> {
        self.change_parameter(caller, ParameterChange::RewardsPool(pool))
    }

    pub fn set_minimum_deposit(&mut self, caller: &Address, amount: u128) -> Result<(), StakingError> {
        self.change_parameter(caller, ParameterChange::MinimumDeposit(amount))
    }

    /// Apply a parameter change on behalf of `caller`.
    pub fn change_parameter(&mut self, caller: &Address, change: ParameterChange) -> Result<(), StakingError> {
        self.params.apply(caller, &change)?;
        self.events.push(StakingEvent::ParameterChanged { change });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Event log and token access
    // -----------------------------------------------------------------------

    /// All events recorded since creation or the last `drain_events`.
    pub fn events(&self) -> &[StakingEvent] {
        &self.events
    }

    /// Take all pending events, leaving the log empty.
    pub fn drain_events(&mut self) -> Vec<StakingEvent> {
        std::mem::take(&mut self.events)
    }

    /// The token ledger stakes are held in.
    pub fn token(&self) -> &T {
        &self.token
    }

    /// Mutable access to the token ledger, for approvals and funding custody.
    pub fn token_mut(&mut self) -> &mut T {
        &mut self.token
    }

    /// The clock this ledger reads.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// The account's record settled at `now`, without storing it.
    pub(crate) fn settled(&self, account: &Address, now: Timestamp) -> Result<Settlement, StakingError> {
        match self.records.get(account) {
            Some(record) => settle(record, now, self.params.params()),
            None => Ok(Settlement {
                record: StakeRecord::new(now),
                periods: 0,
                reward: 0,
            }),
        }
    }

    /// Store the outcome of a successful call.
    fn commit(
        &mut self,
        account: &Address,
        settlement: &Settlement,
        record: StakeRecord,
        total: u128,
        event: StakingEvent,
    ) {
        if settlement.periods > 0 {
            tracing::debug!(
                "Settled {} periods for {}: reward {}",
                settlement.periods,
                account,
                settlement.reward
            );
            self.events.push(StakingEvent::Settled {
                account: *account,
                periods: settlement.periods,
                reward: settlement.reward,
                lock_until: settlement.record.lock_until,
            });
        }
        self.records.insert(*account, record);
        self.total_staked = total;
        self.events.push(event);
    }
}

fn checked_add(a: u128, b: u128) -> Result<u128, StakingError> {
    a.checked_add(b).ok_or(StakingError::ArithmeticOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockstake_core::time::ManualClock;
    use lockstake_token::InMemoryToken;

    const WEEK: u64 = 604_800;
    const TOKEN: u128 = 1_000_000_000_000_000_000;
    const START: Timestamp = 1_700_000_000;

    fn owner() -> Address {
        Address::from_label("owner")
    }

    fn alice() -> Address {
        Address::from_label("alice")
    }

    fn bob() -> Address {
        Address::from_label("bob")
    }

    fn custody() -> Address {
        Address::from_label("staking")
    }

    fn treasury() -> Address {
        Address::from_label("treasury")
    }

    fn pool() -> Address {
        Address::from_label("rewards-pool")
    }

    /// Ledger with alice and bob funded with 1,000 tokens each and custody approved.
    fn setup() -> (StakingLedger<InMemoryToken, ManualClock>, ManualClock) {
        let clock = ManualClock::new(START);
        let mut token = InMemoryToken::new("Token", "AQT", owner(), 1_000_000 * TOKEN);
        for account in [alice(), bob()] {
            token.transfer(&owner(), &account, 1_000 * TOKEN).unwrap();
            token.approve(&account, &custody(), u128::MAX);
        }
        token.approve(&owner(), &custody(), u128::MAX);
        let params = Parameters {
            treasury: Some(treasury()),
            rewards_pool: Some(pool()),
            ..Parameters::default()
        };
        let ledger = StakingLedger::new(token, clock.clone(), owner(), custody(), params).unwrap();
        (ledger, clock)
    }

    #[test]
    fn test_stake_moves_tokens_into_custody() {
        let (mut ledger, _) = setup();
        ledger.stake(&alice(), 100 * TOKEN, 10).unwrap();

        let record = &ledger.records[&alice()];
        assert_eq!(record.principal, 100 * TOKEN);
        assert_eq!(record.lock_until, START + 10 * WEEK);
        assert_eq!(record.last_accrual_time, START);
        assert_eq!(ledger.total_staked, 100 * TOKEN);
        assert_eq!(ledger.token().balance_of(&custody()), 100 * TOKEN);
        assert_eq!(ledger.token().balance_of(&alice()), 900 * TOKEN);
    }

    #[test]
    fn test_stake_zero_rejected() {
        let (mut ledger, _) = setup();
        let result = ledger.stake(&alice(), 0, 10);
        assert!(matches!(result, Err(StakingError::InsufficientAmount { amount: 0, .. })));
        assert!(ledger.records.is_empty());
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_stake_without_allowance_rolls_back() {
        let (mut ledger, _) = setup();
        let carol = Address::from_label("carol");
        let result = ledger.stake(&carol, 100 * TOKEN, 10);
        assert!(matches!(
            result,
            Err(StakingError::TransferFailed(TokenError::InsufficientAllowance { .. }))
        ));
        assert!(ledger.records.get(&carol).is_none());
        assert_eq!(ledger.total_staked, 0);
    }

    #[test]
    fn test_stake_for_debits_funder() {
        let (mut ledger, _) = setup();
        ledger.stake_for(&owner(), &alice(), 100 * TOKEN, 10).unwrap();
        assert_eq!(ledger.records[&alice()].principal, 100 * TOKEN);
        assert_eq!(ledger.token().balance_of(&alice()), 1_000 * TOKEN);
        assert!(ledger.records.get(&owner()).is_none());
    }

    #[test]
    fn test_restake_never_shortens_lock() {
        let (mut ledger, _) = setup();
        ledger.stake(&alice(), 100 * TOKEN, 104).unwrap();
        ledger.stake(&alice(), 100 * TOKEN, 5).unwrap();
        let record = &ledger.records[&alice()];
        assert_eq!(record.lock_until, START + 104 * WEEK);
        assert_eq!(record.principal, 200 * TOKEN);
    }

    #[test]
    fn test_stake_weeks_clamped() {
        let (mut ledger, _) = setup();
        ledger.stake(&alice(), 100 * TOKEN, 1).unwrap();
        ledger.stake(&bob(), 100 * TOKEN, 105).unwrap();
        assert_eq!(ledger.records[&alice()].lock_until, START + 5 * WEEK);
        assert_eq!(ledger.records[&bob()].lock_until, START + 104 * WEEK);
    }

    #[test]
    fn test_stake_settles_before_adding() {
        let (mut ledger, clock) = setup();
        ledger.stake(&alice(), 100 * TOKEN, 10).unwrap();
        clock.advance(WEEK);
        ledger.stake(&alice(), 100 * TOKEN, 10).unwrap();
        let record = &ledger.records[&alice()];
        assert_eq!(record.principal, 200_200_000_000_000_000_000);
        assert_eq!(ledger.total_staked, record.principal);
        assert!(ledger
            .events()
            .iter()
            .any(|e| matches!(e, StakingEvent::Settled { periods: 1, .. })));
    }

    #[test]
    fn test_increase_keeps_lock() {
        let (mut ledger, clock) = setup();
        ledger.stake(&alice(), 100 * TOKEN, 10).unwrap();
        ledger.disable_auto_extending(&alice()).unwrap();
        clock.advance(3_600);
        ledger.increase_staking_amount(&alice(), TOKEN).unwrap();
        let record = &ledger.records[&alice()];
        assert_eq!(record.principal, 101 * TOKEN);
        assert_eq!(record.lock_until, START + 10 * WEEK);
        assert_eq!(ledger.total_staked, 101 * TOKEN);
    }

    #[test]
    fn test_increase_on_fresh_account() {
        let (mut ledger, clock) = setup();
        clock.advance(3 * WEEK);
        ledger.increase_staking_amount(&alice(), TOKEN).unwrap();

        let record = &ledger.records[&alice()];
        assert_eq!(record.principal, TOKEN);
        assert_eq!(record.last_accrual_time, START + 3 * WEEK);
        assert_eq!(record.lock_until, START + 3 * WEEK);
        assert_eq!(ledger.total_staked, TOKEN);
        assert_eq!(ledger.token().balance_of(&alice()), 999 * TOKEN);

        // Nothing locks it, so it can leave straight away.
        ledger.unstake(&alice(), TOKEN).unwrap();
        assert_eq!(ledger.total_staked, 0);
    }

    #[test]
    fn test_increase_after_full_withdrawal_restarts_clocks() {
        let (mut ledger, clock) = setup();
        ledger.stake(&alice(), 100 * TOKEN, 5).unwrap();
        ledger.disable_auto_extending(&alice()).unwrap();
        ledger.set_reward_rate_per_period(&owner(), 0).unwrap();
        clock.advance(5 * WEEK);
        ledger.unstake(&alice(), 100 * TOKEN).unwrap();

        clock.advance(2 * WEEK + 10);
        ledger.increase_staking_amount(&alice(), TOKEN).unwrap();
        let record = &ledger.records[&alice()];
        assert_eq!(record.last_accrual_time, clock.now());
        assert_eq!(record.lock_until, clock.now());
    }

    #[test]
    fn test_increase_for_other_account() {
        let (mut ledger, _) = setup();
        ledger.stake(&alice(), 100 * TOKEN, 10).unwrap();
        ledger.increase_staking_amount_for(&bob(), &alice(), 5 * TOKEN).unwrap();
        assert_eq!(ledger.records[&alice()].principal, 105 * TOKEN);
        assert_eq!(ledger.token().balance_of(&bob()), 995 * TOKEN);
    }

    #[test]
    fn test_extend_adds_weeks() {
        let (mut ledger, _) = setup();
        ledger.stake(&alice(), 100 * TOKEN, 10).unwrap();
        ledger.extend_staking(&alice(), 5).unwrap();
        assert_eq!(ledger.records[&alice()].lock_until, START + 15 * WEEK);
    }

    #[test]
    fn test_extend_capped_at_max() {
        let (mut ledger, _) = setup();
        ledger.stake(&alice(), 100 * TOKEN, 100).unwrap();
        ledger.extend_staking(&alice(), 50).unwrap();
        assert_eq!(ledger.records[&alice()].lock_until, START + 104 * WEEK);
    }

    #[test]
    fn test_extend_never_shortens_after_max_lowered() {
        let (mut ledger, _) = setup();
        ledger.stake(&alice(), 100 * TOKEN, 104).unwrap();
        ledger.set_max_lock_weeks(&owner(), 52).unwrap();
        ledger.extend_staking(&alice(), 1).unwrap();
        assert_eq!(ledger.records[&alice()].lock_until, START + 104 * WEEK);
    }

    #[test]
    fn test_extend_on_fresh_account() {
        let (mut ledger, clock) = setup();
        clock.advance(WEEK);
        ledger.extend_staking(&alice(), 5).unwrap();
        let record = &ledger.records[&alice()];
        assert_eq!(record.principal, 0);
        assert_eq!(record.lock_until, START + 6 * WEEK);
        assert_eq!(record.last_accrual_time, START + WEEK);
        assert_eq!(ledger.total_staked, 0);
        assert_eq!(ledger.token().balance_of(&alice()), 1_000 * TOKEN);
    }

    #[test]
    fn test_extend_on_fresh_account_is_capped() {
        let (mut ledger, _) = setup();
        ledger.extend_staking(&alice(), 500).unwrap();
        assert_eq!(ledger.records[&alice()].lock_until, START + 104 * WEEK);
    }

    #[test]
    fn test_auto_extend_toggles_are_per_account() {
        let (mut ledger, _) = setup();
        ledger.disable_auto_extending(&alice()).unwrap();
        assert_eq!(ledger.records[&alice()].auto_extend, AutoExtend::Disabled);
        assert!(ledger.records.get(&bob()).is_none());
        ledger.activate_auto_extending(&alice()).unwrap();
        assert_eq!(ledger.records[&alice()].auto_extend, AutoExtend::Enabled);
    }

    #[test]
    fn test_unstake_while_locked_fails() {
        let (mut ledger, clock) = setup();
        ledger.stake(&alice(), 100 * TOKEN, 10).unwrap();
        clock.advance(10);
        let result = ledger.unstake(&alice(), TOKEN);
        assert!(matches!(result, Err(StakingError::LockNotExpired { .. })));
        assert_eq!(ledger.records[&alice()].principal, 100 * TOKEN);
    }

    #[test]
    fn test_unstake_more_than_principal_fails_even_when_locked() {
        let (mut ledger, _) = setup();
        ledger.stake(&alice(), 100 * TOKEN, 10).unwrap();
        let result = ledger.unstake(&alice(), 300 * TOKEN);
        assert_eq!(
            result,
            Err(StakingError::InsufficientPrincipal {
                requested: 300 * TOKEN,
                available: 100 * TOKEN
            })
        );
    }

    #[test]
    fn test_auto_extended_lock_never_lapses() {
        let (mut ledger, clock) = setup();
        ledger.stake(&alice(), 100 * TOKEN, 5).unwrap();
        clock.advance(50 * WEEK);
        assert!(matches!(
            ledger.unstake(&alice(), TOKEN),
            Err(StakingError::LockNotExpired { .. })
        ));
    }

    #[test]
    fn test_unstake_after_expiry() {
        let (mut ledger, clock) = setup();
        ledger.stake(&alice(), 100 * TOKEN, 5).unwrap();
        ledger.disable_auto_extending(&alice()).unwrap();
        // Fund custody so compounded rewards can be paid out.
        ledger.token_mut().transfer(&owner(), &custody(), 10 * TOKEN).unwrap();
        clock.advance(5 * WEEK);

        let principal = ledger.settled(&alice(), clock.now()).unwrap().record.principal;
        assert!(principal > 100 * TOKEN);
        ledger.unstake(&alice(), principal).unwrap();
        assert_eq!(ledger.records[&alice()].principal, 0);
        assert_eq!(ledger.total_staked, 0);
        assert_eq!(ledger.token().balance_of(&alice()), 900 * TOKEN + principal);
    }

    #[test]
    fn test_unstake_unfunded_rewards_rolls_back() {
        let (mut ledger, clock) = setup();
        ledger.stake(&alice(), 100 * TOKEN, 5).unwrap();
        ledger.disable_auto_extending(&alice()).unwrap();
        clock.advance(5 * WEEK);
        ledger.drain_events();

        let principal = ledger.settled(&alice(), clock.now()).unwrap().record.principal;
        let result = ledger.unstake(&alice(), principal);
        assert!(matches!(result, Err(StakingError::TransferFailed(_))));
        // Settlement was not persisted either.
        assert_eq!(ledger.records[&alice()].principal, 100 * TOKEN);
        assert_eq!(ledger.total_staked, 100 * TOKEN);
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_unstake_with_penalty_distributes() {
        let (mut ledger, _) = setup();
        ledger.stake(&alice(), 100 * TOKEN, 10).unwrap();
        let supply = ledger.token().total_supply();

        let split = ledger.unstake_with_penalty(&alice(), 100 * TOKEN).unwrap();
        assert_eq!(split.weeks_remaining, 10);
        assert_eq!(split.penalty, 3 * TOKEN / 10);
        assert_eq!(ledger.token().balance_of(&alice()), 900 * TOKEN + split.payout);
        assert_eq!(ledger.token().total_supply(), supply - 15 * TOKEN / 100);
        assert_eq!(ledger.token().balance_of(&treasury()), 3 * TOKEN / 100);
        assert_eq!(ledger.token().balance_of(&pool()), 12 * TOKEN / 100);
        assert_eq!(ledger.token().balance_of(&custody()), 0);
        assert_eq!(ledger.records[&alice()].principal, 0);
        assert_eq!(ledger.total_staked, 0);
    }

    #[test]
    fn test_unstake_with_penalty_short_custody_moves_nothing() {
        let (mut ledger, clock) = setup();
        ledger.stake(&alice(), 100 * TOKEN, 10).unwrap();
        clock.advance(2 * WEEK);
        let supply = ledger.token().total_supply();

        // Compounded principal exceeds the 100 tokens custody holds.
        let principal = ledger.settled(&alice(), clock.now()).unwrap().record.principal;
        assert!(principal > 100 * TOKEN);
        let result = ledger.unstake_with_penalty(&alice(), principal);
        assert!(matches!(
            result,
            Err(StakingError::TransferFailed(TokenError::InsufficientBalance { .. }))
        ));
        assert_eq!(ledger.token().total_supply(), supply);
        assert_eq!(ledger.token().balance_of(&custody()), 100 * TOKEN);
        assert_eq!(ledger.token().balance_of(&alice()), 900 * TOKEN);
        assert_eq!(ledger.token().balance_of(&treasury()), 0);
        assert_eq!(ledger.token().balance_of(&pool()), 0);

        // Funded to the exact amount, every share goes out and custody empties.
        let shortfall = principal - 100 * TOKEN;
        ledger.token_mut().transfer(&owner(), &custody(), shortfall).unwrap();
        let split = ledger.unstake_with_penalty(&alice(), principal).unwrap();
        assert_eq!(ledger.token().balance_of(&custody()), 0);
        assert_eq!(ledger.token().total_supply(), supply - split.burn);
        assert_eq!(ledger.token().balance_of(&treasury()), split.treasury);
        assert_eq!(ledger.token().balance_of(&pool()), split.rewards_pool);
    }

    #[test]
    fn test_unstake_with_penalty_requires_destinations() {
        let clock = ManualClock::new(START);
        let mut token = InMemoryToken::new("Token", "AQT", owner(), 1_000 * TOKEN);
        token.approve(&owner(), &custody(), u128::MAX);
        let mut ledger =
            StakingLedger::new(token, clock, owner(), custody(), Parameters::default()).unwrap();
        ledger.stake(&owner(), 100 * TOKEN, 10).unwrap();

        let result = ledger.unstake_with_penalty(&owner(), TOKEN);
        assert!(matches!(result, Err(StakingError::InvalidParameter(_))));
        assert_eq!(ledger.records[&owner()].principal, 100 * TOKEN);

        ledger.set_treasury_address(&owner(), treasury()).unwrap();
        ledger.set_rewards_pool_address(&owner(), pool()).unwrap();
        assert!(ledger.unstake_with_penalty(&owner(), TOKEN).is_ok());
    }

    #[test]
    fn test_unstake_with_penalty_after_expiry_is_free() {
        let (mut ledger, clock) = setup();
        ledger.stake(&alice(), 100 * TOKEN, 5).unwrap();
        ledger.disable_auto_extending(&alice()).unwrap();
        clock.advance(5 * WEEK);
        ledger.token_mut().transfer(&owner(), &custody(), 10 * TOKEN).unwrap();

        let split = ledger.unstake_with_penalty(&alice(), 50 * TOKEN).unwrap();
        assert_eq!(split.penalty, 0);
        assert_eq!(split.payout, 50 * TOKEN);
        assert_eq!(ledger.token().balance_of(&treasury()), 0);
    }

    #[test]
    fn test_setters_require_owner() {
        let (mut ledger, _) = setup();
        assert_eq!(
            ledger.set_reward_rate_per_period(&alice(), 100),
            Err(StakingError::Unauthorized)
        );
        assert_eq!(
            ledger.set_treasury_address(&alice(), alice()),
            Err(StakingError::Unauthorized)
        );
        ledger.set_reward_rate_per_period(&owner(), 22).unwrap();
        assert_eq!(ledger.params.params().reward_rate_bps, 22);
        assert_eq!(
            ledger.events().last(),
            Some(&StakingEvent::ParameterChanged {
                change: ParameterChange::RewardRate(22)
            })
        );
    }

    #[test]
    fn test_rate_change_not_retroactive() {
        let (mut ledger, clock) = setup();
        ledger.stake(&alice(), 100 * TOKEN, 10).unwrap();
        clock.advance(WEEK);
        ledger.increase_staking_amount(&alice(), TOKEN).unwrap();
        // First week settled at 20 bps.
        assert_eq!(ledger.records[&alice()].principal, 101_200_000_000_000_000_000);

        ledger.set_reward_rate_per_period(&owner(), 0).unwrap();
        clock.advance(WEEK);
        ledger.increase_staking_amount(&alice(), TOKEN).unwrap();
        assert_eq!(ledger.records[&alice()].principal, 102_200_000_000_000_000_000);
    }

    #[test]
    fn test_new_rejects_zero_custody() {
        let token = InMemoryToken::new("Token", "AQT", owner(), 0);
        let result = StakingLedger::new(token, ManualClock::new(0), owner(), Address::ZERO, Parameters::default());
        assert!(matches!(result, Err(StakingError::InvalidParameter(_))));
    }
}
