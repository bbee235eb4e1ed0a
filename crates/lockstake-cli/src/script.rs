// crates/lockstake-cli/src/script.rs
//
// Staking scripts: a TOML list of timed calls replayed against a fresh
// deployment.
//
//   [[step]]
//   at_week = 3            # or: advance_secs = 3600
//   caller = "alice"
//   op = "stake"
//   amount = "100"
//   weeks = 10
//
// Steps run in order. A step may move the clock forward (never back) before
// its call. Calls the ledger rejects are recorded in the report and the
// replay continues; a malformed step aborts the replay.

use serde::{Deserialize, Serialize};
use tabled::Tabled;

use lockstake_core::address::Address;
use lockstake_core::error::StakingError;
use lockstake_core::time::{format_timestamp, Clock, ManualClock, Timestamp};
use lockstake_core::traits::TokenLedger;
use lockstake_ledger::{SharedLedger, StakingEvent, StakingLedger};
use lockstake_token::{InMemoryToken, TokenAmount};

use crate::config::{resolve_account, Deployment};
use crate::error::CliError;

type Ledger = StakingLedger<InMemoryToken, ManualClock>;

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// Set the clock to `start + at_week` periods.
    #[serde(default)]
    pub at_week: Option<u64>,
    /// Move the clock forward by this many seconds.
    #[serde(default)]
    pub advance_secs: Option<u64>,
    pub caller: String,
    #[serde(flatten)]
    pub action: Action,
}

/// One ledger or token call. Amounts are decimal token strings; withdrawals
/// also accept `"all"`, meaning the caller's principal after settlement.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    /// Approve `spender` (the staking ledger when omitted) on the token.
    Approve { spender: Option<String>, amount: String },
    Transfer { to: String, amount: String },
    /// Transfer to the staking ledger's custody account as reward reserve.
    Fund { amount: String },
    Stake { amount: String, weeks: u64 },
    StakeFor { beneficiary: String, amount: String, weeks: u64 },
    Increase { amount: String },
    IncreaseFor { beneficiary: String, amount: String },
    Extend { weeks: u64 },
    ActivateAutoExtend,
    DisableAutoExtend,
    Unstake { amount: String },
    UnstakeWithPenalty { amount: String },
    SetRewardRate { bps: u32 },
    SetPenaltyRate { bps: u32 },
    SetMinLockWeeks { weeks: u64 },
    SetMaxLockWeeks { weeks: u64 },
    SetTreasury { address: String },
    SetRewardsPool { address: String },
    SetMinimumDeposit { amount: String },
}

impl Action {
    /// The `op` name as written in the script.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Approve { .. } => "approve",
            Action::Transfer { .. } => "transfer",
            Action::Fund { .. } => "fund",
            Action::Stake { .. } => "stake",
            Action::StakeFor { .. } => "stake_for",
            Action::Increase { .. } => "increase",
            Action::IncreaseFor { .. } => "increase_for",
            Action::Extend { .. } => "extend",
            Action::ActivateAutoExtend => "activate_auto_extend",
            Action::DisableAutoExtend => "disable_auto_extend",
            Action::Unstake { .. } => "unstake",
            Action::UnstakeWithPenalty { .. } => "unstake_with_penalty",
            Action::SetRewardRate { .. } => "set_reward_rate",
            Action::SetPenaltyRate { .. } => "set_penalty_rate",
            Action::SetMinLockWeeks { .. } => "set_min_lock_weeks",
            Action::SetMaxLockWeeks { .. } => "set_max_lock_weeks",
            Action::SetTreasury { .. } => "set_treasury",
            Action::SetRewardsPool { .. } => "set_rewards_pool",
            Action::SetMinimumDeposit { .. } => "set_minimum_deposit",
        }
    }

    /// Account labels this action mentions besides the caller.
    fn accounts(&self) -> Vec<&str> {
        match self {
            Action::Approve { spender: Some(s), .. } => vec![s.as_str()],
            Action::Transfer { to, .. } => vec![to.as_str()],
            Action::StakeFor { beneficiary, .. } | Action::IncreaseFor { beneficiary, .. } => {
                vec![beneficiary.as_str()]
            }
            _ => Vec::new(),
        }
    }
}

impl Script {
    pub fn parse(contents: &str) -> Result<Self, CliError> {
        toml::from_str(contents).map_err(|e| CliError::Script(e.to_string()))
    }

    pub fn load(path: &str) -> Result<Self, CliError> {
        Self::parse(&std::fs::read_to_string(path)?)
    }
}

// ---------------------------------------------------------------------------
// Replay report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct StepReport {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Time")]
    pub time: String,
    #[tabled(rename = "Caller")]
    pub caller: String,
    #[tabled(rename = "Op")]
    pub op: String,
    #[tabled(rename = "OK")]
    pub ok: bool,
    #[tabled(rename = "Result")]
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct AccountReport {
    #[tabled(rename = "Account")]
    pub label: String,
    #[tabled(rename = "Wallet")]
    pub balance: String,
    #[tabled(rename = "Principal")]
    pub principal: String,
    #[tabled(rename = "Pending Reward")]
    pub projected_reward: String,
    #[tabled(rename = "Locked Until")]
    pub lock_until: String,
    #[tabled(rename = "Weeks Left")]
    pub weeks_to_unlock: u64,
    #[tabled(rename = "Auto-Extend")]
    pub auto_extend: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub time: String,
    pub total_staked: String,
    pub custody_balance: String,
    pub treasury_balance: Option<String>,
    pub rewards_pool_balance: Option<String>,
    pub total_supply: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Replay {
    pub steps: Vec<StepReport>,
    pub accounts: Vec<AccountReport>,
    pub summary: Summary,
    pub events: Vec<StakingEvent>,
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// Amount argument after parsing.
#[derive(Debug, Clone, Copy)]
enum Amount {
    Units(u128),
    All,
}

fn parse_amount(s: &str) -> Result<u128, CliError> {
    Ok(s.parse::<TokenAmount>()?.units)
}

fn parse_withdrawal(s: &str) -> Result<Amount, CliError> {
    if s.trim().eq_ignore_ascii_case("all") {
        Ok(Amount::All)
    } else {
        parse_amount(s).map(Amount::Units)
    }
}

/// Replay `script` against `deployment` and report every step and the
/// final state.
pub async fn replay(script: &Script, deployment: Deployment) -> Result<Replay, CliError> {
    let Deployment { ledger, clock, start } = deployment;
    let period = ledger.parameters().period_length;
    let shared = SharedLedger::new(ledger);

    let mut labels: Vec<(String, Address)> = Vec::new();
    let mut steps = Vec::with_capacity(script.steps.len());

    for (i, step) in script.steps.iter().enumerate() {
        let index = i + 1;
        advance_clock(&clock, step, start, period)
            .map_err(|reason| CliError::Script(format!("step {}: {}", index, reason)))?;

        let caller = resolve_account(&step.caller)?;
        remember(&mut labels, &step.caller, caller);
        for label in step.action.accounts() {
            remember(&mut labels, label, resolve_account(label)?);
        }

        let result = shared
            .execute(|ledger| apply(ledger, &caller, &step.action))
            .await?;
        let (ok, detail) = match result {
            Ok(detail) => (true, detail),
            Err(reason) => {
                tracing::warn!("Step {} ({} by {}) rejected: {}", index, step.action.name(), step.caller, reason);
                (false, reason)
            }
        };
        steps.push(StepReport {
            index,
            time: format_timestamp(clock.now()),
            caller: step.caller.clone(),
            op: step.action.name().to_string(),
            ok,
            detail,
        });
    }

    let mut ledger = shared.write().await;
    let accounts = labels
        .iter()
        .map(|(label, address)| account_report(&ledger, label, address))
        .collect::<Result<Vec<_>, CliError>>()?;
    let summary = summary(&ledger);
    let events = ledger.drain_events();

    Ok(Replay {
        steps,
        accounts,
        summary,
        events,
    })
}

fn advance_clock(clock: &ManualClock, step: &Step, start: Timestamp, period: u64) -> Result<(), String> {
    if let Some(week) = step.at_week {
        let target = week
            .checked_mul(period)
            .and_then(|offset| start.checked_add(offset))
            .ok_or_else(|| format!("at_week {} is out of range", week))?;
        if target < clock.now() {
            return Err(format!("at_week {} would move the clock backwards", week));
        }
        clock.set(target);
    }
    if let Some(secs) = step.advance_secs {
        clock
            .now()
            .checked_add(secs)
            .ok_or_else(|| format!("advance_secs {} is out of range", secs))?;
        clock.advance(secs);
    }
    Ok(())
}

fn remember(labels: &mut Vec<(String, Address)>, label: &str, address: Address) {
    if !labels.iter().any(|(_, a)| *a == address) {
        labels.push((label.to_string(), address));
    }
}

/// Run one action. The outer error is a malformed argument; the inner one is
/// a rejection by the ledger or the token.
fn apply(ledger: &mut Ledger, caller: &Address, action: &Action) -> Result<Result<String, String>, CliError> {
    let custody = ledger.custody_address();
    let outcome = match action {
        Action::Approve { spender, amount } => {
            let spender = match spender {
                Some(label) => resolve_account(label)?,
                None => custody,
            };
            let amount = parse_amount(amount)?;
            ledger.token_mut().approve(caller, &spender, amount);
            Ok(format!("approved {} for {}", TokenAmount::from_units(amount), spender))
        }
        Action::Transfer { to, amount } => {
            let to = resolve_account(to)?;
            let amount = parse_amount(amount)?;
            ledger
                .token_mut()
                .transfer(caller, &to, amount)
                .map(|_| format!("sent {}", TokenAmount::from_units(amount)))
                .map_err(|e| e.to_string())
        }
        Action::Fund { amount } => {
            let amount = parse_amount(amount)?;
            ledger
                .token_mut()
                .transfer(caller, &custody, amount)
                .map(|_| format!("reserve +{}", TokenAmount::from_units(amount)))
                .map_err(|e| e.to_string())
        }
        Action::Stake { amount, weeks } => {
            let amount = parse_amount(amount)?;
            ledger
                .stake(caller, amount, *weeks)
                .map(|_| principal_detail(ledger, caller))
                .map_err(|e| e.to_string())
        }
        Action::StakeFor { beneficiary, amount, weeks } => {
            let beneficiary = resolve_account(beneficiary)?;
            let amount = parse_amount(amount)?;
            ledger
                .stake_for(caller, &beneficiary, amount, *weeks)
                .map(|_| principal_detail(ledger, &beneficiary))
                .map_err(|e| e.to_string())
        }
        Action::Increase { amount } => {
            let amount = parse_amount(amount)?;
            ledger
                .increase_staking_amount(caller, amount)
                .map(|_| principal_detail(ledger, caller))
                .map_err(|e| e.to_string())
        }
        Action::IncreaseFor { beneficiary, amount } => {
            let beneficiary = resolve_account(beneficiary)?;
            let amount = parse_amount(amount)?;
            ledger
                .increase_staking_amount_for(caller, &beneficiary, amount)
                .map(|_| principal_detail(ledger, &beneficiary))
                .map_err(|e| e.to_string())
        }
        Action::Extend { weeks } => ledger
            .extend_staking(caller, *weeks)
            .map(|_| principal_detail(ledger, caller))
            .map_err(|e| e.to_string()),
        Action::ActivateAutoExtend => ledger
            .activate_auto_extending(caller)
            .map(|_| "auto-extend on".to_string())
            .map_err(|e| e.to_string()),
        Action::DisableAutoExtend => ledger
            .disable_auto_extending(caller)
            .map(|_| "auto-extend off".to_string())
            .map_err(|e| e.to_string()),
        Action::Unstake { amount } => {
            let amount = withdrawal_units(ledger, caller, parse_withdrawal(amount)?)?;
            ledger
                .unstake(caller, amount)
                .map(|_| format!("withdrew {}", TokenAmount::from_units(amount)))
                .map_err(|e| e.to_string())
        }
        Action::UnstakeWithPenalty { amount } => {
            let amount = withdrawal_units(ledger, caller, parse_withdrawal(amount)?)?;
            ledger
                .unstake_with_penalty(caller, amount)
                .map(|split| {
                    format!(
                        "withdrew {}, received {}, penalty {} over {} weeks",
                        TokenAmount::from_units(split.amount),
                        TokenAmount::from_units(split.payout),
                        TokenAmount::from_units(split.penalty),
                        split.weeks_remaining
                    )
                })
                .map_err(|e| e.to_string())
        }
        Action::SetRewardRate { bps } => setter(ledger.set_reward_rate_per_period(caller, *bps)),
        Action::SetPenaltyRate { bps } => setter(ledger.set_penalty_rate_per_period(caller, *bps)),
        Action::SetMinLockWeeks { weeks } => setter(ledger.set_min_lock_weeks(caller, *weeks)),
        Action::SetMaxLockWeeks { weeks } => setter(ledger.set_max_lock_weeks(caller, *weeks)),
        Action::SetTreasury { address } => {
            let address = resolve_account(address)?;
            setter(ledger.set_treasury_address(caller, address))
        }
        Action::SetRewardsPool { address } => {
            let address = resolve_account(address)?;
            setter(ledger.set_rewards_pool_address(caller, address))
        }
        Action::SetMinimumDeposit { amount } => {
            let amount = parse_amount(amount)?;
            setter(ledger.set_minimum_deposit(caller, amount))
        }
    };
    Ok(outcome)
}

fn setter(result: Result<(), StakingError>) -> Result<String, String> {
    result.map(|_| "updated".to_string()).map_err(|e| e.to_string())
}

fn principal_detail(ledger: &Ledger, account: &Address) -> String {
    let info = ledger.get_stake_info(account);
    format!(
        "principal {}, locked until {}",
        TokenAmount::from_units(info.principal),
        format_timestamp(info.lock_until)
    )
}

fn withdrawal_units(ledger: &Ledger, caller: &Address, amount: Amount) -> Result<u128, CliError> {
    match amount {
        Amount::Units(units) => Ok(units),
        Amount::All => {
            let info = ledger.get_deposit_info(caller)?;
            Ok(info.principal + info.projected_reward)
        }
    }
}

fn account_report(ledger: &Ledger, label: &str, address: &Address) -> Result<AccountReport, CliError> {
    let deposit = ledger.get_deposit_info(address)?;
    let stake = ledger.get_stake_info(address);
    let lock_until = if deposit.principal > 0 {
        format_timestamp(stake.lock_until)
    } else {
        "-".to_string()
    };
    Ok(AccountReport {
        label: label.to_string(),
        balance: TokenAmount::from_units(ledger.token().balance_of(address)).to_string(),
        principal: TokenAmount::from_units(deposit.principal).to_string(),
        projected_reward: TokenAmount::from_units(deposit.projected_reward).to_string(),
        lock_until,
        weeks_to_unlock: ledger.weeks_for_unstake(address),
        auto_extend: ledger.is_stake_auto_extending(address),
    })
}

fn summary(ledger: &Ledger) -> Summary {
    let balance = |a: &Address| TokenAmount::from_units(ledger.token().balance_of(a)).to_string();
    let params = ledger.parameters();
    Summary {
        time: format_timestamp(ledger.clock().now()),
        total_staked: TokenAmount::from_units(ledger.total_staked()).to_string(),
        custody_balance: balance(&ledger.custody_address()),
        treasury_balance: params.treasury.as_ref().map(balance),
        rewards_pool_balance: params.rewards_pool.as_ref().map(balance),
        total_supply: TokenAmount::from_units(ledger.token().total_supply()).to_string(),
    }
}
