// crates/lockstake-cli/src/commands/project.rs
//
// `lockstake project` — stake an amount on a fresh deployment and show how
// the principal compounds over the following periods.

use serde::Serialize;
use tabled::Tabled;

use lockstake_core::time::format_timestamp;
use lockstake_ledger::PenaltySplit;
use lockstake_token::TokenAmount;

use crate::config::LedgerConfig;
use crate::error::CliError;
use crate::output::{format_json, format_table, OutputFormat};

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct ProjectionRow {
    #[tabled(rename = "Period")]
    pub period: u64,
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Principal")]
    pub principal: String,
    #[tabled(rename = "Reward")]
    pub reward: String,
}

#[derive(Debug, Serialize)]
pub struct Projection {
    pub amount: String,
    pub weeks: u64,
    pub lock_until: String,
    /// What withdrawing everything right after staking would cost.
    pub immediate_exit: Option<PenaltySplit>,
    pub schedule: Vec<ProjectionRow>,
}

/// Stake `amount` tokens for `weeks` as the configured owner and project
/// `periods` periods ahead.
pub fn project(config: &LedgerConfig, amount: &str, weeks: u64, periods: u64) -> Result<Projection, CliError> {
    let amount: TokenAmount = amount.parse()?;
    let mut deployment = config.deploy()?;
    let owner = config.owner_address()?;
    let custody = deployment.ledger.custody_address();

    let ledger = &mut deployment.ledger;
    ledger.token_mut().approve(&owner, &custody, amount.units);
    ledger.stake(&owner, amount.units, weeks)?;

    let stake = ledger.get_stake_info(&owner);
    // Without penalty destinations there is nothing to preview.
    let immediate_exit = match ledger.parameters().penalty_destinations() {
        Ok(_) => Some(ledger.preview_penalty(&owner, amount.units)?),
        Err(_) => None,
    };
    let schedule = ledger
        .reward_schedule(&owner, periods)?
        .into_iter()
        .zip(1..)
        .map(|(entry, period)| ProjectionRow {
            period,
            date: format_timestamp(entry.at),
            principal: TokenAmount::from_units(entry.principal).to_string(),
            reward: TokenAmount::from_units(entry.reward).to_string(),
        })
        .collect();

    Ok(Projection {
        amount: amount.to_string(),
        weeks: ledger.weeks_for_unstake(&owner),
        lock_until: format_timestamp(stake.lock_until),
        immediate_exit,
        schedule,
    })
}

/// Run the project command.
pub async fn run(
    config: &LedgerConfig,
    format: OutputFormat,
    amount: &str,
    weeks: u64,
    periods: Option<u64>,
) -> Result<(), CliError> {
    let periods = periods.unwrap_or(weeks);
    let projection = project(config, amount, weeks, periods)?;

    match format {
        OutputFormat::Json => println!("{}", format_json(&projection)),
        OutputFormat::Table => {
            println!(
                "Staking {} for {} weeks, locked until {}",
                projection.amount, projection.weeks, projection.lock_until
            );
            if let Some(exit) = &projection.immediate_exit {
                println!(
                    "Withdrawing now would pay out {} (penalty {})",
                    TokenAmount::from_units(exit.payout),
                    TokenAmount::from_units(exit.penalty)
                );
            }
            println!();
            println!("{}", format_table(&projection.schedule));
        }
    }
    Ok(())
}
