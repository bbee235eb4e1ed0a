// crates/lockstake-cli/src/commands/params.rs
//
// `lockstake params` — print the effective staking parameters.

use serde::Serialize;

use lockstake_core::address::Address;
use lockstake_ledger::Parameters;
use lockstake_token::TokenAmount;

use crate::config::{resolve_account, LedgerConfig};
use crate::error::CliError;
use crate::output::{format_json, format_table, FieldRow, OutputFormat};

#[derive(Debug, Serialize)]
struct ParamsView<'a> {
    token_name: &'a str,
    token_symbol: &'a str,
    owner: Address,
    custody: Address,
    #[serde(flatten)]
    params: Parameters,
}

/// Run the params command.
pub async fn run(config: &LedgerConfig, format: OutputFormat) -> Result<(), CliError> {
    let params = config.parameters()?;
    params.validate()?;
    let view = ParamsView {
        token_name: &config.token_name,
        token_symbol: &config.token_symbol,
        owner: config.owner_address()?,
        custody: resolve_account(&config.custody)?,
        params,
    };

    match format {
        OutputFormat::Json => println!("{}", format_json(&view)),
        OutputFormat::Table => println!("{}", format_table(&rows(&view))),
    }
    Ok(())
}

fn rows(view: &ParamsView<'_>) -> Vec<FieldRow> {
    let p = &view.params;
    let unset = || "(unset)".to_string();
    vec![
        FieldRow::new("Token", format!("{} ({})", view.token_name, view.token_symbol)),
        FieldRow::new("Owner", view.owner),
        FieldRow::new("Custody", view.custody),
        FieldRow::new("Reward rate", format!("{} bps per period", p.reward_rate_bps)),
        FieldRow::new("Penalty rate", format!("{} bps per remaining period", p.penalty_rate_bps)),
        FieldRow::new("Lock weeks", format!("{} - {}", p.min_lock_weeks, p.max_lock_weeks)),
        FieldRow::new("Period length", format!("{} s", p.period_length)),
        FieldRow::new("Minimum deposit", TokenAmount::from_units(p.minimum_deposit)),
        FieldRow::new("Treasury", p.treasury.map(|a| a.to_string()).unwrap_or_else(unset)),
        FieldRow::new("Rewards pool", p.rewards_pool.map(|a| a.to_string()).unwrap_or_else(unset)),
    ]
}
