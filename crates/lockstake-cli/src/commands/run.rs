// crates/lockstake-cli/src/commands/run.rs
//
// `lockstake run <script>` — replay a staking script on a fresh deployment
// and print each step's outcome and the resulting state.

use crate::config::LedgerConfig;
use crate::error::CliError;
use crate::output::{format_json, format_table, FieldRow, OutputFormat};
use crate::script::{replay, Replay, Script};

/// Run the run command.
pub async fn run(config: &LedgerConfig, format: OutputFormat, path: &str) -> Result<(), CliError> {
    let script = Script::load(path)?;
    tracing::info!("Loaded {} steps from {}", script.steps.len(), path);

    let deployment = config.deploy()?;
    let report = replay(&script, deployment).await?;

    match format {
        OutputFormat::Json => println!("{}", format_json(&report)),
        OutputFormat::Table => print_tables(&report),
    }
    Ok(())
}

fn print_tables(report: &Replay) {
    println!("Steps");
    println!("{}", format_table(&report.steps));
    println!();
    println!("Accounts");
    println!("{}", format_table(&report.accounts));
    println!();

    let s = &report.summary;
    let mut rows = vec![
        FieldRow::new("Time", &s.time),
        FieldRow::new("Total staked", &s.total_staked),
        FieldRow::new("Custody balance", &s.custody_balance),
    ];
    if let Some(balance) = &s.treasury_balance {
        rows.push(FieldRow::new("Treasury", balance));
    }
    if let Some(balance) = &s.rewards_pool_balance {
        rows.push(FieldRow::new("Rewards pool", balance));
    }
    rows.push(FieldRow::new("Total supply", &s.total_supply));
    println!("{}", format_table(&rows));
}
