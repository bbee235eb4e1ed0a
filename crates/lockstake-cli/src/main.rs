// crates/lockstake-cli/src/main.rs
//
// CLI entrypoint for the lockstake developer tools.
//
// Every command deploys a fresh in-memory token and staking ledger from the
// configuration file, then replays a script, projects rewards, or prints
// the effective parameters.

mod commands;
mod config;
mod error;
mod output;
mod script;

use clap::{Parser, Subcommand};
use config::{LedgerConfig, DEFAULT_CONFIG_PATH};
use output::OutputFormat;

/// lockstake: time-locked staking with compounding weekly rewards.
#[derive(Parser, Debug)]
#[command(
    name = "lockstake",
    version = "0.1.0",
    about = "Replay and project time-locked staking on an in-memory ledger"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "table")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a TOML script of timed staking calls.
    Run {
        /// Path to the script.
        script: String,
    },

    /// Stake an amount and show the projected principal week by week.
    Project {
        /// Amount of tokens to stake (decimal).
        #[arg(long)]
        amount: String,
        /// Lock duration in weeks.
        #[arg(long)]
        weeks: u64,
        /// Number of periods to project. Defaults to the lock duration.
        #[arg(long)]
        periods: Option<u64>,
    },

    /// Print the effective staking parameters.
    Params,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from TOML file, falling back to defaults if the file
    // is not found. Logging is set up first so the fallback can be reported.
    let loaded = LedgerConfig::load(&cli.config);
    let level = match &loaded {
        Ok(cfg) => cfg.log_level.clone(),
        Err(_) => LedgerConfig::default().log_level,
    };

    // Logs go to stderr so table and JSON output stay clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match loaded {
        Ok(cfg) => {
            tracing::info!("Loaded configuration from {}", cli.config);
            cfg
        }
        Err(e) => {
            tracing::warn!(
                "Could not load config from {}: {}. Using defaults.",
                cli.config,
                e
            );
            LedgerConfig::default()
        }
    };

    match &cli.command {
        Commands::Run { script } => commands::run::run(&config, cli.format, script).await?,
        Commands::Project {
            amount,
            weeks,
            periods,
        } => commands::project::run(&config, cli.format, amount, *weeks, *periods).await?,
        Commands::Params => commands::params::run(&config, cli.format).await?,
    }

    Ok(())
}
