// crates/lockstake-cli/src/error.rs
//
// Error type for the lockstake CLI.

use thiserror::Error;

use lockstake_core::error::StakingError;
use lockstake_token::ParseAmountError;

#[derive(Debug, Error)]
pub enum CliError {
    /// The configuration file or one of its values is unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The script file is malformed or asks for something impossible.
    #[error("Script error: {0}")]
    Script(String),

    /// The ledger rejected a call outside script replay.
    #[error("Staking error: {0}")]
    Staking(#[from] StakingError),

    #[error("{0}")]
    Amount(#[from] ParseAmountError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
