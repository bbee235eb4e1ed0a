// crates/lockstake-cli/src/config.rs
//
// Deployment configuration for the lockstake CLI.
// Loaded from a TOML file or populated with the reference defaults.

use serde::Deserialize;
use std::fs;

use lockstake_core::address::Address;
use lockstake_core::time::{Clock, ManualClock, SystemClock, Timestamp};
use lockstake_ledger::{Parameters, StakingLedger};
use lockstake_ledger::params::{
    DEFAULT_MAX_LOCK_WEEKS, DEFAULT_MIN_LOCK_WEEKS, DEFAULT_PENALTY_RATE_BPS,
    DEFAULT_REWARD_RATE_BPS, SECONDS_PER_WEEK,
};
use lockstake_token::{InMemoryToken, TokenAmount};

use crate::error::CliError;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "~/.lockstake/config.toml";

/// How to deploy the token and staking ledger a command runs against.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_token_name")]
    pub token_name: String,

    #[serde(default = "default_token_symbol")]
    pub token_symbol: String,

    /// Supply minted to the owner at deployment, in tokens (decimal string).
    #[serde(default = "default_initial_supply")]
    pub initial_supply: String,

    /// Account label (or 0x address) of the deployer and parameter owner.
    #[serde(default = "default_owner")]
    pub owner: String,

    /// Account label of the staking ledger's own token account.
    #[serde(default = "default_custody")]
    pub custody: String,

    /// Penalty destinations. Leaving either empty deploys without it, which
    /// disables penalized withdrawals until the owner sets one.
    #[serde(default = "default_treasury")]
    pub treasury: Option<String>,

    #[serde(default = "default_rewards_pool")]
    pub rewards_pool: Option<String>,

    #[serde(default = "default_reward_rate_bps")]
    pub reward_rate_bps: u32,

    #[serde(default = "default_penalty_rate_bps")]
    pub penalty_rate_bps: u32,

    #[serde(default = "default_min_lock_weeks")]
    pub min_lock_weeks: u64,

    #[serde(default = "default_max_lock_weeks")]
    pub max_lock_weeks: u64,

    /// Smallest accepted stake, in tokens (decimal string).
    #[serde(default = "default_minimum_deposit")]
    pub minimum_deposit: String,

    #[serde(default = "default_period_length_secs")]
    pub period_length_secs: u64,

    /// Unix time the replay clock starts at. Unset means the current time.
    #[serde(default)]
    pub start_time: Option<Timestamp>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_token_name() -> String {
    "Token".to_string()
}

fn default_token_symbol() -> String {
    "AQT".to_string()
}

fn default_initial_supply() -> String {
    "1000000000".to_string()
}

fn default_owner() -> String {
    "owner".to_string()
}

fn default_custody() -> String {
    "staking".to_string()
}

fn default_treasury() -> Option<String> {
    Some("treasury".to_string())
}

fn default_rewards_pool() -> Option<String> {
    Some("rewards-pool".to_string())
}

fn default_reward_rate_bps() -> u32 {
    DEFAULT_REWARD_RATE_BPS
}

fn default_penalty_rate_bps() -> u32 {
    DEFAULT_PENALTY_RATE_BPS
}

fn default_min_lock_weeks() -> u64 {
    DEFAULT_MIN_LOCK_WEEKS
}

fn default_max_lock_weeks() -> u64 {
    DEFAULT_MAX_LOCK_WEEKS
}

fn default_minimum_deposit() -> String {
    "0.001".to_string()
}

fn default_period_length_secs() -> u64 {
    SECONDS_PER_WEEK
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            token_name: default_token_name(),
            token_symbol: default_token_symbol(),
            initial_supply: default_initial_supply(),
            owner: default_owner(),
            custody: default_custody(),
            treasury: default_treasury(),
            rewards_pool: default_rewards_pool(),
            reward_rate_bps: default_reward_rate_bps(),
            penalty_rate_bps: default_penalty_rate_bps(),
            min_lock_weeks: default_min_lock_weeks(),
            max_lock_weeks: default_max_lock_weeks(),
            minimum_deposit: default_minimum_deposit(),
            period_length_secs: default_period_length_secs(),
            start_time: None,
            log_level: default_log_level(),
        }
    }
}

/// A freshly deployed token and staking ledger on a replay clock.
pub struct Deployment {
    pub ledger: StakingLedger<InMemoryToken, ManualClock>,
    pub clock: ManualClock,
    pub start: Timestamp,
}

impl LedgerConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, CliError> {
        let contents = fs::read_to_string(expand_tilde(path))?;
        Self::parse(&contents)
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self, CliError> {
        toml::from_str(contents).map_err(|e| CliError::Config(e.to_string()))
    }

    /// The staking parameters this configuration describes.
    pub fn parameters(&self) -> Result<Parameters, CliError> {
        let minimum_deposit: TokenAmount = self.minimum_deposit.parse()?;
        Ok(Parameters {
            reward_rate_bps: self.reward_rate_bps,
            penalty_rate_bps: self.penalty_rate_bps,
            min_lock_weeks: self.min_lock_weeks,
            max_lock_weeks: self.max_lock_weeks,
            period_length: self.period_length_secs,
            treasury: optional_account(&self.treasury)?,
            rewards_pool: optional_account(&self.rewards_pool)?,
            minimum_deposit: minimum_deposit.units,
        })
    }

    pub fn owner_address(&self) -> Result<Address, CliError> {
        resolve_account(&self.owner)
    }

    /// Deploy the token (full supply to the owner) and the staking ledger.
    ///
    /// The clock starts at `start_time`, or at the current wall-clock time
    /// when none is configured.
    pub fn deploy(&self) -> Result<Deployment, CliError> {
        let owner = self.owner_address()?;
        let custody = resolve_account(&self.custody)?;
        let supply: TokenAmount = self.initial_supply.parse()?;
        let params = self.parameters()?;

        let start = self.start_time.unwrap_or_else(|| SystemClock.now());
        let clock = ManualClock::new(start);
        let token = InMemoryToken::new(&self.token_name, &self.token_symbol, owner, supply.units);
        let ledger = StakingLedger::new(token, clock.clone(), owner, custody, params)?;

        tracing::info!(
            "Deployed {} ({}) with supply {} at {}",
            self.token_name,
            self.token_symbol,
            supply,
            start
        );
        Ok(Deployment { ledger, clock, start })
    }
}

/// Map an account label to an address.
///
/// `0x`-prefixed strings are parsed as literal addresses; anything else is
/// hashed with `Address::from_label`.
pub fn resolve_account(label: &str) -> Result<Address, CliError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(CliError::Config("empty account label".to_string()));
    }
    if label.starts_with("0x") {
        label
            .parse()
            .map_err(|e| CliError::Config(format!("{}: {}", label, e)))
    } else {
        Ok(Address::from_label(label))
    }
}

fn optional_account(label: &Option<String>) -> Result<Option<Address>, CliError> {
    match label.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(l) => resolve_account(l).map(Some),
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
