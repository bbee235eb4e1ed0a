use thiserror::Error;

use crate::time::Timestamp;

/// Rejections reported by a token ledger.
///
/// A token ledger never lets a balance go negative and never moves funds
/// without an allowance; it reports one of these instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The source account does not hold enough tokens.
    #[error("Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    /// The spender has not been approved for enough tokens.
    #[error("Insufficient allowance: need {needed}, have {available}")]
    InsufficientAllowance { needed: u128, available: u128 },

    /// A balance or the total supply would exceed `u128::MAX`.
    #[error("Token arithmetic overflow")]
    Overflow,
}

/// Errors surfaced by the staking ledger.
///
/// Every variant is a rejected call: no partial effect of the call persists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StakingError {
    /// Stake amount is below the configured minimum deposit.
    #[error("Amount {amount} is smaller than the minimum deposit of {minimum}")]
    InsufficientAmount { amount: u128, minimum: u128 },

    /// Penalty-free unstake attempted while the stake is still locked.
    #[error("Staking period has not expired: locked until {lock_until}, now {now}")]
    LockNotExpired { lock_until: Timestamp, now: Timestamp },

    /// Withdrawal exceeds the account's current principal.
    #[error("Cannot withdraw {requested}: only {available} is staked")]
    InsufficientPrincipal { requested: u128, available: u128 },

    /// Caller is not the ledger owner.
    #[error("Caller is not the owner")]
    Unauthorized,

    /// The token ledger rejected a transfer, burn or allowance check.
    #[error("Token transfer failed: {0}")]
    TransferFailed(#[from] TokenError),

    /// A setter or call received a value that violates a stored invariant.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A computation overflowed `u128`/`u64`.
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}
