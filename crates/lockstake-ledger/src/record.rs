// crates/lockstake-ledger/src/record.rs
//
// Per-account stake records.
//
// A record is created lazily the first time an account is touched and is
// never deleted, so an account's auto-extend preference survives a full
// withdrawal. When `principal` is zero, `lock_until` and `last_accrual_time`
// carry no meaning and are reset by the next stake.

use serde::{Deserialize, Serialize};

use lockstake_core::time::Timestamp;

/// Auto-extend preference of an account.
///
/// Accounts that never chose a preference are `Unset`, which reads as enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoExtend {
    #[default]
    Unset,
    Enabled,
    Disabled,
}

impl AutoExtend {
    /// Whether the lock rolls forward on settlement.
    pub fn is_enabled(self) -> bool {
        !matches!(self, AutoExtend::Disabled)
    }

    pub fn from_flag(enabled: bool) -> Self {
        if enabled {
            AutoExtend::Enabled
        } else {
            AutoExtend::Disabled
        }
    }
}

/// A single account's stake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRecord {
    /// Staked amount in units, including already-settled rewards.
    pub principal: u128,
    /// The stake is locked while `now < lock_until`.
    pub lock_until: Timestamp,
    /// Time up to which compounding has been folded into `principal`.
    pub last_accrual_time: Timestamp,
    /// Auto-extend preference.
    pub auto_extend: AutoExtend,
}

impl StakeRecord {
    /// An empty record whose clocks start at `now`.
    pub fn new(now: Timestamp) -> Self {
        Self {
            principal: 0,
            lock_until: now,
            last_accrual_time: now,
            auto_extend: AutoExtend::Unset,
        }
    }

    /// Whether penalty-free withdrawal is still disallowed at `now`.
    pub fn is_locked(&self, now: Timestamp) -> bool {
        now < self.lock_until
    }

    /// Restart both clocks at `now` if the record holds no principal.
    ///
    /// Keeps the auto-extend preference.
    pub fn reset_if_empty(&mut self, now: Timestamp) {
        if self.principal == 0 {
            self.lock_until = now;
            self.last_accrual_time = now;
        }
    }
}
