// crates/lockstake-ledger/src/events.rs
//
// Events recorded by the staking ledger on every successful mutation.
//
// The ledger appends to an in-memory log; callers read it with `events()`
// or take ownership of pending entries with `drain_events()`.

use serde::Serialize;

use lockstake_core::address::Address;
use lockstake_core::time::Timestamp;

use crate::params::ParameterChange;
use crate::penalty::PenaltySplit;

/// A state change of the staking ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StakingEvent {
    /// Pending reward was folded into an account's principal.
    Settled {
        account: Address,
        periods: u64,
        reward: u128,
        lock_until: Timestamp,
    },
    /// A stake was created or topped up through `stake`/`stake_for`.
    Staked {
        account: Address,
        /// The account whose tokens were pulled.
        funder: Address,
        amount: u128,
        /// Principal after the stake.
        total: u128,
        lock_until: Timestamp,
    },
    /// Principal was increased without touching the lock.
    StakeIncreased {
        account: Address,
        funder: Address,
        amount: u128,
        total: u128,
    },
    /// The lock was pushed further out.
    LockExtended {
        account: Address,
        lock_until: Timestamp,
    },
    /// An account changed its auto-extend preference.
    AutoExtendChanged {
        account: Address,
        enabled: bool,
    },
    /// Penalty-free withdrawal after the lock expired.
    Unstaked {
        account: Address,
        amount: u128,
        total: u128,
    },
    /// Early withdrawal with a penalty.
    UnstakedWithPenalty {
        account: Address,
        split: PenaltySplit,
        total: u128,
    },
    /// The owner changed a parameter.
    ParameterChanged {
        #[serde(flatten)]
        change: ParameterChange,
    },
}
