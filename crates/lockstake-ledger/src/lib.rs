// crates/lockstake-ledger/src/lib.rs
//
// lockstake-ledger: the time-locked staking core.
//
// Accounts deposit tokens for a chosen number of weekly periods, earn
// compounding rewards while locked, and withdraw either penalty-free after
// the lock expires or early against a penalty that is burned, sent to the
// treasury, and sent to the rewards pool.
//
// All monetary values are in the token's smallest unit.

pub mod accrual;
pub mod events;
pub mod params;
pub mod penalty;
pub mod query;
pub mod record;
pub mod shared;
pub mod staking;

// Re-export key types for ergonomic access from downstream crates.
pub use accrual::{compound, settle, weeks_remaining, Settlement};
pub use events::StakingEvent;
pub use params::{
    ParameterChange, ParameterStore, Parameters, RATE_DENOMINATOR, SECONDS_PER_WEEK,
};
pub use penalty::{split_penalty, PenaltySplit};
pub use query::{DepositInfo, ScheduledAccrual, StakeInfo};
pub use record::{AutoExtend, StakeRecord};
pub use shared::SharedLedger;
pub use staking::StakingLedger;
