// crates/lockstake-core/src/lib.rs
//
// lockstake-core: Core types, traits, and error definitions for the
// Lockstake time-locked staking ledger.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines account addresses, timestamps and clocks, the error types
// surfaced by every ledger call, and the token-ledger interface the staking
// core consumes.

pub mod address;
pub mod error;
pub mod time;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use lockstake_core::Address;`

// Account types
pub use address::Address;

// Time
pub use time::{format_timestamp, Clock, ManualClock, SystemClock, Timestamp};

// Error types
pub use error::{StakingError, TokenError};

// Traits
pub use traits::TokenLedger;
