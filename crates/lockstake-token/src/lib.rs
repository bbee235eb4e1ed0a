// crates/lockstake-token/src/lib.rs
//
// lockstake-token: the fungible token the staking ledger takes custody of.
//
// All monetary values are tracked in units (the smallest denomination).
// 1 token = 1,000,000,000,000,000,000 units (10^18).

pub mod amount;
pub mod ledger;

pub use amount::{ParseAmountError, TokenAmount, DECIMALS, UNITS_PER_TOKEN};
pub use ledger::InMemoryToken;
