// crates/lockstake-core/src/traits.rs

use crate::address::Address;
use crate::error::TokenError;

/// Interface the staking ledger consumes from a fungible token ledger.
///
/// Implemented by lockstake-token (in-memory ledger). Every method reports
/// an error rather than allowing a negative balance or an unapproved
/// transfer, and a failed call leaves all balances unchanged.
///
/// `transfer` and `burn` must succeed whenever `from` holds at least
/// `amount`. The staking ledger checks its custody balance once and then
/// makes several of these calls in a row, relying on none of them failing.
pub trait TokenLedger {
    /// Balance held by `account`, in the smallest token unit.
    fn balance_of(&self, account: &Address) -> u128;

    /// Total tokens in existence.
    fn total_supply(&self) -> u128;

    /// Remaining amount `spender` may move out of `owner`'s balance.
    fn allowance(&self, owner: &Address, spender: &Address) -> u128;

    /// Move `amount` from `from` to `to`, authorized by `from` itself.
    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError>;

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming
    /// `spender`'s allowance over `from`.
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), TokenError>;

    /// Destroy `amount` of `from`'s tokens, reducing the total supply.
    fn burn(&mut self, from: &Address, amount: u128) -> Result<(), TokenError>;
}
