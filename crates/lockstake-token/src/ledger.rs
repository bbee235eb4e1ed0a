// crates/lockstake-token/src/ledger.rs
//
// In-memory fungible token ledger.
//
// Tracks balances, allowances and the total supply. The full initial supply
// is minted to the owner at creation; afterwards supply only ever shrinks
// through `burn`. Every failed operation leaves all balances unchanged.

use std::collections::HashMap;

use lockstake_core::address::Address;
use lockstake_core::error::TokenError;
use lockstake_core::traits::TokenLedger;

/// A fungible token held entirely in memory.
#[derive(Debug, Clone)]
pub struct InMemoryToken {
    name: String,
    symbol: String,
    owner: Address,
    total_supply: u128,
    balances: HashMap<Address, u128>,
    /// Keyed by (owner, spender).
    allowances: HashMap<(Address, Address), u128>,
}

impl InMemoryToken {
    /// Create a token and mint `initial_supply` units to `owner`.
    pub fn new(name: &str, symbol: &str, owner: Address, initial_supply: u128) -> Self {
        let mut balances = HashMap::new();
        if initial_supply > 0 {
            balances.insert(owner, initial_supply);
        }
        tracing::debug!("Minted {} {} to {}", initial_supply, symbol, owner);
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            owner,
            total_supply: initial_supply,
            balances,
            allowances: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The account that received the initial mint.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Set the amount `spender` may move out of `owner`'s balance.
    ///
    /// Overwrites any previous allowance, as ERC-20 style tokens do.
    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) {
        if amount == 0 {
            self.allowances.remove(&(*owner, *spender));
        } else {
            self.allowances.insert((*owner, *spender), amount);
        }
    }

    /// Debit `from` and credit `to` after validating both sides.
    fn move_balance(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError> {
        let available = self.balance_of(from);
        if amount > available {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;

        self.set_balance(from, available - amount);
        self.set_balance(to, credited);
        Ok(())
    }

    fn set_balance(&mut self, account: &Address, balance: u128) {
        if balance == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(*account, balance);
        }
    }
}

impl TokenLedger for InMemoryToken {
    fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> u128 {
        self.total_supply
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError> {
        self.move_balance(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), TokenError> {
        let allowed = self.allowance(from, spender);
        if amount > allowed {
            return Err(TokenError::InsufficientAllowance {
                needed: amount,
                available: allowed,
            });
        }
        self.move_balance(from, to, amount)?;
        self.approve(from, spender, allowed - amount);
        Ok(())
    }

    fn burn(&mut self, from: &Address, amount: u128) -> Result<(), TokenError> {
        let available = self.balance_of(from);
        if amount > available {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        self.set_balance(from, available - amount);
        self.total_supply -= amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::UNITS_PER_TOKEN;

    fn alice() -> Address {
        Address::from_label("alice")
    }

    fn bob() -> Address {
        Address::from_label("bob")
    }

    fn vault() -> Address {
        Address::from_label("vault")
    }

    fn make_token() -> InMemoryToken {
        InMemoryToken::new("Token", "AQT", alice(), 1_000 * UNITS_PER_TOKEN)
    }

    #[test]
    fn test_initial_mint_goes_to_owner() {
        let token = make_token();
        assert_eq!(token.owner(), alice());
        assert_eq!(token.balance_of(&alice()), 1_000 * UNITS_PER_TOKEN);
        assert_eq!(token.total_supply(), 1_000 * UNITS_PER_TOKEN);
        assert_eq!(token.balance_of(&bob()), 0);
        assert_eq!(token.symbol(), "AQT");
        assert_eq!(token.name(), "Token");
    }

    #[test]
    fn test_transfer() {
        let mut token = make_token();
        token.transfer(&alice(), &bob(), UNITS_PER_TOKEN).unwrap();
        assert_eq!(token.balance_of(&bob()), UNITS_PER_TOKEN);
        assert_eq!(token.balance_of(&alice()), 999 * UNITS_PER_TOKEN);
        assert_eq!(token.total_supply(), 1_000 * UNITS_PER_TOKEN);
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut token = make_token();
        let result = token.transfer(&bob(), &alice(), 1);
        assert_eq!(
            result,
            Err(TokenError::InsufficientBalance {
                needed: 1,
                available: 0
            })
        );
        // Balances should be unchanged
        assert_eq!(token.balance_of(&alice()), 1_000 * UNITS_PER_TOKEN);
    }

    #[test]
    fn test_transfer_to_self_is_noop() {
        let mut token = make_token();
        token.transfer(&alice(), &alice(), 10).unwrap();
        assert_eq!(token.balance_of(&alice()), 1_000 * UNITS_PER_TOKEN);
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let mut token = make_token();
        token.approve(&alice(), &vault(), 100);
        assert_eq!(token.allowance(&alice(), &vault()), 100);

        token.transfer_from(&vault(), &alice(), &vault(), 60).unwrap();
        assert_eq!(token.balance_of(&vault()), 60);
        assert_eq!(token.allowance(&alice(), &vault()), 40);
    }

    #[test]
    fn test_transfer_from_without_allowance() {
        let mut token = make_token();
        let result = token.transfer_from(&vault(), &alice(), &vault(), 1);
        assert_eq!(
            result,
            Err(TokenError::InsufficientAllowance {
                needed: 1,
                available: 0
            })
        );
        assert_eq!(token.balance_of(&vault()), 0);
    }

    #[test]
    fn test_transfer_from_balance_failure_keeps_allowance() {
        let mut token = make_token();
        token.approve(&bob(), &vault(), 100);
        assert!(token.transfer_from(&vault(), &bob(), &vault(), 50).is_err());
        assert_eq!(token.allowance(&bob(), &vault()), 100);
    }

    #[test]
    fn test_burn_reduces_supply() {
        let mut token = make_token();
        token.burn(&alice(), 400 * UNITS_PER_TOKEN).unwrap();
        assert_eq!(token.total_supply(), 600 * UNITS_PER_TOKEN);
        assert_eq!(token.balance_of(&alice()), 600 * UNITS_PER_TOKEN);
        assert!(token.burn(&bob(), 1).is_err());
        assert_eq!(token.total_supply(), 600 * UNITS_PER_TOKEN);
    }
}
