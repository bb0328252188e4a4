//! # Fungible Token Ledger
//!
//! In-memory fungible token with balances, allowances, and issuer-driven
//! mint and burn. It serves two roles:
//!
//! - the **underlying asset** ledger (the stRIF token users deposit), and
//! - the vault's **share** ledger (vRIF), minted and burned only by the vault.
//!
//! Supply and per-address balances are updated together. Every operation
//! checks first and mutates second, so a failed call changes nothing.
//!
//! An allowance of `Amount::MAX` is treated as unlimited and never
//! decremented.

use std::collections::HashMap;

use vault_protocol::{Address, Amount, AssetLedger, LedgerError, ShareLedger};

/// A fungible token ledger.
#[derive(Debug, Clone)]
pub struct FungibleToken {
    /// Human-readable name (e.g., "Staked RIF").
    name: String,
    /// Ticker (e.g., "stRIF").
    symbol: String,
    /// Decimal places, for display only.
    decimals: u8,
    /// Address of the token itself.
    address: Address,
    /// Sum of all balances.
    total_supply: Amount,
    /// Per-holder balances. Zero balances are removed.
    balances: HashMap<Address, Amount>,
    /// `(owner, spender) -> remaining allowance`.
    allowances: HashMap<(Address, Address), Amount>,
}

impl FungibleToken {
    /// Creates a token with zero supply.
    pub fn new(name: &str, symbol: &str, decimals: u8, address: Address) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
            address,
            total_supply: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Address of the token contract.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Balance of `account`, or 0.
    pub fn balance_of(&self, account: Address) -> Amount {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    /// Remaining amount `spender` may move on behalf of `owner`.
    pub fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
    }

    /// Iterates over every non-zero balance.
    pub fn holders(&self) -> impl Iterator<Item = (Address, Amount)> + '_ {
        self.balances.iter().map(|(a, b)| (*a, *b))
    }

    /// Number of accounts with a non-zero balance.
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Sets the allowance of `spender` over `owner`'s tokens, replacing any
    /// previous value.
    pub fn approve(&mut self, owner: Address, spender: Address, amount: Amount) {
        if amount == 0 {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }
    }

    /// Moves `amount` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientBalance`] if `from` holds less
    /// than `amount`, [`LedgerError::Overflow`] if `to`'s balance would
    /// overflow.
    pub fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<(), LedgerError> {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(LedgerError::InsufficientBalance {
                account: from,
                balance: from_balance,
                required: amount,
            });
        }
        if from == to || amount == 0 {
            return Ok(());
        }

        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.set_balance(from, from_balance - amount);
        self.set_balance(to, to_balance);
        Ok(())
    }

    /// Moves `amount` from `from` to `to` using `spender`'s allowance.
    ///
    /// The allowance is checked before the balance, matching the order in
    /// which an ERC-20 `transferFrom` fails.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.check_allowance(from, spender, amount)?;
        self.transfer(from, to, amount)?;
        self.consume_allowance(from, spender, amount);
        Ok(())
    }

    /// Consumes `amount` of the `owner → spender` allowance without moving
    /// tokens.
    pub fn spend_allowance(
        &mut self,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.check_allowance(owner, spender, amount)?;
        self.consume_allowance(owner, spender, amount);
        Ok(())
    }

    /// Creates `amount` new tokens for `to`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Overflow`] if the total supply would exceed
    /// `Amount::MAX`. A balance never exceeds the supply, so the balance
    /// update cannot overflow once the supply update succeeded.
    pub fn mint(&mut self, to: Address, amount: Amount) -> Result<(), LedgerError> {
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let new_balance = self.balance_of(to) + amount;

        self.total_supply = new_supply;
        self.set_balance(to, new_balance);
        Ok(())
    }

    /// Destroys `amount` tokens held by `from`.
    pub fn burn(&mut self, from: Address, amount: Amount) -> Result<(), LedgerError> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                account: from,
                balance,
                required: amount,
            });
        }

        self.set_balance(from, balance - amount);
        self.total_supply -= amount;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn set_balance(&mut self, account: Address, balance: Amount) {
        if balance == 0 {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, balance);
        }
    }

    fn check_allowance(
        &self,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let allowance = self.allowance(owner, spender);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner,
                spender,
                allowance,
                required: amount,
            });
        }
        Ok(())
    }

    /// Caller must have checked the allowance.
    fn consume_allowance(&mut self, owner: Address, spender: Address, amount: Amount) {
        let allowance = self.allowance(owner, spender);
        if allowance != Amount::MAX {
            self.approve(owner, spender, allowance - amount);
        }
    }
}

impl AssetLedger for FungibleToken {
    fn address(&self) -> Address {
        self.address
    }

    fn balance_of(&self, account: Address) -> Amount {
        FungibleToken::balance_of(self, account)
    }

    fn allowance(&self, owner: Address, spender: Address) -> Amount {
        FungibleToken::allowance(self, owner, spender)
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<(), LedgerError> {
        FungibleToken::transfer(self, from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        FungibleToken::transfer_from(self, spender, from, to, amount)
    }

    fn mint(&mut self, to: Address, amount: Amount) -> Result<(), LedgerError> {
        FungibleToken::mint(self, to, amount)
    }
}

impl ShareLedger for FungibleToken {
    fn balance_of(&self, owner: Address) -> Amount {
        FungibleToken::balance_of(self, owner)
    }

    fn total_supply(&self) -> Amount {
        self.total_supply
    }

    fn allowance(&self, owner: Address, spender: Address) -> Amount {
        FungibleToken::allowance(self, owner, spender)
    }

    fn mint_shares(&mut self, to: Address, amount: Amount) -> Result<(), LedgerError> {
        self.mint(to, amount)
    }

    fn burn_shares(&mut self, from: Address, amount: Amount) -> Result<(), LedgerError> {
        self.burn(from, amount)
    }

    fn spend_allowance(
        &mut self,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        FungibleToken::spend_allowance(self, owner, spender, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> FungibleToken {
        FungibleToken::new("Staked RIF", "stRIF", 18, Address::from_label("strif"))
    }

    fn alice() -> Address {
        Address::from_label("alice")
    }

    fn bob() -> Address {
        Address::from_label("bob")
    }

    #[test]
    fn metadata() {
        let t = token();
        assert_eq!(t.name(), "Staked RIF");
        assert_eq!(t.symbol(), "stRIF");
        assert_eq!(t.decimals(), 18);
        assert_eq!(t.total_supply(), 0);
    }

    #[test]
    fn mint_increases_supply_and_balance() {
        let mut t = token();
        t.mint(alice(), 1_000).unwrap();
        assert_eq!(t.total_supply(), 1_000);
        assert_eq!(t.balance_of(alice()), 1_000);
        assert_eq!(t.holder_count(), 1);
    }

    #[test]
    fn mint_overflow_rejected_without_change() {
        let mut t = token();
        t.mint(alice(), Amount::MAX).unwrap();
        assert_eq!(t.mint(bob(), 1), Err(LedgerError::Overflow));
        assert_eq!(t.balance_of(bob()), 0);
        assert_eq!(t.total_supply(), Amount::MAX);
    }

    #[test]
    fn burn_decreases_supply_and_balance() {
        let mut t = token();
        t.mint(alice(), 1_000).unwrap();
        t.burn(alice(), 400).unwrap();
        assert_eq!(t.total_supply(), 600);
        assert_eq!(t.balance_of(alice()), 600);
    }

    #[test]
    fn burn_more_than_balance_rejected() {
        let mut t = token();
        t.mint(alice(), 100).unwrap();
        assert!(matches!(
            t.burn(alice(), 200),
            Err(LedgerError::InsufficientBalance {
                balance: 100,
                required: 200,
                ..
            })
        ));
        assert_eq!(t.balance_of(alice()), 100);
    }

    #[test]
    fn transfer_moves_balance() {
        let mut t = token();
        t.mint(alice(), 1_000).unwrap();
        t.transfer(alice(), bob(), 500).unwrap();
        assert_eq!(t.balance_of(alice()), 500);
        assert_eq!(t.balance_of(bob()), 500);
        assert_eq!(t.total_supply(), 1_000);
    }

    #[test]
    fn transfer_to_self_is_a_no_op() {
        let mut t = token();
        t.mint(alice(), 10).unwrap();
        t.transfer(alice(), alice(), 10).unwrap();
        assert_eq!(t.balance_of(alice()), 10);
        assert!(t.transfer(alice(), alice(), 11).is_err());
    }

    #[test]
    fn transfer_from_requires_allowance() {
        let mut t = token();
        t.mint(alice(), 1_000).unwrap();

        let err = t.transfer_from(bob(), alice(), bob(), 1).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientAllowance { allowance: 0, .. }));

        t.approve(alice(), bob(), 300);
        t.transfer_from(bob(), alice(), bob(), 200).unwrap();
        assert_eq!(t.allowance(alice(), bob()), 100);
        assert_eq!(t.balance_of(bob()), 200);
    }

    #[test]
    fn transfer_from_keeps_allowance_when_balance_is_short() {
        let mut t = token();
        t.mint(alice(), 50).unwrap();
        t.approve(alice(), bob(), 100);

        let err = t.transfer_from(bob(), alice(), bob(), 80).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert_eq!(t.allowance(alice(), bob()), 100);
        assert_eq!(t.balance_of(alice()), 50);
    }

    #[test]
    fn unlimited_allowance_is_not_decremented() {
        let mut t = token();
        t.mint(alice(), 1_000).unwrap();
        t.approve(alice(), bob(), Amount::MAX);
        t.transfer_from(bob(), alice(), bob(), 600).unwrap();
        assert_eq!(t.allowance(alice(), bob()), Amount::MAX);
    }

    #[test]
    fn spend_allowance_consumes_without_moving_tokens() {
        let mut t = token();
        t.mint(alice(), 100).unwrap();
        t.approve(alice(), bob(), 40);
        ShareLedger::spend_allowance(&mut t, alice(), bob(), 15).unwrap();
        assert_eq!(t.allowance(alice(), bob()), 25);
        assert_eq!(t.balance_of(alice()), 100);
        assert!(ShareLedger::spend_allowance(&mut t, alice(), bob(), 26).is_err());
    }

    #[test]
    fn holders_sum_to_supply() {
        let mut t = token();
        t.mint(alice(), 70).unwrap();
        t.mint(bob(), 30).unwrap();
        t.transfer(alice(), bob(), 70).unwrap();
        let sum: Amount = t.holders().map(|(_, b)| b).sum();
        assert_eq!(sum, t.total_supply());
        // Alice's emptied balance is pruned.
        assert_eq!(t.holder_count(), 1);
    }
}
