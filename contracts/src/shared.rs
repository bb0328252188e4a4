//! Thread-safe handle to a vault.
//!
//! Mutating operations take the write lock for their whole duration, so two
//! concurrent deposits never read the same totals. Previews and queries take
//! the read lock and see a consistent `(total_assets, total_shares)` pair.

use std::sync::Arc;

use parking_lot::RwLock;

use vault_protocol::{Address, Amount, AssetLedger, ShareLedger, VaultError, VaultState};

use crate::fungible_token::FungibleToken;
use crate::tokenized_vault::{Receipt, TokenizedVault};

/// Cloneable, lock-protected [`TokenizedVault`].
#[derive(Debug)]
pub struct SharedVault<A: AssetLedger, S: ShareLedger = FungibleToken> {
    inner: Arc<RwLock<TokenizedVault<A, S>>>,
}

impl<A: AssetLedger, S: ShareLedger> Clone for SharedVault<A, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: AssetLedger, S: ShareLedger> From<TokenizedVault<A, S>> for SharedVault<A, S> {
    fn from(vault: TokenizedVault<A, S>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(vault)),
        }
    }
}

impl<A: AssetLedger, S: ShareLedger> SharedVault<A, S> {
    pub fn new(vault: TokenizedVault<A, S>) -> Self {
        Self::from(vault)
    }

    pub fn deposit(
        &self,
        caller: Address,
        assets: Amount,
        receiver: Address,
    ) -> Result<Receipt, VaultError> {
        self.inner.write().deposit(caller, assets, receiver)
    }

    pub fn mint(
        &self,
        caller: Address,
        shares: Amount,
        receiver: Address,
    ) -> Result<Receipt, VaultError> {
        self.inner.write().mint(caller, shares, receiver)
    }

    pub fn withdraw(
        &self,
        caller: Address,
        assets: Amount,
        receiver: Address,
        owner: Address,
    ) -> Result<Receipt, VaultError> {
        self.inner.write().withdraw(caller, assets, receiver, owner)
    }

    pub fn redeem(
        &self,
        caller: Address,
        shares: Amount,
        receiver: Address,
        owner: Address,
    ) -> Result<Receipt, VaultError> {
        self.inner.write().redeem(caller, shares, receiver, owner)
    }

    pub fn preview_deposit(&self, assets: Amount) -> Result<Amount, VaultError> {
        self.inner.read().preview_deposit(assets)
    }

    pub fn preview_mint(&self, shares: Amount) -> Result<Amount, VaultError> {
        self.inner.read().preview_mint(shares)
    }

    pub fn preview_withdraw(&self, assets: Amount) -> Result<Amount, VaultError> {
        self.inner.read().preview_withdraw(assets)
    }

    pub fn preview_redeem(&self, shares: Amount) -> Result<Amount, VaultError> {
        self.inner.read().preview_redeem(shares)
    }

    pub fn state(&self) -> VaultState {
        self.inner.read().state()
    }

    pub fn balance_of(&self, owner: Address) -> Amount {
        self.inner.read().balance_of(owner)
    }

    /// Runs `f` with shared access to the vault.
    pub fn read<R>(&self, f: impl FnOnce(&TokenizedVault<A, S>) -> R) -> R {
        f(&self.inner.read())
    }

    /// Runs `f` with exclusive access to the vault. Everything `f` does is
    /// atomic with respect to other handles.
    pub fn write<R>(&self, f: impl FnOnce(&mut TokenizedVault<A, S>) -> R) -> R {
        f(&mut self.inner.write())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use vault_protocol::config::VaultConfig;

    #[test]
    fn concurrent_deposits_and_redeems_keep_supply_consistent() {
        let asset = FungibleToken::new("Asset", "AST", 18, Address::from_label("asset"));
        let mut vault = TokenizedVault::new(VaultConfig::default(), asset);
        let vault_addr = vault.address();

        let users: Vec<Address> = (0..8)
            .map(|i| Address::from_label(&format!("user-{i}")))
            .collect();
        for user in &users {
            vault.asset_ledger_mut().mint(*user, 10_000).unwrap();
            vault.asset_ledger_mut().approve(*user, vault_addr, Amount::MAX);
        }
        let shared = SharedVault::new(vault);

        let handles: Vec<_> = users
            .iter()
            .copied()
            .map(|user| {
                let vault = shared.clone();
                thread::spawn(move || {
                    for round in 1..=50u128 {
                        vault.deposit(user, round * 3, user).unwrap();
                        if round % 5 == 0 {
                            let half = vault.balance_of(user) / 2;
                            vault.redeem(user, half, user, user).unwrap();
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        shared.read(|vault| {
            let held: Amount = users.iter().map(|u| vault.balance_of(*u)).sum();
            assert_eq!(held, vault.total_supply());
            assert_eq!(vault.share_ledger().total_supply(), vault.total_supply());
            assert_eq!(
                vault.asset_ledger().balance_of(vault.address()),
                vault.total_assets()
            );
            assert_eq!(vault.events().len(), 8 * (50 + 10));
        });
    }
}
