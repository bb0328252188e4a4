//! # Vault State
//!
//! The two totals that define a vault's exchange rate. `VaultState` is a
//! plain `Copy` value: transitions return a new state instead of mutating in
//! place, so a controller can compute the post-operation state, run every
//! remaining check, and only then commit it.

use serde::{Deserialize, Serialize};

use crate::math::{checked_add, checked_sub, Amount, MathError};

/// Aggregate accounting state of a single-asset vault.
///
/// `total_shares == 0` does not imply `total_assets == 0`: assets can be
/// donated without minting shares. Whenever `total_shares > 0` the ratio
/// `total_assets / total_shares` is the rate used by every conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VaultState {
    /// Asset units custodied by the vault.
    pub total_assets: Amount,
    /// Outstanding share supply.
    pub total_shares: Amount,
}

impl VaultState {
    /// The state of a freshly initialized vault.
    pub const EMPTY: VaultState = VaultState {
        total_assets: 0,
        total_shares: 0,
    };

    /// Creates a state with explicit totals.
    pub const fn new(total_assets: Amount, total_shares: Amount) -> Self {
        Self {
            total_assets,
            total_shares,
        }
    }

    /// Returns `true` when no shares are outstanding, i.e. the next
    /// conversion uses the 1:1 bootstrap rate.
    pub fn has_no_shares(&self) -> bool {
        self.total_shares == 0
    }

    /// State after `assets` enter custody and `shares` are minted.
    pub fn after_deposit(self, assets: Amount, shares: Amount) -> Result<Self, MathError> {
        Ok(Self {
            total_assets: checked_add(self.total_assets, assets)?,
            total_shares: checked_add(self.total_shares, shares)?,
        })
    }

    /// State after `shares` are burned and `assets` leave custody.
    ///
    /// Returns [`MathError::Underflow`] if either total would go negative.
    pub fn after_withdraw(self, assets: Amount, shares: Amount) -> Result<Self, MathError> {
        Ok(Self {
            total_assets: checked_sub(self.total_assets, assets)?,
            total_shares: checked_sub(self.total_shares, shares)?,
        })
    }

    /// State after `assets` arrive without any shares being minted.
    pub fn after_donation(self, assets: Amount) -> Result<Self, MathError> {
        Ok(Self {
            total_assets: checked_add(self.total_assets, assets)?,
            total_shares: self.total_shares,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        assert_eq!(VaultState::default(), VaultState::EMPTY);
        assert!(VaultState::EMPTY.has_no_shares());
    }

    #[test]
    fn deposit_then_withdraw_restores_totals() {
        let start = VaultState::new(300, 300);
        let after = start.after_deposit(100, 100).unwrap();
        assert_eq!(after, VaultState::new(400, 400));
        assert_eq!(after.after_withdraw(100, 100).unwrap(), start);
    }

    #[test]
    fn transitions_do_not_mutate_the_original() {
        let start = VaultState::new(10, 10);
        let _ = start.after_deposit(5, 5).unwrap();
        assert_eq!(start, VaultState::new(10, 10));
    }

    #[test]
    fn deposit_overflow_is_reported() {
        let full = VaultState::new(u128::MAX, 1);
        assert_eq!(full.after_deposit(1, 1), Err(MathError::Overflow));

        let full_shares = VaultState::new(1, u128::MAX);
        assert_eq!(full_shares.after_deposit(1, 1), Err(MathError::Overflow));
    }

    #[test]
    fn withdraw_underflow_is_reported() {
        let state = VaultState::new(10, 10);
        assert_eq!(state.after_withdraw(11, 1), Err(MathError::Underflow));
        assert_eq!(state.after_withdraw(1, 11), Err(MathError::Underflow));
    }

    #[test]
    fn donation_grows_assets_only() {
        let state = VaultState::new(100, 100).after_donation(50).unwrap();
        assert_eq!(state, VaultState::new(150, 100));

        // Donating into an empty vault leaves it without shares.
        let donated = VaultState::EMPTY.after_donation(7).unwrap();
        assert!(donated.has_no_shares());
        assert_eq!(donated.total_assets, 7);
    }
}
