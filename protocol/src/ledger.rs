//! # Ledger Interfaces
//!
//! The vault never keeps token balances itself. Asset custody lives on the
//! underlying token's ledger and share balances on the share token's ledger;
//! the vault drives both through the traits below.
//!
//! Implementations must be all-or-nothing per call: a method that returns an
//! error leaves every balance and allowance untouched.

use thiserror::Error;

use crate::address::Address;
use crate::math::Amount;

/// Errors reported by a token ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// `account` holds less than the operation needs.
    #[error("insufficient balance: {account} has {balance}, needs {required}")]
    InsufficientBalance {
        account: Address,
        balance: Amount,
        required: Amount,
    },

    /// `spender` is approved for less than the operation needs.
    #[error(
        "insufficient allowance: {spender} may spend {allowance} of {owner}'s tokens, needs {required}"
    )]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        allowance: Amount,
        required: Amount,
    },

    /// A balance or the supply would exceed `u128::MAX`.
    #[error("token supply overflow")]
    Overflow,
}

/// The underlying asset token, as seen by the vault.
pub trait AssetLedger {
    /// Address of the asset token.
    fn address(&self) -> Address;

    /// Balance of `account`.
    fn balance_of(&self, account: Address) -> Amount;

    /// Amount `spender` may move out of `owner`'s balance.
    fn allowance(&self, owner: Address, spender: Address) -> Amount;

    /// Decimal places used for display.
    fn decimals(&self) -> u8;

    /// Moves `amount` from `from` to `to` on `from`'s own authority.
    fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<(), LedgerError>;

    /// Moves `amount` from `from` to `to` on `spender`'s authority, consuming
    /// that much of the `from → spender` allowance.
    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Creates `amount` new tokens for `to`.
    fn mint(&mut self, to: Address, amount: Amount) -> Result<(), LedgerError>;
}

/// The vault's share token, as seen by the vault.
pub trait ShareLedger {
    /// Share balance of `owner`.
    fn balance_of(&self, owner: Address) -> Amount;

    /// Sum of all share balances.
    fn total_supply(&self) -> Amount;

    /// Shares `spender` may burn on `owner`'s behalf.
    fn allowance(&self, owner: Address, spender: Address) -> Amount;

    /// Credits `amount` new shares to `to`.
    fn mint_shares(&mut self, to: Address, amount: Amount) -> Result<(), LedgerError>;

    /// Destroys `amount` shares held by `from`.
    fn burn_shares(&mut self, from: Address, amount: Amount) -> Result<(), LedgerError>;

    /// Consumes `amount` of the `owner → spender` allowance.
    fn spend_allowance(
        &mut self,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), LedgerError>;
}
