//! Errors surfaced by vault operations.
//!
//! Every variant means the operation was rejected as a whole: no balance,
//! allowance or total changed.

use thiserror::Error;

use crate::address::Address;
use crate::conversion::Operation;
use crate::ledger::LedgerError;
use crate::math::Amount;

/// Why a vault operation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    /// A mutating call was given a zero amount.
    #[error("invalid amount: cannot {operation} zero")]
    InvalidAmount { operation: Operation },

    /// The spender lacks delegated rights over the owner's assets or shares.
    #[error(
        "insufficient allowance: {spender} may spend {allowance} of {owner}'s tokens, needs {required}"
    )]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        allowance: Amount,
        required: Amount,
    },

    /// An account does not hold enough of the underlying asset.
    #[error("insufficient balance: {account} holds {balance} assets, needs {required}")]
    InsufficientBalance {
        account: Address,
        balance: Amount,
        required: Amount,
    },

    /// The owner does not hold enough shares.
    #[error("insufficient shares: {owner} holds {balance} shares, needs {required}")]
    InsufficientShares {
        owner: Address,
        balance: Amount,
        required: Amount,
    },

    /// An amount or intermediate product exceeded the representable range.
    #[error("arithmetic overflow in {context}")]
    ArithmeticOverflow { context: &'static str },

    /// A vault was deployed over a share ledger that already has supply.
    #[error("share ledger must start empty, found supply {supply}")]
    ShareLedgerNotEmpty { supply: Amount },
}

impl VaultError {
    /// Shorthand for [`VaultError::ArithmeticOverflow`].
    pub fn overflow(context: &'static str) -> Self {
        VaultError::ArithmeticOverflow { context }
    }

    /// Maps an error from the underlying asset ledger.
    pub fn from_asset_ledger(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientBalance {
                account,
                balance,
                required,
            } => VaultError::InsufficientBalance {
                account,
                balance,
                required,
            },
            LedgerError::InsufficientAllowance {
                owner,
                spender,
                allowance,
                required,
            } => VaultError::InsufficientAllowance {
                owner,
                spender,
                allowance,
                required,
            },
            LedgerError::Overflow => VaultError::ArithmeticOverflow {
                context: "asset ledger",
            },
        }
    }

    /// Maps an error from the share ledger.
    pub fn from_share_ledger(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientBalance {
                account,
                balance,
                required,
            } => VaultError::InsufficientShares {
                owner: account,
                balance,
                required,
            },
            LedgerError::InsufficientAllowance {
                owner,
                spender,
                allowance,
                required,
            } => VaultError::InsufficientAllowance {
                owner,
                spender,
                allowance,
                required,
            },
            LedgerError::Overflow => VaultError::ArithmeticOverflow {
                context: "share ledger",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_amount_names_the_operation() {
        let err = VaultError::InvalidAmount {
            operation: Operation::Redeem,
        };
        assert_eq!(err.to_string(), "invalid amount: cannot redeem zero");
    }

    #[test]
    fn share_ledger_balance_errors_become_insufficient_shares() {
        let owner = Address::from_label("owner");
        let err = VaultError::from_share_ledger(LedgerError::InsufficientBalance {
            account: owner,
            balance: 1,
            required: 2,
        });
        assert_eq!(
            err,
            VaultError::InsufficientShares {
                owner,
                balance: 1,
                required: 2
            }
        );
    }

    #[test]
    fn asset_ledger_errors_keep_their_kind() {
        let a = Address::from_label("a");
        let b = Address::from_label("b");
        let err = VaultError::from_asset_ledger(LedgerError::InsufficientAllowance {
            owner: a,
            spender: b,
            allowance: 0,
            required: 5,
        });
        assert!(matches!(err, VaultError::InsufficientAllowance { .. }));
        assert_eq!(
            VaultError::from_asset_ledger(LedgerError::Overflow),
            VaultError::ArithmeticOverflow {
                context: "asset ledger"
            }
        );
    }

    #[test]
    fn non_empty_share_ledger_reports_supply() {
        let err = VaultError::ShareLedgerNotEmpty { supply: 42 };
        assert_eq!(err.to_string(), "share ledger must start empty, found supply 42");
    }
}
