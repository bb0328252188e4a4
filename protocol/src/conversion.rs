//! # Conversion Engine
//!
//! Pure functions converting between asset amounts and share amounts at the
//! rate defined by a [`VaultState`]. The rounding direction is an explicit
//! argument because the two directions are not symmetric: each vault
//! operation rounds against the caller so repeated operations can never
//! extract value from the pool.
//!
//! | Operation | Caller gives | Computed | Rounding |
//! |-----------|--------------|----------|----------|
//! | deposit   | assets       | shares   | Down     |
//! | mint      | shares       | assets   | Up       |
//! | withdraw  | assets       | shares   | Up       |
//! | redeem    | shares       | assets   | Down     |
//!
//! An empty vault (`total_shares == 0`) converts 1:1 in both directions.

use serde::{Deserialize, Serialize};

use crate::math::{mul_div, Amount, MathError, Rounding};
use crate::state::VaultState;

/// Converts an asset amount into shares.
///
/// Returns `assets` unchanged while no shares exist, and also when the
/// state holds shares but no assets (not reachable through the vault
/// operations; treated as a fresh start rather than a division by zero).
pub fn assets_to_shares(
    assets: Amount,
    state: VaultState,
    rounding: Rounding,
) -> Result<Amount, MathError> {
    if state.total_shares == 0 || state.total_assets == 0 {
        return Ok(assets);
    }
    mul_div(assets, state.total_shares, state.total_assets, rounding)
}

/// Converts a share amount into assets.
pub fn shares_to_assets(
    shares: Amount,
    state: VaultState,
    rounding: Rounding,
) -> Result<Amount, MathError> {
    if state.total_shares == 0 {
        return Ok(shares);
    }
    mul_div(shares, state.total_assets, state.total_shares, rounding)
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// The four mutating vault operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Caller supplies assets, receives shares.
    Deposit,
    /// Caller names the shares wanted, pays the assets they cost.
    Mint,
    /// Caller names the assets wanted, burns the shares they cost.
    Withdraw,
    /// Caller supplies shares, receives assets.
    Redeem,
}

impl Operation {
    /// All operations, in a stable order.
    pub const ALL: [Operation; 4] = [
        Operation::Deposit,
        Operation::Mint,
        Operation::Withdraw,
        Operation::Redeem,
    ];

    /// Rounding applied when computing this operation's derived amount.
    pub const fn rounding(self) -> Rounding {
        match self {
            Operation::Deposit | Operation::Redeem => Rounding::Down,
            Operation::Mint | Operation::Withdraw => Rounding::Up,
        }
    }

    /// `true` if the caller-specified amount is denominated in assets.
    pub const fn takes_assets(self) -> bool {
        matches!(self, Operation::Deposit | Operation::Withdraw)
    }

    /// Computes the derived amount this operation would use against `state`.
    ///
    /// This is the single source for both previews and the mutating calls,
    /// so a preview always matches the subsequent operation on an unchanged
    /// state.
    pub fn quote(self, amount: Amount, state: VaultState) -> Result<Amount, MathError> {
        if self.takes_assets() {
            assets_to_shares(amount, state, self.rounding())
        } else {
            shares_to_assets(amount, state, self.rounding())
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Deposit => write!(f, "deposit"),
            Operation::Mint => write!(f, "mint"),
            Operation::Withdraw => write!(f, "withdraw"),
            Operation::Redeem => write!(f, "redeem"),
        }
    }
}
