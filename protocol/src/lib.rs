// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Rootstock Vault: Accounting Core
//!
//! Share/asset accounting for a single-asset tokenized vault. Users deposit
//! an underlying token and receive shares that represent a proportional
//! claim on everything the vault holds. The pool can grow without new
//! deposits (donations, direct transfers), so the exchange rate is the live
//! ratio `total_assets / total_shares`, never a fixed number.
//!
//! ## Architecture
//!
//! - **math**: 256-bit scaled multiply-divide with explicit rounding.
//! - **conversion**: assets ⇄ shares conversion at a given
//!   state, plus the fixed per-operation rounding table.
//! - **state**: [`VaultState`], the two totals, with pure transitions.
//! - **ledger**: traits for the asset and share token ledgers the vault
//!   drives but does not own.
//! - **events**: `Deposit` / `Withdraw` records.
//! - **error**: the error taxonomy surfaced by vault operations.
//! - **address** / **config**: account identifiers and token metadata.
//!
//! ## Rules
//!
//! 1. Amounts are `u128` in the token's smallest unit. No floating point.
//! 2. Every rounding decision favours the vault, never the caller.
//! 3. Overflow is an error. Nothing wraps, nothing saturates silently.

pub mod address;
pub mod config;
pub mod conversion;
pub mod error;
pub mod events;
pub mod ledger;
pub mod math;
pub mod state;

pub use address::Address;
pub use conversion::{assets_to_shares, shares_to_assets, Operation};
pub use error::VaultError;
pub use events::{Deposit, VaultEvent, Withdraw};
pub use ledger::{AssetLedger, LedgerError, ShareLedger};
pub use math::{Amount, MathError, Rounding};
pub use state::VaultState;
