//! # Vault Contracts
//!
//! Executable contracts built on `vault-protocol`:
//!
//! - **Tokenized Vault**: single-asset deposit/mint/withdraw/redeem
//!   controller that custodies the underlying asset and issues shares.
//! - **Fungible Token**: in-memory ERC-20 style ledger, used both as the
//!   underlying asset and as the vault's share token.
//! - **Shared Vault**: lock-protected handle for driving one vault from
//!   several threads.
//!
//! ## Design Principles
//!
//! 1. Every amount is checked: `checked_add`/`checked_sub` on balances and
//!    256-bit intermediates in conversions.
//! 2. An operation either applies completely or leaves no trace.
//! 3. Events are values returned to the caller, not side channels.

pub mod fungible_token;
pub mod shared;
pub mod tokenized_vault;

pub use fungible_token::FungibleToken;
pub use shared::SharedVault;
pub use tokenized_vault::{Receipt, TokenizedVault, VaultSnapshot};
