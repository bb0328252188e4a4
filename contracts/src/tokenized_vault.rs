//! # Tokenized Vault Contract
//!
//! The accounting controller of a single-asset vault. Users deposit the
//! underlying asset and receive shares; shares are later burned to take
//! assets back out. The contract:
//!
//! 1. asks the conversion engine for the counter-amount, rounding against
//!    the caller,
//! 2. validates it (non-zero input, representable totals, allowance,
//!    balances),
//! 3. moves asset custody on the asset ledger and adjusts share supply on the
//!    share ledger,
//! 4. returns the emitted [`VaultEvent`] in a [`Receipt`] and appends it to
//!    the event log.
//!
//! ## Atomicity
//!
//! Every check that can fail runs before the first ledger mutation, and the
//! new [`VaultState`] is computed up front and committed last. The asset
//! ledger call is the first mutation; once it succeeds the share ledger
//! calls that follow were already validated. A rejected operation leaves
//! totals, balances and allowances exactly as they were.
//!
//! ## Authorization
//!
//! The caller is an explicit argument. Deposits pull assets with the
//! caller's asset allowance to the vault; withdrawals on someone else's
//! behalf consume the owner's share allowance to the caller.

use serde::Serialize;
use tracing::{debug, info, warn};

use vault_protocol::config::VaultConfig;
use vault_protocol::conversion::{assets_to_shares, shares_to_assets};
use vault_protocol::{
    Address, Amount, AssetLedger, Deposit, Operation, Rounding, ShareLedger, VaultError,
    VaultEvent, VaultState, Withdraw,
};

use crate::fungible_token::FungibleToken;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Result of a successful mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Receipt {
    /// The operation's return value: shares for `deposit` and `withdraw`,
    /// assets for `mint` and `redeem`.
    pub amount: Amount,
    /// The emitted event.
    pub event: VaultEvent,
}

/// Point-in-time summary of a vault, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VaultSnapshot {
    pub address: Address,
    pub asset: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub state: VaultState,
    /// Asset units one whole share (`10^decimals` units) redeems for.
    pub assets_per_share: Amount,
}

/// A single-asset tokenized vault.
///
/// `A` is the underlying asset ledger, `S` the share ledger. The vault owns
/// both handles, so every balance it depends on sits behind the same
/// `&mut self` (or the same lock, see [`crate::shared::SharedVault`]).
#[derive(Debug, Clone)]
pub struct TokenizedVault<A: AssetLedger, S: ShareLedger = FungibleToken> {
    config: VaultConfig,
    address: Address,
    state: VaultState,
    assets: A,
    shares: S,
    events: Vec<VaultEvent>,
}

impl<A: AssetLedger> TokenizedVault<A, FungibleToken> {
    /// Deploys a vault over `asset_ledger` with a fresh share token.
    ///
    /// The share token takes its name and symbol from `config` and its
    /// decimals from the underlying asset. The vault's address is derived
    /// from `config.label`.
    pub fn new(config: VaultConfig, asset_ledger: A) -> Self {
        let address = Address::from_label(&config.label);
        let shares = FungibleToken::new(
            &config.name,
            &config.symbol,
            asset_ledger.decimals(),
            address,
        );
        Self::deploy(config, asset_ledger, shares)
    }

    /// Sets the allowance of `spender` over `owner`'s shares.
    pub fn approve(&mut self, owner: Address, spender: Address, shares: Amount) {
        self.shares.approve(owner, spender, shares);
    }
}

impl<A: AssetLedger, S: ShareLedger> TokenizedVault<A, S> {
    /// Deploys a vault over an existing share ledger.
    ///
    /// # Errors
    ///
    /// [`VaultError::ShareLedgerNotEmpty`] if `shares` already has supply:
    /// the vault starts from empty totals and every share must be backed by
    /// a deposit it recorded.
    pub fn with_share_ledger(
        config: VaultConfig,
        asset_ledger: A,
        shares: S,
    ) -> Result<Self, VaultError> {
        let supply = shares.total_supply();
        if supply != 0 {
            warn!(supply, "refusing to deploy over a non-empty share ledger");
            return Err(VaultError::ShareLedgerNotEmpty { supply });
        }
        Ok(Self::deploy(config, asset_ledger, shares))
    }

    fn deploy(config: VaultConfig, asset_ledger: A, shares: S) -> Self {
        let address = Address::from_label(&config.label);
        info!(
            vault = %address,
            asset = %asset_ledger.address(),
            name = %config.name,
            symbol = %config.symbol,
            "vault deployed"
        );
        Self {
            config,
            address,
            state: VaultState::EMPTY,
            assets: asset_ledger,
            shares,
            events: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Metadata
    // -----------------------------------------------------------------------

    /// The vault's own address: asset custody and allowance target.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Address of the underlying asset token.
    pub fn asset(&self) -> Address {
        self.assets.address()
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    /// Same as the underlying asset's decimals.
    pub fn decimals(&self) -> u8 {
        self.assets.decimals()
    }

    /// Current accounting totals.
    pub fn state(&self) -> VaultState {
        self.state
    }

    /// Asset units custodied by the vault.
    pub fn total_assets(&self) -> Amount {
        self.state.total_assets
    }

    /// Outstanding shares.
    pub fn total_supply(&self) -> Amount {
        self.state.total_shares
    }

    /// Share balance of `owner`.
    pub fn balance_of(&self, owner: Address) -> Amount {
        self.shares.balance_of(owner)
    }

    /// Shares `spender` may withdraw or redeem on `owner`'s behalf.
    pub fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.shares.allowance(owner, spender)
    }

    /// Read access to the underlying asset ledger.
    pub fn asset_ledger(&self) -> &A {
        &self.assets
    }

    /// Write access to the underlying asset ledger, for operations that do
    /// not involve the vault (minting test funds, user approvals, direct
    /// transfers). Assets sent straight to [`Self::address`] are not counted
    /// until [`Self::sync_total_assets`] runs. Assets moved out of the
    /// vault's address here are not deducted from `total_assets`; withdrawals
    /// that the remaining custody cannot cover fail with
    /// [`VaultError::InsufficientBalance`].
    pub fn asset_ledger_mut(&mut self) -> &mut A {
        &mut self.assets
    }

    /// Read access to the share ledger.
    pub fn share_ledger(&self) -> &S {
        &self.shares
    }

    /// Every event emitted so far, oldest first.
    pub fn events(&self) -> &[VaultEvent] {
        &self.events
    }

    /// Removes and returns the event log.
    pub fn drain_events(&mut self) -> Vec<VaultEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> VaultSnapshot {
        let one_share = 10u128
            .checked_pow(u32::from(self.decimals()))
            .unwrap_or(Amount::MAX);
        VaultSnapshot {
            address: self.address,
            asset: self.asset(),
            name: self.config.name.clone(),
            symbol: self.config.symbol.clone(),
            decimals: self.decimals(),
            state: self.state,
            assets_per_share: shares_to_assets(one_share, self.state, Rounding::Down)
                .unwrap_or(Amount::MAX),
        }
    }

    // -----------------------------------------------------------------------
    // Conversions & Previews
    // -----------------------------------------------------------------------

    /// Shares `assets` are worth at the current rate, rounded down.
    pub fn convert_to_shares(&self, assets: Amount) -> Result<Amount, VaultError> {
        assets_to_shares(assets, self.state, Rounding::Down)
            .map_err(|_| VaultError::overflow("convert_to_shares"))
    }

    /// Assets `shares` are worth at the current rate, rounded down.
    pub fn convert_to_assets(&self, shares: Amount) -> Result<Amount, VaultError> {
        shares_to_assets(shares, self.state, Rounding::Down)
            .map_err(|_| VaultError::overflow("convert_to_assets"))
    }

    /// Shares `deposit(assets)` would mint right now.
    pub fn preview_deposit(&self, assets: Amount) -> Result<Amount, VaultError> {
        self.preview(Operation::Deposit, assets)
    }

    /// Assets `mint(shares)` would charge right now.
    pub fn preview_mint(&self, shares: Amount) -> Result<Amount, VaultError> {
        self.preview(Operation::Mint, shares)
    }

    /// Shares `withdraw(assets)` would burn right now.
    pub fn preview_withdraw(&self, assets: Amount) -> Result<Amount, VaultError> {
        self.preview(Operation::Withdraw, assets)
    }

    /// Assets `redeem(shares)` would pay out right now.
    pub fn preview_redeem(&self, shares: Amount) -> Result<Amount, VaultError> {
        self.preview(Operation::Redeem, shares)
    }

    fn preview(&self, op: Operation, amount: Amount) -> Result<Amount, VaultError> {
        let quoted = self.quote(op, amount)?;
        debug!(operation = %op, amount, quoted, "preview");
        Ok(quoted)
    }

    /// The derived amount for `op`, shared by previews and mutations.
    fn quote(&self, op: Operation, amount: Amount) -> Result<Amount, VaultError> {
        op.quote(amount, self.state)
            .map_err(|_| VaultError::overflow("share conversion"))
    }

    // -----------------------------------------------------------------------
    // Limits
    // -----------------------------------------------------------------------

    /// Largest `deposit` that cannot overflow either total.
    pub fn max_deposit(&self, _receiver: Address) -> Amount {
        let asset_room = Amount::MAX - self.state.total_assets;
        let share_room = Amount::MAX - self.state.total_shares;
        let from_shares =
            shares_to_assets(share_room, self.state, Rounding::Down).unwrap_or(Amount::MAX);
        asset_room.min(from_shares)
    }

    /// Largest `mint` that cannot overflow either total.
    pub fn max_mint(&self, _receiver: Address) -> Amount {
        let asset_room = Amount::MAX - self.state.total_assets;
        let share_room = Amount::MAX - self.state.total_shares;
        let from_assets =
            assets_to_shares(asset_room, self.state, Rounding::Down).unwrap_or(Amount::MAX);
        share_room.min(from_assets)
    }

    /// Assets `owner` can withdraw by burning their whole balance.
    pub fn max_withdraw(&self, owner: Address) -> Amount {
        // balance <= total_shares, so the quotient is at most total_assets.
        shares_to_assets(self.balance_of(owner), self.state, Rounding::Down).unwrap_or(0)
    }

    /// Shares `owner` can redeem.
    pub fn max_redeem(&self, owner: Address) -> Amount {
        self.balance_of(owner)
    }

    // -----------------------------------------------------------------------
    // Deposit / Mint
    // -----------------------------------------------------------------------

    /// Deposits exactly `assets` from `caller` and mints the corresponding
    /// shares (rounded down) to `receiver`. `Receipt::amount` is the shares
    /// minted.
    ///
    /// # Errors
    ///
    /// - [`VaultError::InvalidAmount`] if `assets` is zero.
    /// - [`VaultError::InsufficientAllowance`] / [`VaultError::InsufficientBalance`]
    ///   if `caller` has not approved the vault for `assets` or does not hold
    ///   them.
    /// - [`VaultError::ArithmeticOverflow`] if the shares or the new totals
    ///   are not representable.
    pub fn deposit(
        &mut self,
        caller: Address,
        assets: Amount,
        receiver: Address,
    ) -> Result<Receipt, VaultError> {
        let op = Operation::Deposit;
        let result = self.ensure_nonzero(op, assets).and_then(|_| {
            let shares = self.quote(op, assets)?;
            self.settle_deposit(caller, receiver, assets, shares)
                .map(|event| Receipt {
                    amount: shares,
                    event,
                })
        });
        self.log_outcome(op, caller, assets, &result);
        result
    }

    /// Mints exactly `shares` to `receiver`, charging `caller` the
    /// corresponding assets (rounded up). `Receipt::amount` is the assets
    /// charged.
    ///
    /// # Errors
    ///
    /// Same as [`Self::deposit`], with `InvalidAmount` for zero `shares`.
    pub fn mint(
        &mut self,
        caller: Address,
        shares: Amount,
        receiver: Address,
    ) -> Result<Receipt, VaultError> {
        let op = Operation::Mint;
        let result = self.ensure_nonzero(op, shares).and_then(|_| {
            let assets = self.quote(op, shares)?;
            self.settle_deposit(caller, receiver, assets, shares)
                .map(|event| Receipt {
                    amount: assets,
                    event,
                })
        });
        self.log_outcome(op, caller, shares, &result);
        result
    }

    fn settle_deposit(
        &mut self,
        caller: Address,
        receiver: Address,
        assets: Amount,
        shares: Amount,
    ) -> Result<VaultEvent, VaultError> {
        let next = self
            .state
            .after_deposit(assets, shares)
            .map_err(|_| VaultError::overflow("vault totals"))?;

        // First mutation. Fails on allowance or balance with nothing changed.
        self.assets
            .transfer_from(self.address, caller, self.address, assets)
            .map_err(VaultError::from_asset_ledger)?;

        // The share ledger's supply equals `total_shares`, which `next`
        // proved can absorb `shares`.
        self.shares
            .mint_shares(receiver, shares)
            .map_err(VaultError::from_share_ledger)?;

        self.state = next;
        let event = VaultEvent::Deposit(Deposit {
            caller,
            receiver,
            assets,
            shares,
        });
        self.events.push(event);
        Ok(event)
    }

    // -----------------------------------------------------------------------
    // Withdraw / Redeem
    // -----------------------------------------------------------------------

    /// Sends exactly `assets` to `receiver`, burning the corresponding
    /// shares (rounded up) from `owner`. `Receipt::amount` is the shares
    /// burned.
    ///
    /// # Errors
    ///
    /// - [`VaultError::InvalidAmount`] if `assets` is zero.
    /// - [`VaultError::InsufficientAllowance`] if `caller != owner` and the
    ///   owner's share allowance to `caller` is below the shares required.
    /// - [`VaultError::InsufficientShares`] if `owner` holds too few shares.
    /// - [`VaultError::ArithmeticOverflow`] if the share amount is not
    ///   representable.
    pub fn withdraw(
        &mut self,
        caller: Address,
        assets: Amount,
        receiver: Address,
        owner: Address,
    ) -> Result<Receipt, VaultError> {
        let op = Operation::Withdraw;
        let result = self.ensure_nonzero(op, assets).and_then(|_| {
            let shares = self.quote(op, assets)?;
            self.settle_withdraw(caller, receiver, owner, assets, shares)
                .map(|event| Receipt {
                    amount: shares,
                    event,
                })
        });
        self.log_outcome(op, caller, assets, &result);
        result
    }

    /// Burns exactly `shares` from `owner` and sends the corresponding
    /// assets (rounded down) to `receiver`. `Receipt::amount` is the assets
    /// paid out.
    ///
    /// # Errors
    ///
    /// Same as [`Self::withdraw`], with `InvalidAmount` for zero `shares`.
    pub fn redeem(
        &mut self,
        caller: Address,
        shares: Amount,
        receiver: Address,
        owner: Address,
    ) -> Result<Receipt, VaultError> {
        let op = Operation::Redeem;
        let result = self.ensure_nonzero(op, shares).and_then(|_| {
            let assets = self.quote(op, shares)?;
            self.settle_withdraw(caller, receiver, owner, assets, shares)
                .map(|event| Receipt {
                    amount: assets,
                    event,
                })
        });
        self.log_outcome(op, caller, shares, &result);
        result
    }

    fn settle_withdraw(
        &mut self,
        caller: Address,
        receiver: Address,
        owner: Address,
        assets: Amount,
        shares: Amount,
    ) -> Result<VaultEvent, VaultError> {
        let delegated = caller != owner;
        if delegated {
            let allowance = self.shares.allowance(owner, caller);
            if allowance < shares {
                return Err(VaultError::InsufficientAllowance {
                    owner,
                    spender: caller,
                    allowance,
                    required: shares,
                });
            }
        }

        let balance = self.shares.balance_of(owner);
        if balance < shares {
            return Err(VaultError::InsufficientShares {
                owner,
                balance,
                required: shares,
            });
        }

        let next = self
            .state
            .after_withdraw(assets, shares)
            .map_err(|_| VaultError::InsufficientBalance {
                account: self.address,
                balance: self.state.total_assets,
                required: assets,
            })?;

        // Recorded totals can exceed what the asset ledger actually holds for
        // the vault if custody was moved behind its back.
        let custody = self.assets.balance_of(self.address);
        if custody < assets {
            return Err(VaultError::InsufficientBalance {
                account: self.address,
                balance: custody,
                required: assets,
            });
        }

        // First mutation. Allowance and share balance were checked above, so
        // the share ledger calls below cannot fail once this succeeds.
        self.assets
            .transfer(self.address, receiver, assets)
            .map_err(VaultError::from_asset_ledger)?;
        if delegated {
            self.shares
                .spend_allowance(owner, caller, shares)
                .map_err(VaultError::from_share_ledger)?;
        }
        self.shares
            .burn_shares(owner, shares)
            .map_err(VaultError::from_share_ledger)?;

        self.state = next;
        let event = VaultEvent::Withdraw(Withdraw {
            caller,
            receiver,
            owner,
            assets,
            shares,
        });
        self.events.push(event);
        Ok(event)
    }

    // -----------------------------------------------------------------------
    // Donations
    // -----------------------------------------------------------------------

    /// Pulls `assets` from `caller` into custody without minting shares,
    /// raising the value of every outstanding share. Zero is a no-op.
    ///
    /// Returns the new total assets.
    pub fn donate(&mut self, caller: Address, assets: Amount) -> Result<Amount, VaultError> {
        if assets == 0 {
            return Ok(self.state.total_assets);
        }
        let next = self
            .state
            .after_donation(assets)
            .map_err(|_| VaultError::overflow("vault totals"))?;
        self.assets
            .transfer_from(self.address, caller, self.address, assets)
            .map_err(VaultError::from_asset_ledger)?;
        self.state = next;

        info!(vault = %self.address, caller = %caller, assets, total_assets = next.total_assets, "donation received");
        Ok(next.total_assets)
    }

    /// Counts assets that reached the vault's address on the asset ledger
    /// without going through the vault, e.g. a plain `transfer`.
    ///
    /// Returns the amount added to `total_assets`. Never lowers the total.
    pub fn sync_total_assets(&mut self) -> Amount {
        let held = self.assets.balance_of(self.address);
        let gained = held.saturating_sub(self.state.total_assets);
        if gained > 0 {
            self.state.total_assets = held;
            info!(vault = %self.address, gained, total_assets = held, "synced external asset inflow");
        }
        gained
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn ensure_nonzero(&self, operation: Operation, amount: Amount) -> Result<(), VaultError> {
        if amount == 0 {
            return Err(VaultError::InvalidAmount { operation });
        }
        Ok(())
    }

    fn log_outcome(
        &self,
        op: Operation,
        caller: Address,
        amount: Amount,
        result: &Result<Receipt, VaultError>,
    ) {
        match result {
            Ok(receipt) => info!(
                vault = %self.address,
                operation = %op,
                caller = %caller,
                assets = receipt.event.assets(),
                shares = receipt.event.shares(),
                total_assets = self.state.total_assets,
                total_shares = self.state.total_shares,
                "operation committed"
            ),
            Err(err) => warn!(
                vault = %self.address,
                operation = %op,
                caller = %caller,
                amount,
                error = %err,
                "operation rejected"
            ),
        }
    }
}
