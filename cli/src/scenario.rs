//! # Scenario Replay
//!
//! A scenario is a JSON file describing a vault deployment and a list of
//! steps to run against it:
//!
//! ```json
//! {
//!   "vault": { "name": "Staked RIF Vault", "symbol": "vRIF" },
//!   "asset": { "decimals": 18 },
//!   "steps": [
//!     { "mint_asset":    { "to": "alice", "amount": 1000 } },
//!     { "approve_asset": { "owner": "alice", "amount": 1000 } },
//!     { "deposit":       { "caller": "alice", "assets": 100 } },
//!     { "redeem":        { "caller": "alice", "shares": 40 } }
//!   ]
//! }
//! ```
//!
//! Accounts are either `0x`-prefixed addresses or labels, which are hashed
//! into addresses. The label `vault` always names the vault itself.
//! The vault can receive a `transfer_asset` but never send one.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use vault_contracts::{FungibleToken, Receipt, TokenizedVault, VaultSnapshot};
use vault_protocol::config::{
    VaultConfig, ASSET_NAME, ASSET_SYMBOL, DEFAULT_ASSET_LABEL, DEFAULT_DECIMALS,
};
use vault_protocol::{Address, Amount};

/// Label that resolves to the vault's own address.
const VAULT_ACCOUNT: &str = "vault";

// ---------------------------------------------------------------------------
// Scenario file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub vault: VaultConfig,
    #[serde(default)]
    pub asset: AssetConfig,
    pub steps: Vec<Step>,
}

/// The underlying token the scenario deploys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub label: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            name: ASSET_NAME.to_string(),
            symbol: ASSET_SYMBOL.to_string(),
            decimals: DEFAULT_DECIMALS,
            label: DEFAULT_ASSET_LABEL.to_string(),
        }
    }
}

/// One scenario action. `receiver` and `owner` default to `caller`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum Step {
    MintAsset {
        to: String,
        amount: Amount,
    },
    TransferAsset {
        from: String,
        to: String,
        amount: Amount,
    },
    /// Approves the vault to pull `owner`'s assets.
    ApproveAsset {
        owner: String,
        amount: Amount,
    },
    ApproveShares {
        owner: String,
        spender: String,
        amount: Amount,
    },
    Deposit {
        caller: String,
        assets: Amount,
        receiver: Option<String>,
    },
    Mint {
        caller: String,
        shares: Amount,
        receiver: Option<String>,
    },
    Withdraw {
        caller: String,
        assets: Amount,
        receiver: Option<String>,
        owner: Option<String>,
    },
    Redeem {
        caller: String,
        shares: Amount,
        receiver: Option<String>,
        owner: Option<String>,
    },
    Donate {
        caller: String,
        assets: Amount,
    },
    Sync,
}

impl Step {
    pub fn action(&self) -> &'static str {
        match self {
            Step::MintAsset { .. } => "mint_asset",
            Step::TransferAsset { .. } => "transfer_asset",
            Step::ApproveAsset { .. } => "approve_asset",
            Step::ApproveShares { .. } => "approve_shares",
            Step::Deposit { .. } => "deposit",
            Step::Mint { .. } => "mint",
            Step::Withdraw { .. } => "withdraw",
            Step::Redeem { .. } => "redeem",
            Step::Donate { .. } => "donate",
            Step::Sync => "sync",
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse scenario {}", path.display()))
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Receipt>,
    /// Set by steps that return a plain amount (`donate`, `sync`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountReport {
    pub account: String,
    pub address: Address,
    pub assets: Amount,
    pub shares: Amount,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub steps: Vec<StepOutcome>,
    pub failed: usize,
    pub vault: VaultSnapshot,
    pub accounts: Vec<AccountReport>,
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Deploys the scenario's vault and runs its steps in order.
///
/// Stops at the first failing step unless `keep_going` is set, in which case
/// failures are recorded in the report.
pub fn run(scenario: &Scenario, keep_going: bool) -> Result<SimulationReport> {
    let asset = FungibleToken::new(
        &scenario.asset.name,
        &scenario.asset.symbol,
        scenario.asset.decimals,
        Address::from_label(&scenario.asset.label),
    );
    let mut vault = TokenizedVault::new(scenario.vault.clone(), asset);
    let mut accounts = BTreeSet::new();
    let mut outcomes = Vec::with_capacity(scenario.steps.len());
    let mut failed = 0;

    for (index, step) in scenario.steps.iter().enumerate() {
        let mut outcome = StepOutcome {
            index,
            action: step.action(),
            receipt: None,
            amount: None,
            error: None,
        };
        match apply(&mut vault, &mut accounts, step) {
            Ok(Applied::Receipt(receipt)) => outcome.receipt = Some(receipt),
            Ok(Applied::Amount(amount)) => outcome.amount = Some(amount),
            Ok(Applied::Nothing) => {}
            Err(err) => {
                if !keep_going {
                    return Err(err.context(format!("step {index} ({}) failed", step.action())));
                }
                tracing::warn!(index, action = step.action(), error = %err, "step failed");
                failed += 1;
                outcome.error = Some(format!("{err:#}"));
            }
        }
        outcomes.push(outcome);
    }

    let accounts = accounts
        .into_iter()
        .map(|account| {
            let address = resolve(vault.address(), &account)?;
            Ok(AccountReport {
                assets: vault.asset_ledger().balance_of(address),
                shares: vault.balance_of(address),
                account,
                address,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SimulationReport {
        steps: outcomes,
        failed,
        vault: vault.snapshot(),
        accounts,
    })
}

enum Applied {
    Receipt(Receipt),
    Amount(Amount),
    Nothing,
}

fn apply(
    vault: &mut TokenizedVault<FungibleToken>,
    accounts: &mut BTreeSet<String>,
    step: &Step,
) -> Result<Applied> {
    let vault_address = vault.address();
    let mut account = |name: &str| -> Result<Address> {
        let address = resolve(vault_address, name)?;
        accounts.insert(name.to_string());
        Ok(address)
    };

    let applied = match step {
        Step::MintAsset { to, amount } => {
            let to = account(to)?;
            vault.asset_ledger_mut().mint(to, *amount)?;
            Applied::Nothing
        }
        Step::TransferAsset { from, to, amount } => {
            let (from, to) = (account(from)?, account(to)?);
            if from == vault_address {
                bail!("vault custody can only leave through withdraw or redeem");
            }
            vault.asset_ledger_mut().transfer(from, to, *amount)?;
            Applied::Nothing
        }
        Step::ApproveAsset { owner, amount } => {
            let owner = account(owner)?;
            vault
                .asset_ledger_mut()
                .approve(owner, vault_address, *amount);
            Applied::Nothing
        }
        Step::ApproveShares {
            owner,
            spender,
            amount,
        } => {
            let (owner, spender) = (account(owner)?, account(spender)?);
            vault.approve(owner, spender, *amount);
            Applied::Nothing
        }
        Step::Deposit {
            caller,
            assets,
            receiver,
        } => {
            let caller_addr = account(caller)?;
            let receiver = account(receiver.as_deref().unwrap_or(caller))?;
            Applied::Receipt(vault.deposit(caller_addr, *assets, receiver)?)
        }
        Step::Mint {
            caller,
            shares,
            receiver,
        } => {
            let caller_addr = account(caller)?;
            let receiver = account(receiver.as_deref().unwrap_or(caller))?;
            Applied::Receipt(vault.mint(caller_addr, *shares, receiver)?)
        }
        Step::Withdraw {
            caller,
            assets,
            receiver,
            owner,
        } => {
            let caller_addr = account(caller)?;
            let receiver = account(receiver.as_deref().unwrap_or(caller))?;
            let owner = account(owner.as_deref().unwrap_or(caller))?;
            Applied::Receipt(vault.withdraw(caller_addr, *assets, receiver, owner)?)
        }
        Step::Redeem {
            caller,
            shares,
            receiver,
            owner,
        } => {
            let caller_addr = account(caller)?;
            let receiver = account(receiver.as_deref().unwrap_or(caller))?;
            let owner = account(owner.as_deref().unwrap_or(caller))?;
            Applied::Receipt(vault.redeem(caller_addr, *shares, receiver, owner)?)
        }
        Step::Donate { caller, assets } => {
            let caller = account(caller)?;
            Applied::Amount(vault.donate(caller, *assets)?)
        }
        Step::Sync => Applied::Amount(vault.sync_total_assets()),
    };
    Ok(applied)
}

/// Maps a scenario account name to an address.
fn resolve(vault: Address, name: &str) -> Result<Address> {
    if name == VAULT_ACCOUNT {
        return Ok(vault);
    }
    if name.starts_with("0x") || name.starts_with("0X") {
        return name
            .parse()
            .with_context(|| format!("invalid address {name:?}"));
    }
    if name.is_empty() {
        bail!("account name must not be empty");
    }
    Ok(Address::from_label(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(json: &str) -> Scenario {
        serde_json::from_str(json).unwrap()
    }

    fn account<'a>(report: &'a SimulationReport, name: &str) -> &'a AccountReport {
        report
            .accounts
            .iter()
            .find(|a| a.account == name)
            .unwrap()
    }

    const LIFECYCLE: &str = r#"{
        "steps": [
            { "mint_asset":    { "to": "alice", "amount": 1000 } },
            { "mint_asset":    { "to": "bob",   "amount": 1000 } },
            { "approve_asset": { "owner": "alice", "amount": 1000 } },
            { "approve_asset": { "owner": "bob",   "amount": 1000 } },
            { "deposit":       { "caller": "alice", "assets": 100 } },
            { "deposit":       { "caller": "bob",   "assets": 300 } },
            { "approve_shares":{ "owner": "alice", "spender": "bob", "amount": 50 } },
            { "withdraw":      { "caller": "bob", "assets": 50, "owner": "alice" } },
            { "redeem":        { "caller": "bob", "shares": 100 } }
        ]
    }"#;

    #[test]
    fn lifecycle_scenario_runs_to_completion() {
        let report = run(&parse(LIFECYCLE), false).unwrap();

        assert_eq!(report.failed, 0);
        assert_eq!(report.steps.len(), 9);
        assert_eq!(report.steps[4].receipt.unwrap().amount, 100);
        assert_eq!(report.vault.state.total_assets, 250);
        assert_eq!(report.vault.state.total_shares, 250);
        assert_eq!(report.vault.symbol, "vRIF");

        let alice = account(&report, "alice");
        assert_eq!((alice.assets, alice.shares), (900, 50));
        let bob = account(&report, "bob");
        assert_eq!((bob.assets, bob.shares), (850, 200));
    }

    #[test]
    fn failing_step_stops_the_run() {
        let scenario = parse(
            r#"{ "steps": [
                { "mint_asset": { "to": "alice", "amount": 10 } },
                { "deposit":    { "caller": "alice", "assets": 5 } }
            ] }"#,
        );
        let err = run(&scenario, false).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("step 1 (deposit) failed"), "{message}");
        assert!(message.contains("insufficient allowance"), "{message}");
    }

    #[test]
    fn keep_going_records_failures() {
        let scenario = parse(
            r#"{ "steps": [
                { "deposit":       { "caller": "alice", "assets": 0 } },
                { "mint_asset":    { "to": "alice", "amount": 10 } },
                { "approve_asset": { "owner": "alice", "amount": 10 } },
                { "deposit":       { "caller": "alice", "assets": 10 } }
            ] }"#,
        );
        let report = run(&scenario, true).unwrap();
        assert_eq!(report.failed, 1);
        let error = report.steps[0].error.as_deref().unwrap();
        assert!(error.contains("cannot deposit zero"), "{error}");
        assert!(report.steps[3].receipt.is_some());
    }

    #[test]
    fn direct_transfer_is_counted_after_sync() {
        let scenario = parse(
            r#"{ "steps": [
                { "mint_asset":     { "to": "alice", "amount": 100 } },
                { "approve_asset":  { "owner": "alice", "amount": 50 } },
                { "deposit":        { "caller": "alice", "assets": 50 } },
                { "transfer_asset": { "from": "alice", "to": "vault", "amount": 50 } },
                "sync"
            ] }"#,
        );
        let report = run(&scenario, false).unwrap();
        assert_eq!(report.steps[4].amount, Some(50));
        assert_eq!(report.vault.state.total_assets, 100);
        assert_eq!(report.vault.assets_per_share, 2 * 10u128.pow(18));
    }

    #[test]
    fn transfer_out_of_vault_custody_is_refused() {
        let scenario = parse(
            r#"{ "steps": [
                { "mint_asset":     { "to": "alice", "amount": 100 } },
                { "approve_asset":  { "owner": "alice", "amount": 100 } },
                { "deposit":        { "caller": "alice", "assets": 100 } },
                { "transfer_asset": { "from": "vault", "to": "mallory", "amount": 60 } },
                { "redeem":         { "caller": "alice", "shares": 100 } }
            ] }"#,
        );
        let report = run(&scenario, true).unwrap();
        assert_eq!(report.failed, 1);
        let error = report.steps[3].error.as_deref().unwrap();
        assert!(error.contains("vault custody"), "{error}");
        assert_eq!(report.steps[4].receipt.unwrap().amount, 100);
        assert_eq!(account(&report, "mallory").assets, 0);
        assert_eq!(account(&report, "alice").assets, 100);
        assert_eq!(report.vault.state.total_assets, 0);
    }

    #[test]
    fn custom_vault_config_is_applied() {
        let scenario = parse(
            r#"{
                "vault": { "name": "Test Vault", "symbol": "tVLT", "label": "t" },
                "asset": { "decimals": 6, "label": "usd" },
                "steps": []
            }"#,
        );
        let report = run(&scenario, false).unwrap();
        assert_eq!(report.vault.name, "Test Vault");
        assert_eq!(report.vault.decimals, 6);
        assert_eq!(report.vault.address, Address::from_label("t"));
        assert_eq!(report.vault.asset, Address::from_label("usd"));
    }

    #[test]
    fn wide_amounts_survive_parsing_and_reporting() {
        let scenario = parse(
            r#"{ "steps": [
                { "mint_asset": { "to": "whale", "amount": 340282366920938463463374607431768211455 } }
            ] }"#,
        );
        let report = run(&scenario, false).unwrap();
        assert_eq!(account(&report, "whale").assets, u128::MAX);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("340282366920938463463374607431768211455"));
    }

    #[test]
    fn accounts_resolve_by_label_or_address() {
        let vault = Address::from_label("rootstock-vault");
        assert_eq!(resolve(vault, "vault").unwrap(), vault);
        assert_eq!(
            resolve(vault, "alice").unwrap(),
            Address::from_label("alice")
        );
        let hex = Address::from_label("bob").to_string();
        assert_eq!(resolve(vault, &hex).unwrap(), Address::from_label("bob"));
        assert!(resolve(vault, "0xzz").is_err());
        assert!(resolve(vault, "").is_err());
    }

    #[test]
    fn unknown_steps_are_rejected() {
        let result: Result<Scenario, _> =
            serde_json::from_str(r#"{ "steps": [ { "burn_everything": {} } ] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn load_reads_scenario_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LIFECYCLE.as_bytes()).unwrap();

        let scenario = Scenario::load(file.path()).unwrap();
        assert_eq!(scenario.steps.len(), 9);
        assert_eq!(
            scenario.steps[0],
            Step::MintAsset {
                to: "alice".into(),
                amount: 1000
            }
        );
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Scenario::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read scenario"));
    }
}
