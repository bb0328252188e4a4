//! # Vault Configuration & Constants
//!
//! Token metadata defaults for the vault and its underlying asset. The vault
//! token mirrors the underlying token's decimals; name and symbol are fixed
//! per deployment.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Share Token
// ---------------------------------------------------------------------------

/// Display name of the vault's share token.
pub const VAULT_NAME: &str = "Staked RIF Vault";

/// Ticker of the vault's share token.
pub const VAULT_SYMBOL: &str = "vRIF";

// ---------------------------------------------------------------------------
// Underlying Asset
// ---------------------------------------------------------------------------

/// Display name of the default underlying asset.
pub const ASSET_NAME: &str = "Staked RIF";

/// Ticker of the default underlying asset.
pub const ASSET_SYMBOL: &str = "stRIF";

/// Decimals of the default underlying asset. 18, like every EVM-native token
/// on Rootstock.
pub const DEFAULT_DECIMALS: u8 = 18;

/// Label from which the vault's own address is derived when none is given.
pub const DEFAULT_VAULT_LABEL: &str = "rootstock-vault";

/// Label from which the underlying asset token's address is derived.
pub const DEFAULT_ASSET_LABEL: &str = "strif-token";

// ---------------------------------------------------------------------------
// VaultConfig
// ---------------------------------------------------------------------------

/// Share token metadata for a vault instance.
///
/// `decimals` is not configured here: the vault always reports the decimals
/// of its underlying asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Share token display name.
    pub name: String,
    /// Share token ticker.
    pub symbol: String,
    /// Label used to derive the vault's address.
    pub label: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            name: VAULT_NAME.to_string(),
            symbol: VAULT_SYMBOL.to_string(),
            label: DEFAULT_VAULT_LABEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_constants() {
        let config = VaultConfig::default();
        assert_eq!(config.name, "Staked RIF Vault");
        assert_eq!(config.symbol, "vRIF");
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: VaultConfig = serde_json::from_str(r#"{"symbol":"vTEST"}"#).unwrap();
        assert_eq!(config.symbol, "vTEST");
        assert_eq!(config.name, VAULT_NAME);
        assert_eq!(config.label, DEFAULT_VAULT_LABEL);
    }
}
