//! # CLI Interface
//!
//! Defines the command-line argument structure for `vault-cli` using
//! `clap` derive. Supports three subcommands: `preview`, `simulate` and
//! `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;
use vault_protocol::Amount;

/// Tokenized vault toolkit.
///
/// Quotes vault conversions for arbitrary totals and replays deposit /
/// withdrawal scenarios against an in-memory vault.
#[derive(Parser, Debug)]
#[command(
    name = "vault-cli",
    about = "Tokenized vault previews and scenario simulation",
    version,
    propagate_version = true
)]
pub struct VaultCli {
    /// Default log filter, used when `RUST_LOG` is unset.
    #[arg(long, global = true, env = "VAULT_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log output format.
    #[arg(
        long,
        global = true,
        env = "VAULT_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Quote every conversion for a given vault state.
    Preview(PreviewArgs),
    /// Replay a JSON scenario against a fresh vault.
    Simulate(SimulateArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `preview` subcommand.
#[derive(Parser, Debug)]
pub struct PreviewArgs {
    /// Assets currently held by the vault.
    #[arg(long, default_value_t = 0)]
    pub total_assets: Amount,

    /// Shares currently outstanding.
    #[arg(long, default_value_t = 0)]
    pub total_shares: Amount,

    /// Amount to quote, in assets or shares depending on the operation.
    #[arg(long)]
    pub amount: Amount,
}

/// Arguments for the `simulate` subcommand.
#[derive(Parser, Debug)]
pub struct SimulateArgs {
    /// Path to the scenario file (JSON).
    pub scenario: PathBuf,

    /// Record failing steps and continue instead of stopping at the first.
    #[arg(long)]
    pub keep_going: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        VaultCli::command().debug_assert();
    }

    #[test]
    fn parses_wide_amounts() {
        let cli = VaultCli::try_parse_from([
            "vault-cli",
            "preview",
            "--total-assets",
            "340282366920938463463374607431768211455",
            "--amount",
            "5",
        ])
        .unwrap();
        match cli.command {
            Commands::Preview(args) => {
                assert_eq!(args.total_assets, u128::MAX);
                assert_eq!(args.total_shares, 0);
                assert_eq!(args.amount, 5);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn simulate_takes_path_and_flag() {
        let cli =
            VaultCli::try_parse_from(["vault-cli", "simulate", "steps.json", "--keep-going"])
                .unwrap();
        match cli.command {
            Commands::Simulate(args) => {
                assert_eq!(args.scenario, PathBuf::from("steps.json"));
                assert!(args.keep_going);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.log_format, LogFormat::Pretty);
    }
}
