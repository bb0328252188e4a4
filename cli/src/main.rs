// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Vault CLI
//!
//! Entry point for the `vault-cli` binary. Parses CLI arguments, initializes
//! logging and dispatches to a subcommand:
//!
//! - `preview`:  quote every conversion for a given vault state
//! - `simulate`: replay a JSON scenario against an in-memory vault
//! - `version`:  print build version information
//!
//! Reports are printed to stdout as JSON; logs go to stderr.

mod cli;
mod logging;
mod preview;
mod scenario;

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use vault_protocol::VaultState;

use cli::{Commands, VaultCli};
use preview::PreviewReport;
use scenario::Scenario;

fn main() -> Result<()> {
    let cli = VaultCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    match cli.command {
        Commands::Preview(args) => {
            let state = VaultState::new(args.total_assets, args.total_shares);
            print_json(&PreviewReport::compute(state, args.amount))
        }
        Commands::Simulate(args) => simulate(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

fn simulate(args: cli::SimulateArgs) -> Result<()> {
    let scenario = Scenario::load(&args.scenario)?;
    tracing::info!(
        path = %args.scenario.display(),
        steps = scenario.steps.len(),
        keep_going = args.keep_going,
        "replaying scenario"
    );

    let report = scenario::run(&scenario, args.keep_going)?;
    if report.failed > 0 {
        tracing::warn!(failed = report.failed, "scenario finished with failed steps");
    }
    print_json(&report)
}

/// Writes `value` as pretty JSON to stdout.
///
/// Goes through `to_writer_pretty` rather than `serde_json::Value` so that
/// amounts above `u64::MAX` are printed exactly.
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value).context("failed to encode report")?;
    writeln!(out).context("failed to write report")?;
    Ok(())
}

fn print_version() {
    println!("vault-cli {}", env!("CARGO_PKG_VERSION"));
    println!("rustc     {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
