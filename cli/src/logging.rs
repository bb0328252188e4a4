//! # Structured Logging
//!
//! Installs the `tracing` subscriber for `vault-cli`.
//!
//! The vault library logs at three levels: `debug` for preview quotes,
//! `info` for committed deposits, mints, withdrawals, redemptions and
//! donations, `warn` for rejected operations and failed scenario steps. The
//! default filter comes from `--log-level` / `VAULT_LOG` (`warn`, so a plain
//! run only shows rejections), and `RUST_LOG` overrides it when set.
//!
//! Output goes to stderr: stdout is reserved for the JSON reports of
//! `preview` and `simulate`, so `vault-cli simulate s.json | jq` keeps
//! working at any log level.

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format, selected with `--log-format` / `VAULT_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines with targets, for watching a scenario replay.
    Pretty,
    /// One JSON object per event, with the vault's structured fields
    /// (`vault`, `operation`, `caller`, `assets`, `shares`, totals).
    Json,
}

/// Initialize the global tracing subscriber. Call once, from `main()`.
///
/// `default_level` is any `EnvFilter` directive, e.g.
///
/// ```text
/// VAULT_LOG=vault_contracts=info,vault_cli=debug
/// ```
pub fn init_logging(default_level: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_thread_ids(false),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true),
                )
                .init();
        }
    }

    tracing::debug!(?format, "logging initialized");
}
