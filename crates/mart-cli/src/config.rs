//! # Configuration Loading
//!
//! The effective configuration is the YAML file named by `--config` (if
//! any) with environment overrides applied on top:
//!
//! | Variable        | Setting              |
//! |-----------------|----------------------|
//! | `MART_OPERATOR` | `ledger.operator`    |
//! | `MART_FEE_BPS`  | `ledger.fee_rate_bps`|
//! | `PORT`          | `server.port`        |
//!
//! Without a file, `MART_OPERATOR` is required.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};

use mart_core::AccountId;
use mart_ledger::LedgerConfig;

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Listener settings for `mart serve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MartConfig {
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Arguments for the `config` subcommand.
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Only validate; print nothing on success.
    #[arg(long)]
    pub check: bool,
}

/// Load the effective configuration.
///
/// `lookup` is normally `|k| std::env::var(k).ok()`.
pub fn load_config(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<MartConfig> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            serde_yaml::from_str::<MartConfig>(&content)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        }
        None => {
            let raw = lookup("MART_OPERATOR")
                .context("no --config file given and MART_OPERATOR is not set")?;
            let operator = AccountId::new(&raw).context("invalid MART_OPERATOR")?;
            MartConfig {
                ledger: LedgerConfig::new(operator),
                server: ServerConfig::default(),
            }
        }
    };

    config.ledger.apply_env_overrides(&lookup)?;
    if let Some(raw) = lookup("PORT") {
        config.server.port = raw
            .trim()
            .parse()
            .with_context(|| format!("PORT has unparseable value {raw:?}"))?;
    }
    config.ledger.validate()?;
    Ok(config)
}

/// Load from the process environment.
pub fn load_from_env(path: Option<&Path>) -> Result<MartConfig> {
    load_config(path, |k| std::env::var(k).ok())
}

/// Print the effective configuration as YAML to `out`.
pub fn run_config(args: &ConfigArgs, config: &MartConfig, out: &mut impl Write) -> Result<u8> {
    if args.check {
        return Ok(0);
    }
    let yaml = serde_yaml::to_string(config).context("failed to render configuration")?;
    out.write_all(yaml.as_bytes())?;
    Ok(0)
}
