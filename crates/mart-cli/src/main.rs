//! # mart CLI Entry Point
//!
//! Parses arguments, initialises tracing, loads the effective
//! configuration, and dispatches to the handler modules.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mart_cli::config::{load_from_env, run_config, ConfigArgs};
use mart_cli::demo::{run_demo, DemoArgs};
use mart_cli::serve::{run_serve, ServeArgs};

/// Motorbike Mart: a vehicle registry and marketplace ledger.
#[derive(Parser, Debug)]
#[command(name = "mart", version, about)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` wins.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// YAML configuration file.
    #[arg(long, global = true, env = "MART_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API.
    Serve(ServeArgs),
    /// Run the register, list, buy, withdraw scenario in-process.
    Demo(DemoArgs),
    /// Print the effective configuration.
    Config(ConfigArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let result = match load_from_env(cli.config.as_deref()) {
        Ok(config) => match &cli.command {
            Commands::Serve(args) => run_serve(args, &config).await,
            Commands::Demo(args) => run_demo(args, &config),
            Commands::Config(args) => run_config(args, &config, &mut std::io::stdout()),
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
