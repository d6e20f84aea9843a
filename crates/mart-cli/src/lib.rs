//! # mart-cli: Motorbike Mart Command-Line Interface
//!
//! The `mart` binary. Argument parsing lives in `main.rs`; each subcommand
//! is a module here exposing an `XArgs` struct and a `run_x` handler so the
//! handlers can be exercised from tests without spawning a process.
//!
//! ## Subcommands
//!
//! - `serve`: run the HTTP API with Prometheus metrics
//! - `demo`: play the register, list, buy, withdraw scenario in-process
//! - `config`: print the effective configuration as YAML
//!
//! ## Crate Policy
//!
//! - Handlers delegate to `mart-ledger` and `mart-api`; no ledger rules here.
//! - Handlers return `anyhow::Result`; `main` owns exit codes.

pub mod config;
pub mod demo;
pub mod serve;
