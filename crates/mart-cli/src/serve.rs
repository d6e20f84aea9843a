//! # `mart serve`
//!
//! Builds the ledger from the effective configuration, installs the
//! Prometheus recorder, and serves the HTTP API until Ctrl-C.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use clap::Args;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::net::TcpListener;

use mart_api::AppState;
use mart_ledger::Ledger;

use crate::config::MartConfig;

/// Arguments for the `serve` subcommand.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Listen port. Overrides `server.port` and `PORT`.
    #[arg(long)]
    pub port: Option<u16>,

    /// Listen address. Overrides `server.bind`.
    #[arg(long)]
    pub bind: Option<String>,

    /// Skip installing the Prometheus recorder; `/metrics` answers 404.
    #[arg(long)]
    pub no_metrics: bool,
}

/// Build the ledger and the application router.
pub fn build_app(config: &MartConfig, prometheus: Option<PrometheusHandle>) -> Result<Router> {
    let ledger = Ledger::new(config.ledger.clone()).context("invalid ledger configuration")?;
    let mut state = AppState::new(ledger);
    if let Some(handle) = prometheus {
        state = state.with_prometheus(handle);
    }
    Ok(mart_api::app(state))
}

/// Bind the listener described by `config` and `args`.
pub async fn bind(args: &ServeArgs, config: &MartConfig) -> Result<TcpListener> {
    let host = args.bind.as_deref().unwrap_or(&config.server.bind);
    let port = args.port.unwrap_or(config.server.port);
    TcpListener::bind((host, port))
        .await
        .with_context(|| format!("failed to bind {host}:{port}"))
}

/// Run the server until `shutdown` resolves.
pub async fn serve_until(
    listener: TcpListener,
    app: Router,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr: SocketAddr = listener.local_addr()?;
    tracing::info!(%addr, "mart API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("server error")?;
    tracing::info!("mart API stopped");
    Ok(())
}

/// Execute the `serve` subcommand.
pub async fn run_serve(args: &ServeArgs, config: &MartConfig) -> Result<u8> {
    let prometheus = if args.no_metrics {
        None
    } else {
        Some(
            PrometheusBuilder::new()
                .install_recorder()
                .context("failed to install Prometheus recorder")?,
        )
    };
    let app = build_app(config, prometheus)?;
    let listener = bind(args, config).await?;
    serve_until(listener, app, shutdown_signal()).await?;
    Ok(0)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
    }
}
