//! # mart-api: HTTP Transport for the Vehicle Ledger
//!
//! An Axum service exposing every ledger operation as JSON over HTTP.
//! The service trusts an upstream-authenticated caller identity in the
//! `X-Caller-Id` header; it never authenticates on its own.
//!
//! ## API Surface
//!
//! | Prefix                 | Module                 | Domain                    |
//! |------------------------|------------------------|---------------------------|
//! | `/v1/vehicles/*`       | [`routes::vehicles`]   | Vehicle lifecycle         |
//! | `/v1/admin/*`          | [`routes::admin`]      | Circuit breaker, fees     |
//! | `/v1/accounts/*`       | [`routes::accounts`]   | Credited balances         |
//! | `/v1/events*`          | [`routes::events`]     | Journal and SSE stream    |
//! | `/openapi.json`        | [`openapi`]            | OpenAPI document          |
//! | `/health/*`, `/metrics`| this module            | Probes and Prometheus     |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```
//!
//! ## Crate Policy
//!
//! - No business logic in route handlers; they delegate to `mart-ledger`.
//! - All errors map to structured HTTP responses via `AppError`.

pub mod auth;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::metrics::ApiMetrics;

pub use error::AppError;
pub use state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes and `/metrics` are mounted outside the middleware stack
/// so scrapes and probes do not count as API traffic.
pub fn app(state: AppState) -> Router {
    let metrics = ApiMetrics::new();

    let api = Router::new()
        .merge(routes::vehicles::router())
        .merge(routes::admin::router())
        .merge(routes::accounts::router())
        .merge(routes::events::router())
        .merge(openapi::router())
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(metrics))
        .with_state(state.clone());

    let ops = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(render_metrics))
        .with_state(state);

    Router::new().merge(ops).merge(api)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: the ledger is in-process, so ready once serving.
async fn readiness() -> &'static str {
    "ready"
}

/// Prometheus text exposition, if a recorder is installed.
async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.prometheus {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics exporter not installed").into_response(),
    }
}
