//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! The ledger is the single source of truth; this struct only adds the
//! transport's own concerns. Cloning is cheap: the ledger is a shared
//! handle and the Prometheus handle is reference-counted.

use metrics_exporter_prometheus::PrometheusHandle;

use mart_ledger::Ledger;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The vehicle ledger.
    pub ledger: Ledger,
    /// Renders `/metrics` when a Prometheus recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Serve `ledger` without a metrics exporter.
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger,
            prometheus: None,
        }
    }

    /// Attach the handle of an installed Prometheus recorder.
    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("ledger", &self.ledger.snapshot())
            .field("prometheus", &self.prometheus.is_some())
            .finish()
    }
}
