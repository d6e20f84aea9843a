//! # Operator Routes
//!
//! The circuit breaker and fee withdrawal, restricted to the operator
//! account, plus a public status view.
//!
//! ## Endpoints
//!
//! - `POST /v1/admin/pause`: trip the circuit breaker
//! - `POST /v1/admin/resume`: reset the circuit breaker
//! - `POST /v1/admin/withdraw`: pay accrued fees to the operator
//! - `GET /v1/admin/status`: control state snapshot

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use mart_core::Amount;
use mart_ledger::LedgerSnapshot;

use crate::auth::Caller;
use crate::error::AppError;
use crate::state::AppState;

// ── Response DTOs ───────────────────────────────────────────────────

/// Circuit breaker state after a pause or resume.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BreakerResponse {
    pub paused: bool,
    /// False when the ledger was already in the requested state.
    pub changed: bool,
}

/// Result of a fee withdrawal.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WithdrawResponse {
    /// Amount moved out of the fee pool.
    #[schema(value_type = String)]
    pub amount: Amount,
    /// Operator balance after the withdrawal.
    #[schema(value_type = String)]
    pub operator_balance: Amount,
}

/// Ledger control state.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub operator: String,
    pub paused: bool,
    #[schema(value_type = String)]
    pub accrued_fees: Amount,
    pub vehicle_count: usize,
    pub fee_rate_bps: u32,
    /// Sequence of the latest event; zero if none.
    pub last_sequence: u64,
    /// Events retained for polling.
    pub retained_events: usize,
    /// Oldest sequence still served by `GET /v1/events`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_retained: Option<u64>,
}

impl From<LedgerSnapshot> for StatusResponse {
    fn from(s: LedgerSnapshot) -> Self {
        Self {
            operator: s.operator.to_string(),
            paused: s.paused,
            accrued_fees: s.accrued_fees,
            vehicle_count: s.vehicle_count,
            fee_rate_bps: s.fee_rate.bps(),
            last_sequence: s.last_sequence,
            retained_events: s.retained_events,
            oldest_retained: s.oldest_retained,
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the operator router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/pause", post(pause))
        .route("/v1/admin/resume", post(resume))
        .route("/v1/admin/withdraw", post(withdraw))
        .route("/v1/admin/status", get(status))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/admin/pause: Trip the circuit breaker.
#[utoipa::path(
    post,
    path = "/v1/admin/pause",
    params(("x-caller-id" = String, Header, description = "Operator account")),
    responses(
        (status = 200, description = "Ledger paused", body = BreakerResponse),
        (status = 403, description = "Caller is not the operator", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
pub async fn pause(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<Json<BreakerResponse>, AppError> {
    let changed = state.ledger.pause(caller.account())?;
    Ok(Json(BreakerResponse {
        paused: true,
        changed,
    }))
}

/// POST /v1/admin/resume: Reset the circuit breaker.
#[utoipa::path(
    post,
    path = "/v1/admin/resume",
    params(("x-caller-id" = String, Header, description = "Operator account")),
    responses(
        (status = 200, description = "Ledger resumed", body = BreakerResponse),
        (status = 403, description = "Caller is not the operator", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
pub async fn resume(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<Json<BreakerResponse>, AppError> {
    let changed = state.ledger.resume(caller.account())?;
    Ok(Json(BreakerResponse {
        paused: false,
        changed,
    }))
}

/// POST /v1/admin/withdraw: Pay all accrued fees to the operator.
#[utoipa::path(
    post,
    path = "/v1/admin/withdraw",
    params(("x-caller-id" = String, Header, description = "Operator account")),
    responses(
        (status = 200, description = "Fees withdrawn", body = WithdrawResponse),
        (status = 403, description = "Caller is not the operator", body = crate::error::ErrorBody),
        (status = 409, description = "Withdrawal requires a paused ledger", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
pub async fn withdraw(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<Json<WithdrawResponse>, AppError> {
    let amount = state.ledger.withdraw(caller.account())?;
    Ok(Json(WithdrawResponse {
        amount,
        operator_balance: state.ledger.balance_of(caller.account()),
    }))
}

/// GET /v1/admin/status: Control state snapshot.
#[utoipa::path(
    get,
    path = "/v1/admin/status",
    responses(
        (status = 200, description = "Ledger status", body = StatusResponse),
    ),
    tag = "admin"
)]
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(state.ledger.snapshot().into())
}
