//! # Account Routes
//!
//! - `GET /v1/accounts/{account}/balance`: funds credited to an account
//!   by sales, refunds, and fee withdrawals

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use mart_core::Amount;

use crate::error::AppError;
use crate::extractors::parse_account;
use crate::state::AppState;

/// Credited balance of one account.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BalanceResponse {
    /// Normalized account identity.
    pub account: String,
    #[schema(value_type = String)]
    pub balance: Amount,
}

/// Build the accounts router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/accounts/{account}/balance", get(get_balance))
}

/// GET /v1/accounts/{account}/balance: Credited balance.
#[utoipa::path(
    get,
    path = "/v1/accounts/{account}/balance",
    params(("account" = String, Path, description = "Account identity")),
    responses(
        (status = 200, description = "Account balance", body = BalanceResponse),
        (status = 422, description = "Invalid account identity", body = crate::error::ErrorBody),
    ),
    tag = "accounts"
)]
pub async fn get_balance(
    State(state): State<AppState>,
    Path(account): Path<String>,
) -> Result<Json<BalanceResponse>, AppError> {
    let account = parse_account(&account)?;
    Ok(Json(BalanceResponse {
        balance: state.ledger.balance_of(&account),
        account: account.to_string(),
    }))
}
