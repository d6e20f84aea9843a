//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Ledger errors map to HTTP status codes with a stable machine-readable
//! code. Internal error details are never returned to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use mart_ledger::LedgerError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "WRONG_PAYMENT").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional context, present only for some client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// A ledger operation was refused.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No caller identity on the request (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Requested resource does not exist outside the ledger (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Ledger(err) => ledger_status_and_code(err),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Internal(_) | Self::Ledger(LedgerError::Overflow(_))
        )
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Ledger(LedgerError::WrongPayment { expected, provided }) => Some(
                serde_json::json!({ "expected": expected, "provided": provided }),
            ),
            Self::Ledger(LedgerError::NotForSale { vin, status }) => {
                Some(serde_json::json!({ "vin": vin, "status": status }))
            }
            _ => None,
        }
    }
}

fn ledger_status_and_code(err: &LedgerError) -> (StatusCode, &'static str) {
    match err {
        LedgerError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        LedgerError::Unauthorized { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        LedgerError::DuplicateVin(_) => (StatusCode::CONFLICT, "DUPLICATE_VIN"),
        LedgerError::NotForSale { .. } => (StatusCode::CONFLICT, "NOT_FOR_SALE"),
        LedgerError::InvalidTransition { .. } => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
        LedgerError::PausedRequired => (StatusCode::CONFLICT, "PAUSED_REQUIRED"),
        LedgerError::InvalidPrice => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_PRICE"),
        LedgerError::InvalidDetails(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_DETAILS"),
        LedgerError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
        LedgerError::WrongPayment { .. } => (StatusCode::PAYMENT_REQUIRED, "WRONG_PAYMENT"),
        LedgerError::OperationDisallowed => {
            (StatusCode::SERVICE_UNAVAILABLE, "OPERATION_DISALLOWED")
        }
        LedgerError::Overflow(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = if self.is_internal() {
            tracing::error!(error = %self, "internal server error");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Convert mart-core validation errors to API errors.
impl From<mart_core::ValidationError> for AppError {
    fn from(err: mart_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mart_core::{AccountId, Amount, Vin};
    use mart_state::VehicleStatus;

    fn status_of(err: LedgerError) -> (StatusCode, &'static str) {
        AppError::from(err).status_and_code()
    }

    #[test]
    fn ledger_errors_map_to_statuses() {
        assert_eq!(
            status_of(LedgerError::NotFound(Vin::new(1))),
            (StatusCode::NOT_FOUND, "NOT_FOUND")
        );
        assert_eq!(
            status_of(LedgerError::DuplicateVin(Vin::new(1))).0,
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(LedgerError::Unauthorized {
                caller: AccountId::new("0xa").unwrap(),
                action: "pause the ledger",
            })
            .0,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(LedgerError::InvalidPrice).0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(LedgerError::WrongPayment {
                expected: Amount::from(2),
                provided: Amount::from(1),
            }),
            (StatusCode::PAYMENT_REQUIRED, "WRONG_PAYMENT")
        );
        assert_eq!(
            status_of(LedgerError::OperationDisallowed),
            (StatusCode::SERVICE_UNAVAILABLE, "OPERATION_DISALLOWED")
        );
        assert_eq!(
            status_of(LedgerError::PausedRequired).0,
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn unauthorized_status_code() {
        let (status, code) = AppError::Unauthorized("no caller".into()).status_and_code();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(code, "UNAUTHORIZED");
    }

    #[test]
    fn overflow_is_internal() {
        let err = AppError::from(LedgerError::Overflow("seller balance"));
        assert!(err.is_internal());
        assert_eq!(err.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn wrong_payment_carries_details() {
        let err = AppError::from(LedgerError::WrongPayment {
            expected: Amount::from(2000),
            provided: Amount::from(1999),
        });
        assert_eq!(
            err.details(),
            Some(serde_json::json!({ "expected": "2000", "provided": "1999" }))
        );
    }

    #[test]
    fn not_for_sale_details_name_status() {
        let err = AppError::from(LedgerError::NotForSale {
            vin: Vin::new(7),
            status: VehicleStatus::RoadWorthy,
        });
        assert_eq!(
            err.details(),
            Some(serde_json::json!({ "vin": 7, "status": "ROAD_WORTHY" }))
        );
    }

    #[test]
    fn validation_error_converts() {
        let err = AppError::from(mart_core::ValidationError::EmptyAccountId);
        assert_eq!(
            err.status_and_code(),
            (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR")
        );
    }

    #[test]
    fn error_body_serializes() {
        let body = ErrorBody {
            error: ErrorDetail {
                code: "TEST".to_string(),
                message: "test message".to_string(),
                details: None,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"]["code"], "TEST");
        assert!(json["error"].get("details").is_none());
    }
}
