//! # Caller Identity
//!
//! The ledger never authenticates. An upstream gateway (or wallet bridge)
//! authenticates the caller and forwards the resulting account identity
//! in the `X-Caller-Id` header; this module trusts it as given.
//!
//! Handlers that mutate the ledger take a [`Caller`] argument. Requests
//! without the header are rejected with 401 before the handler runs, and
//! malformed identities (empty, zero address, embedded whitespace) with
//! 422.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use mart_core::AccountId;

use crate::error::AppError;

/// Header carrying the authenticated caller identity.
pub const CALLER_HEADER: &str = "x-caller-id";

/// The authenticated account making this request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub AccountId);

impl Caller {
    /// The caller's account.
    pub fn account(&self) -> &AccountId {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(CALLER_HEADER)
            .ok_or_else(|| AppError::Unauthorized(format!("missing {CALLER_HEADER} header")))?;
        let raw = raw
            .to_str()
            .map_err(|_| AppError::BadRequest(format!("{CALLER_HEADER} is not valid ASCII")))?;
        Ok(Self(AccountId::new(raw)?))
    }
}
