//! # Custom Extractors & Validation
//!
//! Provides the [`Validate`] trait for request DTOs and helpers to extract
//! and validate JSON bodies in handlers.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use mart_core::AccountId;

use crate::error::AppError;

/// Trait for request types that can validate their business rules
/// beyond what serde deserialization checks.
pub trait Validate {
    /// Validate business rules. Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
///
/// ```ignore
/// async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
///     let req = extract_json(body)?;
///     // use req...
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Parse an account identity from a path segment or body field.
pub fn parse_account(raw: &str) -> Result<AccountId, AppError> {
    AccountId::new(raw).map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct NonEmpty(String);

    impl Validate for NonEmpty {
        fn validate(&self) -> Result<(), String> {
            if self.0.is_empty() {
                Err("must not be empty".into())
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn validated_json_runs_validation() {
        let ok = extract_validated_json(Ok(Json(NonEmpty("x".into()))));
        assert!(ok.is_ok());
        let err = extract_validated_json(Ok(Json(NonEmpty(String::new())))).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn parse_account_rejects_zero_address() {
        assert!(parse_account(AccountId::ZERO_ADDRESS).is_err());
        assert_eq!(parse_account("0xABC").unwrap(), "0xabc");
    }
}
