//! # Validation Errors
//!
//! Construction failures for the newtypes in this crate. Every validated
//! constructor returns [`ValidationError`] rather than panicking.

use thiserror::Error;

/// A domain primitive failed validation at construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Account identity was empty or whitespace.
    #[error("account identity must not be empty")]
    EmptyAccountId,

    /// Account identity is the all-zero address, which is reserved
    /// as the "no account" sentinel.
    #[error("account identity must not be the zero address")]
    ZeroAddress,

    /// Account identity contained forbidden characters or was too long.
    #[error("invalid account identity {0:?}: {1}")]
    InvalidAccountId(String, &'static str),

    /// Amount string was not a non-negative integer.
    #[error("invalid amount {0:?}: expected a non-negative integer in the smallest currency unit")]
    InvalidAmount(String),

    /// Fee rate exceeded 100%.
    #[error("fee rate {0} bps exceeds 10000 bps")]
    FeeRateOutOfRange(u32),
}
