//! # Ledger Errors
//!
//! Every ledger operation either fully succeeds or returns one of these
//! with no state changed and no event emitted.

use thiserror::Error;

use mart_core::{AccountId, Amount, ValidationError, Vin};
use mart_state::{VehicleError, VehicleStatus};

/// Errors returned by [`crate::Ledger`] operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A vehicle with this VIN is already registered.
    #[error("vehicle {0} is already registered")]
    DuplicateVin(Vin),

    /// No vehicle with this VIN.
    #[error("vehicle {0} not found")]
    NotFound(Vin),

    /// The caller may not perform this action.
    #[error("{caller} is not authorized to {action}")]
    Unauthorized {
        /// Who tried.
        caller: AccountId,
        /// What they tried.
        action: &'static str,
    },

    /// Asking price must be positive.
    #[error("sale price must be greater than zero")]
    InvalidPrice,

    /// The vehicle is not listed.
    #[error("vehicle {vin} is not for sale (status {status})")]
    NotForSale {
        /// The vehicle.
        vin: Vin,
        /// Its current status.
        status: VehicleStatus,
    },

    /// Attached payment does not satisfy the payment policy.
    #[error("payment of {provided} does not match asking price {expected}")]
    WrongPayment {
        /// The asking price.
        expected: Amount,
        /// What the caller attached.
        provided: Amount,
    },

    /// The circuit breaker is tripped.
    #[error("operation disallowed while the ledger is paused")]
    OperationDisallowed,

    /// Withdrawal is configured to require a paused ledger.
    #[error("withdrawal requires the ledger to be paused")]
    PausedRequired,

    /// Registration details failed validation.
    #[error("invalid vehicle details: {0}")]
    InvalidDetails(String),

    /// The vehicle state machine refused the transition.
    #[error("invalid vehicle transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: VehicleStatus,
        /// Attempted status.
        to: VehicleStatus,
    },

    /// A balance or fee total would exceed the representable range.
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    /// An identity or amount failed domain validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<VehicleError> for LedgerError {
    fn from(err: VehicleError) -> Self {
        match err {
            VehicleError::InvalidDetails(msg) => Self::InvalidDetails(msg),
            VehicleError::InvalidPrice => Self::InvalidPrice,
            VehicleError::NotForSale { vin, status } => Self::NotForSale { vin, status },
            VehicleError::InvalidTransition { from, to } => Self::InvalidTransition { from, to },
        }
    }
}

impl LedgerError {
    /// Stable machine-readable name, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateVin(_) => "duplicate_vin",
            Self::NotFound(_) => "not_found",
            Self::Unauthorized { .. } => "unauthorized",
            Self::InvalidPrice => "invalid_price",
            Self::NotForSale { .. } => "not_for_sale",
            Self::WrongPayment { .. } => "wrong_payment",
            Self::OperationDisallowed => "operation_disallowed",
            Self::PausedRequired => "paused_required",
            Self::InvalidDetails(_) => "invalid_details",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Overflow(_) => "overflow",
            Self::Validation(_) => "validation",
        }
    }
}
