//! # Ledger Configuration
//!
//! Fixed at construction: the operator identity and the policy choices the
//! circuit breaker and purchase path depend on.
//!
//! ```yaml
//! operator: "0x5aeda56215b167893e80b4fe645ba6d5bab767de"
//! fee_rate_bps: 500
//! payment: exact
//! register_while_paused: false
//! withdraw_requires_pause: false
//! event_capacity: 256
//! journal_capacity: 1024
//! ```
//!
//! Environment overrides: `MART_OPERATOR`, `MART_FEE_BPS`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mart_core::{AccountId, FeeRate, ValidationError};

/// How a purchase payment is matched against the asking price.
///
/// Underpayment is always rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentPolicy {
    /// Payment must equal the asking price exactly.
    #[default]
    Exact,
    /// Overpayment is accepted and the excess credited back to the buyer.
    RefundExcess,
}

/// Errors building or overriding a [`LedgerConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A value failed domain validation.
    #[error("invalid {field}: {source}")]
    Invalid {
        /// Offending setting.
        field: &'static str,
        /// Underlying validation failure.
        #[source]
        source: ValidationError,
    },

    /// An environment override could not be parsed.
    #[error("environment variable {var} has unparseable value {value:?}")]
    BadEnv {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },

    /// A capacity was zero.
    #[error("{0} must be greater than zero")]
    ZeroCapacity(&'static str),

    /// A capacity exceeded its ceiling.
    #[error("{field} must be at most {max}, got {value}")]
    CapacityTooLarge {
        /// Offending setting.
        field: &'static str,
        /// Configured value.
        value: usize,
        /// Largest accepted value.
        max: usize,
    },
}

/// Largest accepted `event_capacity`.
pub const MAX_EVENT_CAPACITY: usize = 1 << 16;

/// Largest accepted `journal_capacity`.
pub const MAX_JOURNAL_CAPACITY: usize = 1 << 20;

fn default_event_capacity() -> usize {
    256
}

fn default_journal_capacity() -> usize {
    1024
}

/// Ledger construction parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Account allowed to pause, resume, and withdraw fees.
    pub operator: AccountId,
    /// Operator fee on each sale.
    #[serde(default, rename = "fee_rate_bps")]
    pub fee_rate: FeeRate,
    /// Payment matching rule.
    #[serde(default)]
    pub payment: PaymentPolicy,
    /// Whether registration stays open while the breaker is tripped.
    #[serde(default)]
    pub register_while_paused: bool,
    /// Whether the operator may only withdraw while paused.
    #[serde(default)]
    pub withdraw_requires_pause: bool,
    /// Per-subscriber live event buffer.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    /// Events retained for polling consumers.
    #[serde(default = "default_journal_capacity")]
    pub journal_capacity: usize,
}

impl LedgerConfig {
    /// Defaults for everything except the operator.
    pub fn new(operator: AccountId) -> Self {
        Self {
            operator,
            fee_rate: FeeRate::DEFAULT,
            payment: PaymentPolicy::Exact,
            register_while_paused: false,
            withdraw_requires_pause: false,
            event_capacity: default_event_capacity(),
            journal_capacity: default_journal_capacity(),
        }
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_capacity("event_capacity", self.event_capacity, MAX_EVENT_CAPACITY)?;
        check_capacity("journal_capacity", self.journal_capacity, MAX_JOURNAL_CAPACITY)
    }

    /// Apply `MART_OPERATOR` and `MART_FEE_BPS` from `lookup`.
    ///
    /// `lookup` is normally `|k| std::env::var(k).ok()`; tests pass a map.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = lookup("MART_OPERATOR") {
            self.operator = AccountId::new(&raw).map_err(|source| ConfigError::Invalid {
                field: "operator",
                source,
            })?;
        }
        if let Some(raw) = lookup("MART_FEE_BPS") {
            let bps: u32 = raw.trim().parse().map_err(|_| ConfigError::BadEnv {
                var: "MART_FEE_BPS",
                value: raw.clone(),
            })?;
            self.fee_rate = FeeRate::from_bps(bps).map_err(|source| ConfigError::Invalid {
                field: "fee_rate_bps",
                source,
            })?;
        }
        Ok(())
    }
}

fn check_capacity(field: &'static str, value: usize, max: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::ZeroCapacity(field));
    }
    if value > max {
        return Err(ConfigError::CapacityTooLarge { field, value, max });
    }
    Ok(())
}
