//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the two identifier namespaces of the ledger:
//! vehicles (`Vin`) and accounts (`AccountId`). You cannot pass a VIN
//! where an account is expected, or vice versa.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Vehicle identification number.
///
/// Assigned by the registering caller and immutable afterwards.
/// Uniqueness is enforced by the ledger, not by this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vin(u64);

impl Vin {
    /// Wrap a raw VIN.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw integer value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for Vin {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Vin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum accepted length of an account identity.
const MAX_ACCOUNT_LEN: usize = 128;

/// Identity of an authenticated caller, vehicle owner, or buyer.
///
/// The ledger never authenticates; it trusts the identity handed to it by
/// the transport. Validation only rules out values that would corrupt the
/// record invariants: the empty string and the all-zero address, both of
/// which mean "nobody" at the compatibility boundary.
///
/// Identities are case-insensitive and stored lowercased, so
/// `0xAbC…` and `0xabc…` are the same account.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// The sentinel rendered in place of an absent account.
    pub const ZERO_ADDRESS: &'static str = "0x0000000000000000000000000000000000000000";

    /// Create a validated account identity.
    pub fn new(s: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = s.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyAccountId);
        }
        if trimmed.len() > MAX_ACCOUNT_LEN {
            return Err(ValidationError::InvalidAccountId(
                trimmed.to_string(),
                "longer than 128 characters",
            ));
        }
        if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ValidationError::InvalidAccountId(
                trimmed.to_string(),
                "contains whitespace or control characters",
            ));
        }
        let normalized = trimmed.to_ascii_lowercase();
        if is_zero_address(&normalized) {
            return Err(ValidationError::ZeroAddress);
        }
        Ok(Self(normalized))
    }

    /// Return the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render an optional account, substituting the zero address for `None`.
    pub fn render_optional(account: Option<&AccountId>) -> &str {
        account.map_or(Self::ZERO_ADDRESS, Self::as_str)
    }
}

/// `0x` followed only by zeros, of any length.
fn is_zero_address(s: &str) -> bool {
    s.strip_prefix("0x")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b == b'0'))
}

impl FromStr for AccountId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for AccountId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
