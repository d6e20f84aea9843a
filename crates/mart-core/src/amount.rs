//! # Monetary Amounts and Fee Rates
//!
//! `Amount` counts the smallest indivisible currency unit. The ledger does
//! no unit conversion; display layers convert to human-readable units.
//!
//! On the wire an amount is a decimal string. Prices in the smallest unit
//! routinely exceed 2^53, so JSON numbers would silently lose precision in
//! most consumers. Deserialization also accepts an integer for convenience.
//!
//! ## Fee Arithmetic
//!
//! `FeeRate` is in basis points. The fee on a sale is
//! `round_half_up(price * bps / 10_000)` computed entirely in integers,
//! and the seller's proceeds are `price - fee`. `fee + proceeds == price`
//! holds for every price; see the property tests below.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A non-negative quantity of the smallest currency unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u128);

impl Amount {
    /// Zero.
    pub const ZERO: Amount = Amount(0);

    /// Wrap a raw amount.
    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// The raw integer value.
    pub const fn get(self) -> u128 {
        self.0
    }

    /// Whether this amount is zero.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition. `None` on overflow.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Checked subtraction. `None` if the result would be negative.
    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }
}

impl From<u64> for Amount {
    fn from(raw: u64) -> Self {
        Self(u128::from(raw))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidAmount(s.to_string()));
        }
        trimmed
            .parse::<u128>()
            .map(Amount)
            .map_err(|_| ValidationError::InvalidAmount(s.to_string()))
    }
}

impl Serialize for Amount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl serde::de::Visitor<'_> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or a decimal string")
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Amount, E> {
                Ok(Amount::from(v))
            }

            fn visit_u128<E: serde::de::Error>(self, v: u128) -> Result<Amount, E> {
                Ok(Amount(v))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Amount, E> {
                u64::try_from(v)
                    .map(Amount::from)
                    .map_err(|_| E::custom(ValidationError::InvalidAmount(v.to_string())))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Amount, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Basis points in one whole.
const BPS_DENOMINATOR: u128 = 10_000;

/// Operator fee rate in basis points (1 bps = 0.01%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct FeeRate(u32);

impl FeeRate {
    /// The marketplace fee: 5% of the sale price.
    pub const DEFAULT: FeeRate = FeeRate(500);

    /// Create a fee rate, rejecting anything above 100%.
    pub fn from_bps(bps: u32) -> Result<Self, ValidationError> {
        if u128::from(bps) > BPS_DENOMINATOR {
            return Err(ValidationError::FeeRateOutOfRange(bps));
        }
        Ok(Self(bps))
    }

    /// The rate in basis points.
    pub const fn bps(self) -> u32 {
        self.0
    }

    /// Split a sale price into operator fee and seller proceeds.
    ///
    /// Returns `None` only if `price * bps` overflows `u128`.
    pub fn split(self, price: Amount) -> Option<FeeSplit> {
        let scaled = price.0.checked_mul(u128::from(self.0))?;
        // Round half up.
        let fee = scaled.checked_add(BPS_DENOMINATOR / 2)? / BPS_DENOMINATOR;
        // fee <= price because bps <= 10_000, so this never underflows.
        let proceeds = price.0.checked_sub(fee)?;
        Some(FeeSplit {
            fee: Amount(fee),
            proceeds: Amount(proceeds),
        })
    }
}

impl Default for FeeRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for FeeRate {
    type Error = ValidationError;

    fn try_from(bps: u32) -> Result<Self, Self::Error> {
        Self::from_bps(bps)
    }
}

impl From<FeeRate> for u32 {
    fn from(rate: FeeRate) -> u32 {
        rate.0
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

/// The result of applying a [`FeeRate`] to a sale price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Retained by the ledger operator.
    pub fee: Amount,
    /// Credited to the seller.
    pub proceeds: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ETHER: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn five_percent_of_two_ether() {
        let split = FeeRate::DEFAULT.split(Amount::new(2 * ETHER)).unwrap();
        assert_eq!(split.fee, Amount::new(ETHER / 10));
        assert_eq!(split.proceeds, Amount::new(19 * ETHER / 10));
    }

    #[test]
    fn fee_rounds_half_up() {
        // 10 * 5% = 0.5 -> 1
        let split = FeeRate::DEFAULT.split(Amount::new(10)).unwrap();
        assert_eq!(split.fee, Amount::new(1));
        assert_eq!(split.proceeds, Amount::new(9));
        // 9 * 5% = 0.45 -> 0
        let split = FeeRate::DEFAULT.split(Amount::new(9)).unwrap();
        assert_eq!(split.fee, Amount::ZERO);
        assert_eq!(split.proceeds, Amount::new(9));
    }

    #[test]
    fn full_rate_takes_everything() {
        let rate = FeeRate::from_bps(10_000).unwrap();
        let split = rate.split(Amount::new(1234)).unwrap();
        assert_eq!(split.fee, Amount::new(1234));
        assert!(split.proceeds.is_zero());
    }

    #[test]
    fn rate_above_whole_rejected() {
        assert_eq!(
            FeeRate::from_bps(10_001),
            Err(ValidationError::FeeRateOutOfRange(10_001))
        );
    }

    #[test]
    fn split_overflow_is_none() {
        assert!(FeeRate::DEFAULT.split(Amount::new(u128::MAX)).is_none());
    }

    #[test]
    fn fee_rate_display() {
        assert_eq!(FeeRate::DEFAULT.to_string(), "5.00%");
        assert_eq!(FeeRate::from_bps(125).unwrap().to_string(), "1.25%");
    }

    #[test]
    fn amount_serializes_as_string() {
        let json = serde_json::to_string(&Amount::new(2 * ETHER)).unwrap();
        assert_eq!(json, "\"2000000000000000000\"");
    }

    #[test]
    fn amount_deserializes_from_string_or_integer() {
        let a: Amount = serde_json::from_str("\"2000000000000000000\"").unwrap();
        assert_eq!(a, Amount::new(2 * ETHER));
        let b: Amount = serde_json::from_str("42").unwrap();
        assert_eq!(b, Amount::new(42));
        assert!(serde_json::from_str::<Amount>("-1").is_err());
        assert!(serde_json::from_str::<Amount>("\"1.5\"").is_err());
        assert!(serde_json::from_str::<Amount>("\"\"").is_err());
    }

    #[test]
    fn fee_rate_deserialize_validates() {
        let r: FeeRate = serde_json::from_str("250").unwrap();
        assert_eq!(r.bps(), 250);
        assert!(serde_json::from_str::<FeeRate>("20000").is_err());
    }

    #[test]
    fn checked_arithmetic() {
        assert_eq!(
            Amount::new(5).checked_add(Amount::new(7)),
            Some(Amount::new(12))
        );
        assert_eq!(Amount::new(5).checked_sub(Amount::new(7)), None);
        assert_eq!(Amount::new(u128::MAX).checked_add(Amount::new(1)), None);
    }

    proptest! {
        #[test]
        fn split_conserves_price(price in 0u128..=u128::MAX / 20_000, bps in 0u32..=10_000) {
            let rate = FeeRate::from_bps(bps).unwrap();
            let split = rate.split(Amount::new(price)).unwrap();
            prop_assert!(split.fee.get() <= price);
            prop_assert_eq!(split.fee.get() + split.proceeds.get(), price);
        }

        #[test]
        fn default_fee_is_rounded_five_percent(price in 0u64..=u64::MAX) {
            let split = FeeRate::DEFAULT.split(Amount::from(price)).unwrap();
            let exact_twentieths = u128::from(price);
            // round(price / 20) with ties going up
            let expected = (exact_twentieths + 10) / 20;
            prop_assert_eq!(split.fee.get(), expected);
        }
    }
}
