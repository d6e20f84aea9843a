//! # mart-core: Foundational Types for Motorbike Mart
//!
//! This crate defines the domain primitives every other crate in the
//! workspace builds on. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `Vin`, `AccountId`,
//!    `Amount`: no bare integers or strings cross crate boundaries.
//!
//! 2. **Integer money.** `Amount` is a count of the smallest indivisible
//!    currency unit. There is no floating point anywhere in the fee path;
//!    `FeeRate` is expressed in basis points.
//!
//! 3. **The empty identity is not an `AccountId`.** A vehicle that has
//!    never been bought has `buyer: None`. The all-zero address only
//!    appears at the compatibility boundary, via
//!    [`AccountId::ZERO_ADDRESS`].
//!
//! 4. **UTC-only timestamps** truncated to seconds.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `mart-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod amount;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use amount::{Amount, FeeRate, FeeSplit};
pub use error::ValidationError;
pub use identity::{AccountId, Vin};
pub use temporal::Timestamp;
