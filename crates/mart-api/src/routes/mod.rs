//! # API Route Modules
//!
//! - `vehicles`: registration, listing, purchase, transfer, reads.
//! - `admin`: circuit breaker and fee withdrawal (operator only), status.
//! - `accounts`: credited balances.
//! - `events`: polled journal and live SSE stream.

pub mod accounts;
pub mod admin;
pub mod events;
pub mod vehicles;
