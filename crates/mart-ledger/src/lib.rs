//! # mart-ledger: The Vehicle Ledger
//!
//! The shared state machine at the heart of Motorbike Mart. It holds
//! every vehicle record, the circuit breaker, the operator fee pool, and
//! per-account credited balances, and publishes an ordered stream of
//! notifications for every committed change.
//!
//! ## Operations
//!
//! | Operation              | Who              | Blocked while paused        | Emits               |
//! |------------------------|------------------|-----------------------------|---------------------|
//! | `register`             | anyone           | unless `register_while_paused` | `NewBike`        |
//! | `list_for_sale`        | owner            | yes                         | `ForSale`           |
//! | `purchase`             | anyone but owner | yes                         | `Sold`, `Fee`       |
//! | `transfer`             | owner            | yes                         | `TransferVehicle`   |
//! | `pause` / `resume`     | operator         | no                          | `Stopped`/`Resumed` |
//! | `withdraw`             | operator         | only if `withdraw_requires_pause` | `Withdrawn`   |
//!
//! Reads (`fetch`, `details`, `vins`, `snapshot`, ...) are never blocked.
//!
//! ## Money
//!
//! A purchase splits the asking price into an operator fee
//! (`FeeRate`, 5% by default, rounded half up) and the seller's
//! proceeds. Proceeds are credited to the seller's balance; fees accrue
//! until the operator withdraws them into the operator's balance.
//!
//! ## Crate Policy
//!
//! - No `.await` while holding the ledger lock.
//! - Every operation validates fully before mutating.

pub mod config;
pub mod error;
pub mod events;
pub mod ledger;

pub use config::{
    ConfigError, LedgerConfig, PaymentPolicy, MAX_EVENT_CAPACITY, MAX_JOURNAL_CAPACITY,
};
pub use error::LedgerError;
pub use events::{EventBus, EventEnvelope, Journal, LedgerEvent};
pub use ledger::{EventPage, Ledger, LedgerSnapshot, PurchaseReceipt};
