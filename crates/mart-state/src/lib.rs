//! # mart-state: Vehicle Record State Machine
//!
//! Models a single vehicle record and the transitions it may take. The
//! record knows nothing about callers, payments, or the circuit breaker;
//! those guards belong to the ledger. What lives here is the part that
//! must hold no matter who drives it:
//!
//! ```text
//!             list_for_sale()            complete_sale()
//! RoadWorthy ───────────────▶ ForSale ───────────────▶ RoadWorthy
//!     ▲  │                      │  ▲
//!     │  └──── reassign() ──────┘  └── list_for_sale() (re-price)
//!     └────────────┘
//!
//! Financed: reserved, never entered.
//! ```
//!
//! `status == ForSale` if and only if `sale_price > 0`, and every completed
//! sale or reassignment leaves the record `RoadWorthy` with a zero price.

pub mod vehicle;

pub use vehicle::{
    CompletedSale, TransitionKind, VehicleError, VehicleRecord, VehicleSpec, VehicleStatus,
    VehicleTransitionRecord, VehicleTuple,
};
