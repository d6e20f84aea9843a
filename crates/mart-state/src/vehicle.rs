//! # Vehicle Lifecycle
//!
//! A vehicle record with its sale status and transition history.
//!
//! ## Status Codes
//!
//! Compatibility consumers read status as an integer in declaration order:
//! `RoadWorthy = 0`, `ForSale = 1`, `Financed = 2`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mart_core::{AccountId, Amount, Timestamp, Vin};

// ─── Vehicle Status ──────────────────────────────────────────────────

/// The sale status of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    /// Owned and not listed. Initial status and the status after every
    /// completed sale or transfer.
    RoadWorthy,
    /// Listed by its owner at a positive asking price.
    ForSale,
    /// Reserved. No operation moves a vehicle into this status.
    Financed,
}

impl VehicleStatus {
    /// Integer code in declaration order.
    pub fn code(&self) -> u8 {
        match self {
            Self::RoadWorthy => 0,
            Self::ForSale => 1,
            Self::Financed => 2,
        }
    }

    /// Canonical state name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoadWorthy => "ROAD_WORTHY",
            Self::ForSale => "FOR_SALE",
            Self::Financed => "FINANCED",
        }
    }

    /// Human-readable label for listings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RoadWorthy => "Road Worthy",
            Self::ForSale => "For Sale",
            Self::Financed => "Financed",
        }
    }
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors that can occur during vehicle record transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VehicleError {
    /// Registration details failed validation.
    #[error("invalid vehicle details: {0}")]
    InvalidDetails(String),

    /// Asking price must be positive.
    #[error("sale price must be greater than zero")]
    InvalidPrice,

    /// Purchase attempted on a vehicle that is not listed.
    #[error("vehicle {vin} is not for sale (status {status})")]
    NotForSale {
        /// The vehicle.
        vin: Vin,
        /// Its current status.
        status: VehicleStatus,
    },

    /// The state machine does not allow this transition.
    #[error("invalid vehicle transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: VehicleStatus,
        /// Attempted target status.
        to: VehicleStatus,
    },
}

// ─── Registration Input ──────────────────────────────────────────────

/// Immutable details supplied at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSpec {
    /// Caller-assigned identifier.
    pub vin: Vin,
    /// Model year.
    pub year: u32,
    /// Model name, e.g. "Ninja".
    pub model: String,
    /// Manufacturer, e.g. "Kawasaki".
    pub make: String,
    /// Engine capacity.
    pub capacity: u32,
}

impl VehicleSpec {
    /// Trim free-text fields and reject blanks.
    fn normalized(self) -> Result<Self, VehicleError> {
        let model = self.model.trim().to_string();
        let make = self.make.trim().to_string();
        if model.is_empty() {
            return Err(VehicleError::InvalidDetails("model must not be empty".into()));
        }
        if make.is_empty() {
            return Err(VehicleError::InvalidDetails("make must not be empty".into()));
        }
        Ok(Self { model, make, ..self })
    }
}

// ─── Transition Record ───────────────────────────────────────────────

/// What caused a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Owner listed or re-priced the vehicle.
    Listed,
    /// A buyer completed a purchase.
    Sold,
    /// Owner handed the vehicle to another account.
    Transferred,
}

impl TransitionKind {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Listed => "listed",
            Self::Sold => "sold",
            Self::Transferred => "transferred",
        }
    }
}

/// Record of a vehicle status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleTransitionRecord {
    /// Status before the transition.
    pub from_status: VehicleStatus,
    /// Status after the transition.
    pub to_status: VehicleStatus,
    /// What happened.
    pub kind: TransitionKind,
    /// Account that drove the transition.
    pub actor: AccountId,
    /// When the transition occurred.
    pub timestamp: Timestamp,
}

/// Outcome of [`VehicleRecord::complete_sale`]: who the ledger pays and
/// how much.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedSale {
    /// Owner before the sale.
    pub seller: AccountId,
    /// The asking price that was paid.
    pub price: Amount,
}

// ─── Vehicle Record ──────────────────────────────────────────────────

/// A registered vehicle.
///
/// Fields are public for reading. Mutate through the transition methods,
/// which keep `status` and `sale_price` consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Unique identifier.
    pub vin: Vin,
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Model year.
    pub year: u32,
    /// Engine capacity.
    pub capacity: u32,
    /// Current sale status.
    pub status: VehicleStatus,
    /// Asking price; zero unless `ForSale`.
    pub sale_price: Amount,
    /// Current owner.
    pub owner: AccountId,
    /// Most recent purchaser; `None` until the first sale.
    pub buyer: Option<AccountId>,
    /// When the vehicle was registered.
    pub registered_at: Timestamp,
    /// Ordered log of all status transitions.
    pub transitions: Vec<VehicleTransitionRecord>,
}

impl VehicleRecord {
    /// Create a newly registered, road-worthy vehicle owned by `owner`.
    pub fn register(spec: VehicleSpec, owner: AccountId) -> Result<Self, VehicleError> {
        let spec = spec.normalized()?;
        Ok(Self {
            vin: spec.vin,
            make: spec.make,
            model: spec.model,
            year: spec.year,
            capacity: spec.capacity,
            status: VehicleStatus::RoadWorthy,
            sale_price: Amount::ZERO,
            owner,
            buyer: None,
            registered_at: Timestamp::now(),
            transitions: Vec::new(),
        })
    }

    /// Whether `account` currently owns this vehicle.
    pub fn is_owned_by(&self, account: &AccountId) -> bool {
        self.owner == *account
    }

    /// Whether the vehicle is currently listed.
    pub fn is_for_sale(&self) -> bool {
        self.status == VehicleStatus::ForSale
    }

    /// Check that [`list_for_sale`](Self::list_for_sale) would succeed
    /// without mutating anything.
    pub fn check_listable(&self, price: Amount) -> Result<(), VehicleError> {
        if price.is_zero() {
            return Err(VehicleError::InvalidPrice);
        }
        match self.status {
            VehicleStatus::RoadWorthy | VehicleStatus::ForSale => Ok(()),
            VehicleStatus::Financed => Err(VehicleError::InvalidTransition {
                from: self.status,
                to: VehicleStatus::ForSale,
            }),
        }
    }

    /// List the vehicle at `price` (ROAD_WORTHY or FOR_SALE → FOR_SALE).
    ///
    /// Listing an already listed vehicle changes its price.
    pub fn list_for_sale(&mut self, price: Amount, actor: &AccountId) -> Result<(), VehicleError> {
        self.check_listable(price)?;
        self.sale_price = price;
        self.do_transition(VehicleStatus::ForSale, TransitionKind::Listed, actor);
        Ok(())
    }

    /// Check that [`complete_sale`](Self::complete_sale) would succeed and
    /// return the asking price.
    pub fn check_purchasable(&self) -> Result<Amount, VehicleError> {
        match self.status {
            VehicleStatus::ForSale => Ok(self.sale_price),
            VehicleStatus::RoadWorthy | VehicleStatus::Financed => Err(VehicleError::NotForSale {
                vin: self.vin,
                status: self.status,
            }),
        }
    }

    /// Hand the vehicle to `buyer` (FOR_SALE → ROAD_WORTHY).
    ///
    /// Payment is the ledger's concern; this only moves the record.
    pub fn complete_sale(&mut self, buyer: &AccountId) -> Result<CompletedSale, VehicleError> {
        let price = self.check_purchasable()?;
        let seller = std::mem::replace(&mut self.owner, buyer.clone());
        self.buyer = Some(buyer.clone());
        self.sale_price = Amount::ZERO;
        self.do_transition(VehicleStatus::RoadWorthy, TransitionKind::Sold, buyer);
        Ok(CompletedSale { seller, price })
    }

    /// Transfer ownership to `new_owner` (any → ROAD_WORTHY).
    ///
    /// Clears any open listing so a stale price cannot survive an
    /// ownership change. `buyer` is left untouched: a transfer is not a
    /// purchase.
    pub fn reassign(&mut self, new_owner: AccountId, actor: &AccountId) {
        self.owner = new_owner;
        self.sale_price = Amount::ZERO;
        self.do_transition(VehicleStatus::RoadWorthy, TransitionKind::Transferred, actor);
    }

    /// The compatibility tuple in fixed field order.
    pub fn to_tuple(&self) -> VehicleTuple {
        VehicleTuple(
            self.model.clone(),
            self.make.clone(),
            self.vin.get(),
            self.year,
            self.status.code(),
            self.sale_price,
            self.owner.to_string(),
            AccountId::render_optional(self.buyer.as_ref()).to_string(),
            self.capacity,
        )
    }

    fn do_transition(&mut self, to: VehicleStatus, kind: TransitionKind, actor: &AccountId) {
        self.transitions.push(VehicleTransitionRecord {
            from_status: self.status,
            to_status: to,
            kind,
            actor: actor.clone(),
            timestamp: Timestamp::now(),
        });
        self.status = to;
    }
}

/// Vehicle fields in the fixed order compatibility consumers index by:
/// `(model, make, vin, year, status, salePrice, owner, buyer, capacity)`.
///
/// Serializes as a JSON array. An absent buyer is the zero address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleTuple(
    pub String,
    pub String,
    pub u64,
    pub u32,
    pub u8,
    pub Amount,
    pub String,
    pub String,
    pub u32,
);

// ─── Tests ───────────────────────────────────────────────────────────
