//! # Vehicle Routes
//!
//! Registration, listing, purchase, and transfer of vehicles.
//!
//! ## Endpoints
//!
//! - `POST /v1/vehicles`: register a vehicle owned by the caller
//! - `GET /v1/vehicles`: registered VINs in registration order
//! - `GET /v1/vehicles/{vin}`: full record
//! - `GET /v1/vehicles/{vin}/details`: fixed-order tuple
//! - `POST /v1/vehicles/{vin}/sale`: list for sale (owner)
//! - `POST /v1/vehicles/{vin}/purchase`: buy with attached payment
//! - `POST /v1/vehicles/{vin}/transfer`: hand to another account (owner)

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use mart_core::{Amount, Vin};
use mart_ledger::PurchaseReceipt;
use mart_state::{VehicleRecord, VehicleSpec, VehicleTransitionRecord, VehicleTuple};

use crate::auth::Caller;
use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_json, parse_account, Validate};
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to register a new vehicle.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterVehicleRequest {
    /// Caller-assigned VIN. Must not already exist.
    pub vin: u64,
    /// Model year.
    pub year: u32,
    /// Model name.
    pub model: String,
    /// Manufacturer.
    pub make: String,
    /// Engine capacity.
    pub capacity: u32,
}

impl Validate for RegisterVehicleRequest {
    fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.make.trim().is_empty() {
            return Err("make must not be empty".to_string());
        }
        Ok(())
    }
}

impl From<RegisterVehicleRequest> for VehicleSpec {
    fn from(req: RegisterVehicleRequest) -> Self {
        Self {
            vin: Vin::new(req.vin),
            year: req.year,
            model: req.model,
            make: req.make,
            capacity: req.capacity,
        }
    }
}

/// Request to list a vehicle for sale.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListForSaleRequest {
    /// Asking price in the smallest currency unit.
    #[schema(value_type = String, example = "2000000000000000000")]
    pub price: Amount,
}

/// Request to buy a listed vehicle.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PurchaseRequest {
    /// Attached payment in the smallest currency unit.
    #[schema(value_type = String, example = "2000000000000000000")]
    pub payment: Amount,
}

/// Request to transfer a vehicle.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferRequest {
    /// Account that will own the vehicle.
    pub new_owner: String,
}

/// One status transition of a vehicle.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransitionResponse {
    pub from: String,
    pub to: String,
    pub kind: String,
    pub actor: String,
    pub timestamp: String,
}

impl From<&VehicleTransitionRecord> for TransitionResponse {
    fn from(t: &VehicleTransitionRecord) -> Self {
        Self {
            from: t.from_status.as_str().to_string(),
            to: t.to_status.as_str().to_string(),
            kind: t.kind.as_str().to_string(),
            actor: t.actor.to_string(),
            timestamp: t.timestamp.to_iso8601(),
        }
    }
}

/// A vehicle record.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VehicleResponse {
    pub vin: u64,
    pub make: String,
    pub model: String,
    pub year: u32,
    pub capacity: u32,
    /// `ROAD_WORTHY`, `FOR_SALE`, or `FINANCED`.
    pub status: String,
    /// Human-readable status.
    pub status_label: String,
    /// Asking price; `"0"` unless for sale.
    #[schema(value_type = String)]
    pub sale_price: Amount,
    pub owner: String,
    /// Most recent purchaser, absent until the first sale.
    pub buyer: Option<String>,
    pub registered_at: String,
    pub transitions: Vec<TransitionResponse>,
}

impl From<VehicleRecord> for VehicleResponse {
    fn from(v: VehicleRecord) -> Self {
        Self {
            vin: v.vin.get(),
            status: v.status.as_str().to_string(),
            status_label: v.status.label().to_string(),
            sale_price: v.sale_price,
            owner: v.owner.to_string(),
            buyer: v.buyer.map(|b| b.to_string()),
            registered_at: v.registered_at.to_iso8601(),
            transitions: v.transitions.iter().map(TransitionResponse::from).collect(),
            make: v.make,
            model: v.model,
            year: v.year,
            capacity: v.capacity,
        }
    }
}

/// Registered VINs.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VehicleListResponse {
    /// In registration order.
    pub vins: Vec<u64>,
    pub count: usize,
}

/// Money movements of a completed purchase.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurchaseResponse {
    pub vin: u64,
    pub seller: String,
    pub buyer: String,
    #[schema(value_type = String)]
    pub price: Amount,
    #[schema(value_type = String)]
    pub fee: Amount,
    #[schema(value_type = String)]
    pub proceeds: Amount,
    #[schema(value_type = String)]
    pub refund: Amount,
}

impl From<PurchaseReceipt> for PurchaseResponse {
    fn from(r: PurchaseReceipt) -> Self {
        Self {
            vin: r.vin.get(),
            seller: r.seller.to_string(),
            buyer: r.buyer.to_string(),
            price: r.price,
            fee: r.fee,
            proceeds: r.proceeds,
            refund: r.refund,
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the vehicles router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/vehicles", get(list_vehicles).post(register_vehicle))
        .route("/v1/vehicles/{vin}", get(get_vehicle))
        .route("/v1/vehicles/{vin}/details", get(get_vehicle_details))
        .route("/v1/vehicles/{vin}/sale", post(list_for_sale))
        .route("/v1/vehicles/{vin}/purchase", post(purchase_vehicle))
        .route("/v1/vehicles/{vin}/transfer", post(transfer_vehicle))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/vehicles: Register a vehicle owned by the caller.
#[utoipa::path(
    post,
    path = "/v1/vehicles",
    request_body = RegisterVehicleRequest,
    params(("x-caller-id" = String, Header, description = "Authenticated caller account")),
    responses(
        (status = 201, description = "Vehicle registered", body = VehicleResponse),
        (status = 409, description = "VIN already registered", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
        (status = 503, description = "Ledger paused", body = crate::error::ErrorBody),
    ),
    tag = "vehicles"
)]
pub async fn register_vehicle(
    caller: Caller,
    State(state): State<AppState>,
    body: Result<Json<RegisterVehicleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<VehicleResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let record = state.ledger.register(req.into(), caller.account())?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// GET /v1/vehicles: Registered VINs in registration order.
#[utoipa::path(
    get,
    path = "/v1/vehicles",
    responses(
        (status = 200, description = "Registered VINs", body = VehicleListResponse),
    ),
    tag = "vehicles"
)]
pub async fn list_vehicles(State(state): State<AppState>) -> Json<VehicleListResponse> {
    let vins: Vec<u64> = state.ledger.vins().into_iter().map(Vin::get).collect();
    Json(VehicleListResponse {
        count: vins.len(),
        vins,
    })
}

/// GET /v1/vehicles/{vin}: Full vehicle record.
#[utoipa::path(
    get,
    path = "/v1/vehicles/{vin}",
    params(("vin" = u64, Path, description = "Vehicle identification number")),
    responses(
        (status = 200, description = "Vehicle found", body = VehicleResponse),
        (status = 404, description = "Vehicle not found", body = crate::error::ErrorBody),
    ),
    tag = "vehicles"
)]
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(vin): Path<u64>,
) -> Result<Json<VehicleResponse>, AppError> {
    let record = state.ledger.fetch(Vin::new(vin))?;
    Ok(Json(record.into()))
}

/// GET /v1/vehicles/{vin}/details: Ordered tuple
/// `[model, make, vin, year, status, salePrice, owner, buyer, capacity]`.
#[utoipa::path(
    get,
    path = "/v1/vehicles/{vin}/details",
    params(("vin" = u64, Path, description = "Vehicle identification number")),
    responses(
        (status = 200, description = "Vehicle tuple as a JSON array"),
        (status = 404, description = "Vehicle not found", body = crate::error::ErrorBody),
    ),
    tag = "vehicles"
)]
pub async fn get_vehicle_details(
    State(state): State<AppState>,
    Path(vin): Path<u64>,
) -> Result<Json<VehicleTuple>, AppError> {
    Ok(Json(state.ledger.details(Vin::new(vin))?))
}

/// POST /v1/vehicles/{vin}/sale: List a vehicle for sale.
#[utoipa::path(
    post,
    path = "/v1/vehicles/{vin}/sale",
    request_body = ListForSaleRequest,
    params(
        ("vin" = u64, Path, description = "Vehicle identification number"),
        ("x-caller-id" = String, Header, description = "Authenticated caller account"),
    ),
    responses(
        (status = 200, description = "Vehicle listed", body = VehicleResponse),
        (status = 403, description = "Caller is not the owner", body = crate::error::ErrorBody),
        (status = 404, description = "Vehicle not found", body = crate::error::ErrorBody),
        (status = 422, description = "Price must be positive", body = crate::error::ErrorBody),
        (status = 503, description = "Ledger paused", body = crate::error::ErrorBody),
    ),
    tag = "vehicles"
)]
pub async fn list_for_sale(
    caller: Caller,
    State(state): State<AppState>,
    Path(vin): Path<u64>,
    body: Result<Json<ListForSaleRequest>, JsonRejection>,
) -> Result<Json<VehicleResponse>, AppError> {
    let req = extract_json(body)?;
    let record = state
        .ledger
        .list_for_sale(Vin::new(vin), req.price, caller.account())?;
    Ok(Json(record.into()))
}

/// POST /v1/vehicles/{vin}/purchase: Buy a listed vehicle.
#[utoipa::path(
    post,
    path = "/v1/vehicles/{vin}/purchase",
    request_body = PurchaseRequest,
    params(
        ("vin" = u64, Path, description = "Vehicle identification number"),
        ("x-caller-id" = String, Header, description = "Authenticated caller account"),
    ),
    responses(
        (status = 200, description = "Vehicle purchased", body = PurchaseResponse),
        (status = 402, description = "Payment does not match the asking price", body = crate::error::ErrorBody),
        (status = 403, description = "Owner cannot buy their own vehicle", body = crate::error::ErrorBody),
        (status = 404, description = "Vehicle not found", body = crate::error::ErrorBody),
        (status = 409, description = "Vehicle not for sale", body = crate::error::ErrorBody),
        (status = 503, description = "Ledger paused", body = crate::error::ErrorBody),
    ),
    tag = "vehicles"
)]
pub async fn purchase_vehicle(
    caller: Caller,
    State(state): State<AppState>,
    Path(vin): Path<u64>,
    body: Result<Json<PurchaseRequest>, JsonRejection>,
) -> Result<Json<PurchaseResponse>, AppError> {
    let req = extract_json(body)?;
    let receipt = state
        .ledger
        .purchase(Vin::new(vin), caller.account(), req.payment)?;
    Ok(Json(receipt.into()))
}

/// POST /v1/vehicles/{vin}/transfer: Transfer ownership.
#[utoipa::path(
    post,
    path = "/v1/vehicles/{vin}/transfer",
    request_body = TransferRequest,
    params(
        ("vin" = u64, Path, description = "Vehicle identification number"),
        ("x-caller-id" = String, Header, description = "Authenticated caller account"),
    ),
    responses(
        (status = 200, description = "Vehicle transferred", body = VehicleResponse),
        (status = 403, description = "Caller is not the owner", body = crate::error::ErrorBody),
        (status = 404, description = "Vehicle not found", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid new owner", body = crate::error::ErrorBody),
        (status = 503, description = "Ledger paused", body = crate::error::ErrorBody),
    ),
    tag = "vehicles"
)]
pub async fn transfer_vehicle(
    caller: Caller,
    State(state): State<AppState>,
    Path(vin): Path<u64>,
    body: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<VehicleResponse>, AppError> {
    let req = extract_json(body)?;
    let new_owner = parse_account(&req.new_owner)?;
    let record = state
        .ledger
        .transfer(Vin::new(vin), &new_owner, caller.account())?;
    Ok(Json(record.into()))
}
