//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Motorbike Mart Ledger API",
        version = "0.1.0",
        description = "Vehicle registration, sale, purchase with operator fee split, ownership transfer, circuit breaker, and ledger events.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Vehicles
        crate::routes::vehicles::register_vehicle,
        crate::routes::vehicles::list_vehicles,
        crate::routes::vehicles::get_vehicle,
        crate::routes::vehicles::get_vehicle_details,
        crate::routes::vehicles::list_for_sale,
        crate::routes::vehicles::purchase_vehicle,
        crate::routes::vehicles::transfer_vehicle,
        // Operator
        crate::routes::admin::pause,
        crate::routes::admin::resume,
        crate::routes::admin::withdraw,
        crate::routes::admin::status,
        // Accounts
        crate::routes::accounts::get_balance,
        // Events
        crate::routes::events::list_events,
        crate::routes::events::stream_events,
    ),
    components(schemas(
        crate::routes::vehicles::RegisterVehicleRequest,
        crate::routes::vehicles::ListForSaleRequest,
        crate::routes::vehicles::PurchaseRequest,
        crate::routes::vehicles::TransferRequest,
        crate::routes::vehicles::VehicleResponse,
        crate::routes::vehicles::TransitionResponse,
        crate::routes::vehicles::VehicleListResponse,
        crate::routes::vehicles::PurchaseResponse,
        crate::routes::admin::BreakerResponse,
        crate::routes::admin::WithdrawResponse,
        crate::routes::admin::StatusResponse,
        crate::routes::accounts::BalanceResponse,
        crate::routes::events::EventResponse,
        crate::routes::events::EventsResponse,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "vehicles", description = "Vehicle lifecycle"),
        (name = "admin", description = "Operator controls"),
        (name = "accounts", description = "Credited balances"),
        (name = "events", description = "Ledger notifications"),
    )
)]
pub struct ApiDoc;

/// Router serving the OpenAPI document.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
