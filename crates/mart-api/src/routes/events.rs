//! # Event Routes
//!
//! Ledger notifications over HTTP, in commit order.
//!
//! - `GET /v1/events?after=N`: retained events with `sequence > N`. The
//!   journal is bounded, so a poller that falls far behind sees a gap
//!   between its cursor and the first returned sequence.
//! - `GET /v1/events/stream`: Server-Sent Events. Each SSE message has
//!   `id` = sequence, `event` = notification name, and the JSON event as
//!   `data`. A client that lags past the broadcast buffer skips the lost
//!   events and can back-fill them from the polling endpoint.

use std::convert::Infallible;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use utoipa::{IntoParams, ToSchema};

use mart_core::Amount;
use mart_ledger::{EventEnvelope, LedgerEvent};

use crate::state::AppState;

/// One committed ledger event.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    pub sequence: u64,
    pub timestamp: String,
    /// `NewBike`, `ForSale`, `Sold`, `Fee`, `TransferVehicle`, `Stopped`,
    /// `Resumed`, or `Withdrawn`.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vin: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub amount: Option<Amount>,
}

impl From<&EventEnvelope> for EventResponse {
    fn from(e: &EventEnvelope) -> Self {
        let amount = match &e.event {
            LedgerEvent::Fee { fee } => Some(*fee),
            LedgerEvent::Withdrawn { amount } => Some(*amount),
            _ => None,
        };
        Self {
            sequence: e.sequence,
            timestamp: e.timestamp.to_iso8601(),
            name: e.event.name().to_string(),
            vin: e.event.vin().map(|v| v.get()),
            amount,
        }
    }
}

/// Polled events.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventsResponse {
    pub events: Vec<EventResponse>,
    /// Sequence of the latest committed event; use as the next `after`.
    pub last_sequence: u64,
    /// Oldest sequence still retained. A cursor below `oldest_retained - 1`
    /// has missed events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_retained: Option<u64>,
}

/// Polling cursor.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventsQuery {
    /// Return events with a sequence greater than this.
    #[serde(default)]
    pub after: u64,
}

/// Build the events router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/events", get(list_events))
        .route("/v1/events/stream", get(stream_events))
}

/// GET /v1/events: Retained events after a cursor.
#[utoipa::path(
    get,
    path = "/v1/events",
    params(EventsQuery),
    responses(
        (status = 200, description = "Events in commit order", body = EventsResponse),
    ),
    tag = "events"
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Json<EventsResponse> {
    let page = state.ledger.poll_events(query.after);
    Json(EventsResponse {
        events: page.events.iter().map(EventResponse::from).collect(),
        last_sequence: page.last_sequence,
        oldest_retained: page.oldest_retained,
    })
}

/// GET /v1/events/stream: Live events as Server-Sent Events.
#[utoipa::path(
    get,
    path = "/v1/events/stream",
    responses(
        (status = 200, description = "text/event-stream of ledger events"),
    ),
    tag = "events"
)]
pub async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.ledger.subscribe()).filter_map(|item| match item {
        Ok(envelope) => sse_event(&envelope).map(Ok),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "event stream subscriber lagged; events dropped");
            None
        }
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn sse_event(envelope: &EventEnvelope) -> Option<Event> {
    Event::default()
        .id(envelope.sequence.to_string())
        .event(envelope.event.name())
        .json_data(EventResponse::from(envelope))
        .ok()
}
