//! # Ledger Notifications
//!
//! Every committed mutation publishes one or more [`LedgerEvent`]s. Each
//! is wrapped in an [`EventEnvelope`] carrying a ledger-wide sequence
//! number, assigned under the ledger's write lock, so sequence order is
//! commit order.
//!
//! Delivery has two paths:
//!
//! - **Live**: a `tokio::sync::broadcast` channel. `send` never blocks; a
//!   subscriber that falls more than the channel capacity behind receives
//!   `RecvError::Lagged` and skips ahead. No subscribers is not an error.
//! - **Journal**: a bounded in-memory history that late consumers can poll
//!   with [`Journal::since`]. When full it drops the oldest 10%.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use mart_core::{Amount, Timestamp, Vin};

use crate::config::MAX_EVENT_CAPACITY;

/// A named ledger notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name")]
pub enum LedgerEvent {
    /// A vehicle was registered.
    NewBike {
        /// The new vehicle.
        vin: Vin,
    },
    /// A vehicle was listed or re-priced.
    ForSale {
        /// The listed vehicle.
        vin: Vin,
    },
    /// A vehicle was purchased.
    Sold {
        /// The purchased vehicle.
        vin: Vin,
    },
    /// The operator fee captured by a purchase.
    Fee {
        /// Fee amount.
        fee: Amount,
    },
    /// A vehicle changed hands outside a sale.
    TransferVehicle {
        /// The transferred vehicle.
        vin: Vin,
    },
    /// The circuit breaker tripped.
    Stopped,
    /// The circuit breaker was reset.
    Resumed,
    /// Accrued fees were paid out to the operator.
    Withdrawn {
        /// Amount paid out.
        amount: Amount,
    },
}

impl LedgerEvent {
    /// The notification name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewBike { .. } => "NewBike",
            Self::ForSale { .. } => "ForSale",
            Self::Sold { .. } => "Sold",
            Self::Fee { .. } => "Fee",
            Self::TransferVehicle { .. } => "TransferVehicle",
            Self::Stopped => "Stopped",
            Self::Resumed => "Resumed",
            Self::Withdrawn { .. } => "Withdrawn",
        }
    }

    /// The vehicle this event concerns, if any.
    pub fn vin(&self) -> Option<Vin> {
        match self {
            Self::NewBike { vin }
            | Self::ForSale { vin }
            | Self::Sold { vin }
            | Self::TransferVehicle { vin } => Some(*vin),
            Self::Fee { .. } | Self::Stopped | Self::Resumed | Self::Withdrawn { .. } => None,
        }
    }
}

impl std::fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NewBike { vin }
            | Self::ForSale { vin }
            | Self::Sold { vin }
            | Self::TransferVehicle { vin } => write!(f, "{}({vin})", self.name()),
            Self::Fee { fee } => write!(f, "Fee({fee})"),
            Self::Withdrawn { amount } => write!(f, "Withdrawn({amount})"),
            Self::Stopped | Self::Resumed => write!(f, "{}()", self.name()),
        }
    }
}

/// A committed event with its position in the ledger's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Ledger-wide sequence number, starting at 1.
    pub sequence: u64,
    /// When the event was committed.
    pub timestamp: Timestamp,
    /// The notification.
    pub event: LedgerEvent,
}

/// Fan-out of committed events to live subscribers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    ///
    /// [`crate::LedgerConfig::validate`] bounds `capacity` before a ledger
    /// is built. Out-of-range values are clamped to what
    /// `broadcast::channel` accepts.
    pub(crate) fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.clamp(1, MAX_EVENT_CAPACITY));
        Self { sender }
    }

    /// Subscribe to events committed from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publish without blocking. Having no subscribers is fine.
    pub(crate) fn publish(&self, envelope: EventEnvelope) {
        let _ = self.sender.send(envelope);
    }
}

/// Bounded history of committed events.
#[derive(Debug)]
pub struct Journal {
    entries: VecDeque<EventEnvelope>,
    capacity: usize,
}

impl Journal {
    /// Create a journal retaining at most `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    /// Append an event, trimming the oldest 10% if over capacity.
    pub fn push(&mut self, envelope: EventEnvelope) {
        self.entries.push_back(envelope);
        if self.entries.len() > self.capacity {
            let trim = (self.capacity / 10).max(1);
            self.entries.drain(..trim.min(self.entries.len()));
        }
    }

    /// Events with `sequence > after`, oldest first.
    pub fn since(&self, after: u64) -> Vec<EventEnvelope> {
        // Entries are sorted by sequence.
        let start = self.entries.partition_point(|e| e.sequence <= after);
        self.entries.range(start..).cloned().collect()
    }

    /// Number of retained events.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the journal is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sequence number of the oldest retained event.
    pub fn first_sequence(&self) -> Option<u64> {
        self.entries.front().map(|e| e.sequence)
    }
}
