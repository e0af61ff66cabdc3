//! In-process domain events.
//!
//! Services publish lifecycle events through an [`EventSender`]; a background
//! task started from `main` drains the channel and logs them. There is no
//! broker behind this: the channel exists so interested code has one seam to
//! observe mutations without the services knowing who listens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events emitted by the services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Client events
    ClientCreated(Uuid),
    ClientUpdated(Uuid),
    ClientArchived(Uuid),
    ClientDeleted(Uuid),

    // Bid events
    BidCreated(Uuid),
    BidUpdated(Uuid),
    BidAssigned {
        bid_id: Uuid,
        assignee_id: Uuid,
    },
    BidStatusChanged {
        bid_id: Uuid,
        old_status: String,
        new_status: String,
        at: DateTime<Utc>,
    },
    BidClosed(Uuid),
    BidDeleted(Uuid),

    // Equipment events
    EquipmentItemReceived {
        item_id: Uuid,
        warehouse_id: Uuid,
    },
    EquipmentItemAssigned {
        item_id: Uuid,
        client_id: Uuid,
        bid_id: Option<Uuid>,
    },
    EquipmentItemInstalled(Uuid),
    EquipmentItemReleased {
        item_id: Uuid,
        warehouse_id: Uuid,
    },
    EquipmentItemWrittenOff(Uuid),

    // Workflow events
    BidTypeCreated(Uuid),
    BidTypeWorkflowChanged(Uuid),

    // Token events
    ApiTokenCreated(Uuid),
    ApiTokenRevoked(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event; a full or closed channel is logged, not fatal.
    pub async fn send(&self, event: Event) {
        if let Err(e) = self.sender.send(event).await {
            warn!("Dropping domain event, channel closed: {}", e);
        }
    }
}

/// Create a connected sender/receiver pair.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Drains the event channel, logging every event. Runs until all senders drop.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::BidStatusChanged {
                bid_id,
                old_status,
                new_status,
                ..
            } => {
                info!(
                    bid_id = %bid_id,
                    from = %old_status,
                    to = %new_status,
                    "bid status changed"
                );
            }
            Event::EquipmentItemAssigned {
                item_id,
                client_id,
                bid_id,
            } => {
                info!(
                    item_id = %item_id,
                    client_id = %client_id,
                    bid_id = ?bid_id,
                    "equipment item assigned"
                );
            }
            other => info!("domain event: {:?}", other),
        }
    }

    info!("Event processing loop stopped");
}
