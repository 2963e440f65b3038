use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::entities::document::DocumentStatus;

/// Domain events emitted after a mutation commits.
///
/// Events never fire inside a transaction; a rolled-back operation emits
/// nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Document events
    DocumentCreated {
        document_id: Uuid,
        account_id: Uuid,
    },
    DocumentDeleted {
        document_id: Uuid,
        account_id: Uuid,
    },
    DocumentSettled {
        document_id: Uuid,
        settled_at: DateTime<Utc>,
    },

    // Credit events
    CreditIssued {
        credit_id: Uuid,
        amount: Decimal,
    },
    CreditConsumed {
        credit_id: Uuid,
        amount: Decimal,
        remaining: Decimal,
    },
    CreditExpired(Uuid),
    CreditCancelled(Uuid),

    // Payment events
    PaymentCreated {
        payment_id: Uuid,
        amount: Decimal,
        allocated: Decimal,
        credit_applied: Decimal,
    },
    PaymentVoided(Uuid),

    // Fulfillment events
    PurchaseOrderReceived {
        document_id: Uuid,
        receipt_id: Uuid,
        accepted_quantity: Decimal,
    },
    PurchaseOrderStatusChanged {
        document_id: Uuid,
        old_status: DocumentStatus,
        new_status: DocumentStatus,
    },

    // Inventory events
    InventoryAdjusted {
        item_id: Uuid,
        quantity_before: Decimal,
        quantity_after: Decimal,
    },
}

/// Cloneable handle for emitting events into the processing channel.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, surfacing channel failures to the caller.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event and logs instead of failing when the channel is closed.
    /// Event delivery is best-effort; the committed mutation stands either way.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.sender.send(event).await {
            error!(error = %e, "failed to publish domain event");
        }
    }
}

/// Creates a bounded event channel pair.
pub fn event_channel(buffer: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(buffer);
    (EventSender::new(tx), rx)
}

/// Drains the event channel, logging each event. Callers that need delivery
/// to external systems replace this loop with their own consumer.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("event processor started");
    while let Some(event) = receiver.recv().await {
        debug!(?event, "domain event");
    }
    info!("event processor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (sender, mut rx) = event_channel(8);
        sender
            .send(Event::CreditExpired(Uuid::new_v4()))
            .await
            .unwrap();
        assert!(matches!(rx.recv().await, Some(Event::CreditExpired(_))));
    }

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (sender, rx) = event_channel(1);
        drop(rx);
        // Must not panic or error out.
        sender
            .send_or_log(Event::PaymentVoided(Uuid::new_v4()))
            .await;
    }

    #[tokio::test]
    async fn events_round_trip_through_serde() {
        let event = Event::CreditConsumed {
            credit_id: Uuid::new_v4(),
            amount: dec!(250.00),
            remaining: dec!(750.00),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, Event::CreditConsumed { .. }));
    }
}
