use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted after a unit of work commits. Events never gate a
/// transaction: a failed send is logged and the request still succeeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    InvoiceCreated {
        invoice_id: Uuid,
        branch_id: Uuid,
        final_amount: Decimal,
    },
    StockDeducted {
        branch_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        remaining: i32,
    },
    AppointmentBooked {
        appointment_id: Uuid,
        doctor_id: Option<Uuid>,
        scheduled_at: DateTime<Utc>,
    },
    AppointmentRescheduled {
        appointment_id: Uuid,
        scheduled_at: DateTime<Utc>,
    },
    AppointmentCancelled(Uuid),
    CustomerCreated(Uuid),
    PetRegistered(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Send an event that must not fail the surrounding request. Used after
    /// commit, where the write already happened.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event.clone()).await {
            warn!(?event, error = %e, "Dropping domain event");
        }
    }
}

/// Background drain for the event channel. Runs until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    while let Some(event) = rx.recv().await {
        match &event {
            Event::InvoiceCreated {
                invoice_id,
                branch_id,
                final_amount,
            } => {
                info!(%invoice_id, %branch_id, %final_amount, "invoice created");
            }
            Event::StockDeducted {
                branch_id,
                product_id,
                quantity,
                remaining,
            } => {
                info!(%branch_id, %product_id, quantity, remaining, "stock deducted");
            }
            Event::AppointmentBooked {
                appointment_id,
                doctor_id,
                scheduled_at,
            } => {
                info!(%appointment_id, ?doctor_id, %scheduled_at, "appointment booked");
            }
            Event::AppointmentRescheduled {
                appointment_id,
                scheduled_at,
            } => {
                info!(%appointment_id, %scheduled_at, "appointment rescheduled");
            }
            Event::AppointmentCancelled(id) => info!(appointment_id = %id, "appointment cancelled"),
            Event::CustomerCreated(id) => info!(customer_id = %id, "customer created"),
            Event::PetRegistered(id) => info!(pet_id = %id, "pet registered"),
        }
    }
    info!("Event channel closed; event processor exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        let id = Uuid::new_v4();
        sender.send(Event::CustomerCreated(id)).await.unwrap();

        match rx.recv().await {
            Some(Event::CustomerCreated(got)) => assert_eq!(got, id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_fails_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        let result = sender.send(Event::PetRegistered(Uuid::new_v4())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn send_or_log_swallows_channel_errors() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        // Must not panic or return an error
        sender
            .send_or_log(Event::AppointmentCancelled(Uuid::new_v4()))
            .await;
    }
}
