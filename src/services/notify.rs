//! Admin realtime notifications.
//!
//! Membership and booking writes publish an [`AdminEvent`] on a broadcast
//! channel. Each admin websocket holds its own receiver; a slow receiver
//! lags and skips events rather than blocking publishers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminEventKind {
    Membership,
    Booking,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminEvent {
    pub id: Uuid,
    pub kind: AdminEventKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl AdminEvent {
    #[must_use]
    pub fn new(kind: AdminEventKind, message: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), kind, message: message.into(), at: Utc::now() }
    }

    #[must_use]
    pub fn new_membership() -> Self {
        Self::new(AdminEventKind::Membership, "New member signup")
    }

    #[must_use]
    pub fn new_booking() -> Self {
        Self::new(AdminEventKind::Booking, "New class booking")
    }

    #[must_use]
    pub fn booking_updated() -> Self {
        Self::new(AdminEventKind::Booking, "Booking updated")
    }
}

/// Cloneable handle to the admin event channel.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<AdminEvent>,
}

impl Notifier {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish to every connected admin. No receivers is not an error.
    pub fn publish(&self, event: AdminEvent) {
        tracing::debug!(kind = ?event.kind, receivers = self.tx.receiver_count(), "admin event");
        let _ = self.tx.send(event);
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AdminEvent> {
        self.tx.subscribe()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "notify_test.rs"]
mod tests;
