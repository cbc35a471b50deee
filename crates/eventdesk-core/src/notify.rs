// ── Transient notifications ──
//
// Fire-and-forget messages for the user ("toasts"): load failures,
// booking outcomes, re-authentication prompts. Nobody listening is fine.

use serde::Serialize;
use strum::Display;
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::CoreError;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    LoadFailed,
    Booked,
    BookingFailed,
    Cancelled,
    CancellationFailed,
    NewEvents,
    EventSaved,
    EventDeleted,
    ImageUploaded,
    ReauthRequired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub kind: NotificationKind,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn emit(&self, level: Level, kind: NotificationKind, message: impl Into<String>) {
        let notification = Notification {
            level,
            kind,
            message: message.into(),
        };
        debug!(%kind, message = %notification.message, "notification");
        // No receivers is not an error.
        let _ = self.tx.send(notification);
    }

    pub fn info(&self, kind: NotificationKind, message: impl Into<String>) {
        self.emit(Level::Info, kind, message);
    }

    pub fn success(&self, kind: NotificationKind, message: impl Into<String>) {
        self.emit(Level::Success, kind, message);
    }

    pub fn failure(&self, kind: NotificationKind, err: &CoreError) {
        self.emit(Level::Error, kind, err.to_string());
    }
}
