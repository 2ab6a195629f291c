//! Observable events emitted by the core for the embedding UI/host.
//!
//! Intentionally lightweight (no heavy payloads) so every subsystem can emit
//! without blocking. Senders ignore a dropped receiver.

use tokio::sync::mpsc;

/// Events describing what the routine manager is doing "right now".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The routine set was refreshed from the store.
    RoutinesRefreshed {
        /// Number of routines in the new set.
        count: usize,
    },
    /// A store fetch or mutation failed; the previous set is retained.
    SyncFailed { message: String },
    /// An in-app transient message became visible.
    Toast { message: String },
    /// The visible toast expired (or was replaced by a newer one).
    ToastExpired,
    /// A reminder was dispatched for a routine.
    ReminderFired {
        /// Reminder key of the routine.
        key: String,
        course_name: String,
    },
    /// The user clicked a desktop notification; surface the routine detail.
    NotificationClicked { key: String },
    /// The controller shut down.
    Stopped,
}

/// Sending half of the app event stream.
pub type EventSender = mpsc::UnboundedSender<AppEvent>;

/// Receiving half of the app event stream.
pub type EventReceiver = mpsc::UnboundedReceiver<AppEvent>;

/// Create the app event channel.
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
