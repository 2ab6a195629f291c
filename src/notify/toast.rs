//! In-app transient messages.

use crate::events::{AppEvent, EventSender};
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Emits transient messages over the app event stream.
///
/// Only one toast is visible at a time: showing a new message replaces a
/// pending one and restarts the expiry countdown. [`AppEvent::ToastExpired`]
/// is emitted when the countdown runs out, not when a message is replaced.
pub struct Toaster {
    events_tx: EventSender,
    duration: Duration,
    expiry: Mutex<Option<JoinHandle<()>>>,
}

impl Toaster {
    /// Create a toaster with the given display duration.
    #[must_use]
    pub fn new(events_tx: EventSender, duration: Duration) -> Self {
        Self {
            events_tx,
            duration,
            expiry: Mutex::new(None),
        }
    }

    /// Show a message, replacing any pending one.
    ///
    /// Must be called from within a tokio runtime (the expiry countdown is
    /// a spawned task).
    pub fn show(&self, message: impl Into<String>) {
        let _ = self.events_tx.send(AppEvent::Toast {
            message: message.into(),
        });

        let tx = self.events_tx.clone();
        let duration = self.duration;
        let countdown = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = tx.send(AppEvent::ToastExpired);
        });

        if let Ok(mut guard) = self.expiry.lock() {
            if let Some(previous) = guard.replace(countdown) {
                previous.abort();
            }
        }
    }
}

impl Drop for Toaster {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.expiry.lock() {
            if let Some(pending) = guard.take() {
                pending.abort();
            }
        }
    }
}
