//! Notification delivery: in-app toasts, desktop notifications, beep.
//!
//! Delivery is best-effort per channel. [`NotificationDispatcher::dispatch`]
//! never returns an error: a missing capability or a failed channel attempt
//! degrades that channel only.

pub mod beep;
pub mod desktop;
pub mod toast;

pub use desktop::{DesktopNote, DesktopNotifier, PermissionState, StubDesktopNotifier};
pub use toast::Toaster;

use crate::config::{BeepConfig, NotifyConfig};
use crate::events::EventSender;
use crate::routine::Routine;
use tracing::{debug, info};

/// Fans one reminder out to every available notification channel.
pub struct NotificationDispatcher {
    toaster: Toaster,
    desktop: Option<Box<dyn DesktopNotifier>>,
    beep: BeepConfig,
}

impl NotificationDispatcher {
    /// Build a dispatcher from config, using the platform desktop notifier.
    #[must_use]
    pub fn new(config: &NotifyConfig, events_tx: EventSender) -> Self {
        let desktop = config
            .desktop
            .then(|| desktop::create_notifier(events_tx.clone()));
        Self {
            toaster: Toaster::new(events_tx, config.toast_duration()),
            desktop,
            beep: config.beep.clone(),
        }
    }

    /// Replace the desktop notifier (used by hosts with their own
    /// notification surface, and by tests).
    #[must_use]
    pub fn with_desktop_notifier(mut self, notifier: Box<dyn DesktopNotifier>) -> Self {
        self.desktop = Some(notifier);
        self
    }

    /// Request desktop notification permission when no decision exists yet.
    ///
    /// Called once at startup. A previously granted or denied decision is
    /// never re-prompted.
    pub fn request_permission_once(&self) {
        let Some(desktop) = &self.desktop else {
            return;
        };
        if desktop.permission_state() == PermissionState::Default {
            let decision = desktop.request_permission();
            info!("desktop notification permission: {decision}");
        }
    }

    /// Show a transient in-app message.
    pub fn toast(&self, message: impl Into<String>) {
        self.toaster.show(message);
    }

    /// Deliver a reminder for a routine through every available channel.
    ///
    /// The toast always goes out; the desktop notification requires the
    /// capability and a granted permission; the beep is fire-and-forget.
    pub fn dispatch(&self, routine: &Routine) {
        self.toaster.show(format!(
            "Class starting soon: {} ({})",
            routine.course_name, routine.start_time
        ));

        if let Some(desktop) = &self.desktop {
            if desktop.permission_state() == PermissionState::Granted {
                let note = DesktopNote {
                    title: routine.course_name.clone(),
                    body: format!(
                        "{} \u{2022} {} - {}",
                        routine.teacher_name, routine.start_time, routine.end_time
                    ),
                    icon_url: routine.teacher_avatar.clone(),
                    tag: routine.reminder_key(),
                };
                if let Err(e) = desktop.show(&note) {
                    debug!("desktop notification failed: {e}");
                }
            }
        }

        beep::play_beep(&self.beep);
    }
}
