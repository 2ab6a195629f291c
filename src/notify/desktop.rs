//! Desktop notification capability port.
//!
//! Native notification support varies by host environment, so the
//! dispatcher talks to a [`DesktopNotifier`] trait object created by
//! [`create_notifier`]. Platforms without an implementation get a no-op
//! stub that reports the capability as denied; the dispatcher silently
//! skips the channel.

use crate::events::EventSender;

/// User-facing permission decision for desktop notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    /// No decision yet; a permission request is appropriate.
    Default,
    /// The user granted notifications.
    Granted,
    /// The user denied notifications (or the capability is absent).
    Denied,
}

impl std::fmt::Display for PermissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Granted => write!(f, "granted"),
            Self::Denied => write!(f, "denied"),
        }
    }
}

/// Content of one desktop notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopNote {
    /// Notification title (the course name).
    pub title: String,
    /// Body line (teacher and time range).
    pub body: String,
    /// Optional icon URL (the teacher avatar).
    pub icon_url: Option<String>,
    /// Stable dedup tag so re-delivery attempts for the same occurrence
    /// coalesce at the OS level.
    pub tag: String,
}

/// Native notification capability.
///
/// Implementations must be click-aware: when the user activates a shown
/// notification, emit [`crate::events::AppEvent::NotificationClicked`] with
/// the note's tag so the host can surface the routine detail view.
pub trait DesktopNotifier: Send + Sync {
    /// Current permission decision.
    fn permission_state(&self) -> PermissionState;

    /// Ask the user for permission. Only called when the state is still
    /// [`PermissionState::Default`]; returns the resulting decision.
    fn request_permission(&self) -> PermissionState;

    /// Show a notification.
    fn show(&self, note: &DesktopNote) -> anyhow::Result<()>;
}

/// Create the platform-appropriate desktop notifier.
///
/// `events_tx` lets click-aware implementations report activations; the
/// stub ignores it.
#[must_use]
pub fn create_notifier(_events_tx: EventSender) -> Box<dyn DesktopNotifier> {
    Box::new(StubDesktopNotifier)
}

/// No-op notifier for hosts without native notification support.
pub struct StubDesktopNotifier;

impl DesktopNotifier for StubDesktopNotifier {
    fn permission_state(&self) -> PermissionState {
        PermissionState::Denied
    }

    fn request_permission(&self) -> PermissionState {
        PermissionState::Denied
    }

    fn show(&self, _note: &DesktopNote) -> anyhow::Result<()> {
        anyhow::bail!("desktop notifications are not supported on this platform")
    }
}
