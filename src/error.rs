//! Error types for the classbell core.

/// Top-level error type for the routine manager.
#[derive(Debug, thiserror::Error)]
pub enum ClassbellError {
    /// Remote document store error (unreachable, bad status, malformed body).
    #[error("store error: {0}")]
    Store(String),

    /// Reminder scheduling error (planning, timer registration).
    #[error("scheduler error: {0}")]
    Scheduler(String),

    /// Reminder ledger error (state persistence).
    #[error("ledger error: {0}")]
    Ledger(String),

    /// Notification delivery error.
    #[error("notify error: {0}")]
    Notify(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Routine draft failed local validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ClassbellError>;
