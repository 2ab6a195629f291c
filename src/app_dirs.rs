//! Centralized application directory paths for classbell.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution.
//! All paths can be overridden for testing or custom deployments:
//! - `CLASSBELL_DATA_DIR` overrides [`data_dir`]
//! - `CLASSBELL_CONFIG_DIR` overrides [`config_dir`]

use std::path::PathBuf;

/// Application data root directory.
///
/// Used for persistent state: the reminder ledger and logs.
///
/// Resolves to `dirs::data_dir()/classbell/` by default. Override with
/// the `CLASSBELL_DATA_DIR` environment variable.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("CLASSBELL_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("classbell"))
        .unwrap_or_else(|| PathBuf::from("/tmp/classbell-data"))
}

/// Application config directory.
///
/// Used for `config.toml`.
///
/// Resolves to `dirs::config_dir()/classbell/` by default. Override with
/// the `CLASSBELL_CONFIG_DIR` environment variable.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("CLASSBELL_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("classbell"))
        .unwrap_or_else(|| PathBuf::from("/tmp/classbell-config"))
}

/// Default path of the reminder ledger file.
#[must_use]
pub fn ledger_path() -> PathBuf {
    data_dir().join("reminders.jsonl")
}
