//! Configuration types for the routine manager.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote document store settings.
    pub store: StoreConfig,
    /// Routine-set polling settings.
    pub sync: SyncConfig,
    /// Reminder scheduling settings.
    pub reminders: ReminderConfig,
    /// Notification delivery settings.
    pub notify: NotifyConfig,
}

/// Remote document store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store API endpoint, e.g. `https://cloud.appwrite.io/v1`.
    pub endpoint: String,
    /// Project identifier sent with every request.
    pub project_id: String,
    /// API key for server-side access (None = unauthenticated).
    pub api_key: Option<String>,
    /// Database containing the routine collection.
    pub database_id: String,
    /// Collection holding routine documents.
    pub collection_id: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://cloud.appwrite.io/v1".to_owned(),
            project_id: String::new(),
            api_key: None,
            database_id: String::new(),
            collection_id: "routines".to_owned(),
        }
    }
}

/// Routine-set polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Seconds between routine fetches.
    pub poll_interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 20,
        }
    }
}

impl SyncConfig {
    /// Poll interval as a [`Duration`].
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

/// Reminder scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// Seconds before a class occurrence at which the reminder fires.
    pub lead_time_secs: u64,
    /// Maximum look-ahead in days; occurrences further out are left for a
    /// later sync cycle to schedule.
    pub horizon_days: u64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            lead_time_secs: 5 * 60,
            horizon_days: 30,
        }
    }
}

/// Notification delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Milliseconds an in-app toast stays visible.
    pub toast_duration_ms: u64,
    /// Whether to attempt desktop notifications.
    pub desktop: bool,
    /// Reminder beep settings.
    pub beep: BeepConfig,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            toast_duration_ms: 3_500,
            desktop: true,
            beep: BeepConfig::default(),
        }
    }
}

impl NotifyConfig {
    /// Toast display duration as a [`Duration`].
    #[must_use]
    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}

/// Reminder beep tone settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeepConfig {
    /// Whether the beep channel is enabled.
    pub enabled: bool,
    /// Tone frequency in Hz.
    pub frequency_hz: f32,
    /// Tone length in milliseconds.
    pub duration_ms: u64,
    /// Linear output gain in \[0, 1\]. Kept low: the beep is a nudge, not an
    /// alarm.
    pub gain: f32,
}

impl Default for BeepConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frequency_hz: 880.0,
            duration_ms: 250,
            gain: 0.02,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::ClassbellError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ClassbellError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        crate::app_dirs::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.sync.poll_interval_secs, 20);
        assert_eq!(config.reminders.lead_time_secs, 300);
        assert_eq!(config.reminders.horizon_days, 30);
        assert_eq!(config.notify.toast_duration_ms, 3_500);
        assert!(config.notify.beep.enabled);
        assert!(config.notify.beep.gain <= 1.0);
        assert!(!config.store.endpoint.is_empty());
    }

    #[test]
    fn poll_interval_never_zero() {
        let sync = SyncConfig {
            poll_interval_secs: 0,
        };
        assert_eq!(sync.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.store.project_id = "proj".to_owned();
        config.store.database_id = "db".to_owned();
        config.reminders.lead_time_secs = 120;
        config.save_to_file(&path).expect("save");

        let restored = AppConfig::from_file(&path).expect("load");
        assert_eq!(restored.store.project_id, "proj");
        assert_eq!(restored.store.database_id, "db");
        assert_eq!(restored.reminders.lead_time_secs, 120);
        assert_eq!(restored.sync.poll_interval_secs, 20);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let partial = "[store]\nproject_id = \"p\"\n";
        let config: AppConfig = toml::from_str(partial).expect("parse");
        assert_eq!(config.store.project_id, "p");
        assert_eq!(config.sync.poll_interval_secs, 20);
        assert_eq!(config.notify.beep.frequency_hz, 880.0);
    }
}
