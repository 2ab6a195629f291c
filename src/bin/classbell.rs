//! Headless routine-manager host.
//!
//! Loads the config file, starts the controller, logs app events, and
//! shuts down cleanly on ctrl-c.

use classbell::events::{self, AppEvent};
use classbell::{AppConfig, Controller};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = AppConfig::default_config_path();
    let config = if config_path.exists() {
        AppConfig::from_file(&config_path)
            .map_err(|e| anyhow::anyhow!("cannot load {}: {e}", config_path.display()))?
    } else {
        tracing::info!(
            "no config at {}, using defaults",
            config_path.display()
        );
        AppConfig::default()
    };

    let (events_tx, mut events_rx) = events::channel();
    let controller = Controller::start(&config, events_tx);
    tracing::info!("classbell started");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
            event = events_rx.recv() => {
                let Some(event) = event else { break };
                log_event(&event);
            }
        }
    }

    controller.stop().await;
    tracing::info!("classbell shut down cleanly");
    Ok(())
}

fn log_event(event: &AppEvent) {
    match event {
        AppEvent::RoutinesRefreshed { count } => {
            tracing::debug!("routine set refreshed ({count} routines)");
        }
        AppEvent::SyncFailed { message } => tracing::warn!("sync failed: {message}"),
        AppEvent::Toast { message } => tracing::info!("{message}"),
        AppEvent::ToastExpired => {}
        AppEvent::ReminderFired { course_name, .. } => {
            tracing::info!("reminder fired for {course_name}");
        }
        AppEvent::NotificationClicked { key } => {
            tracing::info!("notification clicked for {key}");
        }
        AppEvent::Stopped => {}
    }
}
