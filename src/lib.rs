//! classbell: weekly class routine manager with reminder notifications.
//!
//! Routines (weekly-recurring class meetings) live in a remote document
//! store. This crate keeps a local view of the routine set fresh by
//! polling, schedules one reminder timer per upcoming class occurrence,
//! and delivers reminders through the available notification channels.
//!
//! # Architecture
//!
//! Independent pieces wired together by a single controller:
//! - **Store client**: Appwrite-style document CRUD via `reqwest`
//! - **Sync loop**: immediate + fixed-interval polling, watch-channel
//!   publication of the sorted routine set
//! - **Reminder scheduler**: pure occurrence/lead-time planning plus a
//!   cancel-and-rebuild timer map
//! - **Reminder ledger**: durable delivered-reminder records for
//!   cross-restart dedup
//! - **Notification dispatcher**: in-app toast, desktop notification,
//!   and beep channels, each best-effort

pub mod app_dirs;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod notify;
pub mod routine;
pub mod scheduler;
pub mod store;
pub mod sync;
pub mod timetable;

pub use config::AppConfig;
pub use controller::Controller;
pub use error::{ClassbellError, Result};
pub use events::AppEvent;
pub use routine::{Routine, RoutineFields};
