//! Reminder scheduling: planning, dedup ledger, and timer management.

pub mod ledger;
pub mod plan;
pub mod runner;

pub use ledger::ReminderLedger;
pub use plan::{PlannedReminder, ReminderPlan, ReminderPolicy, SkipReason};
pub use runner::ReminderScheduler;
