//! Pure reminder planning.
//!
//! [`plan_reminders`] is the decision core of the scheduler: given the
//! current routine set, a reference instant, and the delivered-reminder
//! ledger view, it returns what to schedule and what to skip. It performs no
//! I/O and registers no timers, so the full decision surface is testable
//! with an injected clock; the runner adapts the returned plan to real
//! delayed actions.

use crate::config::ReminderConfig;
use crate::routine::Routine;
use crate::timetable::next_occurrence;
use chrono::{DateTime, TimeZone};
use std::collections::HashMap;
use std::time::Duration;

/// Scheduling policy knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderPolicy {
    /// How long before an occurrence the reminder fires.
    pub lead_time: Duration,
    /// Maximum look-ahead; anything further out is left for a later sync
    /// cycle, once the occurrence is within range.
    pub horizon: Duration,
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self {
            lead_time: Duration::from_secs(5 * 60),
            horizon: Duration::from_secs(30 * 24 * 3600),
        }
    }
}

impl From<&ReminderConfig> for ReminderPolicy {
    fn from(config: &ReminderConfig) -> Self {
        Self {
            lead_time: Duration::from_secs(config.lead_time_secs),
            horizon: Duration::from_secs(config.horizon_days * 24 * 3600),
        }
    }
}

/// One reminder the runner should register a delayed action for.
#[derive(Debug, Clone)]
pub struct PlannedReminder {
    /// Reminder key (store id, or the draft composite fallback).
    pub key: String,
    /// The routine the reminder is for.
    pub routine: Routine,
    /// Next occurrence start, epoch milliseconds.
    pub occurrence_ms: i64,
    /// Instant the reminder fires, epoch milliseconds.
    pub fire_at_ms: i64,
    /// Delay from the planning instant until `fire_at_ms`.
    pub delay: Duration,
}

/// Why a routine was not scheduled this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The reminder window for this cycle already elapsed; never fire late.
    WindowElapsed,
    /// The ledger shows this occurrence (or a later one) was delivered.
    AlreadyDelivered,
    /// The fire instant is beyond the look-ahead horizon.
    BeyondHorizon,
}

/// Outcome of one planning pass.
#[derive(Debug, Clone, Default)]
pub struct ReminderPlan {
    /// Reminders to register, at most one per key.
    pub schedule: Vec<PlannedReminder>,
    /// Routines skipped this cycle, with the reason.
    pub skipped: Vec<(String, SkipReason)>,
}

/// Decide which routines get a pending reminder relative to `now`.
///
/// `delivered` maps reminder keys to the fire instant (epoch ms) of the
/// most recently delivered reminder; the comparison is monotonic, so a
/// recorded later occurrence also suppresses earlier ones.
///
/// When two routines derive the same key (identical unsaved-draft
/// composites), the later one wins, mirroring a keyed timer map.
#[must_use]
pub fn plan_reminders<Tz: TimeZone>(
    routines: &[Routine],
    now: &DateTime<Tz>,
    delivered: &HashMap<String, i64>,
    policy: &ReminderPolicy,
) -> ReminderPlan {
    let now_ms = now.timestamp_millis();
    let lead_ms = i64::try_from(policy.lead_time.as_millis()).unwrap_or(i64::MAX);
    let horizon_ms = i64::try_from(policy.horizon.as_millis()).unwrap_or(i64::MAX);

    let mut plan = ReminderPlan::default();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for routine in routines {
        let key = routine.reminder_key();
        let occurrence = next_occurrence(routine.day_of_week, &routine.start_time, now);
        let occurrence_ms = occurrence.timestamp_millis();
        let fire_at_ms = occurrence_ms - lead_ms;

        if fire_at_ms <= now_ms {
            plan.skipped.push((key, SkipReason::WindowElapsed));
            continue;
        }
        if delivered.get(&key).is_some_and(|&ts| ts >= fire_at_ms) {
            plan.skipped.push((key, SkipReason::AlreadyDelivered));
            continue;
        }
        if fire_at_ms - now_ms > horizon_ms {
            plan.skipped.push((key, SkipReason::BeyondHorizon));
            continue;
        }

        let delay = Duration::from_millis((fire_at_ms - now_ms).unsigned_abs());
        let planned = PlannedReminder {
            key: key.clone(),
            routine: routine.clone(),
            occurrence_ms,
            fire_at_ms,
            delay,
        };
        match index_by_key.get(&key) {
            Some(&i) => plan.schedule[i] = planned,
            None => {
                index_by_key.insert(key, plan.schedule.len());
                plan.schedule.push(planned);
            }
        }
    }

    plan
}
