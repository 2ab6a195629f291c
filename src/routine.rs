//! Routine domain types and pure helpers over the routine set.
//!
//! A routine is one weekly-recurring class meeting: a day of week, a start
//! and end time, and course/teacher metadata. The remote store owns routine
//! documents; this module owns the in-memory representation plus the small
//! derived views the rest of the system needs (sort order, search filter,
//! per-day grouping, reminder keys).

use crate::error::{ClassbellError, Result};
use crate::timetable::time_to_minutes;
use serde::{Deserialize, Serialize};

/// Short display names for days of the week, Sunday first.
pub const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// A weekly-recurring class meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    /// Store-assigned identifier. `None` only for unsaved drafts.
    pub id: Option<String>,
    pub course_name: String,
    pub course_code: String,
    pub teacher_name: String,
    /// Avatar URL, used as the notification icon when set.
    #[serde(default)]
    pub teacher_avatar: Option<String>,
    /// Day of week, 0 = Sunday through 6 = Saturday.
    pub day_of_week: u8,
    /// Start time of day, 24-hour `HH:MM`.
    pub start_time: String,
    /// End time of day, 24-hour `HH:MM`. Informational to the scheduler.
    pub end_time: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Routine {
    /// Stable key used for reminder timers and the dedup ledger.
    ///
    /// Falls back to a `code|day|start` composite when the routine has no
    /// store identifier yet. Distinct unsaved drafts sharing all three
    /// components collide; reminders are only scheduled for synced routines
    /// (which always carry ids), so the composite is a stability fallback,
    /// not a uniqueness guarantee.
    #[must_use]
    pub fn reminder_key(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!(
                "{}|{}|{}",
                self.course_code, self.day_of_week, self.start_time
            ),
        }
    }

    /// Start time in minutes since midnight.
    #[must_use]
    pub fn start_minutes(&self) -> u32 {
        time_to_minutes(&self.start_time)
    }

    /// Human-readable day name, or `"?"` for an out-of-range day.
    #[must_use]
    pub fn day_name(&self) -> &'static str {
        DAY_NAMES.get(self.day_of_week as usize).copied().unwrap_or("?")
    }
}

/// Mutable routine fields, as submitted to the store on create/update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineFields {
    pub course_name: String,
    pub course_code: String,
    pub teacher_name: String,
    #[serde(default)]
    pub teacher_avatar: Option<String>,
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
}

impl RoutineFields {
    /// Check required fields before a submit.
    ///
    /// Course name, course code, and teacher name must be non-empty; a
    /// failure here blocks the operation locally and never reaches the
    /// store.
    ///
    /// # Errors
    ///
    /// Returns [`ClassbellError::Validation`] naming the first missing field.
    pub fn validate(&self) -> Result<()> {
        if self.course_name.trim().is_empty() {
            return Err(ClassbellError::Validation(
                "course name is required".to_owned(),
            ));
        }
        if self.course_code.trim().is_empty() {
            return Err(ClassbellError::Validation(
                "course code is required".to_owned(),
            ));
        }
        if self.teacher_name.trim().is_empty() {
            return Err(ClassbellError::Validation(
                "teacher name is required".to_owned(),
            ));
        }
        Ok(())
    }
}

impl From<&Routine> for RoutineFields {
    fn from(routine: &Routine) -> Self {
        Self {
            course_name: routine.course_name.clone(),
            course_code: routine.course_code.clone(),
            teacher_name: routine.teacher_name.clone(),
            teacher_avatar: routine.teacher_avatar.clone(),
            day_of_week: routine.day_of_week,
            start_time: routine.start_time.clone(),
            end_time: routine.end_time.clone(),
        }
    }
}

/// Sort routines ascending by `(day_of_week, start-minutes)`.
pub fn sort_by_schedule(routines: &mut [Routine]) {
    routines.sort_by_key(|r| (r.day_of_week, r.start_minutes()));
}

/// Case-insensitive substring filter over course name, course code, and
/// teacher name. An empty or whitespace query matches everything.
#[must_use]
pub fn filter_routines<'a>(routines: &'a [Routine], query: &str) -> Vec<&'a Routine> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return routines.iter().collect();
    }
    routines
        .iter()
        .filter(|r| {
            r.course_name.to_lowercase().contains(&q)
                || r.course_code.to_lowercase().contains(&q)
                || r.teacher_name.to_lowercase().contains(&q)
        })
        .collect()
}

/// Group routines into seven per-day buckets (Sunday first), each sorted by
/// start time. Routines with an out-of-range day are dropped.
#[must_use]
pub fn group_by_day(routines: &[Routine]) -> [Vec<Routine>; 7] {
    let mut days: [Vec<Routine>; 7] = Default::default();
    for routine in routines {
        if let Some(bucket) = days.get_mut(routine.day_of_week as usize) {
            bucket.push(routine.clone());
        }
    }
    for bucket in &mut days {
        bucket.sort_by_key(Routine::start_minutes);
    }
    days
}
