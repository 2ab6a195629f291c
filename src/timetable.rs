//! Wall-clock time model for weekly recurrence.
//!
//! Time-of-day values travel through the system as 24-hour `HH:MM` strings
//! (the store's representation). This module converts between that form and
//! linear minutes-since-midnight, and computes the next calendar instant a
//! `(day-of-week, time-of-day)` recurrence lands on.
//!
//! None of these functions validate their inputs. A malformed `HH:MM`
//! string is a caller error: it yields garbage minutes, never a panic or an
//! error value.

use chrono::{DateTime, Datelike, Days, NaiveDateTime, TimeZone};

/// Parse `HH:MM` into minutes since midnight (`hour * 60 + minute`).
///
/// Unparseable components count as zero; the caller owns input hygiene.
#[must_use]
pub fn time_to_minutes(hhmm: &str) -> u32 {
    let (h, m) = hhmm.split_once(':').unwrap_or((hhmm, ""));
    let hour: u32 = h.trim().parse().unwrap_or(0);
    let minute: u32 = m.trim().parse().unwrap_or(0);
    hour * 60 + minute
}

/// Format minutes since midnight as zero-padded `HH:MM`.
///
/// The caller must pass a value in `[0, 1439]`; no modulo is applied.
#[must_use]
pub fn minutes_to_time(min: u32) -> String {
    format!("{:02}:{:02}", min / 60, min % 60)
}

/// Next instant at or after `now` where the given weekday (0 = Sunday) and
/// `HH:MM` time-of-day occur in `now`'s calendar.
///
/// The same-day case is strictly next-future: when the anchor for today
/// is at or before `now` (including `now` landing exactly on the target
/// minute), the occurrence rolls to next week.
#[must_use]
pub fn next_occurrence<Tz: TimeZone>(
    day_of_week: u8,
    hhmm: &str,
    now: &DateTime<Tz>,
) -> DateTime<Tz> {
    let minutes = time_to_minutes(hhmm);
    let (hour, minute) = ((minutes / 60).min(23), (minutes % 60).min(59));

    let anchor_naive = now
        .date_naive()
        .and_hms_opt(hour, minute, 0)
        .unwrap_or_else(|| now.naive_local());

    let today = now.weekday().num_days_from_sunday();
    let diff_days = u64::from((u32::from(day_of_week) + 7 - today) % 7);

    let anchor = resolve_local(&now.timezone(), anchor_naive);
    let advance_days = if diff_days == 0 {
        if anchor <= *now { 7 } else { 0 }
    } else {
        diff_days
    };

    let target_naive = anchor_naive
        .checked_add_days(Days::new(advance_days))
        .unwrap_or(anchor_naive);
    resolve_local(&now.timezone(), target_naive)
}

/// Map a naive local datetime into `Tz`, preferring the earlier instant on
/// ambiguity and stepping forward out of a nonexistent DST gap.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    let mut candidate = naive;
    for _ in 0..8 {
        if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
            return dt;
        }
        candidate += chrono::Duration::minutes(30);
    }
    tz.from_utc_datetime(&naive)
}
