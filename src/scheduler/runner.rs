//! Reminder timer management.
//!
//! [`ReminderScheduler`] adapts a [`ReminderPlan`] to real delayed actions:
//! one tokio sleep task per planned reminder, which sends the planned
//! reminder back over a channel at fire time. The owner handles the firing
//! (dispatch, ledger write) and calls [`ReminderScheduler::complete`].
//!
//! Rescheduling is a full rebuild: every pending timer is cancelled and the
//! set is reconstructed from the current routine set. With an unchanged
//! routine set, clock, and ledger this is idempotent, since dedup records
//! are written only at dispatch time.

use crate::routine::Routine;
use crate::scheduler::ledger::ReminderLedger;
use crate::scheduler::plan::{PlannedReminder, ReminderPolicy, SkipReason, plan_reminders};
use chrono::{DateTime, TimeZone};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

struct PendingTimer {
    fire_at_ms: i64,
    handle: JoinHandle<()>,
}

/// Owns the per-routine reminder timers.
///
/// Invariant: at most one pending timer per reminder key.
pub struct ReminderScheduler {
    policy: ReminderPolicy,
    timers: HashMap<String, PendingTimer>,
    fired_tx: mpsc::UnboundedSender<PlannedReminder>,
}

impl ReminderScheduler {
    /// Create a scheduler that reports firings over `fired_tx`.
    #[must_use]
    pub fn new(policy: ReminderPolicy, fired_tx: mpsc::UnboundedSender<PlannedReminder>) -> Self {
        Self {
            policy,
            timers: HashMap::new(),
            fired_tx,
        }
    }

    /// Rebuild the pending timer set for the given routine set.
    ///
    /// Cancels every pending timer first (no incremental diffing), then
    /// registers one delayed action per plannable routine. Must be called
    /// on every routine-set change so deleted or edited routines lose
    /// their stale timers.
    pub fn reschedule_all<Tz: TimeZone>(
        &mut self,
        routines: &[Routine],
        now: &DateTime<Tz>,
        ledger: &ReminderLedger,
    ) {
        self.cancel_all();

        let plan = plan_reminders(routines, now, ledger.records(), &self.policy);
        for (key, reason) in &plan.skipped {
            match reason {
                SkipReason::WindowElapsed => debug!("reminder window elapsed for {key}"),
                SkipReason::AlreadyDelivered => debug!("reminder already delivered for {key}"),
                SkipReason::BeyondHorizon => debug!("reminder beyond horizon for {key}"),
            }
        }

        for planned in plan.schedule {
            let key = planned.key.clone();
            let fire_at_ms = planned.fire_at_ms;
            let delay = planned.delay;
            let tx = self.fired_tx.clone();
            let handle = tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(planned);
            });
            self.timers.insert(key, PendingTimer { fire_at_ms, handle });
        }

        debug!("rescheduled {} reminder timer(s)", self.timers.len());
    }

    /// Remove the timer entry for a reminder whose firing was handled.
    pub fn complete(&mut self, key: &str) {
        self.timers.remove(key);
    }

    /// Cancel and discard every pending timer.
    pub fn cancel_all(&mut self) {
        for (_, timer) in self.timers.drain() {
            timer.handle.abort();
        }
    }

    /// Pending fire instants by key, for introspection and tests.
    #[must_use]
    pub fn pending(&self) -> BTreeMap<String, i64> {
        self.timers
            .iter()
            .map(|(key, timer)| (key.clone(), timer.fire_at_ms))
            .collect()
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Whether no timers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use chrono::Utc;

    // 2024-01-01 is a Monday.
    fn monday_at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, minute, 0).unwrap()
    }

    fn routine(id: &str, day: u8, start: &str) -> Routine {
        Routine {
            id: Some(id.to_owned()),
            course_name: format!("Course {id}"),
            course_code: format!("C-{id}"),
            teacher_name: "T".to_owned(),
            teacher_avatar: None,
            day_of_week: day,
            start_time: start.to_owned(),
            end_time: "23:59".to_owned(),
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn reschedule_is_idempotent() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut scheduler = ReminderScheduler::new(ReminderPolicy::default(), tx);
        let routines = vec![routine("a", 1, "09:00"), routine("b", 3, "14:00")];
        let now = monday_at(8, 0);
        let ledger = ReminderLedger::in_memory();

        scheduler.reschedule_all(&routines, &now, &ledger);
        let first = scheduler.pending();
        scheduler.reschedule_all(&routines, &now, &ledger);
        let second = scheduler.pending();

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[tokio::test]
    async fn removed_routine_loses_its_timer() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut scheduler = ReminderScheduler::new(ReminderPolicy::default(), tx);
        let now = monday_at(8, 0);
        let ledger = ReminderLedger::in_memory();

        scheduler.reschedule_all(&[routine("a", 1, "09:00"), routine("b", 1, "10:00")], &now, &ledger);
        assert_eq!(scheduler.len(), 2);

        scheduler.reschedule_all(&[routine("b", 1, "10:00")], &now, &ledger);
        let pending = scheduler.pending();
        assert_eq!(pending.len(), 1);
        assert!(pending.contains_key("b"));
    }

    #[tokio::test]
    async fn delivered_key_is_skipped_on_reschedule() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut scheduler = ReminderScheduler::new(ReminderPolicy::default(), tx);
        let now = monday_at(8, 50);
        let mut ledger = ReminderLedger::in_memory();
        ledger
            .set("a", monday_at(8, 55).timestamp_millis())
            .expect("set");

        scheduler.reschedule_all(&[routine("a", 1, "09:00")], &now, &ledger);
        assert!(scheduler.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_fires_and_reports_the_planned_reminder() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = ReminderScheduler::new(ReminderPolicy::default(), tx);
        let now = monday_at(8, 50);
        let ledger = ReminderLedger::in_memory();

        scheduler.reschedule_all(&[routine("a", 1, "09:00")], &now, &ledger);
        assert_eq!(scheduler.len(), 1);

        tokio::time::advance(std::time::Duration::from_secs(5 * 60 + 1)).await;
        let fired = rx.recv().await.expect("fired");
        assert_eq!(fired.key, "a");
        assert_eq!(fired.fire_at_ms, monday_at(8, 55).timestamp_millis());

        scheduler.complete(&fired.key);
        assert!(scheduler.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_suppresses_pending_firings() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = ReminderScheduler::new(ReminderPolicy::default(), tx);
        let now = monday_at(8, 50);
        let ledger = ReminderLedger::in_memory();

        scheduler.reschedule_all(&[routine("a", 1, "09:00")], &now, &ledger);
        scheduler.cancel_all();
        assert!(scheduler.is_empty());

        tokio::time::advance(std::time::Duration::from_secs(10 * 60)).await;
        assert!(rx.try_recv().is_err());
    }
}
