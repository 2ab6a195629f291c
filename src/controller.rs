//! Application controller: one owner for all scheduling state.
//!
//! The controller wires the store client, sync loop, reminder scheduler,
//! dedup ledger, and notification dispatcher together, and runs a single
//! event loop that owns the mutable pieces. Every routine-set publication
//! triggers a full reschedule in the same loop turn, so the scheduler
//! always sees the freshest set; reminder firings are handled in order:
//! dispatch, ledger write, timer-entry removal.
//!
//! Lifecycle is deterministic: [`Controller::start`] builds and launches
//! everything, [`Controller::stop`] tears down the sync loop and every
//! pending timer.

use crate::config::AppConfig;
use crate::error::Result;
use crate::events::{AppEvent, EventSender};
use crate::notify::NotificationDispatcher;
use crate::routine::{Routine, RoutineFields, filter_routines, group_by_day};
use crate::scheduler::{PlannedReminder, ReminderLedger, ReminderPolicy, ReminderScheduler};
use crate::store::{DocumentStore, StoreClient};
use crate::sync::{self, SyncHandle};
use chrono::Local;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Running routine-manager instance.
pub struct Controller {
    store: Arc<dyn DocumentStore>,
    dispatcher: Arc<NotificationDispatcher>,
    sync: SyncHandle,
    routines_rx: watch::Receiver<Vec<Routine>>,
    loop_handle: JoinHandle<()>,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl Controller {
    /// Start against the configured remote store and the default ledger
    /// location.
    #[must_use]
    pub fn start(config: &AppConfig, events_tx: EventSender) -> Self {
        let store: Arc<dyn DocumentStore> = Arc::new(StoreClient::new(&config.store));
        let ledger = ReminderLedger::open(crate::app_dirs::ledger_path());
        Self::start_with(config, events_tx, store, ledger)
    }

    /// Start with an explicit store and ledger.
    ///
    /// Seam for embedders and tests that substitute the collaborators.
    #[must_use]
    pub fn start_with(
        config: &AppConfig,
        events_tx: EventSender,
        store: Arc<dyn DocumentStore>,
        ledger: ReminderLedger,
    ) -> Self {
        let dispatcher = Arc::new(NotificationDispatcher::new(&config.notify, events_tx.clone()));
        dispatcher.request_permission_once();

        let (routines_tx, routines_rx) = watch::channel(Vec::new());
        // Clone before the sync loop can publish, so the event loop
        // observes the startup fetch.
        let loop_routines_rx = routines_rx.clone();
        let sync = sync::spawn(
            Arc::clone(&store),
            config.sync.poll_interval(),
            routines_tx,
            Arc::clone(&dispatcher),
            events_tx.clone(),
        );

        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        let scheduler = ReminderScheduler::new(ReminderPolicy::from(&config.reminders), fired_tx);

        let (stop_tx, stop_rx) = oneshot::channel();
        let loop_handle = tokio::spawn(run_loop(
            loop_routines_rx,
            fired_rx,
            scheduler,
            ledger,
            Arc::clone(&dispatcher),
            events_tx,
            stop_rx,
        ));

        Self {
            store,
            dispatcher,
            sync,
            routines_rx,
            loop_handle,
            stop_tx: Some(stop_tx),
        }
    }

    /// Current routine set, sorted by `(day, start-minutes)`.
    #[must_use]
    pub fn routines(&self) -> Vec<Routine> {
        self.routines_rx.borrow().clone()
    }

    /// Routines matching a search query (course name, code, or teacher).
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<Routine> {
        let set = self.routines_rx.borrow();
        filter_routines(&set, query).into_iter().cloned().collect()
    }

    /// Current set grouped into seven per-day buckets, Sunday first.
    #[must_use]
    pub fn overview(&self) -> [Vec<Routine>; 7] {
        group_by_day(&self.routines_rx.borrow())
    }

    /// Validate and create a routine, then refresh the set.
    ///
    /// # Errors
    ///
    /// Returns a validation error without touching the store when required
    /// fields are missing, or the store error when the create fails. Either
    /// way the failure was already surfaced as a toast.
    pub async fn create_routine(&self, fields: RoutineFields) -> Result<Routine> {
        if let Err(e) = fields.validate() {
            self.dispatcher.toast("Please fill required fields");
            return Err(e);
        }
        match self.store.create(&fields).await {
            Ok(routine) => {
                self.dispatcher.toast("Routine created");
                self.sync.request_refresh();
                Ok(routine)
            }
            Err(e) => {
                warn!("create failed: {e}");
                self.dispatcher.toast("Failed to create routine");
                Err(e)
            }
        }
    }

    /// Validate and update a routine, then refresh the set.
    ///
    /// # Errors
    ///
    /// Same contract as [`Controller::create_routine`].
    pub async fn update_routine(&self, id: &str, fields: RoutineFields) -> Result<Routine> {
        if let Err(e) = fields.validate() {
            self.dispatcher.toast("Please fill required fields");
            return Err(e);
        }
        match self.store.update(id, &fields).await {
            Ok(routine) => {
                self.dispatcher.toast("Routine updated");
                self.sync.request_refresh();
                Ok(routine)
            }
            Err(e) => {
                warn!("update failed: {e}");
                self.dispatcher.toast("Failed to update");
                Err(e)
            }
        }
    }

    /// Delete a routine, then refresh the set.
    ///
    /// The routine's pending timer disappears with the reschedule that
    /// follows the refresh; its ledger entry is left in place.
    ///
    /// # Errors
    ///
    /// Returns the store error when the delete fails (already surfaced as a
    /// toast).
    pub async fn delete_routine(&self, id: &str) -> Result<()> {
        match self.store.delete(id).await {
            Ok(()) => {
                self.dispatcher.toast("Deleted");
                self.sync.request_refresh();
                Ok(())
            }
            Err(e) => {
                warn!("delete failed: {e}");
                self.dispatcher.toast("Delete failed");
                Err(e)
            }
        }
    }

    /// Shut down: stop polling, cancel every pending reminder timer, and
    /// wait for the event loop to drain.
    pub async fn stop(mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        self.sync.abort();
        let _ = (&mut self.loop_handle).await;
        info!("controller stopped");
    }
}

async fn run_loop(
    mut routines_rx: watch::Receiver<Vec<Routine>>,
    mut fired_rx: mpsc::UnboundedReceiver<PlannedReminder>,
    mut scheduler: ReminderScheduler,
    mut ledger: ReminderLedger,
    dispatcher: Arc<NotificationDispatcher>,
    events_tx: EventSender,
    mut stop_rx: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            changed = routines_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let routines = routines_rx.borrow_and_update().clone();
                scheduler.reschedule_all(&routines, &Local::now(), &ledger);
            }
            Some(fired) = fired_rx.recv() => {
                info!("reminder due: {} at {}", fired.routine.course_name, fired.routine.start_time);
                dispatcher.dispatch(&fired.routine);
                let _ = events_tx.send(AppEvent::ReminderFired {
                    key: fired.key.clone(),
                    course_name: fired.routine.course_name.clone(),
                });
                if let Err(e) = ledger.set(&fired.key, fired.fire_at_ms) {
                    warn!("cannot record delivered reminder: {e}");
                }
                scheduler.complete(&fired.key);
            }
            _ = &mut stop_rx => {
                break;
            }
        }
    }

    scheduler.cancel_all();
    let _ = events_tx.send(AppEvent::Stopped);
}
