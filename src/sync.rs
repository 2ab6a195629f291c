//! Routine-set polling loop.
//!
//! Keeps the in-memory routine set consistent with the remote store: one
//! immediate fetch at startup, then a fixed-interval poll for the process
//! lifetime, plus an on-demand refresh after any successful local mutation.
//! The freshest set is published over a watch channel, sorted by
//! `(day, start-minutes)`.
//!
//! A failed fetch keeps the previously published set (stale-but-available
//! over empty) and surfaces a transient message; the next poll cycle is the
//! retry mechanism.

use crate::events::{AppEvent, EventSender};
use crate::notify::NotificationDispatcher;
use crate::routine::{Routine, sort_by_schedule};
use crate::store::DocumentStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Handle to a running sync loop.
pub struct SyncHandle {
    refresh_tx: mpsc::UnboundedSender<()>,
    handle: JoinHandle<()>,
}

impl SyncHandle {
    /// Request an immediate out-of-cycle fetch.
    pub fn request_refresh(&self) {
        let _ = self.refresh_tx.send(());
    }

    /// Stop the loop.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

/// Start the polling loop.
///
/// The first fetch happens immediately; afterwards one fetch per
/// `poll_interval` or refresh request.
#[must_use]
pub fn spawn(
    store: Arc<dyn DocumentStore>,
    poll_interval: Duration,
    routines_tx: watch::Sender<Vec<Routine>>,
    dispatcher: Arc<NotificationDispatcher>,
    events_tx: EventSender,
) -> SyncHandle {
    let (refresh_tx, mut refresh_rx) = mpsc::unbounded_channel::<()>();

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                request = refresh_rx.recv() => {
                    if request.is_none() {
                        break;
                    }
                }
            }
            fetch_once(store.as_ref(), &routines_tx, &dispatcher, &events_tx).await;
        }
    });

    SyncHandle { refresh_tx, handle }
}

async fn fetch_once(
    store: &dyn DocumentStore,
    routines_tx: &watch::Sender<Vec<Routine>>,
    dispatcher: &NotificationDispatcher,
    events_tx: &EventSender,
) {
    match store.list().await {
        Ok(mut routines) => {
            sort_by_schedule(&mut routines);
            debug!("fetched {} routine(s)", routines.len());
            let count = routines.len();
            // Publish before announcing, so observers of the event always
            // see the new set.
            let _ = routines_tx.send(routines);
            let _ = events_tx.send(AppEvent::RoutinesRefreshed { count });
        }
        Err(e) => {
            warn!("routine fetch failed: {e}");
            dispatcher.toast("Failed to fetch routines");
            let _ = events_tx.send(AppEvent::SyncFailed {
                message: e.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::config::{BeepConfig, NotifyConfig};
    use crate::error::ClassbellError;
    use crate::events;
    use crate::routine::RoutineFields;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyStore {
        routines: Mutex<Vec<Routine>>,
        fail: Mutex<bool>,
        fetches: AtomicUsize,
    }

    impl FlakyStore {
        fn with(routines: Vec<Routine>) -> Arc<Self> {
            Arc::new(Self {
                routines: Mutex::new(routines),
                fail: Mutex::new(false),
                fetches: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl DocumentStore for FlakyStore {
        async fn list(&self) -> crate::error::Result<Vec<Routine>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if *self.fail.lock().unwrap() {
                return Err(ClassbellError::Store("unreachable".to_owned()));
            }
            Ok(self.routines.lock().unwrap().clone())
        }

        async fn create(&self, _fields: &RoutineFields) -> crate::error::Result<Routine> {
            unimplemented!("not used by the sync loop")
        }

        async fn update(
            &self,
            _id: &str,
            _fields: &RoutineFields,
        ) -> crate::error::Result<Routine> {
            unimplemented!("not used by the sync loop")
        }

        async fn delete(&self, _id: &str) -> crate::error::Result<()> {
            unimplemented!("not used by the sync loop")
        }
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

    fn quiet_dispatcher(events_tx: EventSender) -> Arc<NotificationDispatcher> {
        let config = NotifyConfig {
            desktop: false,
            beep: BeepConfig {
                enabled: false,
                ..BeepConfig::default()
            },
            ..NotifyConfig::default()
        };
        Arc::new(NotificationDispatcher::new(&config, events_tx))
    }

    #[tokio::test(start_paused = true)]
    async fn startup_fetch_publishes_a_sorted_set() {
        let store = FlakyStore::with(vec![routine("b", 2, "08:00"), routine("a", 1, "09:00")]);
        let (routines_tx, mut routines_rx) = watch::channel(Vec::new());
        let (events_tx, _events_rx) = events::channel();
        let dispatcher = quiet_dispatcher(events_tx.clone());

        let sync = spawn(
            Arc::clone(&store) as Arc<dyn DocumentStore>,
            Duration::from_secs(20),
            routines_tx,
            dispatcher,
            events_tx,
        );

        routines_rx.changed().await.expect("published");
        let ids: Vec<String> = routines_rx
            .borrow()
            .iter()
            .map(|r| r.id.clone().unwrap())
            .collect();
        assert_eq!(ids, ["a", "b"]);

        sync.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_retains_the_previous_set() {
        let store = FlakyStore::with(vec![routine("a", 1, "09:00")]);
        let (routines_tx, mut routines_rx) = watch::channel(Vec::new());
        let (events_tx, mut events_rx) = events::channel();
        let dispatcher = quiet_dispatcher(events_tx.clone());

        let sync = spawn(
            Arc::clone(&store) as Arc<dyn DocumentStore>,
            Duration::from_secs(20),
            routines_tx,
            dispatcher,
            events_tx,
        );

        routines_rx.changed().await.expect("published");
        assert_eq!(routines_rx.borrow_and_update().len(), 1);

        *store.fail.lock().unwrap() = true;
        sync.request_refresh();

        // Drain until the failure event shows up.
        loop {
            match events_rx.recv().await.expect("event") {
                AppEvent::SyncFailed { .. } => break,
                _ => continue,
            }
        }
        assert!(!routines_rx.has_changed().unwrap());
        assert_eq!(routines_rx.borrow().len(), 1);

        sync.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_request_triggers_an_immediate_fetch() {
        let store = FlakyStore::with(vec![routine("a", 1, "09:00")]);
        let (routines_tx, mut routines_rx) = watch::channel(Vec::new());
        let (events_tx, _events_rx) = events::channel();
        let dispatcher = quiet_dispatcher(events_tx.clone());

        let sync = spawn(
            Arc::clone(&store) as Arc<dyn DocumentStore>,
            Duration::from_secs(3600),
            routines_tx,
            dispatcher,
            events_tx,
        );

        routines_rx.changed().await.expect("startup fetch");
        let before = store.fetches.load(Ordering::SeqCst);

        store.routines.lock().unwrap().push(routine("b", 2, "10:00"));
        sync.request_refresh();
        routines_rx.changed().await.expect("refreshed");
        assert_eq!(routines_rx.borrow().len(), 2);
        assert_eq!(store.fetches.load(Ordering::SeqCst), before + 1);

        sync.abort();
    }
}
