//! Per-task elapsed-second counter driven by a one-second tick source

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::{
    tick::{TickSource, TICK_PERIOD},
    TimerVariant,
};
use crate::{
    services::TimeEntryStore,
    state::{TaskId, TimerState},
};

/// Observer called with `(task_id, elapsed_seconds)` after every counter change
pub type TimeUpdateSink = Arc<dyn Fn(Option<&TaskId>, u64) + Send + Sync>;

/// Called once after each successful stop-and-save
pub type StopCallback = Arc<dyn Fn() + Send + Sync>;

/// Whether a requested transition changed anything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Applied,
    Unchanged,
}

/// Reasons a stop request is refused before anything is sent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StopRejected {
    #[error("this timer does not save sessions")]
    NotPersistent,
    #[error("no time entry store is attached")]
    NoStore,
    #[error("no task is selected")]
    NoTask,
    #[error("nothing has been timed yet")]
    NothingRecorded,
    #[error("a save is already in progress")]
    SaveInFlight,
}

/// Result of a stop request that reached the persistence collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// The session was recorded and the counter cleared
    Saved { task_id: TaskId, seconds: u64 },
    /// The store failed; the counter still holds `seconds` so stop can be retried
    Failed {
        task_id: TaskId,
        seconds: u64,
        reason: String,
    },
}

struct Inner {
    task_id: Option<TaskId>,
    elapsed_seconds: u64,
    /// Present exactly while running
    tick: Option<TickSource>,
    /// Bumped every time a tick source is armed; stale ticks compare against it
    session: u64,
    /// Bumped on reset and rebinding; a save only clears the counter it read
    binding: u64,
    saving: bool,
    torn_down: bool,
}

struct Shared {
    inner: Mutex<Inner>,
    on_time_update: Option<TimeUpdateSink>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Called with the lock held so notifications arrive in counter order.
    /// A torn down timer no longer reports to its host.
    fn notify(&self, inner: &Inner) {
        if inner.torn_down {
            return;
        }
        if let Some(sink) = &self.on_time_update {
            sink(inner.task_id.as_ref(), inner.elapsed_seconds);
        }
    }

    fn tick(&self, session: u64) -> bool {
        let mut inner = self.lock();
        if inner.tick.is_none() || inner.session != session {
            debug!("Discarding stale tick for session {}", session);
            return false;
        }
        inner.elapsed_seconds = inner.elapsed_seconds.saturating_add(1);
        self.notify(&inner);
        true
    }
}

/// Clears the in-flight flag of a save, even if the stop future is dropped
struct PendingSave<'a> {
    shared: &'a Shared,
    settled: bool,
}

impl PendingSave<'_> {
    fn settle<F>(mut self, apply: F)
    where
        F: FnOnce(&mut Inner) -> bool,
    {
        let mut inner = self.shared.lock();
        inner.saving = false;
        if apply(&mut inner) {
            self.shared.notify(&inner);
        }
        self.settled = true;
    }
}

impl Drop for PendingSave<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Save abandoned before completion");
            self.shared.lock().saving = false;
        }
    }
}

fn describe(task_id: Option<&TaskId>) -> &str {
    task_id.map(TaskId::as_str).unwrap_or("<none>")
}

/// Elapsed-time counter bound to one task.
///
/// The timer owns its tick source: pausing, resetting, rebinding, stopping,
/// tearing down or dropping the timer disarms it. All operations take
/// `&self`, so a timer can be shared behind an `Arc` by a hosting view.
///
/// The update sink runs while the timer's state is locked and must not call
/// back into the same timer.
pub struct Timer {
    shared: Arc<Shared>,
    variant: TimerVariant,
    store: Option<Arc<dyn TimeEntryStore>>,
    on_stop: Option<StopCallback>,
}

/// Builder for [`Timer`]
pub struct TimerBuilder {
    task_id: Option<TaskId>,
    variant: TimerVariant,
    store: Option<Arc<dyn TimeEntryStore>>,
    on_time_update: Option<TimeUpdateSink>,
    on_stop: Option<StopCallback>,
}

impl TimerBuilder {
    pub fn task_id(mut self, task_id: Option<TaskId>) -> Self {
        self.task_id = task_id;
        self
    }

    pub fn store(mut self, store: Arc<dyn TimeEntryStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn on_time_update<F>(mut self, sink: F) -> Self
    where
        F: Fn(Option<&TaskId>, u64) + Send + Sync + 'static,
    {
        self.on_time_update = Some(Arc::new(sink));
        self
    }

    pub fn on_stop<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_stop = Some(Arc::new(callback));
        self
    }

    pub fn build(self) -> Timer {
        Timer {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    task_id: self.task_id,
                    elapsed_seconds: 0,
                    tick: None,
                    session: 0,
                    binding: 0,
                    saving: false,
                    torn_down: false,
                }),
                on_time_update: self.on_time_update,
            }),
            variant: self.variant,
            store: self.store,
            on_stop: self.on_stop,
        }
    }
}

impl Timer {
    /// Idle timer without sinks or store
    pub fn new(task_id: Option<TaskId>, variant: TimerVariant) -> Self {
        Self::builder(variant).task_id(task_id).build()
    }

    pub fn builder(variant: TimerVariant) -> TimerBuilder {
        TimerBuilder {
            task_id: None,
            variant,
            store: None,
            on_time_update: None,
            on_stop: None,
        }
    }

    pub fn variant(&self) -> &TimerVariant {
        &self.variant
    }

    /// Current snapshot
    pub fn state(&self) -> TimerState {
        let inner = self.shared.lock();
        TimerState {
            task_id: inner.task_id.clone(),
            elapsed_seconds: inner.elapsed_seconds,
            running: inner.tick.is_some(),
        }
    }

    pub fn task_id(&self) -> Option<TaskId> {
        self.shared.lock().task_id.clone()
    }

    pub fn is_saving(&self) -> bool {
        self.shared.lock().saving
    }

    /// Begin counting. Must be called from within a Tokio runtime.
    pub fn start(&self) -> Transition {
        let mut inner = self.shared.lock();
        if inner.torn_down {
            warn!("Ignoring start on a torn down timer for task {}", describe(inner.task_id.as_ref()));
            return Transition::Unchanged;
        }
        if inner.tick.is_some() {
            debug!("Timer for task {} already running", describe(inner.task_id.as_ref()));
            return Transition::Unchanged;
        }

        inner.session += 1;
        let session = inner.session;
        let shared = Arc::downgrade(&self.shared);
        inner.tick = Some(TickSource::spawn(TICK_PERIOD, move || match shared.upgrade() {
            Some(shared) => shared.tick(session),
            None => false,
        }));

        info!(
            "Timer started for task {} at {}s",
            describe(inner.task_id.as_ref()),
            inner.elapsed_seconds
        );
        Transition::Applied
    }

    /// Stop counting and keep the elapsed time
    pub fn pause(&self) -> Transition {
        let mut inner = self.shared.lock();
        match inner.tick.take() {
            Some(_) => {
                info!(
                    "Timer paused for task {} at {}s",
                    describe(inner.task_id.as_ref()),
                    inner.elapsed_seconds
                );
                Transition::Applied
            }
            None => Transition::Unchanged,
        }
    }

    /// Stop counting and clear the elapsed time
    pub fn reset(&self) -> Transition {
        let mut inner = self.shared.lock();
        if inner.torn_down {
            debug!("Ignoring reset on a torn down timer for task {}", describe(inner.task_id.as_ref()));
            return Transition::Unchanged;
        }
        inner.tick = None;
        inner.elapsed_seconds = 0;
        inner.binding += 1;
        self.shared.notify(&inner);
        info!("Timer reset for task {}", describe(inner.task_id.as_ref()));
        Transition::Applied
    }

    /// Bind the timer to another task. Elapsed time is per task, so a change
    /// of id resets the counter first.
    pub fn set_task(&self, task_id: Option<TaskId>) -> Transition {
        let mut inner = self.shared.lock();
        if inner.torn_down || inner.task_id == task_id {
            return Transition::Unchanged;
        }

        inner.tick = None;
        inner.elapsed_seconds = 0;
        inner.binding += 1;
        self.shared.notify(&inner);

        info!(
            "Timer rebound from task {} to task {}",
            describe(inner.task_id.as_ref()),
            describe(task_id.as_ref())
        );
        inner.task_id = task_id;
        Transition::Applied
    }

    /// End the timer's lifecycle. Safe to call more than once.
    pub fn teardown(&self) {
        let mut inner = self.shared.lock();
        if inner.torn_down {
            return;
        }
        inner.torn_down = true;
        inner.tick = None;
        debug!("Timer for task {} torn down", describe(inner.task_id.as_ref()));
    }

    /// Stop counting and record the session with the store.
    ///
    /// The counter is cleared only when the store succeeds. Failures are
    /// logged and returned as [`StopOutcome::Failed`] with the counter intact.
    pub async fn stop(&self) -> Result<StopOutcome, StopRejected> {
        if !self.variant.persist_on_stop {
            return Err(StopRejected::NotPersistent);
        }
        let store = self.store.as_ref().ok_or(StopRejected::NoStore)?;

        let (task_id, seconds, binding) = {
            let mut inner = self.shared.lock();
            if inner.saving {
                return Err(StopRejected::SaveInFlight);
            }
            let task_id = inner.task_id.clone().ok_or(StopRejected::NoTask)?;
            if inner.elapsed_seconds == 0 {
                return Err(StopRejected::NothingRecorded);
            }
            inner.tick = None;
            inner.saving = true;
            (task_id, inner.elapsed_seconds, inner.binding)
        };
        let pending = PendingSave {
            shared: &self.shared,
            settled: false,
        };

        info!("Saving {}s for task {}", seconds, task_id);
        match store.record(&task_id, seconds).await {
            Ok(()) => {
                pending.settle(|inner| {
                    // Time counted after the save began belongs to the next session
                    if inner.binding != binding {
                        return false;
                    }
                    inner.elapsed_seconds = inner.elapsed_seconds.saturating_sub(seconds);
                    true
                });
                info!("Saved {}s for task {}", seconds, task_id);
                if let Some(on_stop) = &self.on_stop {
                    on_stop();
                }
                Ok(StopOutcome::Saved { task_id, seconds })
            }
            Err(e) => {
                pending.settle(|_| false);
                error!("Failed to save {}s for task {}: {:#}", seconds, task_id, e);
                Ok(StopOutcome::Failed {
                    task_id,
                    seconds,
                    reason: format!("{:#}", e),
                })
            }
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("state", &self.state())
            .field("persist_on_stop", &self.variant.persist_on_stop)
            .field("saving", &self.is_saving())
            .finish()
    }
}
