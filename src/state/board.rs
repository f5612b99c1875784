//! Board of task timers
//!
//! The board plays the hosting view: one card timer per mounted task plus a
//! focus timer bound to the selected task. Card progress flows in through
//! each timer's update sink; the board never writes a timer's counter.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};

use serde::Serialize;
use tracing::{debug, info};

use super::TaskId;
use crate::{
    services::{AssignedTask, TimeEntryStore},
    timer::{Timer, TimerVariant, Transition},
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A mounted card
#[derive(Debug, Clone)]
pub struct Card {
    pub title: Option<String>,
    pub timer: Arc<Timer>,
}

/// Cards mounted and unmounted by a reconcile pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub mounted: Vec<TaskId>,
    pub unmounted: Vec<TaskId>,
}

pub struct TimerBoard {
    card_variant: TimerVariant,
    store: Arc<dyn TimeEntryStore>,
    cards: Mutex<BTreeMap<TaskId, Card>>,
    /// Latest value reported by each card's sink
    totals: Arc<Mutex<BTreeMap<TaskId, u64>>>,
    focus: Arc<Timer>,
    completed_saves: Arc<AtomicU64>,
}

impl TimerBoard {
    pub fn new(card_variant: TimerVariant, store: Arc<dyn TimeEntryStore>) -> Self {
        let completed_saves = Arc::new(AtomicU64::new(0));
        let saves = Arc::clone(&completed_saves);
        let focus = Timer::builder(TimerVariant::time_tracking())
            .store(Arc::clone(&store))
            .on_stop(move || {
                saves.fetch_add(1, Ordering::Relaxed);
            })
            .build();

        Self {
            card_variant,
            store,
            cards: Mutex::new(BTreeMap::new()),
            totals: Arc::new(Mutex::new(BTreeMap::new())),
            focus: Arc::new(focus),
            completed_saves,
        }
    }

    /// Mount a card for `task_id`. Returns `true` when a new timer was
    /// created; an existing card only has its title refreshed.
    pub fn mount(&self, task_id: TaskId, title: Option<String>) -> bool {
        let mut cards = lock(&self.cards);
        if let Some(card) = cards.get_mut(&task_id) {
            if title.is_some() {
                card.title = title;
            }
            return false;
        }

        let totals = Arc::clone(&self.totals);
        let timer = Timer::builder(self.card_variant.clone())
            .task_id(Some(task_id.clone()))
            .store(Arc::clone(&self.store))
            .on_time_update(move |task_id, seconds| {
                if let Some(task_id) = task_id {
                    lock(&totals).insert(task_id.clone(), seconds);
                }
            })
            .build();

        lock(&self.totals).insert(task_id.clone(), 0);
        info!("Mounted timer card for task {}", task_id);
        cards.insert(
            task_id,
            Card {
                title,
                timer: Arc::new(timer),
            },
        );
        true
    }

    /// Unmount a card and tear its timer down. Returns `false` if no card
    /// was mounted for `task_id`.
    pub fn unmount(&self, task_id: &TaskId) -> bool {
        // Same lock order as `mount`: cards, then the timer, then totals
        let mut cards = lock(&self.cards);
        let Some(card) = cards.remove(task_id) else {
            return false;
        };
        card.timer.teardown();
        lock(&self.totals).remove(task_id);
        drop(cards);

        info!(
            "Unmounted timer card for task {} at {}s",
            task_id,
            card.timer.state().elapsed_seconds
        );
        true
    }

    pub fn card(&self, task_id: &TaskId) -> Option<Card> {
        lock(&self.cards).get(task_id).cloned()
    }

    /// All cards, ordered by task id
    pub fn cards(&self) -> Vec<(TaskId, Card)> {
        lock(&self.cards)
            .iter()
            .map(|(id, card)| (id.clone(), card.clone()))
            .collect()
    }

    /// Latest elapsed seconds reported by each card
    pub fn totals(&self) -> BTreeMap<TaskId, u64> {
        lock(&self.totals).clone()
    }

    pub fn total_tracked_seconds(&self) -> u64 {
        lock(&self.totals).values().sum()
    }

    /// Make the mounted cards match the assigned task list
    pub fn reconcile(&self, tasks: &[AssignedTask]) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();

        for task in tasks {
            if self.mount(task.id.clone(), Some(task.title.clone())) {
                summary.mounted.push(task.id.clone());
            }
        }

        let stale: Vec<TaskId> = lock(&self.cards)
            .keys()
            .filter(|id| !tasks.iter().any(|task| &task.id == *id))
            .cloned()
            .collect();
        for task_id in stale {
            if self.unmount(&task_id) {
                summary.unmounted.push(task_id);
            }
        }

        debug!(
            "Reconciled board: {} mounted, {} unmounted",
            summary.mounted.len(),
            summary.unmounted.len()
        );
        summary
    }

    /// The time-tracking timer bound to the selected task
    pub fn focus(&self) -> Arc<Timer> {
        Arc::clone(&self.focus)
    }

    /// Bind the focus timer to `task_id`, resetting it if the task changes
    pub fn select_focus(&self, task_id: Option<TaskId>) -> Transition {
        self.focus.set_task(task_id)
    }

    /// Number of focus sessions saved since startup
    pub fn completed_saves(&self) -> u64 {
        self.completed_saves.load(Ordering::Relaxed)
    }

    /// Tear down every timer on the board
    pub fn shutdown(&self) {
        let cards = std::mem::take(&mut *lock(&self.cards));
        for card in cards.values() {
            card.timer.teardown();
        }
        lock(&self.totals).clear();
        self.focus.teardown();
        info!("Board shut down, {} card timers torn down", cards.len());
    }
}
