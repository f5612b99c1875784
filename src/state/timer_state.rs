//! Timer state snapshot

use serde::{Deserialize, Serialize};

use super::TaskId;
use crate::timer::format_hms;

/// Point-in-time view of a timer, handed to hosting views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub task_id: Option<TaskId>,
    pub elapsed_seconds: u64,
    pub running: bool,
}

impl TimerState {
    /// Idle timer with nothing counted
    pub fn new(task_id: Option<TaskId>) -> Self {
        Self {
            task_id,
            elapsed_seconds: 0,
            running: false,
        }
    }

    /// Check if the timer is counting
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Elapsed time as `HH:MM:SS`
    pub fn display(&self) -> String {
        format_hms(self.elapsed_seconds)
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_idle_at_zero() {
        let state = TimerState::new(Some(TaskId::from(3)));
        assert!(!state.is_running());
        assert_eq!(state.display(), "00:00:00");
        assert_eq!(TimerState::default().task_id, None);
    }
}
