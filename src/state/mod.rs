//! State management module
//!
//! Task identifiers, timer snapshots, the board of task timers and the
//! shared application state.

pub mod app_state;
pub mod board;
pub mod task_id;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use board::{Card, ReconcileSummary, TimerBoard};
pub use task_id::TaskId;
pub use timer_state::TimerState;
