//! Task Timer - per-task stopwatches over HTTP
//!
//! Each task gets an elapsed-time counter driven by a one-second tick
//! source. A focus timer records finished sessions with the time-tracking
//! backend; everything else about tasks and reports lives in that backend.

pub mod api;
pub mod config;
pub mod services;
pub mod state;
pub mod tasks;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::{AppState, TaskId};
pub use timer::{Timer, TimerVariant};
pub use utils::signals::shutdown_signal;
