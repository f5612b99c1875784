//! Timer component
//!
//! A per-task elapsed-second counter with start/pause/reset/stop controls,
//! its one-second tick source, display formatting and the recognised
//! variants.

pub mod format;
pub mod stopwatch;
pub mod tick;
pub mod variant;

// Re-export main types
pub use format::format_hms;
pub use stopwatch::{StopOutcome, StopRejected, Timer, TimerBuilder, Transition};
pub use tick::TICK_PERIOD;
pub use variant::{TimerLabels, TimerVariant, VariantName};
