//! Timer variants and their control labels

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Labels a hosting view shows next to a timer's controls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerLabels {
    pub heading: String,
    pub start: String,
    pub pause: String,
    pub reset: String,
    /// Only present for variants that save on stop
    pub stop: Option<String>,
}

/// Behaviour and presentation of a timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerVariant {
    /// Whether `stop` records the session with the persistence collaborator
    pub persist_on_stop: bool,
    pub labels: TimerLabels,
}

impl TimerVariant {
    /// Task-card stopwatch: reports progress upward, never saves
    pub fn stopwatch() -> Self {
        Self {
            persist_on_stop: false,
            labels: TimerLabels {
                heading: "Thời gian".to_string(),
                start: "Bắt đầu".to_string(),
                pause: "Tạm dừng".to_string(),
                reset: "Reset".to_string(),
                stop: None,
            },
        }
    }

    /// Time-tracking timer: saves the session on stop
    pub fn time_tracking() -> Self {
        Self {
            persist_on_stop: true,
            labels: TimerLabels {
                heading: "Elapsed".to_string(),
                start: "Start".to_string(),
                pause: "Pause".to_string(),
                reset: "Reset".to_string(),
                stop: Some("Stop & Save".to_string()),
            },
        }
    }

    /// Bare page stopwatch with a start/stop toggle
    pub fn standalone() -> Self {
        Self {
            persist_on_stop: false,
            labels: TimerLabels {
                heading: "Timer".to_string(),
                start: "Start".to_string(),
                pause: "Stop".to_string(),
                reset: "Reset".to_string(),
                stop: None,
            },
        }
    }
}

/// Names of the recognised variants, selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariantName {
    Stopwatch,
    TimeTracking,
    Standalone,
}

impl From<VariantName> for TimerVariant {
    fn from(name: VariantName) -> Self {
        match name {
            VariantName::Stopwatch => TimerVariant::stopwatch(),
            VariantName::TimeTracking => TimerVariant::time_tracking(),
            VariantName::Standalone => TimerVariant::standalone(),
        }
    }
}
