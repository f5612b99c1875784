//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    state::{Card, TaskId},
    timer::{Timer, TimerLabels},
};

/// Control actions a hosting view can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerAction {
    Start,
    Pause,
    Reset,
    Stop,
}

impl TimerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerAction::Start => "start",
            TimerAction::Pause => "pause",
            TimerAction::Reset => "reset",
            TimerAction::Stop => "stop",
        }
    }
}

/// Everything a view needs to render one timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerView {
    pub task_id: Option<TaskId>,
    pub elapsed_seconds: u64,
    pub running: bool,
    /// `HH:MM:SS`
    pub display: String,
    pub saving: bool,
    pub persist_on_stop: bool,
    pub labels: TimerLabels,
}

impl From<&Timer> for TimerView {
    fn from(timer: &Timer) -> Self {
        let state = timer.state();
        Self {
            display: state.display(),
            running: state.is_running(),
            elapsed_seconds: state.elapsed_seconds,
            task_id: state.task_id,
            saving: timer.is_saving(),
            persist_on_stop: timer.variant().persist_on_stop,
            labels: timer.variant().labels.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardView {
    pub title: Option<String>,
    pub timer: TimerView,
}

impl From<&Card> for CardView {
    fn from(card: &Card) -> Self {
        Self {
            title: card.title.clone(),
            timer: TimerView::from(card.timer.as_ref()),
        }
    }
}

/// Response to a control action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    /// `applied`, `unchanged`, `saved` or `failed`
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerView,
}

impl ApiResponse {
    pub fn new(status: &str, message: String, timer: TimerView) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            timer,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MountRequest {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectFocusRequest {
    pub task_id: Option<TaskId>,
}

/// Query for GET /reports/daily
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyReportQuery {
    pub date: Option<NaiveDate>,
}

/// Query for GET /reports/statistics
#[derive(Debug, Clone, Deserialize)]
pub struct StatisticsQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Board overview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub focus: TimerView,
    pub cards: Vec<CardView>,
    pub total_tracked_seconds: u64,
    pub completed_saves: u64,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Error returned by handlers, rendered as `{ "error": message }`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}
