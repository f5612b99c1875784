//! HTTP client for the time-tracking backend

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::TimeEntryStore;
use crate::state::TaskId;

/// Endpoint accepting `{ task_id, duration_seconds }`
pub const TIME_ENTRY_PATH: &str = "/api/time_tracking/";
/// Endpoint listing tasks assigned to the authenticated user
pub const ASSIGNED_TASKS_PATH: &str = "/tasks/my/assigned";
/// Tracked time for one day, grouped by task
pub const DAILY_REPORT_PATH: &str = "/reports/daily";
/// Totals over a date range
pub const STATISTICS_PATH: &str = "/reports/statistics";

/// Task as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedTask {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

#[derive(Serialize)]
struct TimeEntryBody<'a> {
    task_id: &'a TaskId,
    duration_seconds: u64,
}

/// Backend client. Authentication is the backend's concern; a bearer token
/// is forwarded when configured.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Record a finished timing session
    pub async fn record_time_entry(&self, task_id: &TaskId, duration_seconds: u64) -> anyhow::Result<()> {
        let url = self.url(TIME_ENTRY_PATH);
        debug!("POST {} task={} duration={}s", url, task_id, duration_seconds);

        let resp = self
            .authorize(self.client.post(&url))
            .json(&TimeEntryBody {
                task_id,
                duration_seconds,
            })
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Failed to record time entry: {} - {}", status, text);
        }

        Ok(())
    }

    /// Tasks assigned to the current user
    pub async fn assigned_tasks(&self) -> anyhow::Result<Vec<AssignedTask>> {
        let url = self.url(ASSIGNED_TASKS_PATH);
        debug!("GET {}", url);

        let resp = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            anyhow::bail!("Failed to list assigned tasks: {} - {}", status, text);
        }

        serde_json::from_str(&text).context("Unexpected assigned task payload")
    }

    /// Daily report for `date`, or for today (backend clock) when `None`.
    /// The payload is passed through untouched.
    pub async fn daily_report(&self, date: Option<NaiveDate>) -> anyhow::Result<Value> {
        let mut query = Vec::new();
        if let Some(date) = date {
            query.push(("date", date.to_string()));
        }
        self.get_report(DAILY_REPORT_PATH, &query).await
    }

    /// Statistics between two dates, both inclusive
    pub async fn statistics(&self, start_date: NaiveDate, end_date: NaiveDate) -> anyhow::Result<Value> {
        let query = [
            ("start_date", start_date.to_string()),
            ("end_date", end_date.to_string()),
        ];
        self.get_report(STATISTICS_PATH, &query).await
    }

    async fn get_report(&self, path: &str, query: &[(&str, String)]) -> anyhow::Result<Value> {
        let url = self.url(path);
        debug!("GET {} {:?}", url, query);

        let resp = self
            .authorize(self.client.get(&url))
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            anyhow::bail!("Failed to fetch {}: {} - {}", path, status, text);
        }

        serde_json::from_str(&text).with_context(|| format!("Unexpected payload from {}", path))
    }
}

#[async_trait]
impl TimeEntryStore for BackendClient {
    async fn record(&self, task_id: &TaskId, duration_seconds: u64) -> anyhow::Result<()> {
        self.record_time_entry(task_id, duration_seconds).await
    }
}
