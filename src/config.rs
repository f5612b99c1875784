//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

use crate::timer::VariantName;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "task-timer")]
#[command(about = "Per-task stopwatch service backed by a time-tracking API")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554", env = "TASK_TIMER_PORT")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1", env = "TASK_TIMER_HOST")]
    pub host: String,

    /// Base URL of the time-tracking backend
    #[arg(long, default_value = "http://localhost:8000", env = "TASK_TIMER_BACKEND_URL")]
    pub backend_url: String,

    /// Bearer token forwarded to the backend
    #[arg(long, env = "TASK_TIMER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Backend request timeout in seconds
    #[arg(long, default_value = "10", env = "TASK_TIMER_REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    /// Seconds between assigned-task syncs (0 disables syncing)
    #[arg(long, default_value = "0", env = "TASK_TIMER_SYNC_INTERVAL")]
    pub sync_interval: u64,

    /// Variant used for per-task card timers
    #[arg(long, value_enum, default_value_t = VariantName::Stopwatch, env = "TASK_TIMER_CARD_VARIANT")]
    pub card_variant: VariantName,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Sync period, if syncing is enabled
    pub fn sync_period(&self) -> Option<Duration> {
        (self.sync_interval > 0).then(|| Duration::from_secs(self.sync_interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["task-timer"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.card_variant, VariantName::Stopwatch);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.sync_period(), None);
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "task-timer",
            "--port",
            "8080",
            "--card-variant",
            "time-tracking",
            "--sync-interval",
            "30",
            "-v",
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.card_variant, VariantName::TimeTracking);
        assert_eq!(config.sync_period(), Some(Duration::from_secs(30)));
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn unknown_variant_is_rejected() {
        assert!(Config::try_parse_from(["task-timer", "--card-variant", "kitchen"]).is_err());
    }
}
