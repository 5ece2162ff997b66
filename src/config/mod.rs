//! Console configuration.
//!
//! The console is configured by the embedding application (desktop shell,
//! web bridge, CLI), typically deserialized from a JSON or TOML fragment.
//! Everything has a sensible default; only `base_url` normally needs to be
//! set.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level console configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsoleConfig {
    /// Base URL of the gateway backend, e.g. `https://gateway.example.com`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Header name carrying the opaque user identifier on every request.
    #[serde(default = "default_user_header")]
    pub user_header: String,

    /// Opaque user identifier sent in `user_header`. Usually mirrored from
    /// the `user` entry of the local store after login.
    #[serde(default)]
    pub user_id: Option<String>,

    /// Timeout for non-streaming requests, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Idle timeout between streamed chunks, in seconds. Zero disables the
    /// check. Streaming requests are exempt from `timeout_secs`.
    #[serde(default)]
    pub stream_idle_timeout_secs: u64,

    /// Chart projection tuning.
    #[serde(default)]
    pub chart: ChartConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_header: default_user_header(),
            user_id: None,
            timeout_secs: default_timeout_secs(),
            stream_idle_timeout_secs: 0,
            chart: ChartConfig::default(),
        }
    }
}

impl ConsoleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn stream_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_idle_timeout_secs)
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_user_header() -> String {
    "Gateway-User".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Chart projection tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChartConfig {
    /// Minimum number of time buckets in the usage timeline. When the data
    /// spans fewer buckets, the series is backfilled to this count so the
    /// chart axis never degenerates.
    #[serde(default = "default_min_time_points")]
    pub min_time_points: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            min_time_points: default_min_time_points(),
        }
    }
}

fn default_min_time_points() -> usize {
    7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_on_empty_input() {
        let config: ConsoleConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.user_header, "Gateway-User");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.stream_idle_timeout_secs, 0);
        assert_eq!(config.chart.min_time_points, 7);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result =
            serde_json::from_str::<ConsoleConfig>(r#"{"proxy": "http://x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn chart_backfill_count_is_tunable() {
        let config: ConsoleConfig =
            serde_json::from_str(r#"{"chart": {"min_time_points": 12}}"#)
                .unwrap();
        assert_eq!(config.chart.min_time_points, 12);
    }
}
