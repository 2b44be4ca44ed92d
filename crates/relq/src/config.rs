//! Connection configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of rows fetched per mapper batch.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Configuration for a [`crate::Connection`].
///
/// Deserializable from application settings; missing fields take their
/// defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Rows per batch for [`crate::Connection::fetch`] (default 1000).
    pub batch_size: usize,
    /// Statements slower than this are reported via `on_slow_query`.
    pub slow_query_threshold: Option<Duration>,
    /// Truncate SQL in log events (in bytes). `None` disables truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            slow_query_threshold: None,
            max_sql_length: Some(200),
        }
    }
}

impl ConnectionConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fetch batch size (clamped to at least 1).
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Set the slow query threshold.
    pub fn slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    /// Set maximum SQL length in log events.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Log full SQL.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ConnectionConfig::new();
        assert_eq!(config.batch_size, 1000);
        assert!(config.slow_query_threshold.is_none());
        assert_eq!(config.max_sql_length, Some(200));
    }

    #[test]
    fn batch_size_is_clamped() {
        assert_eq!(ConnectionConfig::new().batch_size(0).batch_size, 1);
        let config = ConnectionConfig::new()
            .batch_size(50)
            .slow_query_threshold(Duration::from_millis(250))
            .no_truncate();
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.slow_query_threshold, Some(Duration::from_millis(250)));
        assert!(config.max_sql_length.is_none());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ConnectionConfig =
            serde_json::from_str(r#"{"batch_size": 25, "max_sql_length": null}"#).unwrap();
        assert_eq!(config.batch_size, 25);
        assert!(config.slow_query_threshold.is_none());
        assert!(config.max_sql_length.is_none());

        let config: ConnectionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_sql_length, Some(200));
    }
}
