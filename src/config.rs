//! Configuration types for wikiclient

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request pacing configuration (minimum spacing between consecutive calls)
///
/// Intervals are whole seconds and are floor-clamped to
/// [`MIN_PACING_SECONDS`] when the gate is built, so a misconfigured client
/// cannot hammer the server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Minimum seconds between consecutive read-class calls (default: 10)
    #[serde(default = "default_pacing_seconds")]
    pub seconds_between_queries: u64,

    /// Minimum seconds between consecutive edit-class calls (default: 10)
    #[serde(default = "default_pacing_seconds")]
    pub seconds_between_edits: u64,
}

/// Floor applied to both pacing intervals
pub const MIN_PACING_SECONDS: u64 = 2;

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            seconds_between_queries: default_pacing_seconds(),
            seconds_between_edits: default_pacing_seconds(),
        }
    }
}

/// Throttle handling configuration (maxlag / Retry-After backoff)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Attempt budget per logical request, shared by the maxlag and
    /// Retry-After paths (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay for maxlag backoff; attempt n sleeps `maxlag_delay * (n + 1)`
    /// (default: 5 seconds)
    #[serde(default = "default_maxlag_delay", with = "duration_serde")]
    pub maxlag_delay: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            maxlag_delay: default_maxlag_delay(),
        }
    }
}

/// Main configuration for [`Client`](crate::Client)
///
/// All fields have sensible defaults; a zero-configuration client works
/// against any standard action API endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request pacing settings
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Throttle backoff settings
    #[serde(default)]
    pub throttle: ThrottleConfig,

    /// Upper bound on continuation rounds per query chunk (default: 1000)
    ///
    /// The wire protocol places no bound on how many continuation cursors a
    /// server may issue; the cap keeps a misbehaving server from driving the
    /// client in circles. When the cap is hit the rounds merged so far are
    /// returned and a warning is logged.
    #[serde(default = "default_max_continuation_rounds")]
    pub max_continuation_rounds: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            pacing: PacingConfig::default(),
            throttle: ThrottleConfig::default(),
            max_continuation_rounds: default_max_continuation_rounds(),
        }
    }
}

fn default_user_agent() -> String {
    format!("wikiclient/{}", env!("CARGO_PKG_VERSION"))
}

fn default_pacing_seconds() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_maxlag_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_max_continuation_rounds() -> usize {
    1000
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_protocol_constants() {
        let config = Config::default();
        assert_eq!(config.throttle.max_attempts, 3);
        assert_eq!(config.throttle.maxlag_delay, Duration::from_secs(5));
        assert_eq!(config.pacing.seconds_between_queries, 10);
        assert_eq!(config.pacing.seconds_between_edits, 10);
        assert_eq!(config.max_continuation_rounds, 1000);
        assert!(config.user_agent.starts_with("wikiclient/"));
    }

    #[test]
    fn empty_json_deserializes_to_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.throttle.max_attempts, 3);
        assert_eq!(config.pacing.seconds_between_edits, 10);
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let config: Config = serde_json::from_str(
            r#"{"pacing": {"seconds_between_edits": 30}, "throttle": {"maxlag_delay": 7}}"#,
        )
        .unwrap();
        assert_eq!(config.pacing.seconds_between_edits, 30);
        assert_eq!(config.pacing.seconds_between_queries, 10);
        assert_eq!(config.throttle.maxlag_delay, Duration::from_secs(7));
        assert_eq!(config.throttle.max_attempts, 3);
    }

    #[test]
    fn config_roundtrips_through_json() {
        let config = Config {
            max_continuation_rounds: 5,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.max_continuation_rounds, 5);
        assert_eq!(back.throttle.maxlag_delay, config.throttle.maxlag_delay);
    }
}
