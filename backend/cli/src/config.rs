use std::time::Duration;

use rxlens_assistant::PollPolicy;
use rxlens_core::RxError;

/// RxLens runtime configuration, loaded once from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Hosted-service credential
    pub api_key: Option<String>,
    /// Configured assistant id
    pub assistant_id: Option<String>,
    /// API base URL (override for self-hosted gateways)
    pub api_base: String,
    /// Run-status poll cadence in milliseconds
    pub poll_interval_ms: u64,
    /// Maximum non-terminal polls before giving up
    pub poll_max_attempts: u32,
    /// Log level
    pub log_level: String,
    /// Optional directory for rolling NDJSON logs
    pub log_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            assistant_id: None,
            api_base: "https://api.openai.com/v1".to_string(),
            poll_interval_ms: 1_000,
            poll_max_attempts: 120,
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            assistant_id: std::env::var("RXLENS_ASSISTANT_ID").ok(),
            api_base: std::env::var("RXLENS_API_BASE").unwrap_or(defaults.api_base),
            poll_interval_ms: std::env::var("RXLENS_POLL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.poll_interval_ms),
            poll_max_attempts: std::env::var("RXLENS_POLL_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.poll_max_attempts),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            log_dir: std::env::var("RXLENS_LOG_DIR").ok(),
        }
    }

    /// Credential and assistant id, or a startup configuration error —
    /// missing settings should fail before any workflow starts.
    pub fn require_credentials(&self) -> Result<(String, String), RxError> {
        let api_key = self
            .api_key
            .clone()
            .ok_or_else(|| RxError::Config("OPENAI_API_KEY is not set".into()))?;
        let assistant_id = self
            .assistant_id
            .clone()
            .ok_or_else(|| RxError::Config("RXLENS_ASSISTANT_ID is not set".into()))?;
        Ok((api_key, assistant_id))
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::fixed(
            Duration::from_millis(self.poll_interval_ms),
            self.poll_max_attempts,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_fail_at_startup() {
        let config = Config::default();
        assert!(matches!(
            config.require_credentials(),
            Err(RxError::Config(_))
        ));
    }

    #[test]
    fn poll_policy_reflects_settings() {
        let config = Config {
            poll_interval_ms: 250,
            poll_max_attempts: 8,
            ..Default::default()
        };
        let policy = config.poll_policy();
        assert_eq!(policy.interval, Duration::from_millis(250));
        assert_eq!(policy.max_attempts, 8);
    }
}
