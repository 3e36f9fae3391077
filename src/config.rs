//! Client configuration

use crate::transport::RetryPolicy;
use crate::{GatewayError, Result};
use std::time::Duration;

/// Default gateway API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.sbtc-gateway.com";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable names read by [`GatewayConfig::from_env`]
pub mod env {
    pub const API_KEY: &str = "SBTC_GATEWAY_API_KEY";
    pub const BASE_URL: &str = "SBTC_GATEWAY_BASE_URL";
    pub const TIMEOUT_SECS: &str = "SBTC_GATEWAY_TIMEOUT_SECS";
    pub const MAX_RETRIES: &str = "SBTC_GATEWAY_MAX_RETRIES";
}

/// Gateway client configuration
///
/// Fixed once the client is built.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Secret API key (`sk_test_...` or `sk_live_...`)
    pub api_key: String,
    /// Base URL of the gateway API
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retry policy for transient failures
    pub retry_policy: RetryPolicy,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("retry_policy", &self.retry_policy)
            .finish()
    }
}

impl GatewayConfig {
    /// Create a new configuration with default endpoint, timeout and retries
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Build a configuration from `SBTC_GATEWAY_*` environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(env::API_KEY)
            .map_err(|_| GatewayError::config(format!("{} is not set", env::API_KEY)))?;
        let mut config = Self::new(api_key);

        if let Ok(base_url) = std::env::var(env::BASE_URL) {
            config = config.with_base_url(base_url);
        }
        if let Ok(raw) = std::env::var(env::TIMEOUT_SECS) {
            let secs: u64 = raw.parse().map_err(|_| {
                GatewayError::config(format!("{} must be a whole number of seconds", env::TIMEOUT_SECS))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Ok(raw) = std::env::var(env::MAX_RETRIES) {
            let retries: u32 = raw.parse().map_err(|_| {
                GatewayError::config(format!("{} must be a non-negative integer", env::MAX_RETRIES))
            })?;
            config = config.with_max_retries(retries);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(GatewayError::config("API key cannot be empty"));
        }

        let url = url::Url::parse(&self.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(GatewayError::config(
                "Base URL must start with http:// or https://",
            ));
        }

        if self.timeout.is_zero() {
            return Err(GatewayError::config("Timeout must be greater than zero"));
        }

        Ok(())
    }

    /// Whether the key looks like a live-mode key
    ///
    /// Advisory only; the gateway decides which environment a key belongs to.
    pub fn is_live(&self) -> bool {
        self.api_key.starts_with("sk_live_")
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Set the number of retries, keeping the backoff schedule
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry_policy.max_retries = max_retries;
        self
    }
}
