//! HTTP transport shared by the resource APIs

use crate::config::GatewayConfig;
use crate::{GatewayError, Result};
use reqwest::header::ACCEPT;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("sbtc-gateway-rust/", env!("CARGO_PKG_VERSION"));

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the default backoff schedule
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// A policy that never retries
    pub fn none() -> Self {
        Self::new(0)
    }

    /// Set the delay before the first retry
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Set the delay cap
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Delay before retry number `attempt` (0-based): `base * 2^attempt`, capped
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Whether a response status is worth retrying (5xx only)
    pub fn is_retryable_status(status: u16) -> bool {
        (500..=599).contains(&status)
    }

    /// Whether a failed attempt is worth retrying
    pub fn is_retryable(&self, error: &GatewayError) -> bool {
        match error {
            GatewayError::Timeout => true,
            GatewayError::Api { status, .. } => Self::is_retryable_status(*status),
            GatewayError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// Error fields of a gateway response body
///
/// Each field is read on its own; a field of an unexpected type is skipped.
#[derive(Debug, Default)]
struct ErrorFields {
    message: Option<String>,
    code: Option<String>,
    details: Option<Value>,
}

impl ErrorFields {
    fn from_value(body: &Value) -> Self {
        let error = body.get("error");
        let message = match error {
            Some(Value::String(text)) => Some(text.clone()),
            Some(Value::Object(inner)) => inner
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        }
        .or_else(|| {
            body.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        });

        let code = body
            .get("code")
            .or_else(|| error.and_then(|e| e.get("code")))
            .and_then(code_to_string);

        let details = body
            .get("details")
            .or_else(|| error.and_then(|e| e.get("details")))
            .filter(|d| !d.is_null())
            .cloned();

        Self {
            message,
            code,
            details,
        }
    }
}

fn code_to_string(code: &Value) -> Option<String> {
    match code {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn status_reason(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Request failed")
        .to_string()
}

/// Map a non-2xx response onto the error taxonomy
pub(crate) fn error_from_response(status: u16, body: &[u8]) -> GatewayError {
    let parsed = serde_json::from_slice::<Value>(body).ok();
    let fields = parsed
        .as_ref()
        .map(ErrorFields::from_value)
        .unwrap_or_default();

    let message = fields
        .message
        .or_else(|| {
            let text = String::from_utf8_lossy(body).trim().to_string();
            (!text.is_empty() && parsed.is_none()).then_some(text)
        })
        .unwrap_or_else(|| status_reason(status));

    match status {
        401 | 403 => GatewayError::Authentication {
            message,
            code: fields.code,
            status,
        },
        400 | 422 => GatewayError::Validation {
            message,
            code: fields.code,
            details: fields.details,
        },
        _ => GatewayError::Api {
            status,
            message,
            code: fields.code,
            details: fields.details,
        },
    }
}

/// Decode a 2xx body, turning a `{"success": false}` envelope into an API error
pub(crate) fn decode_success<T>(status: u16, body: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let value: Value = serde_json::from_slice(body)?;

    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let fields = ErrorFields::from_value(&value);
        return Err(GatewayError::Api {
            status,
            message: fields
                .message
                .unwrap_or_else(|| "Gateway reported an unsuccessful request".to_string()),
            code: fields.code,
            details: fields.details,
        });
    }

    Ok(serde_json::from_value(value)?)
}

fn map_send_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Http(error)
    }
}

/// Authenticated JSON transport for the gateway REST API
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_key: String,
    retry_policy: RetryPolicy,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("retry_policy", &self.retry_policy)
            .finish()
    }
}

impl HttpTransport {
    /// Create a transport from a validated configuration
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GatewayError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            retry_policy: config.retry_policy,
        })
    }

    /// Get the base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the retry policy
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and decode the JSON response
    pub async fn execute<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &[(&str, String)],
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.execute_with_headers(method, path, body, query, &[])
            .await
    }

    /// Send a request with extra headers; the same headers go out on every retry
    pub async fn execute_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &[(&str, String)],
        headers: &[(&str, String)],
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut attempt = 0;
        loop {
            match self.send_once(&method, path, body, query, headers).await {
                Ok(value) => return Ok(value),
                Err(error)
                    if attempt < self.retry_policy.max_retries
                        && self.retry_policy.is_retryable(&error) =>
                {
                    let delay = self.retry_policy.delay_for(attempt);
                    attempt += 1;
                    tracing::warn!(
                        %method,
                        path,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "retrying gateway request"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn send_once<T>(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        query: &[(&str, String)],
        headers: &[(&str, String)],
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        tracing::debug!(%method, path, "sending gateway request");

        let mut request = self
            .client
            .request(method.clone(), self.url(path))
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(map_send_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_send_error)?;

        if !status.is_success() {
            return Err(error_from_response(status.as_u16(), &bytes));
        }

        decode_success(status.as_u16(), &bytes)
    }
}
