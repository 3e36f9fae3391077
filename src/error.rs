//! Error types for the sBTC gateway SDK

use serde_json::Value;
use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Main error type for gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Missing, malformed or rejected credentials (HTTP 401/403)
    #[error("Authentication error: {message}")]
    Authentication {
        message: String,
        code: Option<String>,
        status: u16,
    },

    /// Request shape rejected, either locally or by the server (HTTP 400/422)
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: Option<String>,
        details: Option<Value>,
    },

    /// Any other non-2xx response from the gateway
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        code: Option<String>,
        details: Option<Value>,
    },

    /// Webhook signature missing or not matching the payload
    #[error("Invalid signature: {message}")]
    InvalidSignature { message: String },

    /// Webhook body is not a well-formed event
    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    /// Webhook event falls outside the accepted replay window
    #[error("Stale event {event_id}: created {age_secs}s away from now")]
    StaleEvent { event_id: String, age_secs: i64 },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Timeout error
    #[error("Request timeout")]
    Timeout,

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl GatewayError {
    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            code: None,
            status: 401,
        }
    }

    /// Create a validation error without server details
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: Some("invalid_request".to_string()),
            details: None,
        }
    }

    /// Create a generic API error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            code: None,
            details: None,
        }
    }

    /// Create an invalid signature error
    pub fn invalid_signature(message: impl Into<String>) -> Self {
        Self::InvalidSignature {
            message: message.into(),
        }
    }

    /// Create a malformed payload error
    pub fn malformed_payload(message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Human-readable message without the variant prefix
    pub fn message(&self) -> String {
        match self {
            Self::Authentication { message, .. }
            | Self::Validation { message, .. }
            | Self::Api { message, .. }
            | Self::InvalidSignature { message }
            | Self::MalformedPayload { message }
            | Self::Config { message } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Machine-readable error code reported by the gateway, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Authentication { code, .. }
            | Self::Validation { code, .. }
            | Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Structured error details (field errors for validation failures)
    pub fn details(&self) -> Option<&Value> {
        match self {
            Self::Validation { details, .. } | Self::Api { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// HTTP status returned by the gateway, when the error came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Status a webhook receiver should answer with when rejecting a delivery
    ///
    /// Signature failures map to 401, payload problems to 400; anything else
    /// is not a webhook error and maps to 500.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidSignature { .. } => 401,
            Self::MalformedPayload { .. } | Self::StaleEvent { .. } => 400,
            _ => 500,
        }
    }

    /// Whether this error came from webhook verification or parsing
    pub fn is_webhook_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSignature { .. } | Self::MalformedPayload { .. } | Self::StaleEvent { .. }
        )
    }
}
