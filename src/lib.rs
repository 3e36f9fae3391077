//! # sbtc-gateway
//!
//! Rust client for the sBTC payment gateway: accept Bitcoin, sBTC and STX
//! payments and verify the webhooks the gateway sends about them.
//!
//! ```rust,no_run
//! use sbtc_gateway::{Currency, GatewayClient, PaymentRequest};
//!
//! # async fn run() -> sbtc_gateway::Result<()> {
//! let client = GatewayClient::new("sk_test_your_api_key")?;
//! let payment = client
//!     .payments()
//!     .create(&PaymentRequest::new(50_000, Currency::Sbtc, "Premium subscription"))
//!     .await?;
//! println!("pay at {}", payment.payment_url);
//! # Ok(())
//! # }
//! ```
//!
//! Receiving a webhook:
//!
//! ```rust
//! use sbtc_gateway::webhook;
//!
//! fn on_delivery(body: &[u8], signature: Option<&str>, secret: &str) -> u16 {
//!     match webhook::construct_event(body, signature, secret) {
//!         Ok(event) => {
//!             println!("{} for {}", event.event_type, event.payment().id);
//!             200
//!         }
//!         Err(e) => e.http_status(),
//!     }
//! }
//! ```

pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod merchant;
pub mod payments;
pub mod transport;
pub mod types;
pub mod webhook;

// Re-exports for convenience
pub use client::GatewayClient;
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use transport::RetryPolicy;
pub use types::*;
pub use webhook::Webhooks;

/// Current version of the SDK
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert!(!VERSION.is_empty());
        assert!(transport::USER_AGENT.ends_with(VERSION));
    }

    #[test]
    fn test_webhook_error_kinds_are_distinct() {
        let secret = "whsec_test";
        let body = br#"{"id":"evt_1"}"#;

        let unsigned = webhook::construct_event(body, None, secret).unwrap_err();
        let signature = crypto::compute_signature(body, secret);
        let malformed = webhook::construct_event(body, Some(&signature), secret).unwrap_err();

        assert_eq!(unsigned.http_status(), 401);
        assert_eq!(malformed.http_status(), 400);
    }
}
