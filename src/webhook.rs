//! Webhook verification and event parsing
//!
//! Receivers pass the raw request body and the `X-Signature` header value to
//! [`construct_event`]. The body must not be decoded and re-encoded before
//! verification; the signature covers the exact bytes the gateway sent.
//!
//! Deliveries may be retried by the gateway, so the same event `id` can be
//! seen more than once. Deduplication is left to the receiver.

use crate::crypto;
use crate::types::WebhookEvent;
use crate::{GatewayError, Result};
use std::time::Duration;

/// Header carrying the webhook signature
pub const SIGNATURE_HEADER: &str = "X-Signature";

/// Verify a webhook signature; see [`crypto::verify_signature`]
pub fn verify_signature(payload: &[u8], signature: Option<&str>, secret: &str) -> bool {
    crypto::verify_signature(payload, signature, secret)
}

/// Parse an already verified payload into a typed event
pub fn parse_event(payload: &[u8]) -> Result<WebhookEvent> {
    serde_json::from_slice(payload).map_err(|e| GatewayError::malformed_payload(e.to_string()))
}

/// Verify and parse a webhook delivery
///
/// Fails with [`GatewayError::InvalidSignature`] when the signature does not
/// match, and with [`GatewayError::MalformedPayload`] when a correctly signed
/// body is not a valid event.
pub fn construct_event(
    payload: &[u8],
    signature: Option<&str>,
    secret: &str,
) -> Result<WebhookEvent> {
    if !verify_signature(payload, signature, secret) {
        tracing::debug!(
            signature_present = signature.is_some(),
            payload_len = payload.len(),
            "webhook signature rejected"
        );
        return Err(GatewayError::invalid_signature(
            "Signature does not match payload",
        ));
    }

    let event = parse_event(payload)?;
    tracing::debug!(
        event_id = %event.id,
        event_type = %event.event_type,
        livemode = event.livemode,
        "webhook event verified"
    );
    Ok(event)
}

/// Like [`construct_event`], additionally rejecting events created more than
/// `tolerance` away from the current time
pub fn construct_event_with_tolerance(
    payload: &[u8],
    signature: Option<&str>,
    secret: &str,
    tolerance: Duration,
) -> Result<WebhookEvent> {
    let event = construct_event(payload, signature, secret)?;
    check_freshness(&event, chrono::Utc::now().timestamp(), tolerance)?;
    Ok(event)
}

fn check_freshness(event: &WebhookEvent, now: i64, tolerance: Duration) -> Result<()> {
    let created = i64::try_from(event.created).unwrap_or(i64::MAX);
    let age_secs = now.saturating_sub(created);
    let limit = i64::try_from(tolerance.as_secs()).unwrap_or(i64::MAX);

    if age_secs.unsigned_abs() > limit.unsigned_abs() {
        tracing::debug!(event_id = %event.id, age_secs, "webhook event outside tolerance");
        return Err(GatewayError::StaleEvent {
            event_id: event.id.clone(),
            age_secs,
        });
    }
    Ok(())
}

/// Stateless handle to the webhook helpers, exposed by the gateway client
#[derive(Debug, Clone, Copy, Default)]
pub struct Webhooks;

impl Webhooks {
    /// Create a new handle
    pub fn new() -> Self {
        Self
    }

    /// Verify a webhook signature
    pub fn verify_signature(&self, payload: &[u8], signature: Option<&str>, secret: &str) -> bool {
        verify_signature(payload, signature, secret)
    }

    /// Parse an already verified payload
    pub fn parse_event(&self, payload: &[u8]) -> Result<WebhookEvent> {
        parse_event(payload)
    }

    /// Verify and parse a webhook delivery
    pub fn construct_event(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        secret: &str,
    ) -> Result<WebhookEvent> {
        construct_event(payload, signature, secret)
    }

    /// Verify and parse a webhook delivery within a replay window
    pub fn construct_event_with_tolerance(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        secret: &str,
        tolerance: Duration,
    ) -> Result<WebhookEvent> {
        construct_event_with_tolerance(payload, signature, secret, tolerance)
    }
}
