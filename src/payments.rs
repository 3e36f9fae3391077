//! Payments API

use crate::transport::HttpTransport;
use crate::types::*;
use crate::{GatewayError, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Method;

/// Characters left unescaped in path segments
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Header carrying the per-call idempotency key on create requests
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

pub(crate) fn encode_id(id: &str) -> Result<String> {
    if id.trim().is_empty() {
        return Err(GatewayError::validation("Payment id cannot be empty"));
    }
    Ok(utf8_percent_encode(id, PATH_SEGMENT).to_string())
}

/// Typed wrapper over the `/payments` endpoints
#[derive(Debug, Clone)]
pub struct PaymentsApi {
    transport: HttpTransport,
}

impl PaymentsApi {
    /// Create a payments API over an existing transport
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    /// Create a payment
    ///
    /// A fresh idempotency key is generated per call and reused by its retries,
    /// so a retried create cannot produce a second payment.
    pub async fn create(&self, request: &PaymentRequest) -> Result<Payment> {
        request.validate()?;
        let body = serde_json::to_value(request)?;
        let idempotency_key = uuid::Uuid::new_v4().to_string();

        let response: PaymentResponse = self
            .transport
            .execute_with_headers(
                Method::POST,
                "/payments",
                Some(&body),
                &[],
                &[(IDEMPOTENCY_KEY_HEADER, idempotency_key)],
            )
            .await?;
        Ok(response.payment)
    }

    /// Retrieve a payment by id
    pub async fn retrieve(&self, id: &str) -> Result<Payment> {
        let path = format!("/payments/{}", encode_id(id)?);
        let response: PaymentResponse = self.transport.execute(Method::GET, &path, None, &[]).await?;
        Ok(response.payment)
    }

    /// List payments
    pub async fn list(&self, params: &ListPaymentsParams) -> Result<PaymentList> {
        params.validate()?;
        let response: PaymentListResponse = self
            .transport
            .execute(Method::GET, "/payments", None, &params.to_query())
            .await?;
        Ok(PaymentList {
            payments: response.payments,
            pagination: response.pagination,
        })
    }

    /// Cancel a pending payment
    pub async fn cancel(&self, id: &str) -> Result<Payment> {
        let path = format!("/payments/{}/cancel", encode_id(id)?);
        let response: PaymentResponse = self.transport.execute(Method::POST, &path, None, &[]).await?;
        Ok(response.payment)
    }
}
