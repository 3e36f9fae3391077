//! Core types for the sBTC gateway API and webhook events

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Satoshis per bitcoin
pub const SATOSHIS_PER_BTC: u64 = 100_000_000;

/// Currencies accepted by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Sbtc,
    Btc,
    Stx,
}

impl Currency {
    /// Get the wire identifier for this currency
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Sbtc => "sbtc",
            Currency::Btc => "btc",
            Currency::Stx => "stx",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Completed,
    Failed,
    Expired,
}

impl PaymentStatus {
    /// Get the wire identifier for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Expired => "expired",
        }
    }

    /// Whether no further transitions are expected
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Completed | PaymentStatus::Failed | PaymentStatus::Expired
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timestamp exactly as the gateway sent it
///
/// The gateway emits either ISO-8601 strings or unix seconds depending on the
/// field and API version. The raw form is preserved so re-serialization does
/// not change the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Unix(i64),
    Text(String),
}

impl Timestamp {
    /// Interpret the timestamp as a UTC date, if it is in a recognised form
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::Unix(secs) => DateTime::from_timestamp(*secs, 0),
            Timestamp::Text(text) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

impl From<&str> for Timestamp {
    fn from(value: &str) -> Self {
        Timestamp::Text(value.to_string())
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Timestamp::Unix(value)
    }
}

/// Customer information attached to a payment request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Customer {
    /// Create an empty customer record
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the customer email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the customer name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the merchant-side customer id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Request body for creating a payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Amount in satoshis
    pub amount: u64,
    pub currency: Currency,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    /// Seconds until the payment expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

impl PaymentRequest {
    /// Create a new payment request
    pub fn new(amount: u64, currency: Currency, description: impl Into<String>) -> Self {
        Self {
            amount,
            currency,
            description: description.into(),
            customer: None,
            metadata: None,
            webhook_url: None,
            redirect_url: None,
            expires_in: None,
        }
    }

    /// Attach customer information
    pub fn with_customer(mut self, customer: Customer) -> Self {
        self.customer = Some(customer);
        self
    }

    /// Attach arbitrary merchant metadata
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Override the webhook URL for this payment
    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    /// Set where the customer is sent after paying
    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }

    /// Set the expiry in seconds
    pub fn with_expires_in(mut self, seconds: u64) -> Self {
        self.expires_in = Some(seconds);
        self
    }

    /// Check the request shape before it is sent
    pub fn validate(&self) -> crate::Result<()> {
        if self.amount == 0 {
            return Err(crate::GatewayError::validation(
                "Payment amount must be greater than zero",
            ));
        }
        if self.description.trim().is_empty() {
            return Err(crate::GatewayError::validation(
                "Payment description cannot be empty",
            ));
        }
        if let Some(metadata) = &self.metadata {
            if !metadata.is_object() {
                return Err(crate::GatewayError::validation(
                    "Payment metadata must be a JSON object",
                ));
            }
        }
        Ok(())
    }
}

/// Deposit addresses for a payment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletAddresses {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitcoin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stacks: Option<String>,
}

/// Customer details as reported on a payment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentCustomer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
}

/// One entry of a payment's status history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub status: String,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u64>,
}

/// A payment as owned by the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    /// Amount in satoshis
    pub amount: u64,
    pub currency: Currency,
    pub status: PaymentStatus,
    pub description: String,
    pub payment_url: String,
    pub qr_code: String,
    pub wallet_addresses: WalletAddresses,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<PaymentCustomer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Vec<TimelineEntry>>,
}

impl Payment {
    /// Get the amount in whole-coin units (e.g. 0.0005 for 50000 sats)
    pub fn amount_in_btc(&self) -> Decimal {
        Decimal::from(self.amount) / Decimal::from(SATOSHIS_PER_BTC)
    }

    /// Whether the payment reached a terminal status
    pub fn is_final(&self) -> bool {
        self.status.is_final()
    }
}

/// Pagination information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub has_more: bool,
}

/// A page of payments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentList {
    pub payments: Vec<Payment>,
    pub pagination: PaginationInfo,
}

/// Filters for listing payments
#[derive(Debug, Clone, Default)]
pub struct ListPaymentsParams {
    /// Page number, starting at 1
    pub page: Option<u32>,
    /// Results per page (1..=100)
    pub limit: Option<u32>,
    /// Only return payments in this status
    pub status: Option<PaymentStatus>,
}

impl ListPaymentsParams {
    /// Maximum page size accepted by the gateway
    pub const MAX_LIMIT: u32 = 100;

    /// Create empty list filters
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the page size
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Filter by status
    pub fn with_status(mut self, status: PaymentStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Check the filters before they are sent
    pub fn validate(&self) -> crate::Result<()> {
        if self.page == Some(0) {
            return Err(crate::GatewayError::validation("Page numbers start at 1"));
        }
        if let Some(limit) = self.limit {
            if limit == 0 || limit > Self::MAX_LIMIT {
                return Err(crate::GatewayError::validation(format!(
                    "Limit must be between 1 and {}",
                    Self::MAX_LIMIT
                )));
            }
        }
        Ok(())
    }

    /// Render the filters as query pairs, omitting unset ones
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(status) = self.status {
            query.push(("status", status.as_str().to_string()));
        }
        query
    }
}

fn default_verification_level() -> String {
    "none".to_string()
}

/// Merchant account information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merchant {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stacks_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitcoin_address: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default = "default_verification_level")]
    pub verification_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

/// Partial update of the merchant record; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MerchantUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stacks_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitcoin_address: Option<String>,
}

impl MerchantUpdate {
    /// Create an empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the merchant name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the business name
    pub fn with_business_name(mut self, business_name: impl Into<String>) -> Self {
        self.business_name = Some(business_name.into());
        self
    }

    /// Set the business type
    pub fn with_business_type(mut self, business_type: impl Into<String>) -> Self {
        self.business_type = Some(business_type.into());
        self
    }

    /// Set the Stacks payout address
    pub fn with_stacks_address(mut self, address: impl Into<String>) -> Self {
        self.stacks_address = Some(address.into());
        self
    }

    /// Set the Bitcoin payout address
    pub fn with_bitcoin_address(mut self, address: impl Into<String>) -> Self {
        self.bitcoin_address = Some(address.into());
        self
    }

    /// Whether the update would change nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn default_success() -> bool {
    true
}

/// `{success, payment}` envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    pub payment: Payment,
}

/// `{success, payments, pagination}` envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentListResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    pub payments: Vec<Payment>,
    pub pagination: PaginationInfo,
}

/// `{success, merchant}` envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    pub merchant: Merchant,
}

/// Webhook event type
///
/// Types this SDK does not know yet are kept verbatim in `Unknown` so newer
/// gateways do not break older receivers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    PaymentCreated,
    PaymentPaid,
    PaymentCompleted,
    PaymentFailed,
    PaymentExpired,
    Unknown(String),
}

impl EventType {
    /// Get the wire identifier for this event type
    pub fn as_str(&self) -> &str {
        match self {
            EventType::PaymentCreated => event_types::PAYMENT_CREATED,
            EventType::PaymentPaid => event_types::PAYMENT_PAID,
            EventType::PaymentCompleted => event_types::PAYMENT_COMPLETED,
            EventType::PaymentFailed => event_types::PAYMENT_FAILED,
            EventType::PaymentExpired => event_types::PAYMENT_EXPIRED,
            EventType::Unknown(raw) => raw,
        }
    }

    /// Whether this is one of the documented event types
    pub fn is_known(&self) -> bool {
        !matches!(self, EventType::Unknown(_))
    }
}

impl From<&str> for EventType {
    fn from(value: &str) -> Self {
        match value {
            event_types::PAYMENT_CREATED => EventType::PaymentCreated,
            event_types::PAYMENT_PAID => EventType::PaymentPaid,
            event_types::PAYMENT_COMPLETED => EventType::PaymentCompleted,
            event_types::PAYMENT_FAILED => EventType::PaymentFailed,
            event_types::PAYMENT_EXPIRED => EventType::PaymentExpired,
            other => EventType::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(EventType::from(raw.as_str()))
    }
}

/// Payload of a webhook event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEventData {
    pub payment: Payment,
}

/// A verified webhook delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Unix seconds at which the gateway created the event
    pub created: u64,
    #[serde(default)]
    pub livemode: bool,
    pub data: WebhookEventData,
}

impl WebhookEvent {
    /// The payment this event is about
    pub fn payment(&self) -> &Payment {
        &self.data.payment
    }

    /// Whether the event type is one this SDK knows
    pub fn is_known(&self) -> bool {
        self.event_type.is_known()
    }

    /// Creation time as a UTC date
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.created)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// Documented webhook event type identifiers
pub mod event_types {
    pub const PAYMENT_CREATED: &str = "payment.created";
    pub const PAYMENT_PAID: &str = "payment.paid";
    pub const PAYMENT_COMPLETED: &str = "payment.completed";
    pub const PAYMENT_FAILED: &str = "payment.failed";
    pub const PAYMENT_EXPIRED: &str = "payment.expired";

    /// Get all documented event types
    pub fn all() -> Vec<&'static str> {
        vec![
            PAYMENT_CREATED,
            PAYMENT_PAID,
            PAYMENT_COMPLETED,
            PAYMENT_FAILED,
            PAYMENT_EXPIRED,
        ]
    }
}
