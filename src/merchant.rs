//! Merchant API

use crate::transport::HttpTransport;
use crate::types::{Merchant, MerchantResponse, MerchantUpdate};
use crate::{GatewayError, Result};
use reqwest::Method;

const MERCHANT_PATH: &str = "/merchants/me";

/// Typed wrapper over the merchant account endpoints
#[derive(Debug, Clone)]
pub struct MerchantApi {
    transport: HttpTransport,
}

impl MerchantApi {
    /// Create a merchant API over an existing transport
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    /// Retrieve the merchant that owns the API key
    pub async fn retrieve(&self) -> Result<Merchant> {
        let response: MerchantResponse = self
            .transport
            .execute(Method::GET, MERCHANT_PATH, None, &[])
            .await?;
        Ok(response.merchant)
    }

    /// Update the merchant profile
    pub async fn update(&self, update: &MerchantUpdate) -> Result<Merchant> {
        if update.is_empty() {
            return Err(GatewayError::validation("Merchant update has no fields set"));
        }
        let body = serde_json::to_value(update)?;
        let response: MerchantResponse = self
            .transport
            .execute(Method::PUT, MERCHANT_PATH, Some(&body), &[])
            .await?;
        Ok(response.merchant)
    }
}
