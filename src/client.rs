//! Gateway client

use crate::config::GatewayConfig;
use crate::merchant::MerchantApi;
use crate::payments::PaymentsApi;
use crate::transport::HttpTransport;
use crate::webhook::Webhooks;
use crate::Result;

/// Entry point to the sBTC gateway API
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    config: GatewayConfig,
    payments: PaymentsApi,
    merchant: MerchantApi,
}

impl GatewayClient {
    /// Create a client with default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(GatewayConfig::new(api_key))
    }

    /// Create a client with custom configuration
    pub fn with_config(config: GatewayConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        if !config.is_live() {
            tracing::debug!(base_url = %config.base_url, "gateway client using a non-live API key");
        }

        Ok(Self {
            payments: PaymentsApi::new(transport.clone()),
            merchant: MerchantApi::new(transport),
            config,
        })
    }

    /// Create a client from `SBTC_GATEWAY_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::with_config(GatewayConfig::from_env()?)
    }

    /// Payments API
    pub fn payments(&self) -> &PaymentsApi {
        &self.payments
    }

    /// Merchant API
    pub fn merchant(&self) -> &MerchantApi {
        &self.merchant
    }

    /// Webhook helpers
    pub fn webhooks(&self) -> Webhooks {
        Webhooks::new()
    }

    /// Get the client configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
