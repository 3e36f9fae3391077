//! Example: create, retrieve, list and cancel payments

use sbtc_gateway::{
    Currency, Customer, GatewayClient, GatewayConfig, GatewayError, ListPaymentsParams,
    PaymentRequest, PaymentStatus,
};
use serde_json::json;
use std::time::Duration;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(_) => GatewayConfig::new("sk_test_your_api_key_here"),
    }
    .with_timeout(Duration::from_secs(30))
    .with_max_retries(3);
    let client = GatewayClient::with_config(config)?;

    if let Err(e) = run(&client).await {
        println!("❌ SDK error: {}", e.message());
        if let Some(code) = e.code() {
            println!("Error code: {}", code);
        }
        if let Some(details) = e.details() {
            println!("Error details: {}", details);
        }
        if let GatewayError::Authentication { .. } = e {
            println!("Check SBTC_GATEWAY_API_KEY");
        }
    }

    Ok(())
}

async fn run(client: &GatewayClient) -> sbtc_gateway::Result<()> {
    println!("🚀 Creating a payment...");
    let request = PaymentRequest::new(50_000, Currency::Sbtc, "Premium subscription")
        .with_customer(
            Customer::new()
                .with_email("customer@example.com")
                .with_name("John Doe"),
        )
        .with_metadata(json!({"order_id": "order_123", "user_id": "456"}))
        .with_webhook_url("https://yoursite.com/webhook")
        .with_redirect_url("https://yoursite.com/success")
        .with_expires_in(3600);

    let payment = client.payments().create(&request).await?;
    println!("✅ Payment {} created ({} BTC)", payment.id, payment.amount_in_btc());
    println!("Payment URL: {}", payment.payment_url);

    let retrieved = client.payments().retrieve(&payment.id).await?;
    println!("📋 Retrieved payment status: {}", retrieved.status);

    let list = client
        .payments()
        .list(
            &ListPaymentsParams::new()
                .with_page(1)
                .with_limit(10)
                .with_status(PaymentStatus::Pending),
        )
        .await?;
    println!(
        "📄 Found {} payments (page {}, {} total)",
        list.payments.len(),
        list.pagination.page,
        list.pagination.total
    );

    if payment.status == PaymentStatus::Pending {
        let cancelled = client.payments().cancel(&payment.id).await?;
        println!("❌ Payment cancelled: {}", cancelled.status);
    }

    Ok(())
}
