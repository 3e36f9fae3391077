//! Example: verify a webhook delivery and dispatch on its type
//!
//! A real receiver gets `body` and the `X-Signature` header from its HTTP
//! framework; the body must be passed on unmodified.

use sbtc_gateway::{crypto, webhook, EventType, GatewayError, Payment, WebhookEvent};
use std::time::Duration;

const WEBHOOK_SECRET: &str = "whsec_your_webhook_secret_here";

fn main() {
    tracing_subscriber::fmt::init();

    let created = chrono::Utc::now().timestamp();
    let body = format!(
        r#"{{"id":"evt_demo","type":"payment.paid","created":{},"livemode":false,"data":{{"payment":{{"id":"pay_demo","amount":50000,"currency":"sbtc","status":"paid","description":"Premium subscription","payment_url":"https://pay.sbtc-gateway.com/pay_demo","qr_code":"qr","wallet_addresses":{{}},"expires_at":"2024-01-01T01:00:00Z","created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:05:00Z","confirmations":1,"transaction_hash":"0xabc"}}}}}}"#,
        created
    );
    let signature = crypto::compute_signature(body.as_bytes(), WEBHOOK_SECRET);

    let status = receive(body.as_bytes(), Some(&signature));
    println!("Responding with {}", status);

    let status = receive(body.as_bytes(), Some("bad"));
    println!("Responding with {}", status);
}

fn receive(body: &[u8], signature: Option<&str>) -> u16 {
    match webhook::construct_event_with_tolerance(
        body,
        signature,
        WEBHOOK_SECRET,
        Duration::from_secs(300),
    ) {
        Ok(event) => {
            dispatch(&event);
            200
        }
        Err(e @ GatewayError::InvalidSignature { .. }) => {
            println!("❌ {}", e);
            e.http_status()
        }
        Err(e) => {
            println!("❌ Webhook processing error: {}", e);
            e.http_status()
        }
    }
}

// Deliveries can repeat; a real handler records `event.id` and skips duplicates.
fn dispatch(event: &WebhookEvent) {
    let payment: &Payment = event.payment();
    match &event.event_type {
        EventType::PaymentCreated => println!("🆕 Payment created: {}", payment.id),
        EventType::PaymentPaid => println!(
            "💰 Payment paid: {} tx={:?} confirmations={:?}",
            payment.id, payment.transaction_hash, payment.confirmations
        ),
        EventType::PaymentCompleted => println!("✅ Payment completed: {}", payment.id),
        EventType::PaymentFailed => println!("💥 Payment failed: {}", payment.id),
        EventType::PaymentExpired => println!("⏰ Payment expired: {}", payment.id),
        EventType::Unknown(raw) => println!("🤷 Unhandled event type: {}", raw),
    }
}
