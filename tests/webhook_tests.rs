//! Webhook verification and event parsing tests

use sbtc_gateway::{
    crypto::{compute_signature, verify_signature},
    webhook, Currency, EventType, GatewayClient, GatewayError, Payment, PaymentStatus, Timestamp,
    WalletAddresses, WebhookEvent, WebhookEventData,
};
use serde_json::json;
use std::time::Duration;

const SECRET: &str = "whsec_test_secret";

const PAID_EVENT: &str = r#"{"id":"evt_1","type":"payment.paid","created":1700000000,"livemode":false,"data":{"payment":{"id":"pay_1","amount":50000,"currency":"sbtc","status":"paid","description":"Premium subscription","payment_url":"https://pay.sbtc-gateway.com/pay_1","qr_code":"data:image/png;base64,AAAA","wallet_addresses":{"bitcoin":"bc1qexample","stacks":"SP2EXAMPLE"},"expires_at":"2023-11-14T23:13:20Z","created_at":"2023-11-14T22:13:20Z","updated_at":1700000000,"confirmations":3,"transaction_hash":"0xabc123"}}}"#;

fn sample_payment() -> Payment {
    Payment {
        id: "pay_42".to_string(),
        amount: 125_000,
        currency: Currency::Btc,
        status: PaymentStatus::Completed,
        description: "Hardware wallet".to_string(),
        payment_url: "https://pay.sbtc-gateway.com/pay_42".to_string(),
        qr_code: "qr".to_string(),
        wallet_addresses: WalletAddresses {
            bitcoin: Some("bc1qexample".to_string()),
            stacks: None,
        },
        expires_at: Timestamp::from("2024-01-01T01:00:00Z"),
        created_at: Timestamp::Unix(1_704_067_200),
        updated_at: Timestamp::from("2024-01-01T00:10:00Z"),
        customer: None,
        confirmations: Some(6),
        transaction_hash: Some("0xdef456".to_string()),
        metadata: json!({"order_id": "order_123"}).as_object().cloned(),
        timeline: None,
    }
}

#[test]
fn test_paid_event_scenario() {
    let signature = compute_signature(PAID_EVENT.as_bytes(), SECRET);
    let event = webhook::construct_event(PAID_EVENT.as_bytes(), Some(&signature), SECRET).unwrap();

    assert_eq!(event.id, "evt_1");
    assert_eq!(event.event_type, EventType::PaymentPaid);
    assert_eq!(event.event_type.as_str(), "payment.paid");
    assert_eq!(event.data.payment.id, "pay_1");
    assert_eq!(event.payment().amount, 50_000);
    assert_eq!(event.payment().currency, Currency::Sbtc);
    assert_eq!(event.payment().confirmations, Some(3));
    assert_eq!(event.payment().updated_at, Timestamp::Unix(1_700_000_000));
    assert!(!event.livemode);
}

#[test]
fn test_bad_signature_scenario() {
    let result = webhook::construct_event(PAID_EVENT.as_bytes(), Some("bad"), SECRET);
    match result {
        Err(GatewayError::InvalidSignature { .. }) => {}
        other => panic!("expected InvalidSignature, got {:?}", other),
    }
}

#[test]
fn test_sign_then_verify_holds_for_many_inputs() {
    let payloads: Vec<Vec<u8>> = vec![
        Vec::new(),
        b"x".to_vec(),
        PAID_EVENT.as_bytes().to_vec(),
        (0u8..=255).collect(),
        vec![0u8; 4096],
    ];
    let secrets = ["", "s", SECRET, "a much longer secret that exceeds the sha256 block size of sixty four bytes"];

    for payload in &payloads {
        for secret in &secrets {
            let signature = compute_signature(payload, secret);
            assert!(verify_signature(payload, Some(&signature), secret));
        }
    }
}

#[test]
fn test_any_single_byte_mutation_fails() {
    let payload = PAID_EVENT.as_bytes();
    let signature = compute_signature(payload, SECRET);

    for index in 0..payload.len() {
        for flip in [0x01u8, 0x80] {
            let mut mutated = payload.to_vec();
            mutated[index] ^= flip;
            assert!(
                !verify_signature(&mutated, Some(&signature), SECRET),
                "mutation at byte {} verified",
                index
            );
        }
    }
}

#[test]
fn test_missing_or_empty_header_returns_false() {
    let payload = PAID_EVENT.as_bytes();
    assert!(!verify_signature(payload, None, SECRET));
    assert!(!verify_signature(payload, Some(""), SECRET));

    let result = webhook::construct_event(payload, None, SECRET);
    assert!(matches!(result, Err(GatewayError::InvalidSignature { .. })));
}

#[test]
fn test_valid_signature_malformed_body() {
    let bodies: [&[u8]; 6] = [
        b"not json",
        b"[]",
        br#"{"id":"evt_1","type":"payment.paid","created":1700000000}"#,
        br#"{"type":"payment.paid","created":1,"data":{"payment":{}}}"#,
        br#"{"id":"evt_1","type":"payment.paid","created":-5,"data":{"payment":{}}}"#,
        br#"{"id":"evt_1","created":1,"data":{}}"#,
    ];

    for body in bodies {
        let signature = compute_signature(body, SECRET);
        let result = webhook::construct_event(body, Some(&signature), SECRET);
        match result {
            Err(error @ GatewayError::MalformedPayload { .. }) => {
                assert_eq!(error.http_status(), 400);
            }
            other => panic!("expected MalformedPayload, got {:?}", other),
        }
    }
}

#[test]
fn test_negative_amount_is_malformed() {
    let body = PAID_EVENT.replace("\"amount\":50000", "\"amount\":-50000");
    let signature = compute_signature(body.as_bytes(), SECRET);
    let result = webhook::construct_event(body.as_bytes(), Some(&signature), SECRET);
    assert!(matches!(result, Err(GatewayError::MalformedPayload { .. })));
}

#[test]
fn test_non_object_metadata_is_malformed() {
    let body = PAID_EVENT.replace(
        "\"transaction_hash\":\"0xabc123\"",
        "\"transaction_hash\":\"0xabc123\",\"metadata\":[\"order_123\"]",
    );
    assert!(body.contains("\"metadata\":[\"order_123\"]"));
    let signature = compute_signature(body.as_bytes(), SECRET);
    let result = webhook::construct_event(body.as_bytes(), Some(&signature), SECRET);
    assert!(matches!(result, Err(GatewayError::MalformedPayload { .. })));
}

#[test]
fn test_invalid_signature_wins_over_malformed_body() {
    let result = webhook::construct_event(b"not json", Some(&"0".repeat(64)), SECRET);
    assert!(matches!(result, Err(GatewayError::InvalidSignature { .. })));
}

#[test]
fn test_unknown_event_type_parses() {
    let body = PAID_EVENT.replace("payment.paid", "payment.refunded");
    let event = webhook::parse_event(body.as_bytes()).unwrap();

    assert_eq!(
        event.event_type,
        EventType::Unknown("payment.refunded".to_string())
    );
    assert!(!event.is_known());
    assert_eq!(event.payment().id, "pay_1");
}

#[test]
fn test_event_roundtrip() {
    let event = WebhookEvent {
        id: "evt_roundtrip".to_string(),
        event_type: EventType::PaymentCompleted,
        created: 1_704_067_800,
        livemode: true,
        data: WebhookEventData {
            payment: sample_payment(),
        },
    };

    let payload = serde_json::to_vec(&event).unwrap();
    let parsed = webhook::parse_event(&payload).unwrap();
    assert_eq!(parsed, event);

    let unknown = WebhookEvent {
        event_type: EventType::Unknown("payment.disputed".to_string()),
        ..event
    };
    let payload = serde_json::to_vec(&unknown).unwrap();
    assert_eq!(webhook::parse_event(&payload).unwrap(), unknown);
}

#[test]
fn test_missing_livemode_defaults_to_test_mode() {
    let body = PAID_EVENT.replace("\"livemode\":false,", "");
    let event = webhook::parse_event(body.as_bytes()).unwrap();
    assert!(!event.livemode);
}

#[test]
fn test_fresh_event_within_tolerance() {
    let now = chrono::Utc::now().timestamp();
    let body = PAID_EVENT.replace("1700000000,\"livemode\"", &format!("{},\"livemode\"", now));
    let signature = compute_signature(body.as_bytes(), SECRET);

    let event = webhook::construct_event_with_tolerance(
        body.as_bytes(),
        Some(&signature),
        SECRET,
        Duration::from_secs(300),
    )
    .unwrap();
    assert_eq!(event.created, now as u64);

    let stale = webhook::construct_event_with_tolerance(
        PAID_EVENT.as_bytes(),
        Some(&compute_signature(PAID_EVENT.as_bytes(), SECRET)),
        SECRET,
        Duration::from_secs(300),
    );
    assert!(matches!(stale, Err(GatewayError::StaleEvent { .. })));
}

#[test]
fn test_client_exposes_webhooks() {
    let client = GatewayClient::new("sk_test_123").unwrap();
    let webhooks = client.webhooks();
    let signature = compute_signature(PAID_EVENT.as_bytes(), SECRET);

    assert!(webhooks.verify_signature(PAID_EVENT.as_bytes(), Some(&signature), SECRET));
    let event = webhooks
        .construct_event(PAID_EVENT.as_bytes(), Some(&signature), SECRET)
        .unwrap();
    assert_eq!(event.payment().status, PaymentStatus::Paid);
}
