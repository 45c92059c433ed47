mod common;

use std::sync::Arc;

use certchain_indexer::decoder::RecordDecoder;
use certchain_indexer::listener::RawObject;
use certchain_indexer::{FixedClock, TimestampSource, Verifier};
use common::*;
use serde_json::json;

const NOW_MS: u64 = 1_750_000_000_000;

fn verifier(ledger: Arc<FakeLedger>) -> Verifier<Arc<FakeLedger>, FixedClock> {
    Verifier::new(
        ledger,
        RecordDecoder::new(config().type_names()),
        FixedClock(NOW_MS),
    )
}

#[tokio::test]
async fn test_malformed_identifiers_make_no_calls() {
    let ledger = Arc::new(FakeLedger::new());
    let verifier = verifier(ledger.clone());

    let verdict = verifier.verify("not-hex!!").await;
    assert!(!verdict.is_valid());
    assert!(verdict.error().unwrap().contains("hexadecimal"));
    assert!(verdict.record().is_none());

    let verdict = verifier.verify("0x01").await;
    assert!(!verdict.is_valid());
    assert!(verdict.error().unwrap().contains("too short"));

    let verdict = verifier.verify("").await;
    assert_eq!(verdict.error(), Some("Certificate ID is required"));

    let mut not_hex = object_id(1);
    not_hex.replace_range(5..6, "g");
    let verdict = verifier.verify(&not_hex).await;
    assert!(verdict.error().unwrap().contains("non-hexadecimal"));

    assert_eq!(ledger.total_calls(), 0);
}

#[tokio::test]
async fn test_valid_credential() {
    let id = object_id(7);
    let ledger = Arc::new(FakeLedger::new().with_object(certificate(&id, HOLDER, ISSUER)));
    let verifier = verifier(ledger.clone());

    let verdict = verifier.verify(&id).await;

    assert!(verdict.is_valid());
    assert_eq!(verdict.is_expired(), Some(false));
    assert_eq!(verdict.error(), None);
    let record = verdict.record().unwrap();
    assert_eq!(record.id, id);
    assert_eq!(record.issuer_address, ISSUER);
    assert_eq!(record.issued_at_source, TimestampSource::Ledger);
    assert_eq!(FakeLedger::calls(&ledger.object_calls), 1);
}

#[tokio::test]
async fn test_expired_credential_is_still_valid() {
    let id = object_id(8);
    let mut raw = certificate(&id, HOLDER, ISSUER);
    if let Some(content) = raw.content.as_mut() {
        content.fields.as_mut().unwrap()["expires_at"] = json!((NOW_MS - 1).to_string());
    }
    let ledger = Arc::new(FakeLedger::new().with_object(raw));

    let verdict = verifier(ledger).verify(&id).await;

    assert!(verdict.is_valid());
    assert_eq!(verdict.is_expired(), Some(true));
}

#[tokio::test]
async fn test_not_found() {
    let ledger = Arc::new(FakeLedger::new());
    let verdict = verifier(ledger.clone()).verify(&object_id(9)).await;

    assert!(!verdict.is_valid());
    assert_eq!(verdict.error(), Some("Certificate not found on chain"));
    assert_eq!(FakeLedger::calls(&ledger.object_calls), 1);
}

#[tokio::test]
async fn test_wrong_type() {
    let id = object_id(10);
    let coin = RawObject::new(&id, "0x2::coin::Coin<0x2::sui::SUI>", json!({"balance": "5"}));
    let ledger = Arc::new(FakeLedger::new().with_object(coin));

    let verdict = verifier(ledger).verify(&id).await;

    assert!(!verdict.is_valid());
    assert!(verdict
        .error()
        .unwrap()
        .starts_with("Object is not a valid certificate"));
}

#[tokio::test]
async fn test_invalid_structure() {
    let id = object_id(11);
    let hollow = RawObject::new(&id, credential_type(), json!({}));
    let ledger = Arc::new(FakeLedger::new().with_object(hollow));

    let verdict = verifier(ledger).verify(&id).await;

    assert_eq!(verdict.error(), Some("Certificate has an invalid structure"));
}

#[tokio::test]
async fn test_transport_failure_is_a_verdict() {
    let id = object_id(12);
    let mut ledger = FakeLedger::new();
    ledger.failing_lookups.insert(id.clone());

    let verdict = verifier(Arc::new(ledger)).verify(&id).await;

    assert!(!verdict.is_valid());
    assert!(verdict
        .error()
        .unwrap()
        .starts_with("Failed to fetch certificate"));
}

#[tokio::test]
async fn test_credential_without_marker_fields_is_valid() {
    let id = object_id(13);
    let sparse = RawObject::new(
        &id,
        credential_type(),
        json!({
            "title": "Rust 101",
            "description": "d",
            "issued_at": "1700000000000",
            "expires_at": "0"
        }),
    );
    let ledger = Arc::new(FakeLedger::new().with_object(sparse));

    let verdict = verifier(ledger).verify(&id).await;

    assert!(verdict.is_valid(), "{:?}", verdict.error());
    let record = verdict.record().unwrap();
    assert_eq!(record.title, "Rust 101");
    assert_eq!(record.issued_at_ms, 1_700_000_000_000);
}
