mod common;

use std::sync::Arc;

use certchain_indexer::listener::RawObject;
use certchain_indexer::{collector_badges, Engine, FixedClock, TimestampSource};
use common::*;
use serde_json::json;

const NOW_MS: u64 = 1_750_000_000_000;

fn engine(ledger: Arc<FakeLedger>) -> Engine<FakeLedger, FixedClock> {
    Engine::new(ledger, &config(), FixedClock(NOW_MS))
}

fn profile_object() -> RawObject {
    RawObject::new(
        object_id(100),
        format!("{PACKAGE}::certificate::UserProfile"),
        json!({
            "owner": HOLDER,
            "display_name": "Ada",
            "total_certs": "2",
            "trust_rank": 1,
            "reputation": "15",
            "joined_at": "1690000000000"
        }),
    )
}

fn admin_cap_object() -> RawObject {
    RawObject::new(
        object_id(200),
        format!("{PACKAGE}::certificate::AdminCap"),
        json!({
            "institution_name": "Rust Academy",
            "institution_address": INSTITUTION,
            "total_issued": "7",
            "authorized_types": [1, 2]
        }),
    )
}

fn undated_certificate(id: &str) -> RawObject {
    RawObject::new(
        id,
        credential_type(),
        json!({"owner": HOLDER, "issuer": ISSUER, "title": "Undated"}),
    )
}

#[tokio::test]
async fn test_held_by_keeps_only_credentials() {
    let (a, b) = (object_id(1), object_id(2));
    let ledger = Arc::new(
        FakeLedger::new()
            .with_owned(HOLDER, certificate(&a, HOLDER, ISSUER))
            .with_owned(HOLDER, profile_object())
            .with_owned(
                HOLDER,
                RawObject::new(
                    object_id(300),
                    "0x2::coin::Coin<0x2::sui::SUI>",
                    json!({"balance": "1"}),
                ),
            )
            .with_owned(HOLDER, undated_certificate(&b)),
    );

    let holdings = engine(ledger.clone()).held_by(HOLDER).await;

    let records = holdings.credentials.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].issued_at_source, TimestampSource::Ledger);
    // Outermost decode fills missing issuance time from the clock.
    assert_eq!(records[1].issued_at_ms, NOW_MS);
    assert_eq!(records[1].issued_at_source, TimestampSource::Fallback);
    assert_eq!(holdings.credentials.by_owner(HOLDER).len(), 2);
    assert_eq!(holdings.skipped, 0);
    assert_eq!(FakeLedger::calls(&ledger.owned_calls), 1);
}

#[tokio::test]
async fn test_held_by_skips_broken_credentials() {
    let a = object_id(1);
    let ledger = Arc::new(
        FakeLedger::new()
            .with_owned(HOLDER, certificate(&a, HOLDER, ISSUER))
            .with_owned(HOLDER, RawObject::new(object_id(2), credential_type(), json!({}))),
    );

    let holdings = engine(ledger).held_by(HOLDER).await;

    assert_eq!(holdings.credentials.len(), 1);
    assert_eq!(holdings.skipped, 1);
}

#[tokio::test]
async fn test_held_by_listing_failure_is_a_notice() {
    let mut ledger = FakeLedger::new();
    ledger.fail_owned = true;

    let holdings = engine(Arc::new(ledger)).held_by(HOLDER).await;

    assert!(holdings.credentials.is_empty());
    assert_eq!(holdings.notices.len(), 1);
}

#[tokio::test]
async fn test_profile_and_caps() {
    let ledger = Arc::new(
        FakeLedger::new()
            .with_owned(HOLDER, profile_object())
            .with_owned(ISSUER, admin_cap_object()),
    );
    let engine = engine(ledger);

    let profile = engine.profile_of(HOLDER).await.unwrap();
    assert_eq!(profile.display_name, "Ada");
    assert_eq!(profile.reputation, 15);
    assert_eq!(profile.joined_at_ms, 1_690_000_000_000);
    assert!(engine.profile_of(ISSUER).await.is_none());

    let caps = engine.admin_caps_of(ISSUER).await;
    assert_eq!(caps.len(), 1);
    assert_eq!(caps[0].total_issued, 7);
    assert!(engine.admin_caps_of(HOLDER).await.is_empty());
}

#[tokio::test]
async fn test_issuer_target_uses_capability_institution() {
    let ledger = Arc::new(FakeLedger::new().with_owned(ISSUER, admin_cap_object()));
    let engine = engine(ledger);

    let target = engine.issuer_target(ISSUER, None).await;
    assert_eq!(target.institution_address.as_deref(), Some(INSTITUTION));

    let explicit = engine.issuer_target(ISSUER, Some(HOLDER)).await;
    assert_eq!(explicit.institution_address.as_deref(), Some(HOLDER));
}

#[tokio::test]
async fn test_badges_from_holdings() {
    let mut ledger = FakeLedger::new();
    for n in 1..=5 {
        ledger = ledger.with_owned(HOLDER, certificate(&object_id(n), HOLDER, ISSUER));
    }
    let engine = engine(Arc::new(ledger));

    let holdings = engine.held_by(HOLDER).await;
    let badges = collector_badges(holdings.credentials.records(), false, NOW_MS);

    let bronze = badges.iter().find(|b| b.id == "collector-bronze").unwrap();
    assert!(bronze.earned);
    assert_eq!(bronze.earned_at_ms, Some(1_700_000_000_000));
}
