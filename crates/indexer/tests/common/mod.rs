//! In-memory ledger used by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use certchain_indexer::config::Config;
use certchain_indexer::error::LookupError;
use certchain_indexer::listener::raw::{EventId, RawEvent, RawObject, RawTransaction};
use certchain_indexer::listener::{EventFilter, Order, ReadService, TransactionFilter};
use serde_json::json;

pub const PACKAGE: &str = "0x5f1ee4e8a9b0c1d2e3f405162738495a6b7c8d9e0f1a2b3c4d5e6f708192a3b4";
pub const ISSUER: &str = "0x00000000000000000000000000000000000000000000000000000000000000a1";
pub const INSTITUTION: &str = "0x00000000000000000000000000000000000000000000000000000000000000b2";
pub const HOLDER: &str = "0x00000000000000000000000000000000000000000000000000000000000000c3";

pub fn config() -> Config {
    Config::from_toml_str(&format!(
        r#"
[network]
rpc_url = "http://127.0.0.1:9000"

[contracts]
package_id = "{PACKAGE}"
"#
    ))
    .unwrap()
}

pub fn credential_type() -> String {
    format!("{PACKAGE}::certificate::Certificate")
}

pub fn event_type() -> String {
    format!("{PACKAGE}::certificate::CertificateIssued")
}

/// A full-length object id ending in `n`.
pub fn object_id(n: u32) -> String {
    format!("0x{n:064x}")
}

pub fn certificate(id: &str, owner: &str, issuer: &str) -> RawObject {
    RawObject::new(
        id,
        credential_type(),
        json!({
            "id": {"id": id},
            "owner": owner,
            "issuer": issuer,
            "issuer_name": "Rust Academy",
            "cert_type": 1,
            "title": format!("Certificate {id}"),
            "description": "Completed the course",
            "pinata_cid": "bafyexample",
            "ipfs_url": "",
            "issued_at": "1700000000000",
            "expires_at": "0",
            "trust_rank": 1
        }),
    )
}

pub fn issuance_event(credential_id: &str, issuer: &str) -> RawEvent {
    RawEvent {
        id: Some(EventId {
            tx_digest: format!("tx-{credential_id}"),
            event_seq: "0".to_string(),
        }),
        event_type: event_type(),
        sender: Some(issuer.to_string()),
        parsed_json: Some(json!({
            "certificate_id": credential_id,
            "issuer": issuer,
            "recipient": HOLDER
        })),
    }
}

pub fn transaction(digest: &str, events: Vec<RawEvent>) -> RawTransaction {
    RawTransaction {
        digest: digest.to_string(),
        events: Some(events),
    }
}

/// Ledger state plus per-method call counters and failure switches.
#[derive(Default)]
pub struct FakeLedger {
    pub objects: HashMap<String, RawObject>,
    pub owned: HashMap<String, Vec<RawObject>>,
    pub events: Vec<RawEvent>,
    pub transactions: Vec<RawTransaction>,

    pub fail_events: bool,
    pub fail_transactions: bool,
    pub fail_owned: bool,
    pub failing_lookups: HashSet<String>,

    pub owned_calls: AtomicUsize,
    pub object_calls: AtomicUsize,
    pub event_calls: AtomicUsize,
    pub transaction_calls: AtomicUsize,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, raw: RawObject) -> Self {
        let id = raw.object_id.clone().unwrap_or_default();
        self.objects.insert(id, raw);
        self
    }

    pub fn with_owned(mut self, owner: &str, raw: RawObject) -> Self {
        self.owned.entry(owner.to_string()).or_default().push(raw);
        self
    }

    pub fn with_event(mut self, event: RawEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_transaction(mut self, tx: RawTransaction) -> Self {
        self.transactions.push(tx);
        self
    }

    pub fn total_calls(&self) -> usize {
        self.owned_calls.load(Ordering::SeqCst)
            + self.object_calls.load(Ordering::SeqCst)
            + self.event_calls.load(Ordering::SeqCst)
            + self.transaction_calls.load(Ordering::SeqCst)
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReadService for FakeLedger {
    async fn get_owned_objects(&self, owner: &str) -> Result<Vec<RawObject>, LookupError> {
        self.owned_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_owned {
            return Err(LookupError::Unavailable("owned objects offline".to_string()));
        }
        Ok(self.owned.get(owner).cloned().unwrap_or_default())
    }

    async fn get_object(&self, id: &str) -> Result<Option<RawObject>, LookupError> {
        self.object_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_lookups.contains(id) {
            return Err(LookupError::Rpc {
                code: -32000,
                message: format!("lookup of {id} timed out"),
            });
        }
        Ok(self.objects.get(id).cloned())
    }

    async fn query_events(
        &self,
        filter: &EventFilter,
        limit: usize,
        order: Order,
    ) -> Result<Vec<RawEvent>, LookupError> {
        self.event_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_events {
            return Err(LookupError::Unavailable("event index offline".to_string()));
        }

        let EventFilter::MoveEventType(wanted) = filter;
        // `events` is stored oldest first.
        let mut events: Vec<_> = self
            .events
            .iter()
            .filter(|e| &e.event_type == wanted)
            .cloned()
            .collect();
        if order == Order::Descending {
            events.reverse();
        }
        events.truncate(limit);
        Ok(events)
    }

    async fn query_transactions(
        &self,
        filter: &TransactionFilter,
        limit: usize,
        order: Order,
        include_events: bool,
    ) -> Result<Vec<RawTransaction>, LookupError> {
        self.transaction_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_transactions {
            return Err(LookupError::Unavailable("history offline".to_string()));
        }

        let TransactionFilter::FromAddress(sender) = filter;
        let mut transactions: Vec<_> = self
            .transactions
            .iter()
            .filter(|tx| {
                tx.events()
                    .iter()
                    .any(|e| e.sender.as_deref() == Some(sender.as_str()))
            })
            .cloned()
            .map(|mut tx| {
                if !include_events {
                    tx.events = None;
                }
                tx
            })
            .collect();
        if order == Order::Descending {
            transactions.reverse();
        }
        transactions.truncate(limit);
        Ok(transactions)
    }
}
