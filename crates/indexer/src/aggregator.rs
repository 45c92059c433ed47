//! Issuance aggregation.
//!
//! Reconstructs the set of credentials an issuer produced, in two phases:
//!
//! 1. **Event scan**: page the issuance event log (most recent first), keep
//!    events whose embedded issuer matches, and resolve each referenced
//!    credential by point lookup.
//! 2. **Transaction history**: only when phase 1 admitted nothing, scan the
//!    issuer's own transactions for issuance events and resolve those.
//!
//! Both phases feed one [`Deduplicator`], so each credential appears at most
//! once. Failures are absorbed per record; the run as a whole always returns
//! a report.

use certchain_core::Credential;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::QueryConfig;
use crate::decoder::{RecordDecoder, TimestampPolicy};
use crate::dedup::Deduplicator;
use crate::listener::{
    EventFilter, IssuanceEvent, Order, RawEvent, ReadService, TransactionFilter,
};
use crate::projector::CredentialSet;

/// Whose issuance to reconstruct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerTarget {
    /// The issuer's own address.
    pub address: String,
    /// The institution address from the issuer's capability, if any.
    pub institution_address: Option<String>,
}

impl IssuerTarget {
    /// Target a bare issuer address.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            institution_address: None,
        }
    }

    /// Also accept events naming `institution_address` as issuer.
    pub fn with_institution(mut self, institution_address: impl Into<String>) -> Self {
        let institution_address = institution_address.into();
        if !institution_address.is_empty() {
            self.institution_address = Some(institution_address);
        }
        self
    }

    /// Whether an event's embedded issuer refers to this target.
    pub fn matches(&self, issuer: &str) -> bool {
        issuer == self.address || self.institution_address.as_deref() == Some(issuer)
    }
}

/// Which phase produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionPhase {
    /// Event-log scan admitted at least one record.
    EventScan,
    /// Event scan admitted nothing; transaction history did.
    TransactionHistory,
    /// Neither phase admitted anything.
    Exhausted,
}

/// Outcome of one aggregation run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationReport {
    /// Admitted credentials, in acquisition order.
    pub credentials: CredentialSet,
    /// Phase that produced `credentials`.
    pub phase: AcquisitionPhase,
    /// Issuance events attributed to the target across both phases.
    pub events_matched: usize,
    /// Events or lookups that were dropped.
    pub skipped: usize,
    /// Human-readable notes about degraded phases.
    pub notices: Vec<String>,
}

impl AggregationReport {
    fn empty() -> Self {
        Self {
            credentials: CredentialSet::default(),
            phase: AcquisitionPhase::Exhausted,
            events_matched: 0,
            skipped: 0,
            notices: Vec::new(),
        }
    }
}

/// Reconstructs issuer output from the event log and transaction history.
pub struct IssuanceAggregator<R> {
    read: R,
    decoder: RecordDecoder,
    query: QueryConfig,
}

impl<R: ReadService> IssuanceAggregator<R> {
    /// Create an aggregator.
    pub fn new(read: R, decoder: RecordDecoder, query: QueryConfig) -> Self {
        Self {
            read,
            decoder,
            query,
        }
    }

    /// Reconstruct the credentials issued by `target`.
    pub async fn issued_by(&self, target: &IssuerTarget) -> AggregationReport {
        let mut report = AggregationReport::empty();
        let mut dedup = Deduplicator::new();
        let mut admitted = Vec::new();

        let filter = EventFilter::MoveEventType(self.decoder.types().event_type().to_string());
        match self
            .read
            .query_events(&filter, self.query.event_page_size, Order::Descending)
            .await
        {
            Ok(events) => {
                let ids = self.matching_ids(&events, target, &mut report);
                debug!(
                    events = events.len(),
                    matched = ids.len(),
                    "Event scan complete"
                );
                self.resolve(ids, &mut dedup, &mut admitted, &mut report).await;
            }
            Err(e) => {
                warn!("Issuance event scan failed: {}", e);
                report.notices.push(format!("Event scan failed: {e}"));
            }
        }

        if !admitted.is_empty() {
            info!(
                issuer = %target.address,
                credentials = admitted.len(),
                "Issuance reconstructed from event log"
            );
            report.phase = AcquisitionPhase::EventScan;
            report.credentials = CredentialSet::new(admitted);
            return report;
        }

        let filter = TransactionFilter::FromAddress(target.address.clone());
        match self
            .read
            .query_transactions(&filter, self.query.tx_page_size, Order::Descending, true)
            .await
        {
            Ok(transactions) => {
                let events: Vec<RawEvent> = transactions
                    .iter()
                    .flat_map(|tx| tx.events())
                    .cloned()
                    .collect();
                let ids = self.matching_ids(&events, target, &mut report);
                debug!(
                    transactions = transactions.len(),
                    matched = ids.len(),
                    "Transaction history scan complete"
                );
                self.resolve(ids, &mut dedup, &mut admitted, &mut report).await;
            }
            Err(e) => {
                warn!("Transaction history scan failed: {}", e);
                report.notices.push(format!("Transaction history scan failed: {e}"));
            }
        }

        report.phase = if admitted.is_empty() {
            AcquisitionPhase::Exhausted
        } else {
            AcquisitionPhase::TransactionHistory
        };
        info!(
            issuer = %target.address,
            credentials = admitted.len(),
            phase = ?report.phase,
            "Issuance reconstruction finished"
        );
        report.credentials = CredentialSet::new(admitted);
        report
    }

    /// Credential ids referenced by issuance events attributed to `target`.
    fn matching_ids(
        &self,
        events: &[RawEvent],
        target: &IssuerTarget,
        report: &mut AggregationReport,
    ) -> Vec<String> {
        let mut ids = Vec::new();
        for event in events {
            if !self.decoder.types().is_issuance_event(&event.event_type) {
                continue;
            }
            match IssuanceEvent::from_event(event) {
                Ok(parsed) if target.matches(&parsed.issuer) => {
                    report.events_matched += 1;
                    ids.push(parsed.credential_id);
                }
                Ok(_) => {}
                Err(e) => {
                    // Log parsing error but continue processing other events
                    warn!("Failed to parse issuance event: {}", e);
                    report.skipped += 1;
                }
            }
        }
        ids
    }

    /// Point-look-up `ids` in order and admit each decoded record once.
    async fn resolve(
        &self,
        ids: Vec<String>,
        dedup: &mut Deduplicator,
        admitted: &mut Vec<Credential>,
        report: &mut AggregationReport,
    ) {
        let lookups: Vec<_> = stream::iter(ids)
            .map(|id| async move {
                let result = self.read.get_object(&id).await;
                (id, result)
            })
            .buffered(self.query.lookup_concurrency.max(1))
            .collect()
            .await;

        for (id, result) in lookups {
            let raw = match result {
                Ok(Some(raw)) => raw,
                Ok(None) => {
                    debug!(id = %id, "Referenced credential no longer exists");
                    report.skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!(id = %id, "Credential lookup failed: {}", e);
                    report.skipped += 1;
                    continue;
                }
            };

            match self
                .decoder
                .decode_credential(&raw, &id, TimestampPolicy::Preserve)
            {
                Ok(credential) => {
                    if dedup.admit(&credential.id) {
                        admitted.push(credential);
                    }
                }
                Err(e) => {
                    warn!(id = %id, "Failed to decode credential: {}", e);
                    report.skipped += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_matching() {
        let target = IssuerTarget::new("0xadmin").with_institution("0xschool");
        assert!(target.matches("0xadmin"));
        assert!(target.matches("0xschool"));
        assert!(!target.matches("0xother"));

        let bare = IssuerTarget::new("0xadmin").with_institution("");
        assert_eq!(bare.institution_address, None);
    }
}
