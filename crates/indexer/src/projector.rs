//! Ownership acquisition and projections over credential sets.

use certchain_core::{AdminCap, Credential, UserProfile};
use serde::Serialize;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::decoder::{RecordDecoder, TimestampPolicy};
use crate::dedup::Deduplicator;
use crate::listener::{RawObject, ReadService};

/// An acquired set of credentials with holder and issuer views.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CredentialSet {
    records: Vec<Credential>,
}

impl CredentialSet {
    /// Wrap already-deduplicated records.
    pub fn new(records: Vec<Credential>) -> Self {
        Self { records }
    }

    /// Records held by `address`.
    pub fn by_owner(&self, address: &str) -> Vec<&Credential> {
        self.records
            .iter()
            .filter(|c| c.owner_address == address)
            .collect()
    }

    /// Records issued by `address`.
    pub fn by_issuer(&self, address: &str) -> Vec<&Credential> {
        self.records
            .iter()
            .filter(|c| c.issuer_address == address)
            .collect()
    }

    /// All records in acquisition order.
    pub fn records(&self) -> &[Credential] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Result of listing one address's credentials.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Holdings {
    /// Credentials the address owns.
    pub credentials: CredentialSet,
    /// Credential-typed objects that failed to decode.
    pub skipped: usize,
    /// Degradation notes.
    pub notices: Vec<String>,
}

/// Reads what an address currently owns.
///
/// Missing issuance timestamps are filled from the clock here, tagged as
/// fallbacks, so holder views always have a date to sort and display by.
pub struct OwnershipReader<R, C> {
    read: R,
    decoder: RecordDecoder,
    clock: C,
}

impl<R: ReadService, C: Clock> OwnershipReader<R, C> {
    /// Create a reader.
    pub fn new(read: R, decoder: RecordDecoder, clock: C) -> Self {
        Self {
            read,
            decoder,
            clock,
        }
    }

    async fn owned(&self, address: &str) -> Result<Vec<RawObject>, String> {
        self.read.get_owned_objects(address).await.map_err(|e| {
            warn!(owner = address, "Owned-object listing failed: {}", e);
            format!("Owned-object listing failed: {e}")
        })
    }

    /// Credentials currently owned by `address`.
    ///
    /// Objects of other types are ignored. A failed listing yields an empty
    /// set with a notice rather than an error.
    pub async fn held_by(&self, address: &str) -> Holdings {
        let mut holdings = Holdings::default();
        let objects = match self.owned(address).await {
            Ok(objects) => objects,
            Err(notice) => {
                holdings.notices.push(notice);
                return holdings;
            }
        };

        let policy = TimestampPolicy::FallbackTo(self.clock.now_ms());
        let mut dedup = Deduplicator::new();
        let mut records = Vec::new();
        for raw in objects.iter().filter(|raw| self.decoder.is_credential(raw)) {
            match self.decoder.decode_credential(raw, "", policy) {
                Ok(credential) => {
                    if dedup.admit(&credential.id) {
                        records.push(credential);
                    }
                }
                Err(e) => {
                    warn!(owner = address, "Skipping undecodable credential: {}", e);
                    holdings.skipped += 1;
                }
            }
        }

        debug!(
            owner = address,
            objects = objects.len(),
            credentials = records.len(),
            "Holdings listed"
        );
        holdings.credentials = CredentialSet::new(records);
        holdings
    }

    /// The holder profile of `address`, if one exists and decodes.
    pub async fn profile_of(&self, address: &str) -> Option<UserProfile> {
        let objects = self.owned(address).await.ok()?;
        let policy = TimestampPolicy::FallbackTo(self.clock.now_ms());
        objects
            .iter()
            .find_map(|raw| self.decoder.decode_profile(raw, policy).ok())
    }

    /// Issuer capabilities held by `address`.
    pub async fn admin_caps_of(&self, address: &str) -> Vec<AdminCap> {
        match self.owned(address).await {
            Ok(objects) => objects
                .iter()
                .filter_map(|raw| self.decoder.decode_admin_cap(raw).ok())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}
