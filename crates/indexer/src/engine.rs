//! One handle over every read-side operation.

use std::sync::Arc;

use anyhow::Result;
use certchain_core::{AdminCap, Credential, UserProfile, VerificationVerdict};
use tracing::debug;

use crate::aggregator::{AggregationReport, IssuanceAggregator, IssuerTarget};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::content::ContentLocator;
use crate::decoder::RecordDecoder;
use crate::listener::{ReadService, SuiRpcProvider};
use crate::projector::{Holdings, OwnershipReader};
use crate::verification::Verifier;

/// Engine wired to a shared read service.
///
/// Holds no state between calls beyond configuration.
pub struct Engine<R: ?Sized, C> {
    aggregator: IssuanceAggregator<Arc<R>>,
    owners: OwnershipReader<Arc<R>, C>,
    verifier: Verifier<Arc<R>, C>,
    content: ContentLocator,
}

impl Engine<SuiRpcProvider, SystemClock> {
    /// Connect to the configured full node.
    pub fn connect(config: &Config) -> Result<Self> {
        let provider = SuiRpcProvider::new(
            &config.network.rpc_url,
            config.request_timeout(),
            config.query.max_owned_pages,
        )?;
        Ok(Self::new(Arc::new(provider), config, SystemClock))
    }
}

impl<R: ReadService + ?Sized, C: Clock + Clone> Engine<R, C> {
    /// Wire an engine over `read`.
    pub fn new(read: Arc<R>, config: &Config, clock: C) -> Self {
        let decoder = RecordDecoder::new(config.type_names());
        Self {
            aggregator: IssuanceAggregator::new(
                read.clone(),
                decoder.clone(),
                config.query.clone(),
            ),
            owners: OwnershipReader::new(read.clone(), decoder.clone(), clock.clone()),
            verifier: Verifier::new(read, decoder, clock),
            content: ContentLocator::new(&config.content.gateway),
        }
    }

    /// Verify a credential identifier.
    pub async fn verify(&self, identifier: &str) -> VerificationVerdict {
        self.verifier.verify(identifier).await
    }

    /// Credentials currently held by `address`.
    pub async fn held_by(&self, address: &str) -> Holdings {
        self.owners.held_by(address).await
    }

    /// Holder profile of `address`.
    pub async fn profile_of(&self, address: &str) -> Option<UserProfile> {
        self.owners.profile_of(address).await
    }

    /// Issuer capabilities held by `address`.
    pub async fn admin_caps_of(&self, address: &str) -> Vec<AdminCap> {
        self.owners.admin_caps_of(address).await
    }

    /// Issuer target for `address`, picking up the institution address from
    /// its first capability when none is given.
    pub async fn issuer_target(&self, address: &str, institution: Option<&str>) -> IssuerTarget {
        let target = IssuerTarget::new(address);
        if let Some(institution) = institution {
            return target.with_institution(institution);
        }

        match self.admin_caps_of(address).await.into_iter().next() {
            Some(cap) => {
                debug!(
                    institution = %cap.institution_address,
                    "Using capability institution address"
                );
                target.with_institution(cap.institution_address)
            }
            None => target,
        }
    }

    /// Reconstruct what `target` issued.
    pub async fn issued_by(&self, target: &IssuerTarget) -> AggregationReport {
        self.aggregator.issued_by(target).await
    }

    /// Display URL for a credential's off-chain content.
    pub fn display_url(&self, credential: &Credential) -> Option<String> {
        self.content.display_url(credential)
    }
}
