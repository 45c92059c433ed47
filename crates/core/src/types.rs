//! Core types for CertChain.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    CATEGORY_NAMES, DEFAULT_CATEGORY, DEFAULT_TRUST_RANK, NEVER_EXPIRES, TRUST_RANK_NAMES,
};
use crate::error::CoreError;

/// Credential category (the on-chain `cert_type`).
///
/// Categories start at 1. Unknown categories above the named range are kept
/// as-is so newer contracts do not lose information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(u8);

impl Category {
    /// Create a new Category, rejecting the reserved zero value.
    pub fn new(value: u8) -> Result<Self, CoreError> {
        if value == 0 {
            return Err(CoreError::InvalidCategory(value));
        }
        Ok(Category(value))
    }

    /// Baseline category used when the payload carries none.
    pub const fn baseline() -> Self {
        Category(DEFAULT_CATEGORY)
    }

    /// Get the raw value.
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Human label, `"Unknown"` for categories without a name.
    pub fn label(&self) -> &'static str {
        CATEGORY_NAMES
            .iter()
            .find(|(id, _)| *id == self.0)
            .map(|(_, name)| *name)
            .unwrap_or("Unknown")
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::baseline()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Trust rank of a credential or profile, 0 (Novice) upwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustRank(pub u8);

impl TrustRank {
    /// Lowest rank.
    pub const fn lowest() -> Self {
        TrustRank(DEFAULT_TRUST_RANK)
    }

    /// Get the raw value.
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Human label; unnamed ranks display as the lowest rank.
    pub fn label(&self) -> &'static str {
        TRUST_RANK_NAMES
            .iter()
            .find(|(id, _)| *id == self.0)
            .map(|(_, name)| *name)
            .unwrap_or(TRUST_RANK_NAMES[0].1)
    }
}

impl Default for TrustRank {
    fn default() -> Self {
        Self::lowest()
    }
}

impl fmt::Display for TrustRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Where a credential's `issued_at_ms` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampSource {
    /// Read from the ledger payload.
    Ledger,
    /// Substituted with the decode-time clock because the payload had none.
    Fallback,
    /// Absent from the payload and left at zero.
    Missing,
}

/// A reconciled credential record.
///
/// Records are immutable values built fresh on every fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Ledger object identifier; the primary key.
    pub id: String,
    /// Current holder.
    pub owner_address: String,
    /// Issuing address.
    pub issuer_address: String,
    /// Issuer label, best-effort.
    pub issuer_display_name: String,
    /// Credential type.
    pub category: Category,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Content address of the pinned payload (may be empty).
    pub content_address: String,
    /// URL of the pinned payload (may be empty).
    pub content_url: String,
    /// Issue time, epoch milliseconds.
    pub issued_at_ms: u64,
    /// Provenance of `issued_at_ms`.
    pub issued_at_source: TimestampSource,
    /// Expiry, epoch milliseconds; `0` means never.
    pub expires_at_ms: u64,
    /// Trust rank.
    pub trust_rank: TrustRank,
    /// Attached bounty. `None` means no bounty, which is not the same as `Some(0)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounty_amount: Option<u64>,
}

impl Credential {
    /// Whether the credential carries an expiry at all.
    pub const fn never_expires(&self) -> bool {
        self.expires_at_ms == NEVER_EXPIRES
    }

    /// Whether the validity window has lapsed at `now_ms`.
    pub const fn is_expired_at(&self, now_ms: u64) -> bool {
        self.expires_at_ms > NEVER_EXPIRES && self.expires_at_ms < now_ms
    }
}

/// Holder profile object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Object identifier.
    pub id: String,
    /// Profile owner.
    pub owner: String,
    /// Chosen display name.
    pub display_name: String,
    /// Credentials received.
    pub total_certs: u64,
    /// Current trust rank.
    pub trust_rank: TrustRank,
    /// Reputation points.
    pub reputation: u64,
    /// Join time, epoch milliseconds.
    pub joined_at_ms: u64,
}

/// Issuer capability object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCap {
    /// Object identifier.
    pub id: String,
    /// Institution label.
    pub institution_name: String,
    /// Address the institution issues from; may differ from the cap holder.
    pub institution_address: String,
    /// Credentials issued with this cap.
    pub total_issued: u64,
    /// Categories this cap may issue.
    pub authorized_types: Vec<u8>,
}

/// A ranked achievement level unlocked at a cumulative issued-count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementTier {
    /// Rank, increasing with the threshold.
    pub tier: u8,
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Issued-count needed to reach this tier.
    pub required_count: u64,
    /// Perks unlocked at this tier.
    pub benefits: Vec<String>,
}

/// Outcome of verifying one credential identifier.
///
/// Exactly one of `record` / `error` is present. The fields are private so
/// that only [`VerificationVerdict::valid`] and [`VerificationVerdict::invalid`]
/// can build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationVerdict {
    is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<Credential>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_expired: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl VerificationVerdict {
    /// A genuine credential. Expiry does not affect validity.
    pub fn valid(record: Credential, is_expired: bool) -> Self {
        Self {
            is_valid: true,
            record: Some(record),
            is_expired: Some(is_expired),
            error: None,
        }
    }

    /// A rejected identifier, with the reason.
    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            record: None,
            is_expired: None,
            error: Some(error.into()),
        }
    }

    /// Whether the identifier resolved to a genuine credential.
    pub const fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// The verified record, if valid.
    pub fn record(&self) -> Option<&Credential> {
        self.record.as_ref()
    }

    /// Expiry flag, present only on valid verdicts.
    pub const fn is_expired(&self) -> Option<bool> {
        self.is_expired
    }

    /// Rejection reason, present only on invalid verdicts.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
