//! Schema-tolerant record decoding.
//!
//! Turns raw ledger objects into [`Credential`], [`UserProfile`] and
//! [`AdminCap`] values. Decoding is pure: the same raw input and
//! [`TimestampPolicy`] always produce the same record.
//!
//! Field resolution is versioned. Each [`SchemaVariant`] owns an explicit
//! alias table; a payload is matched to one variant and resolved through it
//! alone. Absent or unparseable fields fall back to documented defaults and
//! never fail the whole decode.

use certchain_core::{
    AdminCap, Category, Credential, TimestampSource, TrustRank, UserProfile, DEFAULT_DESCRIPTION,
    DEFAULT_TITLE, MODULE_CERTIFICATE, NEVER_EXPIRES, STRUCT_ADMIN_CAP, STRUCT_CERTIFICATE,
    STRUCT_CERTIFICATE_ISSUED, STRUCT_USER_PROFILE, UNKNOWN_INSTITUTION,
};
use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::listener::RawObject;

/// Fully qualified names the decoder and aggregator match against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeNames {
    credential_suffix: String,
    profile_suffix: String,
    admin_cap_suffix: String,
    event_suffix: String,
    event_type: String,
}

impl TypeNames {
    /// Build type names for a deployed package.
    pub fn new(
        package_id: &str,
        module: &str,
        credential: &str,
        event: &str,
        profile: &str,
        admin_cap: &str,
    ) -> Self {
        let event_suffix = format!("::{module}::{event}");
        Self {
            credential_suffix: format!("::{module}::{credential}"),
            profile_suffix: format!("::{module}::{profile}"),
            admin_cap_suffix: format!("::{module}::{admin_cap}"),
            event_type: format!("{package_id}{event_suffix}"),
            event_suffix,
        }
    }

    /// Standard module and struct names under `package_id`.
    pub fn standard(package_id: &str) -> Self {
        Self::new(
            package_id,
            MODULE_CERTIFICATE,
            STRUCT_CERTIFICATE,
            STRUCT_CERTIFICATE_ISSUED,
            STRUCT_USER_PROFILE,
            STRUCT_ADMIN_CAP,
        )
    }

    /// `::module::Credential` suffix.
    pub fn credential_suffix(&self) -> &str {
        &self.credential_suffix
    }

    /// `::module::Profile` suffix.
    pub fn profile_suffix(&self) -> &str {
        &self.profile_suffix
    }

    /// `::module::AdminCap` suffix.
    pub fn admin_cap_suffix(&self) -> &str {
        &self.admin_cap_suffix
    }

    /// `::module::Issued` suffix used to recognise issuance events.
    pub fn event_suffix(&self) -> &str {
        &self.event_suffix
    }

    /// Fully qualified issuance event type, for event-log queries.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Whether `type_tag` names an issuance event.
    pub fn is_issuance_event(&self, type_tag: &str) -> bool {
        type_tag.contains(&self.event_suffix)
    }
}

/// How a missing issuance timestamp is filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampPolicy {
    /// Keep it missing: `0` tagged [`TimestampSource::Missing`].
    Preserve,
    /// Substitute the given "now", tagged [`TimestampSource::Fallback`].
    FallbackTo(u64),
}

impl TimestampPolicy {
    fn resolve(self, ledger: Option<u64>) -> (u64, TimestampSource) {
        match (ledger, self) {
            (Some(ms), _) => (ms, TimestampSource::Ledger),
            (None, TimestampPolicy::Preserve) => (0, TimestampSource::Missing),
            (None, TimestampPolicy::FallbackTo(now)) => (now, TimestampSource::Fallback),
        }
    }
}

/// Lenient accessor over a Move field map.
#[derive(Clone, Copy)]
pub(crate) struct FieldReader<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(fields: &'a Map<String, Value>) -> Self {
        Self { fields }
    }

    pub(crate) fn has_any(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.fields.contains_key(*name))
    }

    fn first(&self, names: &[&str]) -> Option<&'a Value> {
        names
            .iter()
            .filter_map(|name| self.fields.get(*name))
            .find(|value| !value.is_null())
    }

    /// First non-empty string among `names`.
    pub(crate) fn text(&self, names: &[&str]) -> Option<&'a str> {
        names
            .iter()
            .filter_map(|name| self.fields.get(*name))
            .filter_map(|value| match value {
                Value::String(s) => Some(s.as_str()),
                // Nested UID: {"id": "0x.."}
                Value::Object(inner) => inner.get("id").and_then(Value::as_str),
                _ => None,
            })
            .map(str::trim)
            .find(|s| !s.is_empty())
    }

    /// First value among `names` that parses as an unsigned integer.
    pub(crate) fn number(&self, names: &[&str]) -> Option<u64> {
        names
            .iter()
            .filter_map(|name| self.fields.get(*name))
            .find_map(parse_u64)
    }

    /// Like [`Self::number`], but understands Move `Option` encodings.
    ///
    /// `None` only when the field is absent, null, an empty option, or
    /// unparseable; a present zero stays `Some(0)`.
    pub(crate) fn optional_number(&self, names: &[&str]) -> Option<u64> {
        let value = self.first(names)?;
        match value {
            Value::Object(inner) => match inner.get("vec") {
                Some(Value::Array(items)) => items.first().and_then(parse_u64),
                _ => None,
            },
            other => parse_u64(other),
        }
    }

    /// Byte-vector field as a list of small integers.
    pub(crate) fn bytes(&self, names: &[&str]) -> Vec<u8> {
        match self.first(names) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(parse_u64)
                .filter_map(|n| u8::try_from(n).ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Identifier embedded in the `id` field.
    pub(crate) fn embedded_id(&self) -> Option<&'a str> {
        self.text(&["id"])
    }
}

fn parse_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Field aliases for one credential schema generation.
#[derive(Debug)]
struct CredentialFields {
    markers: &'static [&'static str],
    owner: &'static [&'static str],
    issuer: &'static [&'static str],
    issuer_name: &'static [&'static str],
    category: &'static [&'static str],
    title: &'static [&'static str],
    description: &'static [&'static str],
    content_address: &'static [&'static str],
    content_url: &'static [&'static str],
    issued_at: &'static [&'static str],
    expires_at: &'static [&'static str],
    trust_rank: &'static [&'static str],
    bounty: &'static [&'static str],
}

impl CredentialFields {
    fn aliases(&self) -> impl Iterator<Item = &'static str> {
        [
            self.owner,
            self.issuer,
            self.issuer_name,
            self.category,
            self.title,
            self.description,
            self.content_address,
            self.content_url,
            self.issued_at,
            self.expires_at,
            self.trust_rank,
            self.bounty,
        ]
        .into_iter()
        .flatten()
        .copied()
    }
}

const V1_FIELDS: CredentialFields = CredentialFields {
    markers: &["issuer", "cert_type", "owner", "pinata_cid"],
    owner: &["owner"],
    issuer: &["issuer"],
    issuer_name: &["issuer_name"],
    category: &["cert_type"],
    title: &["title"],
    description: &["description"],
    content_address: &["pinata_cid"],
    content_url: &["ipfs_url"],
    issued_at: &["issued_at"],
    expires_at: &["expires_at"],
    trust_rank: &["trust_rank"],
    bounty: &["bounty_amount"],
};

const LEGACY_FIELDS: CredentialFields = CredentialFields {
    markers: &["recipient", "institution", "certificate_type", "metadata_cid"],
    owner: &["recipient", "holder"],
    issuer: &["institution", "issuer_address"],
    issuer_name: &["institution_name"],
    category: &["certificate_type", "category"],
    title: &["name", "title"],
    description: &["details", "description"],
    content_address: &["metadata_cid", "cid"],
    content_url: &["metadata_url", "url"],
    issued_at: &["timestamp", "issued_at_ms"],
    expires_at: &["expiry", "expires_at_ms"],
    trust_rank: &["rank"],
    bounty: &["bounty"],
};

/// Credential payload generations the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVariant {
    /// Current field names (`issuer`, `cert_type`, `pinata_cid`, ...).
    V1,
    /// Early deployments (`institution`, `recipient`, `metadata_cid`, ...).
    Legacy,
}

impl SchemaVariant {
    /// Pick the variant whose marker fields appear in `fields`, preferring V1.
    ///
    /// Without markers, the first variant with any known field wins. `None`
    /// means nothing in `fields` is decodable.
    pub fn detect(fields: &Map<String, Value>) -> Option<Self> {
        let reader = FieldReader::new(fields);
        let variants = [SchemaVariant::V1, SchemaVariant::Legacy];
        variants
            .into_iter()
            .find(|variant| reader.has_any(variant.fields().markers))
            .or_else(|| {
                variants.into_iter().find(|variant| {
                    variant
                        .fields()
                        .aliases()
                        .any(|name| reader.has_any(&[name]))
                })
            })
    }

    fn fields(self) -> &'static CredentialFields {
        match self {
            SchemaVariant::V1 => &V1_FIELDS,
            SchemaVariant::Legacy => &LEGACY_FIELDS,
        }
    }
}

/// Decodes raw objects for one deployed package.
#[derive(Debug, Clone)]
pub struct RecordDecoder {
    types: TypeNames,
}

impl RecordDecoder {
    /// Create a decoder matching `types`.
    pub fn new(types: TypeNames) -> Self {
        Self { types }
    }

    /// Type names this decoder matches against.
    pub fn types(&self) -> &TypeNames {
        &self.types
    }

    /// Whether `raw` is typed as a credential.
    pub fn is_credential(&self, raw: &RawObject) -> bool {
        raw.type_tag()
            .is_some_and(|tag| tag.contains(self.types.credential_suffix()))
    }

    fn typed_fields<'a>(
        &self,
        raw: &'a RawObject,
        suffix: &str,
    ) -> Result<&'a Map<String, Value>, DecodeError> {
        let type_tag = raw.type_tag().ok_or(DecodeError::MissingContent)?;
        if !type_tag.contains(suffix) {
            return Err(DecodeError::WrongType {
                expected: suffix.to_string(),
                found: type_tag.to_string(),
            });
        }

        match raw.fields() {
            Some(Value::Object(fields)) if !fields.is_empty() => Ok(fields),
            _ => Err(DecodeError::NoFields),
        }
    }

    fn identifier(
        raw: &RawObject,
        reader: FieldReader<'_>,
        fallback_id: &str,
    ) -> Result<String, DecodeError> {
        raw.object_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .or_else(|| reader.embedded_id())
            .or_else(|| Some(fallback_id.trim()).filter(|id| !id.is_empty()))
            .map(str::to_string)
            .ok_or(DecodeError::MissingId)
    }

    /// Decode a credential.
    ///
    /// The identifier is the structural object id, then the embedded `id`,
    /// then `fallback_id`.
    pub fn decode_credential(
        &self,
        raw: &RawObject,
        fallback_id: &str,
        timestamps: TimestampPolicy,
    ) -> Result<Credential, DecodeError> {
        let fields = self.typed_fields(raw, self.types.credential_suffix())?;
        let variant = SchemaVariant::detect(fields).ok_or(DecodeError::NoFields)?;
        let aliases = variant.fields();
        let reader = FieldReader::new(fields);

        let id = Self::identifier(raw, reader, fallback_id)?;
        let text = |names: &[&str], default: &str| {
            reader.text(names).unwrap_or(default).to_string()
        };

        // A zero timestamp is the Move default and means "never set".
        let issued_at = reader.number(aliases.issued_at).filter(|ms| *ms > 0);
        let (issued_at_ms, issued_at_source) = timestamps.resolve(issued_at);

        let category = reader
            .number(aliases.category)
            .and_then(|n| u8::try_from(n).ok())
            .and_then(|n| Category::new(n).ok())
            .unwrap_or_default();

        let trust_rank = reader
            .number(aliases.trust_rank)
            .and_then(|n| u8::try_from(n).ok())
            .map(TrustRank)
            .unwrap_or_default();

        Ok(Credential {
            id,
            owner_address: text(aliases.owner, ""),
            issuer_address: text(aliases.issuer, ""),
            issuer_display_name: text(aliases.issuer_name, UNKNOWN_INSTITUTION),
            category,
            title: text(aliases.title, DEFAULT_TITLE),
            description: text(aliases.description, DEFAULT_DESCRIPTION),
            content_address: text(aliases.content_address, ""),
            content_url: text(aliases.content_url, ""),
            issued_at_ms,
            issued_at_source,
            expires_at_ms: reader.number(aliases.expires_at).unwrap_or(NEVER_EXPIRES),
            trust_rank,
            bounty_amount: reader.optional_number(aliases.bounty),
        })
    }

    /// Decode a holder profile. `joined_at` follows `timestamps`.
    pub fn decode_profile(
        &self,
        raw: &RawObject,
        timestamps: TimestampPolicy,
    ) -> Result<UserProfile, DecodeError> {
        let fields = self.typed_fields(raw, self.types.profile_suffix())?;
        let reader = FieldReader::new(fields);
        let id = Self::identifier(raw, reader, "")?;

        let joined_at = reader.number(&["joined_at"]).filter(|ms| *ms > 0);
        let (joined_at_ms, _) = timestamps.resolve(joined_at);

        Ok(UserProfile {
            id,
            owner: reader.text(&["owner"]).unwrap_or_default().to_string(),
            display_name: reader.text(&["display_name"]).unwrap_or_default().to_string(),
            total_certs: reader.number(&["total_certs"]).unwrap_or(0),
            trust_rank: reader
                .number(&["trust_rank"])
                .and_then(|n| u8::try_from(n).ok())
                .map(TrustRank)
                .unwrap_or_default(),
            reputation: reader.number(&["reputation"]).unwrap_or(0),
            joined_at_ms,
        })
    }

    /// Decode an issuing-authority capability.
    pub fn decode_admin_cap(&self, raw: &RawObject) -> Result<AdminCap, DecodeError> {
        let fields = self.typed_fields(raw, self.types.admin_cap_suffix())?;
        let reader = FieldReader::new(fields);
        let id = Self::identifier(raw, reader, "")?;

        Ok(AdminCap {
            id,
            institution_name: reader
                .text(&["institution_name"])
                .unwrap_or(UNKNOWN_INSTITUTION)
                .to_string(),
            institution_address: reader
                .text(&["institution_address"])
                .unwrap_or_default()
                .to_string(),
            total_issued: reader.number(&["total_issued"]).unwrap_or(0),
            authorized_types: reader.bytes(&["authorized_types"]),
        })
    }
}
