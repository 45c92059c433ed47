//! Credential verification.
//!
//! Identifiers are validated locally before any network call. A verdict is
//! always returned; failures become negative verdicts carrying a message.

use certchain_core::{Credential, VerificationVerdict, OBJECT_ID_LENGTH, OBJECT_ID_PREFIX};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::decoder::{RecordDecoder, TimestampPolicy};
use crate::error::{DecodeError, ValidationError, VerifyError};
use crate::listener::ReadService;

/// Check that `identifier` is a full `0x`-prefixed hex object id.
///
/// Returns the trimmed identifier.
pub fn validate_object_id(identifier: &str) -> Result<&str, ValidationError> {
    let id = identifier.trim();
    if id.is_empty() {
        return Err(ValidationError::Empty);
    }

    let Some(hex) = id.strip_prefix(OBJECT_ID_PREFIX) else {
        return Err(ValidationError::MissingPrefix);
    };

    let len = id.len();
    if len < OBJECT_ID_LENGTH {
        return Err(ValidationError::TooShort {
            len,
            expected: OBJECT_ID_LENGTH,
        });
    }
    if len > OBJECT_ID_LENGTH {
        return Err(ValidationError::TooLong {
            len,
            expected: OBJECT_ID_LENGTH,
        });
    }

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::NotHex);
    }

    Ok(id)
}

/// Verifies credential identifiers against the ledger.
pub struct Verifier<R, C> {
    read: R,
    decoder: RecordDecoder,
    clock: C,
}

impl<R: ReadService, C: Clock> Verifier<R, C> {
    /// Create a verifier.
    pub fn new(read: R, decoder: RecordDecoder, clock: C) -> Self {
        Self {
            read,
            decoder,
            clock,
        }
    }

    /// Verify `identifier`.
    ///
    /// Expiry is reported alongside a valid verdict and never makes it
    /// invalid.
    pub async fn verify(&self, identifier: &str) -> VerificationVerdict {
        match self.check(identifier).await {
            Ok(record) => {
                let expired = record.is_expired_at(self.clock.now_ms());
                debug!(id = %record.id, expired, "Credential verified");
                VerificationVerdict::valid(record, expired)
            }
            Err(e) => {
                if let VerifyError::Lookup(_) = e {
                    warn!("Verification lookup failed: {}", e);
                } else {
                    debug!("Verification rejected: {}", e);
                }
                VerificationVerdict::invalid(e.to_string())
            }
        }
    }

    async fn check(&self, identifier: &str) -> Result<Credential, VerifyError> {
        let id = validate_object_id(identifier)?;

        let raw = self
            .read
            .get_object(id)
            .await?
            .ok_or_else(|| VerifyError::NotFound(id.to_string()))?;

        self.decoder
            .decode_credential(&raw, id, TimestampPolicy::Preserve)
            .map_err(|e| match e {
                DecodeError::WrongType { found, .. } => VerifyError::WrongType(found),
                DecodeError::MissingContent => VerifyError::WrongType("unknown".to_string()),
                _ => VerifyError::InvalidStructure,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_id() -> String {
        format!("0x{}", "ab".repeat(32))
    }

    #[test]
    fn test_valid_id() {
        let id = full_id();
        assert_eq!(validate_object_id(&id), Ok(id.as_str()));
        assert_eq!(validate_object_id(&format!("  {id}\n")), Ok(id.as_str()));
    }

    #[test]
    fn test_empty() {
        assert_eq!(validate_object_id(""), Err(ValidationError::Empty));
        assert_eq!(validate_object_id("   "), Err(ValidationError::Empty));
    }

    #[test]
    fn test_not_hex() {
        let err = validate_object_id("not-hex!!").unwrap_err();
        assert_eq!(err, ValidationError::MissingPrefix);
        assert!(err.to_string().contains("hexadecimal"));

        let mut id = full_id();
        id.replace_range(10..11, "z");
        assert_eq!(validate_object_id(&id), Err(ValidationError::NotHex));
    }

    #[test]
    fn test_length() {
        let err = validate_object_id("0x01").unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooShort {
                len: 4,
                expected: OBJECT_ID_LENGTH
            }
        );
        assert!(err.to_string().contains("too short"));
        // Length is checked before the hex alphabet.
        assert!(matches!(
            validate_object_id("0xzz"),
            Err(ValidationError::TooShort { .. })
        ));

        let long = format!("{}00", full_id());
        assert!(matches!(
            validate_object_id(&long),
            Err(ValidationError::TooLong { len: 68, .. })
        ));
    }
}
