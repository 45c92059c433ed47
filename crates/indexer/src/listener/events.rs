//! Issuance event parsing.

use serde_json::Value;

use super::raw::RawEvent;
use crate::decoder::FieldReader;
use crate::error::DecodeError;

const CREDENTIAL_ID_FIELDS: &[&str] = &["certificate_id", "cert_id", "object_id", "id"];
const ISSUER_FIELDS: &[&str] = &["issuer", "issuer_address", "institution"];
const RECIPIENT_FIELDS: &[&str] = &["recipient", "owner", "holder"];

/// Parsed issuance event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceEvent {
    /// Identifier of the credential object that was created.
    pub credential_id: String,

    /// Issuer address embedded in the event body.
    pub issuer: String,

    /// Recipient, when the event carries one.
    pub recipient: Option<String>,

    /// Emitting transaction, when known.
    pub tx_digest: Option<String>,
}

impl IssuanceEvent {
    /// Parse an issuance event from a raw log entry.
    ///
    /// The caller is expected to have checked the event type already.
    pub fn from_event(event: &RawEvent) -> Result<Self, DecodeError> {
        let body = match event.parsed_json.as_ref() {
            Some(Value::Object(body)) => body,
            _ => return Err(DecodeError::MalformedEvent("missing event body".to_string())),
        };
        let reader = FieldReader::new(body);

        let credential_id = reader
            .text(CREDENTIAL_ID_FIELDS)
            .ok_or_else(|| DecodeError::MalformedEvent("missing credential id".to_string()))?;
        let issuer = reader
            .text(ISSUER_FIELDS)
            .ok_or_else(|| DecodeError::MalformedEvent("missing issuer".to_string()))?;

        Ok(Self {
            credential_id: credential_id.to_string(),
            issuer: issuer.to_string(),
            recipient: reader.text(RECIPIENT_FIELDS).map(str::to_string),
            tx_digest: event.id.as_ref().map(|id| id.tx_digest.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::raw::EventId;
    use serde_json::json;

    fn event(body: Value) -> RawEvent {
        RawEvent {
            id: Some(EventId {
                tx_digest: "T1".to_string(),
                event_seq: "0".to_string(),
            }),
            event_type: "0xpkg::certificate::CertificateIssued".to_string(),
            sender: Some("0xissuer".to_string()),
            parsed_json: Some(body),
        }
    }

    #[test]
    fn test_parse_current_fields() {
        let parsed = IssuanceEvent::from_event(&event(json!({
            "certificate_id": "0xcert",
            "issuer": "0xissuer",
            "recipient": "0xholder",
            "cert_type": 1
        })))
        .unwrap();

        assert_eq!(parsed.credential_id, "0xcert");
        assert_eq!(parsed.issuer, "0xissuer");
        assert_eq!(parsed.recipient.as_deref(), Some("0xholder"));
        assert_eq!(parsed.tx_digest.as_deref(), Some("T1"));
    }

    #[test]
    fn test_parse_aliases() {
        let parsed = IssuanceEvent::from_event(&event(json!({
            "cert_id": "0xcert",
            "institution": "0xissuer"
        })))
        .unwrap();
        assert_eq!(parsed.credential_id, "0xcert");
        assert_eq!(parsed.issuer, "0xissuer");
        assert_eq!(parsed.recipient, None);
    }

    #[test]
    fn test_malformed() {
        assert!(IssuanceEvent::from_event(&event(json!({"issuer": "0xissuer"}))).is_err());
        assert!(IssuanceEvent::from_event(&event(json!({"certificate_id": "0xc"}))).is_err());

        let mut bodiless = event(json!({}));
        bodiless.parsed_json = None;
        assert!(matches!(
            IssuanceEvent::from_event(&bodiless),
            Err(DecodeError::MalformedEvent(_))
        ));
    }
}
