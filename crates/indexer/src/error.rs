//! Error taxonomy for ledger reconciliation and verification.
//!
//! Aggregation absorbs [`DecodeError`] and [`LookupError`] per record; the
//! verifier turns [`VerifyError`] into a negative verdict. None of these are
//! ever raised to the caller of an engine operation.

use thiserror::Error;

/// A payload was present but could not be turned into a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Neither a type tag nor content was returned for the object.
    #[error("object carries no type or content")]
    MissingContent,

    /// The type tag does not contain the expected suffix.
    #[error("type mismatch: expected *{expected}, found {found}")]
    WrongType {
        /// Expected type-name suffix.
        expected: String,
        /// Type tag actually present.
        found: String,
    },

    /// The type matched but none of the known fields could be resolved.
    #[error("no decodable fields")]
    NoFields,

    /// No structural, embedded or fallback identifier was available.
    #[error("no identifier available")]
    MissingId,

    /// An event payload lacked a required field.
    #[error("malformed event: {0}")]
    MalformedEvent(String),
}

/// A read against the ledger service failed.
#[derive(Error, Debug)]
pub enum LookupError {
    /// Connection, timeout or body-read failure.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
    },

    /// The response did not have the expected shape.
    #[error("malformed RPC response: {0}")]
    Malformed(String),

    /// The service is not serving reads right now.
    #[error("read service unavailable: {0}")]
    Unavailable(String),
}

/// A caller-supplied credential identifier is malformed.
///
/// The display strings are surfaced verbatim to end users.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Nothing was supplied.
    #[error("Certificate ID is required")]
    Empty,

    /// The `0x` marker is missing.
    #[error("Invalid certificate ID: expected a 0x-prefixed hexadecimal object ID")]
    MissingPrefix,

    /// Fewer characters than a full object identifier.
    #[error("Invalid certificate ID: too short ({len} characters, expected {expected})")]
    TooShort {
        /// Supplied length.
        len: usize,
        /// Required length.
        expected: usize,
    },

    /// More characters than a full object identifier.
    #[error("Invalid certificate ID: too long ({len} characters, expected {expected})")]
    TooLong {
        /// Supplied length.
        len: usize,
        /// Required length.
        expected: usize,
    },

    /// The part after the marker is not hex.
    #[error("Invalid certificate ID: contains non-hexadecimal characters")]
    NotHex,
}

/// Why a verification produced a negative verdict.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// Rejected locally; no network call was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Well-formed identifier, but no such object.
    #[error("Certificate not found on chain")]
    NotFound(String),

    /// The object exists but is not a credential.
    #[error("Object is not a valid certificate (type {0})")]
    WrongType(String),

    /// The object has the credential type but no usable fields.
    #[error("Certificate has an invalid structure")]
    InvalidStructure,

    /// The point lookup itself failed.
    #[error("Failed to fetch certificate: {0}")]
    Lookup(#[from] LookupError),
}
