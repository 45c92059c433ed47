//! Raw, schema-free ledger payloads.
//!
//! These mirror the JSON-RPC responses closely and make no assumptions about
//! the Move fields inside; the decoder interprets those.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Move object content block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawContent {
    /// Fully qualified Move type.
    #[serde(rename = "type", default)]
    pub type_tag: Option<String>,
    /// Field map.
    #[serde(default)]
    pub fields: Option<Value>,
}

/// A ledger object as returned with content and type included.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawObject {
    /// Structural object identifier.
    #[serde(default)]
    pub object_id: Option<String>,
    /// Fully qualified Move type.
    #[serde(rename = "type", default)]
    pub type_tag: Option<String>,
    /// Content block.
    #[serde(default)]
    pub content: Option<RawContent>,
}

impl RawObject {
    /// Build an object from its parts.
    pub fn new(object_id: impl Into<String>, type_tag: impl Into<String>, fields: Value) -> Self {
        let type_tag = type_tag.into();
        Self {
            object_id: Some(object_id.into()),
            type_tag: Some(type_tag.clone()),
            content: Some(RawContent {
                type_tag: Some(type_tag),
                fields: Some(fields),
            }),
        }
    }

    /// The object type, preferring the top-level tag over the content tag.
    pub fn type_tag(&self) -> Option<&str> {
        self.type_tag
            .as_deref()
            .or_else(|| self.content.as_ref().and_then(|c| c.type_tag.as_deref()))
    }

    /// The Move field map, if present.
    pub fn fields(&self) -> Option<&Value> {
        self.content.as_ref().and_then(|c| c.fields.as_ref())
    }
}

/// Event coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventId {
    /// Transaction that emitted the event.
    pub tx_digest: String,
    /// Position within the transaction.
    pub event_seq: String,
}

/// An entry in the append-only event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    /// Event coordinates.
    #[serde(default)]
    pub id: Option<EventId>,
    /// Fully qualified Move event type.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Transaction sender.
    #[serde(default)]
    pub sender: Option<String>,
    /// Decoded event body.
    #[serde(default)]
    pub parsed_json: Option<Value>,
}

/// A transaction block with its emitted events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    /// Transaction digest.
    pub digest: String,
    /// Emitted events, when requested.
    #[serde(default)]
    pub events: Option<Vec<RawEvent>>,
}

impl RawTransaction {
    /// Emitted events in emission order; empty when none were returned.
    pub fn events(&self) -> &[RawEvent] {
        self.events.as_deref().unwrap_or(&[])
    }
}

/// Event log filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EventFilter {
    /// Events of one fully qualified Move type.
    MoveEventType(String),
}

/// Transaction history filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TransactionFilter {
    /// Transactions sent by an address.
    FromAddress(String),
}

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Oldest first.
    Ascending,
    /// Most recent first.
    Descending,
}

impl Order {
    /// Value of the `descending_order` RPC parameter.
    pub const fn is_descending(&self) -> bool {
        matches!(self, Order::Descending)
    }
}
