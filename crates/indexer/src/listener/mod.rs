//! Ledger read side.
//!
//! This module provides:
//! - Raw response shapes as returned by the ledger's JSON-RPC read API
//! - The [`ReadService`] seam every engine entry point is handed
//! - A JSON-RPC implementation of it
//! - Issuance event parsing

pub mod events;
pub mod provider;
pub mod raw;

pub use events::IssuanceEvent;
pub use provider::{ReadService, SuiRpcProvider};
pub use raw::{EventFilter, Order, RawEvent, RawObject, RawTransaction, TransactionFilter};
