//! Ledger-state reconciliation and verification for CertChain credentials.
//!
//! This crate provides:
//! - A read-service seam over the ledger plus a JSON-RPC implementation
//! - Schema-tolerant decoding of credential, profile and capability objects
//! - Two-phase reconstruction of an issuer's output (event log, then
//!   transaction history) with cross-phase deduplication
//! - Holder views over owned objects
//! - Local-first credential verification
//! - A periodic refresh loop for derived views
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  certchain-indexer (this)                    │
//! │                                              │
//! │   ┌──────────────┐     ┌──────────────────┐  │
//! │   │  Aggregator  │     │ OwnershipReader  │  │
//! │   │ events → txs │     │  owned objects   │  │
//! │   └──────┬───────┘     └────────┬─────────┘  │
//! │          │   ┌────────────┐     │            │
//! │          ├──►│  Decoder   │◄────┤            │
//! │          │   └────────────┘     │            │
//! │   ┌──────▼───────┐     ┌────────▼─────────┐  │
//! │   │ Deduplicator │     │ CredentialSet    │  │
//! │   └──────────────┘     │ by_owner/issuer  │  │
//! │                        └──────────────────┘  │
//! │   ┌──────────────┐                           │
//! │   │   Verifier   │ ← validate, then 1 lookup │
//! │   └──────┬───────┘                           │
//! │          ▼                                   │
//! │     ReadService  ← JSON-RPC full node        │
//! └──────────────────────────────────────────────┘
//!
//! ┌──────────────────────────────┐
//! │  certchain-core (pure)       │
//! │  • types, defaults           │
//! │  • tiers, badges             │
//! └──────────────────────────────┘
//! ```
//!
//! Nothing is persisted locally; every call re-derives its view from the
//! ledger.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregator;
pub mod clock;
pub mod config;
pub mod content;
pub mod decoder;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod listener;
pub mod projector;
pub mod refresh;
pub mod verification;

pub use aggregator::{AcquisitionPhase, AggregationReport, IssuanceAggregator, IssuerTarget};
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::Engine;
pub use error::{DecodeError, LookupError, ValidationError, VerifyError};
pub use listener::{ReadService, SuiRpcProvider};
pub use projector::{CredentialSet, Holdings, OwnershipReader};
pub use verification::{validate_object_id, Verifier};

// Re-export common types
pub use certchain_core::*;
