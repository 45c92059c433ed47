//! # CertChain Core
//!
//! Core types, constants and pure calculators for the CertChain credential engine.
//!
//! This crate has no I/O. It defines the normalized shapes that the indexer
//! produces from raw ledger reads, plus the rules that are computed from them.
//!
//! ## Features
//!
//! - **Domain Types**: Credential, UserProfile, AdminCap, VerificationVerdict
//! - **Constants**: default values for missing fields, object-id format, Move names
//! - **Tiers**: issued-count to achievement tier (step function) and progress
//! - **Badges**: holder-side collector milestones

#![warn(missing_docs)]

pub mod badges;
pub mod constants;
pub mod error;
pub mod tiers;
pub mod types;

// Re-export commonly used items
pub use badges::{collector_badges, Badge, BadgeRarity};
pub use constants::*;
pub use error::{CoreError, Result};
pub use tiers::{standard_tiers, TierTable};
pub use types::*;
