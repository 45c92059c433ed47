//! Error types for the core crate.

use thiserror::Error;

/// Core error type.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    /// Category zero is reserved; categories start at 1.
    #[error("Invalid credential category: {0} (must be >= 1)")]
    InvalidCategory(u8),

    /// A tier table must contain at least the baseline tier.
    #[error("Tier table is empty")]
    EmptyTierTable,

    /// Thresholds must never decrease in declaration order.
    #[error("Tier {index} requires {required} but the previous tier requires {previous}")]
    TierOrder {
        /// Position of the offending tier.
        index: usize,
        /// Its threshold.
        required: u64,
        /// Threshold of the tier declared before it.
        previous: u64,
    },
}

/// Result type alias for CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;
