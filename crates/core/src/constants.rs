//! Canonical constants for CertChain.
//!
//! Move names must match the deployed `certificate` module. The package
//! address is deployment-specific and lives in configuration, never here.

/// Move module that defines the credential types.
pub const MODULE_CERTIFICATE: &str = "certificate";

/// Struct name of a credential object.
pub const STRUCT_CERTIFICATE: &str = "Certificate";

/// Struct name of the issuance event.
pub const STRUCT_CERTIFICATE_ISSUED: &str = "CertificateIssued";

/// Struct name of a holder profile object.
pub const STRUCT_USER_PROFILE: &str = "UserProfile";

/// Struct name of the issuer capability object.
pub const STRUCT_ADMIN_CAP: &str = "AdminCap";

/// Prefix every ledger object identifier carries.
pub const OBJECT_ID_PREFIX: &str = "0x";

/// Length of a canonical object identifier: `0x` followed by 32 bytes of hex.
pub const OBJECT_ID_LENGTH: usize = 66;

/// Issuer label used when the payload carries none.
pub const UNKNOWN_INSTITUTION: &str = "Unknown Institution";

/// Title used when the payload carries none.
pub const DEFAULT_TITLE: &str = "Untitled Certificate";

/// Description used when the payload carries none.
pub const DEFAULT_DESCRIPTION: &str = "No description provided";

/// Baseline category (Course).
pub const DEFAULT_CATEGORY: u8 = 1;

/// Lowest trust rank (Novice).
pub const DEFAULT_TRUST_RANK: u8 = 0;

/// `expires_at_ms` sentinel for credentials without an expiry.
pub const NEVER_EXPIRES: u64 = 0;

/// Display names for the known credential categories.
pub const CATEGORY_NAMES: [(u8, &str); 5] = [
    (1, "Course"),
    (2, "Degree"),
    (3, "Skill"),
    (4, "Achievement"),
    (5, "Bootcamp"),
];

/// Display names for the trust ranks.
pub const TRUST_RANK_NAMES: [(u8, &str); 5] = [
    (0, "Novice"),
    (1, "Intermediate"),
    (2, "Advanced"),
    (3, "Expert"),
    (4, "Master"),
];

/// Holdings needed for the bronze collector badge.
pub const COLLECTOR_BRONZE: usize = 5;
/// Holdings needed for the silver collector badge.
pub const COLLECTOR_SILVER: usize = 10;
/// Holdings needed for the gold collector badge.
pub const COLLECTOR_GOLD: usize = 20;
