//! Holder-side collector badges.

use serde::Serialize;

use crate::constants::{COLLECTOR_BRONZE, COLLECTOR_GOLD, COLLECTOR_SILVER};
use crate::types::Credential;

/// Badge rarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeRarity {
    /// Everyone gets these.
    Common,
    /// Takes some collecting.
    Rare,
    /// Takes a lot of collecting.
    Epic,
    /// Issuer authority.
    Legendary,
}

/// A badge and whether the holder has earned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    /// Stable identifier.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Short description.
    pub description: &'static str,
    /// Rarity.
    pub rarity: BadgeRarity,
    /// Whether the badge is earned.
    pub earned: bool,
    /// When it was earned, epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earned_at_ms: Option<u64>,
    /// What is still missing, for unearned badges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirement: Option<String>,
}

fn collector(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    rarity: BadgeRarity,
    needed: usize,
    issue_times: &[u64],
) -> Badge {
    let held = issue_times.len();
    let earned = held >= needed;
    Badge {
        id,
        name,
        description,
        rarity,
        earned,
        // The needed-th credential in issue order is the one that earned it.
        earned_at_ms: issue_times.get(needed - 1).copied(),
        requirement: (!earned).then(|| format!("{held}/{needed} certificates")),
    }
}

/// Compute the badge shelf for a holder.
///
/// `joined_at_ms` dates the welcome, admin and early-adopter badges; callers
/// pass the profile join time or their own clock when no profile exists.
pub fn collector_badges(holdings: &[Credential], is_admin: bool, joined_at_ms: u64) -> Vec<Badge> {
    let mut issue_times: Vec<u64> = holdings.iter().map(|c| c.issued_at_ms).collect();
    issue_times.sort_unstable();

    vec![
        Badge {
            id: "beginner",
            name: "Welcome Badge",
            description: "Your journey begins here",
            rarity: BadgeRarity::Common,
            earned: true,
            earned_at_ms: Some(joined_at_ms),
            requirement: None,
        },
        Badge {
            id: "admin",
            name: "Admin Badge",
            description: "Certificate issuer authority",
            rarity: BadgeRarity::Legendary,
            earned: is_admin,
            earned_at_ms: is_admin.then_some(joined_at_ms),
            requirement: (!is_admin).then(|| "Obtain an AdminCap to unlock".to_string()),
        },
        collector(
            "collector-bronze",
            "Bronze Collector",
            "Earned 5 certificates",
            BadgeRarity::Common,
            COLLECTOR_BRONZE,
            &issue_times,
        ),
        collector(
            "collector-silver",
            "Silver Collector",
            "Earned 10 certificates",
            BadgeRarity::Rare,
            COLLECTOR_SILVER,
            &issue_times,
        ),
        collector(
            "collector-gold",
            "Gold Collector",
            "Earned 20 certificates",
            BadgeRarity::Epic,
            COLLECTOR_GOLD,
            &issue_times,
        ),
        Badge {
            id: "early-adopter",
            name: "Early Adopter",
            description: "One of the first to join",
            rarity: BadgeRarity::Epic,
            earned: true,
            earned_at_ms: Some(joined_at_ms),
            requirement: None,
        },
    ]
}
