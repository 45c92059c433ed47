//! Achievement tiers.
//!
//! Maps a monotonic issued-count to a ranked tier. The mapping is a step
//! function over the declared thresholds; it is never interpolated.

use crate::error::{CoreError, Result};
use crate::types::AchievementTier;

fn tier(
    rank: u8,
    id: &str,
    name: &str,
    description: &str,
    required_count: u64,
    benefits: &[&str],
) -> AchievementTier {
    AchievementTier {
        tier: rank,
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        required_count,
        benefits: benefits.iter().map(|b| b.to_string()).collect(),
    }
}

/// The issuer tier ladder shipped with the application.
pub fn standard_tiers() -> Vec<AchievementTier> {
    vec![
        tier(
            1,
            "starter",
            "Certificate Starter",
            "Issue your first certificate",
            1,
            &["Access to basic certificate templates"],
        ),
        tier(
            2,
            "educator",
            "Emerging Educator",
            "Issue 5 certificates",
            5,
            &["Unlock skill badges", "Basic analytics"],
        ),
        tier(
            3,
            "instructor",
            "Certified Instructor",
            "Issue 10 certificates",
            10,
            &["Batch issuance", "Custom templates", "Advanced analytics"],
        ),
        tier(
            4,
            "institution",
            "Trusted Institution",
            "Issue 25 certificates",
            25,
            &[
                "Institution verification badge",
                "Priority indexing",
                "API access",
            ],
        ),
        tier(
            5,
            "academy",
            "Renowned Academy",
            "Issue 50 certificates",
            50,
            &[
                "Featured institution status",
                "Custom branding",
                "Dedicated support",
            ],
        ),
        tier(
            6,
            "university",
            "Elite University",
            "Issue 100 certificates",
            100,
            &[
                "Governance participation",
                "Revenue sharing",
                "Partnership opportunities",
            ],
        ),
        tier(
            7,
            "legend",
            "Educational Legend",
            "Issue 250+ certificates",
            250,
            &[
                "All features unlocked",
                "Platform ambassador",
                "Lifetime benefits",
            ],
        ),
    ]
}

/// An ordered, non-empty tier ladder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierTable {
    tiers: Vec<AchievementTier>,
}

impl TierTable {
    /// Build a table, validating that it is non-empty and that thresholds
    /// never decrease in declaration order.
    pub fn new(tiers: Vec<AchievementTier>) -> Result<Self> {
        if tiers.is_empty() {
            return Err(CoreError::EmptyTierTable);
        }
        for (index, pair) in tiers.windows(2).enumerate() {
            if pair[1].required_count < pair[0].required_count {
                return Err(CoreError::TierOrder {
                    index: index + 1,
                    required: pair[1].required_count,
                    previous: pair[0].required_count,
                });
            }
        }
        Ok(Self { tiers })
    }

    /// The standard issuer ladder.
    pub fn standard() -> Self {
        Self {
            tiers: standard_tiers(),
        }
    }

    /// All tiers in declaration order.
    pub fn tiers(&self) -> &[AchievementTier] {
        &self.tiers
    }

    /// The first declared tier.
    pub fn baseline(&self) -> &AchievementTier {
        &self.tiers[0]
    }

    /// The highest tier reached at `count`.
    ///
    /// Below the first threshold this is still the baseline tier. When several
    /// tiers share the highest reached threshold, the earliest declared wins.
    pub fn current_tier(&self, count: u64) -> &AchievementTier {
        let mut current = self.baseline();
        for tier in &self.tiers {
            if tier.required_count > count {
                break;
            }
            if tier.required_count > current.required_count {
                current = tier;
            }
        }
        current
    }

    /// The first declared tier not yet reached, `None` at the top of the ladder.
    pub fn next_tier(&self, count: u64) -> Option<&AchievementTier> {
        self.tiers.iter().find(|tier| tier.required_count > count)
    }

    /// Progress from the current tier towards the next one, in `0.0..=100.0`.
    ///
    /// Exactly `100.0` once no next tier exists.
    pub fn progress_percent(&self, count: u64) -> f64 {
        let Some(next) = self.next_tier(count) else {
            return 100.0;
        };
        let current = self.current_tier(count);

        let range = next.required_count.saturating_sub(current.required_count);
        if range == 0 || count < current.required_count {
            return 0.0;
        }

        let progress = (count - current.required_count) as f64 * 100.0 / range as f64;
        progress.clamp(0.0, 100.0)
    }

    /// Every tier reached at `count`, in declaration order.
    pub fn unlocked(&self, count: u64) -> Vec<&AchievementTier> {
        self.tiers
            .iter()
            .filter(|tier| tier.required_count <= count)
            .collect()
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_tier_boundaries() {
        let table = TierTable::standard();
        assert_eq!(table.current_tier(0).id, "starter");
        assert_eq!(table.current_tier(1).id, "starter");
        assert_eq!(table.current_tier(4).id, "starter");
        assert_eq!(table.current_tier(5).id, "educator");
        assert_eq!(table.current_tier(24).id, "instructor");
        assert_eq!(table.current_tier(25).id, "institution");
        assert_eq!(table.current_tier(249).id, "university");
        assert_eq!(table.current_tier(250).id, "legend");
        assert_eq!(table.current_tier(10_000).id, "legend");
    }

    #[test]
    fn test_zero_count_is_baseline_with_no_progress() {
        let table = TierTable::standard();
        assert_eq!(table.current_tier(0).required_count, 1);
        assert_eq!(table.next_tier(0).unwrap().id, "starter");
        assert_eq!(table.progress_percent(0), 0.0);
    }

    #[test]
    fn test_final_threshold_is_max_tier() {
        let table = TierTable::standard();
        assert!(table.next_tier(250).is_none());
        assert_eq!(table.progress_percent(250), 100.0);
        assert_eq!(table.progress_percent(999), 100.0);
    }

    #[test]
    fn test_progress_between_tiers() {
        let table = TierTable::standard();
        // educator (5) -> instructor (10)
        assert_eq!(table.progress_percent(5), 0.0);
        assert_eq!(table.progress_percent(7), 40.0);
        // starter (1) -> educator (5)
        assert_eq!(table.progress_percent(3), 50.0);
    }

    #[test]
    fn test_tier_monotonicity() {
        let table = TierTable::standard();
        let mut previous = table.current_tier(0).tier;
        for count in 1..=400 {
            let rank = table.current_tier(count).tier;
            assert!(rank >= previous, "rank dropped at count {count}");
            let progress = table.progress_percent(count);
            assert!((0.0..=100.0).contains(&progress));
            previous = rank;
        }
    }

    #[test]
    fn test_shared_threshold_tie_break() {
        let table = TierTable::new(vec![
            tier(1, "a", "A", "", 0, &[]),
            tier(2, "b", "B", "", 3, &[]),
            tier(3, "c", "C", "", 3, &[]),
            tier(4, "d", "D", "", 6, &[]),
        ])
        .unwrap();

        // Earliest declared tier wins among tiers sharing the reached threshold.
        assert_eq!(table.current_tier(3).id, "b");
        assert_eq!(table.current_tier(5).id, "b");
        // First exceeding tier wins for the next step.
        assert_eq!(table.next_tier(2).unwrap().id, "b");
        assert_eq!(table.next_tier(3).unwrap().id, "d");
    }

    #[test]
    fn test_unlocked() {
        let table = TierTable::standard();
        assert!(table.unlocked(0).is_empty());
        let ids: Vec<_> = table.unlocked(10).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["starter", "educator", "instructor"]);
    }

    #[test]
    fn test_table_validation() {
        assert_eq!(TierTable::new(vec![]), Err(CoreError::EmptyTierTable));
        let err = TierTable::new(vec![tier(1, "a", "A", "", 5, &[]), tier(2, "b", "B", "", 4, &[])])
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::TierOrder {
                index: 1,
                required: 4,
                previous: 5
            }
        );
    }
}
