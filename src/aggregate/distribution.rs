use std::borrow::Borrow;
use std::fmt;

use serde::Serialize;

use super::category::{bucket_scores, compare_categories};
use super::rows;
use crate::data::model::{Record, Value};
use crate::data::schema::TierThresholds;

// ---------------------------------------------------------------------------
// Performance tiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PerformanceTier {
    High,
    Medium,
    Low,
}

impl PerformanceTier {
    pub const ALL: [PerformanceTier; 3] = [Self::High, Self::Medium, Self::Low];

    pub fn classify(score: f64, tiers: &TierThresholds) -> Self {
        if score >= tiers.high {
            Self::High
        } else if score >= tiers.medium {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

/// `count / total * 100`, undefined for an empty total.
pub(crate) fn percentage(count: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| count as f64 / total as f64 * 100.0)
}

// ---------------------------------------------------------------------------
// Tier distribution per category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierShare {
    pub count: usize,
    /// `None` when the category has no valid scores.
    pub percentage: Option<f64>,
}

/// How one category's scores split across the three tiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierDistribution {
    pub category: Value,
    pub high: TierShare,
    pub medium: TierShare,
    pub low: TierShare,
    pub total: usize,
}

impl TierDistribution {
    pub fn share(&self, tier: PerformanceTier) -> &TierShare {
        match tier {
            PerformanceTier::High => &self.high,
            PerformanceTier::Medium => &self.medium,
            PerformanceTier::Low => &self.low,
        }
    }
}

/// Tier counts and percentages for every category of `column`.
pub fn performance_distribution<R: Borrow<Record>>(
    records: &[R],
    column: &str,
    target: &str,
    tiers: &TierThresholds,
    vocabulary: &[String],
) -> Vec<TierDistribution> {
    let mut out: Vec<TierDistribution> = bucket_scores(records, column, target)
        .into_iter()
        .map(|(category, scores)| {
            let mut counts = [0usize; 3];
            for &s in &scores {
                counts[PerformanceTier::classify(s, tiers) as usize] += 1;
            }
            let total = scores.len();
            let share = |count| TierShare {
                count,
                percentage: percentage(count, total),
            };
            TierDistribution {
                category,
                high: share(counts[PerformanceTier::High as usize]),
                medium: share(counts[PerformanceTier::Medium as usize]),
                low: share(counts[PerformanceTier::Low as usize]),
                total,
            }
        })
        .collect();

    out.sort_by(|a, b| compare_categories(&a.category, &b.category, vocabulary));
    out
}

// ---------------------------------------------------------------------------
// Category composition per tier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: Value,
    pub count: usize,
    pub percentage: Option<f64>,
}

/// Which categories make up one performance tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierComposition {
    pub tier: PerformanceTier,
    pub total: usize,
    pub categories: Vec<CategoryShare>,
}

/// Category breakdown of each tier, in High, Medium, Low order.
pub fn tier_composition<R: Borrow<Record>>(
    records: &[R],
    column: &str,
    target: &str,
    tiers: &TierThresholds,
    vocabulary: &[String],
) -> [TierComposition; 3] {
    PerformanceTier::ALL.map(|tier| {
        let in_tier: Vec<&Record> = rows(records)
            .filter(|r| {
                r.number(target)
                    .is_some_and(|s| PerformanceTier::classify(s, tiers) == tier)
            })
            .collect();
        let total = in_tier.len();

        let mut categories: Vec<CategoryShare> = bucket_scores(&in_tier, column, target)
            .into_iter()
            .map(|(category, scores)| CategoryShare {
                category,
                count: scores.len(),
                percentage: percentage(scores.len(), total),
            })
            .collect();
        categories.sort_by(|a, b| compare_categories(&a.category, &b.category, vocabulary));

        TierComposition {
            tier,
            total,
            categories,
        }
    })
}
