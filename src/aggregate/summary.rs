use std::borrow::Borrow;

use serde::Serialize;

use super::distribution::{percentage, PerformanceTier};
use super::rows;
use crate::data::model::Record;
use crate::data::schema::TierThresholds;
use crate::stats;

/// Headline numbers for the current selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Records with a valid target.
    pub total: usize,
    pub average: Option<f64>,
    pub median: Option<f64>,
    pub high_performer_pct: Option<f64>,
    pub low_performer_pct: Option<f64>,
    /// `(min, max)` of the target.
    pub score_extent: Option<(f64, f64)>,
}

pub fn summary<R: Borrow<Record>>(records: &[R], target: &str, tiers: &TierThresholds) -> Summary {
    let scores: Vec<f64> = rows(records).filter_map(|r| r.number(target)).collect();
    let total = scores.len();
    let in_tier = |tier| {
        scores
            .iter()
            .filter(|&&s| PerformanceTier::classify(s, tiers) == tier)
            .count()
    };

    Summary {
        total,
        average: stats::mean(&scores),
        median: stats::median(&scores),
        high_performer_pct: percentage(in_tier(PerformanceTier::High), total),
        low_performer_pct: percentage(in_tier(PerformanceTier::Low), total),
        score_extent: stats::extent(&scores),
    }
}
