use std::borrow::Borrow;

use serde::Serialize;

use super::category::group_by_category;
use super::rows;
use crate::data::model::Record;
use crate::data::schema::{ColumnKind, Schema};
use crate::stats;

/// Fractions of the sorted target marking the top and bottom quartile cut-offs.
const TOP_FRACTION: f64 = 0.75;
const BOTTOM_FRACTION: f64 = 0.25;

/// Contrast of one factor between the top and bottom quartile of the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactScore {
    pub factor: String,
    /// `top_term - bottom_term`, a missing term counting as 0.
    pub impact: f64,
    pub kind: ColumnKind,
    /// Numeric: mean factor value in the top quartile.
    /// Categorical: best category average in the top quartile.
    pub top_term: Option<f64>,
    /// Numeric: mean factor value in the bottom quartile.
    /// Categorical: worst category average in the bottom quartile.
    pub bottom_term: Option<f64>,
}

/// Quartile partitions of the records by target.
///
/// Both bounds are inclusive, so on small or tied inputs the partitions
/// overlap.
#[derive(Debug)]
pub struct Partitions<'a> {
    pub top_threshold: f64,
    pub bottom_threshold: f64,
    pub top: Vec<&'a Record>,
    pub bottom: Vec<&'a Record>,
}

impl<'a> Partitions<'a> {
    /// `None` when no record has a valid target.
    pub fn split<R: Borrow<Record>>(records: &'a [R], target: &str) -> Option<Self> {
        let mut sorted: Vec<f64> = rows(records).filter_map(|r| r.number(target)).collect();
        sorted.sort_by(f64::total_cmp);

        let top_threshold = stats::value_at_fraction(&sorted, TOP_FRACTION)?;
        let bottom_threshold = stats::value_at_fraction(&sorted, BOTTOM_FRACTION)?;

        let top = rows(records)
            .filter(|r| r.number(target).is_some_and(|s| s >= top_threshold))
            .collect();
        let bottom = rows(records)
            .filter(|r| r.number(target).is_some_and(|s| s <= bottom_threshold))
            .collect();

        Some(Self {
            top_threshold,
            bottom_threshold,
            top,
            bottom,
        })
    }
}

fn numeric_mean(group: &[&Record], factor: &str) -> Option<f64> {
    let values: Vec<f64> = group.iter().filter_map(|r| r.number(factor)).collect();
    stats::mean(&values)
}

fn category_averages(group: &[&Record], factor: &str, target: &str) -> Vec<f64> {
    group_by_category(group, factor, target, &[])
        .into_iter()
        .filter_map(|g| g.avg_score)
        .collect()
}

/// Score each factor by how differently it behaves in the top and bottom
/// quartile of `target`, largest `|impact|` first.
///
/// Numeric factors compare the factor mean across the two quartiles.
/// Categorical factors compare the best category average in the top quartile
/// with the worst category average in the bottom quartile.
pub fn impact_scores<R, S>(
    records: &[R],
    factors: &[S],
    target: &str,
    schema: &Schema,
) -> Vec<ImpactScore>
where
    R: Borrow<Record>,
    S: AsRef<str>,
{
    let partitions = Partitions::split(records, target);
    if partitions.is_none() {
        log::debug!("no valid {target} values; every impact is 0");
    }

    let mut out: Vec<ImpactScore> = factors
        .iter()
        .map(|factor| {
            let factor = factor.as_ref();
            let kind = schema.resolve_kind(rows(records), factor);

            let (top_term, bottom_term) = match (&partitions, kind) {
                (None, _) => (None, None),
                (Some(p), ColumnKind::Numeric) => {
                    (numeric_mean(&p.top, factor), numeric_mean(&p.bottom, factor))
                }
                (Some(p), ColumnKind::Categorical) => (
                    stats::max(&category_averages(&p.top, factor, target)),
                    stats::min(&category_averages(&p.bottom, factor, target)),
                ),
            };

            ImpactScore {
                factor: factor.to_string(),
                impact: top_term.unwrap_or(0.0) - bottom_term.unwrap_or(0.0),
                kind,
                top_term,
                bottom_term,
            }
        })
        .collect();

    out.sort_by(|a, b| b.impact.abs().total_cmp(&a.impact.abs()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;
    use approx::assert_relative_eq;

    fn rec(hours: f64, sleep: f64, school: &str, score: f64) -> Record {
        [
            ("Hours_Studied", Value::from(hours)),
            ("Sleep_Hours", Value::from(sleep)),
            ("School_Type", Value::from(school)),
            ("Exam_Score", Value::from(score)),
        ]
        .into_iter()
        .collect()
    }

    fn sample() -> Vec<Record> {
        vec![
            rec(5.0, 7.0, "Public", 60.0),
            rec(10.0, 7.0, "Public", 64.0),
            rec(15.0, 7.0, "Private", 70.0),
            rec(20.0, 7.0, "Private", 76.0),
            rec(30.0, 7.0, "Public", 90.0),
        ]
    }

    #[test]
    fn partitions_use_floor_indices() {
        let records = sample();
        let p = Partitions::split(&records, "Exam_Score").unwrap();
        // sorted: 60 64 70 76 90 -> idx 3 and idx 1
        assert_eq!(p.top_threshold, 76.0);
        assert_eq!(p.bottom_threshold, 64.0);
        assert_eq!(p.top.len(), 2);
        assert_eq!(p.bottom.len(), 2);
    }

    #[test]
    fn numeric_and_categorical_impacts() {
        let records = sample();
        let out = impact_scores(
            &records,
            &["Sleep_Hours", "School_Type", "Hours_Studied"],
            "Exam_Score",
            &Schema::default(),
        );

        let hours = out.iter().find(|s| s.factor == "Hours_Studied").unwrap();
        assert_eq!(hours.kind, ColumnKind::Numeric);
        // top mean (20+30)/2 = 25, bottom mean (5+10)/2 = 7.5
        assert_relative_eq!(hours.impact, 17.5);

        let school = out.iter().find(|s| s.factor == "School_Type").unwrap();
        assert_eq!(school.kind, ColumnKind::Categorical);
        // top: Private 76, Public 90 -> max 90; bottom: Public 62 -> min 62
        assert_relative_eq!(school.impact, 28.0);

        let sleep = out.iter().find(|s| s.factor == "Sleep_Hours").unwrap();
        assert_eq!(sleep.impact, 0.0);

        assert_eq!(out[0].factor, "School_Type");
        assert_eq!(out[2].factor, "Sleep_Hours");
    }

    #[test]
    fn undeclared_columns_are_detected() {
        let records: Vec<Record> = [("Chess", 60.0), ("Drama", 80.0)]
            .into_iter()
            .map(|(club, score)| {
                [("Club", Value::from(club)), ("Exam_Score", Value::from(score))]
                    .into_iter()
                    .collect()
            })
            .collect();
        let out = impact_scores(&records, &["Club"], "Exam_Score", &Schema::default());
        assert_eq!(out[0].kind, ColumnKind::Categorical);
        // top: Drama 80; bottom: Chess 60
        assert_relative_eq!(out[0].impact, 20.0);
    }

    #[test]
    fn no_scores_means_zero_impact() {
        let records: Vec<Record> = vec![[("Hours_Studied", 3.0)].into_iter().collect()];
        let out = impact_scores(&records, &["Hours_Studied"], "Exam_Score", &Schema::default());
        assert_eq!(out[0].impact, 0.0);
        assert_eq!(out[0].top_term, None);
        assert_eq!(out[0].bottom_term, None);
    }
}
