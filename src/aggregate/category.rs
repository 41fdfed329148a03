use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use super::rows;
use crate::data::model::{Record, Value};
use crate::stats;

/// Target statistics for one value of a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGroup {
    /// `Value::Null` collects every record with a missing category.
    pub category: Value,
    pub avg_score: Option<f64>,
    pub median_score: Option<f64>,
    pub count: usize,
    /// Valid target values in record order.
    pub scores: Vec<f64>,
}

/// Ordering of category labels: vocabulary labels first, in vocabulary order,
/// then everything else lexicographically by label.
pub fn compare_categories(a: &Value, b: &Value, vocabulary: &[String]) -> Ordering {
    let rank = |v: &Value| v.as_str().and_then(|s| vocabulary.iter().position(|w| w == s));
    match (rank(a), rank(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.label().cmp(&b.label()),
    }
}

/// Records bucketed by `column`, first-seen order, each with its valid targets.
///
/// Records whose target is missing still create their bucket.
pub(crate) fn bucket_scores<R: Borrow<Record>>(
    records: &[R],
    column: &str,
    target: &str,
) -> Vec<(Value, Vec<f64>)> {
    let mut index: HashMap<Value, usize> = HashMap::new();
    let mut buckets: Vec<(Value, Vec<f64>)> = Vec::new();

    for r in rows(records) {
        let key = r.category(column);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            buckets.push((key, Vec::new()));
            buckets.len() - 1
        });
        if let Some(score) = r.number(target) {
            buckets[slot].1.push(score);
        }
    }
    buckets
}

/// Group records by the exact value of `column` and summarise `target` per group.
pub fn group_by_category<R: Borrow<Record>>(
    records: &[R],
    column: &str,
    target: &str,
    vocabulary: &[String],
) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = bucket_scores(records, column, target)
        .into_iter()
        .map(|(category, scores)| CategoryGroup {
            category,
            avg_score: stats::mean(&scores),
            median_score: stats::median(&scores),
            count: scores.len(),
            scores,
        })
        .collect();

    groups.sort_by(|a, b| compare_categories(&a.category, &b.category, vocabulary));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn vocab() -> Vec<String> {
        ["Low", "Medium", "High", "Public", "Private", "Male", "Female"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn rec(column: &str, category: Value, score: Value) -> Record {
        [(column, category), ("Exam_Score", score)].into_iter().collect()
    }

    #[test]
    fn known_vocabulary_order() {
        let records = vec![
            rec("Motivation_Level", "High".into(), 80.0.into()),
            rec("Motivation_Level", "Low".into(), 60.0.into()),
            rec("Motivation_Level", "Medium".into(), 70.0.into()),
            rec("Motivation_Level", "Low".into(), 64.0.into()),
        ];
        let groups = group_by_category(&records, "Motivation_Level", "Exam_Score", &vocab());
        let labels: Vec<String> = groups.iter().map(|g| g.category.to_string()).collect();
        assert_eq!(labels, vec!["Low", "Medium", "High"]);
        assert_eq!(groups[0].count, 2);
        assert_relative_eq!(groups[0].avg_score.unwrap(), 62.0);
        assert_relative_eq!(groups[0].median_score.unwrap(), 62.0);
        assert_eq!(groups[0].scores, vec![60.0, 64.0]);
    }

    #[test]
    fn public_before_private() {
        let records = vec![
            rec("School_Type", "Private".into(), 90.0.into()),
            rec("School_Type", "Public".into(), 60.0.into()),
        ];
        let groups = group_by_category(&records, "School_Type", "Exam_Score", &vocab());
        assert_eq!(groups[0].category, Value::from("Public"));
        assert_eq!(groups[1].category, Value::from("Private"));
    }

    #[test]
    fn known_keys_lead_unknown_keys() {
        let records = vec![
            rec("Distance_From_Home", "Near".into(), 70.0.into()),
            rec("Distance_From_Home", "Far".into(), 65.0.into()),
            rec("Distance_From_Home", "High".into(), 75.0.into()),
            rec("Distance_From_Home", "Moderate".into(), 68.0.into()),
        ];
        let groups = group_by_category(&records, "Distance_From_Home", "Exam_Score", &vocab());
        let labels: Vec<String> = groups.iter().map(|g| g.category.to_string()).collect();
        assert_eq!(labels, vec!["High", "Far", "Moderate", "Near"]);
    }

    #[test]
    fn missing_categories_form_one_group() {
        let records = vec![
            rec("Teacher_Quality", Value::Null, 61.0.into()),
            rec("Teacher_Quality", "".into(), 63.0.into()),
            rec("Teacher_Quality", "Zeta".into(), 70.0.into()),
        ];
        let groups = group_by_category(&records, "Teacher_Quality", "Exam_Score", &vocab());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, Value::Null);
        assert_eq!(groups[0].count, 2);
    }

    #[test]
    fn group_without_scores_is_undefined_not_zero() {
        let records = vec![
            rec("Gender", "Male".into(), Value::Null),
            rec("Gender", "Female".into(), 70.0.into()),
        ];
        let groups = group_by_category(&records, "Gender", "Exam_Score", &vocab());
        assert_eq!(groups[0].category, Value::from("Male"));
        assert_eq!(groups[0].count, 0);
        assert_eq!(groups[0].avg_score, None);
        assert_eq!(groups[0].median_score, None);
    }

    #[test]
    fn signed_zero_counts_share_a_group() {
        let records = vec![
            rec("Tutoring_Sessions", 0.0.into(), 66.0.into()),
            rec("Tutoring_Sessions", (-0.0).into(), 70.0.into()),
        ];
        let groups = group_by_category(&records, "Tutoring_Sessions", "Exam_Score", &vocab());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].category.to_string(), "0");
        assert_eq!(groups[0].count, 2);
    }
}
