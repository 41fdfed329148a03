use std::borrow::Borrow;
use std::collections::HashMap;

use serde::Serialize;

use super::rows;
use crate::data::model::{Record, Value};
use crate::stats;

/// Mean target for one observed combination of two factor values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub factor1_value: Value,
    pub factor2_value: Value,
    pub avg_score: f64,
    pub count: usize,
}

/// Average `target` for every observed `(factor1, factor2)` combination.
///
/// Output follows nested first-seen order: `factor1` values as they first
/// appear, and within each the `factor2` values as they first appear.
/// Combinations without a valid target are omitted.
pub fn interaction<R: Borrow<Record>>(
    records: &[R],
    factor1: &str,
    factor2: &str,
    target: &str,
) -> Vec<Interaction> {
    let mut index: HashMap<(Value, Value), usize> = HashMap::new();
    let mut outer_index: HashMap<Value, usize> = HashMap::new();
    let mut outer: Vec<(Value, Vec<(Value, Vec<f64>)>)> = Vec::new();

    for r in rows(records) {
        let k1 = r.category(factor1);
        let k2 = r.category(factor2);

        let i = *outer_index.entry(k1.clone()).or_insert_with(|| {
            outer.push((k1.clone(), Vec::new()));
            outer.len() - 1
        });
        let inner = &mut outer[i].1;
        let j = *index.entry((k1, k2.clone())).or_insert_with(|| {
            inner.push((k2, Vec::new()));
            inner.len() - 1
        });
        if let Some(score) = r.number(target) {
            inner[j].1.push(score);
        }
    }

    outer
        .into_iter()
        .flat_map(|(v1, inner)| {
            inner.into_iter().filter_map(move |(v2, scores)| {
                Some(Interaction {
                    factor1_value: v1.clone(),
                    factor2_value: v2,
                    avg_score: stats::mean(&scores)?,
                    count: scores.len(),
                })
            })
        })
        .collect()
}
