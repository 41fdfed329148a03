use std::borrow::Borrow;

use serde::Serialize;

use super::rows;
use crate::data::model::Record;
use crate::stats;

/// Pearson correlation of one factor against the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Correlation {
    pub factor: String,
    pub coefficient: f64,
    /// Records where both the factor and the target were present.
    pub pairs: usize,
}

/// Square correlation matrix over `factors`, row-major.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationMatrix {
    pub factors: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.factors.iter().position(|f| f == row)?;
        let j = self.factors.iter().position(|f| f == col)?;
        Some(self.values[i][j])
    }
}

/// `(x, y)` for every record where both columns hold a finite number.
///
/// Pairing happens per record, so a gap in either column drops the record
/// from both series.
pub fn paired_values<R: Borrow<Record>>(records: &[R], x: &str, y: &str) -> Vec<(f64, f64)> {
    rows(records)
        .filter_map(|r| Some((r.number(x)?, r.number(y)?)))
        .collect()
}

fn correlate<R: Borrow<Record>>(records: &[R], x: &str, y: &str) -> (f64, usize) {
    let pairs = paired_values(records, x, y);
    let (xs, ys) = stats::unzip_pairs(&pairs);
    (stats::pearson(&xs, &ys), pairs.len())
}

/// Correlation of each factor with `target`, strongest first.
///
/// Ties in `|coefficient|` keep the order the factors were given in.
pub fn correlations_against_target<R, S>(
    records: &[R],
    factors: &[S],
    target: &str,
) -> Vec<Correlation>
where
    R: Borrow<Record>,
    S: AsRef<str>,
{
    let mut out: Vec<Correlation> = factors
        .iter()
        .map(|factor| {
            let factor = factor.as_ref();
            let (coefficient, pairs) = correlate(records, factor, target);
            if pairs < 2 {
                log::debug!("correlation of {factor} rests on {pairs} paired records");
            }
            Correlation {
                factor: factor.to_string(),
                coefficient,
                pairs,
            }
        })
        .collect();

    out.sort_by(|a, b| b.coefficient.abs().total_cmp(&a.coefficient.abs()));
    out
}

/// Pairwise correlations between `factors`.
///
/// The diagonal is computed like any other cell, so a constant column
/// correlates 0 with itself.
pub fn correlation_matrix<R, S>(records: &[R], factors: &[S]) -> CorrelationMatrix
where
    R: Borrow<Record>,
    S: AsRef<str>,
{
    let n = factors.len();
    let mut values = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in i..n {
            let (r, _) = correlate(records, factors[i].as_ref(), factors[j].as_ref());
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    CorrelationMatrix {
        factors: factors.iter().map(|f| f.as_ref().to_string()).collect(),
        values,
    }
}
