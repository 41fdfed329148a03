use std::borrow::Borrow;

use serde::Serialize;

use super::rows;
use crate::data::model::Record;
use crate::stats;

/// One non-empty interval of a numeric factor with the mean target inside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bin {
    pub bin_start: f64,
    pub bin_end: f64,
    pub bin_center: f64,
    pub avg_score: f64,
    /// Records in the interval that carry a valid target.
    pub count: usize,
}

/// Split the range of `factor` into `bin_count` equal-width intervals and
/// average `target` inside each.
///
/// Intervals are half-open `[start, end)` except the last, which is closed so
/// the maximum always lands somewhere. Intervals without a valid target are
/// left out. A factor with a single distinct value yields a single bin.
pub fn bin<R: Borrow<Record>>(
    records: &[R],
    factor: &str,
    target: &str,
    bin_count: usize,
) -> Vec<Bin> {
    if bin_count == 0 {
        return Vec::new();
    }

    let points: Vec<(f64, Option<f64>)> = rows(records)
        .filter_map(|r| Some((r.number(factor)?, r.number(target))))
        .collect();
    let factor_values: Vec<f64> = points.iter().map(|(v, _)| *v).collect();
    let Some((min, max)) = stats::extent(&factor_values) else {
        return Vec::new();
    };

    if max == min {
        log::debug!("{factor} has a single value {min}; using one bin");
        let scores: Vec<f64> = points.iter().filter_map(|(_, s)| *s).collect();
        return stats::mean(&scores)
            .map(|avg_score| Bin {
                bin_start: min,
                bin_end: max,
                bin_center: min,
                avg_score,
                count: scores.len(),
            })
            .into_iter()
            .collect();
    }

    let width = (max - min) / bin_count as f64;
    let last = bin_count - 1;
    let bounds = |i: usize| {
        let start = min + i as f64 * width;
        let end = if i == last { max } else { min + (i + 1) as f64 * width };
        (start, end)
    };

    let mut scores: Vec<Vec<f64>> = vec![Vec::new(); bin_count];
    for &(value, score) in &points {
        let Some(score) = score else { continue };
        scores[bin_index(value, min, width, last, &bounds)].push(score);
    }

    scores
        .iter()
        .enumerate()
        .filter_map(|(i, bucket)| {
            let avg_score = stats::mean(bucket)?;
            let (bin_start, bin_end) = bounds(i);
            Some(Bin {
                bin_start,
                bin_end,
                bin_center: (bin_start + bin_end) / 2.0,
                avg_score,
                count: bucket.len(),
            })
        })
        .collect()
}

/// Index of the bin whose bounds contain `value`.
///
/// The arithmetic guess is corrected against the actual bounds so rounding
/// never disagrees with the `start <= v < end` rule.
fn bin_index(
    value: f64,
    min: f64,
    width: f64,
    last: usize,
    bounds: impl Fn(usize) -> (f64, f64),
) -> usize {
    let mut i = (((value - min) / width).floor().max(0.0) as usize).min(last);
    while i > 0 && value < bounds(i).0 {
        i -= 1;
    }
    while i < last && value >= bounds(i).1 {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;
    use approx::assert_relative_eq;

    fn rec(hours: f64, score: f64) -> Record {
        [("Hours_Studied", hours), ("Exam_Score", score)].into_iter().collect()
    }

    #[test]
    fn maximum_lands_in_last_bin() {
        let records = vec![rec(10.0, 70.0), rec(20.0, 80.0), rec(30.0, 90.0)];
        let bins = bin(&records, "Hours_Studied", "Exam_Score", 2);
        assert_eq!(bins.len(), 2);

        assert_eq!((bins[0].bin_start, bins[0].bin_end), (10.0, 20.0));
        assert_eq!(bins[0].count, 1);
        assert_relative_eq!(bins[0].avg_score, 70.0);

        assert_eq!((bins[1].bin_start, bins[1].bin_end), (20.0, 30.0));
        assert_eq!(bins[1].count, 2);
        assert_relative_eq!(bins[1].avg_score, 85.0);
        assert_relative_eq!(bins[1].bin_center, 25.0);
    }

    #[test]
    fn empty_bins_are_omitted() {
        let records = vec![rec(0.0, 60.0), rec(1.0, 62.0), rec(10.0, 90.0)];
        let bins = bin(&records, "Hours_Studied", "Exam_Score", 5);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[1].bin_end, 10.0);
    }

    #[test]
    fn constant_factor_gives_one_bin() {
        let records = vec![rec(5.0, 60.0), rec(5.0, 80.0)];
        let bins = bin(&records, "Hours_Studied", "Exam_Score", 10);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].bin_start, 5.0);
        assert_eq!(bins[0].bin_end, 5.0);
        assert_eq!(bins[0].count, 2);
        assert_relative_eq!(bins[0].avg_score, 70.0);
    }

    #[test]
    fn missing_values_are_excluded() {
        let mut records = vec![rec(1.0, 60.0), rec(3.0, 70.0)];
        records.push(
            [("Hours_Studied", Value::from(2.0)), ("Exam_Score", Value::Null)]
                .into_iter()
                .collect(),
        );
        records.push([("Exam_Score", 99.0)].into_iter().collect());
        let bins = bin(&records, "Hours_Studied", "Exam_Score", 2);
        let total: usize = bins.iter().map(|b| b.count).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn degenerate_requests_are_empty() {
        let records = vec![rec(1.0, 60.0)];
        assert!(bin(&records, "Hours_Studied", "Exam_Score", 0).is_empty());
        assert!(bin(&records, "Attendance", "Exam_Score", 4).is_empty());
        let none: Vec<Record> = Vec::new();
        assert!(bin(&none, "Hours_Studied", "Exam_Score", 4).is_empty());
    }

    #[test]
    fn awkward_widths_still_cover_every_value() {
        let records: Vec<Record> = (0..=30).map(|i| rec(0.1 * i as f64, 70.0)).collect();
        let bins = bin(&records, "Hours_Studied", "Exam_Score", 7);
        let total: usize = bins.iter().map(|b| b.count).sum();
        assert_eq!(total, records.len());
    }
}
