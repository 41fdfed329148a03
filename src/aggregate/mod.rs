//! Aggregation engine: pure transforms from a record set to chart-ready structures.
//!
//! ```text
//!   filtered records ──┬── correlation   → Vec<Correlation>, CorrelationMatrix
//!                      ├── binning       → Vec<Bin>
//!                      ├── category      → Vec<CategoryGroup>
//!                      ├── distribution  → Vec<TierDistribution>, [TierComposition; 3]
//!                      ├── interaction   → Vec<Interaction>
//!                      ├── impact        → Vec<ImpactScore>
//!                      └── summary       → Summary
//! ```
//!
//! Every function takes `&[R]` with `R: Borrow<Record>`, so both owned
//! records and the `Vec<&Record>` returned by the filter stage work.

pub mod binning;
pub mod category;
pub mod correlation;
pub mod distribution;
pub mod impact;
pub mod interaction;
pub mod summary;

use std::borrow::Borrow;

pub use binning::Bin;
pub use category::CategoryGroup;
pub use correlation::{Correlation, CorrelationMatrix};
pub use distribution::{
    CategoryShare, PerformanceTier, TierComposition, TierDistribution, TierShare,
};
pub use impact::ImpactScore;
pub use interaction::Interaction;
pub use summary::Summary;

use crate::data::filter::{apply_filters, FilterCriteria};
use crate::data::model::Record;
use crate::data::schema::Schema;

pub(crate) fn rows<R: Borrow<Record>>(records: &[R]) -> impl Iterator<Item = &Record> + '_ {
    records.iter().map(<R as Borrow<Record>>::borrow)
}

// ---------------------------------------------------------------------------
// Analyzer – the aggregators bound to one schema
// ---------------------------------------------------------------------------

/// Entry point for the presentation layer.
///
/// Holds only the immutable [`Schema`]; every method is a pure function of
/// its arguments.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    schema: Schema,
}

impl Analyzer {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    fn target(&self) -> &str {
        &self.schema.target
    }

    pub fn filter<'a>(&self, records: &'a [Record], criteria: &FilterCriteria) -> Vec<&'a Record> {
        apply_filters(records, criteria, &self.schema)
    }

    /// Numeric factors against the target, strongest first.
    pub fn correlations<R: Borrow<Record>>(&self, records: &[R]) -> Vec<Correlation> {
        self.correlations_against_target(records, &self.schema.numeric_factors)
    }

    pub fn correlations_against_target<R, S>(
        &self,
        records: &[R],
        factors: &[S],
    ) -> Vec<Correlation>
    where
        R: Borrow<Record>,
        S: AsRef<str>,
    {
        correlation::correlations_against_target(records, factors, self.target())
    }

    /// Matrix over the numeric factors followed by the target.
    pub fn correlation_matrix<R: Borrow<Record>>(&self, records: &[R]) -> CorrelationMatrix {
        let mut columns: Vec<&str> =
            self.schema.numeric_factors.iter().map(String::as_str).collect();
        columns.push(self.target());
        correlation::correlation_matrix(records, &columns)
    }

    pub fn bin<R: Borrow<Record>>(
        &self,
        records: &[R],
        factor: &str,
        bin_count: usize,
    ) -> Vec<Bin> {
        binning::bin(records, factor, self.target(), bin_count)
    }

    /// Binned trend of `factor` using the schema's bin count.
    pub fn trend<R: Borrow<Record>>(&self, records: &[R], factor: &str) -> Vec<Bin> {
        self.bin(records, factor, self.schema.trend_bins)
    }

    pub fn group_by_category<R: Borrow<Record>>(
        &self,
        records: &[R],
        column: &str,
    ) -> Vec<CategoryGroup> {
        category::group_by_category(records, column, self.target(), &self.schema.ordinal_vocabulary)
    }

    pub fn performance_distribution<R: Borrow<Record>>(
        &self,
        records: &[R],
        column: &str,
    ) -> Vec<TierDistribution> {
        distribution::performance_distribution(
            records,
            column,
            self.target(),
            &self.schema.tiers,
            &self.schema.ordinal_vocabulary,
        )
    }

    pub fn tier_composition<R: Borrow<Record>>(
        &self,
        records: &[R],
        column: &str,
    ) -> [TierComposition; 3] {
        distribution::tier_composition(
            records,
            column,
            self.target(),
            &self.schema.tiers,
            &self.schema.ordinal_vocabulary,
        )
    }

    pub fn interaction<R: Borrow<Record>>(
        &self,
        records: &[R],
        factor1: &str,
        factor2: &str,
    ) -> Vec<Interaction> {
        interaction::interaction(records, factor1, factor2, self.target())
    }

    pub fn impact_scores<R, S>(&self, records: &[R], factors: &[S]) -> Vec<ImpactScore>
    where
        R: Borrow<Record>,
        S: AsRef<str>,
    {
        impact::impact_scores(records, factors, self.target(), &self.schema)
    }

    /// Impact of every factor the schema declares.
    pub fn rank_factors<R: Borrow<Record>>(&self, records: &[R]) -> Vec<ImpactScore> {
        let factors: Vec<&str> = self.schema.factors().collect();
        self.impact_scores(records, &factors)
    }

    pub fn summary<R: Borrow<Record>>(&self, records: &[R]) -> Summary {
        summary::summary(records, self.target(), &self.schema.tiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;

    fn student(hours: f64, school: &str, gender: &str, score: f64) -> Record {
        [
            ("Hours_Studied", Value::from(hours)),
            ("School_Type", Value::from(school)),
            ("Gender", Value::from(gender)),
            ("Exam_Score", Value::from(score)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn analyzer_chains_filter_into_aggregates() {
        let records = vec![
            student(10.0, "Public", "Male", 62.0),
            student(20.0, "Public", "Female", 71.0),
            student(30.0, "Private", "Female", 84.0),
            student(25.0, "Private", "Male", 40.0),
        ];
        let analyzer = Analyzer::default();
        let visible = analyzer.filter(&records, &FilterCriteria::default());
        assert_eq!(visible.len(), 3);

        let summary = analyzer.summary(&visible);
        assert_eq!(summary.total, 3);

        let groups = analyzer.group_by_category(&visible, "School_Type");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, Value::from("Public"));

        let trend = analyzer.trend(&visible, "Hours_Studied");
        assert_eq!(trend.iter().map(|b| b.count).sum::<usize>(), 3);

        let ranked = analyzer.rank_factors(&visible);
        assert_eq!(ranked.len(), analyzer.schema().factors().count());

        let matrix = analyzer.correlation_matrix(&visible);
        assert_eq!(matrix.factors.last().map(String::as_str), Some("Exam_Score"));
    }

    #[test]
    fn aggregates_serialize_in_camel_case() {
        let records = vec![student(10.0, "Public", "Male", 70.0)];
        let bins = Analyzer::default().bin(&records, "Hours_Studied", 3);
        let json = serde_json::to_value(&bins).unwrap();
        assert_eq!(json[0]["binStart"], 10.0);
        assert_eq!(json[0]["avgScore"], 70.0);
        assert_eq!(json[0]["count"], 1);
    }
}
