use crate::aggregate::Analyzer;
use crate::data::filter::{filtered_indices, FilterCriteria, ScoreRange, Selection};
use crate::data::model::{Dataset, Record, Value};
use crate::data::schema::Schema;

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// The mutable half of the dashboard: the loaded dataset and the current
/// filter. Everything shown is derived from these through the [`Analyzer`].
#[derive(Debug, Default)]
pub struct DashboardState {
    analyzer: Analyzer,

    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Dataset>,

    /// Current filter panel selections.
    pub criteria: FilterCriteria,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Factor highlighted across charts.
    pub selected_factor: Option<String>,

    /// Category highlighted in the categorical charts.
    pub selected_category: Option<Value>,
}

impl DashboardState {
    pub fn new(schema: Schema) -> Self {
        let criteria = FilterCriteria::for_schema(&schema);
        Self {
            analyzer: Analyzer::new(schema),
            criteria,
            ..Default::default()
        }
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Ingest a newly loaded dataset and apply the current filters to it.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        log::info!("dataset ready: {} records", dataset.len());
        self.dataset = Some(dataset);
        self.refilter();
    }

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.criteria, self.analyzer.schema());
            log::debug!(
                "filter {:?} keeps {}/{} records",
                self.criteria,
                self.visible_indices.len(),
                ds.len()
            );
        }
    }

    /// Replace the whole filter and refilter.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.refilter();
    }

    pub fn set_school_type(&mut self, selection: Selection) {
        self.criteria.school_type = selection;
        self.refilter();
    }

    pub fn set_gender(&mut self, selection: Selection) {
        self.criteria.gender = selection;
        self.refilter();
    }

    pub fn set_exclude_learning_disabilities(&mut self, exclude: bool) {
        self.criteria.exclude_learning_disabilities = exclude;
        self.refilter();
    }

    /// Update one end of the score window, keeping the other.
    pub fn set_score_bounds(&mut self, min: Option<f64>, max: Option<f64>) {
        let [lo, hi] = self.analyzer.schema().score_bounds;
        let current = self
            .criteria
            .score_range
            .unwrap_or(ScoreRange::new(lo, hi));
        self.criteria.score_range = Some(ScoreRange::new(
            min.unwrap_or(current.min),
            max.unwrap_or(current.max),
        ));
        self.refilter();
    }

    /// Back to the schema defaults.
    pub fn reset_filters(&mut self) {
        self.criteria = FilterCriteria::for_schema(self.analyzer.schema());
        self.refilter();
    }

    /// Records passing the current filters, in dataset order.
    pub fn visible_records(&self) -> Vec<&Record> {
        match &self.dataset {
            Some(ds) => self
                .visible_indices
                .iter()
                .filter_map(|&i| ds.records.get(i))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn visible_count(&self) -> usize {
        self.visible_indices.len()
    }

    /// Toggle the highlighted factor.
    pub fn select_factor(&mut self, factor: &str) {
        if self.selected_factor.as_deref() == Some(factor) {
            self.selected_factor = None;
        } else {
            self.selected_factor = Some(factor.to_string());
        }
    }

    /// Toggle the highlighted category.
    pub fn select_category(&mut self, category: Value) {
        if self.selected_category.as_ref() == Some(&category) {
            self.selected_category = None;
        } else {
            self.selected_category = Some(category);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        let rows = [
            ("Public", "Male", "No", 70.0),
            ("Private", "Female", "Yes", 82.0),
            ("Public", "Female", "no", 58.0),
            ("Private", "Male", "No", 66.0),
        ];
        let records: Vec<Record> = rows
            .iter()
            .map(|&(school, gender, ld, score)| {
                [
                    ("School_Type", Value::from(school)),
                    ("Gender", Value::from(gender)),
                    ("Learning_Disabilities", Value::from(ld)),
                    ("Exam_Score", Value::from(score)),
                ]
                .into_iter()
                .collect()
            })
            .collect();
        Dataset::from_records(records, Vec::new())
    }

    #[test]
    fn filters_update_visible_records() {
        let mut state = DashboardState::new(Schema::default());
        assert_eq!(state.visible_count(), 0);
        state.set_dataset(dataset());
        assert_eq!(state.visible_count(), 4);

        state.set_gender("Female".into());
        assert_eq!(state.visible_indices, vec![1, 2]);

        state.set_exclude_learning_disabilities(true);
        assert_eq!(state.visible_indices, vec![2]);

        state.reset_filters();
        assert_eq!(state.visible_count(), 4);
        assert!(state.criteria.is_default());
    }

    #[test]
    fn score_bounds_keep_the_other_end() {
        let mut state = DashboardState::new(Schema::default());
        state.set_dataset(dataset());
        state.set_score_bounds(Some(65.0), None);
        assert_eq!(state.criteria.score_range, Some(ScoreRange::new(65.0, 101.0)));
        assert_eq!(state.visible_indices, vec![0, 1, 3]);

        let summary = state.analyzer().summary(&state.visible_records());
        assert_eq!(summary.total, 3);
    }

    #[test]
    fn reset_under_custom_schema_is_default() {
        let schema = Schema {
            score_bounds: [0.0, 100.0],
            ..Schema::default()
        };
        let mut state = DashboardState::new(schema);
        state.set_dataset(dataset());
        state.set_score_bounds(Some(65.0), None);
        assert!(!state.criteria.is_default_for(state.analyzer().schema()));

        state.reset_filters();
        assert!(state.criteria.is_default_for(state.analyzer().schema()));
        assert_eq!(state.visible_count(), 4);
    }

    #[test]
    fn selections_toggle() {
        let mut state = DashboardState::default();
        state.select_factor("Attendance");
        assert_eq!(state.selected_factor.as_deref(), Some("Attendance"));
        state.select_factor("Attendance");
        assert_eq!(state.selected_factor, None);

        state.select_category(Value::from("High"));
        state.select_category(Value::from("Low"));
        assert_eq!(state.selected_category, Some(Value::from("Low")));
    }
}
