use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::{Dataset, Record};
use super::schema::Schema;

// ---------------------------------------------------------------------------
// Filter criteria
// ---------------------------------------------------------------------------

/// A categorical choice: everything, or one exact label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl From<String> for Selection {
    fn from(s: String) -> Self {
        if s == "All" {
            Selection::All
        } else {
            Selection::Only(s)
        }
    }
}

impl From<&str> for Selection {
    fn from(s: &str) -> Self {
        Selection::from(s.to_string())
    }
}

impl From<Selection> for String {
    fn from(s: Selection) -> Self {
        match s {
            Selection::All => "All".to_string(),
            Selection::Only(v) => v,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => write!(f, "All"),
            Selection::Only(v) => write!(f, "{v}"),
        }
    }
}

impl Selection {
    fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => value == Some(wanted.as_str()),
        }
    }
}

/// Inclusive score window `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

impl ScoreRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, score: f64) -> bool {
        score >= self.min && score <= self.max
    }

    /// Scores inside both windows. Disjoint windows yield an empty range.
    pub fn intersect(&self, other: &ScoreRange) -> ScoreRange {
        ScoreRange::new(self.min.max(other.min), self.max.min(other.max))
    }
}

impl Default for ScoreRange {
    fn default() -> Self {
        Self::new(55.0, 101.0)
    }
}

/// Everything the filter panel can constrain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterCriteria {
    pub school_type: Selection,
    pub gender: Selection,
    /// Keep only records whose disability column reads "no" (any case).
    pub exclude_learning_disabilities: bool,
    /// `None` disables the score predicate entirely.
    pub score_range: Option<ScoreRange>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            school_type: Selection::All,
            gender: Selection::All,
            exclude_learning_disabilities: false,
            score_range: Some(ScoreRange::default()),
        }
    }
}

impl FilterCriteria {
    /// Default criteria with the score window taken from the schema.
    pub fn for_schema(schema: &Schema) -> Self {
        let [min, max] = schema.score_bounds;
        Self {
            score_range: Some(ScoreRange::new(min, max)),
            ..Self::default()
        }
    }

    /// Restore every field to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Whether nothing is constrained beyond the schema's default window.
    pub fn is_default_for(&self, schema: &Schema) -> bool {
        *self == Self::for_schema(schema)
    }

    /// Combine two criteria so that filtering by the result equals filtering
    /// by `self` and then by `other`, as long as they constrain different
    /// categorical columns.
    ///
    /// A selection in `other` replaces the one in `self`. Score windows are
    /// intersected, with `None` leaving the other side's window in place.
    pub fn merge(&self, other: &FilterCriteria) -> FilterCriteria {
        let pick = |mine: &Selection, theirs: &Selection| match theirs {
            Selection::All => mine.clone(),
            Selection::Only(_) => theirs.clone(),
        };
        FilterCriteria {
            school_type: pick(&self.school_type, &other.school_type),
            gender: pick(&self.gender, &other.gender),
            exclude_learning_disabilities: self.exclude_learning_disabilities
                || other.exclude_learning_disabilities,
            score_range: match (self.score_range, other.score_range) {
                (Some(a), Some(b)) => Some(a.intersect(&b)),
                (a, None) => a,
                (None, b) => b,
            },
        }
    }

    /// Whether `record` passes every active predicate.
    pub fn accepts(&self, record: &Record, schema: &Schema) -> bool {
        let cols = &schema.filter_columns;

        if !self.school_type.matches(record.text(&cols.school_type)) {
            return false;
        }
        if !self.gender.matches(record.text(&cols.gender)) {
            return false;
        }
        if self.exclude_learning_disabilities {
            let no_disability = record
                .text(&cols.learning_disabilities)
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("no"));
            if !no_disability {
                return false;
            }
        }
        if let Some(range) = &self.score_range {
            match record.number(&schema.target) {
                Some(score) if range.contains(score) => {}
                _ => return false,
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Filter stage
// ---------------------------------------------------------------------------

/// Records passing `criteria`, in input order. The input is left untouched.
pub fn apply_filters<'a>(
    records: &'a [Record],
    criteria: &FilterCriteria,
    schema: &Schema,
) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|r| criteria.accepts(r, schema))
        .collect()
}

/// Return indices of records that pass all active filters.
pub fn filtered_indices(
    dataset: &Dataset,
    criteria: &FilterCriteria,
    schema: &Schema,
) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| criteria.accepts(r, schema))
        .map(|(i, _)| i)
        .collect()
}
