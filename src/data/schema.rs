use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{Record, Value};

// ---------------------------------------------------------------------------
// Column kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    /// Classify an undeclared column by its first non-missing value.
    pub fn detect<'a, I>(records: I, column: &str) -> Option<ColumnKind>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        records
            .into_iter()
            .filter_map(|r| r.get(column))
            .find(|v| !v.is_missing())
            .map(|v| match v {
                Value::Number(_) => ColumnKind::Numeric,
                _ => ColumnKind::Categorical,
            })
    }
}

/// A categorical column together with its expected levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub name: String,
    #[serde(default)]
    pub levels: Vec<String>,
}

impl CategoricalColumn {
    fn new(name: &str, levels: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            levels: levels.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// Columns the filter stage reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterColumns {
    pub school_type: String,
    pub gender: String,
    pub learning_disabilities: String,
}

impl Default for FilterColumns {
    fn default() -> Self {
        Self {
            school_type: "School_Type".into(),
            gender: "Gender".into(),
            learning_disabilities: "Learning_Disabilities".into(),
        }
    }
}

/// Score thresholds separating the High / Medium / Low performance tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    /// Scores at or above this are `High`.
    pub high: f64,
    /// Scores at or above this (and below `high`) are `Medium`.
    pub medium: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            high: 75.0,
            medium: 65.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("target column must not be empty")]
    EmptyTarget,
    #[error("column '{0}' is declared more than once")]
    DuplicateColumn(String),
    #[error("target column '{0}' is also declared as a factor")]
    TargetIsFactor(String),
    #[error("tier thresholds out of order: medium {medium} must be below high {high}")]
    TierOrder { high: f64, medium: f64 },
    #[error("default score range [{min}, {max}] is empty")]
    EmptyScoreRange { min: f64, max: f64 },
}

/// Immutable description of the dataset the engine works on.
///
/// Every field has a default describing the student performance factors
/// dataset, so a JSON config only needs to list what differs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schema {
    /// Outcome column every aggregate is computed against.
    pub target: String,
    /// Numeric factors; coerced to numbers at load time.
    pub numeric_factors: Vec<String>,
    /// Categorical factors with their declared levels.
    pub categorical_factors: Vec<CategoricalColumn>,
    pub filter_columns: FilterColumns,
    /// Category labels with a canonical order; they sort ahead of other labels.
    pub ordinal_vocabulary: Vec<String>,
    pub tiers: TierThresholds,
    /// Inclusive target range applied by the default filter.
    pub score_bounds: [f64; 2],
    /// Bin count used by the trend charts.
    pub trend_bins: usize,
}

impl Default for Schema {
    fn default() -> Self {
        Self::student_performance()
    }
}

impl Schema {
    /// The student performance factors dataset.
    pub fn student_performance() -> Self {
        let numeric_factors = [
            "Hours_Studied",
            "Attendance",
            "Sleep_Hours",
            "Previous_Scores",
            "Tutoring_Sessions",
            "Physical_Activity",
        ];
        let lmh: &[&str] = &["Low", "Medium", "High"];
        let categorical_factors = vec![
            CategoricalColumn::new("Parental_Involvement", lmh),
            CategoricalColumn::new("Access_to_Resources", lmh),
            CategoricalColumn::new("Motivation_Level", lmh),
            CategoricalColumn::new("Family_Income", lmh),
            CategoricalColumn::new("Teacher_Quality", lmh),
            CategoricalColumn::new("School_Type", &["Public", "Private"]),
            CategoricalColumn::new("Peer_Influence", &["Negative", "Neutral", "Positive"]),
            CategoricalColumn::new("Learning_Disabilities", &["No", "Yes"]),
            CategoricalColumn::new("Distance_From_Home", &["Near", "Moderate", "Far"]),
            CategoricalColumn::new("Gender", &["Male", "Female"]),
        ];
        Self {
            target: "Exam_Score".into(),
            numeric_factors: numeric_factors.iter().map(|s| s.to_string()).collect(),
            categorical_factors,
            filter_columns: FilterColumns::default(),
            ordinal_vocabulary: ["Low", "Medium", "High", "Public", "Private", "Male", "Female"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            tiers: TierThresholds::default(),
            score_bounds: [55.0, 101.0],
            trend_bins: 10,
        }
    }

    /// Load and validate a schema from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading schema {}", path.display()))?;
        let schema: Schema = serde_json::from_str(&text).context("parsing schema JSON")?;
        schema.validate().context("validating schema")?;
        log::debug!(
            "loaded schema from {}: {} numeric, {} categorical factors",
            path.display(),
            schema.numeric_factors.len(),
            schema.categorical_factors.len()
        );
        Ok(schema)
    }

    pub fn validate(&self) -> std::result::Result<(), SchemaError> {
        if self.target.trim().is_empty() {
            return Err(SchemaError::EmptyTarget);
        }
        let mut seen = BTreeSet::new();
        for name in self.factors() {
            if name == self.target {
                return Err(SchemaError::TargetIsFactor(name.to_string()));
            }
            if !seen.insert(name) {
                return Err(SchemaError::DuplicateColumn(name.to_string()));
            }
        }
        if self.tiers.medium >= self.tiers.high {
            return Err(SchemaError::TierOrder {
                high: self.tiers.high,
                medium: self.tiers.medium,
            });
        }
        let [min, max] = self.score_bounds;
        if min > max {
            return Err(SchemaError::EmptyScoreRange { min, max });
        }
        Ok(())
    }

    /// Every factor, numeric first, in declaration order.
    pub fn factors(&self) -> impl Iterator<Item = &str> {
        self.numeric_factors
            .iter()
            .map(String::as_str)
            .chain(self.categorical_factors.iter().map(|c| c.name.as_str()))
    }

    /// Columns coerced to numbers at load time (numeric factors plus target).
    pub fn is_numeric_column(&self, column: &str) -> bool {
        column == self.target || self.numeric_factors.iter().any(|c| c == column)
    }

    /// Declared kind of `column`, `None` if the schema does not mention it.
    pub fn kind_of(&self, column: &str) -> Option<ColumnKind> {
        if self.is_numeric_column(column) {
            Some(ColumnKind::Numeric)
        } else if self.categorical_factors.iter().any(|c| c.name == column) {
            Some(ColumnKind::Categorical)
        } else {
            None
        }
    }

    /// Declared kind, falling back to probing the records.
    pub fn resolve_kind<'a, I>(&self, records: I, column: &str) -> ColumnKind
    where
        I: IntoIterator<Item = &'a Record>,
    {
        self.kind_of(column)
            .or_else(|| ColumnKind::detect(records, column))
            .unwrap_or(ColumnKind::Categorical)
    }

    pub fn levels_of(&self, column: &str) -> Option<&[String]> {
        self.categorical_factors
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.levels.as_slice())
    }
}
