use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Value – a single cell of a student record
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Aggregators key `BTreeMap` / `HashMap` by category, so `Value` must be `Ord + Hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Null,
}

// -- Manual Eq/Ord/Hash so categories can live in BTreeSet and HashMap --

/// `-0.0` and `0.0` are the same category.
fn canonical(v: f64) -> f64 {
    v + 0.0
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Number(_) => 1,
                Text(_) => 2,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Number(a), Number(b)) => canonical(*a).total_cmp(&canonical(*b)),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Number(f) => canonical(*f).to_bits().hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Number(v) => write!(f, "{v}"),
            Value::Null => write!(f, "<missing>"),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl Value {
    /// Null, NaN/infinite numbers and blank strings all count as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Number(v) => !v.is_finite(),
            Value::Text(s) => s.trim().is_empty(),
        }
    }

    /// The value as a finite number. Text is never reinterpreted here.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Collapse every flavour of missing onto `Null` so they group together.
    pub fn normalized(&self) -> Value {
        match self {
            _ if self.is_missing() => Value::Null,
            Value::Number(v) => Value::Number(canonical(*v)),
            other => other.clone(),
        }
    }

    /// Label used for lexicographic ordering of categories.
    pub fn label(&self) -> Cow<'_, str> {
        match self {
            Value::Text(s) => Cow::Borrowed(s.as_str()),
            Value::Number(v) => Cow::Owned(v.to_string()),
            Value::Null => Cow::Borrowed(""),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one student row
// ---------------------------------------------------------------------------

/// A single student record: column name → value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Finite numeric value of `column`, `None` when absent or invalid.
    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_f64)
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_str)
    }

    /// Category key of `column`; absent and invalid values map to `Null`.
    pub fn category(&self, column: &str) -> Value {
        self.get(column).map_or(Value::Null, Value::normalized)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded record store
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column indices.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All records, in source order.
    pub records: Vec<Record>,
    /// Column names in source order (header order for CSV).
    pub column_names: Vec<String>,
    /// For each column the sorted set of unique values (filter choices).
    pub unique_values: BTreeMap<String, BTreeSet<Value>>,
}

impl Dataset {
    /// Build column indices from the loaded records.
    ///
    /// `column_names` keeps the given order; columns only seen inside records
    /// are appended alphabetically.
    pub fn from_records(records: Vec<Record>, column_names: Vec<String>) -> Self {
        let mut column_names = column_names;
        let mut unique_values: BTreeMap<String, BTreeSet<Value>> = BTreeMap::new();

        for rec in &records {
            for (col, val) in rec.columns() {
                unique_values
                    .entry(col.clone())
                    .or_default()
                    .insert(val.normalized());
            }
        }
        for col in unique_values.keys() {
            if !column_names.contains(col) {
                column_names.push(col.clone());
            }
        }
        Dataset {
            records,
            column_names,
            unique_values,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct non-missing values of `column`, e.g. to populate a filter choice.
    pub fn choices(&self, column: &str) -> Vec<&Value> {
        self.unique_values
            .get(column)
            .map(|vals| vals.iter().filter(|v| !v.is_missing()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_covers_null_nan_and_blank() {
        assert!(Value::Null.is_missing());
        assert!(Value::Number(f64::NAN).is_missing());
        assert!(Value::from("  ").is_missing());
        assert!(!Value::from("Low").is_missing());
        assert!(!Value::Number(0.0).is_missing());
    }

    #[test]
    fn category_normalizes_missing_to_null() {
        let rec: Record = [("Gender", Value::from("")), ("School_Type", Value::from("Public"))]
            .into_iter()
            .collect();
        assert_eq!(rec.category("Gender"), Value::Null);
        assert_eq!(rec.category("Absent"), Value::Null);
        assert_eq!(rec.category("School_Type"), Value::from("Public"));
    }

    #[test]
    fn signed_zero_is_one_category() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let hash = |v: &Value| {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        };
        let pos = Value::Number(0.0);
        let neg = Value::Number(-0.0);
        assert_eq!(pos, neg);
        assert_eq!(pos.cmp(&neg), std::cmp::Ordering::Equal);
        assert_eq!(hash(&pos), hash(&neg));
        assert_eq!(neg.normalized().label(), "0");
    }

    #[test]
    fn dataset_indexes_columns_in_given_order() {
        let records: Vec<Record> = vec![
            [("b", Value::from(1.0)), ("a", Value::from("x"))].into_iter().collect(),
            [("b", Value::from(2.0)), ("c", Value::Null)].into_iter().collect(),
        ];
        let ds = Dataset::from_records(records, vec!["b".into(), "a".into()]);
        assert_eq!(ds.column_names, vec!["b", "a", "c"]);
        assert_eq!(ds.unique_values["b"].len(), 2);
        assert!(ds.choices("c").is_empty());
        assert_eq!(ds.len(), 2);
    }
}
