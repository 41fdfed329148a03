use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value as JsonValue;

use super::model::{Dataset, Record, Value};
use super::schema::Schema;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a student dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row with column names, one student per row
/// * `.json` – `[{ "Hours_Studied": 23, "Gender": "Male", ... }, ...]`
///
/// Columns the schema declares numeric are coerced to numbers; anything
/// that does not parse becomes `0`.
pub fn load_file(path: &Path, schema: &Schema) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening CSV {}", path.display()))?;
            load_csv(file, schema)?
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            load_json_str(&text, schema)?
        }
        other => bail!("Unsupported file extension: .{other}"),
    };

    log::info!(
        "Loaded {} records ({} columns) from {}",
        dataset.len(),
        dataset.column_names.len(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse CSV from any reader: header row, then one record per row.
pub fn load_csv<R: Read>(input: R, schema: &Schema) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if !headers.iter().any(|h| *h == schema.target) {
        log::warn!("CSV has no '{}' column; every score will be missing", schema.target);
    }

    let mut records = Vec::new();
    let mut coerced = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;

        let mut values = BTreeMap::new();
        for (col_idx, raw) in row.iter().enumerate() {
            let Some(col_name) = headers.get(col_idx) else {
                continue;
            };
            let value = if schema.is_numeric_column(col_name) {
                let (n, ok) = coerce_number(raw);
                if !ok {
                    coerced += 1;
                }
                Value::Number(n)
            } else {
                text_cell(raw)
            };
            values.insert(col_name.clone(), value);
        }

        records.push(Record::new(values));
    }

    if coerced > 0 {
        log::debug!("{coerced} numeric cells did not parse and were set to 0");
    }

    Ok(Dataset::from_records(records, headers))
}

/// Numeric coercion: unparsable, empty or non-finite input becomes `0`.
/// The flag reports whether the input parsed cleanly.
fn coerce_number(s: &str) -> (f64, bool) {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => (v, true),
        _ => (0.0, false),
    }
}

fn text_cell(s: &str) -> Value {
    if s.trim().is_empty() {
        Value::Null
    } else {
        Value::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Hours_Studied": 23, "Attendance": 84, "Gender": "Male", "Exam_Score": 67 },
///   ...
/// ]
/// ```
pub fn load_json_str(text: &str, schema: &Schema) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let rows = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());
    let mut column_names: Vec<String> = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut values = BTreeMap::new();
        for (key, val) in obj {
            if !column_names.contains(key) {
                column_names.push(key.clone());
            }
            let value = if schema.is_numeric_column(key) {
                Value::Number(json_to_number(val))
            } else {
                json_to_value(val)
            };
            values.insert(key.clone(), value);
        }

        records.push(Record::new(values));
    }

    Ok(Dataset::from_records(records, column_names))
}

fn json_to_number(val: &JsonValue) -> f64 {
    match val {
        JsonValue::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        JsonValue::String(s) => coerce_number(s).0,
        JsonValue::Bool(b) => f64::from(u8::from(*b)),
        _ => 0.0,
    }
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => text_cell(s),
        JsonValue::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
        JsonValue::Bool(b) => Value::Text(b.to_string()),
        JsonValue::Null => Value::Null,
        other => Value::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Hours_Studied,Attendance,Gender,Learning_Disabilities,Exam_Score
23,84,Male,No,67
abc,,Female,,61
";

    #[test]
    fn csv_coerces_numeric_columns_to_zero() {
        let ds = load_csv(CSV.as_bytes(), &Schema::default()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(
            ds.column_names,
            vec!["Hours_Studied", "Attendance", "Gender", "Learning_Disabilities", "Exam_Score"]
        );
        let second = &ds.records[1];
        assert_eq!(second.number("Hours_Studied"), Some(0.0));
        assert_eq!(second.number("Attendance"), Some(0.0));
        assert_eq!(second.number("Exam_Score"), Some(61.0));
        assert_eq!(second.get("Learning_Disabilities"), Some(&Value::Null));
        assert_eq!(second.text("Gender"), Some("Female"));
    }

    #[test]
    fn csv_keeps_categorical_text_as_is() {
        let ds = load_csv(CSV.as_bytes(), &Schema::default()).unwrap();
        assert_eq!(ds.records[0].text("Learning_Disabilities"), Some("No"));
        assert_eq!(ds.choices("Gender").len(), 2);
    }

    #[test]
    fn csv_rejects_ragged_rows() {
        let ragged = "Hours_Studied,Exam_Score\n1,2,3\n";
        assert!(load_csv(ragged.as_bytes(), &Schema::default()).is_err());
    }

    #[test]
    fn json_records_are_loaded() {
        let text = r#"[
            {"Hours_Studied": "12", "Gender": "Female", "Exam_Score": 70},
            {"Hours_Studied": null, "Gender": null, "Exam_Score": 64.5}
        ]"#;
        let ds = load_json_str(text, &Schema::default()).unwrap();
        assert_eq!(ds.records[0].number("Hours_Studied"), Some(12.0));
        assert_eq!(ds.records[1].number("Hours_Studied"), Some(0.0));
        assert_eq!(ds.records[1].get("Gender"), Some(&Value::Null));
        assert_eq!(ds.records[1].number("Exam_Score"), Some(64.5));
    }

    #[test]
    fn json_must_be_array_of_objects() {
        assert!(load_json_str("{}", &Schema::default()).is_err());
        assert!(load_json_str("[1, 2]", &Schema::default()).is_err());
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let err = load_file(Path::new("students.xlsx"), &Schema::default()).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }
}
