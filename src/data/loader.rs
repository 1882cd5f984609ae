use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, PitchTable};
use super::schema::ColumnSchema;
use crate::error::DataError;

/// Loader output before normalization: raw header → cells.
type RawColumns = Vec<(String, Vec<CellValue>)>;

// ---------------------------------------------------------------------------
// Column name normalization
// ---------------------------------------------------------------------------

/// Canonical form of a column identifier: trimmed, lower-cased, spaces
/// replaced by underscores. Applying it twice gives the same result.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the pitch table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one row per pitch (anything unrecognised is read as CSV)
/// * `.json`    – `[{ "Startup Name": "...", "Season Number": 1, ... }, ...]`
/// * `.parquet` – flat columns of strings, integers, floats or booleans
pub fn load_table(path: &Path, schema: &ColumnSchema) -> Result<PitchTable, DataError> {
    read_table(path, schema).map_err(|e| DataError::DataUnavailable {
        path: path.to_path_buf(),
        reason: format!("{e:#}"),
    })
}

fn read_table(path: &Path, schema: &ColumnSchema) -> Result<PitchTable> {
    if !path.exists() {
        bail!("file does not exist");
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        _ => load_csv(path)?,
    };

    PitchTable::from_raw_columns(raw, schema).context("assembling pitch table")
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, every following row is one
/// pitch. Rows with a different field count than the header are rejected.
/// Cells stay text here; typing happens when the table is assembled.
fn load_csv(path: &Path) -> Result<RawColumns> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() {
        bail!("CSV has no header row");
    }

    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (cells, value) in columns.iter_mut().zip(record.iter()) {
            cells.push(CellValue::String(value.to_string()));
        }
    }

    Ok(headers.into_iter().zip(columns).collect())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Startup Name": "BluePine", "Industry": "Food", "Season Number": 1 },
///   ...
/// ]
/// ```
///
/// Keys missing from a record become nulls in that row.
fn load_json(path: &Path) -> Result<RawColumns> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut columns: RawColumns = Vec::new();

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        for (key, val) in obj {
            let idx = match columns.iter().position(|(name, _)| name == key) {
                Some(idx) => idx,
                None => {
                    columns.push((key.clone(), vec![CellValue::Null; i]));
                    columns.len() - 1
                }
            };
            columns[idx].1.push(json_to_cell(val));
        }

        // Pad columns this record did not mention.
        for (_, cells) in columns.iter_mut() {
            if cells.len() < i + 1 {
                cells.push(CellValue::Null);
            }
        }
    }

    Ok(columns)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RawColumns> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let mut columns: RawColumns = builder
        .schema()
        .fields()
        .iter()
        .map(|f| (f.name().clone(), Vec::new()))
        .collect();

    let reader = builder.build().context("building parquet reader")?;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for ((name, cells), array) in columns.iter_mut().zip(batch.columns()) {
            append_arrow_column(array, cells)
                .with_context(|| format!("reading parquet column '{name}'"))?;
        }
    }

    Ok(columns)
}

/// Append every row of an Arrow array to `cells`.
fn append_arrow_column(array: &Arc<dyn Array>, cells: &mut Vec<CellValue>) -> Result<()> {
    cells.reserve(array.len());

    match array.data_type() {
        DataType::Utf8 => {
            let arr = array.as_string::<i32>();
            cells.extend(arr.iter().map(text_cell));
        }
        DataType::LargeUtf8 => {
            let arr = array.as_string::<i64>();
            cells.extend(arr.iter().map(text_cell));
        }
        DataType::Int32 => {
            let arr = array.as_primitive::<Int32Type>();
            cells.extend(arr.iter().map(|v| v.map(|i| CellValue::Integer(i as i64)).unwrap_or(CellValue::Null)));
        }
        DataType::Int64 => {
            let arr = array.as_primitive::<Int64Type>();
            cells.extend(arr.iter().map(|v| v.map(CellValue::Integer).unwrap_or(CellValue::Null)));
        }
        DataType::Float32 => {
            let arr = array.as_primitive::<Float32Type>();
            cells.extend(arr.iter().map(|v| float_cell(v.map(f64::from))));
        }
        DataType::Float64 => {
            let arr = array.as_primitive::<Float64Type>();
            cells.extend(arr.iter().map(float_cell));
        }
        DataType::Boolean => {
            let arr = array.as_boolean();
            cells.extend(arr.iter().map(|v| v.map(CellValue::Bool).unwrap_or(CellValue::Null)));
        }
        other => bail!("unsupported column type {other:?}"),
    }

    Ok(())
}

/// Typed string columns arrive as text, like CSV cells.
fn text_cell(v: Option<&str>) -> CellValue {
    v.map(|s| CellValue::String(s.to_string()))
        .unwrap_or(CellValue::Null)
}

/// Pandas writes missing numbers as NaN rather than null.
fn float_cell(v: Option<f64>) -> CellValue {
    match v {
        Some(f) if !f.is_nan() => CellValue::Float(f),
        _ => CellValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::query;
    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_with(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name("  Season Number "), "season_number");
        assert_eq!(normalize_column_name("Namita Present"), "namita_present");
        assert_eq!(normalize_column_name("industry"), "industry");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["  Startup  Name ", "Deal Status", "ÄRGER Wert", "already_done", "\tTab Col\n"] {
            let once = normalize_column_name(raw);
            assert_eq!(normalize_column_name(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn test_load_csv_normalizes_headers() {
        let file = temp_with(
            ".csv",
            "Season Number, Industry ,Startup Name\n1,Food,Alpha\n1,Tech,Beta\n2,Food,\n",
        );
        let table = load_table(file.path(), &ColumnSchema::default()).unwrap();

        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["season_number", "industry", "startup_name"]
        );
        assert_eq!(table.len(), 3);
        assert_eq!(table.column("startup_name").unwrap()[2], CellValue::Null);
        assert_eq!(table.column("season_number").unwrap()[0], CellValue::Integer(1));
    }

    #[test]
    fn test_csv_labels_keep_source_text() {
        let file = temp_with(
            ".csv",
            "Startup Name,Industry,Season Number
inf,Infinity,1
True,True,2
1.50,1.50,2.0
NA,NA,
",
        );
        let table = load_table(file.path(), &ColumnSchema::default()).unwrap();

        let industries: Vec<String> = query::counts_by_industry(&table)
            .ready()
            .unwrap()
            .iter()
            .map(|c| c.industry.clone())
            .collect();
        assert_eq!(industries, vec!["Infinity", "True", "1.50", "NA"]);
        assert_eq!(
            table.column("startup_name").unwrap(),
            &[
                CellValue::String("inf".into()),
                CellValue::String("True".into()),
                CellValue::String("1.50".into()),
                CellValue::String("NA".into())
            ][..]
        );
        assert_eq!(query::count_distinct(&table, "season_number"), query::Outcome::Ready(2));
    }

    #[test]
    fn test_header_only_csv_loads_empty() {
        let file = temp_with(".csv", "Season Number,Industry
");
        let table = load_table(file.path(), &ColumnSchema::default()).unwrap();
        assert!(table.is_empty());
        assert!(table.capabilities().has("industry"));
    }

    #[test]
    fn test_missing_file_is_data_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");
        let err = load_table(&path, &ColumnSchema::default()).unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable { .. }));
    }

    #[test]
    fn test_ragged_csv_is_data_unavailable() {
        let file = temp_with(".csv", "a,b\n1,2\n3\n");
        let err = load_table(file.path(), &ColumnSchema::default()).unwrap_err();
        let DataError::DataUnavailable { reason, .. } = err;
        assert!(reason.contains("CSV row"), "reason was {reason}");
    }

    #[test]
    fn test_empty_csv_is_data_unavailable() {
        let file = temp_with(".csv", "");
        assert!(load_table(file.path(), &ColumnSchema::default()).is_err());
    }

    #[test]
    fn test_load_json_records() {
        let file = temp_with(
            ".json",
            r#"[
                {"Industry": "Food", "Season Number": 1},
                {"Industry": "Tech", "Season Number": 2, "Aman Present": 1}
            ]"#,
        );
        let table = load_table(file.path(), &ColumnSchema::default()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.column("aman_present").unwrap(),
            &[CellValue::Null, CellValue::Integer(1)][..]
        );
        assert_eq!(table.capabilities().investors(), &["aman_present".to_string()]);
    }

    #[test]
    fn test_json_must_be_array() {
        let file = temp_with(".json", r#"{"industry": "Food"}"#);
        assert!(load_table(file.path(), &ColumnSchema::default()).is_err());
    }

    #[test]
    fn test_load_parquet_columns() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Industry", DataType::Utf8, true),
            Field::new("Season Number", DataType::Int64, false),
            Field::new("Peyush Present", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("Food"), None])),
                Arc::new(Int64Array::from(vec![1, 2])),
                Arc::new(Float64Array::from(vec![Some(1.0), Some(f64::NAN)])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let out = std::fs::File::create(file.path()).unwrap();
        let mut writer = ArrowWriter::try_new(out, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_table(file.path(), &ColumnSchema::default()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.column("industry").unwrap(),
            &[CellValue::String("Food".into()), CellValue::Null][..]
        );
        assert_eq!(
            table.column("peyush_present").unwrap(),
            &[CellValue::Float(1.0), CellValue::Null][..]
        );
    }
}
