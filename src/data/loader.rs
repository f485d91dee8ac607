use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, Float64Array};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use log::{debug, warn};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an `(x, y)` dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – Parquet file with numeric scalar `x` and `y` columns
/// * `.json`    – `[{ "x": 1.0, "y": 2.0 }, ...]`
/// * anything else is read as CSV with a header row naming `x` and `y`
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        _ => load_csv(path),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one observation per row.
/// Only `x` and `y` are kept; other columns are ignored.
fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let x_idx = headers
        .iter()
        .position(|h| h == "x")
        .context("CSV missing 'x' column")?;
    let y_idx = headers
        .iter()
        .position(|h| h == "y")
        .context("CSV missing 'y' column")?;

    if headers.len() > 2 {
        warn!(
            "ignoring {} extra CSV column(s) in {}",
            headers.len() - 2,
            path.display()
        );
    }

    let mut x = Vec::new();
    let mut y = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        x.push(parse_cell(record.get(x_idx).unwrap_or(""), row_no, "x")?);
        y.push(parse_cell(record.get(y_idx).unwrap_or(""), row_no, "y")?);
    }

    debug!("parsed {} CSV rows from {}", x.len(), path.display());
    Dataset::new(x, y)
}

/// Parse a single CSV cell. Blank and the usual null spellings become `NaN`.
fn parse_cell(s: &str, row: usize, col: &str) -> Result<f64> {
    let tok = s.trim();
    if is_null_token(tok) {
        return Ok(f64::NAN);
    }
    tok.parse::<f64>()
        .with_context(|| format!("Row {row}, {col}: '{tok}' is not a number"))
}

fn is_null_token(tok: &str) -> bool {
    matches!(tok, "" | "NA" | "N/A" | "NaN" | "nan" | "null" | "NULL" | "None")
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "x": 0.49, "y": 1.02 },
///   { "x": -0.13, "y": -0.31 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut x = Vec::with_capacity(records.len());
    let mut y = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        x.push(json_to_f64(obj.get("x"), i, "x")?);
        y.push(json_to_f64(obj.get("y"), i, "y")?);
    }

    Dataset::new(x, y)
}

fn json_to_f64(val: Option<&JsonValue>, row: usize, col: &str) -> Result<f64> {
    match val {
        None | Some(JsonValue::Null) => Ok(f64::NAN),
        Some(v) => v
            .as_f64()
            .with_context(|| format!("Row {row}, {col}: not a number")),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with scalar `x` and `y` columns.
///
/// Any integer or floating point physical type is accepted and widened to
/// `f64`; nulls become `NaN`. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut x = Vec::new();
    let mut y = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let x_idx = schema
            .index_of("x")
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'x' column"))?;
        let y_idx = schema
            .index_of("y")
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'y' column"))?;

        x.extend(column_to_f64(batch.column(x_idx)).context("reading 'x'")?);
        y.extend(column_to_f64(batch.column(y_idx)).context("reading 'y'")?);
    }

    Dataset::new(x, y)
}

/// Widen a numeric Arrow column to `f64`, mapping nulls to `NaN`.
fn column_to_f64(col: &ArrayRef) -> Result<Vec<f64>> {
    if !col.data_type().is_numeric() {
        bail!("Expected a numeric column, got {:?}", col.data_type());
    }
    let widened = cast(col, &DataType::Float64).context("casting column to Float64")?;
    let values = widened
        .as_any()
        .downcast_ref::<Float64Array>()
        .context("expected Float64Array after cast")?;
    Ok(values.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rusty-analysis-loader-{}-{name}", std::process::id()))
    }

    #[test]
    fn csv_preserves_values_and_order() {
        let path = temp_path("plain.csv");
        std::fs::write(&path, "x,y\n-3,7\n5,-10\n0,2\n").unwrap();
        let ds = load_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(ds.x(), &[-3.0, 5.0, 0.0]);
        assert_eq!(ds.y(), &[7.0, -10.0, 2.0]);
    }

    #[test]
    fn csv_columns_in_any_position() {
        let path = temp_path("extra.csv");
        std::fs::write(&path, "id,y,label,x\n1,2.5,a,0.5\n2,3.5,b,1.5\n").unwrap();
        let ds = load_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(ds.x(), &[0.5, 1.5]);
        assert_eq!(ds.y(), &[2.5, 3.5]);
    }

    #[test]
    fn csv_blank_cells_become_nan() {
        let path = temp_path("missing.csv");
        std::fs::write(&path, "x,y\n1.0,\nNA,4.0\n").unwrap();
        let ds = load_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(ds.len(), 2);
        assert!(ds.y()[0].is_nan());
        assert!(ds.x()[1].is_nan());
        assert_eq!(ds.missing_count(), 2);
    }

    #[test]
    fn csv_without_y_column_fails() {
        let path = temp_path("noy.csv");
        std::fs::write(&path, "x,z\n1,2\n").unwrap();
        let err = load_file(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert!(err.to_string().contains("'y'"));
    }

    #[test]
    fn csv_garbage_cell_fails_with_context() {
        let path = temp_path("garbage.csv");
        std::fs::write(&path, "x,y\n1,abc\n").unwrap();
        let err = load_file(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert!(format!("{err:#}").contains("'abc' is not a number"));
    }

    #[test]
    fn json_records_with_nulls() {
        let path = temp_path("records.json");
        std::fs::write(&path, r#"[{"x": 1.5, "y": 2}, {"x": null, "y": -1.25}]"#).unwrap();
        let ds = load_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(ds.x()[0], 1.5);
        assert!(ds.x()[1].is_nan());
        assert_eq!(ds.y(), &[2.0, -1.25]);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_file(Path::new("/definitely/not/here.csv")).is_err());
    }
}
