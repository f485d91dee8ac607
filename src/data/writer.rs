use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

use super::model::Dataset;

/// Write a dataset to a file.  Dispatch by extension, mirroring
/// [`load_file`](super::loader::load_file): `.parquet`/`.pq`, `.json`,
/// anything else as CSV.
pub fn save_file(dataset: &Dataset, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => save_parquet(dataset, path),
        "json" => save_json(dataset, path),
        _ => save_csv(dataset, path),
    }
}

#[derive(Serialize)]
struct Row {
    x: f64,
    y: f64,
}

fn save_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    for (x, y) in dataset.rows() {
        writer.serialize(Row { x, y }).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

/// Records orientation; non-finite cells are written as `null`.
fn save_json(dataset: &Dataset, path: &Path) -> Result<()> {
    let records: Vec<serde_json::Value> = dataset
        .rows()
        .map(|(x, y)| serde_json::json!({ "x": finite_or_null(x), "y": finite_or_null(y) }))
        .collect();

    let mut file = std::fs::File::create(path).context("creating JSON file")?;
    serde_json::to_writer(&mut file, &records).context("writing JSON")?;
    file.flush().context("flushing JSON")?;
    Ok(())
}

/// `None` for `NaN` and both infinities.
fn finite_or_null(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// Two nullable Float64 columns; non-finite cells are written as null.
fn save_parquet(dataset: &Dataset, path: &Path) -> Result<()> {
    let to_array =
        |col: &[f64]| Float64Array::from_iter(col.iter().map(|&v| finite_or_null(v)));

    let schema = Arc::new(Schema::new(vec![
        Field::new("x", DataType::Float64, true),
        Field::new("y", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(to_array(dataset.x())),
            Arc::new(to_array(dataset.y())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_file;
    use crate::data::synthetic::linear_sample;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rusty-analysis-writer-{}-{name}", std::process::id()))
    }

    fn reload(name: &str, ds: &Dataset) -> Dataset {
        let path = temp_path(name);
        save_file(ds, &path).unwrap();
        let loaded = load_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        loaded
    }

    #[test]
    fn parquet_reloads_exactly() {
        let ds = linear_sample(64, 3);
        assert_eq!(reload("sample.parquet", &ds), ds);
    }

    #[test]
    fn csv_reloads_exactly() {
        let ds = linear_sample(64, 4);
        assert_eq!(reload("sample.csv", &ds), ds);
    }

    #[test]
    fn infinities_reload_as_missing_in_parquet_and_json() {
        let ds = Dataset::new(vec![f64::INFINITY, 2.0], vec![0.5, f64::NEG_INFINITY]).unwrap();
        for name in ["inf.parquet", "inf.json"] {
            let loaded = reload(name, &ds);
            assert!(loaded.x()[0].is_nan(), "{name}");
            assert_eq!(loaded.x()[1], 2.0);
            assert_eq!(loaded.y()[0], 0.5);
            assert!(loaded.y()[1].is_nan(), "{name}");
        }
    }

    #[test]
    fn json_keeps_missing_cells() {
        let ds = Dataset::new(vec![1.0, f64::NAN], vec![0.25, 3.0]).unwrap();
        let loaded = reload("missing.json", &ds);
        assert_eq!(loaded.x()[0], 1.0);
        assert!(loaded.x()[1].is_nan());
        assert_eq!(loaded.y(), ds.y());
    }
}
