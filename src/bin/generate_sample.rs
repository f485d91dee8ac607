use std::path::PathBuf;

use anyhow::{Context, Result};

use rusty_analysis::data::synthetic::{default_sample, DEFAULT_SEED};
use rusty_analysis::data::writer::save_file;

/// Write the seeded `(x, y)` sample to a file so it can be fed back in.
///
/// Usage: `generate_sample [OUTPUT]` (default `sample_data.csv`; the
/// extension picks CSV, JSON or Parquet).
fn main() -> Result<()> {
    env_logger::init();

    let output_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data.csv"));

    let dataset = default_sample();
    save_file(&dataset, &output_path)
        .with_context(|| format!("writing {}", output_path.display()))?;

    println!(
        "Wrote {} rows (seed {DEFAULT_SEED}) to {}",
        dataset.len(),
        output_path.display()
    );
    Ok(())
}
