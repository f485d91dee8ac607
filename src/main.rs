use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use rusty_analysis::processor::{
    default_integrand, default_objective, DEFAULT_INITIAL_GUESS, DEFAULT_INTERVAL,
    DEFAULT_PLOT_PATH,
};
use rusty_analysis::DataProcessor;

fn print_json<T: Serialize>(heading: &str, value: &T) -> Result<()> {
    println!("{heading}");
    println!("{}", serde_json::to_string_pretty(value).context("formatting result")?);
    Ok(())
}

/// Usage: `rusty-analysis [DATA_PATH] [PLOT_PATH]`
///
/// Runs load, statistics, optimization, integration and plotting in turn.
fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args_os().skip(1);
    let data_path = args.next().map(PathBuf::from);
    let plot_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PLOT_PATH));

    let mut processor = DataProcessor::new();

    let data = processor
        .load_data(data_path.as_deref())
        .context("loading data")?;
    println!("Data Loaded: {} points", data.len());

    let stats_summary = processor
        .statistical_analysis()
        .context("statistical analysis")?;
    print_json("Statistical Analysis Summary:", &stats_summary)?;

    let optimization = processor
        .optimize_function(default_objective, DEFAULT_INITIAL_GUESS)
        .context("optimization")?;
    print_json("\nOptimization Result:", &optimization)?;

    let integration = processor
        .numerical_integration(default_integrand, DEFAULT_INTERVAL)
        .context("numerical integration")?;
    print_json("\nNumerical Integration Result:", &integration)?;

    let written = processor
        .generate_plot(&plot_path)
        .context("generating plot")?;
    println!("\nPlot saved to: {}", written.display());

    Ok(())
}
