use std::path::PathBuf;

use thiserror::Error;

use crate::integrate::IntegrateError;
use crate::optimize::OptimizeError;

// ---------------------------------------------------------------------------
// AnalysisError – everything the facade can fail with
// ---------------------------------------------------------------------------

/// Errors surfaced by [`DataProcessor`](crate::processor::DataProcessor).
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// An operation needing the dataset ran before any `load_data` call.
    #[error("Data not loaded. Please load data first.")]
    DataNotLoaded,

    /// Reading or parsing an input file failed.
    #[error("failed to load data from {}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// Too few observations for the requested statistic.
    #[error("{context}: need at least {required} observations, got {got}")]
    InsufficientData {
        context: &'static str,
        required: usize,
        got: usize,
    },

    /// Paired columns of different length.
    #[error("expected {expected} paired values, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error(transparent)]
    Optimize(#[from] OptimizeError),

    #[error(transparent)]
    Integrate(#[from] IntegrateError),

    /// Encoding or writing the plot image failed.
    #[error("failed to write plot")]
    Plot(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
