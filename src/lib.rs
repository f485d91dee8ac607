//! # rusty-analysis
//!
//! Load or synthesize a two-column `(x, y)` dataset and run a fixed set of
//! analyses over it.
//!
//! - [`data`]: dataset model, CSV/JSON/Parquet loading and writing, seeded sample
//! - [`stats`]: descriptive statistics, Pearson correlation, normality test
//! - [`optimize`]: BFGS minimizer with finite-difference gradients
//! - [`integrate`]: adaptive Gauss-Kronrod quadrature
//! - [`plot`]: scatter plot rendered to PNG
//! - [`processor`]: [`DataProcessor`], the facade tying the above together
//! - [`error`]: error types
//!
//! ## Quick Start
//!
//! ```
//! use rusty_analysis::processor::{default_integrand, DataProcessor, DEFAULT_INTERVAL};
//!
//! let mut processor = DataProcessor::new();
//! assert_eq!(processor.load_data(None).unwrap().len(), 1000);
//!
//! let summary = processor.statistical_analysis().unwrap();
//! assert!(summary.correlation > 0.8);
//!
//! let area = processor
//!     .numerical_integration(default_integrand, DEFAULT_INTERVAL)
//!     .unwrap();
//! assert!((area.integral_value - 1.0 / 3.0).abs() < 1e-10);
//! ```

pub mod color;
pub mod data;
pub mod error;
pub mod integrate;
pub mod optimize;
pub mod plot;
pub mod processor;
pub mod stats;

pub use error::AnalysisError;
pub use processor::DataProcessor;
