use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Serialize;

use crate::data::loader::load_file;
use crate::data::model::Dataset;
use crate::data::synthetic::default_sample;
use crate::error::{AnalysisError, Result};
use crate::integrate::{quad, QuadOptions};
use crate::optimize::{bfgs, MinimizeOptions};
use crate::plot::{save_scatter, PlotOptions};
use crate::stats::{kurtosis, mean, normaltest, pearsonr, sample_std, skewness};

/// Where `generate_plot` writes when the caller has no preference.
pub const DEFAULT_PLOT_PATH: &str = "plot.png";

/// Initial guess callers pass by default to `optimize_function`.
pub const DEFAULT_INITIAL_GUESS: [f64; 2] = [1.0, 1.0];

/// Point the minimizer always starts from, whatever guess is supplied.
pub const FIXED_START: [f64; 2] = [1.0, 1.0];

/// Interval callers pass by default to `numerical_integration`.
pub const DEFAULT_INTERVAL: (f64, f64) = (0.0, 1.0);

/// Interval the integrator always uses, whatever interval is supplied.
pub const FIXED_INTERVAL: (f64, f64) = (0.0, 1.0);

/// Default objective: sum of squares.
pub fn default_objective(x: &[f64]) -> f64 {
    x.iter().map(|v| v * v).sum()
}

/// Default integrand: `x²`.
pub fn default_integrand(x: f64) -> f64 {
    x * x
}

// ---------------------------------------------------------------------------
// Result records
// ---------------------------------------------------------------------------

/// Descriptive and inferential statistics over the loaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatisticsSummary {
    pub mean_x: f64,
    pub mean_y: f64,
    pub std_x: f64,
    pub std_y: f64,
    /// Pearson correlation coefficient between `x` and `y`
    pub correlation: f64,
    /// Two-sided p-value of the correlation
    pub p_value: f64,
    /// Normality test p-value of `x`
    pub normality_x: f64,
    /// Normality test p-value of `y`
    pub normality_y: f64,
}

/// Third and fourth standardized moments of each column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MomentSummary {
    pub skewness_x: f64,
    pub skewness_y: f64,
    /// Excess kurtosis
    pub kurtosis_x: f64,
    /// Excess kurtosis
    pub kurtosis_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptimizationResult {
    /// Whether the minimizer reports convergence
    pub success: bool,
    pub optimized_values: [f64; 2],
    pub minimum_value: f64,
    pub iterations: usize,
    pub function_evals: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntegrationResult {
    pub integral_value: f64,
    /// Estimated absolute error
    pub error: f64,
    pub evaluations: usize,
}

// ---------------------------------------------------------------------------
// DataProcessor – the facade
// ---------------------------------------------------------------------------

/// Holds at most one dataset and runs the canned analyses over it.
#[derive(Debug, Default)]
pub struct DataProcessor {
    /// Loaded dataset (None until `load_data` is called).
    data: Option<Dataset>,
}

impl DataProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current dataset, if any.
    pub fn data(&self) -> Option<&Dataset> {
        self.data.as_ref()
    }

    fn require_data(&self) -> Result<&Dataset> {
        self.data.as_ref().ok_or(AnalysisError::DataNotLoaded)
    }

    /// Load `path`, or generate the seeded sample when `path` is `None`.
    /// The result replaces any previously loaded dataset.
    pub fn load_data(&mut self, path: Option<&Path>) -> Result<&Dataset> {
        let dataset = match path {
            Some(p) => load_file(p).map_err(|source| AnalysisError::Load {
                path: p.to_path_buf(),
                source,
            })?,
            None => default_sample(),
        };
        info!(
            "loaded {} rows from {}",
            dataset.len(),
            path.map_or_else(|| "synthetic sample".to_string(), |p| p.display().to_string())
        );
        Ok(self.data.insert(dataset))
    }

    /// Means, sample standard deviations, Pearson correlation with its
    /// p-value and a normality p-value per column.
    pub fn statistical_analysis(&self) -> Result<StatisticsSummary> {
        let data = self.require_data()?;

        let correlation = pearsonr(data.x(), data.y())?;
        let normal_x = normaltest(data.x())?;
        let normal_y = normaltest(data.y())?;

        Ok(StatisticsSummary {
            mean_x: mean(data.x()),
            mean_y: mean(data.y()),
            std_x: sample_std(data.x()),
            std_y: sample_std(data.y()),
            correlation: correlation.statistic,
            p_value: correlation.pvalue,
            normality_x: normal_x.pvalue,
            normality_y: normal_y.pvalue,
        })
    }

    /// Skewness and excess kurtosis of each column.
    pub fn advanced_statistics(&self) -> Result<MomentSummary> {
        let data = self.require_data()?;
        Ok(MomentSummary {
            skewness_x: skewness(data.x()),
            skewness_y: skewness(data.y()),
            kurtosis_x: kurtosis(data.x()),
            kurtosis_y: kurtosis(data.y()),
        })
    }

    /// Minimize `f` over two variables with BFGS.
    ///
    /// `initial_guess` is accepted for interface compatibility but the search
    /// always starts from [`FIXED_START`].
    pub fn optimize_function<F>(&self, f: F, initial_guess: [f64; 2]) -> Result<OptimizationResult>
    where
        F: Fn(&[f64]) -> f64,
    {
        if initial_guess != FIXED_START {
            debug!("optimize_function: ignoring initial guess {initial_guess:?}, starting from {FIXED_START:?}");
        }
        let res = bfgs(f, &FIXED_START, &MinimizeOptions::default())?;
        Ok(OptimizationResult {
            success: res.converged,
            optimized_values: [res.x[0], res.x[1]],
            minimum_value: res.fun,
            iterations: res.iterations,
            function_evals: res.nfev,
        })
    }

    /// Integrate `f` with adaptive quadrature.
    ///
    /// `interval` is accepted for interface compatibility but the integral is
    /// always taken over [`FIXED_INTERVAL`].
    pub fn numerical_integration<F>(&self, f: F, interval: (f64, f64)) -> Result<IntegrationResult>
    where
        F: Fn(f64) -> f64,
    {
        if interval != FIXED_INTERVAL {
            debug!("numerical_integration: ignoring interval {interval:?}, using {FIXED_INTERVAL:?}");
        }
        let (a, b) = FIXED_INTERVAL;
        let res = quad(f, a, b, &QuadOptions::default())?;
        Ok(IntegrationResult {
            integral_value: res.integral,
            error: res.error,
            evaluations: res.neval,
        })
    }

    /// Write a scatter plot of the dataset to `path` with default styling.
    pub fn generate_plot(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        self.generate_plot_with(path, &PlotOptions::default())
    }

    /// Write a scatter plot of the dataset to `path`, overwriting any file
    /// there, and return the path written.
    pub fn generate_plot_with(&self, path: impl AsRef<Path>, options: &PlotOptions) -> Result<PathBuf> {
        let data = self.require_data()?;
        let path = path.as_ref();
        save_scatter(data, path, options)?;
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let p = DataProcessor::new();
        assert!(p.data().is_none());
        assert!(matches!(p.statistical_analysis(), Err(AnalysisError::DataNotLoaded)));
        assert!(matches!(p.advanced_statistics(), Err(AnalysisError::DataNotLoaded)));
    }

    #[test]
    fn reload_replaces_dataset() {
        let mut p = DataProcessor::new();
        let first = p.load_data(None).unwrap().clone();
        let second = p.load_data(None).unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(p.data().map(Dataset::len), Some(1000));
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut p = DataProcessor::new();
        p.load_data(None).unwrap();
        let err = p.load_data(Some(Path::new("/no/such/file.csv"))).unwrap_err();
        assert!(matches!(err, AnalysisError::Load { .. }));
        assert_eq!(p.data().map(Dataset::len), Some(1000));
    }

    #[test]
    fn initial_guess_is_ignored() {
        let p = DataProcessor::new();
        let a = p.optimize_function(default_objective, [1.0, 1.0]).unwrap();
        let b = p.optimize_function(default_objective, [50.0, -7.0]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn interval_is_ignored() {
        let p = DataProcessor::new();
        let a = p.numerical_integration(default_integrand, (0.0, 1.0)).unwrap();
        let b = p.numerical_integration(default_integrand, (0.0, 3.0)).unwrap();
        assert_eq!(a, b);
        assert!((b.integral_value - 1.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn moments_of_default_sample_are_near_normal() {
        let mut p = DataProcessor::new();
        p.load_data(None).unwrap();
        let m = p.advanced_statistics().unwrap();
        assert!(m.skewness_x.abs() < 0.5);
        assert!(m.kurtosis_x.abs() < 1.0);
    }

    #[test]
    fn summary_serializes_with_expected_keys() {
        let mut p = DataProcessor::new();
        p.load_data(None).unwrap();
        let json = serde_json::to_value(p.statistical_analysis().unwrap()).unwrap();
        for key in [
            "mean_x",
            "mean_y",
            "std_x",
            "std_y",
            "correlation",
            "p_value",
            "normality_x",
            "normality_y",
        ] {
            assert!(json[key].is_number(), "{key} missing");
        }
    }
}
