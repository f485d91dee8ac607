//! Statistics over plain `f64` columns.
//!
//! - [`descriptive`]: mean, sample standard deviation, skewness, excess kurtosis
//! - [`hypothesis`]: Pearson correlation test, D'Agostino-Pearson normality test
//!
//! Descriptive location/scale statistics skip `NaN` the way a dataframe
//! would; moment statistics and tests let `NaN` propagate.

pub mod descriptive;
pub mod hypothesis;

pub use descriptive::{kurtosis, mean, sample_std, skewness};
pub use hypothesis::{normaltest, pearsonr, TestResult};
