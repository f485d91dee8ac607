//! Hypothesis tests: Pearson correlation and D'Agostino-Pearson normality.

use log::debug;
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF, StudentsT};

use super::descriptive::{kurtosis, skewness};
use crate::error::{AnalysisError, Result};

/// Smallest sample `normaltest` accepts (the skewness test needs it).
pub const NORMALTEST_MIN_SAMPLES: usize = 8;

/// A test statistic and its p-value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestResult {
    pub statistic: f64,
    pub pvalue: f64,
}

// ---------------------------------------------------------------------------
// Pearson correlation
// ---------------------------------------------------------------------------

/// Pearson correlation coefficient with a two-sided p-value.
///
/// The statistic is `r`; the p-value comes from Student's t with `n - 2`
/// degrees of freedom. Two samples always give `|r| = 1` and `p = 1`.
/// A constant column or any `NaN` yields `NaN` for both.
pub fn pearsonr(x: &[f64], y: &[f64]) -> Result<TestResult> {
    if x.len() != y.len() {
        return Err(AnalysisError::LengthMismatch {
            expected: x.len(),
            got: y.len(),
        });
    }
    let n = x.len();
    if n < 2 {
        return Err(AnalysisError::InsufficientData {
            context: "pearsonr",
            required: 2,
            got: n,
        });
    }

    let nf = n as f64;
    let mean_x = x.iter().sum::<f64>() / nf;
    let mean_y = y.iter().sum::<f64>() / nf;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let mut r = if sxx > 0.0 && syy > 0.0 {
        (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
    } else {
        f64::NAN
    };
    if n == 2 && !r.is_nan() {
        r = r.signum();
    }

    let pvalue = if r.is_nan() {
        f64::NAN
    } else if n == 2 {
        1.0
    } else if r.abs() == 1.0 {
        0.0
    } else {
        let df = nf - 2.0;
        let t = r * (df / ((1.0 - r) * (1.0 + r))).sqrt();
        StudentsT::new(0.0, 1.0, df)
            .map(|dist| 2.0 * dist.sf(t.abs()))
            .unwrap_or(f64::NAN)
    };

    Ok(TestResult {
        statistic: r,
        pvalue,
    })
}

// ---------------------------------------------------------------------------
// Normality
// ---------------------------------------------------------------------------

/// Z-score of the sample skewness under normality.
fn skew_z(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let b2 = skewness(values);

    let mut y = b2 * ((n + 1.0) * (n + 3.0) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    if y == 0.0 {
        y = 1.0;
    }
    delta * (y / alpha).asinh()
}

/// Z-score of the sample kurtosis under normality (Anscombe & Glynn).
fn kurtosis_z(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let b2 = kurtosis(values) + 3.0;

    let expected = 3.0 * (n - 1.0) / (n + 1.0);
    let var_b2 = 24.0 * n * (n - 2.0) * (n - 3.0)
        / ((n + 1.0) * (n + 1.0) * (n + 3.0) * (n + 5.0));
    let x = (b2 - expected) / var_b2.sqrt();

    let sqrt_beta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * (6.0 * (n + 3.0) * (n + 5.0) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0
        + 8.0 / sqrt_beta1 * (2.0 / sqrt_beta1 + (1.0 + 4.0 / (sqrt_beta1 * sqrt_beta1)).sqrt());

    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + x * (2.0 / (a - 4.0)).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    let term2 = ((1.0 - 2.0 / a) / denom).cbrt();
    (term1 - term2) / (2.0 / (9.0 * a)).sqrt()
}

/// D'Agostino-Pearson omnibus normality test.
///
/// `K² = Z_skew² + Z_kurt²`, compared against χ² with two degrees of
/// freedom. Needs at least [`NORMALTEST_MIN_SAMPLES`] values.
pub fn normaltest(values: &[f64]) -> Result<TestResult> {
    if values.len() < NORMALTEST_MIN_SAMPLES {
        return Err(AnalysisError::InsufficientData {
            context: "normaltest",
            required: NORMALTEST_MIN_SAMPLES,
            got: values.len(),
        });
    }

    let zs = skew_z(values);
    let zk = kurtosis_z(values);
    let k2 = zs * zs + zk * zk;
    debug!("normaltest: n = {}, z_skew = {zs:.4}, z_kurt = {zk:.4}", values.len());

    let pvalue = if k2.is_nan() {
        f64::NAN
    } else if k2.is_infinite() {
        0.0
    } else {
        ChiSquared::new(2.0)
            .map(|dist| dist.sf(k2))
            .unwrap_or(f64::NAN)
    };

    Ok(TestResult {
        statistic: k2,
        pvalue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::default_sample;

    #[test]
    fn pearson_known_value() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 5.0, 4.0, 5.0];
        let res = pearsonr(&x, &y).unwrap();
        assert!((res.statistic - 6.0 / 60.0_f64.sqrt()).abs() < 1e-12);
        assert!(res.pvalue > 0.12 && res.pvalue < 0.13, "p = {}", res.pvalue);
    }

    #[test]
    fn pearson_perfect_line() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [-2.0, -4.0, -6.0, -8.0];
        let res = pearsonr(&x, &y).unwrap();
        assert_eq!(res.statistic, -1.0);
        assert_eq!(res.pvalue, 0.0);
    }

    #[test]
    fn pearson_two_points() {
        let res = pearsonr(&[0.0, 1.0], &[3.0, 5.0]).unwrap();
        assert_eq!(res.statistic, 1.0);
        assert_eq!(res.pvalue, 1.0);
    }

    #[test]
    fn pearson_constant_column_is_nan() {
        let res = pearsonr(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).unwrap();
        assert!(res.statistic.is_nan());
        assert!(res.pvalue.is_nan());
    }

    #[test]
    fn pearson_rejects_short_or_mismatched_input() {
        assert!(matches!(
            pearsonr(&[1.0], &[1.0]),
            Err(AnalysisError::InsufficientData { required: 2, .. })
        ));
        assert!(matches!(
            pearsonr(&[1.0, 2.0], &[1.0]),
            Err(AnalysisError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn pearson_on_default_sample_is_strong() {
        let ds = default_sample();
        let res = pearsonr(ds.x(), ds.y()).unwrap();
        assert!(res.statistic > 0.9);
        assert!(res.pvalue < 1e-10);
    }

    #[test]
    fn normaltest_needs_eight_values() {
        let err = normaltest(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientData { required: 8, got: 7, .. }
        ));
    }

    #[test]
    fn normaltest_flags_exponential_growth() {
        let values: Vec<f64> = (0..100).map(|i| (i as f64 / 10.0).exp()).collect();
        let res = normaltest(&values).unwrap();
        assert!(res.pvalue < 0.05, "p = {}", res.pvalue);
    }

    #[test]
    fn normaltest_pvalue_is_a_probability() {
        let ds = default_sample();
        for col in [ds.x(), ds.y()] {
            let res = normaltest(col).unwrap();
            assert!(res.statistic >= 0.0);
            assert!((0.0..=1.0).contains(&res.pvalue));
        }
    }

    #[test]
    fn normaltest_propagates_nan() {
        let mut values: Vec<f64> = (0..20).map(|i| i as f64).collect();
        values[3] = f64::NAN;
        assert!(normaltest(&values).unwrap().pvalue.is_nan());
    }
}
