//! Descriptive statistics.

/// Arithmetic mean of the non-`NaN` values; `NaN` when there are none.
pub fn mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, c), &v| (s + v, c + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Sample standard deviation (`ddof = 1`) of the non-`NaN` values.
///
/// `NaN` when fewer than two values are present.
pub fn sample_std(values: &[f64]) -> f64 {
    let present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if present.len() < 2 {
        return f64::NAN;
    }
    let m = present.iter().sum::<f64>() / present.len() as f64;
    let ss: f64 = present.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (present.len() - 1) as f64).sqrt()
}

/// Second, third and fourth central moments (population, divisor `n`).
fn central_moments(values: &[f64]) -> (f64, f64, f64) {
    let n = values.len() as f64;
    let m = values.iter().sum::<f64>() / n;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for &v in values {
        let d = v - m;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    (m2 / n, m3 / n, m4 / n)
}

/// Whether the variance is indistinguishable from round-off around the mean.
fn is_degenerate(values: &[f64], m2: f64) -> bool {
    let m = values.iter().sum::<f64>() / values.len() as f64;
    m2 <= (f64::EPSILON * m).powi(2)
}

/// Skewness `g1 = m3 / m2^1.5` (biased, Fisher-Pearson).
///
/// `NaN` for empty or constant input.
pub fn skewness(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let (m2, m3, _) = central_moments(values);
    if is_degenerate(values, m2) {
        return f64::NAN;
    }
    m3 / m2.powf(1.5)
}

/// Excess kurtosis `g2 = m4 / m2^2 - 3` (biased, Fisher's definition).
///
/// `NaN` for empty or constant input.
pub fn kurtosis(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let (m2, _, m4) = central_moments(values);
    if is_degenerate(values, m2) {
        return f64::NAN;
    }
    m4 / (m2 * m2) - 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_skips_nan() {
        assert_eq!(mean(&[1.0, f64::NAN, 3.0]), 2.0);
        assert!(mean(&[]).is_nan());
        assert!(mean(&[f64::NAN]).is_nan());
    }

    #[test]
    fn sample_std_uses_n_minus_one() {
        let s = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((s - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
        assert!(sample_std(&[1.0]).is_nan());
        assert!(sample_std(&[1.0, f64::NAN]).is_nan());
    }

    #[test]
    fn symmetric_sample_has_zero_skew() {
        assert!(skewness(&[1.0, 2.0, 3.0, 4.0, 5.0]).abs() < 1e-12);
    }

    #[test]
    fn right_tail_gives_positive_skew() {
        let s = skewness(&[1.0, 2.0, 10.0]);
        assert!(s > 0.6 && s < 0.7, "skew = {s}");
    }

    #[test]
    fn uniform_grid_kurtosis() {
        // m2 = 2, m4 = 6.8 → 6.8 / 4 - 3
        assert!((kurtosis(&[1.0, 2.0, 3.0, 4.0, 5.0]) + 1.3).abs() < 1e-12);
    }

    #[test]
    fn constant_input_is_nan() {
        assert!(skewness(&[3.0; 10]).is_nan());
        assert!(kurtosis(&[3.0; 10]).is_nan());
    }

    #[test]
    fn nan_propagates_through_moments() {
        assert!(skewness(&[1.0, f64::NAN, 2.0]).is_nan());
        assert!(kurtosis(&[1.0, f64::NAN, 2.0]).is_nan());
    }
}
