//! Adaptive Gauss-Kronrod quadrature.
//!
//! A 21-point Kronrod rule with its embedded 10-point Gauss rule is applied
//! to each subinterval; the subinterval with the largest error estimate is
//! bisected until the total estimate meets tolerance.

use log::{debug, warn};
use thiserror::Error;

/// Errors that can occur during integration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrateError {
    /// Bounds must be finite.
    #[error("invalid integration bounds [{a}, {b}]")]
    InvalidBounds { a: f64, b: f64 },
}

/// Options for adaptive quadrature.
#[derive(Debug, Clone)]
pub struct QuadOptions {
    /// Absolute tolerance (default: 1.49e-8)
    pub epsabs: f64,
    /// Relative tolerance (default: 1.49e-8)
    pub epsrel: f64,
    /// Maximum number of subintervals (default: 50)
    pub limit: usize,
}

impl Default for QuadOptions {
    fn default() -> Self {
        Self {
            epsabs: 1.49e-8,
            epsrel: 1.49e-8,
            limit: 50,
        }
    }
}

/// Result of adaptive quadrature.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadResult {
    /// Estimated integral
    pub integral: f64,
    /// Estimated absolute error
    pub error: f64,
    /// Number of function evaluations
    pub neval: usize,
    /// Whether the error estimate met tolerance
    pub converged: bool,
}

// ---------------------------------------------------------------------------
// 21-point Gauss-Kronrod rule
// ---------------------------------------------------------------------------

/// Kronrod abscissae on [0, 1]; odd indices are the Gauss points.
const XGK: [f64; 11] = [
    0.995_657_163_025_808_080_735_527_280_689_003,
    0.973_906_528_517_171_720_077_964_012_084_452,
    0.930_157_491_355_708_226_001_207_180_059_508,
    0.865_063_366_688_984_510_732_096_688_423_493,
    0.780_817_726_586_416_897_063_717_578_345_042,
    0.679_409_568_299_024_406_234_327_365_114_874,
    0.562_757_134_668_604_683_339_000_099_272_694,
    0.433_395_394_129_247_190_799_265_943_165_784,
    0.294_392_862_701_460_198_131_126_603_103_866,
    0.148_874_338_981_631_210_884_826_001_129_720,
    0.0,
];

/// Kronrod weights.
const WGK: [f64; 11] = [
    0.011_694_638_867_371_874_278_064_396_062_192,
    0.032_558_162_307_964_727_478_818_972_459_390,
    0.054_755_896_574_351_996_031_381_300_244_580,
    0.075_039_674_810_919_952_767_043_140_916_190,
    0.093_125_454_583_697_605_535_065_465_083_366,
    0.109_387_158_802_297_641_899_210_590_325_805,
    0.123_491_976_262_065_851_077_208_606_236_031,
    0.134_709_217_311_473_325_928_054_001_771_707,
    0.142_775_938_577_060_080_797_094_273_138_717,
    0.147_739_104_901_338_491_374_841_515_972_068,
    0.149_445_554_002_916_905_664_936_468_389_821,
];

/// Weights of the 10-point Gauss rule (for `XGK[1], XGK[3], ..., XGK[9]`).
const WG: [f64; 5] = [
    0.066_671_344_308_688_137_593_568_809_893_332,
    0.149_451_349_150_580_593_145_776_339_657_697,
    0.219_086_362_515_982_043_995_534_934_228_163,
    0.269_266_719_309_996_355_091_226_921_569_469,
    0.295_524_224_714_752_870_173_892_994_651_338,
];

const KRONROD_POINTS: usize = 21;

/// One subinterval with its estimate.
#[derive(Debug, Clone, Copy)]
struct Segment {
    a: f64,
    b: f64,
    integral: f64,
    error: f64,
}

/// Apply the 21-point rule on [a, b], returning `(integral, abs_error)`.
fn gauss_kronrod_21<F>(f: &F, a: f64, b: f64) -> (f64, f64)
where
    F: Fn(f64) -> f64,
{
    let centre = 0.5 * (a + b);
    let half = 0.5 * (b - a);
    let abs_half = half.abs();

    let mut fv1 = [0.0; 10];
    let mut fv2 = [0.0; 10];

    let fc = f(centre);
    let mut res_gauss = 0.0;
    let mut res_kronrod = WGK[10] * fc;
    let mut res_abs = res_kronrod.abs();

    for j in 0..5 {
        let k = 2 * j + 1;
        let dx = half * XGK[k];
        let (f1, f2) = (f(centre - dx), f(centre + dx));
        fv1[k] = f1;
        fv2[k] = f2;
        res_gauss += WG[j] * (f1 + f2);
        res_kronrod += WGK[k] * (f1 + f2);
        res_abs += WGK[k] * (f1.abs() + f2.abs());
    }

    for j in 0..5 {
        let k = 2 * j;
        let dx = half * XGK[k];
        let (f1, f2) = (f(centre - dx), f(centre + dx));
        fv1[k] = f1;
        fv2[k] = f2;
        res_kronrod += WGK[k] * (f1 + f2);
        res_abs += WGK[k] * (f1.abs() + f2.abs());
    }

    let mean = 0.5 * res_kronrod;
    let mut res_asc = WGK[10] * (fc - mean).abs();
    for k in 0..10 {
        res_asc += WGK[k] * ((fv1[k] - mean).abs() + (fv2[k] - mean).abs());
    }

    let integral = res_kronrod * half;
    res_abs *= abs_half;
    res_asc *= abs_half;

    let mut error = ((res_kronrod - res_gauss) * half).abs();
    if res_asc != 0.0 && error != 0.0 {
        error = res_asc * (200.0 * error / res_asc).powf(1.5).min(1.0);
    }
    if res_abs > f64::MIN_POSITIVE / (50.0 * f64::EPSILON) {
        error = error.max(50.0 * f64::EPSILON * res_abs);
    }

    (integral, error)
}

fn segment<F>(f: &F, a: f64, b: f64) -> Segment
where
    F: Fn(f64) -> f64,
{
    let (integral, error) = gauss_kronrod_21(f, a, b);
    Segment {
        a,
        b,
        integral,
        error,
    }
}

/// Adaptive quadrature of `f` over [a, b].
///
/// Reversed bounds give the negated integral. Hitting `limit` subintervals
/// before the error estimate meets `max(epsabs, epsrel * |I|)` returns the
/// current estimate with `converged = false`.
pub fn quad<F>(f: F, a: f64, b: f64, options: &QuadOptions) -> Result<QuadResult, IntegrateError>
where
    F: Fn(f64) -> f64,
{
    if !a.is_finite() || !b.is_finite() {
        return Err(IntegrateError::InvalidBounds { a, b });
    }
    if a == b {
        return Ok(QuadResult {
            integral: 0.0,
            error: 0.0,
            neval: 0,
            converged: true,
        });
    }

    let mut segments = vec![segment(&f, a, b)];
    let mut neval = KRONROD_POINTS;

    loop {
        let integral: f64 = segments.iter().map(|s| s.integral).sum();
        let error: f64 = segments.iter().map(|s| s.error).sum();
        if !integral.is_finite() || !error.is_finite() {
            warn!("quad: non-finite estimate (integral {integral}, error {error})");
            return Ok(QuadResult {
                integral,
                error,
                neval,
                converged: false,
            });
        }
        let tolerance = options.epsabs.max(options.epsrel * integral.abs());

        if error <= tolerance || segments.len() >= options.limit.max(1) {
            let converged = error <= tolerance;
            if converged {
                debug!(
                    "quad: converged with {} subintervals, error {error:.3e}",
                    segments.len()
                );
            } else {
                warn!("quad: error estimate {error:.3e} exceeds tolerance {tolerance:.3e}");
            }
            return Ok(QuadResult {
                integral,
                error,
                neval,
                converged,
            });
        }

        // Bisect the worst segment
        let worst = segments
            .iter()
            .enumerate()
            .max_by(|(_, l), (_, r)| l.error.total_cmp(&r.error))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let Segment { a: lo, b: hi, .. } = segments.swap_remove(worst);
        let mid = 0.5 * (lo + hi);
        segments.push(segment(&f, lo, mid));
        segments.push(segment(&f, mid, hi));
        neval += 2 * KRONROD_POINTS;
    }
}
