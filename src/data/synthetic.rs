use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_xoshiro::Xoshiro256StarStar;

use super::model::Dataset;

/// Seed used when no data file is given.
pub const DEFAULT_SEED: u64 = 42;

/// Rows generated when no data file is given.
pub const DEFAULT_SAMPLE_SIZE: usize = 1000;

/// Slope of the underlying linear relationship.
pub const SLOPE: f64 = 2.0;

/// Standard deviation of the additive noise on `y`.
pub const NOISE_STD: f64 = 0.5;

/// Generate the seeded linear sample: `x ~ N(0, 1)`, `y = 2x + N(0, 0.5)`.
///
/// All `x` values are drawn first and the noise afterwards, from one
/// xoshiro256** stream, so the output depends only on `size` and `seed`.
pub fn linear_sample(size: usize, seed: u64) -> Dataset {
    let mut rng = Xoshiro256StarStar::seed_from_u64(seed);

    let x: Vec<f64> = (0..size)
        .map(|_| rng.sample::<f64, _>(StandardNormal))
        .collect();
    let y: Vec<f64> = x
        .iter()
        .map(|&xi| SLOPE * xi + NOISE_STD * rng.sample::<f64, _>(StandardNormal))
        .collect();

    Dataset::from_columns(x, y)
}

/// The default sample: [`DEFAULT_SAMPLE_SIZE`] rows under [`DEFAULT_SEED`].
pub fn default_sample() -> Dataset {
    linear_sample(DEFAULT_SAMPLE_SIZE, DEFAULT_SEED)
}
