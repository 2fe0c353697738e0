use itertools::Itertools;
use log::debug;
use rand::distributions::{Distribution, Uniform, WeightedIndex};
use rand::Rng;

use crate::errors::{Result, WeightError};

/// Tolerance on `|Σw - 1|` for weights handed to a resampling algorithm.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-6;

/// Picks the indexes of the particles that survive resampling.
///
/// Only the indexes are computed, the caller gathers (and duplicates) the
/// particles themselves and resets their weights.
pub trait ResamplingAlgorithm {
    /// `n` defaults to the number of weights. The weights must already be a
    /// normalized distribution.
    fn get_indexes(&mut self, weights: &[f64], n: Option<usize>) -> Result<Vec<usize>>;
}

impl<T: ResamplingAlgorithm + ?Sized> ResamplingAlgorithm for Box<T> {
    fn get_indexes(&mut self, weights: &[f64], n: Option<usize>) -> Result<Vec<usize>> {
        (**self).get_indexes(weights, n)
    }
}

pub(crate) fn check_distribution(weights: &[f64]) -> Result<()> {
    if weights.is_empty() {
        return Err(WeightError::Empty);
    }

    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(WeightError::NotNormalized(f64::NAN));
    }

    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > NORMALIZATION_TOLERANCE {
        return Err(WeightError::NotNormalized(sum));
    }

    Ok(())
}

/// Independent categorical draws with replacement.
///
/// High variance, but every draw is unbiased on its own.
#[derive(Debug, Clone)]
pub struct MultinomialResampling<R> {
    rng: R,
}

impl<R: Rng> MultinomialResampling<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: Rng> ResamplingAlgorithm for MultinomialResampling<R> {
    fn get_indexes(&mut self, weights: &[f64], n: Option<usize>) -> Result<Vec<usize>> {
        check_distribution(weights)?;
        let n = n.unwrap_or(weights.len());

        let dist = WeightedIndex::new(weights)
            .map_err(|_| WeightError::NotNormalized(weights.iter().sum()))?;

        debug!("Multinomial resampling of {} indexes out of {} particles", n, weights.len());

        Ok((0..n).map(|_| dist.sample(&mut self.rng)).collect_vec())
    }
}

/// Systematic resampling with a given offset `u_tilde` in `[0, 1)`.
///
/// The positions `(k + u_tilde) / n` are mapped through the inverse of the
/// cumulative distribution, so the returned indexes are non-decreasing and a
/// particle with weight `w` is picked either `floor(n w)` or `ceil(n w)` times.
pub fn systematic_indexes(weights: &[f64], n: usize, u_tilde: f64) -> Result<Vec<usize>> {
    check_distribution(weights)?;

    if !(0.0..1.0).contains(&u_tilde) {
        return Err(WeightError::InvalidOffset(u_tilde));
    }

    // Create the cumulative distribution function
    let f = weights.iter().scan(0.0, |state, w| {
        *state += w;

        Some(*state)
    }).collect_vec();

    // Rounding may leave the final edge a hair below 1, positions past it
    // go to the last particle that has any mass.
    let last = weights.iter().rposition(|w| *w > 0.0).unwrap_or(weights.len() - 1);

    // The first bin whose upper edge lies strictly above u, so that
    // zero-weight particles are never picked.
    let f_inv = |u: f64| f.partition_point(|ff| *ff <= u).min(last);

    let nf = n as f64;
    let uks = (0..n).map(|k| ((k as f64) + u_tilde) / nf);

    Ok(uks.map(f_inv).collect_vec())
}

/// Systematic resampling: a single uniform offset shared by all positions.
#[derive(Debug, Clone)]
pub struct SystematicResampling<R> {
    rng: R,
}

impl<R: Rng> SystematicResampling<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: Rng> ResamplingAlgorithm for SystematicResampling<R> {
    fn get_indexes(&mut self, weights: &[f64], n: Option<usize>) -> Result<Vec<usize>> {
        let n = n.unwrap_or(weights.len());
        let u = self.rng.sample(Uniform::new(0.0, 1.0));

        debug!("Systematic resampling of {} indexes out of {} particles (u = {})", n, weights.len(), u);

        systematic_indexes(weights, n, u)
    }
}
