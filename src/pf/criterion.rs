use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, WeightError};

/// Decides from the current (normalized) weights whether to resample now.
pub trait ResamplingCriterion {
    fn is_resampling_needed(&self, weights: &[f64]) -> Result<bool>;
}

impl<T: ResamplingCriterion + ?Sized> ResamplingCriterion for Box<T> {
    fn is_resampling_needed(&self, weights: &[f64]) -> Result<bool> {
        (**self).is_resampling_needed(weights)
    }
}

/// Fraction of the particle count, in `(0, 1]`, below which the effective
/// sample size triggers resampling.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ResamplingRatio(f64);

impl ResamplingRatio {
    pub fn new(ratio: f64) -> Result<Self> {
        if ratio > 0.0 && ratio <= 1.0 {
            Ok(Self(ratio))
        } else {
            Err(WeightError::InvalidRatio(ratio))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for ResamplingRatio {
    type Error = WeightError;

    fn try_from(ratio: f64) -> Result<Self> {
        Self::new(ratio)
    }
}

impl From<ResamplingRatio> for f64 {
    fn from(ratio: ResamplingRatio) -> f64 {
        ratio.0
    }
}

/// `1 / Σ w²`, between 1 (all the mass on one particle) and N (uniform).
///
/// The zero check is on the value itself; dividing by zero would only give
/// `inf` here.
pub fn effective_sample_size(weights: &[f64]) -> Result<f64> {
    if weights.is_empty() {
        return Err(WeightError::Empty);
    }

    let sum_sq: f64 = weights.iter().map(|w| w * w).sum();
    if sum_sq == 0.0 {
        return Err(WeightError::DegenerateWeights);
    }

    Ok(1.0 / sum_sq)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveSampleSizeBased {
    ratio: ResamplingRatio,
}

impl EffectiveSampleSizeBased {
    pub fn new(ratio: ResamplingRatio) -> Self {
        Self { ratio }
    }

    pub fn with_ratio(ratio: f64) -> Result<Self> {
        Ok(Self::new(ResamplingRatio::new(ratio)?))
    }

    pub fn ratio(&self) -> ResamplingRatio {
        self.ratio
    }
}

impl ResamplingCriterion for EffectiveSampleSizeBased {
    /// Strict: `ESS < ratio * N`. Uniform weights with a ratio of 1 do not
    /// trigger, whatever N.
    fn is_resampling_needed(&self, weights: &[f64]) -> Result<bool> {
        let ess = effective_sample_size(weights)?;
        let n = weights.len() as f64;

        // Summing N rounded squares can leave the ESS of uniform weights a
        // few ulp below N, so the threshold is lowered by that much.
        let threshold = self.ratio.get() * n * (1.0 - 2.0 * (n + 1.0) * f64::EPSILON);

        let needed = ess < threshold;
        if needed {
            debug!("Effective sample size {:.3} below {:.3}, resampling", ess, threshold);
        }

        Ok(needed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlwaysResampling;

impl ResamplingCriterion for AlwaysResampling {
    fn is_resampling_needed(&self, _weights: &[f64]) -> Result<bool> {
        Ok(true)
    }
}
