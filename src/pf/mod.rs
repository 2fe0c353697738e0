use crate::errors::Result;

pub mod criterion;
pub mod normalize;
pub mod resample;

#[cfg(feature = "python")]
pub mod pybindings;

pub use criterion::{
    effective_sample_size, AlwaysResampling, EffectiveSampleSizeBased, ResamplingCriterion,
    ResamplingRatio,
};
pub use normalize::{
    normalize_from_logs_unchecked, normalize_log, normalize_or_flatten, uniform_logweights,
    uniform_weights, Normalized,
};
pub use resample::{
    systematic_indexes, MultinomialResampling, ResamplingAlgorithm, SystematicResampling,
};

/// A criterion (when) paired with an algorithm (how).
#[derive(Debug, Clone)]
pub struct ResamplingPolicy<A, C> {
    pub algorithm: A,
    pub criterion: C,
}

impl<A: ResamplingAlgorithm, C: ResamplingCriterion> ResamplingPolicy<A, C> {
    pub fn new(algorithm: A, criterion: C) -> Self {
        Self { algorithm, criterion }
    }

    /// The indexes of the particles to keep if the criterion asks for
    /// resampling this step, `None` otherwise. As many indexes as weights.
    pub fn resample_if_needed(&mut self, weights: &[f64]) -> Result<Option<Vec<usize>>> {
        if !self.criterion.is_resampling_needed(weights)? {
            return Ok(None);
        }

        self.algorithm.get_indexes(weights, None).map(Some)
    }
}
