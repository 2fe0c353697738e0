//! Weight management for particle filters.
//!
//! Stable normalization of particle weights, given either directly or as
//! logarithms, and the resampling policies deciding when to resample and
//! which particles to keep. Only indexes are produced; gathering the
//! particles is up to the filter.
//!
//! A typical step, after the weights have been updated:
//!
//! ```
//! use pfweights::pf::{normalize_or_flatten, EffectiveSampleSizeBased, ResamplingPolicy, SystematicResampling};
//! use rand::SeedableRng;
//!
//! let weights = normalize_or_flatten(&[0.9, 0.05, 0.03, 0.02])?.into_weights();
//!
//! let mut policy = ResamplingPolicy::new(
//!     SystematicResampling::new(rand::rngs::StdRng::seed_from_u64(1)),
//!     EffectiveSampleSizeBased::with_ratio(0.5)?,
//! );
//!
//! if let Some(indexes) = policy.resample_if_needed(&weights)? {
//!     assert_eq!(indexes.len(), 4);
//! }
//! # Ok::<(), pfweights::WeightError>(())
//! ```

pub mod config;
pub mod errors;
pub mod pf;
pub mod utils;

pub use errors::WeightError;
pub use utils::{log_sum_from_individual_logs, logsumexp};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// A Python module implemented in Rust.
#[cfg(feature = "python")]
#[pymodule]
fn pfweights(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pf::pybindings::register(m)
}
