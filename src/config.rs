//! Construction-time configuration of a resampling policy.
//!
//! The configuration only names the strategies and their parameters; the
//! random source is always handed in by the caller when building.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::pf::{
    AlwaysResampling, EffectiveSampleSizeBased, MultinomialResampling, ResamplingAlgorithm,
    ResamplingCriterion, ResamplingPolicy, ResamplingRatio, SystematicResampling,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    Multinomial,
    #[default]
    Systematic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CriterionKind {
    Always,
    EffectiveSampleSize { ratio: f64 },
}

impl Default for CriterionKind {
    fn default() -> Self {
        CriterionKind::EffectiveSampleSize { ratio: 0.5 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResamplingConfig {
    pub algorithm: AlgorithmKind,
    pub criterion: CriterionKind,
}

pub type BoxedPolicy<'a> = ResamplingPolicy<Box<dyn ResamplingAlgorithm + 'a>, Box<dyn ResamplingCriterion>>;

impl ResamplingConfig {
    pub fn build_algorithm<'a, R: Rng + 'a>(&self, rng: R) -> Box<dyn ResamplingAlgorithm + 'a> {
        match self.algorithm {
            AlgorithmKind::Multinomial => Box::new(MultinomialResampling::new(rng)),
            AlgorithmKind::Systematic => Box::new(SystematicResampling::new(rng)),
        }
    }

    /// Fails if the ratio of an effective sample size criterion is not in `(0, 1]`.
    pub fn build_criterion(&self) -> Result<Box<dyn ResamplingCriterion>> {
        let criterion: Box<dyn ResamplingCriterion> = match self.criterion {
            CriterionKind::Always => Box::new(AlwaysResampling),
            CriterionKind::EffectiveSampleSize { ratio } => {
                Box::new(EffectiveSampleSizeBased::new(ResamplingRatio::new(ratio)?))
            }
        };

        Ok(criterion)
    }

    pub fn build<'a, R: Rng + 'a>(&self, rng: R) -> Result<BoxedPolicy<'a>> {
        let criterion = self.build_criterion()?;

        Ok(ResamplingPolicy::new(self.build_algorithm(rng), criterion))
    }
}
