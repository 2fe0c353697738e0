use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightError {
    #[error("the weight vector is empty")]
    Empty,

    #[error("the resampling ratio must lie in (0, 1], got {0}")]
    InvalidRatio(f64),

    /// Weights handed to a resampling algorithm are not a distribution. The
    /// payload is the offending sum (NaN if some weight is negative or not finite).
    #[error("the weights do not form a normalized distribution (sum = {0})")]
    NotNormalized(f64),

    #[error("the systematic resampling offset must lie in [0, 1), got {0}")]
    InvalidOffset(f64),

    #[error("all the weights are zero")]
    DegenerateWeights,
}

impl WeightError {
    /// Violated preconditions on the arguments, as opposed to degenerate data.
    pub fn is_invalid_argument(&self) -> bool {
        !matches!(self, WeightError::DegenerateWeights)
    }
}

pub type Result<T> = std::result::Result<T, WeightError>;
