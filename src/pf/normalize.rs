use log::warn;
use num_traits::Float;

use crate::errors::{Result, WeightError};
use crate::utils::{cast, isclose, log_underflow_threshold, logsumexp};

/// Outcome of a guarded normalization.
///
/// `Flattened` means the total mass was numerically zero and the uniform
/// distribution was substituted. A warning has been logged in that case.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized<F> {
    Scaled(Vec<F>),
    Flattened(Vec<F>),
}

impl<F> Normalized<F> {
    pub fn is_flattened(&self) -> bool {
        matches!(self, Normalized::Flattened(_))
    }

    pub fn weights(&self) -> &[F] {
        match self {
            Normalized::Scaled(w) | Normalized::Flattened(w) => w,
        }
    }

    pub fn into_weights(self) -> Vec<F> {
        match self {
            Normalized::Scaled(w) | Normalized::Flattened(w) => w,
        }
    }
}

pub fn uniform_weights<F: Float>(n: usize) -> Vec<F> {
    vec![F::one() / cast::<F>(n as f64); n]
}

pub fn uniform_logweights<F: Float>(n: usize) -> Vec<F> {
    vec![-cast::<F>(n as f64).ln(); n]
}

/// Scales the weights so that they add up to 1.
///
/// If they add up to zero (for a computer, anyway) they are replaced with a
/// uniform distribution and a warning is logged.
pub fn normalize_or_flatten<F: Float>(weights: &[F]) -> Result<Normalized<F>> {
    if weights.is_empty() {
        return Err(WeightError::Empty);
    }

    let sum = weights.iter().fold(F::zero(), |acc, w| acc + *w);

    if isclose(sum, F::zero()) {
        warn!(target: "pfweights::normalize", "All the {} weights add up to 0...just flattening them", weights.len());
        return Ok(Normalized::Flattened(uniform_weights(weights.len())));
    }

    Ok(Normalized::Scaled(weights.iter().map(|w| *w / sum).collect()))
}

/// Shifts the log-weights so that their log-sum is 0.
///
/// Closeness to `-inf` cannot be tested by subtraction, so degeneracy is
/// decided on the log-sum itself: at or below
/// [`log_underflow_threshold`] the weights are replaced by `-ln(N)` each and
/// a warning is logged.
pub fn normalize_log<F: Float>(log_weights: &[F]) -> Result<Normalized<F>> {
    let logsum = logsumexp(log_weights)?;

    if logsum <= log_underflow_threshold::<F>() {
        warn!(
            target: "pfweights::normalize",
            "The {} log-weights add up to (almost) 0 (log-sum {:?})...just flattening them",
            log_weights.len(),
            logsum.to_f64()
        );
        return Ok(Normalized::Flattened(uniform_logweights(log_weights.len())));
    }

    Ok(Normalized::Scaled(log_weights.iter().map(|lnw| *lnw - logsum).collect()))
}

/// Linear-space normalized weights from their logarithms, `exp(lnw - logsum)`.
///
/// There is no degeneracy guard: if every log-weight is `-inf` the log-sum is
/// `-inf` too and every output is `NaN`. Callers that can hit that case
/// should go through [`normalize_log`] instead.
pub fn normalize_from_logs_unchecked<F: Float>(log_weights: &[F]) -> Result<Vec<F>> {
    let logsum = logsumexp(log_weights)?;

    Ok(log_weights.iter().map(|lnw| (*lnw - logsum).exp()).collect())
}


#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use statrs::assert_almost_eq;

    use super::*;

    #[test]
    fn test_normalize_or_flatten() {
        let result = normalize_or_flatten(&[4.0, 1.0]).unwrap();
        assert!(!result.is_flattened());
        assert_eq!(result.weights(), &[0.8, 0.2]);
    }

    #[test]
    fn test_normalize_or_flatten_sums_to_one() {
        let cases: Vec<Vec<f64>> = vec![
            vec![1.0],
            vec![0.1, 0.2, 0.3, 0.4],
            vec![3.0, 0.0, 7.0, 1e-3],
            vec![1e-6; 10],
            (1..=100).map(|i| i as f64).collect(),
        ];

        for weights in cases {
            let normalized = normalize_or_flatten(&weights).unwrap().into_weights();
            assert_eq!(normalized.len(), weights.len());
            assert!(normalized.iter().all(|w| *w >= 0.0));
            assert_almost_eq!(normalized.iter().sum::<f64>(), 1.0, 1e-9);
        }
    }

    #[test]
    fn test_normalize_or_flatten_degenerate() {
        let result = normalize_or_flatten(&[0.0, 0.0, 0.0, 0.0]).unwrap();
        assert!(result.is_flattened());
        assert_eq!(result.into_weights(), vec![0.25; 4]);

        // below the absolute tolerance
        let result = normalize_or_flatten(&[1e-9, 1e-10]).unwrap();
        assert!(result.is_flattened());
        assert_eq!(result.into_weights(), vec![0.5; 2]);
    }

    #[test]
    fn test_normalize_log() {
        let result = normalize_log(&[4.0_f64.ln(), 1.0_f64.ln()]).unwrap();
        assert!(!result.is_flattened());

        let got = result.into_weights();
        assert_almost_eq!(got[0], 0.8_f64.ln(), 1e-12);
        assert_almost_eq!(got[1], 0.2_f64.ln(), 1e-12);
        assert_almost_eq!(logsumexp(&got).unwrap(), 0.0, 1e-12);
    }

    #[test]
    fn test_normalize_log_handles_large_magnitudes() {
        let result = normalize_log(&[800.0, 801.0, -1e4]).unwrap();
        assert!(!result.is_flattened());

        let got = result.into_weights();
        assert!(got.iter().all(|w| *w <= 0.0));
        assert_almost_eq!(logsumexp(&got).unwrap(), 0.0, 1e-12);
    }

    #[test]
    fn test_normalize_log_degenerate() {
        let result = normalize_log(&[-1000.0; 4]).unwrap();
        assert!(result.is_flattened());
        for w in result.weights() {
            assert_almost_eq!(*w, -(4.0_f64.ln()), 1e-12);
        }

        let result = normalize_log(&[f64::NEG_INFINITY; 3]).unwrap();
        assert!(result.is_flattened());
        assert_eq!(result.into_weights(), uniform_logweights::<f64>(3));
    }

    #[test]
    fn test_normalize_log_threshold_boundary() {
        // Just above the threshold is still a valid (if tiny) distribution
        let above = log_underflow_threshold::<f64>() + 0.5;
        assert!(!normalize_log(&[above]).unwrap().is_flattened());

        let below = log_underflow_threshold::<f64>() - 0.5;
        assert!(normalize_log(&[below]).unwrap().is_flattened());
    }

    #[test]
    fn test_normalize_from_logs_unchecked() {
        let got = normalize_from_logs_unchecked(&[4.0_f64.ln(), 1.0_f64.ln()]).unwrap();
        assert_almost_eq!(got[0], 0.8, 1e-12);
        assert_almost_eq!(got[1], 0.2, 1e-12);
    }

    #[test]
    fn test_log_and_linear_normalization_agree() {
        let cases: Vec<Vec<f64>> = vec![
            vec![0.0, 0.0],
            vec![-1.0, -2.0, -3.0, 0.5],
            vec![2.0, -5.0, 0.3],
        ];

        for logs in cases {
            let from_logs = normalize_from_logs_unchecked(&logs).unwrap();
            let linear = normalize_or_flatten(&logs.iter().map(|l| l.exp()).collect_vec())
                .unwrap()
                .into_weights();

            for (a, b) in from_logs.iter().zip(linear.iter()) {
                assert_almost_eq!(*a, *b, 1e-12);
            }
        }
    }

    #[test]
    fn test_normalize_from_logs_unchecked_propagates_nan() {
        let got = normalize_from_logs_unchecked(&[f64::NEG_INFINITY; 2]).unwrap();
        assert!(got.iter().all(|w| w.is_nan()));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_or_flatten::<f64>(&[]), Err(WeightError::Empty));
        assert_eq!(normalize_log::<f64>(&[]), Err(WeightError::Empty));
        assert_eq!(normalize_from_logs_unchecked::<f64>(&[]), Err(WeightError::Empty));
    }

    #[test]
    fn test_uniform() {
        assert_eq!(uniform_weights::<f64>(4), vec![0.25; 4]);
        assert_almost_eq!(uniform_logweights::<f64>(2)[1], -(2.0_f64.ln()), 1e-15);
        assert_eq!(uniform_weights::<f32>(1), vec![1.0_f32]);
    }
}
