use num_traits::Float;

use crate::errors::{Result, WeightError};

/// Relative tolerance used by [`isclose`].
pub const RTOL: f64 = 1e-5;
/// Absolute tolerance used by [`isclose`].
pub const ATOL: f64 = 1e-8;

pub(crate) fn cast<F: Float>(v: f64) -> F {
    F::from(v).unwrap_or_else(F::nan)
}

/// Logarithm of a sum computed from the logarithms of its terms.
///
/// The largest term is factored out and only the remaining ones are
/// exponentiated, so that `ln_1p` keeps the precision when all of them are
/// negligible next to the maximum.
///
/// * empty input is an error
/// * any `+inf` gives `+inf`, all `-inf` gives `-inf`
/// * any `NaN` gives `NaN`
pub fn logsumexp<F: Float>(log_numbers: &[F]) -> Result<F> {
    if log_numbers.is_empty() {
        return Err(WeightError::Empty);
    }

    if log_numbers.iter().any(|f| f.is_nan()) {
        return Ok(F::nan());
    }

    let (imax, max) = log_numbers
        .iter()
        .copied()
        .enumerate()
        .fold((0, F::neg_infinity()), |(ia, a), (ib, b)| {
            if b > a { (ib, b) } else { (ia, a) }
        });

    let result = {
        if max == F::infinity() || max == F::neg_infinity() {
            max
        } else {
            let rest = log_numbers
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != imax)
                .fold(F::zero(), |acc, (_, f)| acc + (*f - max).exp());

            max + rest.ln_1p()
        }
    };

    Ok(result)
}

/// Same as [`logsumexp`], under the name the Python toolkit exposes.
pub fn log_sum_from_individual_logs<F: Float>(logs: &[F]) -> Result<F> {
    logsumexp(logs)
}

/// `|a - b| <= ATOL + RTOL * |b|`, i.e. numpy's `isclose` with its defaults.
pub fn isclose<F: Float>(a: F, b: F) -> bool {
    (a - b).abs() <= cast::<F>(ATOL) + cast::<F>(RTOL) * b.abs()
}

/// Log-sum at or below which a distribution counts as degenerate.
///
/// This is `negep * ln(2)`, where `2^negep` is the smallest power of two that
/// still changes `1` when subtracted from it. Exponentiating anything below
/// it is indistinguishable from zero next to a unit mass. For `f64` this is
/// `-53 ln 2`, about `-36.7`.
pub fn log_underflow_threshold<F: Float>() -> F {
    (F::epsilon() / (F::one() + F::one())).ln()
}
