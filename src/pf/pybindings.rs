use numpy::{IntoPyArray, PyArray1, PyReadonlyArray1};
use pyo3::exceptions::{PyUserWarning, PyValueError};
use pyo3::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::errors::WeightError;

use super::{
    criterion, normalize, AlwaysResampling, EffectiveSampleSizeBased, MultinomialResampling,
    Normalized, ResamplingAlgorithm, ResamplingCriterion, SystematicResampling,
};

type PyVec<'a> = PyReadonlyArray1<'a, f64>;

impl From<WeightError> for PyErr {
    fn from(err: WeightError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

// The Python side expects a UserWarning whenever the weights get flattened
fn warn_if_flattened(py: Python<'_>, normalized: &Normalized<f64>) -> PyResult<()> {
    if normalized.is_flattened() {
        PyErr::warn_bound(
            py,
            &py.get_type_bound::<PyUserWarning>(),
            "All the weights add up to 0...just flattening them",
            1,
        )?;
    }
    Ok(())
}

fn to_pyindexes<'py>(py: Python<'py>, indexes: Vec<usize>) -> Bound<'py, PyArray1<i64>> {
    indexes.into_iter().map(|i| i as i64).collect::<Vec<_>>().into_pyarray_bound(py)
}

// Python callers pass n=0 to mean "as many as there are particles"
fn all_if_zero(n: Option<usize>) -> Option<usize> {
    n.filter(|n| *n > 0)
}

#[pyfunction]
#[pyo3(name = "log_sum_from_individual_logs")]
fn py_logsumexp(logs: PyVec) -> PyResult<f64> {
    Ok(crate::utils::logsumexp(logs.as_slice()?)?)
}

#[pyfunction]
#[pyo3(name = "normalize_or_flatten")]
fn py_normalize_or_flatten<'py>(py: Python<'py>, weights: PyVec<'py>) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let normalized = normalize::normalize_or_flatten(weights.as_slice()?)?;
    warn_if_flattened(py, &normalized)?;

    Ok(normalized.into_weights().into_pyarray_bound(py))
}

#[pyfunction]
#[pyo3(name = "normalize_log")]
fn py_normalize_log<'py>(py: Python<'py>, log_weights: PyVec<'py>) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let normalized = normalize::normalize_log(log_weights.as_slice()?)?;
    warn_if_flattened(py, &normalized)?;

    Ok(normalized.into_weights().into_pyarray_bound(py))
}

#[pyfunction]
#[pyo3(name = "normalize_from_logs")]
fn py_normalize_from_logs<'py>(py: Python<'py>, logs: PyVec<'py>) -> PyResult<Bound<'py, PyArray1<f64>>> {
    Ok(normalize::normalize_from_logs_unchecked(logs.as_slice()?)?.into_pyarray_bound(py))
}

#[pyfunction]
#[pyo3(name = "effective_sample_size")]
fn py_effective_sample_size(weights: PyVec) -> PyResult<f64> {
    Ok(criterion::effective_sample_size(weights.as_slice()?)?)
}

#[pyclass(name = "MultinomialResampling")]
struct MultinomialResamplingPy {
    algorithm: MultinomialResampling<ChaCha8Rng>,
}

#[pymethods]
impl MultinomialResamplingPy {
    #[new]
    fn new(seed: u64) -> Self {
        Self { algorithm: MultinomialResampling::new(ChaCha8Rng::seed_from_u64(seed)) }
    }

    #[pyo3(signature = (weights, n=None))]
    fn get_indexes<'py>(&mut self, py: Python<'py>, weights: PyVec<'py>, n: Option<usize>) -> PyResult<Bound<'py, PyArray1<i64>>> {
        let indexes = self.algorithm.get_indexes(weights.as_slice()?, all_if_zero(n))?;
        Ok(to_pyindexes(py, indexes))
    }
}

#[pyclass(name = "SystematicResampling")]
struct SystematicResamplingPy {
    algorithm: SystematicResampling<ChaCha8Rng>,
}

#[pymethods]
impl SystematicResamplingPy {
    #[new]
    fn new(seed: u64) -> Self {
        Self { algorithm: SystematicResampling::new(ChaCha8Rng::seed_from_u64(seed)) }
    }

    #[pyo3(signature = (weights, n=None))]
    fn get_indexes<'py>(&mut self, py: Python<'py>, weights: PyVec<'py>, n: Option<usize>) -> PyResult<Bound<'py, PyArray1<i64>>> {
        let indexes = self.algorithm.get_indexes(weights.as_slice()?, all_if_zero(n))?;
        Ok(to_pyindexes(py, indexes))
    }
}

#[pyclass(name = "EffectiveSampleSizeBasedResamplingCriterion")]
struct EffectiveSampleSizeBasedPy {
    criterion: EffectiveSampleSizeBased,
}

#[pymethods]
impl EffectiveSampleSizeBasedPy {
    #[new]
    fn new(resampling_ratio: f64) -> PyResult<Self> {
        Ok(Self { criterion: EffectiveSampleSizeBased::with_ratio(resampling_ratio)? })
    }

    fn is_resampling_needed(&self, weights: PyVec) -> PyResult<bool> {
        Ok(self.criterion.is_resampling_needed(weights.as_slice()?)?)
    }

    fn __repr__(&self) -> String {
        format!("EffectiveSampleSizeBasedResamplingCriterion(resampling_ratio = {})", self.criterion.ratio().get())
    }
}

#[pyclass(name = "AlwaysResamplingCriterion")]
struct AlwaysResamplingPy {}

#[pymethods]
impl AlwaysResamplingPy {
    #[new]
    fn new() -> Self {
        AlwaysResamplingPy {}
    }

    fn is_resampling_needed(&self, weights: PyVec) -> PyResult<bool> {
        Ok(AlwaysResampling.is_resampling_needed(weights.as_slice()?)?)
    }
}

pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_logsumexp, m)?)?;
    m.add_function(wrap_pyfunction!(py_normalize_or_flatten, m)?)?;
    m.add_function(wrap_pyfunction!(py_normalize_log, m)?)?;
    m.add_function(wrap_pyfunction!(py_normalize_from_logs, m)?)?;
    m.add_function(wrap_pyfunction!(py_effective_sample_size, m)?)?;
    m.add_class::<MultinomialResamplingPy>()?;
    m.add_class::<SystematicResamplingPy>()?;
    m.add_class::<EffectiveSampleSizeBasedPy>()?;
    m.add_class::<AlwaysResamplingPy>()?;
    Ok(())
}
