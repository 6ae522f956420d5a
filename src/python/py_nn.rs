//! Neural network bindings for Python.

use numpy::{PyArray1, PyArrayMethods};
use pyo3::prelude::*;
use tracing::warn;

use crate::core::BOARD_CELLS;
use crate::nn::{EncodedState, QNetwork};

/// Python-implemented QNetwork wrapper.
///
/// Wraps any callable taking a float32 array of shape `(1, 1, 9)` and
/// returning 9 Q-values in any array-like form, so a Keras model's
/// `predict` can be passed directly.
#[pyclass(name = "QNetwork")]
pub struct PyQNetwork {
    callback: PyObject,
}

#[pymethods]
impl PyQNetwork {
    #[new]
    fn new(callback: PyObject) -> Self {
        Self { callback }
    }

    /// Call the network on an observation (9 values).
    fn predict(&self, py: Python<'_>, observation: Vec<f32>) -> PyResult<Vec<f32>> {
        if observation.len() != BOARD_CELLS {
            return Err(pyo3::exceptions::PyValueError::new_err(format!(
                "expected {} observation values, got {}",
                BOARD_CELLS,
                observation.len()
            )));
        }
        let encoded = EncodedState::new(observation, vec![BOARD_CELLS]);
        self.call(py, &encoded)
    }
}

impl PyQNetwork {
    fn call(&self, py: Python<'_>, encoded: &EncodedState) -> PyResult<Vec<f32>> {
        let input = PyArray1::from_slice_bound(py, &encoded.tensor).reshape([1, 1, BOARD_CELLS])?;
        let result = self.callback.call1(py, (input,))?;
        let flat = py
            .import_bound("numpy")?
            .call_method1("asarray", (result,))?
            .call_method0("ravel")?
            .call_method0("tolist")?;
        flat.extract::<Vec<f32>>()
    }

    /// Q-values used when the Python callback fails: all zero, so the
    /// policy falls back to the first free cell.
    fn fallback_prediction(&self) -> Vec<f32> {
        vec![0.0; BOARD_CELLS]
    }
}

impl QNetwork for PyQNetwork {
    fn predict(&self, encoded: &EncodedState) -> Vec<f32> {
        Python::with_gil(|py| match self.call(py, encoded) {
            Ok(q) => q,
            Err(e) => {
                warn!(error = %e, "QNetwork: predict() call failed");
                self.fallback_prediction()
            }
        })
    }
}

// SAFETY: PyQNetwork is Send + Sync because:
// 1. All Python interactions go through Python::with_gil()
// 2. PyObject reference counting is safe across threads when accessed
//    through the GIL
//
// INVARIANT: Any new methods that access self.callback MUST hold the GIL.
unsafe impl Send for PyQNetwork {}
unsafe impl Sync for PyQNetwork {}

impl Clone for PyQNetwork {
    fn clone(&self) -> Self {
        Python::with_gil(|py| Self {
            callback: self.callback.clone_ref(py),
        })
    }
}
