//! numpy array conversions.

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// Copy a contiguous numpy array into a Vec<f64>.
pub fn numpy_to_vec_f64(arr: PyReadonlyArray1<f64>) -> PyResult<Vec<f64>> {
    arr.as_slice()
        .map(|s| s.to_vec())
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Convert Vec<f64> to numpy array.
pub fn vec_to_numpy_f64<'py>(py: Python<'py>, vec: Vec<f64>) -> &'py PyArray1<f64> {
    PyArray1::from_vec(py, vec)
}
