//! utils — conversions at the Python boundary.
//!
//! Purpose
//! -------
//! Turn loosely typed Python inputs (numpy arrays, pandas objects, plain
//! sequences) into the `ndarray` columns a [`Protocol`](crate::compartments::Protocol)
//! is built from, in the library's [`DefaultFloat`] precision.
//!
//! Conventions
//! -----------
//! - Inputs are read as `float64` and narrowed with
//!   [`ModelFloat::lit`] when the `single-precision` feature is on.
//! - Type errors become `TypeError`; shape errors are left to
//!   [`ProtocolBuilder::build`](crate::compartments::ProtocolBuilder::build),
//!   which reports them as `ValueError`.

#[cfg(feature = "python-bindings")]
use crate::float::{DefaultFloat, ModelFloat};

#[cfg(feature = "python-bindings")]
use ndarray::{Array1, Array2};

#[cfg(feature = "python-bindings")]
use numpy::{PyReadonlyArray1, PyReadonlyArray2};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyTypeError, prelude::*, types::PyAny};

/// Read a 1-D float column from a numpy array, a pandas Series (via
/// `to_numpy`), or any sequence of floats.
///
/// Errors
/// ------
/// - `TypeError` naming `column` when none of the above applies.
#[cfg(feature = "python-bindings")]
pub fn extract_column(raw: &Bound<'_, PyAny>, column: &str) -> PyResult<Array1<DefaultFloat>> {
    if let Ok(array) = raw.extract::<PyReadonlyArray1<f64>>() {
        return Ok(array.as_array().mapv(DefaultFloat::lit));
    }

    if let Ok(obj) = raw.call_method("to_numpy", (false,), None) {
        if let Ok(array) = obj.extract::<PyReadonlyArray1<f64>>() {
            return Ok(array.as_array().mapv(DefaultFloat::lit));
        }
    }

    let values: Vec<f64> = raw.extract().map_err(|_| {
        PyTypeError::new_err(format!(
            "{column}: expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64"
        ))
    })?;
    Ok(values.into_iter().map(DefaultFloat::lit).collect())
}

/// Read an `n × 3` gradient-direction matrix from a 2-D numpy array or a
/// sequence of 3-element sequences.
///
/// A 2-D array with the wrong number of columns is passed through so that
/// protocol validation can report the shape.
#[cfg(feature = "python-bindings")]
pub fn extract_gradient_matrix(raw: &Bound<'_, PyAny>) -> PyResult<Array2<DefaultFloat>> {
    if let Ok(array) = raw.extract::<PyReadonlyArray2<f64>>() {
        return Ok(array.as_array().mapv(DefaultFloat::lit));
    }

    let rows: Vec<[f64; 3]> = raw.extract().map_err(|_| {
        PyTypeError::new_err("g: expected an (n, 3) numpy.ndarray or a sequence of 3-vectors")
    })?;
    Ok(Array2::from_shape_fn((rows.len(), 3), |(i, j)| DefaultFloat::lit(rows[i][j])))
}

/// Widen a result column back to `float64` for numpy.
#[cfg(feature = "python-bindings")]
pub fn widen(values: Array1<DefaultFloat>) -> Array1<f64> {
    values.mapv(ModelFloat::to_f64_lossy)
}
