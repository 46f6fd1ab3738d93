//! compartments::errors — error type for the fallible compartment surfaces.
//!
//! Purpose
//! -------
//! The signal kernels themselves are total and never return errors. Errors
//! arise only around them: building or validating a Bessel root table,
//! checking parameters against their bounds, and assembling an acquisition
//! protocol for batch simulation. [`CompartmentError`] covers all three.
//!
//! Conventions
//! -----------
//! - Variants carry the offending value and enough context (column name,
//!   index, bounds) to be useful in a log line without extra state.
//! - With the `python-bindings` feature, errors convert into `ValueError`
//!   with the `Display` message preserved.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for compartment operations that may produce [`CompartmentError`].
pub type CompartmentResult<T> = Result<T, CompartmentError>;

/// Error conditions for root tables, parameters, and protocols.
#[derive(Debug, Clone, PartialEq)]
pub enum CompartmentError {
    // ---- Bessel root tables ----
    /// A root table with zero entries was requested or supplied.
    EmptyRootTable,

    /// A supplied root table entry is unusable.
    InvalidRootTable { index: usize, value: f64, reason: &'static str },

    // ---- Parameters ----
    /// Parameter is NaN or ±inf.
    NonFiniteParameter { name: &'static str, value: f64 },

    /// Parameter lies outside its admissible interval.
    ParameterOutOfBounds { name: &'static str, value: f64, lower: f64, upper: f64 },

    // ---- Protocols ----
    /// The protocol has no columns or no measurements.
    EmptyProtocol,

    /// A column's length disagrees with the protocol length.
    ColumnLengthMismatch { column: &'static str, expected: usize, actual: usize },

    /// The gradient matrix does not have three columns.
    InvalidGradientShape { columns: usize },

    /// A protocol entry is NaN or ±inf.
    NonFiniteProtocolValue { column: &'static str, index: usize, value: f64 },

    /// A model needs a column that the protocol does not provide.
    MissingProtocolColumn { column: &'static str, model: &'static str },
}

impl std::error::Error for CompartmentError {}

impl std::fmt::Display for CompartmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompartmentError::EmptyRootTable => {
                write!(f, "Bessel root table must contain at least one root.")
            }
            CompartmentError::InvalidRootTable { index, value, reason } => {
                write!(f, "Invalid Bessel root at index {index}: {value} ({reason}).")
            }
            CompartmentError::NonFiniteParameter { name, value } => {
                write!(f, "Parameter {name} = {value} must be finite.")
            }
            CompartmentError::ParameterOutOfBounds { name, value, lower, upper } => {
                write!(f, "Parameter {name} = {value} is outside [{lower}, {upper}].")
            }
            CompartmentError::EmptyProtocol => {
                write!(f, "Protocol must contain at least one column and one measurement.")
            }
            CompartmentError::ColumnLengthMismatch { column, expected, actual } => {
                write!(
                    f,
                    "Protocol column {column} has {actual} entries; expected {expected}."
                )
            }
            CompartmentError::InvalidGradientShape { columns } => {
                write!(f, "Gradient directions must have 3 columns; got {columns}.")
            }
            CompartmentError::NonFiniteProtocolValue { column, index, value } => {
                write!(f, "Protocol column {column} has non-finite value {value} at index {index}.")
            }
            CompartmentError::MissingProtocolColumn { column, model } => {
                write!(f, "Model {model} requires protocol column {column}, which is missing.")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<CompartmentError> for PyErr {
    fn from(err: CompartmentError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
