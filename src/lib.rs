//! dmri_compartments — diffusion MRI compartment signal kernels with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! the compartment kernels to Python via the `_dmri_compartments` extension
//! module. Two compartments are provided: a T1 inversion-recovery signal and
//! the intra-cellular compartment of the NODDI family (Watson-dispersed sticks
//! or cylinders).
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`compartments`, `special`, `float`) as
//!   the public crate surface.
//! - Define `#[pyfunction]` wrappers and the `#[pymodule]` initializer for the
//!   `_dmri_compartments` Python extension.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work is implemented in the inner Rust modules; this file
//!   performs only FFI glue, protocol assembly, and error mapping.
//! - Kernels are pure and may be called concurrently; the Python wrappers
//!   release nothing and hold no state between calls.
//!
//! Conventions
//! -----------
//! - SI units everywhere (seconds, metres, s/m², T/m).
//! - Precision is fixed at build time by [`float::DefaultFloat`]; Python
//!   always sees `float64` arrays.
//! - Errors from core Rust code are [`compartments::CompartmentError`] values
//!   internally and become `ValueError` at the PyO3 boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should call the kernels directly (for example from a
//!   fitting loop) or go through [`compartments::simulate_signal`] for whole
//!   protocols.
//! - Python code imports `_dmri_compartments` and calls `exp_t1_dec_ir`,
//!   `noddi_ic`, and `bessel_roots`.
//!
//! Testing notes
//! -------------
//! - Numerical behavior is covered by unit tests in the inner modules and by
//!   the integration tests under `tests/`.

pub mod compartments;
pub mod float;
pub mod special;
pub mod utils;

pub use compartments::{
    BesselRootTable, BesselRoots, CompartmentError, CompartmentModel, CompartmentResult,
    ExpT1DecIR, NoddiIC, Protocol, ProtocolBuilder, exp_t1_dec_ir, noddi_ic, simulate_signal,
};
pub use float::{DefaultFloat, ModelFloat};

#[cfg(feature = "python-bindings")]
use pyo3::prelude::*;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1, PyReadonlyArray1};

#[cfg(feature = "python-bindings")]
use crate::utils::{extract_column, extract_gradient_matrix, widen};

/// Python wrapper: T1 inversion-recovery signal for each inversion time.
///
/// Parameters
/// ----------
/// - `ti`: array-like of inversion times (s).
/// - `t1`: longitudinal relaxation time (s).
///
/// Returns
/// -------
/// `numpy.ndarray[float64]` of `|1 - 2 exp(-ti / t1)|`.
///
/// Raises
/// ------
/// - `TypeError` if `ti` is not array-like.
/// - `ValueError` if `ti` is empty or contains non-finite values.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(name = "exp_t1_dec_ir", signature = (ti, t1), text_signature = "(ti, t1, /)")]
pub fn py_exp_t1_dec_ir<'py>(
    py: Python<'py>, ti: &Bound<'py, PyAny>, t1: f64,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let protocol = ProtocolBuilder::new().inversion_time(extract_column(ti, "Ti")?).build()?;
    let signal = simulate_signal(&ExpT1DecIR::new(DefaultFloat::lit(t1)), &protocol)?;
    Ok(widen(signal).into_pyarray(py))
}

/// Python wrapper: NODDI intra-cellular signal for each measurement.
///
/// Parameters
/// ----------
/// - `g`: `(n, 3)` unit gradient directions.
/// - `b`: b-values (s/m²), length `n`.
/// - `G`, `Delta`, `delta`: gradient amplitude (T/m), pulse separation and
///   duration (s), length `n`. Only used when `R != 0`.
/// - `d`, `theta`, `phi`, `kappa`: diffusivity, mean axis angles, and Watson
///   concentration.
/// - `R`: cylinder radius (m); `0` for sticks.
/// - `roots`: optional zeros of `J1'`. Defaults to the first
///   [`compartments::DEFAULT_BESSEL_ROOT_COUNT`] zeros. Neither is read,
///   validated, or computed when `R == 0`.
///
/// Raises
/// ------
/// - `ValueError` for inconsistent protocol columns, or an invalid root
///   table when `R != 0`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    name = "noddi_ic",
    signature = (g, b, G, Delta, delta, d, theta, phi, kappa, R, roots = None),
    text_signature = "(g, b, G, Delta, delta, d, theta, phi, kappa, R, /, roots=None)"
)]
#[allow(non_snake_case, clippy::too_many_arguments)]
pub fn py_noddi_ic<'py>(
    py: Python<'py>, g: &Bound<'py, PyAny>, b: &Bound<'py, PyAny>, G: &Bound<'py, PyAny>,
    Delta: &Bound<'py, PyAny>, delta: &Bound<'py, PyAny>, d: f64, theta: f64, phi: f64,
    kappa: f64, R: f64, roots: Option<PyReadonlyArray1<'py, f64>>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let lit = DefaultFloat::lit;
    let supplied: Option<Vec<DefaultFloat>> =
        roots.map(|values| values.as_array().iter().map(|&r| lit(r)).collect());
    let table = BesselRootTable::for_radius(lit(R), supplied)?;

    let mut builder = ProtocolBuilder::new()
        .gradients(extract_gradient_matrix(g)?)
        .b_values(extract_column(b, "b")?);
    if table.is_some() {
        builder = builder
            .gradient_strength(extract_column(G, "G")?)
            .big_delta(extract_column(Delta, "Delta")?)
            .small_delta(extract_column(delta, "delta")?);
    }
    let protocol = builder.build()?;

    let (d, theta, phi, kappa) = (lit(d), lit(theta), lit(phi), lit(kappa));
    let signal = match &table {
        Some(table) => {
            let model = NoddiIC::cylinder(d, theta, phi, kappa, lit(R), table.view());
            simulate_signal(&model, &protocol)?
        }
        None => simulate_signal(&NoddiIC::stick(d, theta, phi, kappa), &protocol)?,
    };
    Ok(widen(signal).into_pyarray(py))
}

/// Python wrapper: the first `count` positive zeros of `J1'`.
///
/// Raises
/// ------
/// - `ValueError` if `count == 0`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(name = "bessel_roots", signature = (count = compartments::DEFAULT_BESSEL_ROOT_COUNT))]
pub fn py_bessel_roots<'py>(py: Python<'py>, count: usize) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let table = BesselRootTable::<f64>::new(count)?;
    Ok(table.as_slice().to_vec().into_pyarray(py))
}

/// Python module initializer for `_dmri_compartments`.
///
/// Notes
/// -----
/// - This function is invoked automatically by Python when importing the
///   compiled extension; it is not called directly by user code.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _dmri_compartments<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_exp_t1_dec_ir, m)?)?;
    m.add_function(wrap_pyfunction!(py_noddi_ic, m)?)?;
    m.add_function(wrap_pyfunction!(py_bessel_roots, m)?)?;
    Ok(())
}
