//! compartments::protocol — acquisition protocols and batch signal simulation.
//!
//! Purpose
//! -------
//! Hold the per-measurement acquisition settings of an MRI experiment as a
//! column store and evaluate a [`CompartmentModel`] at every measurement.
//! Kernels take scalars; this module is where arrays of measurements meet
//! them.
//!
//! Key behaviors
//! -------------
//! - [`ProtocolBuilder`] collects optional columns and validates them into a
//!   [`Protocol`] (non-empty, consistent lengths, finite entries, `n × 3`
//!   gradient directions).
//! - [`simulate_signal`] checks that the protocol carries every column the
//!   model needs, runs the model's preflight checks, and fills an
//!   `Array1<F>` with one signal per measurement.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every column present in a [`Protocol`] has exactly [`Protocol::len`]
//!   entries and only finite values.
//! - Gradient directions are expected to be unit vectors; they are not
//!   renormalized.
//! - Per-measurement evaluation is infallible once the column check in
//!   [`simulate_signal`] has passed.
//!
//! Conventions
//! -----------
//! - Column names follow the usual protocol-file headers: `g`, `b`, `G`,
//!   `Delta`, `delta`, `Ti` (see [`ProtocolColumn::name`]).
//! - Units are SI: s/m² for `b`, T/m for `G`, seconds for timings.
//!
//! Testing notes
//! -------------
//! - Unit tests cover builder validation errors and the missing-column check.
//!   End-to-end simulation is exercised by the integration tests.

use crate::{
    compartments::{
        errors::{CompartmentError, CompartmentResult},
        model::CompartmentModel,
    },
    float::ModelFloat,
};
use ndarray::{Array1, Array2, ArrayView1};
use tracing::debug;

/// Named protocol column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolColumn {
    /// Unit gradient directions, `n × 3`.
    Gradients,
    /// b-values (s/m²).
    BValue,
    /// Gradient amplitude `G` (T/m).
    GradientStrength,
    /// Pulse separation `Δ` (s).
    BigDelta,
    /// Pulse duration `δ` (s).
    SmallDelta,
    /// Inversion time (s).
    InversionTime,
}

impl ProtocolColumn {
    /// Header used for this column in protocol files and error messages.
    pub fn name(self) -> &'static str {
        match self {
            ProtocolColumn::Gradients => "g",
            ProtocolColumn::BValue => "b",
            ProtocolColumn::GradientStrength => "G",
            ProtocolColumn::BigDelta => "Delta",
            ProtocolColumn::SmallDelta => "delta",
            ProtocolColumn::InversionTime => "Ti",
        }
    }
}

/// Validated column store of acquisition settings.
///
/// Construct with [`ProtocolBuilder`]. Columns a model does not need may be
/// absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Protocol<F> {
    len: usize,
    gradients: Option<Array2<F>>,
    b: Option<Array1<F>>,
    gradient_strength: Option<Array1<F>>,
    big_delta: Option<Array1<F>>,
    small_delta: Option<Array1<F>>,
    inversion_time: Option<Array1<F>>,
}

impl<F: ModelFloat> Protocol<F> {
    /// Number of measurements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false` for a built protocol.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn has(&self, column: ProtocolColumn) -> bool {
        match column {
            ProtocolColumn::Gradients => self.gradients.is_some(),
            other => self.scalar_column(other).is_some(),
        }
    }

    /// Borrow a scalar column. Returns `None` for absent columns and for
    /// [`ProtocolColumn::Gradients`], which is two-dimensional.
    pub fn column(&self, column: ProtocolColumn) -> Option<ArrayView1<'_, F>> {
        self.scalar_column(column).map(|values| values.view())
    }

    pub fn gradients(&self) -> Option<&Array2<F>> {
        self.gradients.as_ref()
    }

    /// Gradient direction of measurement `index`, or NaNs if the protocol
    /// has no gradient column.
    ///
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn gradient(&self, index: usize) -> [F; 3] {
        match &self.gradients {
            Some(g) => [g[[index, 0]], g[[index, 1]], g[[index, 2]]],
            None => [F::nan(); 3],
        }
    }

    /// Entry `index` of a scalar column, or NaN if the column is absent.
    ///
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn value(&self, column: ProtocolColumn, index: usize) -> F {
        self.scalar_column(column).map_or(F::nan(), |values| values[index])
    }

    fn scalar_column(&self, column: ProtocolColumn) -> Option<&Array1<F>> {
        match column {
            ProtocolColumn::Gradients => None,
            ProtocolColumn::BValue => self.b.as_ref(),
            ProtocolColumn::GradientStrength => self.gradient_strength.as_ref(),
            ProtocolColumn::BigDelta => self.big_delta.as_ref(),
            ProtocolColumn::SmallDelta => self.small_delta.as_ref(),
            ProtocolColumn::InversionTime => self.inversion_time.as_ref(),
        }
    }
}

/// Builder for [`Protocol`].
///
/// Example
/// -------
/// ```
/// use dmri_compartments::compartments::ProtocolBuilder;
/// use ndarray::array;
///
/// let protocol = ProtocolBuilder::new()
///     .inversion_time(array![0.0, 0.5, 1.0])
///     .build()
///     .unwrap();
/// assert_eq!(protocol.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProtocolBuilder<F> {
    gradients: Option<Array2<F>>,
    b: Option<Array1<F>>,
    gradient_strength: Option<Array1<F>>,
    big_delta: Option<Array1<F>>,
    small_delta: Option<Array1<F>>,
    inversion_time: Option<Array1<F>>,
}

impl<F: ModelFloat> ProtocolBuilder<F> {
    pub fn new() -> Self {
        ProtocolBuilder {
            gradients: None,
            b: None,
            gradient_strength: None,
            big_delta: None,
            small_delta: None,
            inversion_time: None,
        }
    }

    pub fn gradients(mut self, gradients: Array2<F>) -> Self {
        self.gradients = Some(gradients);
        self
    }

    pub fn b_values(mut self, b: Array1<F>) -> Self {
        self.b = Some(b);
        self
    }

    pub fn gradient_strength(mut self, gradient_strength: Array1<F>) -> Self {
        self.gradient_strength = Some(gradient_strength);
        self
    }

    pub fn big_delta(mut self, big_delta: Array1<F>) -> Self {
        self.big_delta = Some(big_delta);
        self
    }

    pub fn small_delta(mut self, small_delta: Array1<F>) -> Self {
        self.small_delta = Some(small_delta);
        self
    }

    pub fn inversion_time(mut self, inversion_time: Array1<F>) -> Self {
        self.inversion_time = Some(inversion_time);
        self
    }

    /// Validate the collected columns.
    ///
    /// Errors
    /// ------
    /// - [`CompartmentError::EmptyProtocol`] when no column was set or the
    ///   columns have zero rows.
    /// - [`CompartmentError::InvalidGradientShape`] when the gradient matrix
    ///   is not `n × 3`.
    /// - [`CompartmentError::ColumnLengthMismatch`] when columns disagree on
    ///   the number of measurements. The first column set (in the order `g`,
    ///   `b`, `G`, `Delta`, `delta`, `Ti`) fixes the expected length.
    /// - [`CompartmentError::NonFiniteProtocolValue`] for NaN or ±inf entries.
    pub fn build(self) -> CompartmentResult<Protocol<F>> {
        if let Some(g) = &self.gradients {
            if g.ncols() != 3 {
                return Err(CompartmentError::InvalidGradientShape { columns: g.ncols() });
            }
        }

        let scalar_columns = [
            (ProtocolColumn::BValue, &self.b),
            (ProtocolColumn::GradientStrength, &self.gradient_strength),
            (ProtocolColumn::BigDelta, &self.big_delta),
            (ProtocolColumn::SmallDelta, &self.small_delta),
            (ProtocolColumn::InversionTime, &self.inversion_time),
        ];

        let len = self
            .gradients
            .as_ref()
            .map(|g| g.nrows())
            .or_else(|| scalar_columns.iter().find_map(|(_, c)| c.as_ref().map(|v| v.len())))
            .ok_or(CompartmentError::EmptyProtocol)?;
        if len == 0 {
            return Err(CompartmentError::EmptyProtocol);
        }

        if let Some(g) = &self.gradients {
            for (index, row) in g.rows().into_iter().enumerate() {
                if let Some(&bad) = row.iter().find(|v| !v.is_finite()) {
                    return Err(CompartmentError::NonFiniteProtocolValue {
                        column: ProtocolColumn::Gradients.name(),
                        index,
                        value: bad.to_f64_lossy(),
                    });
                }
            }
        }

        for (column, values) in scalar_columns {
            let Some(values) = values else { continue };
            if values.len() != len {
                return Err(CompartmentError::ColumnLengthMismatch {
                    column: column.name(),
                    expected: len,
                    actual: values.len(),
                });
            }
            if let Some((index, &bad)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
                return Err(CompartmentError::NonFiniteProtocolValue {
                    column: column.name(),
                    index,
                    value: bad.to_f64_lossy(),
                });
            }
        }

        Ok(Protocol {
            len,
            gradients: self.gradients,
            b: self.b,
            gradient_strength: self.gradient_strength,
            big_delta: self.big_delta,
            small_delta: self.small_delta,
            inversion_time: self.inversion_time,
        })
    }
}

/// Evaluate `model` at every measurement of `protocol`.
///
/// Errors
/// ------
/// - [`CompartmentError::MissingProtocolColumn`] for the first column in
///   [`CompartmentModel::required_columns`] that the protocol lacks.
///
/// Notes
/// -----
/// - Parameters are not range-checked here; call
///   [`CompartmentModel::validate_parameters`] first when the values come
///   from an untrusted source.
pub fn simulate_signal<F, M>(model: &M, protocol: &Protocol<F>) -> CompartmentResult<Array1<F>>
where
    F: ModelFloat,
    M: CompartmentModel<F> + ?Sized,
{
    if let Some(missing) = model.required_columns().iter().find(|c| !protocol.has(**c)) {
        return Err(CompartmentError::MissingProtocolColumn {
            column: missing.name(),
            model: model.name(),
        });
    }
    model.preflight(protocol);

    debug!(model = model.name(), measurements = protocol.len(), "simulating signal");
    Ok(Array1::from_shape_fn(protocol.len(), |index| model.evaluate(protocol, index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compartments::model::ExpT1DecIR;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // A well-formed protocol exposes its columns and length.
    fn build_accepts_consistent_columns() {
        let protocol = ProtocolBuilder::<f64>::new()
            .gradients(array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
            .b_values(array![0.0, 1e9])
            .build()
            .expect("valid protocol");
        assert_eq!(protocol.len(), 2);
        assert!(protocol.has(ProtocolColumn::Gradients));
        assert!(protocol.has(ProtocolColumn::BValue));
        assert!(!protocol.has(ProtocolColumn::InversionTime));
        assert_eq!(protocol.gradient(1), [0.0, 1.0, 0.0]);
        assert_eq!(protocol.value(ProtocolColumn::BValue, 1), 1e9);
        assert!(protocol.value(ProtocolColumn::InversionTime, 0).is_nan());
        assert!(protocol.column(ProtocolColumn::Gradients).is_none());
    }

    #[test]
    // Purpose
    // -------
    // Each validation failure is reported with its payload.
    //
    // Given
    // -----
    // - No columns, a zero-row column, a 2-column gradient matrix, a short
    //   b column, and a NaN inversion time.
    //
    // Expect
    // ------
    // - EmptyProtocol twice, InvalidGradientShape, ColumnLengthMismatch and
    //   NonFiniteProtocolValue carrying the column name and index.
    fn build_rejects_malformed_columns() {
        assert_eq!(ProtocolBuilder::<f64>::new().build(), Err(CompartmentError::EmptyProtocol));
        assert_eq!(
            ProtocolBuilder::<f64>::new().inversion_time(Array1::zeros(0)).build(),
            Err(CompartmentError::EmptyProtocol)
        );
        assert_eq!(
            ProtocolBuilder::<f64>::new().gradients(array![[1.0, 0.0], [0.0, 1.0]]).build(),
            Err(CompartmentError::InvalidGradientShape { columns: 2 })
        );
        assert_eq!(
            ProtocolBuilder::<f64>::new()
                .gradients(array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
                .b_values(array![1e9])
                .build(),
            Err(CompartmentError::ColumnLengthMismatch { column: "b", expected: 2, actual: 1 })
        );
        assert!(matches!(
            ProtocolBuilder::<f64>::new().inversion_time(array![0.1, f64::NAN]).build(),
            Err(CompartmentError::NonFiniteProtocolValue { column: "Ti", index: 1, .. })
        ));
        assert!(matches!(
            ProtocolBuilder::<f64>::new().gradients(array![[1.0, 0.0, f64::INFINITY]]).build(),
            Err(CompartmentError::NonFiniteProtocolValue { column: "g", index: 0, .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Simulation refuses protocols that lack a required column.
    //
    // Given
    // -----
    // - A diffusion-only protocol and an inversion-recovery model.
    //
    // Expect
    // ------
    // - MissingProtocolColumn naming `Ti` and the model.
    fn simulate_reports_missing_column() {
        let protocol = ProtocolBuilder::<f64>::new().b_values(array![0.0, 1e9]).build().expect("protocol");
        let model = ExpT1DecIR::<f64>::new(0.8);
        assert_eq!(
            simulate_signal(&model, &protocol),
            Err(CompartmentError::MissingProtocolColumn { column: "Ti", model: "ExpT1DecIR" })
        );
    }

    #[test]
    // Purpose
    // -------
    // Batch evaluation matches the scalar kernel.
    fn simulate_matches_scalar_kernel() {
        let ti = array![0.0, 0.2, 0.8, 3.0];
        let protocol = ProtocolBuilder::<f64>::new().inversion_time(ti.clone()).build().expect("protocol");
        let signal = simulate_signal(&ExpT1DecIR::<f64>::new(0.8), &protocol).expect("signal");
        for (s, &t) in signal.iter().zip(ti.iter()) {
            assert_eq!(*s, crate::compartments::t1_ir::exp_t1_dec_ir(t, 0.8));
        }
    }
}
