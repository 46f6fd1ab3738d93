//! compartments::model — parameterized compartments evaluated over a protocol.
//!
//! Purpose
//! -------
//! Bind a kernel to a fixed set of tissue parameters so that batch
//! evaluation ([`simulate_signal`](crate::compartments::simulate_signal))
//! and any future fitting front-end can treat compartments uniformly.
//!
//! Key behaviors
//! -------------
//! - [`CompartmentModel`] reports the model name, its free parameters, and
//!   the protocol columns it reads, and evaluates one measurement.
//! - [`ExpT1DecIR`] wraps [`exp_t1_dec_ir`].
//! - [`NoddiIC`] wraps [`noddi_ic`] in stick or cylinder mode; its preflight
//!   hook checks the cylinder series truncation once per protocol.

use crate::{
    compartments::{
        errors::CompartmentResult,
        noddi_ic::noddi_ic,
        params::{D_BOUNDS, KAPPA_BOUNDS, PHI_BOUNDS, R_BOUNDS, T1_BOUNDS, THETA_BOUNDS},
        protocol::{Protocol, ProtocolColumn},
        roots::BesselRoots,
        t1_ir::exp_t1_dec_ir,
    },
    float::ModelFloat,
};

/// A compartment with fixed parameters.
pub trait CompartmentModel<F: ModelFloat> {
    fn name(&self) -> &'static str;

    /// Names of the free parameters, in the order fitting code uses them.
    fn parameter_names(&self) -> &'static [&'static str];

    /// Protocol columns read by [`CompartmentModel::evaluate`].
    fn required_columns(&self) -> &'static [ProtocolColumn];

    /// Signal at measurement `index`.
    ///
    /// Assumes every column in [`CompartmentModel::required_columns`] is
    /// present; absent columns read as NaN.
    fn evaluate(&self, protocol: &Protocol<F>, index: usize) -> F;

    /// Check every parameter against its finite bounds.
    fn validate_parameters(&self) -> CompartmentResult<()> {
        Ok(())
    }

    /// Hook run once before a batch evaluation. Used for diagnostics only.
    fn preflight(&self, _protocol: &Protocol<F>) {}
}

/// T1 inversion-recovery compartment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpT1DecIR<F> {
    /// Longitudinal relaxation time (s).
    pub t1: F,
}

impl<F: ModelFloat> ExpT1DecIR<F> {
    pub fn new(t1: F) -> Self {
        ExpT1DecIR { t1 }
    }
}

impl<F: ModelFloat> CompartmentModel<F> for ExpT1DecIR<F> {
    fn name(&self) -> &'static str {
        "ExpT1DecIR"
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["T1"]
    }

    fn required_columns(&self) -> &'static [ProtocolColumn] {
        &[ProtocolColumn::InversionTime]
    }

    #[inline]
    fn evaluate(&self, protocol: &Protocol<F>, index: usize) -> F {
        exp_t1_dec_ir(protocol.value(ProtocolColumn::InversionTime, index), self.t1)
    }

    fn validate_parameters(&self) -> CompartmentResult<()> {
        T1_BOUNDS.validate("T1", self.t1.to_f64_lossy())
    }
}

const STICK_PARAMETERS: &[&str] = &["d", "theta", "phi", "kappa"];
const CYLINDER_PARAMETERS: &[&str] = &["d", "theta", "phi", "kappa", "R"];

const STICK_COLUMNS: &[ProtocolColumn] = &[ProtocolColumn::Gradients, ProtocolColumn::BValue];

const CYLINDER_COLUMNS: &[ProtocolColumn] = &[
    ProtocolColumn::Gradients,
    ProtocolColumn::BValue,
    ProtocolColumn::GradientStrength,
    ProtocolColumn::BigDelta,
    ProtocolColumn::SmallDelta,
];

/// NODDI intra-cellular compartment: Watson-dispersed sticks or cylinders.
///
/// `radius == 0` selects sticks, in which case only `g` and `b` are read
/// from the protocol and `roots` is ignored.
#[derive(Debug, Clone, Copy)]
pub struct NoddiIC<'a, F> {
    pub d: F,
    pub theta: F,
    pub phi: F,
    pub kappa: F,
    pub radius: F,
    pub roots: BesselRoots<'a, F>,
}

impl<F: ModelFloat> NoddiIC<'static, F> {
    /// Dispersed sticks.
    pub fn stick(d: F, theta: F, phi: F, kappa: F) -> Self {
        NoddiIC { d, theta, phi, kappa, radius: F::zero(), roots: BesselRoots::empty() }
    }
}

impl<'a, F: ModelFloat> NoddiIC<'a, F> {
    /// Dispersed cylinders of radius `radius`, with the perpendicular
    /// series truncated at the length of `roots`.
    pub fn cylinder(d: F, theta: F, phi: F, kappa: F, radius: F, roots: BesselRoots<'a, F>) -> Self {
        NoddiIC { d, theta, phi, kappa, radius, roots }
    }

    fn is_stick(&self) -> bool {
        self.radius == F::zero()
    }
}

impl<F: ModelFloat> CompartmentModel<F> for NoddiIC<'_, F> {
    fn name(&self) -> &'static str {
        "NoddiIC"
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        if self.is_stick() { STICK_PARAMETERS } else { CYLINDER_PARAMETERS }
    }

    fn required_columns(&self) -> &'static [ProtocolColumn] {
        if self.is_stick() { STICK_COLUMNS } else { CYLINDER_COLUMNS }
    }

    #[inline]
    fn evaluate(&self, protocol: &Protocol<F>, index: usize) -> F {
        noddi_ic(
            protocol.gradient(index),
            protocol.value(ProtocolColumn::BValue, index),
            protocol.value(ProtocolColumn::GradientStrength, index),
            protocol.value(ProtocolColumn::BigDelta, index),
            protocol.value(ProtocolColumn::SmallDelta, index),
            self.d,
            self.theta,
            self.phi,
            self.kappa,
            self.radius,
            self.roots,
        )
    }

    fn validate_parameters(&self) -> CompartmentResult<()> {
        D_BOUNDS.validate("d", self.d.to_f64_lossy())?;
        THETA_BOUNDS.validate("theta", self.theta.to_f64_lossy())?;
        PHI_BOUNDS.validate("phi", self.phi.to_f64_lossy())?;
        KAPPA_BOUNDS.validate("kappa", self.kappa.to_f64_lossy())?;
        if !self.is_stick() {
            R_BOUNDS.validate("R", self.radius.to_f64_lossy())?;
        }
        Ok(())
    }

    /// Warn once if any measurement's timing leaves the cylinder series
    /// under-resolved.
    fn preflight(&self, protocol: &Protocol<F>) {
        if self.is_stick() {
            return;
        }
        for index in 0..protocol.len() {
            let big_delta = protocol.value(ProtocolColumn::BigDelta, index);
            let small_delta = protocol.value(ProtocolColumn::SmallDelta, index);
            if !self.roots.check_truncation(self.d, self.radius, big_delta, small_delta) {
                break;
            }
        }
    }
}
