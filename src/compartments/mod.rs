//! compartments — signal kernels of individual tissue compartments.
//!
//! Purpose
//! -------
//! Provide the per-measurement signal functions of two microstructure
//! compartments, the pieces they are built from, and a thin layer that
//! evaluates them over a whole acquisition protocol.
//!
//! Key behaviors
//! -------------
//! - [`exp_t1_dec_ir`]: magnitude inversion-recovery signal.
//! - [`noddi_ic`]: Watson-dispersed stick or cylinder signal of the NODDI
//!   intra-cellular compartment, with the cylinder's perpendicular
//!   attenuation from [`cylinder_perpendicular_log_attenuation`].
//! - [`BesselRootTable`] / [`BesselRoots`]: owned and borrowed tables of
//!   `J1'` zeros passed to the cylinder kernel.
//! - [`ParameterBounds`] and the `*_BOUNDS` constants: admissible parameter
//!   ranges.
//! - [`CompartmentModel`], [`Protocol`], and [`simulate_signal`]: batch
//!   evaluation over measurements.
//!
//! Invariants & assumptions
//! ------------------------
//! - Kernels are pure and total. They never allocate, log, or return
//!   errors; invalid physics in gives IEEE-754 results out.
//! - Only construction and validation surfaces return
//!   [`CompartmentResult`].
//!
//! Conventions
//! -----------
//! - SI units throughout (s, m, m²/s, s/m², T/m).
//! - Kernels are generic over [`ModelFloat`](crate::float::ModelFloat).

pub mod cylinder;
pub mod errors;
pub mod geometry;
pub mod model;
pub mod noddi_ic;
pub mod params;
pub mod protocol;
pub mod roots;
pub mod t1_ir;

pub use cylinder::{GYROMAGNETIC_RATIO, cylinder_perpendicular_log_attenuation};
pub use errors::{CompartmentError, CompartmentResult};
pub use geometry::{direction_from_homogeneous, spherical_to_cartesian};
pub use model::{CompartmentModel, ExpT1DecIR, NoddiIC};
pub use noddi_ic::noddi_ic;
pub use params::{
    D_BOUNDS, KAPPA_BOUNDS, PHI_BOUNDS, ParameterBounds, R_BOUNDS, T1_BOUNDS, THETA_BOUNDS,
};
pub use protocol::{Protocol, ProtocolBuilder, ProtocolColumn, simulate_signal};
pub use roots::{BesselRootTable, BesselRoots, DEFAULT_BESSEL_ROOT_COUNT};
pub use t1_ir::exp_t1_dec_ir;
