//! special — special functions behind the NODDI intra-cellular kernel.
//!
//! Purpose
//! -------
//! Collect the numerical building blocks of the dispersed stick/cylinder
//! signal: even-order Legendre polynomials, Legendre–Gaussian integrals,
//! the spherical-harmonic expansion of the Watson distribution, and the
//! Bessel-function roots that parameterize the restricted-cylinder series.
//!
//! Key behaviors
//! -------------
//! - [`even_legendre_terms`] evaluates `P_0, P_2, …, P_12` at a point.
//! - [`legendre_gaussian_integrals`] evaluates
//!   `L_n(x) = ∫_{-1}^{1} exp(-x t²) P_n(t) dt` for the same orders.
//! - [`watson_sh_coefficients`] returns the zonal spherical-harmonic
//!   coefficients of a Watson distribution with concentration `κ`.
//! - [`bessel_j0_j1`] and [`bessel_j1_derivative_roots`] produce the root
//!   table consumed by the cylinder kernel.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every function is total: non-finite arguments yield NaN results and
//!   iteration counts are bounded, so nothing panics or spins.
//! - Only even orders up to [`MAX_EVEN_ORDER`] are represented; the Watson
//!   distribution is antipodally symmetric and odd orders vanish.
//!
//! Conventions
//! -----------
//! - Arrays of length [`EVEN_TERMS`] are indexed by `n / 2`.
//! - The Legendre/Watson routines are generic over
//!   [`ModelFloat`](crate::float::ModelFloat); the Bessel routines work in
//!   `f64` because they only build tables ahead of a fitting run.

pub mod bessel;
pub mod legendre;
pub mod watson;

pub use bessel::{bessel_j0_j1, bessel_j1_derivative, bessel_j1_derivative_roots};
pub use legendre::{even_legendre_terms, legendre_gaussian_integrals};
pub use watson::watson_sh_coefficients;

/// Highest Legendre order kept in the dispersion expansion.
pub const MAX_EVEN_ORDER: usize = 12;

/// Number of even orders `0, 2, …, MAX_EVEN_ORDER`.
pub const EVEN_TERMS: usize = MAX_EVEN_ORDER / 2 + 1;
