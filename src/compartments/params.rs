//! compartments::params — admissible ranges of the free model parameters.
//!
//! Purpose
//! -------
//! Record the starting value and box constraints of every free parameter
//! that enters the two kernels, so that fitting front-ends (out of scope
//! here) and simulation code share a single definition. Units are SI:
//! seconds, m²/s, metres, radians.
//!
//! Key behaviors
//! -------------
//! - [`ParameterBounds::contains`] / [`ParameterBounds::clamp`] for cheap
//!   checks and projections.
//! - [`ParameterBounds::validate`] for user-facing checks that report a
//!   [`CompartmentError`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `lower ≤ init ≤ upper` for every constant below.
//! - Bounds are inclusive.

use crate::compartments::errors::{CompartmentError, CompartmentResult};
use std::f64::consts::{FRAC_PI_2, PI};

/// Starting value and inclusive box constraints of one free parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterBounds {
    pub init: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Longitudinal relaxation time `T1` (s).
pub const T1_BOUNDS: ParameterBounds = ParameterBounds { init: 0.02, lower: 1e-5, upper: 4.0 };

/// Intrinsic diffusivity `d` (m²/s).
pub const D_BOUNDS: ParameterBounds = ParameterBounds { init: 1.7e-9, lower: 1e-11, upper: 1.0e-8 };

/// Cylinder radius `R` (m).
pub const R_BOUNDS: ParameterBounds = ParameterBounds { init: 1.0e-6, lower: 1e-7, upper: 20e-6 };

/// Watson concentration `kappa`.
pub const KAPPA_BOUNDS: ParameterBounds = ParameterBounds { init: 1.0, lower: 1e-5, upper: 2.0 * PI };

/// Polar angle `theta` (rad).
pub const THETA_BOUNDS: ParameterBounds = ParameterBounds { init: FRAC_PI_2, lower: 0.0, upper: PI };

/// Azimuth `phi` (rad). Restricted to one hemisphere; diffusion is
/// antipodally symmetric.
pub const PHI_BOUNDS: ParameterBounds = ParameterBounds { init: FRAC_PI_2, lower: 0.0, upper: PI };

impl ParameterBounds {
    /// `true` when `value` lies in `[lower, upper]`. NaN is never contained.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Project `value` onto `[lower, upper]`. NaN passes through.
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }

    /// Check `value` for finiteness and membership.
    ///
    /// Errors
    /// ------
    /// - [`CompartmentError::NonFiniteParameter`] for NaN or ±inf.
    /// - [`CompartmentError::ParameterOutOfBounds`] outside `[lower, upper]`.
    pub fn validate(&self, name: &'static str, value: f64) -> CompartmentResult<()> {
        if !value.is_finite() {
            return Err(CompartmentError::NonFiniteParameter { name, value });
        }
        if !self.contains(value) {
            return Err(CompartmentError::ParameterOutOfBounds {
                name,
                value,
                lower: self.lower,
                upper: self.upper,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Every default starting value must be admissible.
    fn init_values_lie_within_bounds() {
        for bounds in [T1_BOUNDS, D_BOUNDS, R_BOUNDS, KAPPA_BOUNDS, THETA_BOUNDS, PHI_BOUNDS] {
            assert!(bounds.lower <= bounds.upper);
            assert!(bounds.contains(bounds.init), "{bounds:?}");
        }
    }

    #[test]
    // Purpose
    // -------
    // Exercise all branches of `validate` and `clamp`.
    //
    // Given
    // -----
    // - kappa values inside, above, and NaN.
    //
    // Expect
    // ------
    // - Ok, ParameterOutOfBounds carrying the bounds, NonFiniteParameter;
    //   clamp maps 10 to 2π and leaves 3 alone.
    fn validate_and_clamp_cover_all_branches() {
        assert!(KAPPA_BOUNDS.validate("kappa", 3.0).is_ok());
        assert_eq!(
            KAPPA_BOUNDS.validate("kappa", 10.0),
            Err(CompartmentError::ParameterOutOfBounds {
                name: "kappa",
                value: 10.0,
                lower: 1e-5,
                upper: 2.0 * PI,
            })
        );
        assert!(matches!(
            KAPPA_BOUNDS.validate("kappa", f64::NAN),
            Err(CompartmentError::NonFiniteParameter { name: "kappa", .. })
        ));
        assert_eq!(KAPPA_BOUNDS.clamp(10.0), 2.0 * PI);
        assert_eq!(KAPPA_BOUNDS.clamp(3.0), 3.0);
    }
}
