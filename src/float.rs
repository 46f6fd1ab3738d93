//! float — numeric precision used by every compartment kernel.
//!
//! Purpose
//! -------
//! Fix the floating-point type of the kernel library once, at build
//! configuration time, instead of per function. Kernels are generic over
//! [`ModelFloat`]; the crate-wide default is exposed as [`DefaultFloat`].
//!
//! Key behaviors
//! -------------
//! - [`ModelFloat`] bundles the `num-traits` bounds the kernels rely on
//!   (`Float`, `FloatConst`) plus thread-safety markers, and adds two lossy
//!   conversions to and from `f64` used for literals and for the `statrs`
//!   special functions (which are `f64`-only).
//! - [`DefaultFloat`] is `f64`, or `f32` when the `single-precision` cargo
//!   feature is enabled.
//!
//! Conventions
//! -----------
//! - Literals inside kernels are written as `F::lit(0.5)` rather than
//!   `F::from(0.5).unwrap()`; the conversion is infallible for both `f32`
//!   and `f64`.

use num_traits::{Float, FloatConst};
use std::fmt::{Debug, Display};

/// Floating-point scalar accepted by the compartment kernels.
///
/// Implemented for `f32` and `f64`. The trait is sealed in practice by its
/// two lossy conversions, which only make sense for IEEE binary floats.
pub trait ModelFloat: Float + FloatConst + Debug + Display + Send + Sync + 'static {
    /// Convert an `f64` literal or intermediate into `Self`, rounding if needed.
    fn lit(value: f64) -> Self;

    /// Widen (or pass through) `self` to `f64`.
    fn to_f64_lossy(self) -> f64;
}

impl ModelFloat for f64 {
    #[inline(always)]
    fn lit(value: f64) -> Self {
        value
    }

    #[inline(always)]
    fn to_f64_lossy(self) -> f64 {
        self
    }
}

impl ModelFloat for f32 {
    #[inline(always)]
    fn lit(value: f64) -> Self {
        value as f32
    }

    #[inline(always)]
    fn to_f64_lossy(self) -> f64 {
        self as f64
    }
}

/// Precision selected for the whole library at build time.
#[cfg(not(feature = "single-precision"))]
pub type DefaultFloat = f64;

/// Precision selected for the whole library at build time.
#[cfg(feature = "single-precision")]
pub type DefaultFloat = f32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Check that the literal conversion is exact for f64 and rounds for f32.
    //
    // Given
    // -----
    // - The value 0.1, which is not representable exactly in binary.
    //
    // Expect
    // ------
    // - f64 returns the same bits; f32 returns the nearest f32.
    fn lit_round_trips_through_each_precision() {
        assert_eq!(<f64 as ModelFloat>::lit(0.1), 0.1_f64);
        assert_eq!(<f32 as ModelFloat>::lit(0.1), 0.1_f32);
        assert_eq!(0.25_f32.to_f64_lossy(), 0.25_f64);
    }
}
