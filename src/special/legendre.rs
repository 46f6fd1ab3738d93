//! special::legendre — even Legendre polynomials and Legendre–Gaussian integrals.
//!
//! Purpose
//! -------
//! Provide the two Legendre-based ingredients of the dispersed compartment
//! signal:
//! - `P_n(x)` for even `n ≤ 12`, evaluated at the cosine between the
//!   gradient direction and the Watson mean axis;
//! - `L_n(x) = ∫_{-1}^{1} exp(-x t²) P_n(t) dt`, the projection of a
//!   single-fibre Gaussian attenuation onto the Legendre basis.
//!
//! Key behaviors
//! -------------
//! - For `x ≥ 5` the integrals are built from the closed form
//!   `I_0 = √π erf(√x) / √x` of `I_j = ∫ t^{2j} exp(-x t²) dt` and the
//!   upward recurrence `I_j = ((j - ½) I_{j-1} - e^{-x}) / x`, then mapped
//!   onto Legendre orders with the monomial coefficients of `P_n`.
//! - Below that cut-off the upward recurrence amplifies rounding (and any
//!   error in `erf`) by up to five orders of magnitude at `x = 1`, so the
//!   moments are summed from the power series of `exp(-x t²)` instead
//!   (see [`gaussian_legendre_moments`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - `L_0(0) = 2` and `L_n(0) = 0` for `n > 0`.
//! - The power series is also used with a positive exponent by the Watson
//!   routines; its partial sums are rescaled whenever the running weight
//!   exceeds [`RESCALE_THRESHOLD`], and the number of rescales is reported
//!   alongside the sums.

use crate::{
    float::ModelFloat,
    special::{EVEN_TERMS, MAX_EVEN_ORDER},
};

/// Cut-off between the power-series and closed-form branches of
/// [`legendre_gaussian_integrals`]. Both branches are accurate to a few
/// ulps of `L_0` here; the series degrades above it, the closed form below.
pub const CLOSED_FORM_CUTOFF: f64 = 5.0;

/// Running weights above this magnitude are divided by it.
pub const RESCALE_THRESHOLD: f64 = 1e20;

/// Hard cap on power-series terms.
pub const MAX_SERIES_TERMS: usize = 4096;

/// Coefficient of `t^{2j}` in `P_{2m}(t)`, row `m`, column `j`.
const LEGENDRE_MONOMIALS: [[f64; EVEN_TERMS]; EVEN_TERMS] = [
    [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [-0.5, 1.5, 0.0, 0.0, 0.0, 0.0, 0.0],
    [0.375, -3.75, 4.375, 0.0, 0.0, 0.0, 0.0],
    [-0.3125, 6.5625, -19.6875, 14.4375, 0.0, 0.0, 0.0],
    [0.2734375, -9.84375, 54.140625, -93.84375, 50.2734375, 0.0, 0.0],
    [-0.24609375, 13.53515625, -117.3046875, 351.9140625, -427.32421875, 180.42578125, 0.0],
    [
        0.2255859375,
        -17.595703125,
        219.9462890625,
        -997.08984375,
        2029.7900390625,
        -1894.470703125,
        660.1943359375,
    ],
];

/// Evaluate the even Legendre polynomials `P_0, P_2, …, P_12` at `x`.
///
/// Uses Bonnet's recurrence `(n+1) P_{n+1} = (2n+1) x P_n - n P_{n-1}` and
/// keeps the even orders. `x` is expected in `[-1, 1]` but any value is
/// accepted.
#[inline]
pub fn even_legendre_terms<F: ModelFloat>(x: F) -> [F; EVEN_TERMS] {
    let mut out = [F::zero(); EVEN_TERMS];
    out[0] = F::one();

    let mut p_prev = F::one();
    let mut p_curr = x;
    for n in 1..MAX_EVEN_ORDER {
        let p_next = (F::lit((2 * n + 1) as f64) * x * p_curr - F::lit(n as f64) * p_prev)
            / F::lit((n + 1) as f64);
        p_prev = p_curr;
        p_curr = p_next;
        if (n + 1) % 2 == 0 {
            out[(n + 1) / 2] = p_next;
        }
    }
    out
}

/// Evaluate `L_n(x) = ∫_{-1}^{1} exp(-x t²) P_n(t) dt` for `n = 0, 2, …, 12`.
///
/// Parameters
/// ----------
/// - `x`: `F`
///   Exponent scale. In the NODDI kernel this is the difference between the
///   perpendicular and parallel log-attenuations and is non-negative for
///   physical inputs; negative values are accepted and evaluated with the
///   power series.
///
/// Returns
/// -------
/// `[F; 7]`
///   Integrals indexed by `n / 2`. NaN input yields NaN entries and
///   `x = +∞` yields zeros.
pub fn legendre_gaussian_integrals<F: ModelFloat>(x: F) -> [F; EVEN_TERMS] {
    if x.is_nan() {
        return [F::nan(); EVEN_TERMS];
    }
    if x >= F::lit(CLOSED_FORM_CUTOFF) {
        closed_form_integrals(x)
    } else {
        gaussian_legendre_moments(-x).unscaled()
    }
}

fn closed_form_integrals<F: ModelFloat>(x: F) -> [F; EVEN_TERMS] {
    let sqrt_x = x.sqrt();
    let erf = F::lit(statrs::function::erf::erf(sqrt_x.to_f64_lossy()));
    let emx = (-x).exp();

    let mut moments = [F::zero(); EVEN_TERMS];
    moments[0] = F::PI().sqrt() * erf / sqrt_x;
    for j in 1..EVEN_TERMS {
        moments[j] = (F::lit(j as f64 - 0.5) * moments[j - 1] - emx) / x;
    }

    let mut out = [F::zero(); EVEN_TERMS];
    for (m, row) in LEGENDRE_MONOMIALS.iter().enumerate() {
        out[m] = row[..=m]
            .iter()
            .zip(moments.iter())
            .fold(F::zero(), |acc, (&c, &i)| acc + F::lit(c) * i);
    }
    out
}

/// Partial sums of a Legendre moment series, possibly rescaled.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScaledMoments<F> {
    /// Sums divided by `RESCALE_THRESHOLD^rescales`.
    pub moments: [F; EVEN_TERMS],
    /// Number of times the running weight was rescaled.
    pub rescales: u32,
}

impl<F: ModelFloat> ScaledMoments<F> {
    /// Undo the rescaling. May overflow to infinity for huge exponents.
    pub fn unscaled(self) -> [F; EVEN_TERMS] {
        if self.rescales == 0 {
            return self.moments;
        }
        let factor = F::lit(RESCALE_THRESHOLD).powi(self.rescales as i32);
        self.moments.map(|m| m * factor)
    }
}

/// Sum `Σ_k s^k / k! · ∫_{-1}^{1} t^{2k} P_{2m}(t) dt` for `m = 0..=6`.
///
/// This is `∫_{-1}^{1} exp(s t²) P_{2m}(t) dt`. For `s ≥ 0` every term is
/// non-negative, so the sum is free of cancellation for arbitrarily large
/// `s`; the moments are kept finite by rescaling and the caller either
/// works with ratios or calls [`ScaledMoments::unscaled`].
///
/// The moment `a_{k,m} = ∫ t^{2k} P_{2m}` vanishes for `k < m`, starts at
/// `a_{m,m} = 2^{2m+1} ((2m)!)² / (4m+1)!` and follows
/// `a_{k,m} = a_{k-1,m} (2k-1) k / ((k-m)(2k+2m+1))`.
pub(crate) fn gaussian_legendre_moments<F: ModelFloat>(s: F) -> ScaledMoments<F> {
    if !s.is_finite() {
        return ScaledMoments { moments: [F::nan(); EVEN_TERMS], rescales: 0 };
    }

    let threshold = F::lit(RESCALE_THRESHOLD);
    let abs_s = s.abs();
    let mut moments = [F::zero(); EVEN_TERMS];
    let mut base = [F::zero(); EVEN_TERMS];
    let mut diagonal = 2.0_f64;
    let mut weight = F::one();
    let mut rescales = 0_u32;

    for k in 0..MAX_SERIES_TERMS {
        for m in 0..=k.min(EVEN_TERMS - 1) {
            base[m] = if m == k {
                F::lit(diagonal)
            } else {
                let (kf, mf) = (k as f64, m as f64);
                base[m] * F::lit((2.0 * kf - 1.0) * kf / ((kf - mf) * (2.0 * kf + 2.0 * mf + 1.0)))
            };
            moments[m] = moments[m] + weight * base[m];
        }
        if k < EVEN_TERMS - 1 {
            let m = k as f64;
            diagonal *= 4.0 * (2.0 * m + 2.0).powi(2) * (2.0 * m + 1.0).powi(2)
                / ((4.0 * m + 5.0) * (4.0 * m + 4.0) * (4.0 * m + 3.0) * (4.0 * m + 2.0));
        }

        let last = (weight * base[0]).abs();
        if k >= EVEN_TERMS - 1 && F::lit(k as f64) > abs_s && last <= F::epsilon() * moments[0].abs()
        {
            break;
        }

        weight = weight * s / F::lit((k + 1) as f64);
        if weight.abs() > threshold {
            weight = weight / threshold;
            for m in moments.iter_mut() {
                *m = *m / threshold;
            }
            rescales += 1;
        }
    }

    ScaledMoments { moments, rescales }
}
