//! special::watson — spherical-harmonic coefficients of the Watson distribution.
//!
//! The Watson density on the unit sphere is
//! `f(n) ∝ exp(κ (μ·n)²)`. Because it is axially symmetric about `μ`, only
//! zonal (`m = 0`) harmonics of even order survive. With the normalization
//! used by the NODDI family (`C_0 = 2√π`, i.e. the density scaled to
//! integrate to `4π`) the coefficients are
//!
//! `C_n(κ) = √(4π (2n+1)) · J_n(κ) / J_0(κ)`,
//! `J_n(κ) = ∫_{-1}^{1} exp(κ t²) P_n(t) dt`.
//!
//! Only the ratio is needed, so each regime evaluates `J_n` up to a common
//! factor:
//! - `κ < 0` (girdle): `J_n(κ) = L_n(-κ)`, the Legendre–Gaussian integral,
//!   which has an accurate branch for every argument.
//! - `0 ≤ κ ≤` [`ASYMPTOTIC_KAPPA`]: the positive-term series from
//!   [`gaussian_legendre_moments`], rescaled so it never overflows.
//! - `κ >` [`ASYMPTOTIC_KAPPA`]: Watson's lemma in `v = 1 - t²`. The
//!   mass sits near `t = ±1`, and a bounded number of terms in `1/κ`
//!   reaches full precision, so the cost does not grow with `κ`.

use crate::{
    float::ModelFloat,
    special::{
        EVEN_TERMS,
        legendre::{gaussian_legendre_moments, legendre_gaussian_integrals},
    },
};

/// Concentrations above this use the large-`κ` expansion.
pub const ASYMPTOTIC_KAPPA: f64 = 64.0;

/// Term cap of the large-`κ` expansion. At `κ = 64` the terms fall below
/// `1e-25` well before this.
const ASYMPTOTIC_TERMS: usize = 64;

/// Zonal spherical-harmonic coefficients `C_0, C_2, …, C_12` of a Watson
/// distribution with concentration `kappa`.
///
/// - `kappa = 0` (isotropic) gives `[2√π, 0, …, 0]`.
/// - As `kappa → ∞` the coefficients approach `√(4π(2n+1))`, the expansion
///   of a pair of antipodal delta functions.
/// - Negative `kappa` describes a girdle around the plane normal to `μ`; as
///   `kappa → -∞` the coefficients approach `√(4π(2n+1)) P_n(0)`.
/// - Non-finite `kappa` yields NaN entries.
pub fn watson_sh_coefficients<F: ModelFloat>(kappa: F) -> [F; EVEN_TERMS] {
    if !kappa.is_finite() {
        return [F::nan(); EVEN_TERMS];
    }

    let integrals = if kappa < F::zero() {
        legendre_gaussian_integrals(-kappa)
    } else if kappa > F::lit(ASYMPTOTIC_KAPPA) {
        concentrated_integrals(kappa)
    } else {
        gaussian_legendre_moments(kappa).moments
    };

    let four_pi = F::lit(4.0) * F::PI();
    let j0 = integrals[0];
    let mut out = [F::zero(); EVEN_TERMS];
    for (n, coefficient) in out.iter_mut().enumerate() {
        let order = F::lit((4 * n + 1) as f64);
        *coefficient = (four_pi * order).sqrt() * integrals[n] / j0;
    }
    out
}

/// `J_{2m}(κ)` up to the common factor `e^κ / κ`, for large `κ`.
///
/// With `v = 1 - t²`,
/// `J_{2m} = e^κ ∫_0^1 e^{-κv} P_{2m}(√(1-v)) (1-v)^{-1/2} dv`, where
/// `P_{2m}(√(1-v)) = Σ_i p_{m,i} v^i` with
/// `p_{m,i} = p_{m,i-1} (i-1-m)(m+i-½) / i²`, and
/// `(1-v)^{-1/2} = Σ_l q_l v^l` with `q_l = q_{l-1} (l-½) / l`.
/// Integrating term by term gives `J_{2m} ∝ Σ_i p_{m,i} T_i`, where
/// `T_i = Σ_l (i+l)! q_l / κ^{i+l}` is shared by every order.
fn concentrated_integrals<F: ModelFloat>(kappa: F) -> [F; EVEN_TERMS] {
    let mut tails = [F::zero(); EVEN_TERMS];
    let mut lead = F::one();
    for (i, tail) in tails.iter_mut().enumerate() {
        if i > 0 {
            lead = lead * F::lit(i as f64) / kappa;
        }
        let mut factorial_ratio = lead;
        let mut q = F::one();
        let mut sum = F::zero();
        for l in 0..ASYMPTOTIC_TERMS {
            if l > 0 {
                q = q * F::lit((l as f64 - 0.5) / l as f64);
                factorial_ratio = factorial_ratio * F::lit((i + l) as f64) / kappa;
            }
            let term = factorial_ratio * q;
            sum = sum + term;
            if term <= F::epsilon() * sum {
                break;
            }
        }
        *tail = sum;
    }

    let mut out = [F::zero(); EVEN_TERMS];
    for (m, value) in out.iter_mut().enumerate() {
        let mut p = F::one();
        let mut acc = tails[0];
        for (i, &tail) in tails.iter().enumerate().take(m + 1).skip(1) {
            let (mf, f) = (m as f64, i as f64);
            p = p * F::lit((f - 1.0 - mf) * (mf + f - 0.5) / (f * f));
            acc = acc + p * tail;
        }
        *value = acc;
    }
    out
}
