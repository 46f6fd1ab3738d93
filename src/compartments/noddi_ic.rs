//! compartments::noddi_ic — intra-cellular signal of the NODDI family.
//!
//! Purpose
//! -------
//! Evaluate the normalized signal of an intra-axonal compartment whose
//! fibre orientations follow a Watson distribution about a mean axis `μ`.
//! Each fibre is either a stick (`R = 0`) or an impermeable cylinder of
//! radius `R` (Neuman's Gaussian phase approximation).
//!
//! Key behaviors
//! -------------
//! - Parallel log-attenuation `LePar = -b d`.
//! - Perpendicular log-attenuation `LePerp` from
//!   [`cylinder_perpendicular_log_attenuation`], zero for a stick.
//! - The orientation average over the Watson distribution is expanded in
//!   even Legendre polynomials up to order 12:
//!
//!   ```text
//!   S = ½ e^{LePerp} Σ_n L_n(LePerp - LePar) C_n(κ) √((2n+1)/4π) P_n(g·μ)
//!   ```
//!
//! Invariants & assumptions
//! ------------------------
//! - `g` is a unit vector. `|g·μ| > 1` from rounding is snapped to `±1`.
//! - The truncated expansion can ripple slightly below zero for very
//!   concentrated distributions at high b; such sums are clamped to `0`.
//!   NaN inputs still propagate as NaN.
//! - The kernel never allocates, logs, or fails.

use crate::{
    compartments::{
        cylinder::cylinder_perpendicular_log_attenuation,
        geometry::{dot, spherical_to_cartesian},
        roots::BesselRoots,
    },
    float::ModelFloat,
    special::{even_legendre_terms, legendre_gaussian_integrals, watson_sh_coefficients},
};

/// NODDI intra-cellular signal for one measurement.
///
/// Parameters
/// ----------
/// - `g`: unit gradient direction.
/// - `b`: b-value (s/m²).
/// - `gradient`, `big_delta`, `small_delta`: gradient amplitude `G` (T/m),
///   pulse separation `Δ` and duration `δ` (s). Read only when
///   `radius != 0`.
/// - `d`: intrinsic diffusivity (m²/s).
/// - `theta`, `phi`: polar angle and azimuth of the mean fibre axis (rad).
/// - `kappa`: Watson concentration. `0` is isotropic; negative values
///   spread the fibres in a girdle around the plane normal to the axis.
/// - `radius`: cylinder radius (m). `0` selects the stick model and the
///   root table is never read.
/// - `roots`: zeros of `J1'` that truncate the cylinder series.
///
/// Returns
/// -------
/// `F`
///   Signal in `[0, 1]` for non-negative `b` and `d`.
#[allow(clippy::too_many_arguments)]
pub fn noddi_ic<F: ModelFloat>(
    g: [F; 3], b: F, gradient: F, big_delta: F, small_delta: F, d: F, theta: F, phi: F,
    kappa: F, radius: F, roots: BesselRoots<'_, F>,
) -> F {
    let le_par = -b * d;
    let le_perp = cylinder_perpendicular_log_attenuation(d, radius, gradient, big_delta, small_delta, roots);
    let lpmp = le_perp - le_par;

    let integrals = legendre_gaussian_integrals(lpmp);
    let coefficients = watson_sh_coefficients(kappa);

    let mut cos_psi = dot(g, spherical_to_cartesian(theta, phi));
    if cos_psi > F::one() {
        cos_psi = F::one();
    } else if cos_psi < -F::one() {
        cos_psi = -F::one();
    }
    let legendre = even_legendre_terms(cos_psi);

    let four_pi = F::lit(4.0) * F::PI();
    let mut sum = F::zero();
    for (n, &integral) in integrals.iter().enumerate() {
        let order = F::lit((4 * n + 1) as f64);
        sum = sum + integral * coefficients[n] * (order / four_pi).sqrt() * legendre[n];
    }

    let signal = F::lit(0.5) * le_perp.exp() * sum;
    if signal < F::zero() { F::zero() } else { signal }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::special::bessel_j1_derivative_roots;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Stick mode ignoring the root table.
    // - The isotropic and highly concentrated limits.
    // - Range, determinism, and agreement with direct sphere quadrature for
    //   concentrated and girdle distributions.
    // - Cylinder mode attenuating less than stick mode, and f32 vs f64.
    //
    // They intentionally DO NOT cover:
    // - The special functions themselves (see `special`).
    // -------------------------------------------------------------------------

    const D: f64 = 1.7e-9;
    const GAMMA: f64 = 2.675987e8;

    fn stick(g: [f64; 3], b: f64, d: f64, theta: f64, phi: f64, kappa: f64) -> f64 {
        noddi_ic(g, b, 0.0, 0.0, 0.0, d, theta, phi, kappa, 0.0, BesselRoots::empty())
    }

    /// Midpoint quadrature of `∫ W(n) exp(-b d (g·n)²) dn / ∫ W(n) dn` on
    /// the sphere, with `dn = dt dβ` for `t = cos α`.
    fn sphere_average(g: [f64; 3], b: f64, d: f64, theta: f64, phi: f64, kappa: f64) -> f64 {
        let mu = spherical_to_cartesian(theta, phi);
        let (nt, nb) = (400, 400);
        let (mut num, mut den) = (0.0, 0.0);
        for i in 0..nt {
            let t = -1.0 + (i as f64 + 0.5) * 2.0 / nt as f64;
            let s = (1.0 - t * t).sqrt();
            for j in 0..nb {
                let beta = (j as f64 + 0.5) * 2.0 * std::f64::consts::PI / nb as f64;
                let n = [s * beta.cos(), s * beta.sin(), t];
                let w = (kappa * dot(mu, n).powi(2)).exp();
                num += w * (-b * d * dot(g, n).powi(2)).exp();
                den += w;
            }
        }
        num / den
    }

    #[test]
    // Purpose
    // -------
    // With R = 0 the root table has no influence.
    //
    // Given
    // -----
    // - The same stick inputs with an empty table, 5 roots, and 30 roots,
    //   plus garbage G, Δ and δ.
    //
    // Expect
    // ------
    // - Bit-identical results.
    fn stick_mode_ignores_root_table() {
        let short = bessel_j1_derivative_roots(5);
        let long = bessel_j1_derivative_roots(30);
        let g = [0.6, 0.0, 0.8];
        let reference = stick(g, 1e9, D, 0.5, 0.3, 4.0);
        for roots in [BesselRoots::new(&short), BesselRoots::new(&long)] {
            let value = noddi_ic(g, 1e9, 123.0, -1.0, 7.0, D, 0.5, 0.3, 4.0, 0.0, roots);
            assert_eq!(value.to_bits(), reference.to_bits());
        }
    }

    #[test]
    // Purpose
    // -------
    // An isotropic distribution gives the powder-averaged stick signal.
    //
    // Given
    // -----
    // - kappa = 0, b d = 1.7, several gradient and axis orientations.
    //
    // Expect
    // ------
    // - ½ √π erf(√(bd)) / √(bd) regardless of orientation.
    fn isotropic_watson_gives_powder_average() {
        let x: f64 = 1e9 * D;
        let expected = 0.5 * std::f64::consts::PI.sqrt() * statrs::function::erf::erf(x.sqrt()) / x.sqrt();
        for (g, theta, phi) in [([0.0, 0.0, 1.0], 0.5, 0.3), ([1.0, 0.0, 0.0], 2.0, 1.0), ([0.6, 0.0, 0.8], 0.0, 0.0)] {
            assert_relative_eq!(stick(g, 1e9, D, theta, phi, 0.0), expected, epsilon = 1e-10);
        }
    }

    #[test]
    // Purpose
    // -------
    // A highly concentrated distribution approaches a single stick.
    //
    // Given
    // -----
    // - kappa = 1000, b d = 1, g = z, θ = 0.5.
    //
    // Expect
    // ------
    // - Within 2e-3 of exp(-b d cos² θ).
    fn concentrated_watson_approaches_single_stick() {
        let theta: f64 = 0.5;
        let expected = (-(theta.cos().powi(2))).exp();
        let value = stick([0.0, 0.0, 1.0], 1e9, 1e-9, theta, 0.3, 1000.0);
        assert_relative_eq!(value, expected, epsilon = 2e-3);
    }

    #[test]
    // Purpose
    // -------
    // The signal stays a fraction for stick and cylinder geometries.
    //
    // Given
    // -----
    // - kappa in {0, 0.5, 4, 16, 64, 300}, R in {0, 0.5, 2, 8} µm,
    //   G in {0, 0.03, 0.08, 0.3} T/m with the matching PGSE b-value, and
    //   four axis orientations.
    //
    // Expect
    // ------
    // - 0 ≤ S ≤ 1 + 1e-12.
    fn signal_lies_in_unit_interval() {
        let roots = bessel_j1_derivative_roots(20);
        let (big_delta, small_delta) = (0.03, 0.01);
        let g = [0.6, 0.0, 0.8];
        for &kappa in &[0.0, 0.5, 4.0, 16.0, 64.0, 300.0] {
            for &radius in &[0.0, 0.5e-6, 2e-6, 8e-6] {
                for &gradient in &[0.0, 0.03, 0.08, 0.3] {
                    let b = (GAMMA * gradient * small_delta).powi(2) * (big_delta - small_delta / 3.0);
                    for &theta in &[0.0, 0.7, std::f64::consts::FRAC_PI_2, 2.5] {
                        let s = noddi_ic(
                            g, b, gradient, big_delta, small_delta, D, theta, 1.1, kappa, radius,
                            BesselRoots::new(&roots),
                        );
                        assert!((0.0..=1.0 + 1e-12).contains(&s), "S = {s} at κ={kappa}, R={radius}, G={gradient}");
                    }
                }
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // No diffusion weighting gives an unattenuated signal.
    fn zero_b_value_gives_unit_signal() {
        assert_relative_eq!(stick([0.0, 0.0, 1.0], 0.0, D, 0.5, 0.3, 3.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Check the harmonic expansion against direct integration over the
    // sphere.
    //
    // Given
    // -----
    // - g = z, b = 1e9, θ = 0.5, φ = 0.3, kappa = 4, and a 400 × 400
    //   midpoint grid.
    //
    // Expect
    // ------
    // - Agreement to 1e-5.
    fn expansion_matches_sphere_quadrature() {
        let g = [0.0, 0.0, 1.0];
        let value = stick(g, 1e9, D, 0.5, 0.3, 4.0);
        let reference = sphere_average(g, 1e9, D, 0.5, 0.3, 4.0);
        assert_relative_eq!(value, reference, epsilon = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // Girdle distributions (negative kappa) are expanded as accurately as
    // concentrated ones.
    //
    // Given
    // -----
    // - kappa = -50 with three gradient/axis/b combinations, the 400 × 400
    //   sphere quadrature, and kappa in {-50, -200} over a grid of b-values
    //   and axis angles.
    //
    // Expect
    // ------
    // - Agreement with quadrature to 5e-5, and every signal in [0, 1].
    fn girdle_expansion_matches_sphere_quadrature() {
        let cases = [([0.0, 0.0, 1.0], 1e9, 0.5), ([0.6, 0.0, 0.8], 2e9, 1.2), ([1.0, 0.0, 0.0], 3e9, 0.0)];
        for (g, b, theta) in cases {
            let value = stick(g, b, D, theta, 0.3, -50.0);
            let reference = sphere_average(g, b, D, theta, 0.3, -50.0);
            assert_relative_eq!(value, reference, epsilon = 5e-5);
        }
        for &kappa in &[-50.0, -200.0] {
            for &b in &[0.0, 5e8, 1e9, 3e9, 5e9] {
                for i in 0..=20 {
                    let theta = i as f64 * std::f64::consts::PI / 20.0;
                    let s = stick([0.0, 0.0, 1.0], b, D, theta, 0.3, kappa);
                    assert!((0.0..=1.0 + 1e-12).contains(&s), "S = {s} at κ={kappa}, b={b}, θ={theta}");
                }
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Restriction perpendicular to the fibres reduces the signal.
    //
    // Given
    // -----
    // - PGSE with G = 0.06 T/m, Δ = 30 ms, δ = 10 ms, R = 2 µm, 20 roots.
    //
    // Expect
    // ------
    // - Cylinder signal strictly below the stick signal, and not by much
    //   (small perpendicular attenuation at this radius).
    fn cylinder_signal_is_below_stick_signal() {
        let roots = bessel_j1_derivative_roots(20);
        let (gradient, big_delta, small_delta) = (0.06, 0.03, 0.01);
        let b = (GAMMA * gradient * small_delta).powi(2) * (big_delta - small_delta / 3.0);
        let g = [0.6, 0.0, 0.8];
        let stick_signal = noddi_ic(
            g, b, gradient, big_delta, small_delta, D, 0.5, 0.3, 4.0, 0.0, BesselRoots::new(&roots),
        );
        let cylinder_signal = noddi_ic(
            g, b, gradient, big_delta, small_delta, D, 0.5, 0.3, 4.0, 2e-6, BesselRoots::new(&roots),
        );
        assert!(cylinder_signal < stick_signal);
        assert!(stick_signal - cylinder_signal < 1e-2);
    }

    #[test]
    // Purpose
    // -------
    // Results are reproducible and the f32 path tracks f64.
    fn evaluation_is_deterministic_across_precisions() {
        let g = [0.6, 0.0, 0.8];
        let a = stick(g, 2e9, D, 1.0, 0.2, 8.0);
        let b = stick(g, 2e9, D, 1.0, 0.2, 8.0);
        assert_eq!(a.to_bits(), b.to_bits());

        let single = noddi_ic(
            [0.6_f32, 0.0, 0.8], 2e9, 0.0, 0.0, 0.0, 1.7e-9, 1.0, 0.2, 8.0, 0.0, BesselRoots::empty(),
        );
        assert_relative_eq!(single as f64, a, epsilon = 1e-4);
    }

    #[test]
    // Purpose
    // -------
    // Rounding that pushes |g·μ| slightly above one is tolerated.
    fn slightly_non_unit_gradient_is_snapped() {
        let g = [0.0, 0.0, 1.0 + 1e-12];
        let value = stick(g, 1e9, D, 0.0, 0.0, 4.0);
        let reference = stick([0.0, 0.0, 1.0], 1e9, D, 0.0, 0.0, 4.0);
        assert_relative_eq!(value, reference, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // NaN inputs are not masked by the clamp.
    fn nan_parameters_propagate() {
        assert!(stick([0.0, 0.0, 1.0], 1e9, f64::NAN, 0.5, 0.3, 4.0).is_nan());
    }
}
