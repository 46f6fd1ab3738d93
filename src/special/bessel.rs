//! special::bessel — Bessel functions of the first kind and roots of `J1'`.
//!
//! Purpose
//! -------
//! Build the root table used by the restricted-cylinder series. The
//! perpendicular signal of a cylinder under the Gaussian phase
//! approximation sums over `α_k = j'_{1,k} / R`, where `j'_{1,k}` is the
//! k-th positive zero of `J1'(x)`. Computing these zeros is far more
//! expensive than a kernel evaluation, so they are produced once per
//! fitting run and handed to every kernel call as a read-only table.
//!
//! Key behaviors
//! -------------
//! - [`bessel_j0_j1`] evaluates `J0` and `J1` together with Miller's
//!   backward recurrence normalized by `J0 + 2 Σ J_{2k} = 1`, switching to
//!   Hankel's asymptotic expansion above [`HANKEL_THRESHOLD`].
//! - [`bessel_j1_derivative`] evaluates `J1'(x) = J0(x) - J1(x)/x`.
//! - [`bessel_j1_derivative_roots`] seeds each zero with McMahon's
//!   asymptotic expansion and polishes it with Newton's method.
//!
//! Conventions
//! -----------
//! - Everything here is `f64`; tables are converted to the model precision
//!   by the caller.

/// Newton iterations allowed per root.
const MAX_NEWTON_ITERATIONS: usize = 50;

/// Relative step size at which Newton's method stops.
const NEWTON_TOLERANCE: f64 = 1e-15;

/// Magnitude at which the backward recurrence is renormalized.
const RECURRENCE_OVERFLOW: f64 = 1e250;

/// Arguments above this use Hankel's asymptotic expansion instead of the
/// backward recurrence, whose length grows linearly with the argument.
pub const HANKEL_THRESHOLD: f64 = 25.0;

/// Term cap of the asymptotic expansion.
const HANKEL_TERMS: usize = 60;

/// Evaluate `(J0(x), J1(x))`.
///
/// Non-finite `x` yields `(NaN, NaN)`. For tiny `|x|` the leading terms of
/// the power series are returned directly, and above
/// [`HANKEL_THRESHOLD`] Hankel's expansion replaces the recurrence, so the
/// cost is bounded for every finite argument.
pub fn bessel_j0_j1(x: f64) -> (f64, f64) {
    if !x.is_finite() {
        return (f64::NAN, f64::NAN);
    }
    let ax = x.abs();
    if ax < 1e-8 {
        return (1.0 - 0.25 * ax * ax, 0.5 * x);
    }

    let (j0, j1) = if ax > HANKEL_THRESHOLD { hankel_j0_j1(ax) } else { miller_j0_j1(ax) };
    (j0, if x < 0.0 { -j1 } else { j1 })
}

/// Miller's backward recurrence for `0 < ax ≤ HANKEL_THRESHOLD`.
fn miller_j0_j1(ax: f64) -> (f64, f64) {
    // Start well above ax so that J_start(ax) is negligible.
    let mut start = ax.ceil() as usize + 30 + (12.0 * ax.sqrt()) as usize;
    if start % 2 == 1 {
        start += 1;
    }

    let mut j_above = 0.0_f64;
    let mut j_here = 1e-30_f64;
    let mut even_sum = 0.0_f64;
    let mut j1 = 0.0_f64;

    for k in (1..=start).rev() {
        // J_{k-1} = (2k/x) J_k - J_{k+1}
        let j_below = 2.0 * k as f64 / ax * j_here - j_above;
        j_above = j_here;
        j_here = j_below;

        let order = k - 1;
        if order == 1 {
            j1 = j_here;
        }
        if order > 0 && order % 2 == 0 {
            even_sum += j_here;
        }

        if j_here.abs() > RECURRENCE_OVERFLOW {
            j_here /= RECURRENCE_OVERFLOW;
            j_above /= RECURRENCE_OVERFLOW;
            even_sum /= RECURRENCE_OVERFLOW;
            j1 /= RECURRENCE_OVERFLOW;
        }
    }

    let norm = j_here + 2.0 * even_sum;
    (j_here / norm, j1 / norm)
}

/// Hankel's expansion `J_ν(x) ≈ √(2/(πx)) (P_ν cos ω_ν - Q_ν sin ω_ν)` with
/// `ω_ν = x - (ν/2 + ¼)π`, for `ax > HANKEL_THRESHOLD`.
///
/// The phases are formed from `sin x` and `cos x` of the exact argument,
/// since subtracting `π/4` from a large `x` rounds the phase away.
fn hankel_j0_j1(ax: f64) -> (f64, f64) {
    let (p0, q0) = hankel_pq(0.0, ax);
    let (p1, q1) = hankel_pq(4.0, ax);

    let (sin_x, cos_x) = ax.sin_cos();
    let cos_omega = (cos_x + sin_x) * std::f64::consts::FRAC_1_SQRT_2;
    let sin_omega = (sin_x - cos_x) * std::f64::consts::FRAC_1_SQRT_2;
    let amplitude = (std::f64::consts::FRAC_2_PI / ax).sqrt();

    // ω_1 = ω_0 - π/2
    let j0 = amplitude * (p0 * cos_omega - q0 * sin_omega);
    let j1 = amplitude * (p1 * sin_omega + q1 * cos_omega);
    (j0, j1)
}

/// Sums `P_ν` and `Q_ν` for `μ = 4ν²`. Term `k` is
/// `Π_{i≤k} (μ - (2i-1)²) / (k! (8x)^k)`; even terms go to `P` and odd
/// terms to `Q`, with alternating signs within each. The series is
/// asymptotic, so summation also stops once the terms start to grow.
fn hankel_pq(mu: f64, ax: f64) -> (f64, f64) {
    let (mut p, mut q) = (1.0_f64, 0.0_f64);
    let mut term = 1.0_f64;
    for k in 1..HANKEL_TERMS {
        let odd = (2 * k - 1) as f64;
        let next = term * (mu - odd * odd) / (8.0 * k as f64 * ax);
        if next.abs() > term.abs() {
            break;
        }
        term = next;
        match k % 4 {
            1 => q += term,
            2 => p -= term,
            3 => q -= term,
            _ => p += term,
        }
        if term.abs() <= f64::EPSILON * p.abs() {
            break;
        }
    }
    (p, q)
}

/// Evaluate the derivative `J1'(x) = J0(x) - J1(x)/x`.
///
/// At `x = 0` the limit `1/2` is returned.
pub fn bessel_j1_derivative(x: f64) -> f64 {
    if x == 0.0 {
        return 0.5;
    }
    let (j0, j1) = bessel_j0_j1(x);
    j0 - j1 / x
}

/// First `count` positive zeros of `J1'(x)`, in increasing order.
///
/// Parameters
/// ----------
/// - `count`: `usize`
///   Number of zeros to return. `0` yields an empty vector.
///
/// Returns
/// -------
/// `Vec<f64>`
///   `[1.8411837813…, 5.3314427735…, 8.5363163663…, …]`.
///
/// Notes
/// -----
/// - McMahon's expansion with `β = (s - ¼)π` is already within a few
///   hundredths for `s = 1` and far closer for later zeros; Newton on
///   `J1'` with `J1''(x) = -J1'(x)/x - (1 - 1/x²) J1(x)` then converges in
///   a handful of steps.
pub fn bessel_j1_derivative_roots(count: usize) -> Vec<f64> {
    (1..=count).map(j1_derivative_root).collect()
}

fn j1_derivative_root(s: usize) -> f64 {
    let beta = (s as f64 - 0.25) * std::f64::consts::PI;
    let eight_beta = 8.0 * beta;
    let mut x = beta - 7.0 / eight_beta - 1724.0 / (3.0 * eight_beta.powi(3));

    for _ in 0..MAX_NEWTON_ITERATIONS {
        let (j0, j1) = bessel_j0_j1(x);
        let first = j0 - j1 / x;
        let second = -first / x - (1.0 - 1.0 / (x * x)) * j1;
        let step = first / second;
        x -= step;
        if step.abs() <= NEWTON_TOLERANCE * x.abs() {
            break;
        }
    }
    x
}
