//! compartments::cylinder — restricted diffusion perpendicular to a cylinder.
//!
//! Neuman's Gaussian phase approximation for a pulsed-gradient spin echo
//! with the gradient perpendicular to an impermeable cylinder of radius `R`:
//!
//! ```text
//! ln E⊥ = -2 γ² G² Σ_k [2 d α_k² δ - 2 + 2e^{-dα_k²δ} + 2e^{-dα_k²Δ}
//!                        - e^{-dα_k²(Δ-δ)} - e^{-dα_k²(Δ+δ)}]
//!                       / [d² α_k⁶ (R² α_k² - 1)]
//! ```
//!
//! with `α_k = j'_{1,k} / R`. The series is truncated at the length of the
//! supplied root table.

use crate::{compartments::roots::BesselRoots, float::ModelFloat};

/// Proton gyromagnetic ratio γ (rad s⁻¹ T⁻¹).
pub const GYROMAGNETIC_RATIO: f64 = 2.675987e8;

/// One term of the perpendicular series for the radial wavenumber `alpha`.
#[inline]
pub(crate) fn series_term<F: ModelFloat>(
    alpha: F, d: F, radius: F, big_delta: F, small_delta: F,
) -> F {
    let two = F::lit(2.0);
    let alpha_sq = alpha * alpha;
    let rate = d * alpha_sq;

    let numerator = two * rate * small_delta - two
        + two * (-rate * small_delta).exp()
        + two * (-rate * big_delta).exp()
        - (-rate * (big_delta - small_delta)).exp()
        - (-rate * (big_delta + small_delta)).exp();
    // d² α⁶ grouped as (d α²)² α² to stay in f32 range for micron radii.
    let denominator = rate * rate * alpha_sq * (radius * radius * alpha_sq - F::one());
    numerator / denominator
}

/// Log-attenuation `ln E⊥` of a cylinder for a gradient perpendicular to
/// its axis.
///
/// Parameters
/// ----------
/// - `d`: intrinsic diffusivity (m²/s).
/// - `radius`: cylinder radius `R` (m). `0` means a stick.
/// - `gradient`: gradient amplitude `G` (T/m).
/// - `big_delta`, `small_delta`: pulse separation `Δ` and duration `δ` (s).
/// - `roots`: zeros of `J1'`; only read when `radius != 0` and `d != 0`.
///
/// Returns
/// -------
/// `F`
///   `≤ 0` for physical inputs. Exactly `0` for a stick, for `d = 0`, or
///   for an empty root table.
pub fn cylinder_perpendicular_log_attenuation<F: ModelFloat>(
    d: F, radius: F, gradient: F, big_delta: F, small_delta: F, roots: BesselRoots<'_, F>,
) -> F {
    if radius == F::zero() || d == F::zero() {
        return F::zero();
    }

    let sum = roots.iter().fold(F::zero(), |acc, &root| {
        acc + series_term(root / radius, d, radius, big_delta, small_delta)
    });

    let gamma = F::lit(GYROMAGNETIC_RATIO);
    -F::lit(2.0) * gamma * gamma * gradient * gradient * sum
}
