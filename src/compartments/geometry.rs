//! compartments::geometry — orientation helpers shared by the kernels.

use crate::float::ModelFloat;

/// Unit vector for polar angle `theta` and azimuth `phi`:
/// `(cos φ sin θ, sin φ sin θ, cos θ)`.
#[inline]
pub fn spherical_to_cartesian<F: ModelFloat>(theta: F, phi: F) -> [F; 3] {
    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_phi, cos_phi) = phi.sin_cos();
    [cos_phi * sin_theta, sin_phi * sin_theta, cos_theta]
}

/// Drop the padding component of a four-wide gradient vector.
#[inline]
pub fn direction_from_homogeneous<F: ModelFloat>(g: [F; 4]) -> [F; 3] {
    [g[0], g[1], g[2]]
}

#[inline]
pub(crate) fn dot<F: ModelFloat>(a: [F; 3], b: [F; 3]) -> F {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}
