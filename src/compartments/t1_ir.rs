//! compartments::t1_ir — T1 inversion-recovery signal.

use crate::float::ModelFloat;

/// Magnitude signal of an inversion-recovery experiment,
/// `|1 - 2 exp(-Ti / T1)|`.
///
/// Parameters
/// ----------
/// - `ti`: `F`
///   Inversion time from the protocol (seconds).
/// - `t1`: `F`
///   Longitudinal relaxation time (seconds).
///
/// Returns
/// -------
/// `F`
///   Signal in `[0, 1]` for `ti ≥ 0`, `t1 > 0`. It starts at 1 for
///   `ti = 0`, crosses zero at `ti = t1 ln 2`, and recovers towards 1.
///
/// Notes
/// -----
/// - Depends on `ti` and `t1` only through `ti / t1`.
/// - `t1 = 0` is left to IEEE-754: `ti > 0` gives 1, `ti = 0` gives NaN.
#[inline]
pub fn exp_t1_dec_ir<F: ModelFloat>(ti: F, t1: F) -> F {
    (F::one() - F::lit(2.0) * (-ti / t1).exp()).abs()
}
