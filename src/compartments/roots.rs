//! compartments::roots — owned and borrowed tables of `J1'` zeros.
//!
//! Purpose
//! -------
//! Separate ownership of the root table from its use inside kernels. A
//! fitting run builds one [`BesselRootTable`] up front; every kernel call
//! receives a [`BesselRoots`] view, a borrowed slice with an explicit
//! length, and never owns or mutates it.
//!
//! Key behaviors
//! -------------
//! - [`BesselRootTable::new`] computes the first `count` zeros.
//! - [`BesselRootTable::from_roots`] adopts an externally supplied table
//!   after checking that it looks like zeros of `J1'`.
//! - [`BesselRootTable::for_radius`] resolves the table a compartment
//!   needs, skipping all work for sticks.
//! - [`BesselRoots::from_parts`] mirrors the `(pointer, length)` calling
//!   convention: a length beyond the slice is a debug assertion and is
//!   clamped in release builds, so kernels never read out of bounds.
//! - [`BesselRoots::check_truncation`] reports, through `tracing`, when the
//!   retained series terms have not decayed enough for the given protocol.
//!
//! Invariants & assumptions
//! ------------------------
//! - A table is immutable after construction; many concurrent readers are
//!   fine, writers would need a new table.
//! - Kernels iterate the view front to back and never index past its end.

use crate::{
    compartments::{
        cylinder::series_term,
        errors::{CompartmentError, CompartmentResult},
    },
    float::ModelFloat,
    special::bessel_j1_derivative_roots,
};
use tracing::{debug, warn};

/// Number of zeros generated when the caller has no preference.
pub const DEFAULT_BESSEL_ROOT_COUNT: usize = 20;

/// Expected value of the first zero of `J1'`, for sanity checks.
pub const FIRST_ROOT_REFERENCE: f64 = 1.8412;

const FIRST_ROOT_TOLERANCE: f64 = 1e-4;

/// Minimum ratio between the first and last retained series terms.
pub const TRUNCATION_RATIO_FLOOR: f64 = 1e4;

/// Owned, validated table of the first zeros of `J1'`.
#[derive(Debug, Clone, PartialEq)]
pub struct BesselRootTable<F> {
    roots: Vec<F>,
}

impl<F: ModelFloat> BesselRootTable<F> {
    /// Compute the first `count` zeros of `J1'` in `f64` and store them in
    /// the model precision.
    ///
    /// Errors
    /// ------
    /// - [`CompartmentError::EmptyRootTable`] when `count == 0`.
    pub fn new(count: usize) -> CompartmentResult<Self> {
        if count == 0 {
            return Err(CompartmentError::EmptyRootTable);
        }
        let roots: Vec<F> = bessel_j1_derivative_roots(count).into_iter().map(F::lit).collect();
        debug!(count, "computed Bessel J1' root table");
        Ok(BesselRootTable { roots })
    }

    /// Adopt a caller-supplied table.
    ///
    /// Errors
    /// ------
    /// - [`CompartmentError::EmptyRootTable`] for an empty vector.
    /// - [`CompartmentError::InvalidRootTable`] if an entry is non-finite or
    ///   not strictly increasing, or if the first entry is not within `1e-4`
    ///   of [`FIRST_ROOT_REFERENCE`].
    pub fn from_roots(roots: Vec<F>) -> CompartmentResult<Self> {
        let first = roots.first().ok_or(CompartmentError::EmptyRootTable)?.to_f64_lossy();
        if (first - FIRST_ROOT_REFERENCE).abs() > FIRST_ROOT_TOLERANCE {
            return Err(CompartmentError::InvalidRootTable {
                index: 0,
                value: first,
                reason: "first zero of J1' must be 1.8412",
            });
        }
        for (index, root) in roots.iter().enumerate() {
            let value = root.to_f64_lossy();
            if !value.is_finite() {
                return Err(CompartmentError::InvalidRootTable {
                    index,
                    value,
                    reason: "root must be finite",
                });
            }
            if index > 0 && *root <= roots[index - 1] {
                return Err(CompartmentError::InvalidRootTable {
                    index,
                    value,
                    reason: "roots must be strictly increasing",
                });
            }
        }
        Ok(BesselRootTable { roots })
    }

    /// Table needed by a compartment of the given radius.
    ///
    /// Sticks (`radius == 0`) never read roots, so `Ok(None)` is returned
    /// without computing or validating anything. Otherwise `supplied` is
    /// adopted through [`BesselRootTable::from_roots`], or the first
    /// [`DEFAULT_BESSEL_ROOT_COUNT`] zeros are computed.
    ///
    /// Errors
    /// ------
    /// - As [`BesselRootTable::from_roots`], for a cylinder radius only.
    pub fn for_radius(radius: F, supplied: Option<Vec<F>>) -> CompartmentResult<Option<Self>> {
        if radius == F::zero() {
            return Ok(None);
        }
        let table = match supplied {
            Some(roots) => Self::from_roots(roots)?,
            None => Self::new(DEFAULT_BESSEL_ROOT_COUNT)?,
        };
        Ok(Some(table))
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Always `false`; construction rejects empty tables.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn as_slice(&self) -> &[F] {
        &self.roots
    }

    /// Borrow the whole table as a kernel argument.
    pub fn view(&self) -> BesselRoots<'_, F> {
        BesselRoots::new(&self.roots)
    }
}

/// Read-only view of a root table, as passed to the kernels.
#[derive(Debug, Clone, Copy)]
pub struct BesselRoots<'a, F> {
    roots: &'a [F],
}

impl<'a, F: ModelFloat> BesselRoots<'a, F> {
    /// View every entry of `roots`.
    #[inline]
    pub fn new(roots: &'a [F]) -> Self {
        BesselRoots { roots }
    }

    /// View the first `length` entries of `roots`.
    ///
    /// `length > roots.len()` violates the caller contract: it trips a
    /// `debug_assert!` and is clamped to `roots.len()` otherwise.
    #[inline]
    pub fn from_parts(roots: &'a [F], length: usize) -> Self {
        debug_assert!(
            length <= roots.len(),
            "root table length {length} exceeds the {} available roots",
            roots.len()
        );
        let length = length.min(roots.len());
        BesselRoots { roots: &roots[..length] }
    }

    /// A view with no roots, for callers that only use the stick model.
    #[inline]
    pub fn empty() -> Self {
        BesselRoots { roots: &[] }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &'a [F] {
        self.roots
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'a, F> {
        self.roots.iter()
    }

    /// Check whether the truncated cylinder series has converged enough for
    /// a given tissue/protocol combination.
    ///
    /// Returns `true` when the first retained term is at least
    /// [`TRUNCATION_RATIO_FLOOR`] times the last. Otherwise a warning is
    /// emitted and `false` is returned. Stick geometry (`radius == 0`) and
    /// `d == 0` never read the table and always pass.
    pub fn check_truncation(&self, d: F, radius: F, big_delta: F, small_delta: F) -> bool {
        if radius == F::zero() || d == F::zero() {
            return true;
        }
        let (Some(&first), Some(&last)) = (self.roots.first(), self.roots.last()) else {
            warn!("cylinder series requested with an empty Bessel root table");
            return false;
        };

        let head = series_term(first / radius, d, radius, big_delta, small_delta);
        let tail = series_term(last / radius, d, radius, big_delta, small_delta);
        if tail > F::zero() && head / tail < F::lit(TRUNCATION_RATIO_FLOOR) {
            warn!(
                roots = self.roots.len(),
                ratio = (head / tail).to_f64_lossy(),
                radius = radius.to_f64_lossy(),
                "cylinder series truncated early; consider more Bessel roots"
            );
            return false;
        }
        true
    }
}

impl<'a, F: ModelFloat> IntoIterator for BesselRoots<'a, F> {
    type Item = &'a F;
    type IntoIter = std::slice::Iter<'a, F>;

    fn into_iter(self) -> Self::IntoIter {
        self.roots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Table construction and validation errors, and resolving a table
    //   only for cylinder radii.
    // - The explicit-length view and its clamping.
    // - The truncation check on adequate and deliberately short tables.
    //
    // They intentionally DO NOT cover:
    // - Root accuracy, which is tested in `special::bessel`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Computed tables have the requested length and pass validation.
    fn new_table_has_requested_length_and_revalidates() {
        let table = BesselRootTable::<f64>::new(DEFAULT_BESSEL_ROOT_COUNT).expect("table");
        assert_eq!(table.len(), DEFAULT_BESSEL_ROOT_COUNT);
        assert!(!table.is_empty());
        let copy = BesselRootTable::from_roots(table.as_slice().to_vec()).expect("valid table");
        assert_eq!(copy, table);
        assert_eq!(BesselRootTable::<f32>::new(0), Err(CompartmentError::EmptyRootTable));
    }

    #[test]
    // Purpose
    // -------
    // Supplied tables are rejected with the offending index.
    //
    // Given
    // -----
    // - An empty table, one starting at 2.0, a non-increasing one, and one
    //   with a NaN entry.
    //
    // Expect
    // ------
    // - EmptyRootTable, then InvalidRootTable at indices 0, 2 and 1.
    fn from_roots_rejects_malformed_tables() {
        assert_eq!(BesselRootTable::<f64>::from_roots(vec![]), Err(CompartmentError::EmptyRootTable));

        let wrong_first = BesselRootTable::from_roots(vec![2.0_f64, 5.33]);
        assert!(matches!(wrong_first, Err(CompartmentError::InvalidRootTable { index: 0, .. })));

        let unordered = BesselRootTable::from_roots(vec![1.8412_f64, 5.3314, 5.0]);
        assert!(matches!(unordered, Err(CompartmentError::InvalidRootTable { index: 2, .. })));

        let non_finite = BesselRootTable::from_roots(vec![1.8412_f64, f64::NAN]);
        assert!(matches!(non_finite, Err(CompartmentError::InvalidRootTable { index: 1, .. })));
    }

    #[test]
    // Purpose
    // -------
    // Only cylinders get a root table.
    //
    // Given
    // -----
    // - R = 0 with no table and with a malformed supplied table; R = 2 µm
    //   with no table, a valid supplied table, and a malformed one.
    //
    // Expect
    // ------
    // - Sticks resolve to None and ignore the supplied entries; cylinders
    //   get the default table, the supplied table, or InvalidRootTable.
    fn for_radius_builds_tables_only_for_cylinders() {
        assert_eq!(BesselRootTable::<f64>::for_radius(0.0, None), Ok(None));
        assert_eq!(BesselRootTable::for_radius(0.0, Some(vec![f64::NAN])), Ok(None));

        let default =
            BesselRootTable::<f64>::for_radius(2e-6, None).expect("default table").expect("cylinder");
        assert_eq!(default.len(), DEFAULT_BESSEL_ROOT_COUNT);

        let supplied = BesselRootTable::for_radius(2e-6, Some(vec![1.8412_f64, 5.3314]))
            .expect("supplied table")
            .expect("cylinder");
        assert_eq!(supplied.as_slice(), &[1.8412, 5.3314]);

        assert!(matches!(
            BesselRootTable::for_radius(2e-6, Some(vec![2.0_f64])),
            Err(CompartmentError::InvalidRootTable { index: 0, .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // An explicit length truncates the view.
    fn from_parts_truncates_to_length() {
        let table = BesselRootTable::<f64>::new(8).expect("table");
        let view = BesselRoots::from_parts(table.as_slice(), 3);
        assert_eq!(view.len(), 3);
        assert_eq!(view.as_slice(), &table.as_slice()[..3]);
        assert!(BesselRoots::<f64>::empty().is_empty());
    }

    #[test]
    #[cfg(not(debug_assertions))]
    // Purpose
    // -------
    // In release builds an over-long length is clamped, not read past.
    fn from_parts_clamps_overlong_length_in_release() {
        let roots = [1.8412_f64, 5.3314];
        assert_eq!(BesselRoots::from_parts(&roots, 10).len(), 2);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "exceeds")]
    // Purpose
    // -------
    // In debug builds an over-long length is caught immediately.
    fn from_parts_asserts_on_overlong_length_in_debug() {
        let roots = [1.8412_f64, 5.3314];
        let _ = BesselRoots::from_parts(&roots, 10);
    }

    #[test]
    // Purpose
    // -------
    // The truncation check distinguishes adequate and short tables.
    //
    // Given
    // -----
    // - d = 1.7e-9, R = 2 µm, Δ = 30 ms, δ = 10 ms with 20 roots and with
    //   2 roots; and a stick with an empty table.
    //
    // Expect
    // ------
    // - 20 roots pass, 2 roots fail, the stick passes.
    fn truncation_check_flags_short_tables() {
        let table = BesselRootTable::<f64>::new(20).expect("table");
        assert!(table.view().check_truncation(1.7e-9, 2e-6, 0.03, 0.01));
        let short = BesselRoots::from_parts(table.as_slice(), 2);
        assert!(!short.check_truncation(1.7e-9, 2e-6, 0.03, 0.01));
        assert!(BesselRoots::<f64>::empty().check_truncation(1.7e-9, 0.0, 0.03, 0.01));
    }
}
