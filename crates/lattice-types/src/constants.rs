// ─────────────────────────────────────────────────────────────────────
// SCPN Lattice Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use std::ops::Range;

/// SOR relaxation factor.
/// Tuned on a 32^3 vortex ring without multigrid: residual minimum for
/// omega in [1.72, 1.74]. Re-validate convergence before changing.
pub const DEFAULT_RELAXATION: f64 = 1.72;

/// Accepted SOR relaxation factors. 1.0 is plain Gauss-Seidel, >= 2 diverges.
pub const RELAXATION_RANGE: Range<f64> = 1.0..2.0;

/// Cell spacing at or below this is a collapsed (2D) axis: reciprocal 0.
pub const SPACING_EPSILON: f64 = f64::EPSILON;

/// Sentinel for "no value here" in scalar fields spanning several sub-domains.
pub const INVALID_VALUE: f64 = f64::NAN;

/// Automatic solver budget is this many rounds per point of the largest axis.
pub const AUTO_ITERATIONS_PER_DIM: usize = 2;

/// Solver rounds per level of the multigrid cascade.
pub const DEFAULT_MULTIGRID_STEPS: usize = 16;

/// Second differences need this many points along every axis.
pub const MIN_POINTS_SECOND_DERIVATIVE: usize = 3;

/// Reciprocal of a cell spacing, 0 for a collapsed axis.
#[inline]
pub fn reciprocal_spacing(spacing: f64) -> f64 {
    if spacing > SPACING_EPSILON {
        1.0 / spacing
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_relaxation_in_range() {
        assert!(RELAXATION_RANGE.contains(&DEFAULT_RELAXATION));
        assert!(!RELAXATION_RANGE.contains(&2.0));
    }

    #[test]
    fn test_reciprocal_spacing_collapsed_axis() {
        assert_eq!(reciprocal_spacing(0.0), 0.0);
        assert_eq!(reciprocal_spacing(f64::EPSILON * 0.5), 0.0);
        assert!((reciprocal_spacing(0.25) - 4.0).abs() < 1e-15);
    }

    #[test]
    fn test_invalid_value_is_nan() {
        assert!(INVALID_VALUE.is_nan());
    }
}
