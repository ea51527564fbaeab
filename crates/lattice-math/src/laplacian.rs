// ─────────────────────────────────────────────────────────────────────
// SCPN Lattice Core — Laplacian
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! 7-point Laplacian with one-sided second differences on the faces.
//!
//!   interior:  (f[i+1] + f[i-1] - 2 f[i]) / h²
//!   i = 0:     (f[2]   + f[0]   - 2 f[1]) / h²
//!   i = n-1:   (f[n-3] + f[n-1] - 2 f[n-2]) / h²
//!
//! Each axis picks its own stencil, so edges and corners combine one-sided
//! terms on several axes.

use lattice_types::constants::MIN_POINTS_SECOND_DERIVATIVE;
use lattice_types::error::{LatticeError, LatticeResult};
use lattice_types::field::FieldValue;
use lattice_types::grid::UniformGrid;

use crate::stencil::{par_fill_points, reciprocal_spacings, AxisPosition, Stencil};

#[inline]
fn second_derivative<T: FieldValue>(values: &[T], s: &Stencil, axis: usize, rs2: f64) -> T {
    let (near, far) = match s.position(axis) {
        AxisPosition::Interior => {
            let (minus, plus) = s.pair(axis);
            return (values[plus] + values[minus] - values[s.center()] * 2.0) * rs2;
        }
        AxisPosition::Lower => (s.offset(axis, 1), s.offset(axis, 2)),
        AxisPosition::Upper => (s.offset(axis, -1), s.offset(axis, -2)),
        AxisPosition::Single => return T::ZERO,
    };
    (values[far] + values[s.center()] - values[near] * 2.0) * rs2
}

/// Overwrite `laplacian` with the discrete Laplacian of `field`.
///
/// Needs at least 3 points on every axis. Works on scalar and vector fields.
pub fn compute_laplacian<T: FieldValue>(
    field: &UniformGrid<T>,
    laplacian: &mut UniformGrid<T>,
) -> LatticeResult<()> {
    field.ensure_shape_matches(laplacian)?;
    field.ensure_min_points("laplacian", MIN_POINTS_SECOND_DERIVATIVE)?;
    let dims = field.dims();
    let recip = reciprocal_spacings(field.spacing());
    let rs2 = recip * recip;
    let values = field.as_slice();

    par_fill_points(laplacian.as_mut_slice(), dims, |s| {
        second_derivative(values, s, 0, rs2.x)
            + second_derivative(values, s, 1, rs2.y)
            + second_derivative(values, s, 2, rs2.z)
    });

    if let Some(offset) = laplacian.iter().position(|v| !v.is_finite()) {
        return Err(LatticeError::NonFinite {
            operation: "laplacian",
            offset,
        });
    }
    Ok(())
}
