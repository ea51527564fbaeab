// ─────────────────────────────────────────────────────────────────────
// SCPN Lattice Core — Gradient
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Gradient of a scalar lattice field.
//!
//! Interior points use centered differences, the six faces use one-sided
//! forward/backward differences:
//!   interior:  (f[i+1] - f[i-1]) / (2 h)
//!   i = 0:     (f[1] - f[0]) / h
//!   i = n-1:   (f[n-1] - f[n-2]) / h
//!
//! [`compute_gradient_conditionally`] handles fields that hold several
//! disjoint sub-domains separated by `INVALID_VALUE` (NaN) samples.

use glam::DVec3;
use lattice_types::constants::INVALID_VALUE;
use lattice_types::error::LatticeResult;
use lattice_types::field::{FieldValue, ScalarField, VectorField};
use rayon::prelude::*;

use crate::stencil::{par_fill_points, reciprocal_spacings, AxisPosition, Stencil};

/// d(field)/d(axis) at one point. `recip` is 1/h, 0 on a collapsed axis.
#[inline]
pub(crate) fn first_derivative<T: FieldValue>(
    values: &[T],
    stencil: &Stencil,
    axis: usize,
    recip: f64,
) -> T {
    match stencil.position(axis) {
        AxisPosition::Single => T::ZERO,
        AxisPosition::Lower => {
            (values[stencil.offset(axis, 1)] - values[stencil.center()]) * recip
        }
        AxisPosition::Upper => {
            (values[stencil.center()] - values[stencil.offset(axis, -1)]) * recip
        }
        AxisPosition::Interior => {
            let (minus, plus) = stencil.pair(axis);
            (values[plus] - values[minus]) * (0.5 * recip)
        }
    }
}

/// Overwrite `gradient` with the finite-difference gradient of `scalar`.
pub fn compute_gradient(scalar: &ScalarField, gradient: &mut VectorField) -> LatticeResult<()> {
    scalar.ensure_shape_matches(gradient)?;
    let dims = scalar.dims();
    let recip = reciprocal_spacings(scalar.spacing());
    let values = scalar.as_slice();

    par_fill_points(gradient.as_mut_slice(), dims, |s| {
        DVec3::new(
            first_derivative(values, s, 0, recip.x),
            first_derivative(values, s, 1, recip.y),
            first_derivative(values, s, 2, recip.z),
        )
    });
    Ok(())
}

/// Derivative along one axis using only valid neighbors.
#[inline]
fn conditional_derivative(values: &[f64], stencil: &Stencil, axis: usize, recip: f64) -> f64 {
    let here = values[stencil.center()];
    let neighbor = |step: isize| {
        if stencil.in_bounds(axis, step) {
            Some(values[stencil.offset(axis, step)]).filter(|v| !v.is_nan())
        } else {
            None
        }
    };

    match (neighbor(-1), neighbor(1)) {
        (Some(minus), Some(plus)) => (plus - minus) * (0.5 * recip),
        (Some(minus), None) => (here - minus) * recip,
        (None, Some(plus)) => (plus - here) * recip,
        (None, None) => INVALID_VALUE,
    }
}

/// Gradient of a field whose samples may be `INVALID_VALUE`.
///
/// Per axis, picks centered differences when both neighbors are valid,
/// one-sided when only one is, and writes `INVALID_VALUE` when neither is.
/// An invalid sample gets an invalid gradient on every axis.
///
/// Only points with index >= 1 on every axis are written; points on the
/// three lower faces keep whatever `gradient` held before the call.
pub fn compute_gradient_conditionally(
    scalar: &ScalarField,
    gradient: &mut VectorField,
) -> LatticeResult<()> {
    scalar.ensure_shape_matches(gradient)?;
    let dims = scalar.dims();
    let [nx, ny, _] = dims;
    let recip = reciprocal_spacings(scalar.spacing());
    let values = scalar.as_slice();

    gradient
        .as_mut_slice()
        .par_chunks_mut(nx * ny)
        .enumerate()
        .skip(1)
        .for_each(|(iz, plane)| {
            for iy in 1..ny {
                for ix in 1..nx {
                    let s = Stencil::new([ix, iy, iz], dims);
                    plane[ix + nx * iy] = if values[s.center()].is_nan() {
                        DVec3::splat(INVALID_VALUE)
                    } else {
                        DVec3::new(
                            conditional_derivative(values, &s, 0, recip.x),
                            conditional_derivative(values, &s, 1, recip.y),
                            conditional_derivative(values, &s, 2, recip.z),
                        )
                    };
                }
            }
        });
    Ok(())
}
