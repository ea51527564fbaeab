// ─────────────────────────────────────────────────────────────────────
// SCPN Lattice Core — Jacobian & Curl
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Spatial derivatives of vector fields.
//!
//! The Jacobian at each point is stored column-wise: `j.x_axis` is
//! d(v)/dx, `j.y_axis` is d(v)/dy, `j.z_axis` is d(v)/dz. Component
//! `j.a.b` is therefore d(v_b)/d(a).

use glam::{DMat3, DVec3};
use lattice_types::error::LatticeResult;
use lattice_types::field::{MatrixField, VectorField};
use rayon::prelude::*;

use crate::gradient::first_derivative;
use crate::stencil::{par_fill_points, reciprocal_spacings};

/// Overwrite `jacobian` with the spatial derivative of `vector`.
///
/// Same stencil policy as [`crate::gradient::compute_gradient`], applied to
/// all three components at once.
pub fn compute_jacobian(vector: &VectorField, jacobian: &mut MatrixField) -> LatticeResult<()> {
    vector.ensure_shape_matches(jacobian)?;
    let dims = vector.dims();
    let recip = reciprocal_spacings(vector.spacing());
    let values = vector.as_slice();

    par_fill_points(jacobian.as_mut_slice(), dims, |s| {
        DMat3::from_cols(
            first_derivative(values, s, 0, recip.x),
            first_derivative(values, s, 1, recip.y),
            first_derivative(values, s, 2, recip.z),
        )
    });
    Ok(())
}

/// Curl from the antisymmetric part of one Jacobian.
#[inline]
pub fn curl_of(j: &DMat3) -> DVec3 {
    DVec3::new(
        j.y_axis.z - j.z_axis.y,
        j.z_axis.x - j.x_axis.z,
        j.x_axis.y - j.y_axis.x,
    )
}

/// Overwrite `curl` with the pointwise curl of a Jacobian field.
pub fn compute_curl_from_jacobian(
    jacobian: &MatrixField,
    curl: &mut VectorField,
) -> LatticeResult<()> {
    jacobian.ensure_shape_matches(curl)?;
    curl.as_mut_slice()
        .par_iter_mut()
        .zip(jacobian.as_slice().par_iter())
        .for_each(|(c, j)| *c = curl_of(j));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_types::error::LatticeError;

    fn position(index: [usize; 3], spacing: DVec3) -> DVec3 {
        DVec3::new(index[0] as f64, index[1] as f64, index[2] as f64) * spacing
    }

    #[test]
    fn test_jacobian_of_diagonal_stretch() {
        let spacing = DVec3::new(0.5, 0.25, 1.0);
        let vector = VectorField::from_fn([4, 5, 6], spacing, |i| {
            position(i, spacing) * DVec3::new(1.0, 2.0, 3.0)
        })
        .unwrap();
        let mut jac = MatrixField::with_shape_of(&vector, DMat3::ZERO);
        compute_jacobian(&vector, &mut jac).unwrap();

        let expected = DMat3::from_diagonal(DVec3::new(1.0, 2.0, 3.0));
        for j in jac.iter() {
            assert!(j.abs_diff_eq(expected, 1e-10), "jacobian {j} != {expected}");
        }
    }

    #[test]
    fn test_jacobian_component_layout() {
        // v = (0, x, 0): only dv_y/dx is non-zero, stored at x_axis.y
        let vector = VectorField::from_fn([4, 4, 4], DVec3::ONE, |[x, _, _]| {
            DVec3::new(0.0, x as f64, 0.0)
        })
        .unwrap();
        let mut jac = MatrixField::with_shape_of(&vector, DMat3::ZERO);
        compute_jacobian(&vector, &mut jac).unwrap();

        let j = jac[vector.offset(1, 2, 2)];
        assert_eq!(j.x_axis, DVec3::new(0.0, 1.0, 0.0));
        assert_eq!(j.y_axis, DVec3::ZERO);
        assert_eq!(j.z_axis, DVec3::ZERO);
    }

    #[test]
    fn test_curl_of_rigid_rotation_is_twice_omega() {
        let omega = DVec3::new(0.3, -1.2, 2.0);
        let spacing = DVec3::new(0.1, 0.2, 0.15);
        let center = DVec3::new(0.3, 0.4, 0.3);
        let vector = VectorField::from_fn([7, 5, 6], spacing, |i| {
            omega.cross(position(i, spacing) - center)
        })
        .unwrap();

        let mut jac = MatrixField::with_shape_of(&vector, DMat3::ZERO);
        compute_jacobian(&vector, &mut jac).unwrap();
        let mut curl = VectorField::with_shape_of(&vector, DVec3::ZERO);
        compute_curl_from_jacobian(&jac, &mut curl).unwrap();

        for offset in 0..curl.len() {
            let c = curl[offset];
            assert!(
                (c - 2.0 * omega).length() < 1e-9,
                "curl {c} at {:?} != {}",
                curl.indices(offset),
                2.0 * omega
            );
        }
    }

    #[test]
    fn test_curl_of_symmetric_jacobian_vanishes() {
        let j = DMat3::from_cols(
            DVec3::new(1.0, 2.0, 3.0),
            DVec3::new(2.0, 5.0, 6.0),
            DVec3::new(3.0, 6.0, 9.0),
        );
        assert_eq!(curl_of(&j), DVec3::ZERO);
    }

    #[test]
    fn test_curl_shape_mismatch() {
        let jac = MatrixField::new([3, 3, 3], DVec3::ONE, DMat3::ZERO).unwrap();
        let mut curl = VectorField::new([3, 3, 2], DVec3::ONE, DVec3::ZERO).unwrap();
        assert!(matches!(
            compute_curl_from_jacobian(&jac, &mut curl),
            Err(LatticeError::ShapeMismatch { .. })
        ));
    }
}
