// ─────────────────────────────────────────────────────────────────────
// SCPN Lattice Core — Field Types
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use std::ops::{Add, Mul, Sub};

use glam::{DMat3, DVec3};

use crate::grid::UniformGrid;

pub type ScalarField = UniformGrid<f64>;
pub type VectorField = UniformGrid<DVec3>;
/// Per-point 3x3 matrices. For a Jacobian, `m.x_axis` holds d(v)/dx etc.
pub type MatrixField = UniformGrid<DMat3>;

/// Sample types that finite-difference stencils can combine.
pub trait FieldValue:
    Copy
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f64, Output = Self>
    + 'static
{
    const ZERO: Self;

    fn is_finite(&self) -> bool;

    fn magnitude_squared(&self) -> f64;

    fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }
}

impl FieldValue for f64 {
    const ZERO: Self = 0.0;

    #[inline]
    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }

    #[inline]
    fn magnitude_squared(&self) -> f64 {
        self * self
    }
}

impl FieldValue for DVec3 {
    const ZERO: Self = DVec3::ZERO;

    #[inline]
    fn is_finite(&self) -> bool {
        DVec3::is_finite(*self)
    }

    #[inline]
    fn magnitude_squared(&self) -> f64 {
        self.length_squared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_magnitude_is_abs() {
        assert_eq!(FieldValue::magnitude(&-3.0_f64), 3.0);
        assert!(!FieldValue::is_finite(&f64::NAN));
    }

    #[test]
    fn test_vector_magnitude() {
        let v = DVec3::new(3.0, 4.0, 0.0);
        assert_eq!(v.magnitude_squared(), 25.0);
        assert_eq!(FieldValue::magnitude(&v), 5.0);
        assert!(!FieldValue::is_finite(&DVec3::new(0.0, f64::INFINITY, 0.0)));
    }
}
