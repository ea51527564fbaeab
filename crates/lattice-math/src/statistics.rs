//! Range and moment reductions over lattice fields.

use glam::{DMat3, DVec3};
use lattice_types::field::{FieldValue, MatrixField, ScalarField};
use lattice_types::grid::UniformGrid;

/// Min, max, mean and standard deviation of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

/// `(min, max)` of a scalar field.
pub fn find_value_range(field: &ScalarField) -> (f64, f64) {
    field
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

pub fn find_value_stats(field: &ScalarField) -> ValueStats {
    let (min, max) = find_value_range(field);
    let n = field.len() as f64;
    let (sum, sum_sq) = field
        .iter()
        .fold((0.0, 0.0), |(s, s2), &v| (s + v, s2 + v * v));
    let mean = sum / n;
    let variance = sum_sq / n - mean * mean;
    ValueStats {
        min,
        max,
        mean,
        std_dev: variance.max(0.0).sqrt(),
    }
}

/// `(min, max)` of the sample magnitudes.
pub fn find_magnitude_range<T: FieldValue>(field: &UniformGrid<T>) -> (f64, f64) {
    let (lo2, hi2) = field
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            let m2 = v.magnitude_squared();
            (lo.min(m2), hi.max(m2))
        });
    (lo2.sqrt(), hi2.sqrt())
}

fn min_cols(a: DMat3, b: &DMat3) -> DMat3 {
    DMat3::from_cols(
        a.x_axis.min(b.x_axis),
        a.y_axis.min(b.y_axis),
        a.z_axis.min(b.z_axis),
    )
}

fn max_cols(a: DMat3, b: &DMat3) -> DMat3 {
    DMat3::from_cols(
        a.x_axis.max(b.x_axis),
        a.y_axis.max(b.y_axis),
        a.z_axis.max(b.z_axis),
    )
}

/// Component-wise `(min, max)` over a matrix field.
pub fn find_matrix_range(field: &MatrixField) -> (DMat3, DMat3) {
    let lo = DMat3::from_cols(DVec3::INFINITY, DVec3::INFINITY, DVec3::INFINITY);
    let hi = DMat3::from_cols(
        DVec3::NEG_INFINITY,
        DVec3::NEG_INFINITY,
        DVec3::NEG_INFINITY,
    );
    field
        .iter()
        .fold((lo, hi), |(lo, hi), m| (min_cols(lo, m), max_cols(hi, m)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_types::field::VectorField;

    #[test]
    fn test_value_range_of_ramp() {
        let field = ScalarField::from_fn([4, 3, 2], DVec3::ONE, |[x, y, z]| {
            (x + 4 * y + 12 * z) as f64
        })
        .unwrap();
        assert_eq!(find_value_range(&field), (0.0, 23.0));
    }

    #[test]
    fn test_value_stats() {
        let field = ScalarField::from_fn([4, 1, 1], DVec3::ONE, |[x, _, _]| x as f64).unwrap();
        let stats = find_value_stats(&field);
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 3.0);
        assert!((stats.mean - 1.5).abs() < 1e-15);
        assert!((stats.std_dev - 1.25f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_constant_field_has_zero_std_dev() {
        let field = ScalarField::new([3, 3, 3], DVec3::ONE, 0.1).unwrap();
        let stats = find_value_stats(&field);
        assert!(stats.std_dev >= 0.0 && stats.std_dev < 1e-8);
    }

    #[test]
    fn test_magnitude_range() {
        let field = VectorField::from_fn([3, 1, 1], DVec3::ONE, |[x, _, _]| {
            DVec3::new(3.0 * x as f64, 4.0 * x as f64, 0.0)
        })
        .unwrap();
        assert_eq!(find_magnitude_range(&field), (0.0, 10.0));
    }

    #[test]
    fn test_matrix_range_componentwise() {
        let field = MatrixField::from_fn([2, 1, 1], DVec3::ONE, |[x, _, _]| {
            if x == 0 {
                DMat3::from_diagonal(DVec3::new(1.0, -2.0, 3.0))
            } else {
                DMat3::from_diagonal(DVec3::new(-1.0, 2.0, 0.5))
            }
        })
        .unwrap();
        let (lo, hi) = find_matrix_range(&field);
        assert_eq!(lo, DMat3::from_diagonal(DVec3::new(-1.0, -2.0, 0.5)));
        assert_eq!(hi, DMat3::from_diagonal(DVec3::new(1.0, 2.0, 3.0)));
    }
}
