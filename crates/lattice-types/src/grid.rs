// ─────────────────────────────────────────────────────────────────────
// SCPN Lattice Core — Uniform Grid
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Dense uniform 3D lattice of samples.
//!
//! Storage is row-major with X fastest, then Y, then Z:
//!   offset = x + nx * y + nx * ny * z
//! The ndarray views use `[z, y, x]` indexing so their standard layout
//! matches the flat buffer exactly.

use std::ops::{Index, IndexMut};

use glam::DVec3;
use ndarray::{Array3, ArrayView3};

use crate::error::{LatticeError, LatticeResult};

/// Uniformly spaced 3D grid of samples of type `T`.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformGrid<T> {
    dims: [usize; 3],
    spacing: DVec3,
    values: Vec<T>,
}

fn validate_geometry(dims: [usize; 3], spacing: DVec3) -> LatticeResult<()> {
    if dims.iter().any(|&n| n == 0) {
        return Err(LatticeError::ConfigError(format!(
            "Grid needs at least one point per axis, got {dims:?}"
        )));
    }
    if !spacing.is_finite() || spacing.min_element() < 0.0 {
        return Err(LatticeError::ConfigError(format!(
            "Cell spacing must be finite and >= 0, got {spacing}"
        )));
    }
    Ok(())
}

impl<T: Clone> UniformGrid<T> {
    /// Allocate a grid with every sample set to `fill`.
    pub fn new(dims: [usize; 3], spacing: DVec3, fill: T) -> LatticeResult<Self> {
        validate_geometry(dims, spacing)?;
        Ok(UniformGrid {
            dims,
            spacing,
            values: vec![fill; dims[0] * dims[1] * dims[2]],
        })
    }

    /// Allocate a grid with the same dims and spacing as `other`.
    pub fn with_shape_of<U>(other: &UniformGrid<U>, fill: T) -> Self {
        UniformGrid {
            dims: other.dims,
            spacing: other.spacing,
            values: vec![fill; other.len()],
        }
    }

    /// Build from an ndarray indexed `[z, y, x]`.
    pub fn from_array(array: &Array3<T>, spacing: DVec3) -> LatticeResult<Self> {
        let (nz, ny, nx) = array.dim();
        let dims = [nx, ny, nz];
        validate_geometry(dims, spacing)?;
        Ok(UniformGrid {
            dims,
            spacing,
            values: array.iter().cloned().collect(),
        })
    }

    /// Copy into an owned ndarray indexed `[z, y, x]`.
    pub fn to_array(&self) -> LatticeResult<Array3<T>> {
        let [nx, ny, nz] = self.dims;
        Ok(Array3::from_shape_vec((nz, ny, nx), self.values.clone())?)
    }

    pub fn fill(&mut self, value: T) {
        self.values.fill(value);
    }
}

impl<T> UniformGrid<T> {
    /// Allocate a grid whose samples are produced by `f([ix, iy, iz])`.
    pub fn from_fn<F>(dims: [usize; 3], spacing: DVec3, mut f: F) -> LatticeResult<Self>
    where
        F: FnMut([usize; 3]) -> T,
    {
        validate_geometry(dims, spacing)?;
        let mut values = Vec::with_capacity(dims[0] * dims[1] * dims[2]);
        for iz in 0..dims[2] {
            for iy in 0..dims[1] {
                for ix in 0..dims[0] {
                    values.push(f([ix, iy, iz]));
                }
            }
        }
        Ok(UniformGrid {
            dims,
            spacing,
            values,
        })
    }

    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    #[inline]
    pub fn num_points(&self, axis: usize) -> usize {
        self.dims[axis]
    }

    /// Largest point count over the three axes.
    pub fn max_dim(&self) -> usize {
        self.dims[0].max(self.dims[1]).max(self.dims[2])
    }

    #[inline]
    pub fn spacing(&self) -> DVec3 {
        self.spacing
    }

    /// Number of samples stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false: construction rejects empty axes.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of lattice points the dims describe.
    #[inline]
    pub fn grid_capacity(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Points per z-plane.
    #[inline]
    pub fn plane_len(&self) -> usize {
        self.dims[0] * self.dims[1]
    }

    #[inline]
    pub fn offset(&self, ix: usize, iy: usize, iz: usize) -> usize {
        debug_assert!(ix < self.dims[0] && iy < self.dims[1] && iz < self.dims[2]);
        ix + self.dims[0] * (iy + self.dims[1] * iz)
    }

    #[inline]
    pub fn offset_of(&self, index: [usize; 3]) -> usize {
        self.offset(index[0], index[1], index[2])
    }

    /// Inverse of [`UniformGrid::offset`].
    pub fn indices(&self, offset: usize) -> [usize; 3] {
        let plane = self.plane_len();
        let iz = offset / plane;
        let rem = offset - iz * plane;
        let iy = rem / self.dims[0];
        [rem - iy * self.dims[0], iy, iz]
    }

    /// True when the point lies on one of the six faces.
    pub fn is_boundary(&self, index: [usize; 3]) -> bool {
        (0..3).any(|axis| index[axis] == 0 || index[axis] + 1 == self.dims[axis])
    }

    pub fn shape_matches<U>(&self, other: &UniformGrid<U>) -> bool {
        self.dims == other.dims
    }

    /// Error unless `other` has the same dims.
    pub fn ensure_shape_matches<U>(&self, other: &UniformGrid<U>) -> LatticeResult<()> {
        if self.shape_matches(other) {
            Ok(())
        } else {
            Err(LatticeError::ShapeMismatch {
                expected: self.dims,
                found: other.dims,
            })
        }
    }

    /// Error unless every axis has at least `minimum` points.
    pub fn ensure_min_points(&self, operation: &'static str, minimum: usize) -> LatticeResult<()> {
        if self.dims.iter().all(|&n| n >= minimum) {
            Ok(())
        } else {
            Err(LatticeError::GridTooSmall {
                operation,
                minimum,
                dims: self.dims,
            })
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.values
    }

    pub fn get(&self, index: [usize; 3]) -> Option<&T> {
        if (0..3).all(|axis| index[axis] < self.dims[axis]) {
            self.values.get(self.offset_of(index))
        } else {
            None
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    /// Borrow as an ndarray view indexed `[z, y, x]`.
    pub fn view(&self) -> LatticeResult<ArrayView3<'_, T>> {
        let [nx, ny, nz] = self.dims;
        Ok(ArrayView3::from_shape((nz, ny, nx), &self.values)?)
    }
}

impl<T> Index<usize> for UniformGrid<T> {
    type Output = T;

    #[inline]
    fn index(&self, offset: usize) -> &T {
        &self.values[offset]
    }
}

impl<T> IndexMut<usize> for UniformGrid<T> {
    #[inline]
    fn index_mut(&mut self, offset: usize) -> &mut T {
        &mut self.values[offset]
    }
}
