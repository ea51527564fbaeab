//! Flat-buffer neighbor offsets for axis-aligned finite-difference stencils.
//!
//! A [`Stencil`] pins one lattice point and answers "where is the sample
//! `step` cells away along `axis`" for steps in -2..=2, which covers every
//! centered, one-sided and second-difference stencil in this crate.

use glam::DVec3;
use lattice_types::constants::reciprocal_spacing;
use rayon::prelude::*;

/// Axis strides of an X-fastest lattice: `[1, nx, nx * ny]`.
#[inline]
pub fn strides(dims: [usize; 3]) -> [usize; 3] {
    [1, dims[0], dims[0] * dims[1]]
}

/// Where a point sits along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisPosition {
    /// Only point on this axis.
    Single,
    /// Index 0.
    Lower,
    /// Index n-1.
    Upper,
    Interior,
}

/// Neighbor offsets of one lattice point.
#[derive(Debug, Clone, Copy)]
pub struct Stencil {
    index: [usize; 3],
    dims: [usize; 3],
    strides: [usize; 3],
    center: usize,
}

impl Stencil {
    #[inline]
    pub fn new(index: [usize; 3], dims: [usize; 3]) -> Self {
        let strides = strides(dims);
        let center = index[0] + index[1] * strides[1] + index[2] * strides[2];
        Stencil {
            index,
            dims,
            strides,
            center,
        }
    }

    #[inline]
    pub fn index(&self) -> [usize; 3] {
        self.index
    }

    /// Flat offset of the point itself.
    #[inline]
    pub fn center(&self) -> usize {
        self.center
    }

    /// Flat offset of the point `step` cells along `axis`.
    #[inline]
    pub fn offset(&self, axis: usize, step: isize) -> usize {
        let target = self.index[axis] as isize + step;
        debug_assert!(
            target >= 0 && (target as usize) < self.dims[axis],
            "stencil step {step} on axis {axis} leaves the grid at {:?}",
            self.index
        );
        (self.center as isize + step * self.strides[axis] as isize) as usize
    }

    /// `(minus, plus)` offsets one cell away along `axis`.
    #[inline]
    pub fn pair(&self, axis: usize) -> (usize, usize) {
        (self.offset(axis, -1), self.offset(axis, 1))
    }

    #[inline]
    pub fn position(&self, axis: usize) -> AxisPosition {
        let i = self.index[axis];
        let last = self.dims[axis] - 1;
        if last == 0 {
            AxisPosition::Single
        } else if i == 0 {
            AxisPosition::Lower
        } else if i == last {
            AxisPosition::Upper
        } else {
            AxisPosition::Interior
        }
    }

    #[inline]
    pub fn at_lower(&self, axis: usize) -> bool {
        self.index[axis] == 0
    }

    #[inline]
    pub fn at_upper(&self, axis: usize) -> bool {
        self.index[axis] + 1 == self.dims[axis]
    }

    /// True when `step` along `axis` stays inside the grid.
    #[inline]
    pub fn in_bounds(&self, axis: usize, step: isize) -> bool {
        let target = self.index[axis] as isize + step;
        target >= 0 && (target as usize) < self.dims[axis]
    }

    /// Offset of the point reached by clamping every index into the
    /// interior range `[1, n-2]`. For a boundary point this is the adjacent
    /// interior point (diagonal at edges and corners).
    pub fn clamped_interior(&self) -> usize {
        let mut offset = 0;
        for axis in 0..3 {
            let hi = self.dims[axis].saturating_sub(2).max(1);
            offset += self.index[axis].clamp(1, hi) * self.strides[axis];
        }
        offset
    }
}

/// Per-axis reciprocal spacing, 0 on collapsed axes.
pub fn reciprocal_spacings(spacing: DVec3) -> DVec3 {
    DVec3::new(
        reciprocal_spacing(spacing.x),
        reciprocal_spacing(spacing.y),
        reciprocal_spacing(spacing.z),
    )
}

/// Overwrite every sample of `out` with `f(&stencil)`, one rayon task per z-plane.
pub(crate) fn par_fill_points<T, F>(out: &mut [T], dims: [usize; 3], f: F)
where
    T: Send,
    F: Fn(&Stencil) -> T + Sync,
{
    let [nx, ny, _] = dims;
    out.par_chunks_mut(nx * ny)
        .enumerate()
        .for_each(|(iz, plane)| {
            for iy in 0..ny {
                for ix in 0..nx {
                    plane[ix + nx * iy] = f(&Stencil::new([ix, iy, iz], dims));
                }
            }
        });
}
