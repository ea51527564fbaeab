// ─────────────────────────────────────────────────────────────────────
// SCPN Lattice Core — Multigrid Cascade
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Nested-grid warm start for the Poisson solver.
//!
//! Implements a single V-shaped cascade with:
//! - **Restriction**: injection (cluster min corner) or 2×2×2 averaging
//! - **Interpolation**: trilinear from coarse to fine, interior only, so
//!   boundary values of each finer level survive
//! - **Smoother**: a fixed number of red-black SOR rounds per level visit
//!   (from [`crate::poisson`])
//!
//! Each coarser level halves the cell count per axis, `(n - 1) / 2 + 1`
//! points, and doubles the spacing. Coarse point `c` sits on fine point
//! `2c`. Grids with `n = 2^k + 1` points nest exactly.

use lattice_types::config::{MultigridConfig, PoissonConfig, Restriction};
use lattice_types::error::{LatticeError, LatticeResult};
use lattice_types::field::FieldValue;
use lattice_types::grid::UniformGrid;
use log::debug;
use rayon::prelude::*;

use crate::poisson::{solve_poisson, ResidualStats};
use crate::stencil::{par_fill_points, Stencil};

/// Which fine points [`interpolate_into`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Skip the outermost layer.
    InteriorOnly,
    EntireDomain,
}

/// Point counts of the next coarser level.
pub fn coarsened_dims(dims: [usize; 3]) -> [usize; 3] {
    dims.map(|n| (n - 1) / 2 + 1)
}

fn ensure_nested(fine: [usize; 3], coarse: [usize; 3]) -> LatticeResult<()> {
    let expected = coarsened_dims(fine);
    if coarse == expected {
        Ok(())
    } else {
        Err(LatticeError::ShapeMismatch {
            expected,
            found: coarse,
        })
    }
}

/// Fill `coarse` from `fine`. `coarse` must have [`coarsened_dims`] of `fine`.
pub fn restrict_into<T: FieldValue>(
    fine: &UniformGrid<T>,
    coarse: &mut UniformGrid<T>,
    restriction: Restriction,
) -> LatticeResult<()> {
    let fine_dims = fine.dims();
    let coarse_dims = coarse.dims();
    ensure_nested(fine_dims, coarse_dims)?;
    let values = fine.as_slice();

    par_fill_points(coarse.as_mut_slice(), coarse_dims, |s| {
        let corner = s.index().map(|c| 2 * c);
        match restriction {
            Restriction::Injection => values[fine.offset_of(corner)],
            Restriction::Average => {
                let mut sum = T::ZERO;
                let mut count = 0usize;
                for iz in corner[2]..(corner[2] + 2).min(fine_dims[2]) {
                    for iy in corner[1]..(corner[1] + 2).min(fine_dims[1]) {
                        for ix in corner[0]..(corner[0] + 2).min(fine_dims[0]) {
                            sum = sum + values[fine.offset(ix, iy, iz)];
                            count += 1;
                        }
                    }
                }
                sum * (1.0 / count as f64)
            }
        }
    });
    Ok(())
}

/// Bracketing coarse indices and weight for fine index `i` on one axis.
#[inline]
fn axis_bracket(i: usize, coarse_n: usize) -> (usize, usize, f64) {
    if coarse_n == 1 {
        return (0, 0, 0.0);
    }
    let lo = (i / 2).min(coarse_n - 2);
    let t = (0.5 * i as f64 - lo as f64).min(1.0);
    (lo, lo + 1, t)
}

fn trilinear<T: FieldValue>(values: &[T], dims: [usize; 3], fine_index: [usize; 3]) -> T {
    let (x0, x1, tx) = axis_bracket(fine_index[0], dims[0]);
    let (y0, y1, ty) = axis_bracket(fine_index[1], dims[1]);
    let (z0, z1, tz) = axis_bracket(fine_index[2], dims[2]);
    let at = |x: usize, y: usize, z: usize| values[x + dims[0] * (y + dims[1] * z)];
    let lerp = |a: T, b: T, t: f64| a * (1.0 - t) + b * t;

    let c00 = lerp(at(x0, y0, z0), at(x1, y0, z0), tx);
    let c10 = lerp(at(x0, y1, z0), at(x1, y1, z0), tx);
    let c01 = lerp(at(x0, y0, z1), at(x1, y0, z1), tx);
    let c11 = lerp(at(x0, y1, z1), at(x1, y1, z1), tx);
    lerp(lerp(c00, c10, ty), lerp(c01, c11, ty), tz)
}

/// Overwrite points of `fine` with trilinear samples of `coarse`.
pub fn interpolate_into<T: FieldValue>(
    coarse: &UniformGrid<T>,
    fine: &mut UniformGrid<T>,
    region: Region,
) -> LatticeResult<()> {
    let fine_dims = fine.dims();
    let coarse_dims = coarse.dims();
    ensure_nested(fine_dims, coarse_dims)?;
    let values = coarse.as_slice();
    let [nx, ny, _] = fine_dims;

    fine.as_mut_slice()
        .par_chunks_mut(nx * ny)
        .enumerate()
        .for_each(|(iz, plane)| {
            for iy in 0..ny {
                for ix in 0..nx {
                    let s = Stencil::new([ix, iy, iz], fine_dims);
                    let boundary = (0..3).any(|a| s.at_lower(a) || s.at_upper(a));
                    if region == Region::InteriorOnly && boundary {
                        continue;
                    }
                    plane[ix + nx * iy] = trilinear(values, coarse_dims, s.index());
                }
            }
        });
    Ok(())
}

/// Stack of progressively coarser grids. Level 0 is the finest.
#[derive(Debug, Clone)]
pub struct NestedGrid<T> {
    levels: Vec<UniformGrid<T>>,
}

impl<T: FieldValue> NestedGrid<T> {
    /// Take `finest` as level 0 and allocate zero-filled coarser levels until
    /// the next one would have fewer than `min_points` on some axis.
    pub fn from_finest(finest: UniformGrid<T>, min_points: usize) -> LatticeResult<Self> {
        let mut levels = vec![finest];
        while let Some(last) = levels.last() {
            let dims = coarsened_dims(last.dims());
            if dims == last.dims() || dims.iter().any(|&n| n < min_points) {
                break;
            }
            let coarse = UniformGrid::new(dims, last.spacing() * 2.0, T::ZERO)?;
            levels.push(coarse);
        }
        Ok(NestedGrid { levels })
    }

    /// Number of levels, at least 1.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn level(&self, index: usize) -> &UniformGrid<T> {
        &self.levels[index]
    }

    pub fn level_mut(&mut self, index: usize) -> &mut UniformGrid<T> {
        &mut self.levels[index]
    }

    pub fn into_finest(self) -> UniformGrid<T> {
        let mut levels = self.levels;
        levels.truncate(1);
        levels.swap_remove(0)
    }

    /// Restrict level `parent` into level `parent + 1`.
    pub fn restrict_level(&mut self, parent: usize, restriction: Restriction) -> LatticeResult<()> {
        let (fine, coarse) = self.levels.split_at_mut(parent + 1);
        restrict_into(&fine[parent], &mut coarse[0], restriction)
    }

    /// Interpolate level `coarse` into level `coarse - 1`.
    pub fn interpolate_level(&mut self, coarse: usize, region: Region) -> LatticeResult<()> {
        let (fine, rest) = self.levels.split_at_mut(coarse);
        interpolate_into(&rest[0], &mut fine[coarse - 1], region)
    }
}

/// Warm-started Poisson solve over a nested-grid cascade.
///
/// Runs `steps_per_level` rounds on the finest level, restricts source and
/// solution down to the coarsest level solving at each, then interpolates
/// back up (interior only) solving at each finer level. Returns the residual
/// stats of the last finest-level solve.
pub fn solve_poisson_multigrid<T: FieldValue>(
    soln: &mut UniformGrid<T>,
    source: &UniformGrid<T>,
    config: &MultigridConfig,
) -> LatticeResult<ResidualStats> {
    config.validate()?;
    soln.ensure_shape_matches(source)?;
    let level_config = PoissonConfig {
        max_iterations: config.steps_per_level,
        ..config.poisson.clone()
    };

    let mut solns = NestedGrid::from_finest(soln.clone(), config.min_points)?;
    let mut sources = NestedGrid::from_finest(source.clone(), config.min_points)?;
    let depth = solns.depth();

    let mut stats = solve_poisson(solns.level_mut(0), sources.level(0), &level_config)?;
    if depth == 1 {
        *soln = solns.into_finest();
        return Ok(stats);
    }

    for level in 1..depth {
        sources.restrict_level(level - 1, config.restriction)?;
        solns.restrict_level(level - 1, config.restriction)?;
        let s = solve_poisson(solns.level_mut(level), sources.level(level), &level_config)?;
        debug!(
            "Multigrid down: level {level} {:?}, residual mean={:.3e}",
            solns.level(level).dims(),
            s.mean
        );
    }

    for level in (1..depth).rev() {
        solns.interpolate_level(level, Region::InteriorOnly)?;
        stats = solve_poisson(
            solns.level_mut(level - 1),
            sources.level(level - 1),
            &level_config,
        )?;
        debug!(
            "Multigrid up: level {} {:?}, residual mean={:.3e}",
            level - 1,
            solns.level(level - 1).dims(),
            stats.mean
        );
    }

    *soln = solns.into_finest();
    Ok(stats)
}
