// ─────────────────────────────────────────────────────────────────────
// SCPN Lattice Core — Poisson Solver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Red-Black Successive Over-Relaxation for the discrete Poisson equation
//!
//!   ∇²u = s
//!
//! on a uniform 3D lattice, for scalar or vector `u`. Each interior point is
//! relaxed toward the 7-point stencil solution
//!
//!   u* = (Σ_a (u[+a] + u[-a]) / h_a² - s) · 0.5 / Σ_a 1/h_a²
//!   u  ← (1 - ω) u + ω u*
//!
//! # Coloring
//!
//! Colors are assigned per row: a row `(iy, iz)` is red when
//! `(iy + iz) % 2 == 0`, black otherwise. The y and z neighbors of a row
//! always have the other color, and x neighbors lie in the row itself, so
//! rows of one color can be relaxed concurrently. The parallel pass splits
//! the solution buffer into rows and hands active rows out as `&mut`,
//! everything else as `&`.
//!
//! # Boundaries
//!
//! Neumann: after the interior pass every boundary sample is overwritten by
//! the interior sample reached by clamping its index into `[1, n-2]`.
//! Dirichlet: boundary samples are never written.

use glam::DVec3;
use lattice_types::config::{BoundaryCondition, PoissonConfig, PoissonTechnique};
use lattice_types::constants::{
    AUTO_ITERATIONS_PER_DIM, MIN_POINTS_SECOND_DERIVATIVE, RELAXATION_RANGE,
};
use lattice_types::error::{LatticeError, LatticeResult};
use lattice_types::field::{FieldValue, VectorField};
use lattice_types::grid::UniformGrid;
use log::{debug, trace, warn};
use rayon::prelude::*;

use crate::stencil::{reciprocal_spacings, Stencil};

/// Which rows one relaxation pass updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaussSeidelColor {
    /// Rows with parity 0.
    Red,
    /// Rows with parity 1.
    Black,
    /// Every interior row, in order. Serial only.
    Both,
}

/// Red/black parity of row `(iy, iz)`. Every point of a row shares it.
#[inline]
pub fn point_parity(iy: usize, iz: usize) -> usize {
    (iy + iz) % 2
}

impl GaussSeidelColor {
    #[inline]
    pub fn updates_row(self, iy: usize, iz: usize) -> bool {
        match self {
            GaussSeidelColor::Red => point_parity(iy, iz) == 0,
            GaussSeidelColor::Black => point_parity(iy, iz) == 1,
            GaussSeidelColor::Both => true,
        }
    }
}

/// Stencil weights and SOR factor, computed once per solve and copied into
/// every worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaxationParams {
    pub omega: f64,
    /// 1/h² per axis, 0 on collapsed axes.
    pub reciprocal_spacing2: DVec3,
    /// 0.5 / Σ 1/h²
    pub half_spacing2_sum: f64,
}

impl RelaxationParams {
    pub fn new(spacing: DVec3, omega: f64) -> LatticeResult<Self> {
        if !RELAXATION_RANGE.contains(&omega) {
            return Err(LatticeError::ConfigError(format!(
                "SOR relaxation must be in [{}, {}), got {omega}",
                RELAXATION_RANGE.start, RELAXATION_RANGE.end
            )));
        }
        let recip = reciprocal_spacings(spacing);
        let reciprocal_spacing2 = recip * recip;
        let sum = reciprocal_spacing2.element_sum();
        if sum <= 0.0 {
            return Err(LatticeError::ConfigError(format!(
                "Every axis is collapsed (spacing {spacing}), Poisson stencil is empty"
            )));
        }
        Ok(RelaxationParams {
            omega,
            reciprocal_spacing2,
            half_spacing2_sum: 0.5 / sum,
        })
    }
}

/// Summary of per-point update magnitudes `|new - old|` of one round.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResidualStats {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// Raw residual sums. Per-worker partials combine with [`merge`](Self::merge).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidualAccumulator {
    sum: f64,
    sum_sq: f64,
    min: f64,
    max: f64,
    count: usize,
}

impl Default for ResidualAccumulator {
    fn default() -> Self {
        ResidualAccumulator {
            sum: 0.0,
            sum_sq: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            count: 0,
        }
    }
}

impl ResidualAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record(&mut self, residual: f64) {
        self.sum += residual;
        self.sum_sq += residual * residual;
        self.min = self.min.min(residual);
        self.max = self.max.max(residual);
        self.count += 1;
    }

    pub fn merge(self, other: Self) -> Self {
        ResidualAccumulator {
            sum: self.sum + other.sum,
            sum_sq: self.sum_sq + other.sum_sq,
            min: self.min.min(other.min),
            max: self.max.max(other.max),
            count: self.count + other.count,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean and standard deviation from the raw sums. All zero when nothing
    /// was recorded.
    pub fn finish(&self) -> ResidualStats {
        if self.count == 0 {
            return ResidualStats::default();
        }
        let n = self.count as f64;
        let mean = self.sum / n;
        let variance = self.sum_sq / n - mean * mean;
        ResidualStats {
            mean,
            std_dev: variance.max(0.0).sqrt(),
            min: self.min,
            max: self.max,
            count: self.count,
        }
    }
}

/// Rows adjacent to one interior row.
struct RowNeighbors<'a, T> {
    y_minus: &'a [T],
    y_plus: &'a [T],
    z_minus: &'a [T],
    z_plus: &'a [T],
}

/// Relax the interior points of one row, left to right.
#[inline]
fn relax_row<T: FieldValue>(
    row: &mut [T],
    neighbors: &RowNeighbors<'_, T>,
    source: &[T],
    params: &RelaxationParams,
    residuals: &mut ResidualAccumulator,
) {
    let rs2 = params.reciprocal_spacing2;
    let keep = 1.0 - params.omega;
    for ix in 1..row.len() - 1 {
        let old = row[ix];
        let target = ((row[ix + 1] + row[ix - 1]) * rs2.x
            + (neighbors.y_plus[ix] + neighbors.y_minus[ix]) * rs2.y
            + (neighbors.z_plus[ix] + neighbors.z_minus[ix]) * rs2.z
            - source[ix])
            * params.half_spacing2_sum;
        let updated = old * keep + target * params.omega;
        debug_assert!(updated.is_finite(), "non-finite SOR update at row offset {ix}");
        residuals.record((updated - old).magnitude());
        row[ix] = updated;
    }
}

/// Relax row `(iy, iz)` reading its neighbors from the same buffer.
fn relax_row_in_place<T: FieldValue>(
    values: &mut [T],
    source: &[T],
    dims: [usize; 3],
    iy: usize,
    iz: usize,
    params: &RelaxationParams,
    residuals: &mut ResidualAccumulator,
) {
    let [nx, ny, _] = dims;
    let row = iy + ny * iz;
    let (before, rest) = values.split_at_mut(row * nx);
    let (current, after) = rest.split_at_mut(nx);
    let neighbors = RowNeighbors {
        y_minus: &before[(row - 1) * nx..row * nx],
        y_plus: &after[..nx],
        z_minus: &before[(row - ny) * nx..(row - ny + 1) * nx],
        z_plus: &after[(ny - 1) * nx..ny * nx],
    };
    relax_row(
        current,
        &neighbors,
        &source[row * nx..(row + 1) * nx],
        params,
        residuals,
    );
}

/// Copy the clamped interior value onto every boundary point of planes
/// `[iz_start, iz_end)`.
fn enforce_neumann<T: Copy>(soln: &mut UniformGrid<T>, iz_start: usize, iz_end: usize) {
    let dims = soln.dims();
    let [nx, ny, nz] = dims;
    let values = soln.as_mut_slice();
    let mut copy = |ix: usize, iy: usize, iz: usize| {
        let s = Stencil::new([ix, iy, iz], dims);
        values[s.center()] = values[s.clamped_interior()];
    };

    for iz in iz_start..iz_end {
        let z_face = iz == 0 || iz == nz - 1;
        for iy in 0..ny {
            if z_face || iy == 0 || iy == ny - 1 {
                for ix in 0..nx {
                    copy(ix, iy, iz);
                }
            } else {
                copy(0, iy, iz);
                copy(nx - 1, iy, iz);
            }
        }
    }
}

fn check_poisson_inputs<T>(soln: &UniformGrid<T>, source: &UniformGrid<T>) -> LatticeResult<()> {
    soln.ensure_shape_matches(source)?;
    soln.ensure_min_points("poisson relaxation", MIN_POINTS_SECOND_DERIVATIVE)
}

/// One relaxation pass over planes `[iz_start, iz_end)`, serially.
///
/// Only interior points are relaxed. With Neumann boundaries the boundary
/// points of the slice are refreshed afterwards; the -Z face belongs to the
/// slice only when `iz_start == 0`, the +Z face only when `iz_end == nz`.
///
/// Returns the raw residual sums of the points it updated.
pub fn step_toward_poisson_solution<T: FieldValue>(
    soln: &mut UniformGrid<T>,
    source: &UniformGrid<T>,
    iz_start: usize,
    iz_end: usize,
    color: GaussSeidelColor,
    boundary_condition: BoundaryCondition,
    params: &RelaxationParams,
) -> LatticeResult<ResidualAccumulator> {
    check_poisson_inputs(soln, source)?;
    let dims = soln.dims();
    let [_, ny, nz] = dims;
    if iz_start > iz_end || iz_end > nz {
        return Err(LatticeError::InvalidSlice {
            start: iz_start,
            end: iz_end,
            num_z: nz,
        });
    }

    let mut residuals = ResidualAccumulator::new();
    let src = source.as_slice();
    let values = soln.as_mut_slice();
    for iz in iz_start.max(1)..iz_end.min(nz - 1) {
        for iy in 1..ny - 1 {
            if color.updates_row(iy, iz) {
                relax_row_in_place(values, src, dims, iy, iz, params, &mut residuals);
            }
        }
    }

    if boundary_condition == BoundaryCondition::Neumann {
        enforce_neumann(soln, iz_start, iz_end);
    }
    Ok(residuals)
}

/// Row tables of the parallel color pass. Empty between passes; only their
/// allocations carry over, so a solve allocates them once.
struct RowTables<T: 'static> {
    active: Vec<(usize, &'static mut [T])>,
    shared: Vec<&'static [T]>,
}

impl<T: 'static> RowTables<T> {
    fn new() -> Self {
        RowTables {
            active: Vec::new(),
            shared: Vec::new(),
        }
    }
}

/// Empty `rows` and hand its allocation to a vector of another element type.
/// The buffer is reused in place when both types share a layout, which is
/// the case for row slices of different borrow lifetimes.
fn recycle<R, S>(mut rows: Vec<R>) -> Vec<S> {
    rows.clear();
    rows.into_iter().filter_map(|_| None).collect()
}

/// Relax every interior row of one color on the rayon pool.
///
/// Rows of `color` are borrowed mutably, all other rows shared. Slab grain
/// is `max(1, nz / threads)` planes.
fn relax_color_parallel<T: FieldValue>(
    soln: &mut UniformGrid<T>,
    source: &UniformGrid<T>,
    color: GaussSeidelColor,
    params: RelaxationParams,
    tables: &mut RowTables<T>,
) -> ResidualAccumulator {
    debug_assert!(color != GaussSeidelColor::Both);
    let [nx, ny, nz] = soln.dims();
    let src = source.as_slice();

    let mut active: Vec<(usize, &mut [T])> = recycle(std::mem::take(&mut tables.active));
    let mut shared: Vec<&[T]> = recycle(std::mem::take(&mut tables.shared));
    active.reserve(ny * nz / 2);
    shared.reserve(ny * nz);
    for (row, values) in soln.as_mut_slice().chunks_mut(nx).enumerate() {
        let (iy, iz) = (row % ny, row / ny);
        let interior = iy > 0 && iy < ny - 1 && iz > 0 && iz < nz - 1;
        if interior && color.updates_row(iy, iz) {
            active.push((row, values));
            shared.push(&[]);
        } else {
            shared.push(values);
        }
    }

    let slab_planes = (nz / rayon::current_num_threads()).max(1);
    let rows_per_task = (slab_planes * ny / 2).max(1);
    let rows = &shared;

    let residuals = active
        .par_drain(..)
        .with_min_len(rows_per_task)
        .fold(ResidualAccumulator::new, |mut residuals, (row, values)| {
            let neighbors = RowNeighbors {
                y_minus: rows[row - 1],
                y_plus: rows[row + 1],
                z_minus: rows[row - ny],
                z_plus: rows[row + ny],
            };
            relax_row(
                values,
                &neighbors,
                &src[row * nx..(row + 1) * nx],
                &params,
                &mut residuals,
            );
            residuals
        })
        .reduce(ResidualAccumulator::new, ResidualAccumulator::merge);

    tables.active = recycle(active);
    tables.shared = recycle(shared);
    residuals
}

/// One color pass over the whole grid. Parallel when row tables are given,
/// serial otherwise.
fn relax_color<T: FieldValue>(
    soln: &mut UniformGrid<T>,
    source: &UniformGrid<T>,
    color: GaussSeidelColor,
    boundary_condition: BoundaryCondition,
    params: &RelaxationParams,
    tables: Option<&mut RowTables<T>>,
) -> LatticeResult<ResidualAccumulator> {
    let nz = soln.num_points(2);
    let Some(tables) = tables else {
        return step_toward_poisson_solution(
            soln,
            source,
            0,
            nz,
            color,
            boundary_condition,
            params,
        );
    };
    let residuals = relax_color_parallel(soln, source, color, *params, tables);
    if boundary_condition == BoundaryCondition::Neumann {
        enforce_neumann(soln, 0, nz);
    }
    Ok(residuals)
}

/// Solver rounds: `max_iterations`, or `2 * max_dim` when it is 0.
pub fn iteration_budget(max_iterations: usize, max_dim: usize) -> usize {
    if max_iterations == 0 {
        AUTO_ITERATIONS_PER_DIM * max_dim
    } else {
        max_iterations
    }
}

/// Relax `soln` toward `∇²soln = source` for a fixed number of rounds.
///
/// `soln` is the initial guess and is never reset. There is no early exit.
/// Returns the residual stats of the last round. For red-black that is the
/// red and black passes merged, so `count` covers every interior point
/// rather than only the rows of the final color.
pub fn solve_poisson<T: FieldValue>(
    soln: &mut UniformGrid<T>,
    source: &UniformGrid<T>,
    config: &PoissonConfig,
) -> LatticeResult<ResidualStats> {
    config.validate()?;
    check_poisson_inputs(soln, source)?;
    let params = RelaxationParams::new(soln.spacing(), config.relaxation)?;
    let rounds = iteration_budget(config.max_iterations, soln.max_dim());
    let nz = soln.num_points(2);
    let bc = config.boundary_condition;

    let mut tables = config.parallel.then(RowTables::new);
    let mut last = ResidualAccumulator::new();
    let mut warned = false;
    for round in 1..=rounds {
        let residuals = match config.technique {
            PoissonTechnique::RedBlack => {
                let red = relax_color(
                    soln,
                    source,
                    GaussSeidelColor::Red,
                    bc,
                    &params,
                    tables.as_mut(),
                )?;
                let black = relax_color(
                    soln,
                    source,
                    GaussSeidelColor::Black,
                    bc,
                    &params,
                    tables.as_mut(),
                )?;
                red.merge(black)
            }
            PoissonTechnique::GaussSeidel => step_toward_poisson_solution(
                soln,
                source,
                0,
                nz,
                GaussSeidelColor::Both,
                bc,
                &params,
            )?,
        };

        let stats = residuals.finish();
        trace!(
            "Poisson round {round}/{rounds}: residual mean={:.3e} max={:.3e}",
            stats.mean,
            stats.max
        );
        if !warned && !(stats.mean.is_finite() && stats.max.is_finite()) {
            warn!("Poisson residual became non-finite at round {round}");
            warned = true;
        }
        last = residuals;
    }

    let stats = last.finish();
    debug!(
        "Poisson solve {:?}: {rounds} rounds, {:?} boundaries, \
         residual mean={:.3e} std={:.3e} max={:.3e}",
        soln.dims(),
        bc,
        stats.mean,
        stats.std_dev,
        stats.max
    );
    Ok(stats)
}

/// Solve the vector Poisson equation with default settings: parallel
/// red-black SOR, ω = 1.72. `num_steps == 0` picks `2 * max_dim` rounds.
///
/// The returned stats merge both color passes of the final round, not just
/// the black pass.
pub fn solve_vector_poisson(
    soln: &mut VectorField,
    source: &VectorField,
    num_steps: usize,
    boundary_condition: BoundaryCondition,
) -> LatticeResult<ResidualStats> {
    let config = PoissonConfig::default()
        .with_max_iterations(num_steps)
        .with_boundary_condition(boundary_condition);
    solve_poisson(soln, source, &config)
}
