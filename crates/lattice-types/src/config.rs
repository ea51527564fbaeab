// ─────────────────────────────────────────────────────────────────────
// SCPN Lattice Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MULTIGRID_STEPS, DEFAULT_RELAXATION, RELAXATION_RANGE};
use crate::error::{LatticeError, LatticeResult};

/// Which kind of boundary condition the Poisson solver enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryCondition {
    /// Zero normal derivative: boundary copies the adjacent interior value.
    #[default]
    Neumann,
    /// Caller-supplied boundary values, never overwritten.
    Dirichlet,
}

/// How one solver round visits the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoissonTechnique {
    /// Red pass then black pass. Parallelizes per color.
    #[default]
    RedBlack,
    /// Classic lexicographic Gauss-Seidel, one pass over every point. Serial only.
    GaussSeidel,
}

/// How a coarser multigrid level samples its finer parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Restriction {
    /// Copy the sample at the min corner of each cluster. Faster, less accurate.
    #[default]
    Injection,
    /// Average the fine samples of each cluster.
    Average,
}

/// Vector-Poisson solver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoissonConfig {
    /// SOR factor in [1, 2). Default 1.72.
    #[serde(default = "default_relaxation")]
    pub relaxation: f64,
    /// Solver rounds. 0 picks 2 * max(dims).
    #[serde(default)]
    pub max_iterations: usize,
    #[serde(default)]
    pub boundary_condition: BoundaryCondition,
    #[serde(default)]
    pub technique: PoissonTechnique,
    /// Split each color pass across the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_relaxation() -> f64 {
    DEFAULT_RELAXATION
}
fn default_parallel() -> bool {
    true
}
fn default_steps_per_level() -> usize {
    DEFAULT_MULTIGRID_STEPS
}
fn default_min_points() -> usize {
    3
}

impl Default for PoissonConfig {
    fn default() -> Self {
        PoissonConfig {
            relaxation: default_relaxation(),
            max_iterations: 0,
            boundary_condition: BoundaryCondition::default(),
            technique: PoissonTechnique::default(),
            parallel: default_parallel(),
        }
    }
}

impl PoissonConfig {
    pub fn with_boundary_condition(mut self, boundary_condition: BoundaryCondition) -> Self {
        self.boundary_condition = boundary_condition;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn validate(&self) -> LatticeResult<()> {
        if !RELAXATION_RANGE.contains(&self.relaxation) {
            return Err(LatticeError::ConfigError(format!(
                "SOR relaxation must be in [{}, {}), got {}",
                RELAXATION_RANGE.start, RELAXATION_RANGE.end, self.relaxation
            )));
        }
        if self.parallel && self.technique == PoissonTechnique::GaussSeidel {
            return Err(LatticeError::ConfigError(
                "Lexicographic Gauss-Seidel cannot run in parallel; use red_black".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &str) -> LatticeResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}

/// Nested-grid warm start settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultigridConfig {
    /// Solver settings used on every level. `max_iterations` is ignored.
    #[serde(default)]
    pub poisson: PoissonConfig,
    /// Solver rounds per level visit (default: 16)
    #[serde(default = "default_steps_per_level")]
    pub steps_per_level: usize,
    /// Coarsening stops before a level with fewer points on some axis (default: 3)
    #[serde(default = "default_min_points")]
    pub min_points: usize,
    #[serde(default)]
    pub restriction: Restriction,
}

impl Default for MultigridConfig {
    fn default() -> Self {
        MultigridConfig {
            poisson: PoissonConfig::default(),
            steps_per_level: default_steps_per_level(),
            min_points: default_min_points(),
            restriction: Restriction::default(),
        }
    }
}

impl MultigridConfig {
    pub fn validate(&self) -> LatticeResult<()> {
        self.poisson.validate()?;
        if self.steps_per_level == 0 {
            return Err(LatticeError::ConfigError(
                "steps_per_level must be > 0".to_string(),
            ));
        }
        if self.min_points < 3 {
            return Err(LatticeError::ConfigError(format!(
                "min_points must be >= 3, got {}",
                self.min_points
            )));
        }
        Ok(())
    }

    pub fn from_file(path: &str) -> LatticeResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}
