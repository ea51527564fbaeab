//! Finite-difference operators and Poisson relaxation for SCPN Lattice Core.

pub mod gradient;
pub mod jacobian;
pub mod laplacian;
pub mod multigrid;
pub mod poisson;
pub mod statistics;
pub mod stencil;

pub use gradient::{compute_gradient, compute_gradient_conditionally};
pub use jacobian::{compute_curl_from_jacobian, compute_jacobian};
pub use laplacian::compute_laplacian;
pub use multigrid::solve_poisson_multigrid;
pub use poisson::{
    solve_poisson, solve_vector_poisson, step_toward_poisson_solution, GaussSeidelColor,
    ResidualStats,
};
pub use statistics::{find_magnitude_range, find_matrix_range, find_value_range, find_value_stats};
