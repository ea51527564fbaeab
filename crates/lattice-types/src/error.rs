// ─────────────────────────────────────────────────────────────────────
// SCPN Lattice Core — Errors
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LatticeError {
    #[error("Grid shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: [usize; 3],
        found: [usize; 3],
    },

    #[error("{operation} needs at least {minimum} points per axis, grid has {dims:?}")]
    GridTooSmall {
        operation: &'static str,
        minimum: usize,
        dims: [usize; 3],
    },

    #[error("Invalid z-slice [{start}, {end}) for {num_z} planes")]
    InvalidSlice {
        start: usize,
        end: usize,
        num_z: usize,
    },

    #[error("{operation} produced a non-finite value at offset {offset}")]
    NonFinite {
        operation: &'static str,
        offset: usize,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

pub type LatticeResult<T> = Result<T, LatticeError>;
