//! Error types for hydrodiv

use crate::network::{Comid, Seq};
use thiserror::Error;

/// Main error type for hydrodiv operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("flowline comid {0} is not in the loaded network")]
    UnknownComid(Comid),

    #[error("flowline sequence {0} is not in the loaded network")]
    UnknownSeq(Seq),

    #[error("no unique flowline matches point ({x}, {y}): {candidates} candidate(s)")]
    UnresolvedMatch { x: f64, y: f64, candidates: usize },

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the error only affects the item being processed.
    ///
    /// Unresolved point matches and degenerate geometry are recovered
    /// locally; everything else aborts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::UnresolvedMatch { .. } | Error::DegenerateGeometry(_)
        )
    }
}

/// Result type alias for hydrodiv operations
pub type Result<T> = std::result::Result<T, Error>;
