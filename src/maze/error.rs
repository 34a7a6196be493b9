//! Maze construction and storage errors.

use crate::maze::types::Point;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building, loading or saving a grid.
#[derive(Debug, Error)]
pub enum GridError {
    /// Width or height is zero.
    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    /// Dimensions do not fit the coordinate type.
    #[error("grid dimensions {width}x{height} are too large")]
    TooLarge { width: usize, height: usize },

    /// A point lies outside the grid.
    #[error("{what} {point} lies outside the {width}x{height} grid")]
    OutOfBounds {
        what: &'static str,
        point: Point,
        width: usize,
        height: usize,
    },

    /// Stored passage data does not match the declared dimensions.
    #[error("expected {expected} passage cells, found {found}")]
    PassageCount { expected: usize, found: usize },

    /// A stored cell uses bits outside the four direction flags.
    #[error("cell {point} has invalid passage mask {mask:#06b}")]
    InvalidMask { point: Point, mask: u8 },

    /// Failed to read a grid file.
    #[error("failed to read grid file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a grid file.
    #[error("failed to write grid file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to (de)serialize grid JSON.
    #[error("invalid grid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl GridError {
    pub(crate) fn out_of_bounds(what: &'static str, point: Point, width: usize, height: usize) -> Self {
        Self::OutOfBounds {
            what,
            point,
            width,
            height,
        }
    }
}
