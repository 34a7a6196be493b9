//! Independent verification of a solution path

use crate::maze::grid::Grid;
use crate::maze::types::Point;
use std::collections::HashSet;
use thiserror::Error;

/// Reason a path is not a valid solution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathDefect {
    #[error("path is empty")]
    Empty,
    #[error("path starts at {found}, expected {expected}")]
    WrongStart { expected: Point, found: Point },
    #[error("path ends at {found}, expected {expected}")]
    WrongEnd { expected: Point, found: Point },
    #[error("step {index}: {from} and {to} are not adjacent")]
    NotAdjacent { index: usize, from: Point, to: Point },
    #[error("step {index}: no passage from {from} to {to}")]
    NoPassage { index: usize, from: Point, to: Point },
    #[error("step {index}: {point} was already visited")]
    Revisit { index: usize, point: Point },
}

/// Check that `path` leads from the grid's start to its end through open
/// passages without visiting any cell twice.
pub fn verify_path(grid: &Grid, path: &[Point]) -> Result<(), PathDefect> {
    let (first, last) = match (path.first(), path.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(PathDefect::Empty),
    };
    if first != grid.start() {
        return Err(PathDefect::WrongStart {
            expected: grid.start(),
            found: first,
        });
    }

    let mut seen = HashSet::with_capacity(path.len());
    seen.insert(first);
    for (index, pair) in path.windows(2).enumerate() {
        let (from, to) = (pair[0], pair[1]);
        let index = index + 1;
        if (from.x - to.x).abs() + (from.y - to.y).abs() != 1 {
            return Err(PathDefect::NotAdjacent { index, from, to });
        }
        if !grid.has_passage(from, to) {
            return Err(PathDefect::NoPassage { index, from, to });
        }
        if !seen.insert(to) {
            return Err(PathDefect::Revisit { index, point: to });
        }
    }

    if last != grid.end() {
        return Err(PathDefect::WrongEnd {
            expected: grid.end(),
            found: last,
        });
    }
    Ok(())
}
