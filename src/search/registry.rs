//! Atomic per-cell claims shared by every branch of a search.

use crate::maze::{Grid, Point};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

/// One claim flag per grid cell.
///
/// Claims are monotonic: a cell, once claimed, stays claimed for the rest of
/// the search. `try_claim` is the only way to claim and is the sole point of
/// synchronization between concurrent branches.
#[derive(Debug)]
pub struct VisitedRegistry {
    width: usize,
    height: usize,
    cells: Vec<AtomicBool>,
    claimed: AtomicU64,
    attempts: AtomicU64,
    /// Successful claims per cell, present only for instrumented registries.
    probe: Option<Vec<AtomicU32>>,
}

impl VisitedRegistry {
    pub fn new(grid: &Grid) -> Self {
        Self::build(grid, false)
    }

    /// A registry that additionally counts successful claims per cell.
    pub fn with_probe(grid: &Grid) -> Self {
        Self::build(grid, true)
    }

    fn build(grid: &Grid, probe: bool) -> Self {
        let cells = grid.cell_count();
        Self {
            width: grid.width(),
            height: grid.height(),
            cells: (0..cells).map(|_| AtomicBool::new(false)).collect(),
            claimed: AtomicU64::new(0),
            attempts: AtomicU64::new(0),
            probe: probe.then(|| (0..cells).map(|_| AtomicU32::new(0)).collect()),
        }
    }

    /// Whether this registry was sized for `grid`.
    pub fn fits(&self, grid: &Grid) -> bool {
        self.width == grid.width() && self.height == grid.height()
    }

    fn index(&self, p: Point) -> Option<usize> {
        if p.x < 0 || p.y < 0 {
            return None;
        }
        let (x, y) = (p.x as usize, p.y as usize);
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// Atomically claim `p`. Returns true for exactly one caller per cell.
    /// Points outside the grid can never be claimed.
    pub fn try_claim(&self, p: Point) -> bool {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        let Some(index) = self.index(p) else {
            return false;
        };
        let won = self.cells[index]
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            self.claimed.fetch_add(1, Ordering::Relaxed);
            if let Some(probe) = &self.probe {
                probe[index].fetch_add(1, Ordering::Relaxed);
            }
        }
        won
    }

    /// Racy read for pruning candidates; `false` is no promise that a
    /// subsequent `try_claim` succeeds. Points outside the grid read as claimed.
    pub fn is_claimed(&self, p: Point) -> bool {
        match self.index(p) {
            Some(index) => self.cells[index].load(Ordering::Acquire),
            None => true,
        }
    }

    /// Number of cells claimed so far
    pub fn claimed_cells(&self) -> u64 {
        self.claimed.load(Ordering::Relaxed)
    }

    /// Number of `try_claim` calls so far, successful or not
    pub fn claim_attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Per-cell successful claim counts (row-major), if instrumented.
    pub fn probe_counts(&self) -> Option<Vec<u32>> {
        self.probe
            .as_ref()
            .map(|probe| probe.iter().map(|c| c.load(Ordering::Relaxed)).collect())
    }
}
