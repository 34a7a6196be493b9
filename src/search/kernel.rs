//! Depth-first backtracking kernel shared by every strategy
//!
//! One kernel run explores a single branch:
//! 1. Poll the stop condition
//! 2. Claim the current cell (failure => backtrack)
//! 3. Append it to the path; stop with `GoalReached` at the end cell
//! 4. Take the first passable unclaimed neighbor (N, S, E, W order) as the
//!    continuation and offer every other one to the strategy as a deferred branch
//! 5. Without a continuation, resume at the latest locally kept branch point
//!    after rewinding the path to its origin, or finish with `Exhausted`
//!
//! Strategies differ only in what they do with deferred branches, which is
//! what [`BranchDispatch`] captures.

use crate::maze::{Direction, Grid, Point};
use crate::search::path::{BranchPoint, PathTrace};
use crate::search::registry::VisitedRegistry;

/// What a strategy did with an offered branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferral {
    /// Taken over as independent work
    Dispatched,
    /// Handed back; the kernel keeps it for local backtracking
    Kept,
}

/// Strategy hook for deferred branches and cooperative cancellation.
pub trait BranchDispatch<P: PathTrace> {
    /// Offer a deferred branch. `path` ends at the branch origin.
    fn dispatch(&mut self, branch: BranchPoint, path: &P) -> Deferral;

    /// Polled at every kernel iteration.
    fn should_stop(&self) -> bool;
}

/// Dispatch that keeps every branch local: the purely sequential search.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepLocal;

impl<P: PathTrace> BranchDispatch<P> for KeepLocal {
    fn dispatch(&mut self, _branch: BranchPoint, _path: &P) -> Deferral {
        Deferral::Kept
    }

    fn should_stop(&self) -> bool {
        false
    }
}

/// How a kernel run ended
#[derive(Debug)]
pub enum KernelOutcome<P> {
    /// The end cell was claimed; the path runs from the start to it.
    GoalReached(P),
    /// No continuation and no local branch point left.
    Exhausted,
    /// The stop condition was observed.
    Cancelled,
}

/// Counters of a single kernel run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KernelStats {
    pub cells_extended: u64,
    pub claim_failures: u64,
    pub dead_ends: u64,
    pub backtracks: u64,
    pub branches_kept: u64,
    pub branches_dispatched: u64,
}

impl KernelStats {
    pub fn merge(&mut self, other: &KernelStats) {
        self.cells_extended += other.cells_extended;
        self.claim_failures += other.claim_failures;
        self.dead_ends += other.dead_ends;
        self.backtracks += other.backtracks;
        self.branches_kept += other.branches_kept;
        self.branches_dispatched += other.branches_dispatched;
    }
}

/// Single-branch search over a grid and a shared claim registry.
#[derive(Debug, Clone, Copy)]
pub struct Kernel<'a> {
    grid: &'a Grid,
    registry: &'a VisitedRegistry,
}

impl<'a> Kernel<'a> {
    pub fn new(grid: &'a Grid, registry: &'a VisitedRegistry) -> Self {
        Self { grid, registry }
    }

    /// Explore from `start`, where `path` ends just before `start`.
    pub fn run<P, D>(&self, start: Point, mut path: P, dispatch: &mut D, stats: &mut KernelStats) -> KernelOutcome<P>
    where
        P: PathTrace,
        D: BranchDispatch<P>,
    {
        let mut backtrack: Vec<BranchPoint> = Vec::new();
        let mut current = start;

        loop {
            if dispatch.should_stop() {
                return KernelOutcome::Cancelled;
            }

            if !self.registry.try_claim(current) {
                stats.claim_failures += 1;
                match Self::resume(&mut backtrack, &mut path, stats) {
                    Some(next) => {
                        current = next;
                        continue;
                    }
                    None => return KernelOutcome::Exhausted,
                }
            }

            path.extend(current);
            stats.cells_extended += 1;
            if current == self.grid.end() {
                return KernelOutcome::GoalReached(path);
            }

            let mut next = None;
            for direction in Direction::ALL {
                let neighbor = current.neighbor(direction);
                if !self.grid.is_open(current, direction) || self.registry.is_claimed(neighbor) {
                    continue;
                }
                if next.is_none() {
                    next = Some(neighbor);
                    continue;
                }
                let branch = BranchPoint::new(neighbor, direction.opposite());
                match dispatch.dispatch(branch, &path) {
                    Deferral::Dispatched => stats.branches_dispatched += 1,
                    Deferral::Kept => {
                        stats.branches_kept += 1;
                        backtrack.push(branch);
                    }
                }
            }

            match next {
                Some(next) => current = next,
                None => {
                    stats.dead_ends += 1;
                    match Self::resume(&mut backtrack, &mut path, stats) {
                        Some(next) => current = next,
                        None => return KernelOutcome::Exhausted,
                    }
                }
            }
        }
    }

    fn resume<P: PathTrace>(backtrack: &mut Vec<BranchPoint>, path: &mut P, stats: &mut KernelStats) -> Option<Point> {
        let branch = backtrack.pop()?;
        stats.backtracks += 1;
        path.rewind_to(branch.origin());
        Some(branch.point)
    }
}
