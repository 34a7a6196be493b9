//! Concurrent maze search
//!
//! Every strategy runs the same depth-first kernel and differs only in what
//! it does with deferred branches:
//! - Sequential: keep them for local backtracking
//! - Fork: spawn a task per branch on a rayon pool
//! - Bounded fork: spawn while a permit is free, keep otherwise
//! - Work stealing: queue them for a persistent worker pool
//!
//! Branches coordinate only through the [`VisitedRegistry`]; the first result
//! is handed over through a [`SolutionChannel`](parallel::SolutionChannel).

pub mod config;
pub mod error;
pub mod fork;
pub mod kernel;
pub mod parallel;
pub mod path;
pub mod registry;
pub mod result;
pub mod sequential;
pub mod tree;

pub use config::{ConfigError, SolverConfig, Strategy};
pub use error::SolveError;
pub use fork::ForkSolver;
pub use kernel::{BranchDispatch, Deferral, KeepLocal, Kernel, KernelOutcome, KernelStats};
pub use parallel::WorkStealingSolver;
pub use path::{BranchPoint, LinearPath, PathTrace};
pub use registry::VisitedRegistry;
pub use result::{SearchResult, SearchStatistics, WorkerStatistics};
pub use sequential::SequentialSolver;
pub use tree::{NodeId, PathTree, TreePath};

use crate::maze::Grid;
use std::sync::Arc;

/// A strategy that finds a start-to-end path through a grid
pub trait MazeSolver: Send + Sync {
    fn strategy(&self) -> Strategy;

    /// Solve using a caller-supplied registry, e.g. one with a claim probe.
    ///
    /// # Returns
    /// A `SearchResult` whose path is `None` when the end is unreachable
    fn solve_with_registry(
        &self,
        grid: Arc<Grid>,
        registry: Arc<VisitedRegistry>,
    ) -> Result<SearchResult, SolveError>;

    /// Solve with a fresh registry
    fn solve(&self, grid: Arc<Grid>) -> Result<SearchResult, SolveError> {
        let registry = Arc::new(VisitedRegistry::new(&grid));
        self.solve_with_registry(grid, registry)
    }
}

/// Build the solver for `config.strategy`, validating the configuration.
pub fn solver_for(config: &SolverConfig) -> Result<Box<dyn MazeSolver>, SolveError> {
    config.validate()?;
    let solver: Box<dyn MazeSolver> = match config.strategy {
        Strategy::Sequential => Box::new(SequentialSolver),
        Strategy::Fork => Box::new(ForkSolver::unbounded(config)),
        Strategy::BoundedFork => Box::new(ForkSolver::bounded(config)),
        Strategy::WorkStealing => Box::new(WorkStealingSolver::new(config)),
    };
    Ok(solver)
}

pub(crate) fn ensure_registry_fits(grid: &Grid, registry: &VisitedRegistry) -> Result<(), SolveError> {
    if registry.fits(grid) {
        Ok(())
    } else {
        Err(SolveError::RegistryMismatch {
            width: grid.width(),
            height: grid.height(),
        })
    }
}
