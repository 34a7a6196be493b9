//! Single-threaded depth-first search on the calling thread

use crate::maze::Grid;
use crate::search::config::Strategy;
use crate::search::error::SolveError;
use crate::search::kernel::{KeepLocal, Kernel, KernelOutcome, KernelStats};
use crate::search::path::LinearPath;
use crate::search::registry::VisitedRegistry;
use crate::search::result::{SearchResult, SearchStatistics};
use crate::search::{MazeSolver, ensure_registry_fits};
use std::sync::Arc;
use std::time::Instant;

/// Keeps every deferred branch for local backtracking. Deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialSolver;

impl MazeSolver for SequentialSolver {
    fn strategy(&self) -> Strategy {
        Strategy::Sequential
    }

    fn solve_with_registry(
        &self,
        grid: Arc<Grid>,
        registry: Arc<VisitedRegistry>,
    ) -> Result<SearchResult, SolveError> {
        ensure_registry_fits(&grid, &registry)?;
        let start_time = Instant::now();

        let mut kernel_stats = KernelStats::default();
        let outcome = Kernel::new(&grid, &registry).run(
            grid.start(),
            LinearPath::new(),
            &mut KeepLocal,
            &mut kernel_stats,
        );

        let mut statistics = SearchStatistics::new(Strategy::Sequential);
        statistics.absorb_kernel(&kernel_stats);
        statistics.cells_claimed = registry.claimed_cells();
        statistics.claim_attempts = registry.claim_attempts();
        statistics.elapsed_time = start_time.elapsed();
        tracing::debug!(
            cells = statistics.cells_claimed,
            elapsed = ?statistics.elapsed_time,
            "sequential search finished"
        );

        Ok(match outcome {
            KernelOutcome::GoalReached(path) => SearchResult::with_path(path.into_points(), statistics),
            KernelOutcome::Exhausted | KernelOutcome::Cancelled => SearchResult::no_path(statistics),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::{GeneratorConfig, Point, generate};

    #[test]
    fn test_sequential_is_deterministic() {
        let grid = Arc::new(
            generate(&GeneratorConfig::new(30, 30).with_seed(42).with_cycle_probability(0.1)).unwrap(),
        );
        let first = SequentialSolver.solve(Arc::clone(&grid)).unwrap();
        let second = SequentialSolver.solve(Arc::clone(&grid)).unwrap();
        assert!(first.found_path());
        assert_eq!(first.path, second.path);
        assert_eq!(first.statistics.cells_claimed, second.statistics.cells_claimed);
        assert_eq!(first.statistics.backtracks, second.statistics.backtracks);
    }

    #[test]
    fn test_statistics_reflect_registry() {
        let mut grid = Grid::new(3, 1, Point::new(0, 0), Point::new(2, 0)).unwrap();
        grid.carve_route(&[Point::new(0, 0), Point::new(1, 0), Point::new(2, 0)])
            .unwrap();
        let result = SequentialSolver.solve(Arc::new(grid)).unwrap();
        assert_eq!(result.path_length(), 3);
        assert_eq!(result.statistics.cells_claimed, 3);
        assert_eq!(result.statistics.claim_attempts, 3);
        assert_eq!(result.statistics.dead_ends, 0);
    }
}
