//! Search result types and statistics

use crate::maze::Point;
use crate::search::config::Strategy;
use crate::search::kernel::KernelStats;
use std::time::Duration;

/// Result of a solve
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Start-to-end path, or None when the end is unreachable
    pub path: Option<Vec<Point>>,
    /// Statistics from the search
    pub statistics: SearchStatistics,
}

impl SearchResult {
    /// Create a result for an exhausted search
    pub fn no_path(statistics: SearchStatistics) -> Self {
        Self {
            path: None,
            statistics,
        }
    }

    /// Create a result carrying a found path
    pub fn with_path(path: Vec<Point>, statistics: SearchStatistics) -> Self {
        Self {
            path: Some(path),
            statistics,
        }
    }

    pub fn found_path(&self) -> bool {
        self.path.is_some()
    }

    /// Number of cells on the found path, 0 without one
    pub fn path_length(&self) -> usize {
        self.path.as_ref().map_or(0, Vec::len)
    }
}

/// Counters of one pool worker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStatistics {
    pub worker_id: usize,
    /// Work items this worker ran to completion
    pub items_run: u64,
    /// Items taken from the shared queue
    pub shared_dequeues: u64,
    /// Times the worker parked with both queues empty
    pub parks: u64,
    pub cells_extended: u64,
    /// Items this worker placed on its own queue
    pub items_local: u64,
    /// Items this worker placed on the shared queue
    pub items_shared: u64,
}

/// Statistics from a solve
#[derive(Debug, Clone, Default)]
pub struct SearchStatistics {
    /// Strategy used for the search
    pub strategy: Strategy,
    /// Wall time from solve entry to result
    pub elapsed_time: Duration,
    /// Cells whose claim succeeded
    pub cells_claimed: u64,
    /// Claim attempts, successful or not
    pub claim_attempts: u64,
    /// Attempts that found the cell already owned
    pub claim_failures: u64,
    pub dead_ends: u64,
    pub backtracks: u64,
    /// Deferred branches handed to another task or queue
    pub branches_deferred: u64,
    /// Deferred branches kept for local backtracking
    pub branches_kept: u64,
    /// Tasks spawned by the fork strategies
    pub tasks_forked: u64,
    /// Highest number of simultaneously live fork tasks
    pub peak_live_tasks: usize,
    /// Work items placed on a worker-local queue
    pub items_local: u64,
    /// Work items placed on the shared queue
    pub items_shared: u64,
    pub shared_dequeues: u64,
    /// Nodes in the path tree at the end of the search
    pub tree_nodes: usize,
    pub worker_statistics: Vec<WorkerStatistics>,
}

impl SearchStatistics {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    /// Fold kernel counters into the totals
    pub fn absorb_kernel(&mut self, stats: &KernelStats) {
        self.claim_failures += stats.claim_failures;
        self.dead_ends += stats.dead_ends;
        self.backtracks += stats.backtracks;
        self.branches_deferred += stats.branches_dispatched;
        self.branches_kept += stats.branches_kept;
    }

    /// Fraction of claim attempts that lost to another branch (0.0 to 1.0)
    pub fn contention_rate(&self) -> f64 {
        if self.claim_attempts == 0 {
            0.0
        } else {
            self.claim_attempts.saturating_sub(self.cells_claimed) as f64 / self.claim_attempts as f64
        }
    }

    /// Claimed cells per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed_time.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.cells_claimed as f64 / secs
        }
    }

    /// Format statistics as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Strategy: {}\n", self.strategy));
        s.push_str(&format!("Time: {:.2?}\n", self.elapsed_time));
        s.push_str(&format!("Cells claimed: {}\n", self.cells_claimed));
        s.push_str(&format!("Throughput: {:.0} cells/sec\n", self.throughput()));
        if self.claim_attempts > 0 {
            s.push_str(&format!(
                "Claim contention: {:.2}%\n",
                self.contention_rate() * 100.0
            ));
        }
        s.push_str(&format!("Dead ends: {}\n", self.dead_ends));
        s.push_str(&format!("Backtracks: {}\n", self.backtracks));
        s.push_str(&format!(
            "Branches deferred/kept: {}/{}\n",
            self.branches_deferred, self.branches_kept
        ));

        match self.strategy {
            Strategy::Sequential => {}
            Strategy::Fork | Strategy::BoundedFork => {
                s.push_str(&format!("Tasks forked: {}\n", self.tasks_forked));
                s.push_str(&format!("Peak live tasks: {}\n", self.peak_live_tasks));
            }
            Strategy::WorkStealing => {
                s.push_str(&format!(
                    "Items local/shared: {}/{}\n",
                    self.items_local, self.items_shared
                ));
                s.push_str(&format!("Shared dequeues: {}\n", self.shared_dequeues));
                s.push_str(&format!("Tree nodes: {}\n", self.tree_nodes));
                for worker in &self.worker_statistics {
                    s.push_str(&format!(
                        "  worker {}: {} items, {} cells, {} parks\n",
                        worker.worker_id, worker.items_run, worker.cells_extended, worker.parks
                    ));
                }
            }
        }
        s
    }
}

impl std::fmt::Display for SearchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => {
                writeln!(f, "Path found ({} cells):", path.len())?;
                let steps: Vec<String> = path.iter().map(Point::to_string).collect();
                writeln!(f, "  {}", steps.join(" -> "))
            }
            None => writeln!(f, "No path found."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_no_path() {
        let result = SearchResult::no_path(SearchStatistics::default());
        assert!(!result.found_path());
        assert_eq!(result.path_length(), 0);
        assert_eq!(result.to_string(), "No path found.\n");
    }

    #[test]
    fn test_search_result_with_path() {
        let path = vec![Point::new(0, 0), Point::new(1, 0)];
        let result = SearchResult::with_path(path, SearchStatistics::default());
        assert!(result.found_path());
        assert_eq!(result.path_length(), 2);
        assert!(result.to_string().contains("(0, 0) -> (1, 0)"));
    }

    #[test]
    fn test_absorb_kernel() {
        let mut stats = SearchStatistics::new(Strategy::Fork);
        let kernel = KernelStats {
            cells_extended: 10,
            claim_failures: 2,
            dead_ends: 3,
            backtracks: 1,
            branches_kept: 4,
            branches_dispatched: 5,
        };
        stats.absorb_kernel(&kernel);
        stats.absorb_kernel(&kernel);
        assert_eq!(stats.claim_failures, 4);
        assert_eq!(stats.dead_ends, 6);
        assert_eq!(stats.branches_deferred, 10);
        assert_eq!(stats.branches_kept, 8);
    }

    #[test]
    fn test_statistics_rates() {
        let mut stats = SearchStatistics::default();
        stats.cells_claimed = 75;
        stats.claim_attempts = 100;
        stats.elapsed_time = Duration::from_secs(5);
        assert!((stats.contention_rate() - 0.25).abs() < 1e-10);
        assert!((stats.throughput() - 15.0).abs() < 1e-10);
    }

    #[test]
    fn test_statistics_zero_division() {
        let stats = SearchStatistics::default();
        assert_eq!(stats.contention_rate(), 0.0);
        assert_eq!(stats.throughput(), 0.0);
    }

    #[test]
    fn test_summary_sections_follow_strategy() {
        let mut stats = SearchStatistics::new(Strategy::WorkStealing);
        stats.worker_statistics.push(WorkerStatistics {
            worker_id: 0,
            items_run: 3,
            ..Default::default()
        });
        let summary = stats.format_summary();
        assert!(summary.contains("Strategy: work-stealing"));
        assert!(summary.contains("worker 0: 3 items"));
        assert!(!summary.contains("Tasks forked"));

        let summary = SearchStatistics::new(Strategy::BoundedFork).format_summary();
        assert!(summary.contains("Peak live tasks"));
    }
}
