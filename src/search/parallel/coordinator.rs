//! Work-stealing solver: spawns the worker pool, waits for the verdict and
//! joins the workers.

use crate::maze::Grid;
use crate::search::config::{SolverConfig, Strategy};
use crate::search::error::SolveError;
use crate::search::parallel::channel::{Delivery, SolutionChannel, WaitStatus};
use crate::search::parallel::worker::{PoolShared, WorkerReport, run_worker};
use crate::search::registry::VisitedRegistry;
use crate::search::result::{SearchResult, SearchStatistics};
use crate::search::{MazeSolver, ensure_registry_fits};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Solver for [`Strategy::WorkStealing`]
#[derive(Debug, Clone)]
pub struct WorkStealingSolver {
    config: SolverConfig,
}

impl WorkStealingSolver {
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            config: config.clone().with_strategy(Strategy::WorkStealing),
        }
    }
}

impl MazeSolver for WorkStealingSolver {
    fn strategy(&self) -> Strategy {
        Strategy::WorkStealing
    }

    fn solve_with_registry(
        &self,
        grid: Arc<Grid>,
        registry: Arc<VisitedRegistry>,
    ) -> Result<SearchResult, SolveError> {
        self.config.validate()?;
        ensure_registry_fits(&grid, &registry)?;
        let start_time = Instant::now();
        let num_workers = self.config.workers;

        let channel = Arc::new(SolutionChannel::new());
        let shared = Arc::new(PoolShared::new(
            Arc::clone(&grid),
            Arc::clone(&registry),
            Arc::clone(&channel),
            num_workers,
            self.config.local_queue_threshold,
            self.config.park_timeout,
        ));
        shared.seed(grid.start());

        tracing::debug!(
            workers = num_workers,
            local_queue_threshold = self.config.local_queue_threshold,
            park_timeout = ?self.config.park_timeout,
            "starting worker pool"
        );

        let mut handles: Vec<JoinHandle<WorkerReport>> = Vec::with_capacity(num_workers);
        for worker_id in 0..num_workers {
            let shared_for_worker = Arc::clone(&shared);
            let spawned = thread::Builder::new()
                .name(format!("maze-worker-{worker_id}"))
                .spawn(move || run_worker(worker_id, &shared_for_worker));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    channel.abandon();
                    join_workers(handles);
                    return Err(SolveError::WorkerSpawn {
                        worker: worker_id,
                        source,
                    });
                }
            }
        }

        let deadline = self.config.timeout.map(|timeout| start_time + timeout);
        let status = channel.wait_until(deadline, self.config.progress_interval, || {
            tracing::info!(
                outstanding = shared.outstanding(),
                shared_queue = shared.shared_queue_len(),
                claimed_cells = registry.claimed_cells(),
                "worker pool in progress"
            );
        });

        let delivery = match status {
            WaitStatus::Delivered(delivery) => delivery,
            WaitStatus::Pending => {
                channel.abandon();
                join_workers(handles);
                let timeout = self.config.timeout.unwrap_or_default();
                tracing::warn!(?timeout, "worker pool timed out");
                return Err(SolveError::TimedOut(timeout));
            }
        };

        let reports = join_workers(handles);

        let mut statistics = SearchStatistics::new(Strategy::WorkStealing);
        for report in &reports {
            statistics.absorb_kernel(&report.kernel);
            statistics.items_local += report.statistics.items_local;
            statistics.items_shared += report.statistics.items_shared;
            statistics.shared_dequeues += report.statistics.shared_dequeues;
            statistics.worker_statistics.push(report.statistics);
        }
        statistics.cells_claimed = registry.claimed_cells();
        statistics.claim_attempts = registry.claim_attempts();
        statistics.tree_nodes = shared.tree.len();
        statistics.elapsed_time = start_time.elapsed();

        tracing::debug!(
            tree_nodes = statistics.tree_nodes,
            elapsed = ?statistics.elapsed_time,
            "worker pool finished"
        );

        Ok(match delivery {
            Delivery::Found(path) => SearchResult::with_path(path, statistics),
            Delivery::Exhausted => SearchResult::no_path(statistics),
        })
    }
}

/// Join every worker; a panicked worker is logged and contributes no report.
fn join_workers(handles: Vec<JoinHandle<WorkerReport>>) -> Vec<WorkerReport> {
    handles
        .into_iter()
        .enumerate()
        .filter_map(|(worker_id, handle)| match handle.join() {
            Ok(report) => Some(report),
            Err(_) => {
                tracing::error!(worker_id, "worker panicked");
                None
            }
        })
        .collect()
}
