//! Fork strategies: deferred branches become tasks on a rayon pool.
//!
//! Unbounded fork turns every deferred branch into a task. Bounded fork does
//! so only while a permit is available and keeps the branch for local
//! backtracking otherwise, so live tasks never exceed the permit budget. With
//! early results enabled a task that reaches the end also stores its path in
//! every ancestor, which stops them at their next kernel iteration and lets
//! them complete without waiting for their remaining children.
//!
//! Forks are spawned as independent jobs and joined by counting, never by a
//! blocking join, so stack use stays flat however deeply tasks nest.

pub mod permits;
pub mod task;

pub use permits::{Permit, PermitPool};
pub use task::{ForkContext, TaskNode, TaskOutcome};

use crate::maze::Grid;
use crate::search::config::{ConfigError, SolverConfig, Strategy};
use crate::search::error::SolveError;
use crate::search::parallel::channel::{Delivery, SolutionChannel, WaitStatus};
use crate::search::registry::VisitedRegistry;
use crate::search::result::{SearchResult, SearchStatistics};
use crate::search::{MazeSolver, ensure_registry_fits};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Instant;

/// Solver for [`Strategy::Fork`] and [`Strategy::BoundedFork`]
#[derive(Debug, Clone)]
pub struct ForkSolver {
    config: SolverConfig,
    permit_limit: Option<usize>,
    early_results: bool,
}

impl ForkSolver {
    /// Every deferred branch is forked.
    pub fn unbounded(config: &SolverConfig) -> Self {
        Self {
            config: config.clone().with_strategy(Strategy::Fork),
            permit_limit: None,
            early_results: false,
        }
    }

    /// At most `config.permits` live tasks, root included.
    pub fn bounded(config: &SolverConfig) -> Self {
        Self {
            config: config.clone().with_strategy(Strategy::BoundedFork),
            permit_limit: Some(config.permits),
            early_results: true,
        }
    }

    pub fn with_early_results(mut self, enabled: bool) -> Self {
        self.early_results = enabled;
        self
    }

    fn permit_pool(&self) -> Arc<PermitPool> {
        match self.permit_limit {
            Some(limit) => PermitPool::bounded(limit),
            None => PermitPool::unbounded(),
        }
    }
}

impl MazeSolver for ForkSolver {
    fn strategy(&self) -> Strategy {
        self.config.strategy
    }

    fn solve_with_registry(
        &self,
        grid: Arc<Grid>,
        registry: Arc<VisitedRegistry>,
    ) -> Result<SearchResult, SolveError> {
        self.config.validate()?;
        ensure_registry_fits(&grid, &registry)?;
        let start_time = Instant::now();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .stack_size(self.config.task_stack_size)
            .thread_name(|index| format!("maze-fork-{index}"))
            .build()?;

        let channel = Arc::new(SolutionChannel::new());
        let permits = self.permit_pool();
        let ctx = Arc::new(ForkContext::new(
            Arc::clone(&grid),
            Arc::clone(&registry),
            Arc::clone(&channel),
            Arc::clone(&permits),
            self.early_results,
        ));

        // The root always gets a permit: validation guarantees a budget of at least one.
        let Some(root_permit) = permits.try_acquire() else {
            return Err(ConfigError::ZeroPool("permits").into());
        };

        tracing::debug!(
            strategy = %self.config.strategy,
            threads = self.config.threads,
            permits = ?self.permit_limit,
            early_results = self.early_results,
            "starting fork search"
        );

        {
            let channel = Arc::clone(&channel);
            task::spawn_root(&pool, &ctx, grid.start(), root_permit, move |outcome| {
                if !matches!(outcome, TaskOutcome::Found(_)) {
                    channel.conclude_exhausted();
                }
            });
        }

        let deadline = self.config.timeout.map(|timeout| start_time + timeout);
        let status = channel.wait_until(deadline, self.config.progress_interval, || {
            tracing::info!(
                live_tasks = permits.in_use(),
                running_tasks = ctx.running_tasks(),
                claimed_cells = registry.claimed_cells(),
                "fork search in progress"
            );
        });

        let delivery = match status {
            WaitStatus::Delivered(delivery) => delivery,
            WaitStatus::Pending => {
                channel.abandon();
                let timeout = self.config.timeout.unwrap_or_default();
                tracing::warn!(?timeout, "fork search timed out");
                return Err(SolveError::TimedOut(timeout));
            }
        };

        // Stop is raised; wait for every task to return so the counters are final.
        ctx.wait_settled();

        let mut statistics = SearchStatistics::new(self.config.strategy);
        statistics.absorb_kernel(&ctx.kernel_totals.lock());
        statistics.cells_claimed = registry.claimed_cells();
        statistics.claim_attempts = registry.claim_attempts();
        statistics.tasks_forked = ctx.tasks_forked.load(Ordering::Relaxed);
        statistics.peak_live_tasks = permits.peak();
        statistics.elapsed_time = start_time.elapsed();

        tracing::debug!(
            tasks_forked = statistics.tasks_forked,
            peak_live_tasks = statistics.peak_live_tasks,
            elapsed = ?statistics.elapsed_time,
            "fork search finished"
        );

        Ok(match delivery {
            Delivery::Found(path) => SearchResult::with_path(path, statistics),
            Delivery::Exhausted => SearchResult::no_path(statistics),
        })
    }
}
