//! Pool worker: drains its local LIFO queue, then the shared queue.

use crate::maze::{Grid, Point};
use crate::search::kernel::{BranchDispatch, Deferral, Kernel, KernelOutcome, KernelStats};
use crate::search::parallel::channel::SolutionChannel;
use crate::search::path::{BranchPoint, PathTrace};
use crate::search::registry::VisitedRegistry;
use crate::search::result::WorkerStatistics;
use crate::search::tree::{NodeId, PathTree, TreePath};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A deferred branch waiting to be explored: the cell to claim and the
/// tree node of its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkItem {
    pub point: Point,
    pub parent: Option<NodeId>,
}

/// State shared by all workers of one solve
pub struct PoolShared {
    pub grid: Arc<Grid>,
    pub registry: Arc<VisitedRegistry>,
    pub tree: PathTree,
    pub channel: Arc<SolutionChannel>,
    shared_tx: Sender<WorkItem>,
    shared_rx: Receiver<WorkItem>,
    /// Items queued or running anywhere in the pool
    outstanding: AtomicUsize,
    local_queue_threshold: usize,
    park_timeout: Duration,
}

impl PoolShared {
    pub fn new(
        grid: Arc<Grid>,
        registry: Arc<VisitedRegistry>,
        channel: Arc<SolutionChannel>,
        workers: usize,
        local_queue_threshold: usize,
        park_timeout: Duration,
    ) -> Self {
        let (shared_tx, shared_rx) = crossbeam_channel::unbounded();
        Self {
            grid,
            registry,
            tree: PathTree::new(workers),
            channel,
            shared_tx,
            shared_rx,
            outstanding: AtomicUsize::new(0),
            local_queue_threshold,
            park_timeout,
        }
    }

    /// Queue the start cell on the shared queue.
    pub fn seed(&self, start: Point) {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        let item = WorkItem {
            point: start,
            parent: None,
        };
        if self.shared_tx.send(item).is_err() {
            self.finish_item();
        }
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    pub fn shared_queue_len(&self) -> usize {
        self.shared_rx.len()
    }

    /// Retire one item. The worker retiring the last one declares exhaustion.
    fn finish_item(&self) {
        if self.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            tracing::debug!("no outstanding work left");
            self.channel.conclude_exhausted();
        }
    }
}

/// Counters a worker hands back when it exits
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerReport {
    pub statistics: WorkerStatistics,
    pub kernel: KernelStats,
}

struct PoolDispatch<'a> {
    shared: &'a PoolShared,
    local: &'a mut VecDeque<WorkItem>,
    stats: &'a mut WorkerStatistics,
}

impl<'t> BranchDispatch<TreePath<'t>> for PoolDispatch<'_> {
    fn dispatch(&mut self, branch: BranchPoint, path: &TreePath<'t>) -> Deferral {
        let item = WorkItem {
            point: branch.point,
            parent: path.node(),
        };
        // counted before it becomes visible to any other worker
        self.shared.outstanding.fetch_add(1, Ordering::AcqRel);
        // the local queue holds at most `local_queue_threshold` items
        if self.local.len() < self.shared.local_queue_threshold {
            self.local.push_back(item);
            self.stats.items_local += 1;
        } else {
            match self.shared.shared_tx.send(item) {
                Ok(()) => self.stats.items_shared += 1,
                Err(err) => {
                    self.local.push_back(err.into_inner());
                    self.stats.items_local += 1;
                }
            }
        }
        Deferral::Dispatched
    }

    fn should_stop(&self) -> bool {
        self.shared.channel.should_stop()
    }
}

/// Worker main loop. Returns once the stop flag is raised.
pub fn run_worker(worker_id: usize, shared: &PoolShared) -> WorkerReport {
    let mut local: VecDeque<WorkItem> = VecDeque::new();
    let mut report = WorkerReport {
        statistics: WorkerStatistics {
            worker_id,
            ..Default::default()
        },
        kernel: KernelStats::default(),
    };
    let kernel = Kernel::new(&shared.grid, &shared.registry);

    tracing::debug!(worker_id, "worker started");
    while !shared.channel.should_stop() {
        let item = match local.pop_back() {
            Some(item) => item,
            None => match shared.shared_rx.recv_timeout(shared.park_timeout) {
                Ok(item) => {
                    report.statistics.shared_dequeues += 1;
                    item
                }
                Err(RecvTimeoutError::Timeout) => {
                    report.statistics.parks += 1;
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            },
        };

        tracing::trace!(worker_id, point = %item.point, "running work item");
        let path = TreePath::new(&shared.tree, worker_id, item.parent);
        let mut dispatch = PoolDispatch {
            shared,
            local: &mut local,
            stats: &mut report.statistics,
        };
        let mut run_stats = KernelStats::default();
        let outcome = kernel.run(item.point, path, &mut dispatch, &mut run_stats);
        if let KernelOutcome::GoalReached(path) = outcome {
            tracing::debug!(worker_id, "worker reached the end cell");
            shared.channel.deliver(path.to_points());
        }

        report.statistics.items_run += 1;
        report.statistics.cells_extended += run_stats.cells_extended;
        report.kernel.merge(&run_stats);
        shared.finish_item();
    }
    tracing::debug!(worker_id, items = report.statistics.items_run, "worker stopped");
    report
}
