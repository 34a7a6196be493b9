//! One fork task: a kernel run whose deferred branches become child tasks.
//!
//! Tasks never block on their children. Every node counts its own kernel run
//! plus each child that has not reported yet. Whoever brings that count to
//! zero decides the node's outcome, releases its permit and reports to the
//! parent, walking up the tree in a loop. A node whose own run has ended and
//! whose early-result cell is filled completes at once; children still
//! running report into a node that has already moved on and are discarded.

use crate::maze::{Grid, Point};
use crate::search::fork::permits::{Permit, PermitPool};
use crate::search::kernel::{BranchDispatch, Deferral, Kernel, KernelOutcome, KernelStats};
use crate::search::parallel::channel::SolutionChannel;
use crate::search::path::{BranchPoint, LinearPath};
use crate::search::registry::VisitedRegistry;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// Final state of a task and its whole subtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Found(Vec<Point>),
    Exhausted,
    Cancelled,
}

type ChildSlot = Arc<OnceLock<TaskOutcome>>;
type Completion = Box<dyn FnOnce(TaskOutcome) + Send>;

/// Position of a task in the fork tree, carrying its early-result cell and
/// the join state of its children.
pub struct TaskNode {
    parent: Option<Arc<TaskNode>>,
    /// Where this node reports; held by the parent in spawn order
    slot: Option<ChildSlot>,
    early: OnceLock<Vec<Point>>,
    own: OnceLock<TaskOutcome>,
    /// Own run plus children that have not reported
    pending: AtomicUsize,
    completed: AtomicBool,
    children: Mutex<Vec<ChildSlot>>,
    permit: Mutex<Option<Permit>>,
    on_complete: Mutex<Option<Completion>>,
}

impl TaskNode {
    fn new(parent: Option<Arc<TaskNode>>, slot: Option<ChildSlot>, on_complete: Option<Completion>) -> Arc<Self> {
        Arc::new(Self {
            parent,
            slot,
            early: OnceLock::new(),
            own: OnceLock::new(),
            pending: AtomicUsize::new(1),
            completed: AtomicBool::new(false),
            children: Mutex::new(Vec::new()),
            permit: Mutex::new(None),
            on_complete: Mutex::new(on_complete),
        })
    }

    pub fn root() -> Arc<Self> {
        Self::new(None, None, None)
    }

    /// Root whose tree outcome is handed to `on_complete`.
    pub fn root_with(on_complete: impl FnOnce(TaskOutcome) + Send + 'static) -> Arc<Self> {
        Self::new(None, None, Some(Box::new(on_complete)))
    }

    /// Register a child after the ones already spawned. The parent stays
    /// open until the child reports or an early result is adopted.
    pub fn child(parent: &Arc<TaskNode>) -> Arc<Self> {
        let slot: ChildSlot = Arc::new(OnceLock::new());
        parent.pending.fetch_add(1, Ordering::AcqRel);
        parent.children.lock().push(Arc::clone(&slot));
        Self::new(Some(Arc::clone(parent)), Some(slot), None)
    }

    pub fn early_result(&self) -> Option<&Vec<Point>> {
        self.early.get()
    }

    /// Store `path` in every ancestor's cell, stopping at the first ancestor
    /// that already holds one.
    pub fn propagate(&self, path: &[Point]) -> usize {
        let mut reached = 0;
        let mut cursor = self.parent.as_deref();
        while let Some(node) = cursor {
            if node.early.set(path.to_vec()).is_err() {
                break;
            }
            reached += 1;
            cursor = node.parent.as_deref();
        }
        reached
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub fn is_complete(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    /// Account for one finished unit (the own run or a child report) and
    /// complete every node this settles, bottom-up.
    fn finish_one(self: &Arc<Self>, ctx: &ForkContext) {
        let mut current = Arc::clone(self);
        loop {
            let remaining = current.pending.fetch_sub(1, Ordering::AcqRel) - 1;
            let adopt = current.own.get().is_some() && current.early.get().is_some();
            if remaining > 0 && !adopt {
                return;
            }
            if current.completed.swap(true, Ordering::AcqRel) {
                return;
            }

            let outcome = current.decide(ctx.channel.should_stop());
            drop(current.permit.lock().take());

            let next = match (&current.parent, &current.slot) {
                (Some(parent), Some(slot)) => {
                    let _ = slot.set(outcome);
                    Arc::clone(parent)
                }
                _ => {
                    let on_complete = current.on_complete.lock().take();
                    if let Some(on_complete) = on_complete {
                        on_complete(outcome);
                    }
                    return;
                }
            };
            current = next;
        }
    }

    /// Own success first, then an adopted early result, then children in
    /// spawn order.
    fn decide(&self, stopped: bool) -> TaskOutcome {
        if let Some(TaskOutcome::Found(path)) = self.own.get() {
            return TaskOutcome::Found(path.clone());
        }
        if let Some(early) = self.early.get() {
            return TaskOutcome::Found(early.clone());
        }
        let children = std::mem::take(&mut *self.children.lock());
        for child in &children {
            if let Some(TaskOutcome::Found(path)) = child.get() {
                return TaskOutcome::Found(path.clone());
            }
        }
        if stopped || matches!(self.own.get(), Some(TaskOutcome::Cancelled)) {
            TaskOutcome::Cancelled
        } else {
            TaskOutcome::Exhausted
        }
    }
}

// Ancestor chains can be as deep as the fork nesting; unlink them iteratively.
impl Drop for TaskNode {
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(node) = parent {
            parent = match Arc::try_unwrap(node) {
                Ok(mut node) => node.parent.take(),
                Err(_) => None,
            };
        }
    }
}

/// State shared by every task of one solve
pub struct ForkContext {
    pub grid: Arc<Grid>,
    pub registry: Arc<VisitedRegistry>,
    pub channel: Arc<SolutionChannel>,
    pub permits: Arc<PermitPool>,
    pub early_results: bool,
    pub tasks_forked: AtomicU64,
    pub kernel_totals: Mutex<KernelStats>,
    running: AtomicUsize,
    settled_tx: Sender<()>,
    settled_rx: Receiver<()>,
}

impl ForkContext {
    pub fn new(
        grid: Arc<Grid>,
        registry: Arc<VisitedRegistry>,
        channel: Arc<SolutionChannel>,
        permits: Arc<PermitPool>,
        early_results: bool,
    ) -> Self {
        let (settled_tx, settled_rx) = crossbeam_channel::bounded(1);
        Self {
            grid,
            registry,
            channel,
            permits,
            early_results,
            tasks_forked: AtomicU64::new(0),
            kernel_totals: Mutex::new(KernelStats::default()),
            running: AtomicUsize::new(0),
            settled_tx,
            settled_rx,
        }
    }

    /// Tasks spawned whose run has not returned yet
    pub fn running_tasks(&self) -> usize {
        self.running.load(Ordering::Acquire)
    }

    /// Block until every spawned task has returned. Call at most once per solve.
    pub fn wait_settled(&self) {
        let _ = self.settled_rx.recv();
    }

    fn task_started(&self) {
        self.running.fetch_add(1, Ordering::AcqRel);
    }

    fn task_finished(&self) {
        if self.running.fetch_sub(1, Ordering::AcqRel) == 1 {
            let _ = self.settled_tx.try_send(());
        }
    }

    fn should_stop(&self, node: &TaskNode) -> bool {
        self.channel.should_stop() || (self.early_results && node.early_result().is_some())
    }
}

struct ForkDispatch<'a> {
    ctx: &'a Arc<ForkContext>,
    node: &'a Arc<TaskNode>,
}

impl BranchDispatch<LinearPath> for ForkDispatch<'_> {
    fn dispatch(&mut self, branch: BranchPoint, path: &LinearPath) -> Deferral {
        let Some(permit) = self.ctx.permits.try_acquire() else {
            return Deferral::Kept;
        };

        self.ctx.tasks_forked.fetch_add(1, Ordering::Relaxed);
        self.ctx.task_started();
        let ctx = Arc::clone(self.ctx);
        let node = TaskNode::child(self.node);
        let path = path.clone();
        tracing::trace!(point = %branch.point, "forking task");
        // lands on the pool of the calling worker
        rayon::spawn(move || run_task(&ctx, node, branch.point, path, permit));
        Deferral::Dispatched
    }

    fn should_stop(&self) -> bool {
        self.ctx.should_stop(self.node)
    }
}

/// Start the root task on `pool`. `on_complete` receives the outcome of the
/// whole tree once it is decided.
pub fn spawn_root(
    pool: &rayon::ThreadPool,
    ctx: &Arc<ForkContext>,
    start: Point,
    permit: Permit,
    on_complete: impl FnOnce(TaskOutcome) + Send + 'static,
) {
    let node = TaskNode::root_with(on_complete);
    let ctx = Arc::clone(ctx);
    ctx.task_started();
    pool.spawn(move || run_task(&ctx, node, start, LinearPath::new(), permit));
}

/// Run the kernel for one task. `permit` stays with `node` until the node
/// completes.
fn run_task(ctx: &Arc<ForkContext>, node: Arc<TaskNode>, start: Point, path: LinearPath, permit: Permit) {
    *node.permit.lock() = Some(permit);

    let mut stats = KernelStats::default();
    let own = {
        let mut dispatch = ForkDispatch { ctx, node: &node };
        Kernel::new(&ctx.grid, &ctx.registry).run(start, path, &mut dispatch, &mut stats)
    };
    ctx.kernel_totals.lock().merge(&stats);

    let own = match own {
        KernelOutcome::GoalReached(path) => {
            let points = path.into_points();
            if ctx.early_results {
                node.propagate(&points);
            }
            ctx.channel.deliver(points.clone());
            TaskOutcome::Found(points)
        }
        KernelOutcome::Exhausted => TaskOutcome::Exhausted,
        KernelOutcome::Cancelled => TaskOutcome::Cancelled,
    };
    let _ = node.own.set(own);
    node.finish_one(ctx);
    ctx.task_finished();
}
