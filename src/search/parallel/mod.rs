//! Persistent worker pool and the result handover shared by the concurrent strategies.
//!
//! # Architecture
//!
//! - A **coordinator** spawns named worker threads, waits on the
//!   [`SolutionChannel`] and joins the workers to collect their counters
//! - Each **worker** owns a LIFO queue and falls back to one shared crossbeam
//!   queue, parking on it with a timeout so it notices the stop flag
//! - Paths live in a shared **path tree**; a work item is a cell plus the node
//!   of its branch origin
//! - An **outstanding-work counter** lets the worker that retires the last
//!   item report exhaustion
//!
//! # Example
//!
//! ```ignore
//! use maze_solver::search::{MazeSolver, SolverConfig, Strategy};
//! use maze_solver::search::parallel::WorkStealingSolver;
//!
//! let config = SolverConfig::new(Strategy::WorkStealing)
//!     .with_workers(4)
//!     .with_local_queue_threshold(3);
//! let result = WorkStealingSolver::new(&config).solve(grid)?;
//! ```

pub mod channel;
pub mod coordinator;
pub mod worker;

pub use channel::{Delivery, SolutionChannel, WaitStatus};
pub use coordinator::WorkStealingSolver;
pub use worker::WorkItem;
