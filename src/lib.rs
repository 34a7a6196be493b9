//! Concurrent maze solving: a shared depth-first kernel driven by sequential,
//! fork-based and worker-pool strategies that coordinate through an atomic
//! per-cell claim registry.

pub mod maze;
pub mod search;
