//! Errors surfaced by solvers.
//!
//! An exhausted search is not an error: it is a [`SearchResult`](super::SearchResult)
//! without a path. These variants cover setup failures and timeouts.

use crate::search::config::ConfigError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolveError {
    /// Configuration rejected before any work started.
    #[error("invalid solver configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The task pool could not be built.
    #[error("failed to build task pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A pool worker thread could not be started.
    #[error("failed to spawn worker {worker}: {source}")]
    WorkerSpawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },

    /// A caller-supplied registry was sized for another grid.
    #[error("visited registry does not match the {width}x{height} grid")]
    RegistryMismatch { width: usize, height: usize },

    /// No result arrived within the configured timeout.
    #[error("search timed out after {0:?}")]
    TimedOut(Duration),
}
