//! Configuration types for the search strategies

use std::time::Duration;
use thiserror::Error;

/// Default permit budget of the bounded fork strategy.
pub const DEFAULT_FORK_PERMITS: usize = 32;
/// Default local queue depth before work spills to the shared queue.
pub const DEFAULT_LOCAL_QUEUE_THRESHOLD: usize = 3;

/// Search strategy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Single-threaded depth-first search with local backtracking
    #[default]
    Sequential,
    /// Every deferred branch becomes its own task
    Fork,
    /// Deferred branches become tasks only while permits are available
    BoundedFork,
    /// Persistent worker pool with local queues and a shared overflow queue
    WorkStealing,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Sequential,
        Strategy::Fork,
        Strategy::BoundedFork,
        Strategy::WorkStealing,
    ];

    pub fn is_concurrent(&self) -> bool {
        !matches!(self, Strategy::Sequential)
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Sequential => write!(f, "sequential"),
            Strategy::Fork => write!(f, "fork"),
            Strategy::BoundedFork => write!(f, "bounded-fork"),
            Strategy::WorkStealing => write!(f, "work-stealing"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "sequential" | "seq" => Ok(Strategy::Sequential),
            "fork" | "par" | "parallel" => Ok(Strategy::Fork),
            "bounded-fork" | "parlim" | "bounded" => Ok(Strategy::BoundedFork),
            "work-stealing" | "thread" | "pool" => Ok(Strategy::WorkStealing),
            _ => Err(format!(
                "Unknown strategy: '{}'. Valid options: sequential, fork, bounded-fork, work-stealing",
                s
            )),
        }
    }
}

/// Rejected configuration values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be at least 1")]
    ZeroPool(&'static str),
    #[error("park timeout must be non-zero")]
    ZeroParkTimeout,
    #[error("progress interval must be non-zero")]
    ZeroProgressInterval,
    #[error("task stack size must be at least {min} bytes, got {found}")]
    StackTooSmall { min: usize, found: usize },
}

/// Main solver configuration
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Strategy to run
    pub strategy: Strategy,
    /// Threads of the task pool used by the fork strategies
    pub threads: usize,
    /// Permit budget of the bounded fork strategy (live tasks, root included)
    pub permits: usize,
    /// Persistent workers of the work-stealing strategy
    pub workers: usize,
    /// Most items a worker keeps in its local queue. A deferred branch that
    /// would push the depth past this goes to the shared queue; zero shares
    /// everything.
    pub local_queue_threshold: usize,
    /// How long an idle worker parks before re-checking the stop signal
    pub park_timeout: Duration,
    /// Overall timeout for concurrent searches
    pub timeout: Option<Duration>,
    /// Interval of progress logging while the caller waits
    pub progress_interval: Duration,
    /// Stack size of task pool threads; nested joins run on the same stack
    pub task_stack_size: usize,
}

/// Smallest accepted task stack size
pub const MIN_TASK_STACK_SIZE: usize = 64 * 1024;

impl Default for SolverConfig {
    fn default() -> Self {
        let cpus = num_cpus::get().max(1);
        Self {
            strategy: Strategy::default(),
            threads: cpus,
            permits: DEFAULT_FORK_PERMITS,
            workers: cpus,
            local_queue_threshold: DEFAULT_LOCAL_QUEUE_THRESHOLD,
            park_timeout: Duration::from_millis(5),
            timeout: None,
            progress_interval: Duration::from_secs(1),
            task_stack_size: 64 * 1024 * 1024,
        }
    }
}

impl SolverConfig {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_permits(mut self, permits: usize) -> Self {
        self.permits = permits;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_local_queue_threshold(mut self, threshold: usize) -> Self {
        self.local_queue_threshold = threshold;
        self
    }

    pub fn with_park_timeout(mut self, timeout: Duration) -> Self {
        self.park_timeout = timeout;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_timeout_option(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn with_task_stack_size(mut self, bytes: usize) -> Self {
        self.task_stack_size = bytes;
        self
    }

    /// Reject values that would starve the search. Only the pools the chosen
    /// strategy uses are checked.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.strategy {
            Strategy::Sequential => {}
            Strategy::Fork | Strategy::BoundedFork => {
                if self.threads == 0 {
                    return Err(ConfigError::ZeroPool("threads"));
                }
                if self.strategy == Strategy::BoundedFork && self.permits == 0 {
                    return Err(ConfigError::ZeroPool("permits"));
                }
                if self.task_stack_size < MIN_TASK_STACK_SIZE {
                    return Err(ConfigError::StackTooSmall {
                        min: MIN_TASK_STACK_SIZE,
                        found: self.task_stack_size,
                    });
                }
            }
            Strategy::WorkStealing => {
                if self.workers == 0 {
                    return Err(ConfigError::ZeroPool("workers"));
                }
                if self.park_timeout.is_zero() {
                    return Err(ConfigError::ZeroParkTimeout);
                }
            }
        }
        if self.strategy.is_concurrent() && self.progress_interval.is_zero() {
            return Err(ConfigError::ZeroProgressInterval);
        }
        Ok(())
    }
}
