//! Counting permit pool limiting live fork tasks

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Non-blocking counting semaphore. `limit: None` never refuses but still
/// tracks live and peak counts.
#[derive(Debug)]
pub struct PermitPool {
    limit: Option<usize>,
    in_use: AtomicUsize,
    peak: AtomicUsize,
}

impl PermitPool {
    pub fn bounded(limit: usize) -> Arc<Self> {
        Arc::new(Self::with_limit(Some(limit)))
    }

    pub fn unbounded() -> Arc<Self> {
        Arc::new(Self::with_limit(None))
    }

    fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit,
            in_use: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Take a permit if one is free. Never blocks.
    pub fn try_acquire(self: &Arc<Self>) -> Option<Permit> {
        let mut current = self.in_use.load(Ordering::Acquire);
        loop {
            if self.limit.is_some_and(|limit| current >= limit) {
                return None;
            }
            match self.in_use.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.peak.fetch_max(current + 1, Ordering::AcqRel);
                    return Some(Permit {
                        pool: Arc::clone(self),
                    });
                }
                Err(actual) => current = actual,
            }
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Permits currently held
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }

    /// Highest number of permits held at once
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Acquire)
    }
}

/// A held permit; returned to its pool on drop.
#[derive(Debug)]
pub struct Permit {
    pool: Arc<PermitPool>,
}

impl Drop for Permit {
    fn drop(&mut self) {
        self.pool.in_use.fetch_sub(1, Ordering::AcqRel);
    }
}
