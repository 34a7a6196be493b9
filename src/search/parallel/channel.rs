//! Single-delivery solution handover between search workers and the caller.

use crate::maze::Point;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// The one message the caller ever receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// A path from start to end was found.
    Found(Vec<Point>),
    /// All work finished without reaching the end cell.
    Exhausted,
}

/// What a bounded wait observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitStatus {
    Delivered(Delivery),
    /// Nothing arrived before the deadline.
    Pending,
}

/// Rendezvous accepting exactly one delivery.
///
/// The first delivery raises the shared stop flag and is placed into a
/// one-slot channel; every later delivery is dropped without blocking, so a
/// losing producer can never wait on a consumer that will not come.
#[derive(Debug)]
pub struct SolutionChannel {
    stop: AtomicBool,
    tx: Sender<Delivery>,
    rx: Receiver<Delivery>,
}

impl Default for SolutionChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl SolutionChannel {
    pub fn new() -> Self {
        let (tx, rx) = bounded(1);
        Self {
            stop: AtomicBool::new(false),
            tx,
            rx,
        }
    }

    /// Offer a found path. Returns true if this delivery was the one accepted.
    pub fn deliver(&self, path: Vec<Point>) -> bool {
        self.settle(Delivery::Found(path))
    }

    /// Report that no path exists. Ignored if a result was already accepted.
    pub fn conclude_exhausted(&self) -> bool {
        self.settle(Delivery::Exhausted)
    }

    fn settle(&self, delivery: Delivery) -> bool {
        if self
            .stop
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        // Only the winner reaches this point, so the slot is free.
        let _ = self.tx.try_send(delivery);
        true
    }

    /// Raise the stop flag without delivering anything (caller gave up).
    pub fn abandon(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Cooperative cancellation check polled by all search work.
    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Block until the delivery arrives.
    pub fn wait(&self) -> Delivery {
        match self.rx.recv() {
            Ok(delivery) => delivery,
            // The channel owns a sender, so it cannot disconnect while `self` lives.
            Err(_) => Delivery::Exhausted,
        }
    }

    /// Wait at most `timeout` for the delivery.
    pub fn wait_timeout(&self, timeout: Duration) -> WaitStatus {
        match self.rx.recv_timeout(timeout) {
            Ok(delivery) => WaitStatus::Delivered(delivery),
            Err(RecvTimeoutError::Timeout) => WaitStatus::Pending,
            Err(RecvTimeoutError::Disconnected) => WaitStatus::Delivered(Delivery::Exhausted),
        }
    }

    /// Wait until delivery or `deadline`, calling `on_tick` every `tick` while pending.
    pub fn wait_until<F: FnMut()>(&self, deadline: Option<Instant>, tick: Duration, mut on_tick: F) -> WaitStatus {
        loop {
            let slice = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return WaitStatus::Pending;
                    }
                    remaining.min(tick)
                }
                None => tick,
            };
            match self.wait_timeout(slice) {
                WaitStatus::Pending => on_tick(),
                delivered => return delivered,
            }
        }
    }
}
