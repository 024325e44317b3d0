//! Bounded work scheduler: a fixed pool of worker lanes with an atomic
//! in-flight cap.
//!
//! A task is accepted only while fewer tasks than lanes are in flight;
//! rejected work runs inline on the discovering worker. Because
//! acceptance is capped at the lane count and a lane only ever waits on
//! tasks that were actually accepted, a blocked lane always has a live
//! lane left to drain its children.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

/// Fixed-size pool of worker lanes.
pub struct Scheduler {
    pool: Option<rayon::ThreadPool>,
    capacity: usize,
    in_flight: Arc<AtomicUsize>,
}

/// Releases the reserved lane slot when the task finishes, panicking or
/// not.
struct SlotGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

impl Scheduler {
    /// Build a scheduler with `lanes` workers. One lane (or a pool that
    /// fails to build) means pure inline traversal: every spawn is
    /// rejected.
    pub fn new(lanes: usize) -> Self {
        let lanes = lanes.max(1);
        if lanes == 1 {
            return Self::inline_only();
        }

        match rayon::ThreadPoolBuilder::new()
            .num_threads(lanes)
            .panic_handler(|_| log::debug!("worker lane panicked; its subtree is dropped"))
            .build()
        {
            Ok(pool) => Self {
                pool: Some(pool),
                capacity: lanes,
                in_flight: Arc::new(AtomicUsize::new(0)),
            },
            Err(err) => {
                log::debug!("thread pool unavailable, scanning inline: {}", err);
                Self::inline_only()
            }
        }
    }

    fn inline_only() -> Self {
        Self {
            pool: None,
            capacity: 0,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of worker lanes; 1 when running inline.
    pub fn lanes(&self) -> usize {
        self.capacity.max(1)
    }

    /// Tasks currently accepted and not yet finished.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Offer a task to the pool. Accepted iff the number of in-flight
    /// tasks is below the lane count; the returned channel yields the
    /// task's value. A receiver whose sender died (task panic) reads as
    /// a disconnect, which callers map to a zero-size leaf.
    pub fn try_spawn<T, F>(&self, task: F) -> Option<Receiver<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let pool = self.pool.as_ref()?;

        let mut current = self.in_flight.load(Ordering::Relaxed);
        loop {
            if current >= self.capacity {
                return None;
            }
            match self.in_flight.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }

        let slot = SlotGuard {
            in_flight: Arc::clone(&self.in_flight),
        };
        let (tx, rx) = mpsc::channel();
        pool.spawn(move || {
            let value = task();
            // free the lane before the result becomes visible
            drop(slot);
            let _ = tx.send(value);
        });
        Some(rx)
    }
}
