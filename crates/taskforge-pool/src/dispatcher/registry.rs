//! Concurrency-safe record of which workers are idle.
//!
//! The registry is the only state shared between the dispatch loop and the
//! result collector. The raw table never escapes: every access goes through
//! one of the three atomic operations below, each of which takes the lock for
//! the duration of the call and never awaits while holding it.

use parking_lot::Mutex;
use taskforge_core::{Error, Result, types::WorkerId};

/// Availability table for a fixed pool of workers.
///
/// A worker is idle iff no task has been sent to it since its last collected
/// result (or since startup). At any instant the number of busy workers equals
/// the number of tasks in flight.
pub struct WorkerRegistry {
    /// `true` = idle, indexed by [`WorkerId`].
    slots: Mutex<Vec<bool>>,
}

impl WorkerRegistry {
    /// Creates a registry with every worker idle.
    pub fn new(num_workers: usize) -> Self {
        Self {
            slots: Mutex::new(vec![true; num_workers]),
        }
    }

    /// Atomically finds one idle worker, marks it busy, and returns its id.
    ///
    /// Returns `None` when every worker is busy. The registry never blocks
    /// waiting for a worker; callers retry on their own schedule.
    pub fn try_acquire_idle(&self) -> Option<WorkerId> {
        let mut slots = self.slots.lock();
        let worker = slots.iter().position(|idle| *idle)?;
        slots[worker] = false;
        Some(worker)
    }

    /// Marks a busy worker idle again.
    ///
    /// # Errors
    ///
    /// Releasing a worker that is already idle (or out of range) means the
    /// dispatch and collection sides have desynchronized; that is a fatal
    /// protocol violation, not a condition to paper over.
    pub fn release(&self, worker: WorkerId) -> Result<()> {
        let mut slots = self.slots.lock();
        match slots.get_mut(worker) {
            Some(idle) if !*idle => {
                *idle = true;
                Ok(())
            }
            Some(_) => Err(Error::ProtocolViolation {
                context: format!("release of already-idle worker {worker}"),
            }),
            None => Err(Error::ProtocolViolation {
                context: format!("release of unknown worker {worker}"),
            }),
        }
    }

    /// `true` iff every worker is idle (no task in flight).
    pub fn all_idle(&self) -> bool {
        self.slots.lock().iter().all(|idle| *idle)
    }

    /// Number of workers in the pool.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
