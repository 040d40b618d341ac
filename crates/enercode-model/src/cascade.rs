//! Cascade scheduler.
//!
//! A single-threaded work queue that serializes and coalesces section
//! recalculation requests. Store listeners do nothing but enqueue the
//! owning section here; the model drains the queue after each user action.
//!
//! Coalescing rules:
//! - a section already pending is not queued twice;
//! - a request for the section currently mid-recalculation is dropped, not
//!   queued - the write that triggered it is already part of a consistent
//!   pass, and the in-progress token replaces ad hoc boolean guard flags.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use tracing::trace;

#[derive(Default)]
struct SchedulerInner {
    queue: VecDeque<usize>,
    queued: HashSet<usize>,
    running: Option<usize>,
}

/// Coalescing FIFO of section indices awaiting recalculation.
#[derive(Default)]
pub struct Scheduler {
    inner: Mutex<SchedulerInner>,
}

impl Scheduler {
    pub fn new() -> Scheduler {
        Scheduler::default()
    }

    /// Request a recalculation. Returns `false` when the request was
    /// coalesced into an existing one or dropped as re-entrant.
    pub fn enqueue(&self, section: usize) -> bool {
        let mut inner = self.inner.lock().expect("scheduler lock poisoned");
        if inner.running == Some(section) {
            trace!(section, "re-entrant recalculation request dropped");
            return false;
        }
        if !inner.queued.insert(section) {
            trace!(section, "recalculation request coalesced");
            return false;
        }
        inner.queue.push_back(section);
        true
    }

    fn pop(&self) -> Option<usize> {
        let mut inner = self.inner.lock().expect("scheduler lock poisoned");
        let section = inner.queue.pop_front()?;
        inner.queued.remove(&section);
        inner.running = Some(section);
        Some(section)
    }

    fn finish(&self) {
        self.inner.lock().expect("scheduler lock poisoned").running = None;
    }

    /// Run pending recalculations to exhaustion. `run` executes one
    /// section's `calculate_all`; writes it makes may enqueue further
    /// sections, which this same drain picks up in arrival order.
    pub fn drain(&self, mut run: impl FnMut(usize)) {
        while let Some(section) = self.pop() {
            run(section);
            self.finish();
        }
    }

    pub fn is_idle(&self) -> bool {
        let inner = self.inner.lock().expect("scheduler lock poisoned");
        inner.queue.is_empty() && inner.running.is_none()
    }
}
