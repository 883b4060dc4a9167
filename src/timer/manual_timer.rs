use std::cell::Cell;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::time::Duration;
use std::time::Instant;

use tracing::trace;

use super::TimerCallback;
use super::TimerFacility;
use super::TimerHandle;

/// Deterministic timer facility driven by an explicit virtual clock.
///
/// Nothing fires until [`advance`](ManualTimer::advance) moves the clock.
/// Due callbacks run in deadline order; callbacks sharing a deadline run in
/// the order they were scheduled.
pub struct ManualTimer {
    origin: Instant,
    elapsed: Cell<Duration>,
    next_id: Cell<u64>,
    /// Keyed by (deadline offset, handle) so iteration order is firing order
    queue: RefCell<BTreeMap<(Duration, TimerHandle), TimerCallback>>,
}

impl Default for ManualTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualTimer {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
            next_id: Cell::new(1),
            queue: RefCell::new(BTreeMap::new()),
        }
    }

    /// Virtual time elapsed since the timer was created
    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }

    pub fn pending_count(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Moves the clock forward by `by`, firing everything that becomes due.
    ///
    /// Returns the number of callbacks that ran. Callbacks may schedule new
    /// timers; those also fire if they fall due before the target time.
    pub fn advance(
        &self,
        by: Duration,
    ) -> usize {
        let target = self.elapsed.get() + by;
        let mut fired = 0;

        loop {
            let due = {
                let mut queue = self.queue.borrow_mut();
                let key = match queue.keys().next() {
                    Some(&(deadline, handle)) if deadline <= target => (deadline, handle),
                    _ => break,
                };
                queue.remove(&key).map(|callback| (key, callback))
            };

            if let Some(((deadline, handle), callback)) = due {
                self.elapsed.set(deadline);
                trace!(handle = handle.id(), at = ?deadline, "manual timer fired");
                callback();
                fired += 1;
            }
        }

        self.elapsed.set(target);
        fired
    }

    /// Convenience for `advance(Duration::from_millis(ms))`
    pub fn tick(
        &self,
        ms: u64,
    ) -> usize {
        self.advance(Duration::from_millis(ms))
    }

    /// Fires every pending callback regardless of deadline, including ones
    /// scheduled while running.
    pub fn run_all(&self) -> usize {
        let mut fired = 0;
        loop {
            let last = match self.queue.borrow().keys().next_back() {
                Some(&(deadline, _)) => deadline,
                None => break,
            };
            fired += self.advance(last.saturating_sub(self.elapsed.get()));
        }
        fired
    }
}

impl TimerFacility for ManualTimer {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }

    fn schedule(
        &self,
        delay: Duration,
        callback: TimerCallback,
    ) -> TimerHandle {
        let handle = TimerHandle::from(self.next_id.get());
        self.next_id.set(handle.id() + 1);

        let deadline = self.elapsed.get() + delay;
        self.queue.borrow_mut().insert((deadline, handle), callback);
        trace!(handle = handle.id(), ?delay, "manual timer scheduled");
        handle
    }

    fn cancel(
        &self,
        handle: TimerHandle,
    ) {
        // Dropped outside the borrow: a callback may own the last handle to its debouncer
        let removed = {
            let mut queue = self.queue.borrow_mut();
            let key = queue.keys().find(|(_, h)| *h == handle).copied();
            key.and_then(|key| queue.remove(&key))
        };
        if removed.is_some() {
            trace!(handle = handle.id(), "manual timer cancelled");
        }
    }
}
