use std::cell::Cell;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use std::time::Instant;

use tokio::task::AbortHandle;
use tracing::trace;

use super::TimerCallback;
use super::TimerFacility;
use super::TimerHandle;

/// Timer facility backed by `tokio::time`.
///
/// Callbacks are spawned with `tokio::task::spawn_local`, so scheduling must
/// happen from inside a `LocalSet`. With a paused runtime clock
/// (`start_paused = true`) firing is fully deterministic.
#[derive(Clone, Default)]
pub struct TokioTimer {
    inner: Rc<TokioTimerInner>,
}

#[derive(Default)]
struct TokioTimerInner {
    next_id: Cell<u64>,
    tasks: RefCell<HashMap<TimerHandle, AbortHandle>>,
}

impl TokioTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of scheduled runs that have neither fired nor been cancelled
    pub fn pending_count(&self) -> usize {
        self.inner.tasks.borrow().len()
    }
}

impl TimerFacility for TokioTimer {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn schedule(
        &self,
        delay: Duration,
        callback: TimerCallback,
    ) -> TimerHandle {
        let id = self.inner.next_id.get() + 1;
        self.inner.next_id.set(id);
        let handle = TimerHandle::from(id);

        let inner = Rc::clone(&self.inner);
        let task = tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            // Deregister before running so a cancel issued from inside the
            // callback does not abort the task that is running it
            if inner.tasks.borrow_mut().remove(&handle).is_some() {
                trace!(handle = handle.id(), "tokio timer fired");
                callback();
            }
        });

        self.inner.tasks.borrow_mut().insert(handle, task.abort_handle());
        trace!(handle = handle.id(), ?delay, "tokio timer scheduled");
        handle
    }

    fn cancel(
        &self,
        handle: TimerHandle,
    ) {
        let task = self.inner.tasks.borrow_mut().remove(&handle);
        if let Some(task) = task {
            task.abort();
            trace!(handle = handle.id(), "tokio timer cancelled");
        }
    }
}
