//! Host timer facility.
//!
//! A debouncer never owns a thread; it asks a [`TimerFacility`] to run a
//! callback once after a delay and to cancel that run. Two facilities ship
//! with the crate:
//! - [`ManualTimer`]: a virtual clock advanced explicitly by the caller
//! - [`TokioTimer`]: `tokio::time` timers on the current `LocalSet`
mod manual_timer;
mod tokio_timer;
pub use manual_timer::*;
pub use tokio_timer::*;


use std::time::Duration;
use std::time::Instant;

#[cfg(test)]
use mockall::automock;

/// Callback run by the facility when a scheduled delay elapses
pub type TimerCallback = Box<dyn FnOnce()>;

/// Opaque ticket for one scheduled run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl From<u64> for TimerHandle {
    fn from(id: u64) -> Self {
        TimerHandle(id)
    }
}

/// Contract:
/// - `callback` runs at most once per `schedule` call
/// - it runs no earlier than `delay` after the call (upper bound is best-effort)
/// - `cancel` on a handle that has not fired yet prevents it from ever firing;
///   cancelling a fired or unknown handle is a no-op
#[cfg_attr(test, automock)]
pub trait TimerFacility {
    /// Current reading of the facility's clock
    fn now(&self) -> Instant;

    fn schedule(
        &self,
        delay: Duration,
        callback: TimerCallback,
    ) -> TimerHandle;

    fn cancel(
        &self,
        handle: TimerHandle,
    );
}
