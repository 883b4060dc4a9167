//! Debounce any callable on a single-threaded event loop.
//!
//! A [`Debouncer`] wraps a callable so that bursts of invocations within a
//! quiet window collapse into at most one execution, either deferred until
//! activity stops (trailing mode) or fired at the start of the burst
//! (immediate mode). Pending work can be cancelled with `clear`, run early
//! with `flush`, or forced with `trigger`.
//!
//! The debouncer owns no thread. Time comes from a pluggable
//! [`TimerFacility`]: [`TokioTimer`] on a `tokio::task::LocalSet`, or
//! [`ManualTimer`] for deterministic stepping.
//!
//! ```ignore
//! let timer = Rc::new(ManualTimer::new());
//! let resize = Debouncer::builder(timer.clone())
//!     .callable(|_, (w, h): (u16, u16)| relayout(w, h))
//!     .wait_ms(50)
//!     .build()?;
//!
//! resize.call((80, 24));
//! resize.call((120, 40));
//! timer.tick(50); // relayout(120, 40) runs once
//! ```

mod config;
mod constants;
mod debouncer;
mod errors;
mod timer;
mod visibility;

pub use self::config::*;
pub use constants::DEFAULT_WAIT_MS;
pub use debouncer::*;
pub use errors::*;
pub use timer::*;
pub use visibility::*;
