//! Construction of [`Debouncer`]s.
//!
//! Arguments are validated in the order a caller would supply them: the
//! callable first, then the wait, then the options. All failures surface as
//! `Error::InvalidArgument` from [`DebounceBuilder::build`].

use std::rc::Rc;
use std::time::Duration;

use super::Debouncer;
use super::Receiver;
use super::Wrapped;
use crate::config::validate_wait_ms;
use crate::constants::DEFAULT_WAIT_MS;
use crate::DebounceConfig;
use crate::DebounceOptions;
use crate::InvalidArgument;
use crate::NoVisibility;
use crate::OptionsArg;
use crate::Result;
use crate::TimerFacility;
use crate::VisibilitySignal;

pub struct DebounceBuilder<A, R> {
    timer: Rc<dyn TimerFacility>,
    callable: Option<Wrapped<A, R>>,
    wait_ms: Option<i64>,
    options: Option<OptionsArg>,
    visibility: Rc<dyn VisibilitySignal>,
}

impl<A: 'static, R: Clone + 'static> DebounceBuilder<A, R> {
    pub fn new(timer: Rc<dyn TimerFacility>) -> Self {
        Self {
            timer,
            callable: None,
            wait_ms: None,
            options: None,
            visibility: Rc::new(NoVisibility),
        }
    }

    pub fn callable<F>(
        mut self,
        f: F,
    ) -> Self
    where
        F: Fn(Option<&Receiver>, A) -> R + 'static,
    {
        self.callable = Some(Rc::new(f));
        self
    }

    /// Quiet window in milliseconds; negative values are rejected by `build`
    pub fn wait_ms(
        mut self,
        wait_ms: i64,
    ) -> Self {
        self.wait_ms = Some(wait_ms);
        self
    }

    /// Quiet window with millisecond precision. A sub-millisecond remainder
    /// rounds up so the window is never shorter than requested.
    pub fn wait(
        self,
        wait: Duration,
    ) -> Self {
        let wait_ms = i64::try_from(wait.as_nanos().div_ceil(1_000_000)).unwrap_or(i64::MAX);
        self.wait_ms(wait_ms)
    }

    pub fn options(
        mut self,
        options: impl Into<OptionsArg>,
    ) -> Self {
        self.options = Some(options.into());
        self
    }

    pub fn immediate(
        self,
        immediate: bool,
    ) -> Self {
        self.options(DebounceOptions { immediate })
    }

    /// Source of "became hidden" notifications for early firing
    pub fn visibility(
        mut self,
        visibility: Rc<dyn VisibilitySignal>,
    ) -> Self {
        self.visibility = visibility;
        self
    }

    /// Takes wait and options from a loaded configuration
    pub fn config(
        self,
        config: &DebounceConfig,
    ) -> Self {
        self.wait_ms(config.wait_ms).options(config.options)
    }

    pub fn build(self) -> Result<Debouncer<A, R>> {
        let wrapped = self.callable.ok_or(InvalidArgument::NotCallable)?;
        let wait = validate_wait_ms(self.wait_ms.unwrap_or(DEFAULT_WAIT_MS))?;
        let options = match self.options {
            Some(options) => options.resolve()?,
            None => DebounceOptions::default(),
        };

        Ok(Debouncer::new(wrapped, wait, options.immediate, self.timer, self.visibility))
    }
}

/// Wraps `f` so that bursts of calls collapse into one execution.
///
/// `wait_ms` defaults to 100; `options` must be `{ immediate: bool }` when
/// given.
///
/// # Example
/// ```ignore
/// let timer = Rc::new(ManualTimer::new());
/// let save = debounce(timer.clone(), |_, doc: String| persist(doc), Some(250), None)?;
/// save.call("draft 1".into());
/// save.call("draft 2".into());
/// timer.tick(250); // persists "draft 2" once
/// ```
pub fn debounce<A, R, F>(
    timer: Rc<dyn TimerFacility>,
    f: F,
    wait_ms: Option<i64>,
    options: Option<OptionsArg>,
) -> Result<Debouncer<A, R>>
where
    A: 'static,
    R: Clone + 'static,
    F: Fn(Option<&Receiver>, A) -> R + 'static,
{
    let mut builder = DebounceBuilder::new(timer).callable(f);
    if let Some(wait_ms) = wait_ms {
        builder = builder.wait_ms(wait_ms);
    }
    if let Some(options) = options {
        builder = builder.options(options);
    }
    builder.build()
}

impl<A: 'static, R: Clone + 'static> Debouncer<A, R> {
    pub fn builder(timer: Rc<dyn TimerFacility>) -> DebounceBuilder<A, R> {
        DebounceBuilder::new(timer)
    }

    /// Builds a debouncer from a loaded [`DebounceConfig`]
    pub fn from_config<F>(
        timer: Rc<dyn TimerFacility>,
        config: &DebounceConfig,
        f: F,
    ) -> Result<Self>
    where
        F: Fn(Option<&Receiver>, A) -> R + 'static,
    {
        DebounceBuilder::new(timer).callable(f).config(config).build()
    }
}
