use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::Rc;
use std::rc::Weak;
use std::time::Duration;
use std::time::Instant;

use tokio::sync::oneshot;
use tracing::debug;
use tracing::trace;

use super::receiver::ContextGuard;
use super::Deferred;
use super::Receiver;
use crate::Result;
use crate::SubscriptionId;
use crate::TimerFacility;
use crate::TimerHandle;
use crate::VisibilitySignal;

/// The debounced callable: receives the captured receiver (if any) and the
/// captured arguments.
pub type Wrapped<A, R> = Rc<dyn Fn(Option<&Receiver>, A) -> R>;

/// Collapses bursts of invocations into at most one execution of a wrapped
/// callable per quiet window.
///
/// In trailing mode the execution happens once `wait` has passed without a
/// new invocation, using the arguments of the latest one. In immediate mode
/// the first invocation of a burst executes synchronously and further
/// invocations are swallowed until `wait` has passed.
///
/// Cloning yields another handle onto the same state machine. Handles are
/// single-threaded (`!Send`); every transition happens on the thread that
/// drives the timer facility.
pub struct Debouncer<A, R> {
    inner: Rc<Inner<A, R>>,
}

struct Inner<A, R> {
    wrapped: Wrapped<A, R>,
    wait: Duration,
    immediate: bool,
    timer: Rc<dyn TimerFacility>,
    visibility: Rc<dyn VisibilitySignal>,
    state: RefCell<State<A, R>>,
}

/// Idle: `scheduled` is false and nothing is captured.
/// Scheduled: a timer is outstanding and `pending` holds the latest call
/// (in immediate mode `pending` is only filled by swallowed calls).
///
/// `timer_handle` and `subscription` lag behind `scheduled` while a cycle is
/// being armed, since the collaborators are called without the borrow held.
struct State<A, R> {
    scheduled: bool,
    /// Bumped on every Idle → Scheduled transition; timer and visibility
    /// callbacks from an earlier cycle are ignored.
    cycle: u64,
    timer_handle: Option<TimerHandle>,
    pending: Option<PendingCall<A>>,
    /// Trailing: time of the latest invocation. Immediate: time of the
    /// leading execution.
    last_call_at: Option<Instant>,
    last_result: Option<R>,
    guard: ContextGuard,
    waiters: Vec<oneshot::Sender<R>>,
    subscription: Option<SubscriptionId>,
}

struct PendingCall<A> {
    receiver: Option<Receiver>,
    args: A,
}

/// Everything a transition to Idle hands back, released outside the borrow
struct Released<A, R> {
    timer_handle: Option<TimerHandle>,
    pending: Option<PendingCall<A>>,
    waiters: Vec<oneshot::Sender<R>>,
    subscription: Option<SubscriptionId>,
}

impl<A, R> State<A, R> {
    fn begin_cycle(&mut self) -> u64 {
        self.scheduled = true;
        self.cycle = self.cycle.wrapping_add(1);
        self.cycle
    }

    fn is_current(
        &self,
        cycle: u64,
    ) -> bool {
        self.scheduled && self.cycle == cycle
    }

    fn take_idle(&mut self) -> Released<A, R> {
        self.scheduled = false;
        Released {
            timer_handle: self.timer_handle.take(),
            pending: self.pending.take(),
            waiters: mem::take(&mut self.waiters),
            subscription: self.subscription.take(),
        }
    }
}

impl<A, R> Clone for Debouncer<A, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A, R> fmt::Debug for Debouncer<A, R> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("wait", &self.inner.wait)
            .field("immediate", &self.inner.immediate)
            .field("pending", &self.inner.state.borrow().scheduled)
            .finish()
    }
}

impl<A: 'static, R: Clone + 'static> Debouncer<A, R> {
    pub(crate) fn new(
        wrapped: Wrapped<A, R>,
        wait: Duration,
        immediate: bool,
        timer: Rc<dyn TimerFacility>,
        visibility: Rc<dyn VisibilitySignal>,
    ) -> Self {
        debug!(?wait, immediate, "debouncer created");
        Self {
            inner: Rc::new(Inner {
                wrapped,
                wait,
                immediate,
                timer,
                visibility,
                state: RefCell::new(State {
                    scheduled: false,
                    cycle: 0,
                    timer_handle: None,
                    pending: None,
                    last_call_at: None,
                    last_result: None,
                    guard: ContextGuard::default(),
                    waiters: Vec::new(),
                    subscription: None,
                }),
            }),
        }
    }

    /// Invokes without a receiver.
    ///
    /// Returns `Some(result)` only for an immediate-mode leading call; every
    /// other invocation yields `None` and its effect is observed through the
    /// eventual execution.
    pub fn call(
        &self,
        args: A,
    ) -> Option<R> {
        self.invoke(None, args, None)
    }

    /// Invokes on `receiver`, as a method shared between instances.
    ///
    /// # Errors
    /// `Error::ContextMismatch` when a different instance of the receiver's
    /// type has already used this debouncer. The rejected call is discarded
    /// and the debouncer stays usable.
    pub fn call_with(
        &self,
        receiver: &Receiver,
        args: A,
    ) -> Result<Option<R>> {
        self.admit(receiver)?;
        Ok(self.invoke(Some(receiver), args, None))
    }

    /// Invokes without a receiver, returning a future of the execution that
    /// will consume this call.
    pub fn call_deferred(
        &self,
        args: A,
    ) -> Deferred<R> {
        let (tx, deferred) = Deferred::channel();
        self.invoke(None, args, Some(tx));
        deferred
    }

    /// Receiver-carrying form of [`call_deferred`](Self::call_deferred).
    pub fn call_deferred_with(
        &self,
        receiver: &Receiver,
        args: A,
    ) -> Result<Deferred<R>> {
        self.admit(receiver)?;
        let (tx, deferred) = Deferred::channel();
        self.invoke(Some(receiver), args, Some(tx));
        Ok(deferred)
    }

    /// Cancels any outstanding timer and discards the captured call without
    /// executing it. No-op when idle.
    pub fn clear(&self) {
        let released = {
            let mut state = self.inner.state.borrow_mut();
            if !state.scheduled {
                return;
            }
            state.take_idle()
        };
        debug!(discarded_waiters = released.waiters.len(), "debouncer cleared");
        self.release(released);
    }

    /// Executes the captured call now, if one is scheduled, and returns its
    /// result. The original timer will not fire. No-op when idle.
    pub fn flush(&self) -> Option<R> {
        let mut released = {
            let mut state = self.inner.state.borrow_mut();
            if !state.scheduled {
                return None;
            }
            state.take_idle()
        };
        let call = released.pending.take();
        let waiters = mem::take(&mut released.waiters);
        self.release(released);

        match call {
            Some(call) => {
                debug!("debouncer flushed");
                Some(self.execute(call, waiters))
            }
            None => {
                // Immediate mode with nothing swallowed: only the suppression ends
                debug!("debouncer flushed with nothing captured");
                None
            }
        }
    }

    /// Always executes, with the captured call or with default arguments and
    /// no receiver, then leaves the debouncer idle. The next invocation
    /// starts a fresh cycle.
    pub fn trigger(&self) -> R
    where
        A: Default,
    {
        let mut released = self.inner.state.borrow_mut().take_idle();
        let call = released.pending.take().unwrap_or_else(|| PendingCall {
            receiver: None,
            args: A::default(),
        });
        let waiters = mem::take(&mut released.waiters);
        self.release(released);

        debug!("debouncer triggered");
        self.execute(call, waiters)
    }

    /// True while a timer is outstanding
    pub fn is_pending(&self) -> bool {
        self.inner.state.borrow().scheduled
    }

    /// Value returned by the most recent actual execution
    pub fn last_result(&self) -> Option<R> {
        self.inner.state.borrow().last_result.clone()
    }

    pub fn wait(&self) -> Duration {
        self.inner.wait
    }

    pub fn is_immediate(&self) -> bool {
        self.inner.immediate
    }

    fn admit(
        &self,
        receiver: &Receiver,
    ) -> Result<()> {
        self.inner.state.borrow_mut().guard.admit(receiver)
    }

    /// Captures an admitted call. Collaborators (timer facility, visibility
    /// signal, wrapped callable) are only called once the borrow is released.
    fn invoke(
        &self,
        receiver: Option<&Receiver>,
        args: A,
        waiter: Option<oneshot::Sender<R>>,
    ) -> Option<R> {
        let now = self.inner.timer.now();
        let call = PendingCall {
            receiver: receiver.cloned(),
            args,
        };
        let mut state = self.inner.state.borrow_mut();

        if self.inner.immediate {
            if state.scheduled {
                trace!("immediate call swallowed");
                state.pending = Some(call);
                state.waiters.extend(waiter);
                return None;
            }

            // Suppression starts before the leading execution, so a call made
            // from inside the wrapped callable is swallowed rather than re-run
            state.last_call_at = Some(now);
            let cycle = state.begin_cycle();
            drop(state);
            self.arm_timer(cycle, self.inner.wait);

            trace!("immediate call executing on leading edge");
            return Some(self.execute(call, waiter.into_iter().collect()));
        }

        state.pending = Some(call);
        state.last_call_at = Some(now);
        state.waiters.extend(waiter);

        if state.scheduled {
            trace!("trailing call captured, timer kept");
            return None;
        }

        let cycle = state.begin_cycle();
        drop(state);
        trace!(wait = ?self.inner.wait, "trailing call scheduled");
        self.arm_timer(cycle, self.inner.wait);
        self.watch_visibility(cycle);
        None
    }

    fn on_timer_fired(
        &self,
        cycle: u64,
    ) {
        let mut state = self.inner.state.borrow_mut();
        if !state.is_current(cycle) {
            trace!(cycle, "stale timer ignored");
            return;
        }
        state.timer_handle = None;

        let now = self.inner.timer.now();
        if let Some(last) = state.last_call_at {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.inner.wait {
                let remaining = self.inner.wait - elapsed;
                drop(state);
                trace!(?remaining, "quiet window not over, rescheduled");
                self.arm_timer(cycle, remaining);
                return;
            }
        }

        let mut released = state.take_idle();
        drop(state);
        let call = released.pending.take();
        let waiters = mem::take(&mut released.waiters);
        self.release(released);

        if self.inner.immediate {
            // Swallowed calls never run on the trailing edge
            trace!(dropped = call.is_some(), "suppression window ended");
            return;
        }

        if let Some(call) = call {
            debug!("quiet window elapsed, executing");
            self.execute(call, waiters);
        }
    }

    /// Runs the wrapped callable. Callers must have released the state
    /// borrow: the callable may re-enter the debouncer.
    fn execute(
        &self,
        call: PendingCall<A>,
        waiters: Vec<oneshot::Sender<R>>,
    ) -> R {
        let result = (self.inner.wrapped)(call.receiver.as_ref(), call.args);
        self.inner.state.borrow_mut().last_result = Some(result.clone());
        for waiter in waiters {
            let _ = waiter.send(result.clone());
        }
        result
    }

    /// Schedules the timer of `cycle`. The facility may fire the callback
    /// before returning; a handle for a cycle that already ended is
    /// cancelled instead of stored.
    fn arm_timer(
        &self,
        cycle: u64,
        delay: Duration,
    ) {
        let this = self.clone();
        let handle = self.inner.timer.schedule(delay, Box::new(move || this.on_timer_fired(cycle)));

        let mut state = self.inner.state.borrow_mut();
        if state.is_current(cycle) && state.timer_handle.is_none() {
            state.timer_handle = Some(handle);
            return;
        }
        drop(state);
        trace!(handle = handle.id(), "cycle settled while arming, timer cancelled");
        self.inner.timer.cancel(handle);
    }

    /// Subscribes `cycle` to the host's hidden transition, firing at once if
    /// the host is already hidden.
    fn watch_visibility(
        &self,
        cycle: u64,
    ) {
        let weak: Weak<Inner<A, R>> = Rc::downgrade(&self.inner);
        let id = self.inner.visibility.subscribe(Rc::new(move || {
            if let Some(inner) = weak.upgrade() {
                let debounced = Debouncer { inner };
                if debounced.inner.state.borrow().is_current(cycle) {
                    debug!("host hidden, firing early");
                    debounced.flush();
                }
            }
        }));

        let mut state = self.inner.state.borrow_mut();
        if !state.is_current(cycle) {
            drop(state);
            self.inner.visibility.unsubscribe(id);
            return;
        }
        state.subscription = Some(id);
        drop(state);

        if self.inner.visibility.is_hidden() {
            debug!("host already hidden, firing early");
            self.flush();
        }
    }

    /// Cancels the timer and drops the subscription and captured data
    fn release(
        &self,
        released: Released<A, R>,
    ) {
        if let Some(handle) = released.timer_handle {
            self.inner.timer.cancel(handle);
        }
        if let Some(id) = released.subscription {
            self.inner.visibility.unsubscribe(id);
        }
    }
}
