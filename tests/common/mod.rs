use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use debouncer::Debouncer;
use debouncer::ManualTimer;
use debouncer::Receiver;
use debouncer::TimerFacility;

/// Records every execution of a wrapped callable
#[derive(Clone, Default)]
pub struct Spy {
    calls: Rc<RefCell<Vec<Vec<u32>>>>,
}

impl Spy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn args(&self) -> Vec<Vec<u32>> {
        self.calls.borrow().clone()
    }

    /// A callable suitable for `DebounceBuilder::callable`
    pub fn callable(&self) -> impl Fn(Option<&Receiver>, Vec<u32>) -> usize + 'static {
        let calls = Rc::clone(&self.calls);
        move |_: Option<&Receiver>, args: Vec<u32>| {
            calls.borrow_mut().push(args);
            calls.borrow().len()
        }
    }
}

/// Equivalent of `setTimeout(fn, at_ms)` against a virtual clock
pub fn call_later(
    timer: &Rc<ManualTimer>,
    debounced: &Debouncer<Vec<u32>, usize>,
    at_ms: u64,
) {
    let d = debounced.clone();
    timer.schedule(
        Duration::from_millis(at_ms),
        Box::new(move || {
            d.call(Vec::new());
        }),
    );
}
