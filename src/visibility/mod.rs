//! Page/tab visibility signal.
//!
//! Interactive hosts may discard a hidden process before a trailing
//! debounce fires. A [`VisibilitySignal`] lets a debouncer subscribe to
//! "became hidden" while it holds a pending call and fire early. Hosts
//! without such a signal use [`NoVisibility`].

use std::cell::Cell;
use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

/// Handler invoked when the host transitions to hidden
pub type VisibilityHandler = Rc<dyn Fn()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl From<u64> for SubscriptionId {
    fn from(id: u64) -> Self {
        SubscriptionId(id)
    }
}

pub trait VisibilitySignal {
    /// Current reading. A debouncer consults it right after subscribing so
    /// a call scheduled on an already hidden host still fires early.
    fn is_hidden(&self) -> bool;

    /// Registers `handler` for visible → hidden transitions. Implementations
    /// may invoke the handler before returning.
    fn subscribe(
        &self,
        handler: VisibilityHandler,
    ) -> SubscriptionId;

    fn unsubscribe(
        &self,
        id: SubscriptionId,
    );
}

/// Signal source for hosts that never become hidden
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVisibility;

impl VisibilitySignal for NoVisibility {
    fn is_hidden(&self) -> bool {
        false
    }

    fn subscribe(
        &self,
        _handler: VisibilityHandler,
    ) -> SubscriptionId {
        SubscriptionId(0)
    }

    fn unsubscribe(
        &self,
        _id: SubscriptionId,
    ) {
    }
}

/// In-process signal source toggled with [`set_hidden`](ManualVisibility::set_hidden)
#[derive(Default)]
pub struct ManualVisibility {
    hidden: Cell<bool>,
    next_id: Cell<u64>,
    handlers: RefCell<Vec<(SubscriptionId, VisibilityHandler)>>,
}

impl ManualVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Updates the reading; a visible → hidden transition notifies every
    /// current subscriber.
    pub fn set_hidden(
        &self,
        hidden: bool,
    ) {
        let was_hidden = self.hidden.replace(hidden);
        if was_hidden || !hidden {
            return;
        }

        // Handlers usually unsubscribe themselves, so run them from a snapshot
        let handlers: Vec<VisibilityHandler> = self.handlers.borrow().iter().map(|(_, h)| Rc::clone(h)).collect();
        debug!(subscribers = handlers.len(), "host became hidden");
        for handler in handlers {
            handler();
        }
    }
}

impl VisibilitySignal for ManualVisibility {
    fn is_hidden(&self) -> bool {
        self.hidden.get()
    }

    fn subscribe(
        &self,
        handler: VisibilityHandler,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get() + 1);
        self.next_id.set(id.0);
        self.handlers.borrow_mut().push((id, handler));
        id
    }

    fn unsubscribe(
        &self,
        id: SubscriptionId,
    ) {
        self.handlers.borrow_mut().retain(|(sid, _)| *sid != id);
    }
}
