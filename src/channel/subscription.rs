use std::cell::RefCell;

/// Handle to one observer registration.
///
/// Dropping the handle unsubscribes. `unsubscribe` is idempotent and may be called from inside the
/// observer's own callback.
#[must_use = "dropping a Subscription immediately unsubscribes the observer"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// A handle that is already closed; returned by channels that have been closed.
    pub fn closed() -> Self {
        Self { teardown: None }
    }

    pub fn is_closed(&self) -> bool {
        self.teardown.is_none()
    }

    pub fn unsubscribe(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Group of subscriptions released together, e.g. the ones a node created for itself.
#[derive(Default)]
pub struct SubscriptionSet {
    subs: RefCell<Vec<Subscription>>,
    closed: std::cell::Cell<bool>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `sub`. Adding to a released set unsubscribes `sub` right away.
    pub fn add(&self, mut sub: Subscription) {
        if self.closed.get() {
            sub.unsubscribe();
            return;
        }
        self.subs.borrow_mut().push(sub);
    }

    pub fn len(&self) -> usize {
        self.subs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    /// Release every tracked subscription. Safe to call repeatedly.
    pub fn unsubscribe_all(&self) {
        self.closed.set(true);
        // Teardowns may re-enter this set; take the list out before running them.
        let subs = std::mem::take(&mut *self.subs.borrow_mut());
        for mut sub in subs {
            sub.unsubscribe();
        }
    }
}

impl std::fmt::Debug for SubscriptionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionSet")
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/channel/subscription.rs"]
mod tests;
