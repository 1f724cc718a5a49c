use std::{
    any::Any,
    cell::{Cell, RefCell},
    panic::{AssertUnwindSafe, catch_unwind},
    rc::{Rc, Weak},
};

use crate::{
    channel::subscription::Subscription,
    foundation::error::{DyndashError, DyndashResult},
};

/// Receiver of values published on a [`StateChannel`].
///
/// Closures `FnMut(&T)` implement this trait; implement it by hand to also observe completion.
pub trait Observer<T> {
    /// Called with the replayed latest value on subscribe, then with every published value.
    fn next(&mut self, value: &T);

    /// Called once when the channel is closed.
    fn complete(&mut self) {}
}

impl<T, F> Observer<T> for F
where
    F: FnMut(&T),
{
    fn next(&mut self, value: &T) {
        self(value)
    }
}

/// Outcome counters of one [`StateChannel::publish`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Observers that received the value and returned normally.
    pub delivered: usize,
    /// Observers that panicked; the panic was caught and logged.
    pub faulted: usize,
    /// Observers busy in an outer delivery; they receive the value once that call returns.
    pub deferred: usize,
}

impl Delivery {
    pub fn is_clean(&self) -> bool {
        self.faulted == 0
    }

    /// Faults as an error, for callers that treat a panicking observer as fatal.
    pub fn check(self) -> DyndashResult<Self> {
        if self.is_clean() {
            return Ok(self);
        }
        Err(DyndashError::observer(format!(
            "{} of {} observers panicked",
            self.faulted,
            self.delivered + self.faulted + self.deferred
        )))
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Delivered => self.delivered += 1,
            Outcome::Faulted => self.faulted += 1,
            Outcome::Deferred => self.deferred += 1,
            Outcome::Skipped => {}
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Delivered,
    Faulted,
    Deferred,
    Skipped,
}

struct Slot<T> {
    id: u64,
    active: Cell<bool>,
    /// Sequence number of the newest value handed to this observer.
    seen: Cell<u64>,
    observer: RefCell<Box<dyn Observer<T>>>,
    pending: RefCell<Option<(u64, T)>>,
}

struct Inner<T> {
    latest: T,
    /// Sequence number of `latest`; the initial value is 1.
    seq: u64,
    slots: Vec<Rc<Slot<T>>>,
    next_id: u64,
    closed: bool,
}

/// Single-value replay publish/subscribe channel.
///
/// Holds the latest value; new subscribers get it immediately, then every later publish.
/// Delivery is synchronous, in subscription order, over a snapshot of the subscribers taken when
/// the publish starts: observers added during a publish are not called by it (they already got the
/// replay), observers removed during a publish are not called after their removal. An observer
/// that already received a newer value from a nested publish is not handed the older one.
pub struct StateChannel<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T: Clone + 'static> StateChannel<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                latest: initial,
                seq: 1,
                slots: Vec::new(),
                next_id: 1,
                closed: false,
            })),
        }
    }

    /// Clone of the latest published value.
    pub fn latest(&self) -> T {
        self.inner.borrow().latest.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .slots
            .iter()
            .filter(|s| s.active.get())
            .count()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.borrow().closed
    }

    /// Store `value` as latest and deliver it to every current subscriber.
    ///
    /// Publishing on a closed channel is ignored.
    pub fn publish(&self, value: T) -> Delivery {
        let (seq, snapshot) = {
            let mut inner = self.inner.borrow_mut();
            if inner.closed {
                tracing::debug!("publish on closed channel ignored");
                return Delivery::default();
            }
            inner.latest = value.clone();
            inner.seq += 1;
            inner.slots.retain(|s| s.active.get());
            (inner.seq, inner.slots.clone())
        };

        let mut delivery = Delivery::default();
        for slot in &snapshot {
            delivery.record(deliver(slot, seq, &value));
        }
        if delivery.faulted > 0 {
            tracing::warn!(
                faulted = delivery.faulted,
                delivered = delivery.delivered,
                "observers faulted during publish"
            );
        }
        delivery
    }

    /// Register a callback; it receives the latest value before this call returns.
    pub fn subscribe(&self, next: impl FnMut(&T) + 'static) -> Subscription {
        self.subscribe_observer(next)
    }

    /// Register `observer`; it receives the latest value before this call returns.
    ///
    /// On a closed channel the observer is completed at once and an inert handle is returned.
    pub fn subscribe_observer(&self, observer: impl Observer<T> + 'static) -> Subscription {
        let mut observer: Box<dyn Observer<T>> = Box::new(observer);
        let (slot, seq, latest) = {
            let mut inner = self.inner.borrow_mut();
            if inner.closed {
                drop(inner);
                complete(&mut *observer);
                return Subscription::closed();
            }
            let id = inner.next_id;
            inner.next_id += 1;
            let slot = Rc::new(Slot {
                id,
                active: Cell::new(true),
                seen: Cell::new(0),
                observer: RefCell::new(observer),
                pending: RefCell::new(None),
            });
            inner.slots.push(Rc::clone(&slot));
            (slot, inner.seq, inner.latest.clone())
        };

        deliver(&slot, seq, &latest);

        let channel = Rc::downgrade(&self.inner);
        let weak_slot = Rc::downgrade(&slot);
        Subscription::new(move || detach(&channel, &weak_slot))
    }

    /// Complete and detach every subscriber; later subscribes yield inert handles.
    pub fn close(&self) {
        let slots = {
            let mut inner = self.inner.borrow_mut();
            if inner.closed {
                return;
            }
            inner.closed = true;
            std::mem::take(&mut inner.slots)
        };

        for slot in slots {
            if !slot.active.replace(false) {
                continue;
            }
            match slot.observer.try_borrow_mut() {
                Ok(mut observer) => complete(&mut **observer),
                Err(_) => {
                    tracing::trace!(subscriber = slot.id, "channel closed from inside its observer")
                }
            }
        }
    }
}

impl<T> std::fmt::Debug for StateChannel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.try_borrow() {
            Ok(inner) => f
                .debug_struct("StateChannel")
                .field("subscribers", &inner.slots.len())
                .field("closed", &inner.closed)
                .finish(),
            Err(_) => f.write_str("StateChannel { <busy> }"),
        }
    }
}

fn detach<T>(channel: &Weak<RefCell<Inner<T>>>, slot: &Weak<Slot<T>>) {
    let Some(slot) = slot.upgrade() else {
        return;
    };
    slot.active.set(false);
    slot.pending.borrow_mut().take();

    let Some(inner) = channel.upgrade() else {
        return;
    };
    // A busy channel leaves an inactive slot behind; the next publish prunes it.
    let removed = match inner.try_borrow_mut() {
        Ok(mut inner) => inner
            .slots
            .iter()
            .position(|s| s.id == slot.id)
            .map(|i| inner.slots.remove(i)),
        Err(_) => None,
    };
    drop(removed);
}

fn deliver<T: Clone>(slot: &Slot<T>, seq: u64, value: &T) -> Outcome {
    if !slot.active.get() || slot.seen.get() >= seq {
        return Outcome::Skipped;
    }
    let Ok(mut observer) = slot.observer.try_borrow_mut() else {
        // Nested publish from inside this observer; hand the value over once it returns.
        *slot.pending.borrow_mut() = Some((seq, value.clone()));
        return Outcome::Deferred;
    };

    slot.seen.set(seq);
    let mut outcome = call_next(slot.id, &mut **observer, value);
    loop {
        let next = slot.pending.borrow_mut().take();
        let Some((next_seq, next)) = next else {
            break;
        };
        if !slot.active.get() {
            break;
        }
        if next_seq <= slot.seen.get() {
            continue;
        }
        slot.seen.set(next_seq);
        if call_next(slot.id, &mut **observer, &next) == Outcome::Faulted {
            outcome = Outcome::Faulted;
        }
    }
    outcome
}

fn call_next<T>(id: u64, observer: &mut dyn Observer<T>, value: &T) -> Outcome {
    match catch_unwind(AssertUnwindSafe(|| observer.next(value))) {
        Ok(()) => Outcome::Delivered,
        Err(payload) => {
            tracing::error!(
                subscriber = id,
                panic = %panic_message(payload.as_ref()),
                "observer panicked; continuing delivery"
            );
            Outcome::Faulted
        }
    }
}

fn complete<T>(observer: &mut dyn Observer<T>) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(|| observer.complete())) {
        tracing::error!(
            panic = %panic_message(payload.as_ref()),
            "observer panicked on completion"
        );
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/channel/replay.rs"]
mod tests;
