use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::channel::{replay::StateChannel, subscription::Subscription};

/// Pull-side bridge from a node's channel to a rendering loop.
///
/// Holds the latest state and a changed flag that a frame loop can poll and clear; the channel
/// subscription lives as long as the watch.
pub struct StateWatch<S> {
    latest: Rc<RefCell<Rc<S>>>,
    changed: Rc<Cell<bool>>,
    version: Rc<Cell<u64>>,
    _sub: Subscription,
}

impl<S: 'static> StateWatch<S> {
    pub(crate) fn new(channel: &StateChannel<Rc<S>>) -> Self {
        let latest = Rc::new(RefCell::new(channel.latest()));
        let changed = Rc::new(Cell::new(false));
        let version = Rc::new(Cell::new(0));

        let sink = Rc::clone(&latest);
        let flag = Rc::clone(&changed);
        let counter = Rc::clone(&version);
        let sub = channel.subscribe(move |state: &Rc<S>| {
            *sink.borrow_mut() = Rc::clone(state);
            flag.set(true);
            counter.set(counter.get() + 1);
        });
        // The replay is the starting point, not a change.
        changed.set(false);
        version.set(0);

        Self {
            latest,
            changed,
            version,
            _sub: sub,
        }
    }

    pub fn get(&self) -> Rc<S> {
        Rc::clone(&self.latest.borrow())
    }

    /// True if a state was published since the last [`take_changed`](Self::take_changed).
    pub fn has_changed(&self) -> bool {
        self.changed.get()
    }

    pub fn take_changed(&self) -> bool {
        self.changed.replace(false)
    }

    /// Number of publishes observed since the watch was created.
    pub fn version(&self) -> u64 {
        self.version.get()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/watch.rs"]
mod tests;
