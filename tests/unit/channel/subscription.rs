use super::*;

use std::{cell::Cell, rc::Rc};

fn counting(counter: &Rc<Cell<u32>>) -> Subscription {
    let counter = Rc::clone(counter);
    Subscription::new(move || counter.set(counter.get() + 1))
}

#[test]
fn teardown_runs_once() {
    let hits = Rc::new(Cell::new(0));
    let mut sub = counting(&hits);
    sub.unsubscribe();
    sub.unsubscribe();
    drop(sub);
    assert_eq!(hits.get(), 1);
}

#[test]
fn set_releases_all_and_stays_closed() {
    let hits = Rc::new(Cell::new(0));
    let set = SubscriptionSet::new();
    set.add(counting(&hits));
    set.add(counting(&hits));
    assert_eq!(set.len(), 2);

    set.unsubscribe_all();
    set.unsubscribe_all();
    assert_eq!(hits.get(), 2);
    assert!(set.is_empty());
    assert!(set.is_closed());

    set.add(counting(&hits));
    assert_eq!(hits.get(), 3, "late additions are released immediately");
    assert!(set.is_empty());
}

#[test]
fn closed_handle_is_inert() {
    let mut sub = Subscription::closed();
    assert!(sub.is_closed());
    sub.unsubscribe();
}
