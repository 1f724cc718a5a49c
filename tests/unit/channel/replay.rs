use super::*;

use std::{cell::RefCell, rc::Rc};

fn recorder() -> (Rc<RefCell<Vec<u32>>>, impl FnMut(&u32) + 'static) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    (seen, move |v: &u32| sink.borrow_mut().push(*v))
}

#[test]
fn late_subscriber_gets_latest_value_only() {
    let ch = StateChannel::new(0u32);
    for v in 1..=5 {
        ch.publish(v);
    }
    let (seen, obs) = recorder();
    let _sub = ch.subscribe(obs);
    assert_eq!(*seen.borrow(), vec![5]);

    ch.publish(6);
    assert_eq!(*seen.borrow(), vec![5, 6]);
}

#[test]
fn delivery_follows_subscription_order() {
    let ch = StateChannel::new(0u32);
    let order = Rc::new(RefCell::new(Vec::new()));
    let subs: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .map(|name| {
            let order = Rc::clone(&order);
            ch.subscribe(move |v: &u32| order.borrow_mut().push((name, *v)))
        })
        .collect();

    order.borrow_mut().clear();
    let delivery = ch.publish(7);
    assert_eq!(delivery.delivered, 3);
    assert_eq!(*order.borrow(), vec![("a", 7), ("b", 7), ("c", 7)]);
    drop(subs);
}

#[test]
fn unsubscribe_is_idempotent() {
    let ch = StateChannel::new(0u32);
    let (seen, obs) = recorder();
    let mut sub = ch.subscribe(obs);
    sub.unsubscribe();
    sub.unsubscribe();
    assert!(sub.is_closed());
    assert_eq!(ch.subscriber_count(), 0);

    ch.publish(1);
    assert_eq!(*seen.borrow(), vec![0]);
}

#[test]
fn dropping_handle_unsubscribes() {
    let ch = StateChannel::new(0u32);
    let (seen, obs) = recorder();
    drop(ch.subscribe(obs));
    ch.publish(9);
    assert_eq!(*seen.borrow(), vec![0]);
}

#[test]
fn panicking_observer_does_not_block_others() {
    let ch = StateChannel::new(0u32);
    let _bad = ch.subscribe(|v: &u32| {
        if *v > 0 {
            panic!("observer A fails on {v}");
        }
    });
    let (seen, obs) = recorder();
    let _good = ch.subscribe(obs);

    let delivery = ch.publish(3);
    assert_eq!(delivery.faulted, 1);
    assert_eq!(delivery.delivered, 1);
    assert!(!delivery.is_clean());
    assert_eq!(*seen.borrow(), vec![0, 3]);
}

#[test]
fn unsubscribe_from_inside_callback_keeps_delivery_intact() {
    let ch = StateChannel::new(0u32);
    let handle: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

    let slot = Rc::clone(&handle);
    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    let sub = ch.subscribe(move |v: &u32| {
        *counter.borrow_mut() += 1;
        if *v == 1 {
            if let Some(sub) = slot.borrow_mut().as_mut() {
                sub.unsubscribe();
            }
        }
    });
    *handle.borrow_mut() = Some(sub);

    let (seen, obs) = recorder();
    let _other = ch.subscribe(obs);

    ch.publish(1);
    ch.publish(2);
    assert_eq!(*calls.borrow(), 2, "replay + first publish only");
    assert_eq!(*seen.borrow(), vec![0, 1, 2]);
}

#[test]
fn subscribers_added_during_publish_are_not_double_called() {
    let ch = Rc::new(StateChannel::new(0u32));
    let late: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));
    let late_seen = Rc::new(RefCell::new(Vec::new()));

    let ch2 = Rc::clone(&ch);
    let late2 = Rc::clone(&late);
    let late_seen2 = Rc::clone(&late_seen);
    let _sub = ch.subscribe(move |v: &u32| {
        if *v == 1 {
            let sink = Rc::clone(&late_seen2);
            let sub = ch2.subscribe(move |v: &u32| sink.borrow_mut().push(*v));
            late2.borrow_mut().push(sub);
        }
    });

    ch.publish(1);
    assert_eq!(*late_seen.borrow(), vec![1], "replay only, no second call");
    ch.publish(2);
    assert_eq!(*late_seen.borrow(), vec![1, 2]);
}

#[test]
fn nested_publish_reaches_busy_observer_after_it_returns() {
    let ch = Rc::new(StateChannel::new(0u32));
    let seen = Rc::new(RefCell::new(Vec::new()));

    let ch2 = Rc::clone(&ch);
    let sink = Rc::clone(&seen);
    let _sub = ch.subscribe(move |v: &u32| {
        sink.borrow_mut().push(*v);
        if *v == 1 {
            ch2.publish(2);
        }
    });

    let delivery = ch.publish(1);
    assert_eq!(delivery.delivered, 1);
    assert_eq!(*seen.borrow(), vec![0, 1, 2]);
    assert_eq!(ch.latest(), 2);
}

#[test]
fn nested_publish_is_not_overtaken_by_the_outer_value() {
    let ch = Rc::new(StateChannel::new(0u32));

    let ch2 = Rc::clone(&ch);
    let _republisher = ch.subscribe(move |v: &u32| {
        if *v == 1 {
            ch2.publish(2);
        }
    });
    let (seen, obs) = recorder();
    let _recorder = ch.subscribe(obs);

    let delivery = ch.publish(1);
    assert_eq!(ch.latest(), 2);
    assert_eq!(*seen.borrow(), vec![0, 2]);
    assert_eq!(seen.borrow().last(), Some(&ch.latest()));
    assert_eq!(delivery.delivered, 1, "stale value skipped for the second observer");
}

struct Tracked {
    values: Rc<RefCell<Vec<u32>>>,
    completed: Rc<RefCell<bool>>,
}

impl Observer<u32> for Tracked {
    fn next(&mut self, value: &u32) {
        self.values.borrow_mut().push(*value);
    }

    fn complete(&mut self) {
        *self.completed.borrow_mut() = true;
    }
}

#[test]
fn close_completes_and_detaches() {
    let ch = StateChannel::new(1u32);
    let values = Rc::new(RefCell::new(Vec::new()));
    let completed = Rc::new(RefCell::new(false));
    let mut sub = ch.subscribe_observer(Tracked {
        values: Rc::clone(&values),
        completed: Rc::clone(&completed),
    });

    ch.close();
    ch.close();
    assert!(*completed.borrow());
    assert!(ch.is_closed());
    assert_eq!(ch.subscriber_count(), 0);

    assert_eq!(ch.publish(5), Delivery::default());
    assert_eq!(*values.borrow(), vec![1]);
    sub.unsubscribe();

    let late_completed = Rc::new(RefCell::new(false));
    let mut late = ch.subscribe_observer(Tracked {
        values: Rc::new(RefCell::new(Vec::new())),
        completed: Rc::clone(&late_completed),
    });
    assert!(late.is_closed());
    assert!(*late_completed.borrow());
    late.unsubscribe();
}

#[test]
fn check_reports_faults_as_observer_error() {
    let ch = StateChannel::new(0u32);
    let _ok = ch.subscribe(|_: &u32| {});
    assert!(ch.publish(1).check().is_ok());

    let _bad = ch.subscribe(|v: &u32| {
        if *v == 2 {
            panic!("boom");
        }
    });
    let err = ch.publish(2).check().unwrap_err();
    assert!(matches!(err, DyndashError::Observer(_)));
    assert_eq!(err.to_string(), "observer error: 1 of 2 observers panicked");
}
