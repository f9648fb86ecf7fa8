// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::cell::RefCell;
use std::rc::Rc;

use deferred::{Deferred, Resolution, State, Thenable};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A minimal foreign thenable: callers subscribe, the test fires it by hand.
#[derive(Clone, Default)]
struct Manual {
    subscribers: Rc<RefCell<Vec<(Box<dyn FnOnce(i32)>, Box<dyn FnOnce(String)>)>>>,
}

impl Manual {
    fn fulfill(&self, val: i32) {
        let subscribers = self.subscribers.borrow_mut().drain(..).collect::<Vec<_>>();
        for (on_fulfilled, _) in subscribers {
            on_fulfilled(val);
        }
    }

    fn reject(&self, err: &str) {
        let subscribers = self.subscribers.borrow_mut().drain(..).collect::<Vec<_>>();
        for (_, on_rejected) in subscribers {
            on_rejected(err.to_owned());
        }
    }
}

impl Thenable<i32, String> for Manual {
    fn subscribe(&self, on_fulfilled: Box<dyn FnOnce(i32)>, on_rejected: Box<dyn FnOnce(String)>) {
        self.subscribers.borrow_mut().push((on_fulfilled, on_rejected));
    }
}

#[test]
fn test_value_flows_through_handlers() {
    init();

    let captured = Rc::new(RefCell::new(None));

    let d: Deferred<String, String> = Deferred::new(|res, _| {
        res.fulfill("x".to_owned());
        Ok(())
    });

    let c = captured.clone();
    d.then(|v| Resolution::Fulfill(v + "y"))
        .map(move |v| *c.borrow_mut() = Some(v));

    assert_eq!(*captured.borrow(), Some("xy".to_owned()));
}

#[test]
fn test_start_routine_failure_is_caught() {
    init();

    let captured = Rc::new(RefCell::new(None));

    let d: Deferred<(), &'static str> = Deferred::new(|_, _| Err("E"));
    assert_eq!(d.state(), State::Rejected);

    let c = captured.clone();
    let next = d.catch(move |err| {
        *c.borrow_mut() = Some(err);
        Resolution::Fulfill(())
    });

    assert_eq!(*captured.borrow(), Some("E"));
    assert!(next.is_fulfilled());
}

#[test]
fn test_resolve_then_double() {
    init();

    let d = Deferred::<i32, ()>::resolve(5).then(|v| Resolution::Fulfill(v * 2));
    assert_eq!(d.state(), State::Fulfilled);
    assert_eq!(d.value(), Some(10));
}

#[test]
fn test_handler_returning_deferred_is_flattened() {
    init();

    let d = Deferred::<(), String>::resolve(())
        .then(|_| Resolution::adopt(Deferred::<i32, String>::resolve(42)));

    assert_eq!(d.value(), Some(42));
}

#[test]
fn test_flattening_waits_for_every_level() {
    init();

    let innermost: Deferred<i32, String> = Deferred::pending();

    let i = innermost.clone();
    let middle = Deferred::<(), String>::resolve(()).then(move |_| Resolution::adopt(i));

    let m = middle.clone();
    let outer = Deferred::<(), String>::resolve(()).then(move |_| Resolution::adopt(m));

    assert!(middle.is_pending());
    assert!(outer.is_pending());

    innermost.resolver().fulfill(99);

    assert_eq!(middle.value(), Some(99));
    assert_eq!(outer.value(), Some(99));
}

#[test]
fn test_flattening_adopts_rejection() {
    init();

    let inner: Deferred<i32, String> = Deferred::pending();

    let i = inner.clone();
    let outer = Deferred::<(), String>::resolve(()).then(move |_| Resolution::adopt(i));

    inner.rejecter().reject("inner failed".to_owned());
    assert_eq!(outer.reason(), Some("inner failed".to_owned()));
}

#[test]
fn test_foreign_thenable_is_adopted() {
    init();

    let foreign = Manual::default();

    let f = foreign.clone();
    let ok = Deferred::<(), String>::resolve(())
        .then(move |_| Resolution::<i32, String>::adopt(f));
    assert!(ok.is_pending());
    foreign.fulfill(7);
    assert_eq!(ok.value(), Some(7));

    let foreign = Manual::default();
    let failed = Deferred::<i32, String>::adopt(foreign.clone());
    foreign.reject("nope");
    assert_eq!(failed.reason(), Some("nope".to_owned()));
}

#[test]
fn test_failure_handler_can_adopt() {
    init();

    let d = Deferred::<i32, String>::reject("first".to_owned())
        .catch(|_| Resolution::adopt(Deferred::<i32, String>::resolve(3)));

    assert_eq!(d.value(), Some(3));
}

#[test]
fn test_rejection_skips_success_handlers() {
    init();

    let calls = Rc::new(RefCell::new(0));

    let c1 = calls.clone();
    let c2 = calls.clone();
    let d = Deferred::<i32, &'static str>::reject("stop")
        .then(move |v| {
            *c1.borrow_mut() += 1;
            Resolution::Fulfill(v + 1)
        })
        .then(move |v| {
            *c2.borrow_mut() += 1;
            Resolution::Fulfill(v + 1)
        });

    assert_eq!(*calls.borrow(), 0);
    assert_eq!(d.reason(), Some("stop"));
}

#[test]
fn test_recovered_chain_continues_with_value() {
    init();

    let d = Deferred::<i32, &'static str>::reject("oops")
        .catch(|_| Resolution::Fulfill(1))
        .map(|v| v + 1);

    assert_eq!(d.value(), Some(2));
}

#[test]
fn test_finally_passes_rejection_through() {
    init();

    let side_effects = Rc::new(RefCell::new(0));
    let observed = Rc::new(RefCell::new(None));

    let s = side_effects.clone();
    let o = observed.clone();
    Deferred::<i32, &'static str>::reject("boom")
        .then(|v| Resolution::Fulfill(v))
        .finally(move || *s.borrow_mut() += 1)
        .then_or_else(|_| Resolution::Fulfill(()),
                      move |err| {
                          *o.borrow_mut() = Some(err);
                          Resolution::Fulfill(())
                      });

    assert_eq!(*side_effects.borrow(), 1);
    assert_eq!(*observed.borrow(), Some("boom"));
}

#[test]
fn test_finally_on_settled_value() {
    init();

    let ran = Rc::new(RefCell::new(false));

    let r = ran.clone();
    let d = Deferred::<i32, ()>::resolve(8).finally(move || *r.borrow_mut() = true);

    assert!(*ran.borrow());
    assert_eq!(d.value(), Some(8));
}

#[test]
fn test_resolve_does_not_flatten() {
    init();

    let inner: Deferred<i32, String> = Deferred::pending();
    let outer: Deferred<Deferred<i32, String>, String> = Deferred::resolve(inner.clone());

    // The payload is the handle itself, even though it is still pending
    assert!(outer.is_fulfilled());
    assert!(inner.is_pending());
    match outer.value() {
        Some(payload) => assert!(payload.ptr_eq(&inner)),
        None => panic!("outer should be fulfilled"),
    }

    let adopted = Deferred::adopt(inner.clone());
    assert!(adopted.is_pending());
    inner.resolver().fulfill(1);
    assert_eq!(adopted.value(), Some(1));
}

#[test]
fn test_resolver_resolve_adopts() {
    init();

    let inner: Deferred<i32, ()> = Deferred::pending();

    let i = inner.clone();
    let d: Deferred<i32, ()> = Deferred::new(move |res, _| {
        res.resolve(Resolution::adopt(i));
        Ok(())
    });

    assert!(d.is_pending());
    inner.resolver().fulfill(5);
    assert_eq!(d.value(), Some(5));
}

#[test]
fn test_settled_later_from_outside() {
    init();

    // Stand-in for a timer callback holding on to the capabilities
    let pending_callbacks: Rc<RefCell<Vec<Box<dyn FnOnce()>>>> = Rc::new(RefCell::new(Vec::new()));

    let callbacks = pending_callbacks.clone();
    let d: Deferred<&'static str, ()> = Deferred::new(move |res, _| {
        callbacks.borrow_mut().push(Box::new(move || {
            res.fulfill("tick");
        }));
        Ok(())
    });

    let next = d.map(|v| v.len());
    assert!(next.is_pending());

    let callbacks = pending_callbacks.borrow_mut().drain(..).collect::<Vec<_>>();
    for callback in callbacks {
        callback();
    }

    assert_eq!(next.value(), Some(4));
}
