// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Drives deferred values from a toy timer, the way a host event loop would.
//!
//! Run with `RUST_LOG=info cargo run --example timer`.

#[macro_use]
extern crate log;

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;

use deferred::{Builder, Deferred, Resolution, TaskQueue};

struct Sleeping {
    wakeup: u64,
    seq: u64,
    callback: Box<dyn FnOnce()>,
}

impl PartialEq for Sleeping {
    fn eq(&self, other: &Sleeping) -> bool {
        self.wakeup == other.wakeup && self.seq == other.seq
    }
}

impl Eq for Sleeping {}

impl PartialOrd for Sleeping {
    fn partial_cmp(&self, other: &Sleeping) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Sleeping {
    // Earliest wakeup first
    fn cmp(&self, other: &Sleeping) -> Ordering {
        (other.wakeup, other.seq).cmp(&(self.wakeup, self.seq))
    }
}

/// Simulated clock, one tick per `advance`
#[derive(Default)]
struct Timer {
    now: u64,
    seq: u64,
    sleeping: BinaryHeap<Sleeping>,
}

impl Timer {
    fn after<F>(&mut self, ticks: u64, callback: F)
        where F: FnOnce() + 'static
    {
        self.seq += 1;
        self.sleeping.push(Sleeping {
            wakeup: self.now + ticks,
            seq: self.seq,
            callback: Box::new(callback),
        });
    }
}

/// Jump to the next wakeup and fire it. Returns `false` once nothing sleeps.
fn advance(timer: &Rc<RefCell<Timer>>) -> bool {
    let next = {
        let mut timer = timer.borrow_mut();
        let next = timer.sleeping.pop();
        if let Some(ref sleeping) = next {
            timer.now = sleeping.wakeup;
        }
        next
    };

    match next {
        Some(sleeping) => {
            (sleeping.callback)();
            true
        }
        None => false,
    }
}

fn sleep<T>(timer: &Rc<RefCell<Timer>>, queue: &TaskQueue, ticks: u64, val: T) -> Deferred<T, String>
    where T: Clone + 'static
{
    let timer = timer.clone();
    Builder::new()
        .name(format!("sleep({})", ticks))
        .scheduler(queue.clone())
        .start(move |res, _| {
            timer.borrow_mut().after(ticks, move || {
                res.fulfill(val);
            });
            Ok(())
        })
}

fn fail_after<T>(timer: &Rc<RefCell<Timer>>, queue: &TaskQueue, ticks: u64) -> Deferred<T, String>
    where T: Clone + 'static
{
    let timer = timer.clone();
    Builder::new()
        .name(format!("timeout({})", ticks))
        .scheduler(queue.clone())
        .start(move |_, rej| {
            timer.borrow_mut().after(ticks, move || {
                rej.reject(format!("timed out after {} ticks", ticks));
            });
            Ok(())
        })
}

fn main() {
    env_logger::init();

    let timer = Rc::new(RefCell::new(Timer::default()));
    let queue = TaskQueue::new();

    // fast, then slow, flattened into one value
    let (t, q) = (timer.clone(), queue.clone());
    let sequence = sleep(&timer, &queue, 10, "fast".to_owned())
        .then(move |first| Resolution::adopt(sleep(&t, &q, 20, format!("{} then slow", first))))
        .map(|text| {
            info!("sequence finished: {}", text);
            text
        });

    // the first one to settle wins, the other settlement is ignored
    let raced: Deferred<&'static str, String> = Deferred::pending_opts(race_opts(&queue));
    sleep(&timer, &queue, 50, "done in time").subscribe_into(&raced);
    fail_after::<&'static str>(&timer, &queue, 40).subscribe_into(&raced);

    let report = raced
        .then_or_else(|v| Resolution::Fulfill(format!("ok: {}", v)),
                      |e| Resolution::Fulfill(format!("failed: {}", e)))
        .finally(|| info!("race settled"));

    loop {
        queue.run_until_idle();
        if !advance(&timer) {
            break;
        }
        info!("tick {}", timer.borrow().now);
    }

    println!("sequence: {:?}", sequence.value());
    println!("race:     {:?}", report.value());
}

fn race_opts(queue: &TaskQueue) -> deferred::Options {
    let mut opts = deferred::Options::new();
    opts.name("race".to_owned()).scheduler(queue.clone());
    opts
}

trait SubscribeInto<T, E> {
    fn subscribe_into(&self, target: &Deferred<T, E>);
}

impl<T, E> SubscribeInto<T, E> for Deferred<T, E>
    where T: Clone + 'static,
          E: Clone + 'static
{
    fn subscribe_into(&self, target: &Deferred<T, E>) {
        let (resolver, rejecter) = (target.resolver(), target.rejecter());
        self.then_or_else(move |v| Resolution::Fulfill(resolver.fulfill(v)),
                          move |e| Resolution::Fulfill(rejecter.reject(e)));
    }
}
