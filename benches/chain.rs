// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::time::Instant;

use deferred::{Builder, Deferred, Resolution, TaskQueue};

const NS_PER_MS: u128 = 1_000_000;

#[inline]
fn rdiv(a: u128, b: u128) -> u128 {
    (a + (b / 2)) / b
}

fn report(name: &str, iters: u128, beg: Instant) {
    let duration = beg.elapsed().as_nanos();
    println!("{:>24}: {:>6} ms total, {:>4} ns/iter",
             name,
             rdiv(duration, NS_PER_MS),
             rdiv(duration, iters));
}

/// Register a long chain on a pending value, then settle it through a queue
fn bench_queued_chain(len: u64) {
    let queue = TaskQueue::new();
    let root: Deferred<u64, ()> = Builder::new().scheduler(queue.clone()).pending();

    let beg = Instant::now();

    let mut tail = root.clone();
    for _ in 0..len {
        tail = tail.map(|v| v + 1);
    }
    root.resolver().fulfill(0);
    queue.run_until_idle();

    report("queued chain", len as u128, beg);
    assert_eq!(tail.value(), Some(len));
}

/// Fan out many handlers on one settled value
fn bench_fan_out(len: u64) {
    let root: Deferred<u64, ()> = Deferred::resolve(1);

    let beg = Instant::now();

    let mut sum = 0;
    for _ in 0..len {
        sum += root.map(|v| v * 2).value().unwrap_or(0);
    }

    report("fan out", len as u128, beg);
    assert_eq!(sum, len * 2);
}

/// Flatten through a fresh inner value per step
fn bench_flatten(len: u64) {
    let beg = Instant::now();

    let mut tail: Deferred<u64, ()> = Deferred::resolve(0);
    for _ in 0..len {
        tail = tail.then(|v| Resolution::adopt(Deferred::<u64, ()>::resolve(v + 1)));
    }

    report("flatten", len as u128, beg);
    assert_eq!(tail.value(), Some(len));
}

fn main() {
    bench_queued_chain(1_000_000);
    bench_fan_out(1_000_000);
    bench_flatten(1_000_000);
}
