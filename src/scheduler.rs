// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Drain scheduling strategies
//!
//! Every time a `Deferred` has queued handlers ready to run (on settlement, or on
//! registration against an already settled value) the work is handed to the
//! `Schedule` of that `Deferred` as a single `Task`. Handler ordering is decided
//! by the drain itself, so any strategy that runs tasks in the order they were
//! scheduled preserves it.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::rc::Rc;

/// A unit of deferred work
pub type Task = Box<dyn FnOnce()>;

/// "Run later, in order"
pub trait Schedule {
    fn schedule(&self, task: Task);
}

impl<S> Schedule for Rc<S>
    where S: Schedule + ?Sized
{
    #[inline]
    fn schedule(&self, task: Task) {
        (**self).schedule(task)
    }
}

/// Runs every task before the outermost scheduling call returns.
///
/// This is the default. Handlers registered on a settled `Deferred` run before
/// `register` returns, and settling a `Deferred` runs all of its handlers before
/// `fulfill`/`reject` returns.
///
/// Tasks scheduled while another task of this thread is running are appended
/// to a thread local FIFO and run by the outermost call once the current task
/// is done, so settling a long chain does not grow the stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

thread_local! {
    static IMMEDIATE_RUNNING: Cell<bool> = Cell::new(false);
    static IMMEDIATE_BACKLOG: RefCell<VecDeque<Task>> = RefCell::new(VecDeque::new());
}

/// Marks the outermost `Immediate::schedule` call. Unwinding out of a task
/// drops the backlog and lets the next call start over.
struct RunningGuard;

impl Drop for RunningGuard {
    fn drop(&mut self) {
        let backlog = IMMEDIATE_BACKLOG.with(|backlog| {
            mem::replace(&mut *backlog.borrow_mut(), VecDeque::new())
        });
        IMMEDIATE_RUNNING.with(|running| running.set(false));

        if !backlog.is_empty() {
            debug!("dropping {} immediate task(s) after a panic", backlog.len());
        }
    }
}

impl Schedule for Immediate {
    fn schedule(&self, task: Task) {
        if IMMEDIATE_RUNNING.with(|running| running.replace(true)) {
            IMMEDIATE_BACKLOG.with(|backlog| backlog.borrow_mut().push_back(task));
            return;
        }

        let _guard = RunningGuard;

        task();
        loop {
            // The borrow must end before the task runs, it may schedule more work.
            let next = IMMEDIATE_BACKLOG.with(|backlog| backlog.borrow_mut().pop_front());
            match next {
                Some(task) => task(),
                None => break,
            }
        }
    }
}

/// A FIFO of pending tasks, run by whoever owns the event loop.
///
/// Cloning a `TaskQueue` gives another handle to the same queue.
#[derive(Clone, Default)]
pub struct TaskQueue {
    tasks: Rc<RefCell<VecDeque<Task>>>,
}

impl TaskQueue {
    pub fn new() -> TaskQueue {
        TaskQueue { tasks: Rc::new(RefCell::new(VecDeque::new())) }
    }

    /// Number of tasks waiting to run
    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Run the oldest task, if any. Returns `false` if the queue was empty.
    pub fn run_one(&self) -> bool {
        // The borrow must end before the task runs, it may schedule more work.
        let task = self.tasks.borrow_mut().pop_front();

        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Run tasks until the queue is empty, including the ones scheduled while
    /// running. Returns how many tasks were run.
    pub fn run_until_idle(&self) -> usize {
        let mut count = 0;
        while self.run_one() {
            count += 1;
        }

        debug!("task queue idle after running {} task(s)", count);
        count
    }
}

impl Schedule for TaskQueue {
    fn schedule(&self, task: Task) {
        let mut tasks = self.tasks.borrow_mut();
        tasks.push_back(task);
        trace!("task queued, {} pending", tasks.len());
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TaskQueue").field("pending", &self.len()).finish()
    }
}
