// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Settlement state and the drain

use std::fmt;
use std::mem;
use std::rc::Rc;

use super::continuation::{ContinueWith, Unlink};
use super::Deferred;
use crate::options::Options;

/// Settlement state of a `Deferred`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Pending,
    Fulfilled,
    Rejected,
}

#[derive(Debug)]
enum Payload<T, E> {
    Pending,
    Fulfilled(T),
    Rejected(E),
}

/// The shared data behind every handle of one `Deferred`
pub struct Core<T, E> {
    payload: Payload<T, E>,
    continuations: Vec<Box<dyn ContinueWith<T, E>>>,
    finalizers: Vec<Box<dyn ContinueWith<T, E>>>,
    // Someone registered a handler or read the reason
    observed: bool,
    options: Options,
}

impl<T, E> Core<T, E> {
    pub fn new(options: Options) -> Core<T, E> {
        Core {
            payload: Payload::Pending,
            continuations: Vec::new(),
            finalizers: Vec::new(),
            observed: false,
            options: options,
        }
    }

    #[inline]
    pub fn state(&self) -> State {
        match self.payload {
            Payload::Pending => State::Pending,
            Payload::Fulfilled(..) => State::Fulfilled,
            Payload::Rejected(..) => State::Rejected,
        }
    }

    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn label(&self) -> &str {
        self.options.name.as_deref().unwrap_or("<anonymous>")
    }

    #[inline]
    pub fn observe(&mut self) {
        self.observed = true;
    }

    pub fn value(&self) -> Option<T>
        where T: Clone
    {
        match self.payload {
            Payload::Fulfilled(ref val) => Some(val.clone()),
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<E>
        where E: Clone
    {
        match self.payload {
            Payload::Rejected(ref err) => Some(err.clone()),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Option<Result<T, E>>
        where T: Clone,
              E: Clone
    {
        match self.payload {
            Payload::Pending => None,
            Payload::Fulfilled(ref val) => Some(Ok(val.clone())),
            Payload::Rejected(ref err) => Some(Err(err.clone())),
        }
    }

    pub fn push_continuation(&mut self, continuation: Box<dyn ContinueWith<T, E>>) {
        self.observed = true;
        self.continuations.push(continuation);
    }

    pub fn push_finalizer(&mut self, finalizer: Box<dyn ContinueWith<T, E>>) {
        self.observed = true;
        self.finalizers.push(finalizer);
    }

    #[inline]
    fn has_queued(&self) -> bool {
        !self.continuations.is_empty() || !self.finalizers.is_empty()
    }

    /// Give up every queued record, keeping only their targets
    fn release(&mut self, orphans: &mut Vec<Box<dyn Unlink>>) {
        for record in self.continuations.drain(..).chain(self.finalizers.drain(..)) {
            orphans.push(record.into_target());
        }
    }
}

impl<T, E> Drop for Core<T, E> {
    fn drop(&mut self) {
        if let Payload::Rejected(..) = self.payload {
            if !self.observed {
                warn!("Deferred {} was rejected but nobody observed the rejection", self.label());
            }
        }

        if !self.has_queued() {
            return;
        }

        let mut orphans = Vec::new();
        self.release(&mut orphans);
        while let Some(orphan) = orphans.pop() {
            orphan.unlink(&mut orphans);
        }
    }
}

impl<T, E> Unlink for Deferred<T, E>
    where T: 'static,
          E: 'static
{
    fn unlink(self: Box<Self>, orphans: &mut Vec<Box<dyn Unlink>>) {
        // Someone else may still settle it, leave its records alone
        if Rc::strong_count(&self.core) != 1 {
            return;
        }

        let mut core = match self.core.try_borrow_mut() {
            Ok(core) => core,
            Err(..) => return,
        };
        core.release(orphans);
    }
}

impl<T, E> fmt::Debug for Core<T, E>
    where T: fmt::Debug,
          E: fmt::Debug
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("name", &self.options.name)
            .field("payload", &self.payload)
            .field("continuations", &self.continuations.len())
            .field("finalizers", &self.finalizers.len())
            .finish()
    }
}

impl<T, E> Deferred<T, E>
    where T: Clone + 'static,
          E: Clone + 'static
{
    /// The fulfill/reject entry point. Only the first call on a pending
    /// `Deferred` has any effect; returns whether this call was it.
    pub(crate) fn settle(&self, outcome: Result<T, E>) -> bool {
        let has_queued = {
            let mut core = self.core.borrow_mut();

            if core.state() != State::Pending {
                debug!("Deferred {} is already {:?}, ignoring settlement",
                       core.label(),
                       core.state());
                return false;
            }

            core.payload = match outcome {
                Ok(val) => Payload::Fulfilled(val),
                Err(err) => Payload::Rejected(err),
            };

            trace!("Deferred {} settled as {:?}", core.label(), core.state());
            core.has_queued()
        };

        if has_queued {
            self.schedule_drain();
        }

        true
    }

    /// Hand a drain of this `Deferred` to its scheduler
    pub(crate) fn schedule_drain(&self) {
        let scheduler = self.core.borrow().options().scheduler.clone();
        let this = self.clone();
        scheduler.schedule(Box::new(move || this.drain()));
    }

    fn drain(&self) {
        // Swap the queues out before running anything. Handlers may register
        // on this very Deferred; those records go to the fresh queues and get
        // a drain of their own.
        let (outcome, continuations, finalizers) = {
            let mut core = self.core.borrow_mut();

            let outcome = match core.outcome() {
                Some(outcome) => outcome,
                None => return,
            };

            if !core.has_queued() {
                return;
            }

            trace!("Deferred {} draining {} continuation(s), {} finalizer(s)",
                   core.label(),
                   core.continuations.len(),
                   core.finalizers.len());

            (outcome,
             mem::replace(&mut core.continuations, Vec::new()),
             mem::replace(&mut core.finalizers, Vec::new()))
        };

        for continuation in continuations {
            continuation.continue_with(outcome.clone());
        }

        for finalizer in finalizers {
            finalizer.continue_with(outcome.clone());
        }
    }
}
