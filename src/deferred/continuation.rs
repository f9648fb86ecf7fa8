// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Queued continuation and finalizer records

use super::Deferred;
use crate::thenable::Resolution;

pub type SuccessHandler<T, U, E> = Box<dyn FnOnce(T) -> Resolution<U, E>>;
pub type FailureHandler<U, E> = Box<dyn FnOnce(E) -> Resolution<U, E>>;

/// Receives the outcome of the `Deferred` it was queued on.
///
/// Implementors own the target they settle, so a single queue can hold records
/// whose targets have different value types.
pub trait ContinueWith<T, E> {
    fn continue_with(self: Box<Self>, outcome: Result<T, E>);

    /// Drop the handlers and give back the target, unsettled
    fn into_target(self: Box<Self>) -> Box<dyn Unlink>;
}

/// A `Deferred` of any type, on its way out without having been settled.
///
/// Records own their targets, so an unsettled chain is a linked list of cores.
/// Unlinking moves the records of a core nobody else can reach into `orphans`
/// before the core is dropped, which lets the caller tear the list down in a
/// loop instead of one nested drop per link.
pub trait Unlink {
    fn unlink(self: Box<Self>, orphans: &mut Vec<Box<dyn Unlink>>);
}

/// What to do with a value when it arrives
pub enum OnFulfilled<T, U, E> {
    Call(SuccessHandler<T, U, E>),
    /// No handler, pass the value through
    Forward(fn(T) -> U),
}

/// A queued `{target, on_success, on_failure}`
pub struct Continuation<T, U, E> {
    target: Deferred<U, E>,
    on_fulfilled: OnFulfilled<T, U, E>,
    on_rejected: Option<FailureHandler<U, E>>,
}

impl<T, U, E> Continuation<T, U, E> {
    pub fn new(target: Deferred<U, E>,
               on_fulfilled: OnFulfilled<T, U, E>,
               on_rejected: Option<FailureHandler<U, E>>)
               -> Continuation<T, U, E> {
        Continuation {
            target: target,
            on_fulfilled: on_fulfilled,
            on_rejected: on_rejected,
        }
    }
}

impl<T, U, E> ContinueWith<T, E> for Continuation<T, U, E>
    where T: 'static,
          U: Clone + 'static,
          E: Clone + 'static
{
    fn continue_with(self: Box<Self>, outcome: Result<T, E>) {
        let Continuation { target, on_fulfilled, on_rejected } = *self;

        match outcome {
            Ok(val) => {
                match on_fulfilled {
                    OnFulfilled::Call(handler) => resolve_with(&target, handler(val)),
                    OnFulfilled::Forward(forward) => {
                        target.settle(Ok(forward(val)));
                    }
                }
            }
            Err(err) => {
                match on_rejected {
                    Some(handler) => resolve_with(&target, handler(err)),
                    None => {
                        target.settle(Err(err));
                    }
                }
            }
        }
    }

    fn into_target(self: Box<Self>) -> Box<dyn Unlink> {
        let Continuation { target, .. } = *self;
        Box::new(target)
    }
}

/// A queued `finally` callback
pub struct Finalizer<T, E> {
    target: Deferred<T, E>,
    callback: Box<dyn FnOnce()>,
}

impl<T, E> Finalizer<T, E>
    where T: Clone + 'static,
          E: Clone + 'static
{
    pub fn new(target: Deferred<T, E>, callback: Box<dyn FnOnce()>) -> Finalizer<T, E> {
        Finalizer {
            target: target,
            callback: callback,
        }
    }

    /// Run the callback, then hand the untouched outcome to the target
    pub fn run(self, outcome: Result<T, E>) {
        (self.callback)();
        self.target.settle(outcome);
    }
}

impl<T, E> ContinueWith<T, E> for Finalizer<T, E>
    where T: Clone + 'static,
          E: Clone + 'static
{
    fn continue_with(self: Box<Self>, outcome: Result<T, E>) {
        (*self).run(outcome)
    }

    fn into_target(self: Box<Self>) -> Box<dyn Unlink> {
        Box::new(self.target)
    }
}

/// Settle `target` according to what a handler returned.
///
/// A thenable is never stored as a value: the target waits for it and takes
/// over its outcome. Adoption is transitive, a thenable that is itself waiting
/// on another one only calls back once that one has settled.
pub fn resolve_with<T, E>(target: &Deferred<T, E>, resolution: Resolution<T, E>)
    where T: Clone + 'static,
          E: Clone + 'static
{
    match resolution {
        Resolution::Fulfill(val) => {
            target.settle(Ok(val));
        }
        Resolution::Reject(err) => {
            target.settle(Err(err));
        }
        Resolution::Adopt(thenable) => {
            trace!("Deferred {} adopting a thenable", target.label());

            let on_fulfilled = target.clone();
            let on_rejected = target.clone();
            thenable.subscribe(Box::new(move |val| {
                                   on_fulfilled.settle(Ok(val));
                               }),
                               Box::new(move |err| {
                                   on_rejected.settle(Err(err));
                               }));
        }
    }
}
