// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Most of this module names its template parameters as follows:
//
// T => the value a Deferred is fulfilled with
// E => the reason a Deferred is rejected with
// U => the value of the Deferred created by chaining onto a Deferred<T, E>

//! The `Deferred` primitive

mod continuation;
mod resolver;
mod state;

pub use self::continuation::{FailureHandler, SuccessHandler};
pub use self::state::State;
pub use self::resolver::{Rejecter, Resolver};

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use self::continuation::{Continuation, Finalizer, OnFulfilled};
use self::state::Core;
use crate::options::Options;
use crate::thenable::{Resolution, Thenable};

/// A value that becomes available later, exactly once, as either a success
/// value `T` or a failure reason `E`.
///
/// A `Deferred` is a handle, cloning it gives another handle to the same value.
/// It is settled through a `Resolver` / `Rejecter` pair and observed by
/// chaining: `register` (and `then`, `catch`, `finally`, ...) queue a handler and
/// return a new `Deferred` that settles with the handler's outcome.
///
/// Handlers registered before settlement run in registration order once the
/// `Deferred` settles. Handlers registered afterwards are handed to the
/// scheduler right away, which for the default `Immediate` scheduler means
/// they run before the registering call returns.
pub struct Deferred<T, E> {
    core: Rc<RefCell<Core<T, E>>>,
}

impl<T, E> Deferred<T, E> {
    fn from_options(opts: Options) -> Deferred<T, E> {
        Deferred { core: Rc::new(RefCell::new(Core::new(opts))) }
    }

    #[inline]
    pub fn state(&self) -> State {
        self.core.borrow().state()
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.state() == State::Pending
    }

    #[inline]
    pub fn is_fulfilled(&self) -> bool {
        self.state() == State::Fulfilled
    }

    #[inline]
    pub fn is_rejected(&self) -> bool {
        self.state() == State::Rejected
    }

    pub fn name(&self) -> Option<String> {
        self.core.borrow().options().name.clone()
    }

    /// Whether both handles refer to the same `Deferred`
    #[inline]
    pub fn ptr_eq(&self, other: &Deferred<T, E>) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }

    pub(crate) fn label(&self) -> String {
        self.core.borrow().label().to_owned()
    }
}

impl<T, E> Deferred<T, E>
    where T: Clone + 'static,
          E: Clone + 'static
{
    /// Create a `Deferred` and run `start` with its settlement capabilities.
    ///
    /// `start` runs synchronously, before `new` returns. Returning `Err` from it
    /// rejects the `Deferred`, unless it was settled already.
    pub fn new<F>(start: F) -> Deferred<T, E>
        where F: FnOnce(Resolver<T, E>, Rejecter<T, E>) -> Result<(), E>
    {
        Deferred::new_opts(start, Options::new())
    }

    /// Create a `Deferred` with options and run `start` with its settlement capabilities
    pub fn new_opts<F>(start: F, opts: Options) -> Deferred<T, E>
        where F: FnOnce(Resolver<T, E>, Rejecter<T, E>) -> Result<(), E>
    {
        let deferred = Deferred::from_options(opts);

        if let Err(err) = start(deferred.resolver(), deferred.rejecter()) {
            trace!("Deferred {} start routine failed", deferred.label());
            deferred.settle(Err(err));
        }

        deferred
    }

    /// A pending `Deferred` without a start routine, settle it through
    /// `resolver()` and `rejecter()`.
    pub fn pending() -> Deferred<T, E> {
        Deferred::from_options(Options::new())
    }

    pub fn pending_opts(opts: Options) -> Deferred<T, E> {
        Deferred::from_options(opts)
    }

    /// A `Deferred` already fulfilled with `val`.
    ///
    /// `val` is stored as is. If it is a `Deferred` itself the result is a
    /// `Deferred<Deferred<..>, E>`; use `adopt` to wait for it instead.
    pub fn resolve(val: T) -> Deferred<T, E> {
        Deferred::resolve_opts(val, Options::new())
    }

    pub fn resolve_opts(val: T, opts: Options) -> Deferred<T, E> {
        let deferred = Deferred::from_options(opts);
        deferred.settle(Ok(val));
        deferred
    }

    /// A `Deferred` already rejected with `err`
    pub fn reject(err: E) -> Deferred<T, E> {
        Deferred::reject_opts(err, Options::new())
    }

    pub fn reject_opts(err: E, opts: Options) -> Deferred<T, E> {
        let deferred = Deferred::from_options(opts);
        deferred.settle(Err(err));
        deferred
    }

    /// A `Deferred` that settles with whatever `thenable` settles with
    pub fn adopt<D>(thenable: D) -> Deferred<T, E>
        where D: Thenable<T, E> + 'static
    {
        Deferred::adopt_opts(thenable, Options::new())
    }

    pub fn adopt_opts<D>(thenable: D, opts: Options) -> Deferred<T, E>
        where D: Thenable<T, E> + 'static
    {
        let deferred = Deferred::from_options(opts);
        deferred.resolver().resolve(Resolution::adopt(thenable));
        deferred
    }

    pub fn resolver(&self) -> Resolver<T, E> {
        Resolver::new(self.clone())
    }

    pub fn rejecter(&self) -> Rejecter<T, E> {
        Rejecter::new(self.clone())
    }

    /// The value, if fulfilled
    pub fn value(&self) -> Option<T> {
        self.core.borrow().value()
    }

    /// The reason, if rejected. Reading it counts as observing the rejection.
    pub fn reason(&self) -> Option<E> {
        let mut core = self.core.borrow_mut();
        core.observe();
        core.reason()
    }

    /// `Ok(value)` or `Err(reason)` once settled
    pub fn outcome(&self) -> Option<Result<T, E>> {
        let mut core = self.core.borrow_mut();
        core.observe();
        core.outcome()
    }

    /// Queue handlers for the outcome and return the `Deferred` they settle.
    ///
    /// Whichever handler runs decides how the returned `Deferred` settles, see
    /// `Resolution`. A missing handler passes the outcome through unchanged,
    /// converting the value with `From` when the types differ.
    pub fn register<U>(&self,
                       on_success: Option<SuccessHandler<T, U, E>>,
                       on_failure: Option<FailureHandler<U, E>>)
                       -> Deferred<U, E>
        where U: From<T> + Clone + 'static
    {
        let on_fulfilled = match on_success {
            Some(handler) => OnFulfilled::Call(handler),
            None => OnFulfilled::Forward(<U as From<T>>::from),
        };

        self.chain(on_fulfilled, on_failure)
    }

    /// Run `f` with the value, rejections pass through
    pub fn then<U, F>(&self, f: F) -> Deferred<U, E>
        where U: Clone + 'static,
              F: FnOnce(T) -> Resolution<U, E> + 'static
    {
        self.chain(OnFulfilled::Call(Box::new(f)), None)
    }

    /// Run `f` with the reason, values pass through
    pub fn catch<F>(&self, f: F) -> Deferred<T, E>
        where F: FnOnce(E) -> Resolution<T, E> + 'static
    {
        self.register(None, Some(Box::new(f)))
    }

    /// Run `ft` with the value or `fe` with the reason
    pub fn then_or_else<U, FT, FE>(&self, ft: FT, fe: FE) -> Deferred<U, E>
        where U: Clone + 'static,
              FT: FnOnce(T) -> Resolution<U, E> + 'static,
              FE: FnOnce(E) -> Resolution<U, E> + 'static
    {
        self.chain(OnFulfilled::Call(Box::new(ft)), Some(Box::new(fe)))
    }

    /// Transform the value
    pub fn map<U, F>(&self, f: F) -> Deferred<U, E>
        where U: Clone + 'static,
              F: FnOnce(T) -> U + 'static
    {
        self.then(move |val| Resolution::Fulfill(f(val)))
    }

    /// Transform the reason, the chain stays rejected
    pub fn map_err<F>(&self, f: F) -> Deferred<T, E>
        where F: FnOnce(E) -> E + 'static
    {
        self.catch(move |err| Resolution::Reject(f(err)))
    }

    /// Run `f` once settled, whatever the outcome.
    ///
    /// The returned `Deferred` settles with this one's outcome, after `f` ran.
    pub fn finally<F>(&self, f: F) -> Deferred<T, E>
        where F: FnOnce() + 'static
    {
        let (target, outcome) = {
            let mut core = self.core.borrow_mut();
            let target = Deferred::from_options(core.options().inherit());

            match core.outcome() {
                None => {
                    core.push_finalizer(Box::new(Finalizer::new(target.clone(), Box::new(f))));
                    return target;
                }
                Some(outcome) => {
                    core.observe();
                    (target, outcome)
                }
            }
        };

        let scheduler = self.core.borrow().options().scheduler.clone();
        let finalizer = Finalizer::new(target.clone(), Box::new(f));
        scheduler.schedule(Box::new(move || finalizer.run(outcome)));

        target
    }

    fn chain<U>(&self,
                on_fulfilled: OnFulfilled<T, U, E>,
                on_rejected: Option<FailureHandler<U, E>>)
                -> Deferred<U, E>
        where U: Clone + 'static
    {
        let (target, settled) = {
            let mut core = self.core.borrow_mut();
            let target = Deferred::from_options(core.options().inherit());

            let continuation = Continuation::new(target.clone(), on_fulfilled, on_rejected);
            core.push_continuation(Box::new(continuation));

            (target, core.state() != State::Pending)
        };

        if settled {
            self.schedule_drain();
        }

        target
    }
}

impl<T, E> Thenable<T, E> for Deferred<T, E>
    where T: Clone + 'static,
          E: Clone + 'static
{
    fn subscribe(&self, on_fulfilled: Box<dyn FnOnce(T)>, on_rejected: Box<dyn FnOnce(E)>) {
        self.then_or_else(move |val| {
                              on_fulfilled(val);
                              Resolution::Fulfill(())
                          },
                          move |err| {
                              on_rejected(err);
                              Resolution::Fulfill(())
                          });
    }
}

impl<T, E> Clone for Deferred<T, E> {
    fn clone(&self) -> Deferred<T, E> {
        Deferred { core: self.core.clone() }
    }
}

impl<T, E> fmt::Debug for Deferred<T, E>
    where T: fmt::Debug,
          E: fmt::Debug
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.core.try_borrow() {
            Ok(core) => fmt::Debug::fmt(&*core, f),
            Err(..) => f.write_str("Deferred { <busy> }"),
        }
    }
}
