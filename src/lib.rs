// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Deferred values for single threaded, callback driven code
//!
//! A `Deferred<T, E>` settles exactly once, either fulfilled with a `T` or
//! rejected with an `E`. Handlers chained onto it run in registration order and
//! each produce a new `Deferred`; a handler returning another thenable makes its
//! `Deferred` wait for that one instead of storing it.
//!
//! ```
//! use deferred::{Deferred, Resolution};
//!
//! let d: Deferred<String, String> = Deferred::new(|res, _| {
//!     res.fulfill("x".to_owned());
//!     Ok(())
//! });
//!
//! let next = d.then(|v| Resolution::Fulfill(v + "y"));
//! assert_eq!(next.value(), Some("xy".to_owned()));
//! ```
//!
//! Nothing here blocks. A `Deferred` waiting on a timer or some I/O simply
//! stays pending until the code driving that facility calls its `Resolver` or
//! `Rejecter`.

#[macro_use]
extern crate log;

pub use crate::deferred::{Deferred, Rejecter, Resolver, State};
pub use crate::options::Options;
pub use crate::scheduler::{Immediate, Schedule, TaskQueue};
pub use crate::thenable::{Resolution, Thenable};

pub mod deferred;
pub mod options;
pub mod scheduler;
pub mod thenable;

/// Create a `Deferred` already fulfilled with `val`
#[inline]
pub fn resolve<T, E>(val: T) -> Deferred<T, E>
    where T: Clone + 'static,
          E: Clone + 'static
{
    Deferred::resolve(val)
}

/// Create a `Deferred` already rejected with `err`
#[inline]
pub fn reject<T, E>(err: E) -> Deferred<T, E>
    where T: Clone + 'static,
          E: Clone + 'static
{
    Deferred::reject(err)
}

/// Deferred configuration. Provides control over the name and scheduling of new deferred values.
pub struct Builder {
    opts: Options,
}

impl Builder {
    /// Generates the base configuration, from which configuration methods can be chained.
    pub fn new() -> Builder {
        Builder { opts: Options::new() }
    }

    /// Names the deferred value. The name is used for identification in log messages only.
    #[inline]
    pub fn name(mut self, name: String) -> Builder {
        self.opts.name = Some(name);
        self
    }

    /// Sets the scheduler that runs the handlers of the new value and of every
    /// value chained onto it.
    #[inline]
    pub fn scheduler<S>(mut self, scheduler: S) -> Builder
        where S: Schedule + 'static
    {
        self.opts.scheduler(scheduler);
        self
    }

    /// Create a new `Deferred` and run its start routine
    #[inline]
    pub fn start<T, E, F>(self, start: F) -> Deferred<T, E>
        where T: Clone + 'static,
              E: Clone + 'static,
              F: FnOnce(Resolver<T, E>, Rejecter<T, E>) -> Result<(), E>
    {
        Deferred::new_opts(start, self.opts)
    }

    /// Create a new pending `Deferred`
    #[inline]
    pub fn pending<T, E>(self) -> Deferred<T, E>
        where T: Clone + 'static,
              E: Clone + 'static
    {
        Deferred::pending_opts(self.opts)
    }

    /// Create a new `Deferred` fulfilled with `val`
    #[inline]
    pub fn resolve<T, E>(self, val: T) -> Deferred<T, E>
        where T: Clone + 'static,
              E: Clone + 'static
    {
        Deferred::resolve_opts(val, self.opts)
    }

    /// Create a new `Deferred` rejected with `err`
    #[inline]
    pub fn reject<T, E>(self, err: E) -> Deferred<T, E>
        where T: Clone + 'static,
              E: Clone + 'static
    {
        Deferred::reject_opts(err, self.opts)
    }
}

impl Default for Builder {
    fn default() -> Builder {
        Builder::new()
    }
}
