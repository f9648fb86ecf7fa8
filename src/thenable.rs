// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Interoperability with other deferred value implementations

use std::fmt;

/// Anything that eventually settles and lets callers register for the outcome.
///
/// Implementations must call at most one of the two callbacks, at most once.
/// Calling neither is allowed and leaves every adopter pending forever.
pub trait Thenable<T, E> {
    fn subscribe(&self, on_fulfilled: Box<dyn FnOnce(T)>, on_rejected: Box<dyn FnOnce(E)>);
}

/// What a handler hands back to the `Deferred` it is chained into.
pub enum Resolution<T, E> {
    /// Fulfill the target with a plain value
    Fulfill(T),
    /// Reject the target
    Reject(E),
    /// Settle the target with whatever this settles with
    Adopt(Box<dyn Thenable<T, E>>),
}

impl<T, E> Resolution<T, E> {
    /// Adopt the eventual outcome of `thenable`
    pub fn adopt<D>(thenable: D) -> Resolution<T, E>
        where D: Thenable<T, E> + 'static
    {
        Resolution::Adopt(Box::new(thenable))
    }

    pub fn from_result(result: Result<T, E>) -> Resolution<T, E> {
        match result {
            Ok(val) => Resolution::Fulfill(val),
            Err(err) => Resolution::Reject(err),
        }
    }
}

impl<T, E> From<Result<T, E>> for Resolution<T, E> {
    fn from(result: Result<T, E>) -> Resolution<T, E> {
        Resolution::from_result(result)
    }
}

impl<T, E> fmt::Debug for Resolution<T, E>
    where T: fmt::Debug,
          E: fmt::Debug
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Resolution::Fulfill(ref val) => f.debug_tuple("Fulfill").field(val).finish(),
            Resolution::Reject(ref err) => f.debug_tuple("Reject").field(err).finish(),
            Resolution::Adopt(..) => f.write_str("Adopt(..)"),
        }
    }
}
