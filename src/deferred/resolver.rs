// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Settlement capabilities handed to start routines

use std::fmt;

use super::continuation::resolve_with;
use super::Deferred;
use crate::thenable::Resolution;

/// Fulfills the `Deferred` it was created for.
///
/// May be cloned and called any number of times, only the first settlement of
/// the `Deferred` (through any `Resolver` or `Rejecter`) takes effect.
pub struct Resolver<T, E> {
    deferred: Deferred<T, E>,
}

impl<T, E> Resolver<T, E>
    where T: Clone + 'static,
          E: Clone + 'static
{
    pub(crate) fn new(deferred: Deferred<T, E>) -> Resolver<T, E> {
        Resolver { deferred: deferred }
    }

    /// Fulfill with `val`. Returns `false` if the `Deferred` was already settled.
    pub fn fulfill(&self, val: T) -> bool {
        self.deferred.settle(Ok(val))
    }

    /// Settle the same way a handler's return value would, adopting a thenable
    /// instead of storing it.
    pub fn resolve(&self, resolution: Resolution<T, E>) {
        resolve_with(&self.deferred, resolution)
    }
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Resolver<T, E> {
        Resolver { deferred: self.deferred.clone() }
    }
}

impl<T, E> fmt::Debug for Resolver<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Resolver { .. }")
    }
}

/// Rejects the `Deferred` it was created for.
pub struct Rejecter<T, E> {
    deferred: Deferred<T, E>,
}

impl<T, E> Rejecter<T, E>
    where T: Clone + 'static,
          E: Clone + 'static
{
    pub(crate) fn new(deferred: Deferred<T, E>) -> Rejecter<T, E> {
        Rejecter { deferred: deferred }
    }

    /// Reject with `err`. Returns `false` if the `Deferred` was already settled.
    pub fn reject(&self, err: E) -> bool {
        self.deferred.settle(Err(err))
    }
}

impl<T, E> Clone for Rejecter<T, E> {
    fn clone(&self) -> Rejecter<T, E> {
        Rejecter { deferred: self.deferred.clone() }
    }
}

impl<T, E> fmt::Debug for Rejecter<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Rejecter { .. }")
    }
}
