// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Deferred options

use std::default::Default;
use std::fmt;
use std::rc::Rc;

use crate::scheduler::{Immediate, Schedule};

/// Deferred options
///
/// Every `Deferred` derived from another one by chaining inherits its
/// scheduler, but not its name.
#[derive(Clone)]
pub struct Options {
    pub name: Option<String>,
    pub scheduler: Rc<dyn Schedule>,
}

impl Options {
    pub fn new() -> Options {
        Options {
            name: None,
            scheduler: Rc::new(Immediate),
        }
    }

    pub fn name(&mut self, name: String) -> &mut Options {
        self.name = Some(name);
        self
    }

    pub fn scheduler<S>(&mut self, scheduler: S) -> &mut Options
        where S: Schedule + 'static
    {
        self.scheduler = Rc::new(scheduler);
        self
    }

    /// Options for a `Deferred` chained onto one created with `self`
    pub(crate) fn inherit(&self) -> Options {
        Options {
            name: None,
            scheduler: self.scheduler.clone(),
        }
    }
}

impl Default for Options {
    fn default() -> Options {
        Options::new()
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Options").field("name", &self.name).finish()
    }
}
