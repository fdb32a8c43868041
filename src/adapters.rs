// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::any::Any;
use std::panic;
use std::panic::AssertUnwindSafe;

use crate::Error;
use crate::Event;
use crate::append::Append;
use crate::registry::AdapterKind;
use crate::registry::AdapterOptions;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

/// An ordered collection of adapters that fans every event out to all of them.
///
/// A failing adapter never stops the others: its error, or its panic, is handed to the
/// collection's [`Trap`] and dispatch moves on to the next adapter.
///
/// # Examples
///
/// ```
/// use logweave::Adapters;
/// use logweave::AdapterOptions;
/// use logweave::Event;
/// use logweave::Level;
///
/// let mut adapters = Adapters::new();
/// adapters
///     .add("stderr", AdapterOptions::new().level(Level::Warn))
///     .unwrap();
/// assert!(adapters.add("carrier-pigeon", AdapterOptions::new()).is_err());
///
/// adapters.dispatch(&Event::new(Level::Error, "Hello World!"));
/// ```
#[derive(Debug)]
pub struct Adapters {
    appends: Vec<Box<dyn Append>>,
    trap: Box<dyn Trap>,
}

impl Default for Adapters {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapters {
    /// Create an empty collection reporting errors with [`DefaultTrap`].
    pub fn new() -> Self {
        Self {
            appends: vec![],
            trap: Box::new(DefaultTrap::default()),
        }
    }

    /// Set the trap that receives adapter errors.
    pub fn with_trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    /// Construct an adapter of the named kind and append it to the collection.
    ///
    /// The options may be a bare filename, as in `adapters.add("file", "development.log")`.
    /// Adding the same configuration twice appends two independent adapters.
    ///
    /// # Errors
    ///
    /// Return an error if the kind is unknown or the options are invalid for it. The collection is
    /// left unchanged.
    pub fn add(&mut self, kind: &str, options: impl Into<AdapterOptions>) -> Result<(), Error> {
        let kind = kind.parse::<AdapterKind>()?;
        let append = kind.build(options.into())?;
        self.appends.push(append);
        Ok(())
    }

    /// Append an already constructed adapter.
    pub fn push(&mut self, append: impl Into<Box<dyn Append>>) {
        self.appends.push(append.into());
    }

    /// The number of adapters.
    pub fn len(&self) -> usize {
        self.appends.len()
    }

    /// Whether the collection has no adapters.
    pub fn is_empty(&self) -> bool {
        self.appends.is_empty()
    }

    /// Write the event to every adapter, in insertion order.
    pub fn dispatch(&self, event: &Event) {
        for append in &self.appends {
            self.isolate(|| append.append(event));
        }
    }

    /// Flush every adapter.
    pub fn flush(&self) {
        for append in &self.appends {
            self.isolate(|| append.flush());
        }
    }

    /// Close every adapter. A later dispatch reopens them.
    pub fn close(&self) {
        for append in &self.appends {
            self.isolate(|| append.close());
        }
    }

    fn isolate(&self, f: impl FnOnce() -> Result<(), Error>) {
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => self.trap.trap(&err),
            Err(payload) => {
                let err = Error::sink("adapter panicked")
                    .with_context("panic", panic_message(payload.as_ref()));
                self.trap.trap(&err);
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
