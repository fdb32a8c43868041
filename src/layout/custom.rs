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

use std::fmt;

use crate::Error;
use crate::Event;
use crate::Layout;

type FormatFunction = dyn Fn(&Event) -> String + Send + Sync + 'static;

/// A layout backed by a closure.
///
/// The closure returns the line without its terminator; the layout appends a single `\n`.
///
/// ```rust
/// use logweave::layout::CustomLayout;
///
/// let layout = CustomLayout::new(|event| format!("{} - {}", event.level(), event.pid()));
/// ```
pub struct CustomLayout {
    f: Box<FormatFunction>,
}

impl fmt::Debug for CustomLayout {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CustomLayout {{ ... }}")
    }
}

impl CustomLayout {
    /// Create a layout from a closure.
    pub fn new(layout: impl Fn(&Event) -> String + Send + Sync + 'static) -> Self {
        CustomLayout {
            f: Box::new(layout),
        }
    }
}

impl Layout for CustomLayout {
    fn format(&self, event: &Event) -> Result<Vec<u8>, Error> {
        let mut line = (self.f)(event).into_bytes();
        line.push(b'\n');
        Ok(line)
    }
}
