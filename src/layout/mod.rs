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

//! Layouts for rendering events into text lines.

use std::fmt;

use crate::Error;
use crate::Event;

#[cfg(feature = "colored")]
mod colored;
mod custom;
mod pattern;

#[cfg(feature = "colored")]
pub use self::colored::ColoredLayout;
#[cfg(feature = "colored")]
pub use self::colored::LevelColor;
pub use self::custom::CustomLayout;
pub use self::pattern::BASIC_FORMAT;
pub use self::pattern::DEFAULT_FORMAT;
pub use self::pattern::EXTENDED_FORMAT;
pub use self::pattern::NO_FORMAT;
pub use self::pattern::PatternLayout;

/// A layout for rendering events.
///
/// The returned bytes are one complete line, including its trailing line terminator.
pub trait Layout: fmt::Debug + Send + Sync + 'static {
    /// Renders an event.
    fn format(&self, event: &Event) -> Result<Vec<u8>, Error>;
}

impl<T: Layout> From<T> for Box<dyn Layout> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}
