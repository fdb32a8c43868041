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

use colored::Color;
use colored::Colorize;

use crate::Error;
use crate::Event;
use crate::Layout;
use crate::Level;

/// A layout that colors every line produced by an inner layout according to the event level.
///
/// The line terminator is kept outside the color escape sequence.
#[derive(Debug)]
pub struct ColoredLayout {
    inner: Box<dyn Layout>,
    colors: LevelColor,
}

/// Customize the color of each level.
#[derive(Debug, Clone)]
pub struct LevelColor {
    /// Color of `DEBUG` lines.
    pub debug: Color,
    /// Color of `INFO` lines.
    pub info: Color,
    /// Color of `WARN` lines.
    pub warn: Color,
    /// Color of `ERROR` lines.
    pub error: Color,
    /// Color of `FATAL` lines.
    pub fatal: Color,
    /// Color of `UNKNOWN` lines.
    pub unknown: Color,
}

impl Default for LevelColor {
    fn default() -> Self {
        Self {
            debug: Color::White,
            info: Color::Green,
            warn: Color::Yellow,
            error: Color::Red,
            fatal: Color::Magenta,
            unknown: Color::Cyan,
        }
    }
}

impl LevelColor {
    fn of(&self, level: Level) -> Color {
        match level {
            Level::Debug => self.debug,
            Level::Info => self.info,
            Level::Warn => self.warn,
            Level::Error => self.error,
            Level::Fatal => self.fatal,
            Level::Unknown => self.unknown,
        }
    }
}

impl ColoredLayout {
    /// Wrap a layout with the default colors.
    pub fn new(inner: impl Into<Box<dyn Layout>>) -> Self {
        Self {
            inner: inner.into(),
            colors: LevelColor::default(),
        }
    }

    /// Set the colors of each level.
    pub fn with_colors(mut self, colors: LevelColor) -> Self {
        self.colors = colors;
        self
    }
}

impl Layout for ColoredLayout {
    fn format(&self, event: &Event) -> Result<Vec<u8>, Error> {
        let bytes = self.inner.format(event)?;
        let text = String::from_utf8_lossy(&bytes);
        let line = text.strip_suffix('\n').unwrap_or(&text);
        let colored = line.color(self.colors.of(event.level()));
        Ok(format!("{colored}\n").into_bytes())
    }
}
