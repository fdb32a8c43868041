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

//! Output adapters for events.
//!
//! An [`Adapter`] pairs a [`Sink`] with a [`Layout`](crate::Layout) and a
//! [`LevelFilter`](crate::LevelFilter). Sinks decide where the bytes go:
//!
//! * [`Stdout`] and [`Stderr`] write to the console;
//! * [`FileSink`] appends to a single file;
//! * [`DateFileSink`] appends to a file whose name carries the current date and switches to a new
//!   file when the date changes;
//! * [`Testing`] keeps the output in memory.
//!
//! # Examples
//!
//! ```
//! use logweave::Event;
//! use logweave::Level;
//! use logweave::append::Adapter;
//! use logweave::append::Append;
//! use logweave::append::Testing;
//! use logweave::layout::PatternLayout;
//!
//! let sink = Testing::new();
//! let adapter = Adapter::new(sink.clone())
//!     .with_filter(Level::Info)
//!     .with_layout(PatternLayout::new("%L %m"));
//!
//! adapter.append(&Event::new(Level::Debug, "dropped")).unwrap();
//! adapter.append(&Event::new(Level::Warn, "kept")).unwrap();
//! assert_eq!(sink.contents(), "WARN kept\n");
//! ```

use std::fmt;

use crate::Error;
use crate::Event;

mod adapter;
pub mod datefile;
mod file;
mod stdio;
mod testing;

pub use self::adapter::Adapter;
pub use self::adapter::Sink;
pub use self::datefile::DateFileBuilder;
pub use self::datefile::DateFileSink;
pub use self::file::FileSink;
pub use self::stdio::Stderr;
pub use self::stdio::Stdout;
pub use self::testing::Testing;
pub use self::testing::TestingWriter;

/// An appender that can process events.
pub trait Append: fmt::Debug + Send + Sync + 'static {
    /// Write an event to the append target, unless the appender filters it out.
    fn append(&self, event: &Event) -> Result<(), Error>;

    /// Flush any buffered output.
    ///
    /// Default to a no-op.
    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }

    /// Release the underlying output. Closing twice is a no-op; a later append reopens it.
    ///
    /// Default to a no-op.
    fn close(&self) -> Result<(), Error> {
        Ok(())
    }
}

impl<T: Append> From<T> for Box<dyn Append> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}
