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

//! A file sink that switches to a new file when the date changes.
//!
//! The concrete filename is the configured base filename with the current date inserted before
//! its extension, so `access.log` with the default date pattern becomes `access.20240101.log`, and
//! a base without an extension such as `access` becomes `access.20240101`.
//!
//! The date is checked on every write, not on a timer. A date boundary crossed while nothing is
//! written is noticed at the next write.
//!
//! # Example
//!
//! ```
//! use logweave::Level;
//! use logweave::append::Adapter;
//! use logweave::append::datefile::DateFileSink;
//!
//! let sink = DateFileSink::builder("logs/access.log")
//!     .date_pattern("%Y%m%d%H")
//!     .build()
//!     .unwrap();
//! let adapter = Adapter::new(sink).with_filter(Level::Info);
//! ```

use std::fs;
use std::fs::File;
use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;

use jiff::fmt::strtime;

use self::clock::Clock;
use crate::Error;
use crate::append::Sink;
use crate::append::file::open_append;

mod clock;

/// The default date pattern, e.g. `19820114` for 14 Jan 1982.
pub const DEFAULT_DATE_PATTERN: &str = "%Y%m%d";

/// Insert `date` into `basename` before its extension.
///
/// The extension is the trailing `.` followed by ASCII letters, digits or `_`. Without one,
/// the date is appended after a `.`.
///
/// ```
/// use logweave::append::datefile::dated_filename;
///
/// assert_eq!(dated_filename("access.log", "20240101"), "access.20240101.log");
/// assert_eq!(dated_filename("access", "20240101"), "access.20240101");
/// ```
pub fn dated_filename(basename: &str, date: &str) -> String {
    let (stem, extension) = split_extension(basename);
    format!("{stem}.{date}{extension}")
}

fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if is_extension(&name[pos + 1..]) => (&name[..pos], &name[pos..]),
        _ => (name, ""),
    }
}

fn is_extension(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// A builder for configuring [`DateFileSink`].
#[derive(Debug)]
pub struct DateFileBuilder {
    basename: String,
    date_pattern: String,
    keep: Option<NonZeroUsize>,
    clock: Clock,
}

impl DateFileBuilder {
    /// Create a builder for the given base filename.
    pub fn new(basename: impl Into<String>) -> Self {
        Self {
            basename: basename.into(),
            date_pattern: DEFAULT_DATE_PATTERN.to_owned(),
            keep: None,
            clock: Clock::DefaultClock,
        }
    }

    /// Set the strftime pattern whose output selects the file.
    ///
    /// Default to [`DEFAULT_DATE_PATTERN`]. A finer pattern such as `%Y%m%d%H` rotates hourly.
    pub fn date_pattern(mut self, date_pattern: impl Into<String>) -> Self {
        self.date_pattern = date_pattern.into();
        self
    }

    /// Set the maximum number of dated files to keep.
    ///
    /// Whenever a file is opened, the oldest files following the same naming scheme are deleted
    /// so that at most `n` remain, including the one being opened.
    pub fn keep(mut self, n: NonZeroUsize) -> Self {
        self.keep = Some(n);
        self
    }

    #[cfg(test)]
    fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Build the [`DateFileSink`].
    ///
    /// # Errors
    ///
    /// Return an error if the base filename or the date pattern is empty, or if the date pattern
    /// is malformed.
    pub fn build(self) -> Result<DateFileSink, Error> {
        let DateFileBuilder {
            basename,
            date_pattern,
            keep,
            clock,
        } = self;

        if basename.is_empty() {
            return Err(Error::config("empty log filename"));
        }
        if date_pattern.is_empty() {
            return Err(Error::config("empty date pattern"));
        }
        strtime::format(date_pattern.as_str(), &clock.now()).map_err(|err| {
            Error::config("malformed date pattern")
                .with_context("date_pattern", &date_pattern)
                .with_source(err)
        })?;

        Ok(DateFileSink {
            filename: PathBuf::from(&basename),
            basename,
            date_pattern,
            date: None,
            keep,
            clock,
        })
    }
}

/// A sink that appends to `<base>.<date><extension>`, switching files when the date changes.
///
/// Wrapped in an [`Adapter`](crate::append::Adapter), the state machine runs as follows. Before
/// every accepted write the date is computed from the date pattern. If no file is open, or the
/// date differs from the remembered one, the date is remembered and the open file is closed. The
/// close step recomputes the filename from the base and the remembered date, and the write then
/// opens that file.
#[derive(Debug)]
pub struct DateFileSink {
    basename: String,
    date_pattern: String,
    date: Option<String>,
    filename: PathBuf,
    keep: Option<NonZeroUsize>,
    clock: Clock,
}

impl DateFileSink {
    /// Create a [`DateFileBuilder`].
    pub fn builder(basename: impl Into<String>) -> DateFileBuilder {
        DateFileBuilder::new(basename)
    }

    /// The base filename.
    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// The strftime pattern that selects the file.
    pub fn date_pattern(&self) -> &str {
        &self.date_pattern
    }

    /// The remembered date, if any write has happened yet.
    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    /// The file the next open uses.
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    fn current_date(&self) -> Result<String, Error> {
        strtime::format(self.date_pattern.as_str(), &self.clock.now()).map_err(|err| {
            Error::sink("failed to format date")
                .with_context("date_pattern", &self.date_pattern)
                .with_source(err)
        })
    }

    fn delete_oldest_logs(&self, keep: NonZeroUsize) -> Result<(), Error> {
        let base = Path::new(&self.basename);
        let dir = match base.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let Some(name) = base.file_name().and_then(|name| name.to_str()) else {
            return Ok(());
        };
        let (stem, extension) = split_extension(name);
        let prefix = format!("{stem}.");
        let current = self.filename.file_name();

        let read_dir = fs::read_dir(dir).map_err(|err| {
            Error::sink("failed to read log dir")
                .with_context("dir", dir.display())
                .with_source(err)
        })?;

        let mut files = read_dir
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let metadata = entry.metadata().ok()?;

                // only files this sink could have created
                if !metadata.is_file() {
                    return None;
                }

                let filename = entry.file_name();
                if Some(filename.as_os_str()) == current {
                    return None;
                }

                let filename = filename.to_str()?;
                let date = filename.strip_prefix(&prefix)?.strip_suffix(extension)?;
                if date.is_empty() || strtime::parse(self.date_pattern.as_str(), date).is_err() {
                    return None;
                }

                let modified = metadata.modified().ok()?;
                Some((modified, filename.to_owned(), entry.path()))
            })
            .collect::<Vec<_>>();

        // leave room for the file about to be opened
        let retain = keep.get() - 1;
        if files.len() <= retain {
            return Ok(());
        }

        files.sort();
        let excess = files.len() - retain;
        for (_, _, path) in files.iter().take(excess) {
            fs::remove_file(path).map_err(|err| {
                Error::sink("failed to remove old log file")
                    .with_context("path", path.display())
                    .with_source(err)
            })?;
        }

        Ok(())
    }
}

impl Sink for DateFileSink {
    type Writer = File;

    fn open(&mut self) -> Result<Self::Writer, Error> {
        if let Some(keep) = self.keep {
            if let Err(err) = self.delete_oldest_logs(keep) {
                eprintln!("failed to delete oldest logs: {err}");
            }
        }
        open_append(&self.filename)
    }

    fn pre_write(&mut self, opened: bool) -> Result<bool, Error> {
        let date = self.current_date()?;
        if opened && self.date.as_deref() == Some(date.as_str()) {
            return Ok(false);
        }

        self.date = Some(date);
        Ok(true)
    }

    fn on_close(&mut self) {
        if let Some(date) = &self.date {
            self.filename = PathBuf::from(dated_filename(&self.basename, date));
        }
    }
}
