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

//! Adapter kinds and the options used to construct them by name.

use std::fmt;
use std::num::NonZeroUsize;
use std::path::Path;
use std::str::FromStr;

use crate::Error;
use crate::Layout;
use crate::LevelFilter;
use crate::append::Adapter;
use crate::append::Append;
use crate::append::DateFileSink;
use crate::append::FileSink;
use crate::append::Stderr;
use crate::append::Stdout;
use crate::layout::DEFAULT_FORMAT;
use crate::layout::PatternLayout;

/// The adapter kinds that can be constructed by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdapterKind {
    /// `"stdout"`: writes to stdout.
    Stdout,
    /// `"stderr"`: writes to stderr.
    Stderr,
    /// `"file"`: appends to the file named by the `filename` option, or [`default_filename`].
    File,
    /// `"datefile"`: appends to a dated file derived from the `filename` option, or
    /// [`default_filename`].
    DateFile,
}

impl AdapterKind {
    /// All kinds.
    pub const ALL: [AdapterKind; 4] = [
        AdapterKind::Stdout,
        AdapterKind::Stderr,
        AdapterKind::File,
        AdapterKind::DateFile,
    ];

    /// The name the kind is registered under.
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterKind::Stdout => "stdout",
            AdapterKind::Stderr => "stderr",
            AdapterKind::File => "file",
            AdapterKind::DateFile => "datefile",
        }
    }

    /// Construct an adapter of this kind.
    ///
    /// Options that do not apply to the kind are ignored.
    ///
    /// # Errors
    ///
    /// Return an error if the date pattern is malformed or colors are requested without the
    /// `colored` feature.
    pub fn build(self, options: AdapterOptions) -> Result<Box<dyn Append>, Error> {
        let AdapterOptions {
            filename,
            date_pattern,
            level,
            format,
            keep,
            colors,
        } = options;

        let layout = PatternLayout::new(format.unwrap_or_else(|| DEFAULT_FORMAT.to_owned()));
        let filter = level.unwrap_or_default();

        let append: Box<dyn Append> = match self {
            AdapterKind::Stdout => Box::new(
                Adapter::new(Stdout::default())
                    .with_filter(filter)
                    .with_layout(console_layout(layout, colors)?),
            ),
            AdapterKind::Stderr => Box::new(
                Adapter::new(Stderr::default())
                    .with_filter(filter)
                    .with_layout(console_layout(layout, colors)?),
            ),
            AdapterKind::File => {
                let filename = filename.unwrap_or_else(default_filename);
                Box::new(
                    Adapter::new(FileSink::new(filename))
                        .with_filter(filter)
                        .with_layout(layout),
                )
            }
            AdapterKind::DateFile => {
                let filename = filename.unwrap_or_else(default_filename);
                let mut builder = DateFileSink::builder(filename);
                if let Some(date_pattern) = date_pattern {
                    builder = builder.date_pattern(date_pattern);
                }
                if let Some(keep) = keep {
                    builder = builder.keep(keep);
                }
                Box::new(
                    Adapter::new(builder.build()?)
                        .with_filter(filter)
                        .with_layout(layout),
                )
            }
        };
        Ok(append)
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdapterKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<AdapterKind, Self::Err> {
        AdapterKind::ALL
            .into_iter()
            .find(|kind| s.trim().eq_ignore_ascii_case(kind.as_str()))
            .ok_or_else(|| Error::config("no such adapter").with_context("kind", s))
    }
}

const ENV_VARS: [&str; 3] = ["LOGWEAVE_ENV", "RACK_ENV", "RAILS_ENV"];

/// The filename of `file` and `datefile` adapters configured without one.
///
/// The name is `<env>.log`, where `<env>` is the first non-empty variable among `LOGWEAVE_ENV`,
/// `RACK_ENV` and `RAILS_ENV`, or `development`. The file goes into `./log` when that directory
/// exists, and into the current directory otherwise.
pub fn default_filename() -> String {
    default_filename_in(|key| std::env::var(key).ok(), Path::new("log"))
}

fn default_filename_in(var: impl Fn(&str) -> Option<String>, logdir: &Path) -> String {
    let env = ENV_VARS
        .into_iter()
        .find_map(|key| var(key).filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| "development".to_owned());
    let name = format!("{}.log", env.trim());
    if logdir.is_dir() {
        logdir.join(name).to_string_lossy().into_owned()
    } else {
        name
    }
}

#[cfg(feature = "colored")]
fn console_layout(layout: PatternLayout, colors: bool) -> Result<Box<dyn Layout>, Error> {
    if colors {
        Ok(Box::new(crate::layout::ColoredLayout::new(layout)))
    } else {
        Ok(Box::new(layout))
    }
}

#[cfg(not(feature = "colored"))]
fn console_layout(layout: PatternLayout, colors: bool) -> Result<Box<dyn Layout>, Error> {
    if colors {
        Err(Error::config("colored output requires the `colored` feature"))
    } else {
        Ok(Box::new(layout))
    }
}

/// Options for constructing an adapter by name.
///
/// A bare filename converts into options naming that file, so `file` and `datefile` adapters
/// accept the filename positionally.
///
/// # Examples
///
/// ```
/// use logweave::AdapterOptions;
/// use logweave::Level;
///
/// let positional = AdapterOptions::from("logs/access.log").level(Level::Info);
///
/// let options = AdapterOptions::new()
///     .filename("logs/access.log")
///     .date_pattern("%Y%m%d%H")
///     .level(Level::Info);
///
/// let same = AdapterOptions::from_pairs([
///     ("filename", "logs/access.log"),
///     ("date_pattern", "%Y%m%d%H"),
///     ("level", "info"),
/// ])
/// .unwrap();
/// ```
#[derive(Clone, Debug, Default)]
pub struct AdapterOptions {
    filename: Option<String>,
    date_pattern: Option<String>,
    level: Option<LevelFilter>,
    format: Option<String>,
    keep: Option<NonZeroUsize>,
    colors: bool,
}

impl AdapterOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the file to write to. Required by `file` and `datefile`.
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Set the date pattern of a `datefile` adapter.
    pub fn date_pattern(mut self, date_pattern: impl Into<String>) -> Self {
        self.date_pattern = Some(date_pattern.into());
        self
    }

    /// Set the accepted levels. A [`Level`](crate::Level) is a minimum threshold.
    pub fn level(mut self, level: impl Into<LevelFilter>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Set the layout pattern. Default to [`DEFAULT_FORMAT`].
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Set how many dated files a `datefile` adapter keeps.
    pub fn keep(mut self, keep: NonZeroUsize) -> Self {
        self.keep = Some(keep);
        self
    }

    /// Color console output by level. Requires the `colored` feature.
    pub fn colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    /// Set an option from its string form.
    ///
    /// Recognized keys are `filename`, `date_pattern`, `level`, `format`, `keep` and `colors`.
    ///
    /// # Errors
    ///
    /// Return an error for an unknown key or a value that does not parse.
    pub fn set(self, key: &str, value: &str) -> Result<Self, Error> {
        let malformed = |source: Option<Error>| {
            let err = Error::config("malformed adapter option")
                .with_context("option", key)
                .with_context("value", value);
            match source {
                Some(source) => err.with_source(source),
                None => err,
            }
        };

        let options = match key {
            "filename" => self.filename(value),
            "date_pattern" => self.date_pattern(value),
            "format" => self.format(value),
            "level" => {
                let level = value
                    .parse::<LevelFilter>()
                    .map_err(|err| malformed(Some(err)))?;
                self.level(level)
            }
            "keep" => {
                let keep = value
                    .trim()
                    .parse::<NonZeroUsize>()
                    .map_err(|_| malformed(None))?;
                self.keep(keep)
            }
            "colors" => {
                let colors = value.trim().parse::<bool>().map_err(|_| malformed(None))?;
                self.colors(colors)
            }
            _ => {
                return Err(Error::config("unknown adapter option").with_context("option", key));
            }
        };
        Ok(options)
    }

    /// Build options from string key-value pairs. See [`AdapterOptions::set`].
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        pairs
            .into_iter()
            .try_fold(AdapterOptions::new(), |options, (k, v)| {
                options.set(k.as_ref(), v.as_ref())
            })
    }
}

impl From<&str> for AdapterOptions {
    fn from(filename: &str) -> Self {
        AdapterOptions::new().filename(filename)
    }
}

impl From<String> for AdapterOptions {
    fn from(filename: String) -> Self {
        AdapterOptions::new().filename(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::Level;

    #[test]
    fn test_kind_names() {
        for kind in AdapterKind::ALL {
            assert_eq!(kind.as_str().parse::<AdapterKind>().unwrap(), kind);
        }
        assert_eq!("DateFile".parse::<AdapterKind>().unwrap(), AdapterKind::DateFile);

        let err = "syslog".parse::<AdapterKind>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(err.context("kind"), Some("syslog"));
    }

    #[test]
    fn test_default_filename() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("log");
        let unset = |_: &str| None;

        assert_eq!(default_filename_in(unset, &missing), "development.log");
        assert_eq!(
            default_filename_in(|key| (key == "RAILS_ENV").then(|| "test".to_owned()), &missing),
            "test.log"
        );
        let env = |key: &str| match key {
            "LOGWEAVE_ENV" => Some(" ".to_owned()),
            "RACK_ENV" => Some("production".to_owned()),
            _ => Some("staging".to_owned()),
        };
        assert_eq!(default_filename_in(env, &missing), "production.log");

        std::fs::create_dir(&missing).unwrap();
        assert_eq!(
            default_filename_in(unset, &missing),
            missing.join("development.log").to_string_lossy()
        );
    }

    #[test]
    fn test_file_kinds_default_filename() {
        for kind in [AdapterKind::File, AdapterKind::DateFile] {
            assert!(kind.build(AdapterOptions::new()).is_ok());
        }
    }

    #[test]
    fn test_positional_filename() {
        let options = AdapterOptions::from("development.log").keep(NonZeroUsize::MIN);
        assert_eq!(options.filename.as_deref(), Some("development.log"));
        assert_eq!(options.keep, Some(NonZeroUsize::MIN));

        let options = AdapterOptions::from(String::from("access.log"));
        assert_eq!(options.filename.as_deref(), Some("access.log"));
    }

    #[test]
    fn test_options_from_pairs() {
        let options = AdapterOptions::from_pairs([
            ("filename", "app.log"),
            ("level", "gte.warn"),
            ("keep", "3"),
            ("colors", "false"),
        ])
        .unwrap();
        assert_eq!(options.filename.as_deref(), Some("app.log"));
        assert_eq!(options.level, Some(LevelFilter::at_least(Level::Warn)));
        assert_eq!(options.keep, NonZeroUsize::new(3));
        assert!(!options.colors);

        let err = AdapterOptions::new().set("keep", "0").unwrap_err();
        assert_eq!(err.message(), "malformed adapter option");
        let err = AdapterOptions::new().set("level", "loud").unwrap_err();
        assert_eq!(err.context("value"), Some("loud"));
        let err = AdapterOptions::new().set("color", "true").unwrap_err();
        assert_eq!(err.message(), "unknown adapter option");
    }

    #[cfg(not(feature = "colored"))]
    #[test]
    fn test_colors_require_feature() {
        let err = AdapterKind::Stdout
            .build(AdapterOptions::new().colors(true))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
