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

//! Severity levels and the filters adapters use to accept or reject them.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// An enum representing the available severity levels.
///
/// Levels are ordered from the most verbose, [`Level::Debug`], to the least verbose,
/// [`Level::Unknown`].
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Designates lower priority information.
    Debug = 0,
    /// Designates useful information.
    Info = 1,
    /// Designates hazardous situations.
    Warn = 2,
    /// Designates errors.
    Error = 3,
    /// Designates errors the program cannot recover from.
    Fatal = 4,
    /// Designates messages of unknown severity that should always be logged.
    Unknown = 5,
}

impl Level {
    /// All levels, from the most verbose to the least verbose.
    pub const ALL: [Level; 6] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
        Level::Unknown,
    ];

    /// Return the string representation of the `Level`.
    ///
    /// This returns the same string as the `fmt::Display` implementation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
            Level::Unknown => "UNKNOWN",
        }
    }

    /// The one-letter abbreviation of the level, e.g. `'W'` for [`Level::Warn`].
    pub fn initial(&self) -> char {
        // every name is a non-empty ASCII word
        char::from(self.as_str().as_bytes()[0])
    }

    /// The ordinal of the level; smaller is more verbose.
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// Look up a level by its ordinal.
    pub fn from_ordinal(ordinal: u8) -> Option<Level> {
        Level::ALL.get(usize::from(ordinal)).copied()
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Level, Self::Err> {
        let s = s.trim();
        if let Some(level) = Level::ALL
            .into_iter()
            .find(|level| s.eq_ignore_ascii_case(level.as_str()))
        {
            return Ok(level);
        }

        s.parse::<u8>()
            .ok()
            .and_then(Level::from_ordinal)
            .ok_or_else(|| Error::config("malformed level").with_context("level", s))
    }
}

/// The set of levels an adapter accepts.
///
/// A filter is usually built from a minimum threshold with [`LevelFilter::at_least`], or from a
/// level itself via `From<Level>`. It can also be parsed from an expression:
///
/// * a bare level such as `"warn"` accepts that level and everything less verbose;
/// * `gte.L`, `gt.L`, `lte.L`, `lt.L` and `eq.L` compare against the level `L`;
/// * `all` and `off` accept everything or nothing;
/// * comma-separated clauses are combined, so `"eq.debug, gte.error"` accepts `DEBUG`, `ERROR`,
///   `FATAL` and `UNKNOWN`.
///
/// # Examples
///
/// ```
/// use logweave::Level;
/// use logweave::LevelFilter;
///
/// let filter: LevelFilter = "gt.info".parse().unwrap();
///
/// assert!(!filter.test(Level::Info));
/// assert!(filter.test(Level::Warn));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LevelFilter {
    mask: u8,
}

impl LevelFilter {
    /// Accept every level.
    pub const fn all() -> LevelFilter {
        LevelFilter { mask: 0b11_1111 }
    }

    /// Reject every level.
    pub const fn off() -> LevelFilter {
        LevelFilter { mask: 0 }
    }

    /// Accept `level` and every less verbose level.
    pub fn at_least(level: Level) -> LevelFilter {
        Self::matching(|l| l >= level)
    }

    /// Accept every level less verbose than `level`.
    pub fn above(level: Level) -> LevelFilter {
        Self::matching(|l| l > level)
    }

    /// Accept `level` and every more verbose level.
    pub fn at_most(level: Level) -> LevelFilter {
        Self::matching(|l| l <= level)
    }

    /// Accept every level more verbose than `level`.
    pub fn below(level: Level) -> LevelFilter {
        Self::matching(|l| l < level)
    }

    /// Accept exactly `level`.
    pub fn only(level: Level) -> LevelFilter {
        Self::matching(|l| l == level)
    }

    /// Accept the levels accepted by either filter.
    pub fn or(self, other: LevelFilter) -> LevelFilter {
        LevelFilter {
            mask: self.mask | other.mask,
        }
    }

    /// Checks whether the given level passes the filter.
    pub fn test(&self, level: Level) -> bool {
        self.mask & (1 << level.ordinal()) != 0
    }

    fn matching(f: impl Fn(Level) -> bool) -> LevelFilter {
        let mask = Level::ALL
            .into_iter()
            .filter(|l| f(*l))
            .fold(0, |mask, l| mask | (1 << l.ordinal()));
        LevelFilter { mask }
    }
}

impl Default for LevelFilter {
    fn default() -> Self {
        LevelFilter::all()
    }
}

impl fmt::Debug for LevelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(Level::ALL.into_iter().filter(|l| self.test(*l)))
            .finish()
    }
}

impl From<Level> for LevelFilter {
    fn from(level: Level) -> Self {
        LevelFilter::at_least(level)
    }
}

impl FromStr for LevelFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<LevelFilter, Self::Err> {
        let mut filter = LevelFilter::off();
        let mut clauses = 0;

        for clause in s.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            clauses += 1;
            filter = filter.or(parse_clause(clause)?);
        }

        if clauses == 0 {
            return Err(Error::config("empty level filter"));
        }
        Ok(filter)
    }
}

fn parse_clause(clause: &str) -> Result<LevelFilter, Error> {
    if clause.eq_ignore_ascii_case("all") {
        return Ok(LevelFilter::all());
    }
    if clause.eq_ignore_ascii_case("off") {
        return Ok(LevelFilter::off());
    }

    let Some((op, level)) = clause.split_once('.') else {
        return clause.parse::<Level>().map(LevelFilter::at_least);
    };

    let level = level.parse::<Level>()?;
    match op.to_ascii_lowercase().as_str() {
        "gte" => Ok(LevelFilter::at_least(level)),
        "gt" => Ok(LevelFilter::above(level)),
        "lte" => Ok(LevelFilter::at_most(level)),
        "lt" => Ok(LevelFilter::below(level)),
        "eq" => Ok(LevelFilter::only(level)),
        _ => Err(Error::config("malformed level filter operator").with_context("clause", clause)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names() {
        assert_eq!(Level::Warn.to_string(), "WARN");
        assert_eq!(Level::Info.initial(), 'I');
        assert_eq!(Level::Unknown.initial(), 'U');
        assert_eq!(format!("{:>5}", Level::Info), " INFO");
        assert_eq!("error".parse::<Level>().unwrap(), Level::Error);
        assert_eq!("4".parse::<Level>().unwrap(), Level::Fatal);
        assert!("verbose".parse::<Level>().is_err());
        assert!("6".parse::<Level>().is_err());
    }

    #[test]
    fn test_threshold() {
        let filter = LevelFilter::from(Level::Warn);
        assert!(!filter.test(Level::Debug));
        assert!(!filter.test(Level::Info));
        assert!(filter.test(Level::Warn));
        assert!(filter.test(Level::Unknown));
        assert!(LevelFilter::default().test(Level::Debug));
        assert!(!LevelFilter::off().test(Level::Fatal));
    }

    #[test]
    fn test_parse_filter_expressions() {
        let filter: LevelFilter = "info".parse().unwrap();
        assert_eq!(filter, LevelFilter::at_least(Level::Info));

        let filter: LevelFilter = "lt.warn".parse().unwrap();
        assert!(filter.test(Level::Info));
        assert!(!filter.test(Level::Warn));

        let filter: LevelFilter = "eq.debug, gte.error".parse().unwrap();
        let accepted = Level::ALL
            .into_iter()
            .filter(|l| filter.test(*l))
            .collect::<Vec<_>>();
        assert_eq!(
            accepted,
            vec![Level::Debug, Level::Error, Level::Fatal, Level::Unknown]
        );

        assert_eq!("ALL".parse::<LevelFilter>().unwrap(), LevelFilter::all());
        assert!("".parse::<LevelFilter>().is_err());
        assert!("near.warn".parse::<LevelFilter>().is_err());
        assert!("gte.loud".parse::<LevelFilter>().is_err());
    }
}
