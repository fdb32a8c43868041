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

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use jiff::fmt::strtime;

use crate::Error;
use crate::Event;
use crate::Layout;
use crate::event::Message;
use crate::event::MessageKind;

/// Only the messages.
pub const NO_FORMAT: &str = "%m";

/// Timestamp, padded level name, pid and messages.
///
/// ```text
/// 2024-08-11T22:44:57+08:00 [ INFO] 4242 : Hello World!
/// ```
pub const DEFAULT_FORMAT: &str = "%d [%5L] %p : %m";

/// Level initial, timestamp and messages.
///
/// ```text
/// I, 2024-08-11T22:44:57+08:00 : Hello World!
/// ```
pub const BASIC_FORMAT: &str = "%l, %d : %m";

/// [`DEFAULT_FORMAT`] with the hostname.
///
/// ```text
/// 2024-08-11T22:44:57+08:00 [ INFO] 4242 my-host : Hello World!
/// ```
pub const EXTENDED_FORMAT: &str = "%d [%5L] %p %h : %m";

const DEFAULT_DATE_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%:z";

// Wider fields are not directives and stay literal text.
const MAX_WIDTH: usize = 1024;

type Modifier = Arc<dyn Fn(&Message) -> String + Send + Sync + 'static>;

/// A layout compiled from a printf-style pattern.
///
/// The pattern is compiled once, when the layout is created. A `%` followed by a directive
/// character is replaced with data from the event:
///
/// | directive | renders                                            |
/// |-----------|----------------------------------------------------|
/// | `%m`      | all messages, separated by a space                 |
/// | `%l`      | the first letter of the level name                 |
/// | `%L`      | the level name                                     |
/// | `%d`      | the event time, ISO-8601 with offset by default    |
/// | `%p`      | the process id                                     |
/// | `%P`      | the program name                                   |
/// | `%t`      | the thread id                                      |
/// | `%h`      | the hostname                                       |
/// | `%N`      | the logger name                                    |
/// | `%F`      | the source file                                    |
/// | `%f`      | the base name of the source file                   |
/// | `%n`      | the source line                                    |
///
/// A directive can carry a printf width of up to 1024, e.g. `%5L` pads to the right and `%-5L`
/// to the left.
/// Any other `%` is kept verbatim, so `%x` and `%%` render as written. Every rendered line ends
/// with exactly one `\n`.
///
/// # Examples
///
/// ```
/// use logweave::Event;
/// use logweave::Level;
/// use logweave::event::MessageKind;
/// use logweave::layout::PatternLayout;
///
/// let layout = PatternLayout::new("%l: %m")
///     .modify(MessageKind::Text, |m| format!("Modified! {m}"));
///
/// let event = Event::new(Level::Warn, "Hello World!");
/// assert_eq!(layout.render(&event), "W: Modified! Hello World!\n");
/// ```
#[derive(Clone)]
pub struct PatternLayout {
    pattern: String,
    segments: Vec<Segment>,
    date_pattern: String,
    modifiers: HashMap<MessageKind, Modifier>,
}

impl fmt::Debug for PatternLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternLayout")
            .field("pattern", &self.pattern)
            .field("date_pattern", &self.date_pattern)
            .field("modifiers", &self.modifiers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for PatternLayout {
    fn default() -> Self {
        PatternLayout::new(DEFAULT_FORMAT)
    }
}

impl PatternLayout {
    /// Compile a pattern. Compilation never fails.
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let segments = compile(&pattern);
        PatternLayout {
            pattern,
            segments,
            date_pattern: DEFAULT_DATE_PATTERN.to_owned(),
            modifiers: HashMap::new(),
        }
    }

    /// Set the strftime pattern used by `%d`.
    ///
    /// Default to `%Y-%m-%dT%H:%M:%S%:z`.
    pub fn with_date_pattern(mut self, date_pattern: impl Into<String>) -> Self {
        self.date_pattern = date_pattern.into();
        self
    }

    /// Register a modifier for messages of the given kind.
    ///
    /// `%m` renders a message of that kind with the modifier's output instead of the default
    /// rendering. A later registration for the same kind replaces the earlier one.
    pub fn modify<F>(mut self, kind: MessageKind, modifier: F) -> Self
    where
        F: Fn(&Message) -> String + Send + Sync + 'static,
    {
        self.modifiers.insert(kind, Arc::new(modifier));
        self
    }

    /// The source pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Render an event into one terminated line.
    pub fn render(&self, event: &Event) -> String {
        let mut out = String::with_capacity(self.pattern.len() + 64);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Directive(directive, None) => {
                    self.write_directive(*directive, event, &mut out)
                }
                Segment::Directive(directive, Some(width)) => {
                    let mut field = String::new();
                    self.write_directive(*directive, event, &mut field);
                    width.pad(&field, &mut out);
                }
            }
        }
        out.push('\n');
        out
    }

    fn write_directive(&self, directive: Directive, event: &Event, out: &mut String) {
        match directive {
            Directive::Messages => self.write_messages(event.messages(), out),
            Directive::LevelInitial => out.push(event.level().initial()),
            Directive::Level => out.push_str(event.level().as_str()),
            Directive::Date => match strtime::format(self.date_pattern.as_str(), event.time()) {
                Ok(date) => out.push_str(&date),
                Err(_) => out.push_str(&event.time().timestamp().to_string()),
            },
            Directive::Pid => out.push_str(&event.pid().to_string()),
            Directive::Progname => out.push_str(event.progname()),
            Directive::ThreadId => out.push_str(&event.thread_id().to_string()),
            Directive::Hostname => out.push_str(event.hostname()),
            Directive::Name => out.push_str(event.name().unwrap_or_default()),
            Directive::File => out.push_str(event.file()),
            Directive::Basename => {
                let file = event.file();
                let basename = Path::new(file)
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or(file);
                out.push_str(basename);
            }
            Directive::Line => out.push_str(&event.line().to_string()),
        }
    }

    fn write_messages(&self, messages: &[Message], out: &mut String) {
        for (i, message) in messages.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            match self.modifiers.get(&message.kind()) {
                Some(modify) => out.push_str(&modify(message)),
                None => out.push_str(&message.to_string()),
            }
        }
    }
}

impl Layout for PatternLayout {
    fn format(&self, event: &Event) -> Result<Vec<u8>, Error> {
        Ok(self.render(event).into_bytes())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Directive {
    Messages,
    LevelInitial,
    Level,
    Date,
    Pid,
    Progname,
    ThreadId,
    Hostname,
    Name,
    File,
    Basename,
    Line,
}

impl Directive {
    fn from_token(token: char) -> Option<Directive> {
        let directive = match token {
            'm' => Directive::Messages,
            'l' => Directive::LevelInitial,
            'L' => Directive::Level,
            'd' => Directive::Date,
            'p' => Directive::Pid,
            'P' => Directive::Progname,
            't' => Directive::ThreadId,
            'h' => Directive::Hostname,
            'N' => Directive::Name,
            'F' => Directive::File,
            'f' => Directive::Basename,
            'n' => Directive::Line,
            _ => return None,
        };
        Some(directive)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Width {
    left: bool,
    min: usize,
}

impl Width {
    fn pad(&self, field: &str, out: &mut String) {
        let fill = self.min.saturating_sub(field.chars().count());
        if !self.left {
            out.extend(std::iter::repeat_n(' ', fill));
        }
        out.push_str(field);
        if self.left {
            out.extend(std::iter::repeat_n(' ', fill));
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Directive(Directive, Option<Width>),
}

fn compile(pattern: &str) -> Vec<Segment> {
    let mut segments = vec![];
    let mut literal = String::new();
    let mut rest = pattern;

    while let Some(pos) = rest.find('%') {
        literal.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        match parse_directive(after) {
            Some((directive, width, consumed)) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Directive(directive, width));
                rest = &after[consumed..];
            }
            None => {
                literal.push('%');
                rest = after;
            }
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

// Parses `-?[0-9]*` followed by a directive character, returning the bytes consumed.
fn parse_directive(after: &str) -> Option<(Directive, Option<Width>, usize)> {
    let bytes = after.as_bytes();
    let left = bytes.first() == Some(&b'-');
    let digits_start = usize::from(left);
    let digits_end = digits_start
        + bytes[digits_start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();

    let token = after[digits_end..].chars().next()?;
    let directive = Directive::from_token(token)?;
    let width = if digits_end > digits_start {
        let min = after[digits_start..digits_end]
            .parse::<usize>()
            .ok()
            .filter(|min| *min <= MAX_WIDTH)?;
        Some(Width { left, min })
    } else {
        None
    };
    Some((directive, width, digits_end + token.len_utf8()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_merges_literals() {
        assert_eq!(compile(""), vec![]);
        assert_eq!(
            compile("a %x b"),
            vec![Segment::Literal("a %x b".to_owned())]
        );
        assert_eq!(
            compile("%%%% %m %%%%"),
            vec![
                Segment::Literal("%%%% ".to_owned()),
                Segment::Directive(Directive::Messages, None),
                Segment::Literal(" %%%%".to_owned()),
            ]
        );
    }

    #[test]
    fn test_compile_widths() {
        assert_eq!(
            compile("[%5L|%-3l]"),
            vec![
                Segment::Literal("[".to_owned()),
                Segment::Directive(Directive::Level, Some(Width { left: false, min: 5 })),
                Segment::Literal("|".to_owned()),
                Segment::Directive(Directive::LevelInitial, Some(Width { left: true, min: 3 })),
                Segment::Literal("]".to_owned()),
            ]
        );
        assert_eq!(compile("%5x"), vec![Segment::Literal("%5x".to_owned())]);
        assert_eq!(compile("%-"), vec![Segment::Literal("%-".to_owned())]);
        assert_eq!(
            compile("%%m"),
            vec![
                Segment::Literal("%".to_owned()),
                Segment::Directive(Directive::Messages, None),
            ]
        );
    }

    #[test]
    fn test_compile_trailing_percent_and_multibyte() {
        assert_eq!(compile("100%"), vec![Segment::Literal("100%".to_owned())]);
        assert_eq!(compile("%é%m"), vec![
            Segment::Literal("%é".to_owned()),
            Segment::Directive(Directive::Messages, None),
        ]);
    }

    #[test]
    fn test_oversized_width_is_literal() {
        assert_eq!(
            compile("%1024m"),
            vec![Segment::Directive(Directive::Messages, Some(Width { left: false, min: 1024 }))]
        );
        assert_eq!(compile("%1025m"), vec![Segment::Literal("%1025m".to_owned())]);
        assert_eq!(
            compile("%-999999999m|%99999999999999999999999L"),
            vec![Segment::Literal("%-999999999m|%99999999999999999999999L".to_owned())]
        );
    }

    #[test]
    fn test_width_padding() {
        let mut out = String::new();
        Width { left: false, min: 5 }.pad("INFO", &mut out);
        Width { left: true, min: 5 }.pad("WARN", &mut out);
        Width { left: false, min: 2 }.pad("ERROR", &mut out);
        assert_eq!(out, " INFOWARN ERROR");
    }
}
