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

//! Log events and their message payloads.

use std::backtrace::Backtrace;
use std::backtrace::BacktraceStatus;
use std::borrow::Cow;
use std::fmt;
use std::panic::Location;
use std::path::Path;
use std::sync::OnceLock;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use jiff::Zoned;

use crate::Level;

/// An immutable snapshot of one log occurrence.
///
/// Every field is captured when the event is built, never when it is rendered.
///
/// # Examples
///
/// ```
/// use logweave::Event;
/// use logweave::Level;
///
/// let event = Event::new(Level::Info, "Hello World!");
/// assert_eq!(event.level(), Level::Info);
/// assert_eq!(event.messages().len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct Event {
    level: Level,
    messages: Vec<Message>,
    time: Zoned,
    pid: u32,
    thread_id: u64,
    hostname: &'static str,
    progname: &'static str,
    name: Option<String>,
    file: Cow<'static, str>,
    line: u32,
}

impl Event {
    /// Create an event with a single message, captured at the caller's location.
    #[track_caller]
    pub fn new(level: Level, message: impl Into<Message>) -> Event {
        Event::builder(level).message(message).build()
    }

    /// Create an [`EventBuilder`] capturing the caller's location.
    #[track_caller]
    pub fn builder(level: Level) -> EventBuilder {
        let location = Location::caller();
        EventBuilder {
            level,
            messages: vec![],
            time: None,
            name: None,
            file: Cow::Borrowed(location.file()),
            line: location.line(),
        }
    }

    /// The severity.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The message payloads, in the order they were given.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The time the event was created.
    pub fn time(&self) -> &Zoned {
        &self.time
    }

    /// The id of the current process.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// A small integer identifying the thread that created the event.
    pub fn thread_id(&self) -> u64 {
        self.thread_id
    }

    /// The local hostname.
    pub fn hostname(&self) -> &str {
        self.hostname
    }

    /// The program name, taken from the first command line argument.
    pub fn progname(&self) -> &str {
        self.progname
    }

    /// The logger name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The source file that created the event.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// The source line that created the event.
    pub fn line(&self) -> u32 {
        self.line
    }
}

/// A builder for [`Event`].
#[derive(Debug)]
pub struct EventBuilder {
    level: Level,
    messages: Vec<Message>,
    time: Option<Zoned>,
    name: Option<String>,
    file: Cow<'static, str>,
    line: u32,
}

impl EventBuilder {
    /// Append a message.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.messages.push(message.into());
        self
    }

    /// Append several messages.
    pub fn messages<I, M>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<Message>,
    {
        self.messages.extend(messages.into_iter().map(Into::into));
        self
    }

    /// Set the logger name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Override the creation time. Defaults to now.
    pub fn time(mut self, time: Zoned) -> Self {
        self.time = Some(time);
        self
    }

    /// Override the source location. Defaults to the caller of [`Event::builder`].
    pub fn location(mut self, file: impl Into<Cow<'static, str>>, line: u32) -> Self {
        self.file = file.into();
        self.line = line;
        self
    }

    /// Capture the process details and build the [`Event`].
    pub fn build(self) -> Event {
        Event {
            level: self.level,
            messages: self.messages,
            time: self.time.unwrap_or_else(Zoned::now),
            pid: std::process::id(),
            thread_id: current_thread_id(),
            hostname: hostname(),
            progname: progname(),
            name: self.name,
            file: self.file,
            line: self.line,
        }
    }
}

/// The kind of a [`Message`], used to look up message modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// [`Message::Text`].
    Text,
    /// [`Message::Error`].
    Error,
    /// [`Message::Map`].
    Map,
    /// [`Message::Other`].
    Other,
}

/// One message payload of an [`Event`].
///
/// The `Display` implementation is the default rendering of the `%m` directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    /// Plain text, rendered verbatim.
    Text(String),
    /// An error, rendered as `Kind: message` followed by one tab-indented line per frame.
    Error(ErrorMessage),
    /// Key-value pairs in insertion order, rendered as `key: value` joined by `", "`.
    Map(Vec<(String, String)>),
    /// Any other payload, already converted into a string.
    Other(String),
}

impl Message {
    /// The kind of this payload.
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Text(_) => MessageKind::Text,
            Message::Error(_) => MessageKind::Error,
            Message::Map(_) => MessageKind::Map,
            Message::Other(_) => MessageKind::Other,
        }
    }

    /// Create a [`Message::Map`] from key-value pairs.
    pub fn map<I, K, V>(pairs: I) -> Message
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: fmt::Display,
    {
        Message::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        )
    }

    /// Create a [`Message::Error`] from an error value, capturing a backtrace if enabled.
    pub fn error<E: std::error::Error>(err: &E) -> Message {
        Message::Error(ErrorMessage::from_error(err))
    }

    /// Create a [`Message::Other`] from any value, using its `Debug` representation.
    pub fn other(value: &impl fmt::Debug) -> Message {
        Message::Other(format!("{value:?}"))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Text(text) => f.write_str(text),
            Message::Error(err) => fmt::Display::fmt(err, f),
            Message::Map(pairs) => {
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                Ok(())
            }
            Message::Other(text) => f.write_str(text),
        }
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Text(text)
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Text(text.to_owned())
    }
}

impl From<fmt::Arguments<'_>> for Message {
    fn from(args: fmt::Arguments<'_>) -> Self {
        Message::Text(args.to_string())
    }
}

impl From<ErrorMessage> for Message {
    fn from(err: ErrorMessage) -> Self {
        Message::Error(err)
    }
}

impl<K: Into<String>, V: fmt::Display, const N: usize> From<[(K, V); N]> for Message {
    fn from(pairs: [(K, V); N]) -> Self {
        Message::map(pairs)
    }
}

/// An error payload: the error's kind name, its message, and its backtrace frames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorMessage {
    kind: String,
    message: String,
    backtrace: Vec<String>,
}

impl ErrorMessage {
    /// Create an error payload with no backtrace.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        ErrorMessage {
            kind: kind.into(),
            message: message.into(),
            backtrace: vec![],
        }
    }

    /// Create an error payload from an error value.
    ///
    /// The kind is the unqualified type name of `E`. A backtrace is captured when enabled through
    /// `RUST_BACKTRACE` or `RUST_LIB_BACKTRACE`.
    pub fn from_error<E: std::error::Error>(err: &E) -> Self {
        ErrorMessage {
            kind: short_type_name::<E>().to_owned(),
            message: err.to_string(),
            backtrace: capture_backtrace(),
        }
    }

    /// Replace the backtrace frames.
    pub fn with_backtrace<I, S>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.backtrace = frames.into_iter().map(Into::into).collect();
        self
    }

    /// The error's kind name.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The error's message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The backtrace frames.
    pub fn backtrace(&self) -> &[String] {
        &self.backtrace
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        for frame in &self.backtrace {
            write!(f, "\n\t{frame}")?;
        }
        Ok(())
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let name = std::any::type_name::<T>();
    let name = name.split('<').next().unwrap_or(name);
    name.rsplit("::").next().unwrap_or(name)
}

fn capture_backtrace() -> Vec<String> {
    let backtrace = Backtrace::capture();
    if backtrace.status() != BacktraceStatus::Captured {
        return vec![];
    }

    backtrace
        .to_string()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn current_thread_id() -> u64 {
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);

    thread_local! {
        static THREAD_ID: u64 = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    }

    THREAD_ID.with(|id| *id)
}

fn progname() -> &'static str {
    static PROGNAME: OnceLock<String> = OnceLock::new();
    PROGNAME.get_or_init(|| {
        std::env::args_os()
            .next()
            .and_then(|arg0| {
                Path::new(&arg0)
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_default()
    })
}

fn hostname() -> &'static str {
    static HOSTNAME: OnceLock<String> = OnceLock::new();
    HOSTNAME.get_or_init(system_hostname)
}

#[cfg(unix)]
fn system_hostname() -> String {
    let mut buf = [0u8; 256];
    // SAFETY: the pointer and length describe a valid, writable buffer
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
    if rc != 0 {
        return "localhost".to_owned();
    }

    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..len]).into_owned()
}

#[cfg(not(unix))]
fn system_hostname() -> String {
    std::env::var("COMPUTERNAME").unwrap_or_else(|_| "localhost".to_owned())
}
