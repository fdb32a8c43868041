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

//! Bridge from the `log` crate.

use std::borrow::Cow;

use crate::Adapters;
use crate::Event;
use crate::Level;
use crate::event::Message;

/// A `log` crate logger that turns every record into an [`Event`] and dispatches it to an
/// [`Adapters`] collection.
///
/// The record target becomes the event name, the formatted arguments become a text message, and
/// any key-values become a trailing map message. `log::Level::Trace` maps to [`Level::Debug`].
///
/// # Examples
///
/// ```
/// use logweave::AdapterOptions;
/// use logweave::Adapters;
/// use logweave::bridge::LogBridge;
///
/// let mut adapters = Adapters::new();
/// adapters.add("stderr", AdapterOptions::new()).unwrap();
///
/// LogBridge::new(adapters).apply().unwrap();
/// log::info!("Hello World!");
/// ```
#[derive(Debug)]
pub struct LogBridge {
    adapters: Adapters,
}

impl LogBridge {
    /// Create a bridge dispatching to the given adapters.
    pub fn new(adapters: Adapters) -> Self {
        Self { adapters }
    }

    /// Install the bridge as the `log` crate global logger.
    ///
    /// This function will set the global maximum log level to `Trace`. To override this, call
    /// [`log::set_max_level`] after this function.
    ///
    /// # Errors
    ///
    /// Return an error if the log crate global logger has already been set.
    pub fn apply(self) -> Result<(), log::SetLoggerError> {
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(log::LevelFilter::Trace);
        Ok(())
    }

    fn event(record: &log::Record) -> Event {
        let file = match record.file_static() {
            Some(file) => Cow::Borrowed(file),
            None => Cow::Owned(record.file().unwrap_or_default().to_owned()),
        };

        let mut builder = Event::builder(level_from(record.level()))
            .message(*record.args())
            .name(record.target())
            .location(file, record.line().unwrap_or_default());

        let mut visitor = KeyValueVisitor { kvs: vec![] };
        if record.key_values().visit(&mut visitor).is_ok() && !visitor.kvs.is_empty() {
            builder = builder.message(Message::Map(visitor.kvs));
        }

        builder.build()
    }
}

fn level_from(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warn,
        log::Level::Info => Level::Info,
        log::Level::Debug | log::Level::Trace => Level::Debug,
    }
}

struct KeyValueVisitor {
    kvs: Vec<(String, String)>,
}

impl<'kvs> log::kv::VisitSource<'kvs> for KeyValueVisitor {
    fn visit_pair(
        &mut self,
        key: log::kv::Key<'kvs>,
        value: log::kv::Value<'kvs>,
    ) -> Result<(), log::kv::Error> {
        self.kvs.push((key.to_string(), value.to_string()));
        Ok(())
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        self.adapters.dispatch(&LogBridge::event(record));
    }

    fn flush(&self) {
        self.adapters.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_to_event() {
        let record = log::Record::builder()
            .args(format_args!("Hello {}!", "World"))
            .level(log::Level::Trace)
            .target("app::db")
            .file_static(Some("src/db.rs"))
            .line(Some(42))
            .build();

        let event = LogBridge::event(&record);
        assert_eq!(event.level(), Level::Debug);
        assert_eq!(event.name(), Some("app::db"));
        assert_eq!(event.file(), "src/db.rs");
        assert_eq!(event.line(), 42);
        assert_eq!(event.messages(), &[Message::Text("Hello World!".to_owned())]);
    }
}
