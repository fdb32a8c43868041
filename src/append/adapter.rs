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
use std::io::Write;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::Error;
use crate::Event;
use crate::Layout;
use crate::LevelFilter;
use crate::append::Append;
use crate::layout::PatternLayout;

/// The output medium of an [`Adapter`].
///
/// An adapter calls into its sink while holding its lock, so a sink never sees concurrent calls.
pub trait Sink: fmt::Debug + Send + 'static {
    /// The writer returned by [`Sink::open`].
    type Writer: Write + Send + 'static;

    /// Open the writer that subsequent writes go to.
    fn open(&mut self) -> Result<Self::Writer, Error>;

    /// Called before every accepted write. Return `true` to close the current writer first; the
    /// next write then reopens the sink.
    ///
    /// `opened` tells whether a writer is currently open. Default to never closing.
    fn pre_write(&mut self, opened: bool) -> Result<bool, Error> {
        let _ = opened;
        Ok(false)
    }

    /// Called on every close, after the writer, if any, has been released.
    ///
    /// Default to a no-op.
    fn on_close(&mut self) {}

    /// Whether every write is flushed immediately.
    ///
    /// Default to `true`.
    fn sync(&self) -> bool {
        true
    }
}

struct State<S: Sink> {
    sink: S,
    writer: Option<S::Writer>,
}

impl<S: Sink> fmt::Debug for State<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("sink", &self.sink)
            .field("open", &self.writer.is_some())
            .finish()
    }
}

impl<S: Sink> State<S> {
    fn close(&mut self) -> Result<(), Error> {
        let flushed = match self.writer.take() {
            Some(mut writer) => writer.flush().map_err(Error::from_io_error),
            None => Ok(()),
        };
        self.sink.on_close();
        flushed
    }
}

/// An appender that filters events by level, renders them with a layout and writes them to a
/// [`Sink`].
///
/// The sink is opened lazily on the first accepted event. The whole filter, rotate, render and
/// write sequence runs under one lock, so concurrent writers are serialized per adapter.
#[derive(Debug)]
pub struct Adapter<S: Sink> {
    filter: LevelFilter,
    layout: Box<dyn Layout>,
    state: Mutex<State<S>>,
}

impl<S: Sink> Adapter<S> {
    /// Create an adapter accepting every level and using [`PatternLayout::default`].
    pub fn new(sink: S) -> Self {
        Self {
            filter: LevelFilter::all(),
            layout: Box::new(PatternLayout::default()),
            state: Mutex::new(State { sink, writer: None }),
        }
    }

    /// Set the levels this adapter accepts. A [`Level`](crate::Level) is a minimum threshold.
    pub fn with_filter(mut self, filter: impl Into<LevelFilter>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Set the layout.
    pub fn with_layout(mut self, layout: impl Into<Box<dyn Layout>>) -> Self {
        self.layout = layout.into();
        self
    }

    /// The levels this adapter accepts.
    pub fn filter(&self) -> LevelFilter {
        self.filter
    }

    /// Whether the sink currently has an open writer.
    pub fn is_open(&self) -> bool {
        self.state().writer.is_some()
    }

    /// Inspect the sink.
    pub fn with_sink<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.state().sink)
    }

    fn state(&self) -> MutexGuard<'_, State<S>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<S: Sink> Append for Adapter<S> {
    fn append(&self, event: &Event) -> Result<(), Error> {
        if !self.filter.test(event.level()) {
            return Ok(());
        }

        let mut state = self.state();
        let opened = state.writer.is_some();
        if state.sink.pre_write(opened)? {
            state.close()?;
        }

        let bytes = self.layout.format(event)?;
        let mut writer = match state.writer.take() {
            Some(writer) => writer,
            None => state.sink.open()?,
        };
        let written = writer
            .write_all(&bytes)
            .and_then(|()| {
                if state.sink.sync() {
                    writer.flush()
                } else {
                    Ok(())
                }
            })
            .map_err(Error::from_io_error);
        state.writer = Some(writer);
        written
    }

    fn flush(&self) -> Result<(), Error> {
        match self.state().writer.as_mut() {
            Some(writer) => writer.flush().map_err(Error::from_io_error),
            None => Ok(()),
        }
    }

    fn close(&self) -> Result<(), Error> {
        self.state().close()
    }
}

impl<S: Sink> Drop for Adapter<S> {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(|e| e.into_inner());
        let _ = state.close();
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::Level;
    use crate::append::Testing;

    #[derive(Debug, Default)]
    struct CountingSink {
        inner: Testing,
        opens: Arc<AtomicUsize>,
        closes: Arc<AtomicUsize>,
    }

    impl Sink for CountingSink {
        type Writer = <Testing as Sink>::Writer;

        fn open(&mut self) -> Result<Self::Writer, Error> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            self.inner.open()
        }

        fn on_close(&mut self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Debug)]
    struct BrokenSink;

    impl Sink for BrokenSink {
        type Writer = io::Sink;

        fn open(&mut self) -> Result<Self::Writer, Error> {
            Err(Error::sink("no such device"))
        }
    }

    #[test]
    fn test_lazy_open_and_idempotent_close() {
        let sink = CountingSink::default();
        let opens = sink.opens.clone();
        let closes = sink.closes.clone();
        let output = sink.inner.clone();
        let adapter = Adapter::new(sink).with_layout(PatternLayout::new("%m"));

        assert!(!adapter.is_open());
        adapter.append(&Event::new(Level::Info, "one")).unwrap();
        adapter.append(&Event::new(Level::Info, "two")).unwrap();
        assert!(adapter.is_open());
        assert_eq!(opens.load(Ordering::SeqCst), 1);

        adapter.close().unwrap();
        adapter.close().unwrap();
        assert!(!adapter.is_open());
        assert_eq!(closes.load(Ordering::SeqCst), 2);

        adapter.append(&Event::new(Level::Info, "three")).unwrap();
        assert_eq!(opens.load(Ordering::SeqCst), 2);
        assert_eq!(output.contents(), "one\ntwo\nthree\n");
    }

    #[test]
    fn test_filtered_events_do_not_open() {
        let adapter = Adapter::new(BrokenSink).with_filter(Level::Error);
        adapter.append(&Event::new(Level::Warn, "ignored")).unwrap();
        assert!(!adapter.is_open());

        let err = adapter.append(&Event::new(Level::Error, "boom")).unwrap_err();
        assert_eq!(err.message(), "no such device");
        assert!(!adapter.is_open());
    }
}
