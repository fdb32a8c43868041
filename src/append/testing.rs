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

use std::io;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::Error;
use crate::append::Sink;

/// A sink that keeps everything written to it in memory, so that tests can assert on it.
///
/// Clones share the same buffer.
///
/// # Examples
///
/// ```
/// use logweave::append::Adapter;
/// use logweave::append::Testing;
///
/// let sink = Testing::new();
/// let adapter = Adapter::new(sink.clone());
/// assert_eq!(sink.contents(), "");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Testing {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Testing {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer()).into_owned()
    }

    /// Everything written so far, split into lines.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(ToOwned::to_owned).collect()
    }

    /// Discard everything written so far.
    pub fn clear(&self) {
        self.buffer().clear();
    }

    fn buffer(&self) -> MutexGuard<'_, Vec<u8>> {
        self.buffer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Sink for Testing {
    type Writer = TestingWriter;

    fn open(&mut self) -> Result<Self::Writer, Error> {
        Ok(TestingWriter {
            sink: self.clone(),
        })
    }
}

/// The writer of a [`Testing`] sink.
#[derive(Debug)]
pub struct TestingWriter {
    sink: Testing,
}

impl io::Write for TestingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink.buffer().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
