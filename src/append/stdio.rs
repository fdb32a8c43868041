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

use crate::Error;
use crate::append::Sink;

/// A sink that writes to stdout.
///
/// # Examples
///
/// ```
/// use logweave::append::Adapter;
/// use logweave::append::Stdout;
///
/// let stdout = Adapter::new(Stdout::default());
/// ```
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct Stdout {}

impl Sink for Stdout {
    type Writer = io::Stdout;

    fn open(&mut self) -> Result<Self::Writer, Error> {
        Ok(io::stdout())
    }
}

/// A sink that writes to stderr.
///
/// # Examples
///
/// ```
/// use logweave::append::Adapter;
/// use logweave::append::Stderr;
///
/// let stderr = Adapter::new(Stderr::default());
/// ```
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct Stderr {}

impl Sink for Stderr {
    type Writer = io::Stderr;

    fn open(&mut self) -> Result<Self::Writer, Error> {
        Ok(io::stderr())
    }
}
