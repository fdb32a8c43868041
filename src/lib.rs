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

//! Logweave renders log events through printf-like patterns and fans them out to a collection of
//! output adapters, including files that rotate by date.
//!
//! # Overview
//!
//! An [`Event`] carries a [`Level`], one or more [`Message`]s and the context captured when it was
//! created. A [`PatternLayout`](layout::PatternLayout) turns it into a line, and an
//! [`Adapter`](append::Adapter) writes that line to its sink when its [`LevelFilter`] accepts the
//! event. [`Adapters`] dispatches every event to all of its adapters in order; an adapter that
//! fails is reported to a [`Trap`] and never stops the others.
//!
//! # Examples
//!
//! Adapters constructed by name:
//!
//! ```
//! use logweave::AdapterOptions;
//! use logweave::Adapters;
//! use logweave::Event;
//! use logweave::Level;
//! use logweave::layout::BASIC_FORMAT;
//!
//! let dir = std::env::temp_dir().join("logweave-doc");
//!
//! let mut adapters = Adapters::new();
//! adapters
//!     .add("stderr", AdapterOptions::new().level(Level::Error))
//!     .unwrap();
//! adapters
//!     .add(
//!         "datefile",
//!         AdapterOptions::new()
//!             .filename(dir.join("app.log").to_string_lossy())
//!             .format(BASIC_FORMAT),
//!     )
//!     .unwrap();
//!
//! adapters.dispatch(&Event::new(Level::Info, "Hello World!"));
//! adapters.close();
//! ```
//!
//! Events from the `log` crate:
//!
//! ```no_run
//! use logweave::AdapterOptions;
//! use logweave::Adapters;
//! use logweave::bridge::LogBridge;
//!
//! let mut adapters = Adapters::new();
//! adapters.add("stdout", AdapterOptions::new()).unwrap();
//! LogBridge::new(adapters).apply().unwrap();
//!
//! log::info!("This is an info message.");
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod append;
pub mod bridge;
pub mod event;
pub mod layout;
pub mod registry;
pub mod trap;

mod adapters;
mod error;
mod level;

pub use self::adapters::Adapters;
pub use self::append::Append;
pub use self::error::Error;
pub use self::error::ErrorKind;
pub use self::event::Event;
pub use self::event::Message;
pub use self::layout::Layout;
pub use self::level::Level;
pub use self::level::LevelFilter;
pub use self::registry::AdapterKind;
pub use self::registry::AdapterOptions;
pub use self::trap::Trap;
