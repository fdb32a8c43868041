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

use std::fs;
use std::num::NonZeroUsize;

use jiff::Zoned;
use jiff::fmt::strtime;
use logweave::AdapterOptions;
use logweave::Adapters;
use logweave::Event;
use logweave::Level;
use logweave::append::Adapter;
use logweave::append::Append;
use logweave::append::DateFileSink;
use logweave::layout::PatternLayout;

#[test]
fn test_datefile_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("nested").join("access.log");

    let mut adapters = Adapters::new();
    adapters
        .add(
            "datefile",
            AdapterOptions::new()
                .filename(base.to_string_lossy())
                .format("%L %m")
                .level(Level::Info),
        )
        .unwrap();

    adapters.dispatch(&Event::new(Level::Debug, "dropped"));
    adapters.dispatch(&Event::new(Level::Info, "Hello World!"));
    adapters.close();

    let today = strtime::format("%Y%m%d", &Zoned::now()).unwrap();
    let expected = dir.path().join("nested").join(format!("access.{today}.log"));
    assert_eq!(fs::read_to_string(expected).unwrap(), "INFO Hello World!\n");
    assert!(!base.exists());
}

#[test]
fn test_datefile_without_extension() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("events");

    let sink = DateFileSink::builder(base.to_string_lossy())
        .date_pattern("%Y")
        .build()
        .unwrap();
    let adapter = Adapter::new(sink).with_layout(PatternLayout::new("%m"));
    adapter.append(&Event::new(Level::Info, "one")).unwrap();
    adapter.close().unwrap();
    adapter.append(&Event::new(Level::Info, "two")).unwrap();

    let year = strtime::format("%Y", &Zoned::now()).unwrap();
    let filename = adapter.with_sink(|sink| sink.filename().to_path_buf());
    assert_eq!(filename, dir.path().join(format!("events.{year}")));
    assert_eq!(fs::read_to_string(filename).unwrap(), "one\ntwo\n");
}

#[test]
fn test_datefile_keep_prunes_old_files() {
    let dir = tempfile::tempdir().unwrap();
    for date in ["20200101", "20200102", "20200103"] {
        fs::write(dir.path().join(format!("app.{date}.log")), "old\n").unwrap();
    }
    fs::write(dir.path().join("unrelated.txt"), "keep me\n").unwrap();

    let mut adapters = Adapters::new();
    adapters
        .add(
            "datefile",
            AdapterOptions::new()
                .filename(dir.path().join("app.log").to_string_lossy())
                .keep(NonZeroUsize::new(2).unwrap()),
        )
        .unwrap();
    adapters.dispatch(&Event::new(Level::Info, "new"));
    adapters.close();

    let mut names = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect::<Vec<_>>();
    names.sort();

    let today = strtime::format("%Y%m%d", &Zoned::now()).unwrap();
    assert_eq!(names.len(), 3, "{names:?}");
    assert!(names.contains(&format!("app.{today}.log")));
    assert!(names.contains(&"unrelated.txt".to_owned()));
}

#[test]
fn test_datefile_rejects_bad_options() {
    let mut adapters = Adapters::new();
    let err = adapters
        .add(
            "datefile",
            AdapterOptions::new().filename("app.log").date_pattern(""),
        )
        .unwrap_err();
    assert_eq!(err.message(), "empty date pattern");
    assert!(adapters.is_empty());
}
