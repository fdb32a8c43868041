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

use std::sync::Arc;
use std::sync::Mutex;

use logweave::AdapterOptions;
use logweave::Adapters;
use logweave::Append;
use logweave::Error;
use logweave::ErrorKind;
use logweave::Event;
use logweave::Level;
use logweave::Trap;
use logweave::append::Adapter;
use logweave::append::Testing;
use logweave::layout::PatternLayout;

#[derive(Debug, Clone, Default)]
struct CollectingTrap {
    errors: Arc<Mutex<Vec<String>>>,
}

impl CollectingTrap {
    fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Trap for CollectingTrap {
    fn trap(&self, err: &Error) {
        self.errors.lock().unwrap().push(err.to_string());
    }
}

#[derive(Debug)]
struct FailingAppend;

impl Append for FailingAppend {
    fn append(&self, _: &Event) -> Result<(), Error> {
        Err(Error::sink("disk on fire"))
    }

    fn flush(&self) -> Result<(), Error> {
        Err(Error::sink("cannot flush"))
    }
}

#[derive(Debug)]
struct PanickingAppend;

impl Append for PanickingAppend {
    fn append(&self, _: &Event) -> Result<(), Error> {
        panic!("adapter exploded");
    }
}

fn testing_adapter(pattern: &str) -> (Testing, Adapter<Testing>) {
    let sink = Testing::new();
    let adapter = Adapter::new(sink.clone()).with_layout(PatternLayout::new(pattern));
    (sink, adapter)
}

#[test]
fn test_failing_adapter_does_not_stop_dispatch() {
    let trap = CollectingTrap::default();
    let (first, first_adapter) = testing_adapter("first %m");
    let (last, last_adapter) = testing_adapter("last %m");

    let mut adapters = Adapters::new().with_trap(trap.clone());
    adapters.push(first_adapter);
    adapters.push(FailingAppend);
    adapters.push(PanickingAppend);
    adapters.push(last_adapter);

    adapters.dispatch(&Event::new(Level::Info, "Hello World!"));
    adapters.dispatch(&Event::new(Level::Info, "again"));

    assert_eq!(first.lines(), ["first Hello World!", "first again"]);
    assert_eq!(last.lines(), ["last Hello World!", "last again"]);

    let errors = trap.errors();
    assert_eq!(errors.len(), 4);
    assert!(errors[0].contains("disk on fire"), "{errors:?}");
    assert!(errors[1].contains("adapter exploded"), "{errors:?}");
}

#[test]
fn test_flush_errors_are_trapped() {
    let trap = CollectingTrap::default();
    let mut adapters = Adapters::new().with_trap(trap.clone());
    adapters.push(FailingAppend);
    adapters.flush();
    adapters.close();

    let errors = trap.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("cannot flush"));
}

#[test]
fn test_dispatch_order_is_insertion_order() {
    let shared = Testing::new();
    let mut adapters = Adapters::new();
    for name in ["a", "b", "c"] {
        adapters.push(
            Adapter::new(shared.clone()).with_layout(PatternLayout::new(format!("{name} %m"))),
        );
    }

    adapters.dispatch(&Event::new(Level::Info, "x"));
    assert_eq!(shared.lines(), ["a x", "b x", "c x"]);
}

#[test]
fn test_per_adapter_level_filters() {
    let (all, all_adapter) = testing_adapter("%L %m");
    let (errors, errors_adapter) = testing_adapter("%L %m");

    let mut adapters = Adapters::new();
    adapters.push(all_adapter);
    adapters.push(errors_adapter.with_filter(Level::Error));

    for level in [Level::Debug, Level::Warn, Level::Error, Level::Unknown] {
        adapters.dispatch(&Event::new(level, "m"));
    }

    assert_eq!(all.lines(), ["DEBUG m", "WARN m", "ERROR m", "UNKNOWN m"]);
    assert_eq!(errors.lines(), ["ERROR m", "UNKNOWN m"]);
}

#[test]
fn test_add_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    let options = AdapterOptions::new()
        .filename(path.to_string_lossy())
        .format("%l %m");

    let mut adapters = Adapters::new();
    adapters.add("file", options.clone()).unwrap();
    adapters.add("FILE", options).unwrap();
    assert_eq!(adapters.len(), 2);

    adapters.dispatch(&Event::new(Level::Warn, "twice"));
    adapters.close();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "W twice\nW twice\n");
}

#[test]
fn test_add_with_positional_filename() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("development.log");

    let mut adapters = Adapters::new();
    adapters.add("file", path.to_str().unwrap()).unwrap();
    adapters.dispatch(&Event::new(Level::Info, "positional"));
    adapters.close();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.ends_with(" : positional\n"), "{contents:?}");
}

#[test]
fn test_add_unknown_kind() {
    let mut adapters = Adapters::new();
    let err = adapters
        .add("carrier-pigeon", AdapterOptions::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(err.context("kind"), Some("carrier-pigeon"));
    assert!(adapters.is_empty());

    let err = adapters
        .add("datefile", AdapterOptions::new().date_pattern(""))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(adapters.is_empty());
}

#[test]
fn test_concurrent_dispatch() {
    let (sink, adapter) = testing_adapter("%m");
    let mut adapters = Adapters::new();
    adapters.push(adapter);
    let adapters = Arc::new(adapters);

    let handles = (0..8)
        .map(|i| {
            let adapters = adapters.clone();
            std::thread::spawn(move || {
                for j in 0..100 {
                    adapters.dispatch(&Event::new(Level::Info, format!("{i}-{j}")));
                }
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().unwrap();
    }

    let lines = sink.lines();
    assert_eq!(lines.len(), 800);
    assert!(lines.iter().all(|line| line.split('-').count() == 2));
}
