//! Side-effect sinks.
//!
//! The core emits all of its output through these two capability
//! contracts: a line-oriented console sink (`write` / `info` dumps and
//! non-fatal diagnostics) and a named-file persistence sink (`save`).
//! Hosts plug in real I/O; tests capture output in memory.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

/// File extension appended to an array name by `save`.
pub const SAVE_EXTENSION: &str = "txt";

/// Line-oriented text sink for console dumps and diagnostics.
pub trait ConsoleSink {
    fn line(&mut self, text: &str);
}

/// Named-file text sink for persistence. `name` is the array name
/// without extension; the sink decides where the bytes land.
pub trait PersistSink {
    fn persist(&mut self, name: &str, contents: &str) -> io::Result<()>;
}

/// Console sink backed by stdout.
#[derive(Debug, Default)]
pub struct StdoutConsole;

impl ConsoleSink for StdoutConsole {
    fn line(&mut self, text: &str) {
        println!("{text}");
    }
}

/// Persistence sink writing `<name>.txt` files under a base directory.
#[derive(Debug)]
pub struct DirStore {
    base: PathBuf,
}

impl DirStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl PersistSink for DirStore {
    fn persist(&mut self, name: &str, contents: &str) -> io::Result<()> {
        let path = self.base.join(format!("{name}.{SAVE_EXTENSION}"));
        fs::write(path, contents)
    }
}

/// In-memory console sink for tests and embedding hosts.
#[derive(Debug, Default)]
pub struct MemoryConsole {
    pub lines: Vec<String>,
}

impl ConsoleSink for MemoryConsole {
    fn line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }
}

/// In-memory persistence sink for tests and embedding hosts.
///
/// `fail_next` makes the next persist call report an I/O failure, for
/// exercising the non-fatal save path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub files: BTreeMap<String, String>,
    pub fail_next: bool,
}

impl PersistSink for MemoryStore {
    fn persist(&mut self, name: &str, contents: &str) -> io::Result<()> {
        if self.fail_next {
            self.fail_next = false;
            return Err(io::Error::new(io::ErrorKind::Other, "simulated failure"));
        }
        self.files
            .insert(format!("{name}.{SAVE_EXTENSION}"), contents.to_string());
        Ok(())
    }
}
