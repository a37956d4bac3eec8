//! JSON-lines sink
//!
//! Appends one JSON object per record; existing content is never rewritten.

use crate::sink::{ReviewRecord, ReviewSink};
use crate::SinkResult;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Append-only JSON-lines file sink
#[derive(Debug)]
pub struct JsonLinesSink {
    file: File,
}

impl JsonLinesSink {
    /// Opens (or creates) the file in append mode
    pub fn new(path: &Path) -> SinkResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }
}

impl ReviewSink for JsonLinesSink {
    fn persist(&mut self, record: &ReviewRecord) -> SinkResult<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        self.file.write_all(&line)?;
        self.file.flush()?;
        Ok(())
    }
}
