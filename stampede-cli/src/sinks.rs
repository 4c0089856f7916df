//! File sinks for the raw result stream

use serde::Serialize;
use stampede_core::{GroupInfo, LoadTestError, ResultSink, UserResult};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct Line<'a> {
    group: &'a GroupInfo,
    #[serde(flatten)]
    result: &'a UserResult,
}

/// One JSON object per user, appended after each group
pub struct JsonLinesSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonLinesSink {
    pub fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    fn sink_error(&self, e: impl std::fmt::Display) -> LoadTestError {
        LoadTestError::Sink(format!("{}: {}", self.path.display(), e))
    }
}

impl ResultSink for JsonLinesSink {
    fn record(&mut self, group: &GroupInfo, results: &[UserResult]) -> Result<(), LoadTestError> {
        for result in results {
            let line = serde_json::to_string(&Line { group, result }).map_err(|e| self.sink_error(e))?;
            writeln!(self.writer, "{}", line).map_err(|e| self.sink_error(e))?;
        }
        // Flush per group so a crash loses at most the group in flight
        self.writer.flush().map_err(|e| self.sink_error(e))
    }

    fn finish(&mut self) -> Result<(), LoadTestError> {
        self.writer.flush().map_err(|e| self.sink_error(e))
    }
}
