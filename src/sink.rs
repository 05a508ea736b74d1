//! Output sink
//!
//! Where trace lines go: a file opened for the session, standard error as the
//! fallback, or an in-memory buffer for hosts that consume events in process.
//! Every line is flushed as soon as it is written so a crashing compiler
//! leaves a valid prefix of the trace behind.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};

/// Trace destination
#[derive(Debug)]
pub enum Sink {
    /// File opened by this sink; closed on [`Sink::close`]
    File {
        /// Path that was opened
        path: PathBuf,
        /// Line-buffered handle
        writer: LineWriter<File>,
    },
    /// Standard error (the fallback stream); never closed here
    Stderr,
    /// In-memory buffer
    Memory(Vec<u8>),
}

impl Sink {
    /// Resolves the destination: the given file if it can be opened for
    /// writing, standard error otherwise. Never fails.
    pub fn open(output: Option<&Path>) -> Self {
        match output {
            Some(path) => Self::try_file(path).unwrap_or_else(|err| {
                tracing::warn!("{}; falling back to stderr", err);
                Sink::stderr()
            }),
            None => Sink::stderr(),
        }
    }

    /// Opens (truncating) a file sink
    pub fn try_file(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| Error::SinkOpen {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "trace output opened");
        Ok(Sink::File {
            path: path.to_path_buf(),
            writer: LineWriter::new(file),
        })
    }

    /// Standard error sink
    pub fn stderr() -> Self {
        Sink::Stderr
    }

    /// Empty in-memory sink
    pub fn memory() -> Self {
        Sink::Memory(Vec::new())
    }

    /// Whether this sink owns an open file
    pub fn is_file(&self) -> bool {
        matches!(self, Sink::File { .. })
    }

    /// Path of the opened file, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Sink::File { path, .. } => Some(path.as_path()),
            Sink::Stderr | Sink::Memory(_) => None,
        }
    }

    /// Bytes written so far to an in-memory sink
    pub fn captured(&self) -> Option<&[u8]> {
        match self {
            Sink::Memory(buf) => Some(buf.as_slice()),
            Sink::File { .. } | Sink::Stderr => None,
        }
    }

    /// Writes `line` followed by a newline and flushes it
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        let mut record = Vec::with_capacity(line.len() + 1);
        record.extend_from_slice(line.as_bytes());
        record.push(b'\n');

        let written = match self {
            Sink::File { writer, .. } => writer.write_all(&record).and_then(|_| writer.flush()),
            Sink::Stderr => {
                let mut stderr = io::stderr().lock();
                stderr.write_all(&record).and_then(|_| stderr.flush())
            }
            Sink::Memory(buf) => {
                buf.extend_from_slice(&record);
                Ok(())
            }
        };
        written.map_err(|e| Error::write(&e))
    }

    /// Ends the session's use of the sink.
    ///
    /// Closes the file if this sink opened one; standard error stays open.
    /// Returns the buffer of an in-memory sink.
    pub fn close(self) -> Option<Vec<u8>> {
        match self {
            Sink::File { path, mut writer } => {
                if let Err(e) = writer.flush() {
                    tracing::warn!(path = %path.display(), "flushing trace output failed: {}", e);
                }
                tracing::debug!(path = %path.display(), "trace output closed");
                None
            }
            Sink::Stderr => {
                if let Err(e) = io::stderr().flush() {
                    tracing::warn!("flushing stderr failed: {}", e);
                }
                None
            }
            Sink::Memory(buf) => Some(buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_appends_lines() {
        let mut sink = Sink::memory();
        sink.write_line("{\"a\":1}").unwrap();
        sink.write_line("{\"a\":2}").unwrap();
        assert_eq!(sink.captured().unwrap(), b"{\"a\":1}\n{\"a\":2}\n");
        assert_eq!(sink.close().unwrap(), b"{\"a\":1}\n{\"a\":2}\n".to_vec());
    }

    #[test]
    fn test_file_sink_flushes_each_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.jsonl");
        let mut sink = Sink::open(Some(&path));
        assert!(sink.is_file());
        assert_eq!(sink.path(), Some(path.as_path()));

        sink.write_line("first").unwrap();
        // Visible before close
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\n");

        sink.write_line("second").unwrap();
        assert!(sink.close().is_none());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_open_failure_falls_back_to_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("trace.jsonl");
        let sink = Sink::open(Some(&path));
        assert!(matches!(sink, Sink::Stderr));
        assert!(matches!(
            Sink::try_file(&path),
            Err(Error::SinkOpen { .. })
        ));
    }

    #[test]
    fn test_no_path_uses_stderr() {
        let sink = Sink::open(None);
        assert!(!sink.is_file());
        assert!(sink.path().is_none());
        assert!(sink.close().is_none());
    }
}
