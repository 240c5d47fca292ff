use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Destination for the finished export buffer. The buffer is handed over
/// exactly once, after the run reaches its terminal state; a write failure
/// fails the whole run.
pub trait ExportSink: Send {
    fn write(&mut self, content: &str) -> Result<(), SinkError>;
}

/// Atomically write `content` to `path` by writing a temp file next to it
/// and renaming. Missing parent directories are created.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), SinkError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|err| SinkError::OutputDir(err.to_string()))?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;

    // Replace an existing file so the rename succeeds on every platform.
    if path.exists() {
        fs::remove_file(path)?;
    }
    tmp.persist(path).map_err(|err| SinkError::Io(err.error))?;
    Ok(())
}

/// File-backed sink.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ExportSink for FileSink {
    fn write(&mut self, content: &str) -> Result<(), SinkError> {
        write_atomic(&self.path, content)
    }
}

/// Sink backed by a shared in-memory buffer, for clipboard-style delivery
/// and tests. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the shared buffer, readable once the run has finished.
    pub fn buffer(&self) -> Arc<Mutex<String>> {
        self.buffer.clone()
    }

    pub fn contents(&self) -> String {
        match self.buffer.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ExportSink for MemorySink {
    fn write(&mut self, content: &str) -> Result<(), SinkError> {
        let mut guard = match self.buffer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clear();
        guard.push_str(content);
        Ok(())
    }
}
