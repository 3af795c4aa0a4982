use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("destination has no file name: {0}")]
    InvalidDestination(String),
    #[error("destination directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Atomically writes a file by filling a temp file next to the destination
/// and renaming it into place. A failed write leaves no partial file.
pub struct AtomicFileWriter {
    destination: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    pub fn write(&self, content: &[u8]) -> Result<PathBuf, PersistError> {
        if self.destination.file_name().is_none() {
            return Err(PersistError::InvalidDestination(
                self.destination.display().to_string(),
            ));
        }
        let dir = parent_dir(&self.destination);
        if !dir.is_dir() {
            return Err(PersistError::OutputDir(dir.display().to_string()));
        }

        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|e| PersistError::OutputDir(format!("{}: {e}", dir.display())))?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // persist replaces an existing file atomically.
        tmp.persist(&self.destination)
            .map_err(|e| PersistError::Io(e.error))?;
        Ok(self.destination.clone())
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
