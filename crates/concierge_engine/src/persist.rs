use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output path has no file name: {0}")]
    NoFileName(PathBuf),
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the parent directory of an output file exists; create if missing.
pub fn ensure_parent_dir(target: &Path) -> Result<PathBuf, PersistError> {
    if target.file_name().is_none() {
        return Err(PersistError::NoFileName(target.to_path_buf()));
    }
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if dir.exists() {
        let meta = fs::metadata(&dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir(format!("{} is not a directory", dir.display())));
        }
    } else {
        fs::create_dir_all(&dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    Ok(dir)
}

/// Replaces one file's content atomically: readers see either the old page
/// or the new one, never a half-written file.
pub struct AtomicFileWriter {
    target: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn write(&self, content: &str) -> Result<(), PersistError> {
        let dir = ensure_parent_dir(&self.target)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.target)
            .map_err(|e| PersistError::Io(e.error))?;
        Ok(())
    }
}
