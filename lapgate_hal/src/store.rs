//! File-backed single-byte config store.
//!
//! Holds the target lap count across restarts, one raw byte on disk. A
//! missing file reads as 0, the factory default. Range checking is left to
//! the caller.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use lapgate_common::hal::{ConfigStore, HalError};

/// Persists one byte at `path`.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FileConfigStore {
    fn get(&mut self) -> Result<u8, HalError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Store {:?} does not exist, using factory default", self.path);
                return Ok(0);
            }
            Err(e) => {
                return Err(HalError::PersistenceError(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        bytes.first().copied().ok_or_else(|| {
            HalError::PersistenceError(format!("Store file {} is empty", self.path.display()))
        })
    }

    fn set(&mut self, value: u8) -> Result<(), HalError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                HalError::PersistenceError(format!("Failed to create directory: {e}"))
            })?;
        }

        fs::write(&self.path, [value]).map_err(|e| {
            HalError::PersistenceError(format!("Failed to write {}: {e}", self.path.display()))
        })?;

        info!("Stored target lap count {value} to {:?}", self.path);
        Ok(())
    }
}
