//! Where exported bytes end up.
//!
//! [`Storage`] is the persistence seam: the export pipeline hands it encoded
//! bytes and a suggested name and gets back a [`StorageHandle`]. The shipped
//! implementation, [`DirectoryStorage`], writes into one directory and never
//! replaces a file that is already there.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Refusing to overwrite existing file: {}", .0.display())]
    AlreadyExists(PathBuf),
    #[error("Invalid file name: {0:?}")]
    InvalidName(String),
}

/// Location of a persisted export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageHandle(pub PathBuf);

impl StorageHandle {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for StorageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Persistence collaborator for encoded images.
///
/// `Sync` for the same reason as the backend: batch export shares it.
pub trait Storage: Sync {
    fn persist(&self, bytes: &[u8], suggested_name: &str) -> Result<StorageHandle, PersistError>;
}

/// Writes each export as a new file under `root`.
#[derive(Debug, Clone)]
pub struct DirectoryStorage {
    root: PathBuf,
}

impl DirectoryStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Storage for DirectoryStorage {
    fn persist(&self, bytes: &[u8], suggested_name: &str) -> Result<StorageHandle, PersistError> {
        let file_name = Path::new(suggested_name);
        if suggested_name.is_empty() || file_name.file_name() != Some(file_name.as_os_str()) {
            return Err(PersistError::InvalidName(suggested_name.to_string()));
        }
        std::fs::create_dir_all(&self.root)?;
        let path = self.root.join(file_name);
        let mut file = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(PersistError::AlreadyExists(path));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(bytes)?;
        file.sync_all()?;
        debug!(path = %path.display(), bytes = bytes.len(), "persisted export");
        Ok(StorageHandle(path))
    }
}
