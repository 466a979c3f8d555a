//! The served file directory.

use std::path::{Path, PathBuf};

use depot_protocol::FileEntry;
use depot_transfer::{TransferError, validate_entry_name};
use tokio::fs::File;

/// Errors from the file store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("file '{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    InvalidName(#[from] TransferError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read-only view of a flat directory of files.
///
/// Shared across sessions behind an `Arc`; files are treated as
/// immutable snapshots for the duration of one transfer.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens the store, creating the root directory if missing.
    pub async fn open(root: &Path) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(root).await?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// The served directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists regular files in the root, sorted by name.
    ///
    /// Non-recursive; subdirectories and non-UTF-8 names are skipped
    /// (the latter are not addressable over the wire).
    pub async fn list(&self) -> std::io::Result<Vec<FileEntry>> {
        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = dir.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            entries.push(FileEntry::new(name, metadata.len()));
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Opens a file for reading, returning the handle and its size.
    pub async fn open_file(&self, name: &str) -> Result<(File, u64), StorageError> {
        validate_entry_name(name)?;

        let path = self.root.join(name);
        let file = match File::open(&path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(StorageError::NotFound(name.to_string()));
        }
        Ok((file, metadata.len()))
    }
}
