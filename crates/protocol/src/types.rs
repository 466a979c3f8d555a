use serde::{Deserialize, Serialize};

/// One entry in a server file listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    /// File name (single path component, no directories).
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Size in MiB, rounded to two decimals.
    pub size_mb: f64,
}

impl FileEntry {
    /// Builds an entry, deriving `size_mb` from `size`.
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        let size_mb = (size as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0;
        Self {
            name: name.into(),
            size,
            size_mb,
        }
    }
}
