/// Result of downloading one file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    /// The requested (or server-announced) file name.
    pub name: String,
    /// Bytes written on success.
    pub bytes: u64,
    /// Failure message, if the file did not complete.
    pub error: Option<String>,
}

impl FileOutcome {
    pub(crate) fn succeeded(name: impl Into<String>, bytes: u64) -> Self {
        Self {
            name: name.into(),
            bytes,
            error: None,
        }
    }

    pub(crate) fn failed(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bytes: 0,
            error: Some(error.into()),
        }
    }

    /// Whether this file completed.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-file outcomes of one batch download, in request order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    /// True only if every file in the batch succeeded.
    pub fn all_ok(&self) -> bool {
        self.files.iter().all(FileOutcome::is_ok)
    }
}
