use std::path::{Component, Path};

use crate::TransferError;

/// Validates a file entry name before it touches the filesystem.
///
/// The protocol serves a flat directory, so a name must be exactly one
/// normal path component. Rejects:
/// - empty names
/// - path separators (`/`, `\`)
/// - parent traversal (`..`) and `.`
/// - absolute paths and Windows prefixes (`C:`, `\\server`)
///
/// Used on both sides: the server before opening a requested file, the
/// client before creating a file under a server-announced name.
pub fn validate_entry_name(name: &str) -> Result<(), TransferError> {
    if name.is_empty() {
        return Err(TransferError::InvalidName("empty name".into()));
    }

    // Backslash parses as a Normal component on Unix; reject it outright
    // so names behave the same on every platform.
    if name.contains('\\') {
        return Err(TransferError::InvalidName(format!(
            "path separator not allowed: {name}"
        )));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(TransferError::InvalidName(format!(
            "not a plain file name: {name}"
        ))),
    }
}
