use serde::{Deserialize, Serialize};

use crate::types::FileEntry;

/// A command sent by the client.
///
/// Consumed exactly once by the server; never persisted or retried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Request the server's file listing.
    ListFiles,
    /// Request a single file download.
    DownloadFile { filename: String },
    /// Request several files, sent sequentially in the given order.
    DownloadMultiple { filenames: Vec<String> },
    /// Announce a clean disconnect.
    Disconnect,
}

/// A response sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// The file listing.
    FileList { files: Vec<FileEntry> },
    /// Transfer metadata preceding a file's chunk stream.
    ///
    /// `chunk_size` here is the transfer's maximum chunk size; exactly
    /// `num_chunks` chunk messages follow.
    FileInfo {
        filename: String,
        file_size: u64,
        num_chunks: u64,
        chunk_size: u64,
    },
    /// Announces one chunk. The raw chunk bytes follow immediately as
    /// their own frame of exactly `chunk_size` bytes. `chunk_number` is
    /// 1-based.
    FileChunk {
        chunk_number: u64,
        total_chunks: u64,
        chunk_size: u64,
    },
    /// A recoverable application error (e.g. file not found).
    Error { message: String },
}
