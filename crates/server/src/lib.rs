//! depot server: file store, per-connection sessions, accept loop.
//!
//! [`DepotServer`] accepts TCP connections and spawns one session task
//! per client; each session runs a command loop over the shared
//! read-only [`FileStore`]. A session's failure tears down that session
//! only, never the accept loop or other sessions.

pub mod samples;
mod server;
mod session;
mod storage;

pub use server::{DepotServer, ServerConfig};
pub use storage::{FileStore, StorageError};

use depot_wire::WireError;

/// Errors produced by the server crate.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error("chunk size {chunk_size} exceeds frame cap {max}")]
    ChunkSizeTooLarge { chunk_size: u64, max: usize },
}
