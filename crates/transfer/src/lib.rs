//! Chunked file transfer: splitting, ordered reassembly, and progress.
//!
//! The sender splits a file's byte length into a deterministic sequence
//! of bounded-size chunks ([`ChunkPlan`]); the receiver appends them in
//! strictly increasing 1-based order ([`FileAssembler`]). Bounding the
//! chunk size bounds peak memory use independent of file size and gives
//! natural progress-reporting granularity.

mod assemble;
mod plan;
mod progress;
mod validation;

pub use assemble::FileAssembler;
pub use plan::ChunkPlan;
pub use progress::TransferProgress;
pub use validation::validate_entry_name;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("out-of-order chunk: expected {expected}, got {got}")]
    OutOfOrderChunk { expected: u64, got: u64 },

    #[error("chunk overruns declared file size: {written} + {len} > {file_size}")]
    Overrun {
        written: u64,
        len: u64,
        file_size: u64,
    },

    #[error("incomplete transfer: {received} of {expected} chunks, {written} of {file_size} bytes")]
    Incomplete {
        received: u64,
        expected: u64,
        written: u64,
        file_size: u64,
    },

    #[error("invalid file name: {0}")]
    InvalidName(String),
}
