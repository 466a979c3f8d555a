use std::path::Path;

use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::TransferError;

/// Reassembles a file from its chunk stream.
///
/// Chunks must arrive in strictly increasing, contiguous 1-based order;
/// a gap, repeat, or overrun aborts the transfer. [`finish`] verifies
/// every chunk arrived and the byte count matches the declared size, so
/// a connection that drops mid-transfer can never leave a partial file
/// that looks complete.
///
/// [`finish`]: FileAssembler::finish
pub struct FileAssembler {
    file: File,
    file_size: u64,
    total_chunks: u64,
    next_chunk: u64,
    written: u64,
}

impl FileAssembler {
    /// Creates (or truncates) the destination file.
    pub async fn create(
        path: &Path,
        file_size: u64,
        total_chunks: u64,
    ) -> Result<Self, TransferError> {
        let file = File::create(path).await?;
        Ok(Self {
            file,
            file_size,
            total_chunks,
            next_chunk: 1,
            written: 0,
        })
    }

    /// Appends one chunk. `chunk_number` is 1-based and must be the
    /// next expected value.
    pub async fn accept(&mut self, chunk_number: u64, data: &[u8]) -> Result<(), TransferError> {
        if chunk_number != self.next_chunk || chunk_number > self.total_chunks {
            return Err(TransferError::OutOfOrderChunk {
                expected: self.next_chunk,
                got: chunk_number,
            });
        }

        let len = data.len() as u64;
        if self.written + len > self.file_size {
            return Err(TransferError::Overrun {
                written: self.written,
                len,
                file_size: self.file_size,
            });
        }

        self.file.write_all(data).await?;
        self.written += len;
        self.next_chunk += 1;
        Ok(())
    }

    /// Bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Verifies completeness and flushes the file to disk.
    pub async fn finish(mut self) -> Result<(), TransferError> {
        let received = self.next_chunk - 1;
        if received != self.total_chunks || self.written != self.file_size {
            return Err(TransferError::Incomplete {
                received,
                expected: self.total_chunks,
                written: self.written,
                file_size: self.file_size,
            });
        }
        self.file.flush().await?;
        Ok(())
    }
}
