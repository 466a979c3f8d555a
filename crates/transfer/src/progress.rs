/// Snapshot of a file download after one chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferProgress {
    /// 1-based number of the chunk just received.
    pub chunk_number: u64,
    /// Total chunks in this transfer.
    pub total_chunks: u64,
    /// Bytes received so far.
    pub bytes_received: u64,
    /// Declared total file size.
    pub file_size: u64,
}

impl TransferProgress {
    /// Completion percentage in `(0, 100]`.
    ///
    /// Byte-based, so the final chunk reports exactly 100.0. A
    /// zero-length file reports 100.0 on its single empty chunk.
    pub fn percent(&self) -> f64 {
        if self.file_size == 0 {
            return 100.0;
        }
        self.bytes_received as f64 / self.file_size as f64 * 100.0
    }
}
