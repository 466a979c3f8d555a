use std::ops::Range;

use depot_protocol::constants::DEFAULT_CHUNK_SIZE;

/// Deterministic chunking of a file's byte length.
///
/// Chunk index `i` in `[0, num_chunks)` covers the half-open byte range
/// `[i * chunk_size, min(file_size, (i + 1) * chunk_size))`: every
/// non-final chunk is full-size and the final chunk holds the remainder.
/// A zero-length file is exactly one chunk of zero length, so empty
/// files are representable on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    file_size: u64,
    chunk_size: u64,
    num_chunks: u64,
}

impl ChunkPlan {
    /// Builds a plan for `file_size` bytes in chunks of at most
    /// `chunk_size` bytes.
    ///
    /// If `chunk_size` is 0, [`DEFAULT_CHUNK_SIZE`] (1 MiB) is used.
    pub fn new(file_size: u64, chunk_size: u64) -> Self {
        let chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        let num_chunks = if file_size == 0 {
            1
        } else {
            file_size.div_ceil(chunk_size)
        };
        Self {
            file_size,
            chunk_size,
            num_chunks,
        }
    }

    /// Total number of chunks (always at least 1).
    pub fn num_chunks(&self) -> u64 {
        self.num_chunks
    }

    /// Maximum bytes per chunk.
    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Total file size in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Byte range of chunk `index` (0-based), or `None` past the end.
    pub fn range(&self, index: u64) -> Option<Range<u64>> {
        if index >= self.num_chunks {
            return None;
        }
        let start = index * self.chunk_size;
        let end = self.file_size.min(start + self.chunk_size);
        Some(start..end)
    }

    /// Byte length of chunk `index` (0-based).
    pub fn len_of(&self, index: u64) -> u64 {
        self.range(index).map(|r| r.end - r.start).unwrap_or(0)
    }

    /// Iterates the chunk byte ranges in order.
    pub fn ranges(&self) -> impl Iterator<Item = Range<u64>> + '_ {
        (0..self.num_chunks).filter_map(|i| self.range(i))
    }
}
