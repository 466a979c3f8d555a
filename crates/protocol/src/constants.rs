/// Default server port.
pub const DEFAULT_PORT: u16 = 8888;

/// Default maximum bytes per file chunk (1 MiB).
pub const DEFAULT_CHUNK_SIZE: u64 = 1024 * 1024;

/// Default capacity for buffered stream reads/writes.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Maximum accepted frame payload length (8 MiB).
///
/// A declared length above this is treated as a malformed or hostile
/// prefix and terminates the session. Chunk sizes are validated against
/// this cap at server startup, so well-formed peers never hit it.
pub const MAX_FRAME_LEN: usize = 8 * 1024 * 1024;
