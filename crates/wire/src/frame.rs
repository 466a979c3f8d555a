use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::WireError;

/// Writes one frame: a 4-byte big-endian length prefix, then the payload.
///
/// Does not flush; callers flush at logical message boundaries. The
/// write is atomic from the caller's perspective as long as no other
/// writer shares the stream.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    payload: &[u8],
) -> Result<(), WireError> {
    let len = payload.len();
    if len > u32::MAX as usize {
        return Err(WireError::FrameTooLarge {
            len,
            max: u32::MAX as usize,
        });
    }

    writer.write_u32(len as u32).await?;
    writer.write_all(payload).await?;
    Ok(())
}

/// Reads one frame and returns its payload.
///
/// Returns `None` when the peer closed the stream cleanly at a frame
/// boundary (EOF before any prefix byte). A stream that ends mid-prefix
/// or mid-payload is [`WireError::ConnectionClosed`]; a declared length
/// above `max_len` is [`WireError::FrameTooLarge`].
pub async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
    max_len: usize,
) -> Result<Option<Vec<u8>>, WireError> {
    let mut prefix = [0u8; 4];
    let n = reader.read(&mut prefix).await?;
    if n == 0 {
        return Ok(None);
    }
    if n < prefix.len() {
        reader
            .read_exact(&mut prefix[n..])
            .await
            .map_err(eof_to_closed)?;
    }

    let len = u32::from_be_bytes(prefix) as usize;
    if len > max_len {
        return Err(WireError::FrameTooLarge { len, max: max_len });
    }

    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(eof_to_closed)?;
    Ok(Some(payload))
}

/// Encodes a control message and writes it as one frame, then flushes.
pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let payload =
        depot_protocol::encode(message).map_err(|e| WireError::Malformed(e.to_string()))?;
    write_frame(writer, &payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one frame and decodes it as a control message.
///
/// Returns `None` on clean EOF at a frame boundary. A decode failure is
/// [`WireError::Malformed`] and must end the session.
pub async fn read_message<R, T>(reader: &mut R, max_len: usize) -> Result<Option<T>, WireError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let payload = match read_frame(reader, max_len).await? {
        Some(p) => p,
        None => return Ok(None),
    };
    let message =
        depot_protocol::decode(&payload).map_err(|e| WireError::Malformed(e.to_string()))?;
    Ok(Some(message))
}

fn eof_to_closed(e: std::io::Error) -> WireError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        WireError::ConnectionClosed
    } else {
        WireError::Io(e)
    }
}
