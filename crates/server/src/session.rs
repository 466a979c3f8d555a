//! Per-connection command loop.
//!
//! A session reads framed, JSON-decoded commands and dispatches them
//! until the client disconnects, the stream closes, or a protocol error
//! ends the session. Application errors (missing file, bad name) are
//! answered with an `error` response and the loop continues; framing
//! and codec errors are fatal to the session.

use std::net::SocketAddr;
use std::sync::Arc;

use depot_protocol::constants::MAX_FRAME_LEN;
use depot_protocol::{Command, Response};
use depot_transfer::ChunkPlan;
use depot_wire::{read_message, write_frame, write_message};
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{FileStore, ServerError};

/// Runs one session to completion.
///
/// Cancellation is observed between commands; an in-flight file send
/// completes before the session drains.
pub(crate) async fn run(
    stream: TcpStream,
    peer: SocketAddr,
    store: Arc<FileStore>,
    chunk_size: u64,
    buffer_size: usize,
    cancel: CancellationToken,
) -> Result<(), ServerError> {
    let (reader, writer) = stream.into_split();
    let mut reader = BufReader::with_capacity(buffer_size, reader);
    let mut writer = BufWriter::with_capacity(buffer_size, writer);

    loop {
        let command = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(%peer, "session cancelled at command boundary");
                break;
            }
            result = read_message::<_, Command>(&mut reader, MAX_FRAME_LEN) => result?,
        };

        let Some(command) = command else {
            debug!(%peer, "client closed connection");
            break;
        };

        match command {
            Command::ListFiles => {
                let response = match store.list().await {
                    Ok(files) => {
                        debug!(%peer, count = files.len(), "file list sent");
                        Response::FileList { files }
                    }
                    Err(e) => Response::Error {
                        message: format!("error listing files: {e}"),
                    },
                };
                write_message(&mut writer, &response).await?;
            }

            Command::DownloadFile { filename } => {
                send_file(&mut writer, &store, &filename, chunk_size).await?;
            }

            Command::DownloadMultiple { filenames } => {
                // Sequential, in the given order; a missing file gets an
                // error response and the batch continues.
                for filename in &filenames {
                    send_file(&mut writer, &store, filename, chunk_size).await?;
                }
                debug!(%peer, count = filenames.len(), "batch transfer finished");
            }

            Command::Disconnect => {
                debug!(%peer, "client requested disconnect");
                break;
            }
        }
    }

    Ok(())
}

/// Sends one file as `file_info` followed by its chunk stream.
///
/// An open failure is answered with an `error` response and is not
/// fatal. A read failure after `file_info` is fatal: the chunk-count
/// promise can no longer be kept in-band.
async fn send_file<W: AsyncWrite + Unpin>(
    writer: &mut W,
    store: &FileStore,
    filename: &str,
    chunk_size: u64,
) -> Result<(), ServerError> {
    let (mut file, file_size) = match store.open_file(filename).await {
        Ok(opened) => opened,
        Err(e) => {
            warn!(filename, "download refused: {e}");
            let response = Response::Error {
                message: e.to_string(),
            };
            write_message(writer, &response).await?;
            return Ok(());
        }
    };

    let plan = ChunkPlan::new(file_size, chunk_size);
    let info = Response::FileInfo {
        filename: filename.to_string(),
        file_size,
        num_chunks: plan.num_chunks(),
        chunk_size: plan.chunk_size(),
    };
    write_message(writer, &info).await?;

    let mut buf = vec![0u8; plan.chunk_size() as usize];
    for index in 0..plan.num_chunks() {
        let len = plan.len_of(index) as usize;
        file.read_exact(&mut buf[..len]).await?;

        let header = Response::FileChunk {
            chunk_number: index + 1,
            total_chunks: plan.num_chunks(),
            chunk_size: len as u64,
        };
        write_message(writer, &header).await?;
        write_frame(writer, &buf[..len]).await?;
        // Awaited flush per chunk: a slow reader throttles the sender.
        writer.flush().await?;
    }

    debug!(
        filename,
        size = file_size,
        chunks = plan.num_chunks(),
        "file sent"
    );
    Ok(())
}
