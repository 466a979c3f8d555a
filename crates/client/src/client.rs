use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use depot_protocol::constants::{DEFAULT_BUFFER_SIZE, MAX_FRAME_LEN};
use depot_protocol::{Command, FileEntry, Response};
use depot_transfer::{FileAssembler, TransferProgress, validate_entry_name};
use depot_wire::{WireError, read_frame, read_message, write_message};
use tokio::io::{AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::{debug, info, warn};

use crate::{BatchReport, ClientError, FileOutcome};

/// Timeout for the TCP connection attempt.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// How a single file's download ended, relative to the session.
///
/// Recoverable failures leave the frame stream intact (the failing
/// file's remaining chunk frames have been drained), so the batch can
/// continue. Fatal errors mean framing integrity is gone.
enum FileError {
    Recoverable(String),
    Fatal(ClientError),
}

impl From<WireError> for FileError {
    fn from(e: WireError) -> Self {
        FileError::Fatal(e.into())
    }
}

/// Connection to a depot server.
pub struct DepotClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl DepotClient {
    /// Connects with a 30 s timeout.
    pub async fn connect(addr: SocketAddr) -> Result<Self, ClientError> {
        let stream = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| ClientError::Timeout)??;
        info!(%addr, "connected to depot server");

        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::with_capacity(DEFAULT_BUFFER_SIZE, reader),
            writer: BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, writer),
        })
    }

    /// Requests the server's file listing.
    pub async fn list_files(&mut self) -> Result<Vec<FileEntry>, ClientError> {
        write_message(&mut self.writer, &Command::ListFiles).await?;
        match self.read_response().await? {
            Response::FileList { files } => Ok(files),
            Response::Error { message } => Err(ClientError::Server(message)),
            other => Err(unexpected(&other)),
        }
    }

    /// Downloads one file into `dest_dir`, reporting progress per chunk.
    ///
    /// A per-file failure (missing file, local disk error) is returned
    /// as a failed [`FileOutcome`]; `Err` means the connection itself
    /// is no longer usable.
    pub async fn download<F>(
        &mut self,
        filename: &str,
        dest_dir: &Path,
        mut on_progress: F,
    ) -> Result<FileOutcome, ClientError>
    where
        F: FnMut(&TransferProgress),
    {
        write_message(
            &mut self.writer,
            &Command::DownloadFile {
                filename: filename.to_string(),
            },
        )
        .await?;

        match self.receive_file(dest_dir, &mut on_progress).await {
            Ok(outcome) => Ok(outcome),
            Err(FileError::Recoverable(message)) => {
                warn!(filename, "download failed: {message}");
                Ok(FileOutcome::failed(filename, message))
            }
            Err(FileError::Fatal(e)) => Err(e),
        }
    }

    /// Downloads several files in order with one `download_multiple`
    /// command. One file's failure never aborts the rest of the batch.
    pub async fn download_all<F>(
        &mut self,
        filenames: &[String],
        dest_dir: &Path,
        mut on_progress: F,
    ) -> Result<BatchReport, ClientError>
    where
        F: FnMut(&str, &TransferProgress),
    {
        write_message(
            &mut self.writer,
            &Command::DownloadMultiple {
                filenames: filenames.to_vec(),
            },
        )
        .await?;

        let mut files = Vec::with_capacity(filenames.len());
        for filename in filenames {
            let outcome = match self
                .receive_file(dest_dir, &mut |p| on_progress(filename, p))
                .await
            {
                Ok(outcome) => outcome,
                Err(FileError::Recoverable(message)) => {
                    warn!(%filename, "download failed: {message}");
                    FileOutcome::failed(filename, message)
                }
                Err(FileError::Fatal(e)) => return Err(e),
            };
            files.push(outcome);
        }
        Ok(BatchReport { files })
    }

    /// Announces a clean disconnect and closes the connection.
    pub async fn disconnect(mut self) -> Result<(), ClientError> {
        write_message(&mut self.writer, &Command::Disconnect).await?;
        self.writer.shutdown().await?;
        debug!("disconnected");
        Ok(())
    }

    /// Consumes one file's `file_info` + chunk stream.
    async fn receive_file<F>(
        &mut self,
        dest_dir: &Path,
        on_progress: &mut F,
    ) -> Result<FileOutcome, FileError>
    where
        F: FnMut(&TransferProgress),
    {
        let (filename, file_size, num_chunks) =
            match self.read_response().await.map_err(FileError::Fatal)? {
                Response::FileInfo {
                    filename,
                    file_size,
                    num_chunks,
                    ..
                } => (filename, file_size, num_chunks),
                Response::Error { message } => return Err(FileError::Recoverable(message)),
                other => return Err(FileError::Fatal(unexpected(&other))),
            };
        debug!(
            %filename,
            size = file_size,
            chunks = num_chunks,
            "receiving file"
        );

        // The server announced this name; never create a local file
        // under an unvalidated one.
        if let Err(e) = validate_entry_name(&filename) {
            self.drain_chunks(num_chunks).await?;
            return Err(FileError::Recoverable(e.to_string()));
        }
        if let Err(e) = tokio::fs::create_dir_all(dest_dir).await {
            self.drain_chunks(num_chunks).await?;
            return Err(FileError::Recoverable(e.to_string()));
        }

        let path = dest_dir.join(&filename);
        let mut assembler = match FileAssembler::create(&path, file_size, num_chunks).await {
            Ok(a) => a,
            Err(e) => {
                self.drain_chunks(num_chunks).await?;
                return Err(FileError::Recoverable(e.to_string()));
            }
        };

        for expected in 1..=num_chunks {
            let (chunk_number, data) = self.read_chunk().await?;

            if chunk_number != expected {
                // Framing is intact, only the sequence is wrong: drop
                // this file and drain its remaining chunk frames.
                self.drain_chunks(num_chunks - expected).await?;
                return Err(FileError::Recoverable(format!(
                    "out-of-order chunk: expected {expected}, got {chunk_number}"
                )));
            }

            if let Err(e) = assembler.accept(chunk_number, &data).await {
                self.drain_chunks(num_chunks - expected).await?;
                return Err(FileError::Recoverable(e.to_string()));
            }

            on_progress(&TransferProgress {
                chunk_number,
                total_chunks: num_chunks,
                bytes_received: assembler.bytes_written(),
                file_size,
            });
        }

        assembler
            .finish()
            .await
            .map_err(|e| FileError::Recoverable(e.to_string()))?;
        debug!(%filename, size = file_size, "file downloaded");
        Ok(FileOutcome::succeeded(filename, file_size))
    }

    /// Reads one `file_chunk` header and its raw-bytes frame.
    ///
    /// A header/frame length mismatch means the stream can no longer be
    /// paired up reliably and is fatal.
    async fn read_chunk(&mut self) -> Result<(u64, Vec<u8>), FileError> {
        let (chunk_number, chunk_size) = match self.read_response().await.map_err(FileError::Fatal)?
        {
            Response::FileChunk {
                chunk_number,
                chunk_size,
                ..
            } => (chunk_number, chunk_size),
            other => return Err(FileError::Fatal(unexpected(&other))),
        };

        let data = match read_frame(&mut self.reader, MAX_FRAME_LEN).await? {
            Some(d) => d,
            None => return Err(WireError::ConnectionClosed.into()),
        };
        if data.len() as u64 != chunk_size {
            return Err(WireError::Malformed(format!(
                "chunk frame length {} does not match announced size {chunk_size}",
                data.len()
            ))
            .into());
        }
        Ok((chunk_number, data))
    }

    /// Discards `remaining` announced chunk messages after a per-file
    /// failure so the next file's frames line up.
    async fn drain_chunks(&mut self, remaining: u64) -> Result<(), FileError> {
        for _ in 0..remaining {
            let _ = self.read_chunk().await?;
        }
        Ok(())
    }

    async fn read_response(&mut self) -> Result<Response, ClientError> {
        match read_message(&mut self.reader, MAX_FRAME_LEN).await? {
            Some(response) => Ok(response),
            None => Err(WireError::ConnectionClosed.into()),
        }
    }
}

fn unexpected(response: &Response) -> ClientError {
    ClientError::UnexpectedResponse(format!("{response:?}"))
}
