//! Listener and accept loop.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use depot_protocol::constants::{
    DEFAULT_BUFFER_SIZE, DEFAULT_CHUNK_SIZE, DEFAULT_PORT, MAX_FRAME_LEN,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{FileStore, ServerError, session};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: IpAddr,
    /// Port to listen on (0 = OS-assigned).
    pub port: u16,
    /// Directory of served files (created if missing).
    pub root: PathBuf,
    /// Maximum bytes per chunk.
    pub chunk_size: u64,
    /// Buffered reader/writer capacity per session.
    pub buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            root: PathBuf::from("server_files"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// The depot file server.
///
/// One spawned task per accepted connection; sessions share the file
/// store read-only and fail independently.
pub struct DepotServer {
    listener: TcpListener,
    store: Arc<FileStore>,
    chunk_size: u64,
    buffer_size: usize,
    cancel: CancellationToken,
}

impl DepotServer {
    /// Validates the config, opens the store, and binds the listener.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        if config.chunk_size as usize > MAX_FRAME_LEN {
            return Err(ServerError::ChunkSizeTooLarge {
                chunk_size: config.chunk_size,
                max: MAX_FRAME_LEN,
            });
        }

        let store = Arc::new(FileStore::open(&config.root).await?);
        let listener = TcpListener::bind((config.bind, config.port)).await?;
        let addr = listener.local_addr()?;
        info!(%addr, root = %store.root().display(), "depot server listening");

        Ok(Self {
            listener,
            store,
            chunk_size: config.chunk_size,
            buffer_size: config.buffer_size,
            cancel: CancellationToken::new(),
        })
    }

    /// The bound listening address (useful with port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Requests a graceful shutdown: the accept loop stops and each
    /// in-flight session drains at its next command boundary.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Accepts connections until shutdown.
    ///
    /// The accept loop never blocks on a command reply; each connection
    /// runs its session in an independent task.
    pub async fn run(&self) -> Result<(), ServerError> {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("server shutting down");
                    break Ok(());
                }

                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer)) => {
                            info!(%peer, "client connected");
                            let store = Arc::clone(&self.store);
                            let chunk_size = self.chunk_size;
                            let buffer_size = self.buffer_size;
                            let cancel = self.cancel.clone();
                            tokio::spawn(async move {
                                match session::run(stream, peer, store, chunk_size, buffer_size, cancel).await {
                                    Ok(()) => info!(%peer, "session closed"),
                                    Err(e) => error!(%peer, "session failed: {e}"),
                                }
                            });
                        }
                        Err(e) => {
                            error!("accept error: {e}");
                        }
                    }
                }
            }
        }
    }
}
