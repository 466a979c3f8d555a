//! depot client: drives single- and multi-file downloads.
//!
//! One command/response exchange at a time over one connection. A
//! download runs to completion or the connection is torn down on a
//! wire-level error; application-level failures (missing file, local
//! disk error, sequence violation) abort only that file and surface as
//! a per-file outcome, so a batch always reports every requested name.

mod client;
mod outcome;

pub use client::DepotClient;
pub use outcome::{BatchReport, FileOutcome};

use depot_transfer::TransferError;
use depot_wire::WireError;

/// Errors that tear down the client connection.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("server error: {0}")]
    Server(String),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("connection timed out")]
    Timeout,
}
