//! TCP wire format for depot transfers.
//!
//! # Wire format
//!
//! ```text
//! FRAME:         [4 bytes BE: payload_len][payload_len bytes: payload]
//!
//! CONTROL FRAME: payload is a JSON-encoded Command or Response
//! CHUNK FRAME:   payload is raw file bytes, announced by the
//!                preceding file_chunk control frame
//! ```
//!
//! TCP gives a byte stream, not message boundaries; every message,
//! including raw chunk bytes, rides inside a frame so a reader always
//! knows the exact byte count before interpreting the payload. A
//! declared length of 0 is a valid empty payload.

mod error;
mod frame;

pub use error::WireError;
pub use frame::{read_frame, read_message, write_frame, write_message};
