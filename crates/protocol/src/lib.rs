//! Wire protocol types for depot client-server communication.
//!
//! Commands flow client -> server, responses flow server -> client. Both
//! are closed tagged enums serialized as JSON with a `"type"` tag field;
//! raw chunk payloads never pass through this codec (they travel as their
//! own length-prefixed frame, see `depot-wire`).

pub mod codec;
pub mod constants;
pub mod messages;
pub mod types;

pub use codec::{CodecError, decode, encode};
pub use messages::{Command, Response};
pub use types::FileEntry;
