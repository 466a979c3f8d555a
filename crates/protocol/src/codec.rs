//! JSON codec for control messages.
//!
//! Only metadata and control values go through this codec. A decode
//! failure means the stream's framing integrity can no longer be
//! trusted; callers must terminate the session, not retry.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Codec failure.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Serializes a control value to its JSON byte payload.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(value)?)
}

/// Deserializes a control value from a JSON byte payload.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    Ok(serde_json::from_slice(bytes)?)
}
