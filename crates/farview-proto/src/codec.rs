//! Shared CBOR helpers for protocol records.

use serde::{Serialize, de::DeserializeOwned};

use crate::errors::FrameError;

/// Serialize a record to CBOR bytes.
pub(crate) fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, FrameError> {
    let mut out = Vec::new();
    ciborium::into_writer(value, &mut out).map_err(|e| FrameError::Codec(e.to_string()))?;
    Ok(out)
}

/// Deserialize a record from CBOR bytes.
pub(crate) fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, FrameError> {
    ciborium::from_reader(bytes).map_err(|e| FrameError::Codec(e.to_string()))
}
