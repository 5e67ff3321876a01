//! Conversions between caller values and the bytes stored in a list.
//!
//! Nothing here adds an envelope, a length prefix or a schema tag. A JSON
//! element is exactly `serde_json::to_vec(value)`, so a reader must know the
//! target shape out of band.

use crate::error::{QueueError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{de::DeserializeOwned, Serialize};

/// Plain UTF-8 strings, stored as-is.
pub struct Raw;

impl Raw {
    pub fn encode(item: &str) -> Vec<u8> {
        item.as_bytes().to_vec()
    }

    /// Invalid UTF-8 is replaced rather than rejected; raw reads are best-effort.
    pub fn decode(bytes: Vec<u8>) -> String {
        match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }
}

/// Standard JSON documents.
pub struct Json;

impl Json {
    pub fn encode<T: Serialize + ?Sized>(item: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(item)?)
    }

    pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(QueueError::Decode)
    }
}

/// Rewrites an element into the marker used for removal by index.
///
/// The marker only collides if another element already holds exactly this
/// base64 text.
pub(crate) fn index_marker(bytes: &[u8]) -> Vec<u8> {
    STANDARD.encode(bytes).into_bytes()
}
