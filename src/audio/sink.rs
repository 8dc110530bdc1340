//! Turning a stream locator into a decoded rodio source.
//!
//! Remote streams are downloaded into memory first so the decoder gets a
//! seekable reader; local paths are read straight from disk.

use std::io::Cursor;
use std::path::Path;

use rodio::Decoder;
use tracing::debug;

use super::types::{BackendError, StreamSource};

fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Read the whole stream behind `url`, refusing more than `limit` bytes.
pub(super) fn fetch_stream(url: &str, limit: u64) -> Result<Vec<u8>, BackendError> {
    if !is_remote(url) {
        let path = Path::new(url);
        return std::fs::read(path).map_err(|source| BackendError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    let bytes = ureq::get(url)
        .call()
        .map_err(|e| BackendError::Fetch(e.to_string()))?
        .body_mut()
        .with_config()
        .limit(limit)
        .read_to_vec()
        .map_err(|e| BackendError::Fetch(e.to_string()))?;
    debug!(len = bytes.len(), "stream downloaded");
    Ok(bytes)
}

pub(super) fn decode(bytes: Vec<u8>) -> Result<StreamSource, BackendError> {
    Decoder::new(Cursor::new(bytes)).map_err(|e| BackendError::Decode(e.to_string()))
}
