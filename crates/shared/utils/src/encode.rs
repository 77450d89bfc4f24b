//! Base64, gzip and JSON conversion helpers.

use crate::{UtilsError, UtilsErrorExt};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{Read, Write};
use std::path::Path;

/// Standard-alphabet base64 of `data`.
#[must_use]
pub fn base64_encode(data: impl AsRef<[u8]>) -> String {
    STANDARD.encode(data.as_ref())
}

/// Decodes standard-alphabet base64.
pub fn base64_decode(data: &str) -> Result<Vec<u8>, UtilsError> {
    Ok(STANDARD.decode(data)?)
}

/// Reads a file and returns its contents base64-encoded.
pub fn file_to_base64(path: impl AsRef<Path>) -> Result<String, UtilsError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).context(format!("reading {}", path.display()))?;
    Ok(STANDARD.encode(bytes))
}

/// Serializes `value` to JSON, gzips it and base64-encodes the result.
pub fn gzip_json<T: Serialize>(value: &T) -> Result<String, UtilsError> {
    let json = serde_json::to_vec(value)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json).context("gzip compress")?;
    let compressed = encoder.finish().context("gzip finish")?;
    Ok(STANDARD.encode(compressed))
}

/// Inverse of [`gzip_json`]: base64-decode, gunzip, deserialize.
pub fn gunzip_json<T: DeserializeOwned>(data: &str) -> Result<T, UtilsError> {
    let compressed = STANDARD.decode(data)?;
    let mut decoder = GzDecoder::new(compressed.as_slice());
    let mut json = Vec::new();
    decoder.read_to_end(&mut json).context("gzip decompress")?;
    Ok(serde_json::from_slice(&json)?)
}

/// JSON text of `value`.
pub fn to_json_string<T: Serialize>(value: &T) -> Result<String, UtilsError> {
    Ok(serde_json::to_string(value)?)
}

/// Parses JSON text into `T`.
pub fn from_json_str<T: DeserializeOwned>(data: &str) -> Result<T, UtilsError> {
    Ok(serde_json::from_str(data)?)
}
