//! SHA-256 digests and HMAC signatures.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, KeyInit, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded SHA-256 digest of `data`.
///
/// ```rust
/// assert_eq!(
///     toolx_utils::hash::sha256_hex(b"abc"),
///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
/// );
/// ```
#[must_use]
pub fn sha256_hex(data: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(data.as_ref()))
}

/// Hex-encoded HMAC-SHA256 of `message` under `key`.
#[must_use]
pub fn hmac_sha256_hex(key: impl AsRef<[u8]>, message: impl AsRef<[u8]>) -> String {
    hex::encode(hmac_sha256(key.as_ref(), message.as_ref()))
}

/// Base64-encoded HMAC-SHA256 of `message` under `key`.
#[must_use]
pub fn hmac_sha256_base64(key: impl AsRef<[u8]>, message: impl AsRef<[u8]>) -> String {
    STANDARD.encode(hmac_sha256(key.as_ref(), message.as_ref()))
}

fn hmac_sha256(key: &[u8], message: &[u8]) -> impl AsRef<[u8]> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(message);
    mac.finalize().into_bytes()
}
