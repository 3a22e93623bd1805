// src/utils/crypto.rs
//! Nonce, state, and encoding primitives for the DID-Auth flow.
//!
//! The nonce is a pure function of request content (SHA-256, base64url
//! without padding), so identical content always yields the identical
//! nonce. The state token is independent CSPRNG randomness drawn fresh
//! per request.

use base64::{decode_config, encode_config, URL_SAFE_NO_PAD};
use ethers::utils::hex;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Length of the random state token in bytes (24 hex characters).
pub const STATE_LEN_BYTES: usize = 12;

/// Ensures a hex key string carries the conventional `0x` prefix.
pub fn prefix_with_0x(key: &str) -> String {
    if key.starts_with("0x") {
        key.to_string()
    } else {
        format!("0x{key}")
    }
}

/// Encodes bytes as base64url without padding.
pub fn base64url_encode(data: &[u8]) -> String {
    encode_config(data, URL_SAFE_NO_PAD)
}

/// Decodes base64url bytes; trailing padding is tolerated.
pub fn base64url_decode(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    decode_config(data.trim_end_matches('='), URL_SAFE_NO_PAD)
}

/// Computes the request nonce: base64url-no-pad of SHA-256 over the
/// UTF-8 content.
///
/// Same content produces the same nonce, so callers must vary content
/// (the `state` field does this) across distinct requests.
pub fn get_nonce(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    base64url_encode(digest.as_slice())
}

/// Draws a fresh 12-byte state token from the OS CSPRNG, hex-encoded
/// without a `0x` prefix.
///
/// # Panics
/// Panics if the entropy source is unavailable. That failure is fatal
/// and never retried.
pub fn get_state() -> String {
    let mut bytes = [0u8; STATE_LEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
