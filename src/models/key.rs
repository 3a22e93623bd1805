// src/models/key.rs
//! JWK-style elliptic curve key material.

use serde::{Deserialize, Serialize};

/// EC private key material in JWK form (secp256k1).
///
/// Only the fields the DID-Auth core reads are modeled: `d` carries the
/// base64url-encoded private scalar, `x`/`y` the optional public
/// coordinates. The key is ephemeral — it lives for the duration of a
/// single derive or sign call and is never persisted by this crate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EcKey {
    /// Base64url-encoded 32-byte private scalar.
    pub d: String,

    /// Base64url-encoded x coordinate of the public point, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,

    /// Base64url-encoded y coordinate of the public point, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}
