// src/error.rs
//! Error taxonomy for the DID-Auth protocol core.
//!
//! Verification failures (`SignatureInvalid`, `NonceMismatch`, `TokenExpired`)
//! are kept distinct from transport failures (`Network`, `Service`) so callers
//! can reject a session versus retry a call.

use thiserror::Error;

/// All failures surfaced by the DID-Auth builders and verifiers.
///
/// The core never retries or recovers locally; every failure propagates to
/// the caller as one of these variants.
#[derive(Debug, Error)]
pub enum DidAuthError {
    /// Key material could not be decoded into a valid secp256k1 private key.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// Token is not three base64url segments, or a segment does not decode.
    #[error("token is not a well-formed compact JWT")]
    MalformedToken,

    /// The JWT signature does not verify against the resolved key or address.
    #[error("JWT signature verification failed")]
    SignatureInvalid,

    /// The token's `exp` claim lies in the past.
    #[error("token expired at unix time {0}")]
    TokenExpired(i64),

    /// The token carries no payload to read an audience from.
    #[error("token has no payload")]
    NoAudience,

    /// The `aud` claim is not a single value (the protocol restricts the
    /// audience to exactly one recipient).
    #[error("audience claim must be a single value")]
    InvalidAudience,

    /// The response's echoed nonce does not match the nonce issued with the
    /// originating request.
    #[error("response nonce {actual:?} does not match expected nonce {expected:?}")]
    NonceMismatch { expected: String, actual: String },

    /// The DID registry has no owner registered for this DID.
    #[error("DID not found in registry: {0}")]
    DidNotFound(String),

    /// The DID registry could not be queried (RPC, ABI or address problems).
    #[error("DID registry unavailable: {0}")]
    RegistryUnavailable(String),

    /// The delegated signing endpoint failed; wraps the underlying transport
    /// or service error.
    #[error("signing service request failed: {0}")]
    SigningService(#[source] Box<DidAuthError>),

    /// A payload could not be serialized before signing or posting.
    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The HTTP request itself failed (connect, timeout, body decode).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The remote service answered with a non-2xx status.
    #[error("service returned {status}: {body}")]
    Service { status: u16, body: String },
}
