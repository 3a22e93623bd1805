// src/models/payload.rs
//! Wire payloads for the DID-Auth request/response exchange.
//!
//! Request and response payloads travel inside ES256K-signed JWTs. The
//! verifiable-credential `claims` and `vp` fields are opaque to this crate:
//! they are embedded and echoed as raw JSON, never interpreted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Issuer value of a self-issued (SIOP) response token.
pub const SIOP_SELF_ISSUED_ISSUER: &str = "https://self-issued.me";

/// OIDC scope requested by a DID-Auth challenge.
pub const DID_AUTH_SCOPE: &str = "openid did_authn";

/// OIDC response type of a DID-Auth challenge.
pub const DID_AUTH_RESPONSE_TYPE: &str = "id_token";

/// Inputs for building a DID-Auth request URI.
///
/// The Entity's key is custodial: signing is delegated to the wallet
/// backend at `signature_uri`, authenticated with `authz_token`.
#[derive(Debug, Clone)]
pub struct DidAuthRequestCall {
    /// Location where the User's wallet can fetch the full request JWT.
    pub request_uri: String,
    /// Entity callback the wallet redirects the response to; doubles as
    /// the OIDC `client_id`.
    pub redirect_uri: String,
    /// Delegated signing endpoint of the Entity's wallet backend.
    pub signature_uri: String,
    /// Bearer credential for the signing endpoint.
    pub authz_token: String,
    /// Opaque verifiable-credential query descriptor, forwarded as-is.
    pub claims: Option<Value>,
}

/// Claims of a DID-Auth request JWT.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DidAuthRequestPayload {
    /// Issuer DID. Absent while the payload awaits delegated signing; the
    /// wallet backend stamps its DID when it signs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    pub scope: String,
    pub response_type: String,
    /// Redirect URI of the Entity, in the `client_id` role.
    pub client_id: String,
    /// Where the full request JWT can be fetched.
    pub request_uri: String,
    /// Content-derived digest binding the eventual response to this request.
    pub nonce: String,
    /// Fresh random session-correlation token, hex without `0x`.
    pub state: String,
    /// Opaque verifiable-credential query descriptor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Inputs for building a DID-Auth response JWT.
///
/// The User always controls their own key, so signing happens locally with
/// `hex_private_key` — no delegation on this side of the exchange.
#[derive(Debug, Clone)]
pub struct DidAuthResponseCall {
    /// Hex-encoded secp256k1 private key, with or without `0x` prefix.
    pub hex_private_key: String,
    /// The User's DID.
    pub did: String,
    /// Nonce echoed back from the request being answered.
    pub nonce: String,
    /// The Entity callback the response is addressed to.
    pub redirect_uri: String,
    /// Opaque verifiable presentation, forwarded as-is.
    pub vp: Option<Value>,
}

/// Claims of a DID-Auth response JWT.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DidAuthResponsePayload {
    /// Always [`SIOP_SELF_ISSUED_ISSUER`] — the User is their own provider.
    pub iss: String,
    /// The User's DID.
    pub did: String,
    /// Redirect URI of the originating request.
    pub aud: String,
    /// Echo of the request nonce.
    pub nonce: String,
    /// Opaque verifiable presentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vp: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Result of [`create_uri_request`](crate::services::request::create_uri_request):
/// the shareable `openid://` URI plus the nonce and signed JWT behind it.
#[derive(Debug, Clone)]
pub struct UriResponse {
    pub uri: String,
    pub nonce: String,
    pub jwt: String,
}

/// Answer of the external signature-validation service.
///
/// Only `signatureValidation` is read by this crate; any additional fields
/// the service returns are carried through untouched.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignatureValidationResponse {
    #[serde(rename = "signatureValidation")]
    pub signature_validation: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}
