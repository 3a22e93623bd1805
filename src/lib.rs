// src/lib.rs
//! # DID-Auth (SIOP) flow over ES256K JWTs
//!
//! A Self-Issued OpenID Connect style authentication exchange: an Entity
//! (relying party) challenges a User to prove control of a `did:vid`
//! identifier by exchanging signed JWTs, optionally carrying opaque
//! verifiable-credential claims.
//!
//! ## Flow
//! 1. The Entity builds a request with [`create_uri_request`]: fresh state,
//!    a content-derived nonce, a JWT signed by the Entity's custodial
//!    wallet backend, and a shareable `openid://` URI.
//! 2. The User's wallet verifies the request with
//!    [`verify_did_auth_request`], resolving the issuer DID against the
//!    on-chain registry.
//! 3. The wallet answers with [`create_did_auth_response`], signed locally
//!    with the User's own key and echoing the request nonce.
//! 4. The Entity checks the response with [`verify_did_auth_response`]:
//!    nonce binding locally, raw signature check delegated to the external
//!    validation service.
//!
//! Every exchange is self-contained: configuration (registry address, RPC
//! endpoint, service URIs, tokens) travels as explicit parameters, and the
//! crate keeps no shared mutable state.

pub mod contracts; // DID registry resolution
pub mod error; // failure taxonomy
pub mod jwt; // ES256K compact token codec
pub mod models; // wire payloads and key material
pub mod services; // request/response orchestration
pub mod utils; // nonce/state/encoding primitives
pub mod wallet; // key derivation and local signing

pub use contracts::did_registry::{DidRegistry, DidResolver};
pub use error::DidAuthError;
pub use models::key::EcKey;
pub use models::payload::{
    DidAuthRequestCall, DidAuthRequestPayload, DidAuthResponseCall, DidAuthResponsePayload,
    SignatureValidationResponse, UriResponse, DID_AUTH_RESPONSE_TYPE, DID_AUTH_SCOPE,
    SIOP_SELF_ISSUED_ISSUER,
};
pub use services::request::{
    create_uri_request, create_uri_request_with_signer, verify_did_auth_request,
    verify_did_auth_request_with_resolver, RemoteSigner, WalletApiSigner,
};
pub use services::response::{
    create_did_auth_response, verify_did_auth_response, verify_did_auth_response_with_validator,
    SignatureValidationService, WalletApiValidator,
};
pub use utils::crypto::{get_nonce, get_state, prefix_with_0x};
pub use wallet::key_management::{
    get_did_from_key, get_eth_address, get_hex_private_key, KeyManager, LocalSigner,
};
