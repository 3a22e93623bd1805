// src/services/request.rs
//! DID-Auth request construction and verification (the Entity side of the
//! challenge).
//!
//! Building a request is delegated-signing territory: the Entity's key is
//! custodial, so the assembled payload travels to the wallet backend and
//! comes back as a signed JWT. Verification resolves the issuer DID against
//! the on-chain registry and binds the signature to the resolved address.

use crate::contracts::did_registry::{DidRegistry, DidResolver};
use crate::error::DidAuthError;
use crate::jwt;
use crate::models::payload::{
    DidAuthRequestCall, DidAuthRequestPayload, UriResponse, DID_AUTH_RESPONSE_TYPE, DID_AUTH_SCOPE,
};
use crate::services::http_bridge::post_with_bearer_token;
use crate::utils::crypto::{get_nonce, get_state};
use futures::future::BoxFuture;
use serde::Deserialize;

/// Capability of the Entity side: have the custodial wallet backend sign a
/// request payload. Deliberately separate from
/// [`LocalSigner`](crate::wallet::key_management::LocalSigner) — the two
/// interfaces sit on opposite sides of the key-custody trust boundary.
pub trait RemoteSigner: Send + Sync {
    fn sign_request<'a>(
        &'a self,
        payload: &'a DidAuthRequestPayload,
    ) -> BoxFuture<'a, Result<String, DidAuthError>>;
}

/// Delegated signer backed by the wallet API's signature endpoint.
pub struct WalletApiSigner {
    client: reqwest::Client,
    signature_uri: String,
    authz_token: String,
}

impl WalletApiSigner {
    pub fn new(signature_uri: &str, authz_token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            signature_uri: signature_uri.to_string(),
            authz_token: authz_token.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct SignatureResponse {
    jwt: String,
}

impl RemoteSigner for WalletApiSigner {
    fn sign_request<'a>(
        &'a self,
        payload: &'a DidAuthRequestPayload,
    ) -> BoxFuture<'a, Result<String, DidAuthError>> {
        Box::pin(async move {
            let response = post_with_bearer_token(
                &self.client,
                &self.signature_uri,
                payload,
                &self.authz_token,
            )
            .await?;
            let signed: SignatureResponse = response.json().await?;
            Ok(signed.jwt)
        })
    }
}

/// Builds a DID-Auth request: fresh state, content-derived nonce, delegated
/// signature, and the shareable `openid://` URI.
///
/// # Errors
/// [`DidAuthError::SigningService`] when the wallet backend call fails or
/// answers non-2xx.
pub async fn create_uri_request(call: &DidAuthRequestCall) -> Result<UriResponse, DidAuthError> {
    let signer = WalletApiSigner::new(&call.signature_uri, &call.authz_token);
    create_uri_request_with_signer(call, &signer).await
}

/// Same as [`create_uri_request`] with an injected signer.
pub async fn create_uri_request_with_signer(
    call: &DidAuthRequestCall,
    signer: &impl RemoteSigner,
) -> Result<UriResponse, DidAuthError> {
    let payload = build_request_payload(call)?;
    log::debug!("delegating request signature, state {}", payload.state);
    let jwt = signer
        .sign_request(&payload)
        .await
        .map_err(|e| DidAuthError::SigningService(Box::new(e)))?;
    let uri = build_request_uri(&call.redirect_uri, &call.request_uri);
    Ok(UriResponse {
        uri,
        nonce: payload.nonce,
        jwt,
    })
}

fn build_request_payload(call: &DidAuthRequestCall) -> Result<DidAuthRequestPayload, DidAuthError> {
    let (iat, exp) = jwt::issued_at_claims();
    let mut payload = DidAuthRequestPayload {
        iss: None,
        scope: DID_AUTH_SCOPE.to_string(),
        response_type: DID_AUTH_RESPONSE_TYPE.to_string(),
        client_id: call.redirect_uri.clone(),
        request_uri: call.request_uri.clone(),
        nonce: String::new(),
        state: get_state(),
        claims: call.claims.clone(),
        aud: None,
        iat: Some(iat),
        exp: Some(exp),
    };
    // The nonce digests the canonical payload with the nonce field still
    // empty; the fresh state makes it unique per request.
    payload.nonce = get_nonce(&serde_json::to_string(&payload)?);
    Ok(payload)
}

fn build_request_uri(redirect_uri: &str, request_uri: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("scope", DID_AUTH_SCOPE)
        .append_pair("response_type", DID_AUTH_RESPONSE_TYPE)
        .append_pair("client_id", redirect_uri)
        .append_pair("request_uri", request_uri)
        .finish();
    format!("openid://?{query}")
}

/// Verifies an inbound request JWT against the on-chain DID registry at
/// `registry_address` reachable through `rpc_url`.
///
/// # Errors
/// [`DidAuthError::SignatureInvalid`], [`DidAuthError::DidNotFound`],
/// [`DidAuthError::TokenExpired`], [`DidAuthError::RegistryUnavailable`].
pub async fn verify_did_auth_request(
    jwt: &str,
    registry_address: &str,
    rpc_url: &str,
) -> Result<DidAuthRequestPayload, DidAuthError> {
    let resolver = DidRegistry::new(rpc_url, registry_address)?;
    verify_did_auth_request_with_resolver(jwt, &resolver).await
}

/// Same as [`verify_did_auth_request`] with an injected resolver.
pub async fn verify_did_auth_request_with_resolver(
    jwt: &str,
    resolver: &impl DidResolver,
) -> Result<DidAuthRequestPayload, DidAuthError> {
    let unverified: DidAuthRequestPayload = jwt::decode_payload(jwt)?;
    let iss = unverified.iss.as_deref().ok_or(DidAuthError::MalformedToken)?;
    let owner = resolver.resolve(iss).await?;
    jwt::verify_with_address(jwt, owner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn request_uri_carries_client_id_and_request_uri() {
        let uri = build_request_uri(
            "http://localhost:8080/demo/x",
            "https://example/siop/jwts/abc",
        );
        assert!(uri.starts_with("openid://?"));
        let query = uri.split_once('?').unwrap().1;
        let params: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        assert_eq!(params["client_id"], "http://localhost:8080/demo/x");
        assert_eq!(params["request_uri"], "https://example/siop/jwts/abc");
        assert_eq!(params["scope"], DID_AUTH_SCOPE);
        assert_eq!(params["response_type"], DID_AUTH_RESPONSE_TYPE);
    }

    #[test]
    fn payload_nonce_is_set_and_states_differ() {
        let call = DidAuthRequestCall {
            request_uri: "https://example/siop/jwts/abc".into(),
            redirect_uri: "http://localhost:8080/demo/x".into(),
            signature_uri: "http://localhost:9000/api/v1/signatures".into(),
            authz_token: "token".into(),
            claims: Some(json!({ "vc": { "type": ["VerifiableId"] } })),
        };
        let first = build_request_payload(&call).unwrap();
        let second = build_request_payload(&call).unwrap();
        assert!(!first.nonce.is_empty());
        assert_ne!(first.state, second.state);
        // fresh state feeds the digest, so nonces differ across requests
        assert_ne!(first.nonce, second.nonce);
        assert_eq!(first.claims, call.claims);
    }
}
