// src/services/response.rs
//! DID-Auth response construction and verification (the User side of the
//! exchange, and the Entity's final check).
//!
//! The User signs locally — their key never leaves the device. The Entity
//! delegates the raw signature check to an external validation service;
//! this module's own responsibility is nonce binding and request shaping.

use crate::error::DidAuthError;
use crate::models::payload::{
    DidAuthResponseCall, DidAuthResponsePayload, SignatureValidationResponse,
    SIOP_SELF_ISSUED_ISSUER,
};
use crate::services::http_bridge::post_with_bearer_token;
use crate::wallet::key_management::{KeyManager, LocalSigner};
use crate::jwt;
use futures::future::BoxFuture;
use serde_json::json;

/// Capability of the Entity side during response verification: delegate the
/// cryptographic signature check to an external service. Kept as a seam so
/// a local verifier can substitute later without changing the
/// nonce-binding contract.
pub trait SignatureValidationService: Send + Sync {
    fn validate<'a>(
        &'a self,
        jwt: &'a str,
    ) -> BoxFuture<'a, Result<SignatureValidationResponse, DidAuthError>>;
}

/// Validation service backed by the wallet API's signature-validation
/// endpoint.
pub struct WalletApiValidator {
    client: reqwest::Client,
    validation_uri: String,
    authz_token: String,
}

impl WalletApiValidator {
    pub fn new(validation_uri: &str, authz_token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            validation_uri: validation_uri.to_string(),
            authz_token: authz_token.to_string(),
        }
    }
}

impl SignatureValidationService for WalletApiValidator {
    fn validate<'a>(
        &'a self,
        jwt: &'a str,
    ) -> BoxFuture<'a, Result<SignatureValidationResponse, DidAuthError>> {
        Box::pin(async move {
            let body = json!({ "jwt": jwt });
            let response = post_with_bearer_token(
                &self.client,
                &self.validation_uri,
                &body,
                &self.authz_token,
            )
            .await?;
            Ok(response.json::<SignatureValidationResponse>().await?)
        })
    }
}

/// Builds and locally signs a DID-Auth response echoing the request nonce.
///
/// # Errors
/// [`DidAuthError::InvalidKeyMaterial`] if the hex key cannot be decoded.
pub async fn create_did_auth_response(call: &DidAuthResponseCall) -> Result<String, DidAuthError> {
    let key_manager = KeyManager::from_hex_key(&call.hex_private_key)?;
    let (iat, exp) = jwt::issued_at_claims();
    let payload = DidAuthResponsePayload {
        iss: SIOP_SELF_ISSUED_ISSUER.to_string(),
        did: call.did.clone(),
        aud: call.redirect_uri.clone(),
        nonce: call.nonce.clone(),
        vp: call.vp.clone(),
        iat: Some(iat),
        exp: Some(exp),
    };
    log::debug!("signing response for {} locally", payload.did);
    key_manager.sign_claims(&payload)
}

/// Verifies a DID-Auth response: nonce binding first, then the delegated
/// signature check against the validation service at `validation_uri`.
///
/// # Errors
/// [`DidAuthError::NonceMismatch`] when the echoed nonce differs from
/// `expected_nonce` — returned before the service is consulted, so a
/// replayed response costs no network round trip and the service's answer
/// cannot mask the mismatch. Transport failures surface as
/// [`DidAuthError::Network`] / [`DidAuthError::Service`].
pub async fn verify_did_auth_response(
    jwt: &str,
    validation_uri: &str,
    authz_token: &str,
    expected_nonce: &str,
) -> Result<SignatureValidationResponse, DidAuthError> {
    let validator = WalletApiValidator::new(validation_uri, authz_token);
    verify_did_auth_response_with_validator(jwt, &validator, expected_nonce).await
}

/// Same as [`verify_did_auth_response`] with an injected validation service.
pub async fn verify_did_auth_response_with_validator(
    jwt: &str,
    validator: &impl SignatureValidationService,
    expected_nonce: &str,
) -> Result<SignatureValidationResponse, DidAuthError> {
    let payload: DidAuthResponsePayload = jwt::decode_payload(jwt)?;
    if payload.nonce != expected_nonce {
        return Err(DidAuthError::NonceMismatch {
            expected: expected_nonce.to_string(),
            actual: payload.nonce,
        });
    }
    let result = validator.validate(jwt).await?;
    log::debug!(
        "signature validation for {}: {}",
        payload.did,
        result.signature_validation
    );
    Ok(result)
}
