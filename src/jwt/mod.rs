// src/jwt/mod.rs
//! Protocol JWT codec: compact ES256K tokens carrying DID-Auth payloads.
//!
//! This is deliberately not a general-purpose JWT library. The header is
//! fixed (`{"alg":"ES256K","typ":"JWT"}`), the only signature scheme is
//! secp256k1 ECDSA over SHA-256, and verification can bind either to a
//! known public key or to an Ethereum address resolved from a DID registry
//! (by trial recovery of the signing key).

use crate::error::DidAuthError;
use crate::utils::crypto::{base64url_decode, base64url_encode};
use chrono::Utc;
use ethers::types::Address;
use ethers::utils::keccak256;
use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Signature algorithm identifier carried in every token header.
pub const JWT_ALG: &str = "ES256K";

/// Token type carried in every token header.
pub const JWT_TYP: &str = "JWT";

/// Lifetime of issued tokens: `exp = iat + 300` seconds.
pub const DEFAULT_EXPIRATION_SECS: i64 = 300;

/// Fixed JOSE header of protocol tokens. Never user-supplied.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

impl Default for JwtHeader {
    fn default() -> Self {
        Self {
            alg: JWT_ALG.to_string(),
            typ: JWT_TYP.to_string(),
        }
    }
}

/// Returns `(iat, exp)` claim values for a token issued now.
pub fn issued_at_claims() -> (i64, i64) {
    let iat = Utc::now().timestamp();
    (iat, iat + DEFAULT_EXPIRATION_SECS)
}

/// Signs the claims into a compact ES256K JWT.
pub fn sign_with_key<T: Serialize>(claims: &T, key: &SigningKey) -> Result<String, DidAuthError> {
    let header = base64url_encode(&serde_json::to_vec(&JwtHeader::default())?);
    let payload = base64url_encode(&serde_json::to_vec(claims)?);
    let signing_input = format!("{header}.{payload}");
    let signature: Signature = key.sign(signing_input.as_bytes());
    Ok(format!(
        "{signing_input}.{}",
        base64url_encode(&signature.to_vec())
    ))
}

fn split(jwt: &str) -> Result<(&str, &str, &str), DidAuthError> {
    let mut parts = jwt.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(signature), None)
            if !header.is_empty() && !signature.is_empty() =>
        {
            Ok((header, payload, signature))
        }
        _ => Err(DidAuthError::MalformedToken),
    }
}

fn parse_signature(segment: &str) -> Result<Signature, DidAuthError> {
    let bytes = base64url_decode(segment).map_err(|_| DidAuthError::MalformedToken)?;
    let signature = Signature::from_slice(&bytes).map_err(|_| DidAuthError::MalformedToken)?;
    Ok(signature.normalize_s().unwrap_or(signature))
}

fn payload_value(segment: &str) -> Result<Value, DidAuthError> {
    let bytes = base64url_decode(segment).map_err(|_| DidAuthError::MalformedToken)?;
    serde_json::from_slice(&bytes).map_err(|_| DidAuthError::MalformedToken)
}

fn check_expiry(payload: &Value) -> Result<(), DidAuthError> {
    if let Some(exp) = payload.get("exp").and_then(Value::as_i64) {
        if exp < Utc::now().timestamp() {
            return Err(DidAuthError::TokenExpired(exp));
        }
    }
    Ok(())
}

fn finish_decode<T: DeserializeOwned>(payload_segment: &str) -> Result<T, DidAuthError> {
    let value = payload_value(payload_segment)?;
    check_expiry(&value)?;
    serde_json::from_value(value).map_err(|_| DidAuthError::MalformedToken)
}

fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&digest[12..])
}

/// Verifies the token signature against a known public key and returns the
/// decoded payload.
///
/// # Errors
/// [`DidAuthError::MalformedToken`], [`DidAuthError::SignatureInvalid`],
/// [`DidAuthError::TokenExpired`].
pub fn verify_with_key<T: DeserializeOwned>(
    jwt: &str,
    key: &VerifyingKey,
) -> Result<T, DidAuthError> {
    let (header, payload, signature_segment) = split(jwt)?;
    let signature = parse_signature(signature_segment)?;
    let signing_input = format!("{header}.{payload}");
    key.verify(signing_input.as_bytes(), &signature)
        .map_err(|_| DidAuthError::SignatureInvalid)?;
    finish_decode(payload)
}

/// Verifies the token signature against the Ethereum address a DID registry
/// resolved for the issuer, and returns the decoded payload.
///
/// The signing key is recovered from the signature (trial over both
/// recovery ids) and its derived address compared to `expected`.
pub fn verify_with_address<T: DeserializeOwned>(
    jwt: &str,
    expected: Address,
) -> Result<T, DidAuthError> {
    let (header, payload, signature_segment) = split(jwt)?;
    let signature = parse_signature(signature_segment)?;
    let signing_input = format!("{header}.{payload}");
    let recovered = (0..=1u8)
        .filter_map(RecoveryId::from_byte)
        .filter_map(|recovery_id| {
            VerifyingKey::recover_from_msg(signing_input.as_bytes(), &signature, recovery_id).ok()
        })
        .any(|candidate| address_of(&candidate) == expected);
    if !recovered {
        return Err(DidAuthError::SignatureInvalid);
    }
    finish_decode(payload)
}

/// Decodes the payload without checking the signature.
///
/// Used before the verifying party has resolved the issuer's key, e.g. to
/// read the audience or the echoed nonce.
pub fn decode_payload<T: DeserializeOwned>(jwt: &str) -> Result<T, DidAuthError> {
    let (_, payload, _) = split(jwt)?;
    let bytes = base64url_decode(payload).map_err(|_| DidAuthError::MalformedToken)?;
    serde_json::from_slice(&bytes).map_err(|_| DidAuthError::MalformedToken)
}

/// Reads the `aud` claim without verifying the signature.
///
/// Returns `Ok(None)` when the claim is simply absent, which is distinct
/// from the token carrying no payload at all ([`DidAuthError::NoAudience`]).
/// An array-valued audience is rejected with
/// [`DidAuthError::InvalidAudience`]: the protocol addresses exactly one
/// recipient.
pub fn get_audience(jwt: &str) -> Result<Option<String>, DidAuthError> {
    let (_, payload_segment, _) = split(jwt)?;
    if payload_segment.is_empty() {
        return Err(DidAuthError::NoAudience);
    }
    let payload = payload_value(payload_segment)?;
    if payload.is_null() {
        return Err(DidAuthError::NoAudience);
    }
    match payload.get("aud") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(aud)) => Ok(Some(aud.clone())),
        Some(_) => Err(DidAuthError::InvalidAudience),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::key_management::KeyManager;
    use serde_json::json;

    fn unsigned_token(payload: &Value) -> String {
        let header = base64url_encode(&serde_json::to_vec(&JwtHeader::default()).unwrap());
        let body = base64url_encode(&serde_json::to_vec(payload).unwrap());
        format!("{header}.{body}.c2ln")
    }

    #[test]
    fn sign_verify_roundtrip_with_key() {
        let key = SigningKey::random(&mut rand::rngs::OsRng);
        let claims = json!({ "nonce": "abc", "state": "123" });
        let jwt = sign_with_key(&claims, &key).unwrap();
        let decoded: Value = verify_with_key(&jwt, key.verifying_key()).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn sign_verify_roundtrip_with_address() {
        let manager = KeyManager::random();
        let claims = json!({ "nonce": "abc" });
        let jwt = {
            use crate::wallet::key_management::LocalSigner;
            manager.sign_claims(&claims).unwrap()
        };
        let decoded: Value = verify_with_address(&jwt, manager.address()).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn wrong_address_fails_verification() {
        use crate::wallet::key_management::LocalSigner;
        let manager = KeyManager::random();
        let stranger = KeyManager::random();
        let jwt = manager.sign_claims(&json!({ "nonce": "abc" })).unwrap();
        assert!(matches!(
            verify_with_address::<Value>(&jwt, stranger.address()),
            Err(DidAuthError::SignatureInvalid)
        ));
    }

    #[test]
    fn tampered_payload_fails_verification() {
        use crate::wallet::key_management::LocalSigner;
        let manager = KeyManager::random();
        let jwt = manager.sign_claims(&json!({ "nonce": "abc" })).unwrap();
        let mut parts: Vec<&str> = jwt.split('.').collect();
        let forged = base64url_encode(&serde_json::to_vec(&json!({ "nonce": "forged" })).unwrap());
        parts[1] = &forged;
        let forged_jwt = parts.join(".");
        assert!(matches!(
            verify_with_key::<Value>(&forged_jwt, &manager.verifying_key()),
            Err(DidAuthError::SignatureInvalid)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        use crate::wallet::key_management::LocalSigner;
        let manager = KeyManager::random();
        let past = Utc::now().timestamp() - 60;
        let jwt = manager
            .sign_claims(&json!({ "nonce": "abc", "exp": past }))
            .unwrap();
        assert!(matches!(
            verify_with_key::<Value>(&jwt, &manager.verifying_key()),
            Err(DidAuthError::TokenExpired(_))
        ));
    }

    #[test]
    fn two_segments_is_malformed() {
        assert!(matches!(
            decode_payload::<Value>("only.two"),
            Err(DidAuthError::MalformedToken)
        ));
    }

    #[test]
    fn audience_string_is_returned() {
        let jwt = unsigned_token(&json!({ "aud": "https://rp.example/callback" }));
        assert_eq!(
            get_audience(&jwt).unwrap().as_deref(),
            Some("https://rp.example/callback")
        );
    }

    #[test]
    fn absent_audience_is_none() {
        let jwt = unsigned_token(&json!({ "nonce": "abc" }));
        assert_eq!(get_audience(&jwt).unwrap(), None);
    }

    #[test]
    fn array_audience_is_invalid() {
        let jwt = unsigned_token(&json!({ "aud": ["a", "b"] }));
        assert!(matches!(
            get_audience(&jwt),
            Err(DidAuthError::InvalidAudience)
        ));
    }

    #[test]
    fn missing_payload_has_no_audience() {
        let header = base64url_encode(&serde_json::to_vec(&JwtHeader::default()).unwrap());
        let jwt = format!("{header}..c2ln");
        assert!(matches!(get_audience(&jwt), Err(DidAuthError::NoAudience)));
    }
}
