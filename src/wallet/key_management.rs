// src/wallet/key_management.rs
//! Key handling for the DID-Auth flow: derivation of `did:vid` identifiers
//! and hex signing keys from JWK material, plus the User-side local signer.
//!
//! All derivations are pure functions of the input bytes — the same key
//! material always produces the same DID and the same hex private key.

use crate::error::DidAuthError;
use crate::jwt;
use crate::models::key::EcKey;
use crate::utils::crypto::{base64url_decode, prefix_with_0x};
use ethers::types::Address;
use ethers::utils::{hex, secret_key_to_address, to_checksum};
use k256::ecdsa::{SigningKey, VerifyingKey};
use serde::Serialize;
use std::str::FromStr;

/// DID method prefix of this protocol.
pub const DID_METHOD_PREFIX: &str = "did:vid:";

fn signing_key_from_jwk(key: &EcKey) -> Result<SigningKey, DidAuthError> {
    let scalar = base64url_decode(&key.d)
        .map_err(|e| DidAuthError::InvalidKeyMaterial(format!("'d' is not base64url: {e}")))?;
    if scalar.len() != 32 {
        return Err(DidAuthError::InvalidKeyMaterial(format!(
            "'d' must decode to 32 bytes, got {}",
            scalar.len()
        )));
    }
    SigningKey::from_slice(&scalar).map_err(|e| DidAuthError::InvalidKeyMaterial(e.to_string()))
}

/// Normalizes JWK key material to a `0x`-prefixed hex private key.
///
/// # Errors
/// [`DidAuthError::InvalidKeyMaterial`] if `d` is malformed or out of the
/// curve's scalar range.
pub fn get_hex_private_key(key: &EcKey) -> Result<String, DidAuthError> {
    let signing_key = signing_key_from_jwk(key)?;
    Ok(prefix_with_0x(&hex::encode(signing_key.to_bytes())))
}

/// Derives the EIP-55 checksummed Ethereum address of the key.
pub fn get_eth_address(key: &EcKey) -> Result<String, DidAuthError> {
    let signing_key = signing_key_from_jwk(key)?;
    Ok(to_checksum(&secret_key_to_address(&signing_key), None))
}

/// Derives the `did:vid:<address>` identifier bound to the key.
///
/// Deterministic: repeated calls on identical key material yield the
/// identical DID.
pub fn get_did_from_key(key: &EcKey) -> Result<String, DidAuthError> {
    Ok(format!("{DID_METHOD_PREFIX}{}", get_eth_address(key)?))
}

/// Extracts the embedded Ethereum address from a `did:vid` identifier.
///
/// # Errors
/// [`DidAuthError::DidNotFound`] if the method is not `did:vid` or the
/// method-specific id is not a 20-byte address.
pub fn address_from_did(did: &str) -> Result<Address, DidAuthError> {
    let hex_part = did
        .strip_prefix(DID_METHOD_PREFIX)
        .ok_or_else(|| DidAuthError::DidNotFound(format!("unsupported DID method: {did}")))?;
    Address::from_str(hex_part)
        .map_err(|_| DidAuthError::DidNotFound(format!("DID does not embed a valid address: {did}")))
}

/// Capability of the User side: sign response claims with a locally held
/// key. Kept separate from [`RemoteSigner`](crate::services::request::RemoteSigner)
/// because the two sit on opposite sides of the custody boundary.
pub trait LocalSigner {
    /// Signs the claims into a compact ES256K JWT.
    fn sign_claims<T: Serialize>(&self, claims: &T) -> Result<String, DidAuthError>;
}

/// Holder of a secp256k1 signing key for the User side of the exchange.
///
/// The secret key is never exposed; only the derived address, DID, and
/// hex form (for interop with wallets that store keys as hex) are.
#[derive(Clone)]
pub struct KeyManager {
    signing_key: SigningKey,
}

impl KeyManager {
    /// Builds a key manager from a hex private key, `0x` prefix optional.
    ///
    /// # Errors
    /// [`DidAuthError::InvalidKeyMaterial`] if the string is not valid hex
    /// or not a valid curve scalar.
    pub fn from_hex_key(hex_private_key: &str) -> Result<Self, DidAuthError> {
        let stripped = hex_private_key.trim_start_matches("0x");
        let bytes = hex::decode(stripped)
            .map_err(|e| DidAuthError::InvalidKeyMaterial(format!("not hex: {e}")))?;
        let signing_key = SigningKey::from_slice(&bytes)
            .map_err(|e| DidAuthError::InvalidKeyMaterial(e.to_string()))?;
        Ok(Self { signing_key })
    }

    /// Builds a key manager straight from JWK material.
    pub fn from_jwk(key: &EcKey) -> Result<Self, DidAuthError> {
        signing_key_from_jwk(key).map(|signing_key| Self { signing_key })
    }

    /// Generates a fresh random key (wallet tooling and tests).
    pub fn random() -> Self {
        Self {
            signing_key: SigningKey::random(&mut rand::rngs::OsRng),
        }
    }

    /// The verifying half of the key.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key().clone()
    }

    /// The Ethereum address derived from the key.
    pub fn address(&self) -> Address {
        secret_key_to_address(&self.signing_key)
    }

    /// The `did:vid` identifier bound to the key.
    pub fn did(&self) -> String {
        format!("{DID_METHOD_PREFIX}{}", to_checksum(&self.address(), None))
    }

    /// The `0x`-prefixed hex form of the private key.
    pub fn hex_private_key(&self) -> String {
        prefix_with_0x(&hex::encode(self.signing_key.to_bytes()))
    }
}

impl LocalSigner for KeyManager {
    fn sign_claims<T: Serialize>(&self, claims: &T) -> Result<String, DidAuthError> {
        jwt::sign_with_key(claims, &self.signing_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::crypto::base64url_encode;

    fn test_jwk() -> EcKey {
        let manager = KeyManager::random();
        EcKey {
            d: base64url_encode(manager.signing_key.to_bytes().as_slice()),
            x: None,
            y: None,
        }
    }

    #[test]
    fn did_derivation_is_deterministic() {
        let key = test_jwk();
        let first = get_did_from_key(&key).unwrap();
        let second = get_did_from_key(&key).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("did:vid:0x"));
    }

    #[test]
    fn hex_key_derivation_is_deterministic() {
        let key = test_jwk();
        let first = get_hex_private_key(&key).unwrap();
        let second = get_hex_private_key(&key).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("0x"));
        assert_eq!(first.len(), 66);
    }

    #[test]
    fn malformed_scalar_is_rejected() {
        let bad = EcKey {
            d: "not base64url!!!".into(),
            x: None,
            y: None,
        };
        assert!(matches!(
            get_did_from_key(&bad),
            Err(DidAuthError::InvalidKeyMaterial(_))
        ));
    }

    #[test]
    fn short_scalar_is_rejected() {
        let bad = EcKey {
            d: base64url_encode(&[7u8; 16]),
            x: None,
            y: None,
        };
        assert!(matches!(
            get_hex_private_key(&bad),
            Err(DidAuthError::InvalidKeyMaterial(_))
        ));
    }

    #[test]
    fn did_embeds_the_key_address() {
        let manager = KeyManager::random();
        let did = manager.did();
        assert_eq!(address_from_did(&did).unwrap(), manager.address());
    }

    #[test]
    fn foreign_did_method_is_rejected() {
        assert!(matches!(
            address_from_did("did:ethr:0x0000000000000000000000000000000000000001"),
            Err(DidAuthError::DidNotFound(_))
        ));
    }

    #[test]
    fn key_manager_roundtrips_through_hex() {
        let manager = KeyManager::random();
        let restored = KeyManager::from_hex_key(&manager.hex_private_key()).unwrap();
        assert_eq!(restored.did(), manager.did());
    }
}
