// src/contracts/did_registry.rs
//! DID registry resolution against the on-chain registry contract.
//!
//! The registry binds each `did:vid` identity to an owner address. Request
//! verification resolves the issuer DID here and checks the JWT signature
//! against the returned address. The contract itself is a black box to this
//! crate: one read-only `identityOwner` call.

use crate::error::DidAuthError;
use crate::wallet::key_management::address_from_did;
use ethers::abi::Abi;
use ethers::contract::Contract;
use ethers::providers::{Http, Provider};
use ethers::types::Address;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Capability consumed by request verification: resolve a DID to the
/// address its signatures must bind to.
///
/// Implementations return [`DidAuthError::DidNotFound`] for unregistered
/// DIDs and [`DidAuthError::RegistryUnavailable`] for transport failures,
/// keeping the two cases distinguishable for callers.
pub trait DidResolver: Send + Sync {
    fn resolve<'a>(&'a self, did: &'a str) -> BoxFuture<'a, Result<Address, DidAuthError>>;
}

/// DID registry contract adapter over a JSON-RPC endpoint.
pub struct DidRegistry {
    contract: Contract<Provider<Http>>,
}

impl DidRegistry {
    /// Connects to the registry contract at `contract_address` through the
    /// RPC endpoint.
    ///
    /// # Errors
    /// [`DidAuthError::RegistryUnavailable`] if the endpoint URL, contract
    /// address, or bundled ABI is invalid.
    pub fn new(rpc_url: &str, contract_address: &str) -> Result<Self, DidAuthError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| DidAuthError::RegistryUnavailable(format!("invalid RPC endpoint: {e}")))?;
        let abi = Abi::load(&include_bytes!("abi/DidRegistry.json")[..])
            .map_err(|e| DidAuthError::RegistryUnavailable(format!("registry ABI: {e}")))?;
        let address: Address = contract_address.parse().map_err(|e| {
            DidAuthError::RegistryUnavailable(format!("invalid registry address: {e}"))
        })?;
        Ok(Self {
            contract: Contract::new(address, abi, Arc::new(provider)),
        })
    }
}

impl DidResolver for DidRegistry {
    fn resolve<'a>(&'a self, did: &'a str) -> BoxFuture<'a, Result<Address, DidAuthError>> {
        Box::pin(async move {
            let identity = address_from_did(did)?;
            let owner: Address = self
                .contract
                .method::<_, Address>("identityOwner", identity)
                .map_err(|e| DidAuthError::RegistryUnavailable(e.to_string()))?
                .call()
                .await
                .map_err(|e| DidAuthError::RegistryUnavailable(e.to_string()))?;
            if owner == Address::zero() {
                return Err(DidAuthError::DidNotFound(did.to_string()));
            }
            log::debug!("resolved {did} to owner {owner:?}");
            Ok(owner)
        })
    }
}
