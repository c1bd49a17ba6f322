//! Ethereum signer backed by an in-process private key.
//!
//! Provides wallet loading from environment variables and EIP-712 or
//! personal-message signing for onboarding, API-key requests and STARK key
//! derivation.

use alloy_primitives::Address;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use std::str::FromStr;

use crate::error::{AuthError, Result};
use crate::eth_signer::{EthSigner, SignatureType, TypedSignature};
use crate::typed_data::TypedDataMessage;

/// Environment variable holding the Ethereum private key.
pub const ETH_PRIVATE_KEY_ENV: &str = "ETH_PRIVATE_KEY";

/// A signer holding the Ethereum private key locally.
///
/// Signing is deterministic (RFC 6979), so the same message always yields
/// the same signature.
#[derive(Clone)]
pub struct LocalKeySigner {
    signer: PrivateKeySigner,
    address: Address,
}

impl LocalKeySigner {
    /// Load the key from the `ETH_PRIVATE_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is not set or the key is invalid.
    pub fn from_env() -> Result<Self> {
        let private_key =
            std::env::var(ETH_PRIVATE_KEY_ENV).map_err(|_| AuthError::InvalidKey {
                message: format!("{ETH_PRIVATE_KEY_ENV} environment variable not set"),
            })?;

        Self::from_private_key(&private_key)
    }

    /// Create a signer from a hex-encoded private key.
    ///
    /// # Arguments
    ///
    /// * `key` - A 64-character hex string, optionally prefixed with "0x"
    pub fn from_private_key(key: &str) -> Result<Self> {
        let key_clean = key.trim().trim_start_matches("0x");

        let signer = PrivateKeySigner::from_str(key_clean).map_err(|_| AuthError::InvalidKey {
            message: "Invalid private key format - expected 64 hex characters".to_string(),
        })?;

        Ok(Self::from_signer(signer))
    }

    pub fn from_signer(signer: PrivateKeySigner) -> Self {
        let address = signer.address();
        Self { signer, address }
    }

    /// Get the signer's Ethereum address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Get the address as a checksummed hex string.
    pub fn address_string(&self) -> String {
        format!("{}", self.address)
    }
}

#[async_trait]
impl EthSigner for LocalKeySigner {
    async fn address(&self) -> Result<Address> {
        Ok(self.address)
    }

    async fn sign_typed_data(&self, message: &TypedDataMessage) -> Result<TypedSignature> {
        let digest = message.signing_hash();

        let signature = self
            .signer
            .sign_hash(&digest)
            .await
            .map_err(|e| AuthError::Signing {
                message: format!("Failed to sign typed data: {e}"),
            })?;

        tracing::debug!(
            address = %self.address,
            chain_id = message.chain_id(),
            "signed typed data"
        );

        Ok(TypedSignature::from_signature(
            &signature,
            SignatureType::NoPrepend,
        ))
    }

    async fn sign_personal_message(&self, message: &TypedDataMessage) -> Result<TypedSignature> {
        let digest = message.signing_hash();

        // EIP-191: keccak256("\x19Ethereum Signed Message:\n32" || digest)
        let signature = self
            .signer
            .sign_message(digest.as_slice())
            .await
            .map_err(|e| AuthError::Signing {
                message: format!("Failed to sign personal message: {e}"),
            })?;

        Ok(TypedSignature::from_signature(
            &signature,
            SignatureType::Decimal,
        ))
    }
}

impl std::fmt::Debug for LocalKeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose the private key in debug output
        f.debug_struct("LocalKeySigner")
            .field("address", &self.address_string())
            .finish()
    }
}
