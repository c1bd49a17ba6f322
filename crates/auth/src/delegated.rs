//! Ethereum signer that delegates to an external wallet provider.
//!
//! The provider is anything that speaks the JSON-RPC methods the exchange
//! needs: `eth_accounts`, `eth_signTypedData_v4` and `personal_sign`.
//! Transport is the provider's concern.

use alloy_primitives::Address;
use async_trait::async_trait;
use tracing::warn;

use crate::error::{AuthError, Result};
use crate::eth_signer::{recover_signer, EthSigner, SignatureType, TypedSignature};
use crate::typed_data::TypedDataMessage;

/// Minimal wallet JSON-RPC surface.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// `eth_accounts`: connected account addresses, hex encoded.
    async fn accounts(&self) -> anyhow::Result<Vec<String>>;

    /// `eth_signTypedData_v4`: returns the 65-byte signature as hex.
    async fn sign_typed_data_v4(&self, address: String, typed_data: String)
        -> anyhow::Result<String>;

    /// `personal_sign`: `message` is `0x` hex; returns the 65-byte signature
    /// as hex.
    async fn personal_sign(&self, address: String, message: String) -> anyhow::Result<String>;
}

/// Signs through a [`WalletProvider`].
///
/// Uses the first connected account unless one is pinned with
/// [`DelegatedSigner::with_account`].
#[derive(Debug)]
pub struct DelegatedSigner<P> {
    provider: P,
    account: Option<Address>,
}

impl<P: WalletProvider> DelegatedSigner<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            account: None,
        }
    }

    pub fn with_account(mut self, account: Address) -> Self {
        self.account = Some(account);
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    async fn resolve_account(&self) -> Result<Address> {
        if let Some(account) = self.account {
            return Ok(account);
        }

        let accounts = self.provider.accounts().await.map_err(|e| {
            warn!(error = %e, "wallet provider failed to list accounts");
            AuthError::SignerUnavailable {
                message: format!("eth_accounts failed: {e}"),
            }
        })?;

        let first = accounts
            .first()
            .ok_or_else(|| AuthError::SignerUnavailable {
                message: "no account connected".to_string(),
            })?;

        first.parse::<Address>().map_err(|e| AuthError::SignerUnavailable {
            message: format!("provider returned an invalid address {first}: {e}"),
        })
    }

    /// Parse the provider's signature and check it recovers to `account`.
    fn checked_signature(
        message: &TypedDataMessage,
        account: Address,
        raw_hex: &str,
        signature_type: SignatureType,
    ) -> Result<TypedSignature> {
        let raw = hex::decode(raw_hex.trim().trim_start_matches("0x")).map_err(|e| {
            AuthError::InvalidSignature {
                message: format!("provider returned non-hex signature: {e}"),
            }
        })?;
        let signature = TypedSignature::from_rsv_bytes(&raw, signature_type)?;

        let recovered = recover_signer(message, &signature)?;
        if recovered != account {
            return Err(AuthError::InvalidSignature {
                message: format!("signature recovers to {recovered}, expected {account}"),
            });
        }

        Ok(signature)
    }
}

#[async_trait]
impl<P: WalletProvider> EthSigner for DelegatedSigner<P> {
    async fn address(&self) -> Result<Address> {
        self.resolve_account().await
    }

    async fn sign_typed_data(&self, message: &TypedDataMessage) -> Result<TypedSignature> {
        let account = self.resolve_account().await?;
        let payload = message.to_json_string()?;

        let raw_hex = self
            .provider
            .sign_typed_data_v4(format!("{account:#x}"), payload)
            .await
            .map_err(|e| {
                warn!(account = %account, error = %e, "wallet provider failed to sign");
                AuthError::SignerUnavailable {
                    message: format!("eth_signTypedData_v4 failed: {e}"),
                }
            })?;

        Self::checked_signature(message, account, &raw_hex, SignatureType::NoPrepend)
    }

    async fn sign_personal_message(&self, message: &TypedDataMessage) -> Result<TypedSignature> {
        let account = self.resolve_account().await?;
        let payload = format!("0x{}", hex::encode(message.signing_hash()));

        let raw_hex = self
            .provider
            .personal_sign(format!("{account:#x}"), payload)
            .await
            .map_err(|e| {
                warn!(account = %account, error = %e, "wallet provider failed to sign");
                AuthError::SignerUnavailable {
                    message: format!("personal_sign failed: {e}"),
                }
            })?;

        Self::checked_signature(message, account, &raw_hex, SignatureType::Decimal)
    }
}
