//! Ethereum-signed actions: onboarding, STARK key derivation and API keys.

use alloy_primitives::Address;

use crate::error::{AuthError, Result};
use crate::eth_signer::{recover_signer, EthSigner, SigningMethod, TypedSignature};
use crate::typed_data::{Eip712Domain, TypedDataMessage, PRIMARY_TYPE};

pub const MAINNET_CHAIN_ID: u64 = 1;

/// Origin bound into mainnet onboarding messages.
pub const ONLY_SIGN_ON_DOMAIN_MAINNET: &str = "https://trade.dydx.exchange";

/// Fixed actions signed during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OnboardingAction {
    /// Signed to derive the STARK key; never sent to the exchange.
    StarkKey,
    /// Signed to register the account.
    Onboarding,
}

impl OnboardingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingAction::StarkKey => "dYdX STARK Key",
            OnboardingAction::Onboarding => "dYdX Onboarding",
        }
    }

    /// The typed-data message for `chain_id`. Mainnet binds the trading origin.
    pub fn message(&self, chain_id: u64) -> TypedDataMessage {
        let message = TypedDataMessage::new(Eip712Domain::dydx(chain_id), PRIMARY_TYPE)
            .with_field("action", self.as_str());
        if chain_id == MAINNET_CHAIN_ID {
            message.with_field("onlySignOn", ONLY_SIGN_ON_DOMAIN_MAINNET)
        } else {
            message
        }
    }

    pub async fn sign(&self, signer: &dyn EthSigner, chain_id: u64) -> Result<TypedSignature> {
        self.sign_with(signer, chain_id, SigningMethod::TypedData).await
    }

    pub async fn sign_with(
        &self,
        signer: &dyn EthSigner,
        chain_id: u64,
        method: SigningMethod,
    ) -> Result<TypedSignature> {
        signer.sign(&self.message(chain_id), method).await
    }

    /// Whether `signature` was produced by `address` for this action.
    pub fn verify(&self, chain_id: u64, address: Address, signature: &TypedSignature) -> Result<bool> {
        verify_message(&self.message(chain_id), address, signature)
    }
}

/// Request authenticated by the Ethereum key (API-key management).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyAction {
    pub method: String,
    pub request_path: String,
    pub body: String,
    /// ISO-8601 timestamp, signed verbatim.
    pub timestamp: String,
}

impl ApiKeyAction {
    pub fn new(
        method: impl Into<String>,
        request_path: impl Into<String>,
        body: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Result<Self> {
        let method = method.into().to_ascii_uppercase();
        if !matches!(method.as_str(), "GET" | "POST" | "PUT" | "DELETE") {
            return Err(AuthError::Signing {
                message: format!("unsupported request method {method}"),
            });
        }
        Ok(Self {
            method,
            request_path: request_path.into(),
            body: body.into(),
            timestamp: timestamp.into(),
        })
    }

    pub fn message(&self, chain_id: u64) -> TypedDataMessage {
        TypedDataMessage::new(Eip712Domain::dydx(chain_id), PRIMARY_TYPE)
            .with_field("method", self.method.as_str())
            .with_field("requestPath", self.request_path.as_str())
            .with_field("body", self.body.as_str())
            .with_field("timestamp", self.timestamp.as_str())
    }

    pub async fn sign(&self, signer: &dyn EthSigner, chain_id: u64) -> Result<TypedSignature> {
        signer.sign_typed_data(&self.message(chain_id)).await
    }

    pub fn verify(&self, chain_id: u64, address: Address, signature: &TypedSignature) -> Result<bool> {
        verify_message(&self.message(chain_id), address, signature)
    }
}

fn verify_message(
    message: &TypedDataMessage,
    address: Address,
    signature: &TypedSignature,
) -> Result<bool> {
    Ok(recover_signer(message, signature)? == address)
}
