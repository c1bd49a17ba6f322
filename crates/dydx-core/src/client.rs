//! Capability-gated client.
//!
//! Every module is built once in [`Client::new`]. A module whose credentials
//! are missing is still represented; its accessor returns
//! [`Error::CapabilityUnavailable`] naming what is missing.

use std::fmt;
use std::sync::Arc;

use alloy_primitives::Address;
use auth::{
    derive_stark_key_pair, ApiKeyAction, EthSigner, LocalKeySigner, OnboardingAction,
    SigningMethod, StarkKeyPair, TypedSignature,
};
use stark_crypto::{StarkPrivateKey, StarkPublicKey, StarkSignature};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::constants::NetworkId;
use crate::signing::{
    ApiRequestParams, OrderParams, Signable, SignableApiRequest, SignableOrder,
    SignableTransfer, SignableWithdrawal, TransferParams, WithdrawalParams,
};
use crate::{Error, Result};

const MISSING_API_KEY: &str = "API private key";
const MISSING_STARK_KEY: &str = "STARK private key";
const MISSING_ETH_SIGNER: &str = "Ethereum signer";

/// Entry point bundling every signing capability.
pub struct Client {
    host: String,
    network_id: NetworkId,
    api_timeout_ms: u64,
    public: Public,
    private: Option<Private>,
    onboarding: Option<Onboarding>,
    api_keys: Option<ApiKeys>,
}

impl Client {
    /// Build a client; an Ethereum key in the credentials becomes a
    /// [`LocalKeySigner`].
    #[allow(clippy::result_large_err)]
    pub fn new(config: ClientConfig) -> Result<Self> {
        let eth_signer: Option<Arc<dyn EthSigner>> = match &config.credentials.eth_private_key {
            Some(key) => Some(Arc::new(LocalKeySigner::from_private_key(key)?)),
            None => None,
        };
        Self::build(config, eth_signer)
    }

    /// Build a client around an externally managed Ethereum signer, e.g. a
    /// [`auth::DelegatedSigner`] backed by a browser wallet.
    #[allow(clippy::result_large_err)]
    pub fn with_eth_signer(config: ClientConfig, eth_signer: Arc<dyn EthSigner>) -> Result<Self> {
        Self::build(config, Some(eth_signer))
    }

    fn build(config: ClientConfig, eth_signer: Option<Arc<dyn EthSigner>>) -> Result<Self> {
        let network_id = config.network_id;
        let credentials = &config.credentials;

        let stark_key = credentials
            .stark_private_key
            .as_deref()
            .map(StarkPrivateKey::from_hex)
            .transpose()?;
        let api_key = credentials
            .api_private_key
            .as_deref()
            .map(StarkPrivateKey::from_hex)
            .transpose()?;

        let private = api_key.map(|api_key| Private {
            network_id,
            api_key,
            stark_key,
        });
        let onboarding = eth_signer.clone().map(|signer| Onboarding { signer, network_id });
        let api_keys = eth_signer.map(|signer| ApiKeys { signer, network_id });

        info!(
            host = %config.host,
            network = %network_id,
            private = private.is_some(),
            eth_signer = onboarding.is_some(),
            "dYdX client initialized"
        );

        Ok(Self {
            public: Public { network_id },
            host: config.host,
            network_id,
            api_timeout_ms: config.api_timeout_ms,
            private,
            onboarding,
            api_keys,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }

    pub fn api_timeout_ms(&self) -> u64 {
        self.api_timeout_ms
    }

    pub fn public(&self) -> &Public {
        &self.public
    }

    pub fn private(&self) -> Result<&Private> {
        self.private.as_ref().ok_or(Error::CapabilityUnavailable {
            capability: "private",
            missing: MISSING_API_KEY,
        })
    }

    pub fn onboarding(&self) -> Result<&Onboarding> {
        self.onboarding.as_ref().ok_or(Error::CapabilityUnavailable {
            capability: "onboarding",
            missing: MISSING_ETH_SIGNER,
        })
    }

    pub fn api_keys(&self) -> Result<&ApiKeys> {
        self.api_keys.as_ref().ok_or(Error::CapabilityUnavailable {
            capability: "api_keys",
            missing: MISSING_ETH_SIGNER,
        })
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("host", &self.host)
            .field("network_id", &self.network_id)
            .field("api_timeout_ms", &self.api_timeout_ms)
            .field("private", &self.private.is_some())
            .field("onboarding", &self.onboarding.is_some())
            .field("api_keys", &self.api_keys.is_some())
            .finish()
    }
}

/// Operations that need no credentials.
#[derive(Debug, Clone)]
pub struct Public {
    network_id: NetworkId,
}

impl Public {
    /// Check a STARK signature over any signable action against a STARK key
    /// (x-coordinate hex).
    pub fn verify_signature<S: Signable>(
        &self,
        action: &S,
        stark_public_key: &str,
        signature: &str,
    ) -> Result<bool> {
        let public_key = StarkPublicKey::from_hex(stark_public_key)?;
        let signature = StarkSignature::from_hex(signature)?;
        action.verify(&public_key, &signature)
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }
}

/// STARK-signed account operations.
#[derive(Debug, Clone)]
pub struct Private {
    network_id: NetworkId,
    api_key: StarkPrivateKey,
    stark_key: Option<StarkPrivateKey>,
}

impl Private {
    /// Sign an API request with the API key.
    pub fn sign_request(&self, params: &ApiRequestParams) -> Result<StarkSignature> {
        SignableApiRequest::from_params(params)?.sign(&self.api_key)
    }

    pub fn api_public_key(&self) -> Result<StarkPublicKey> {
        Ok(self.api_key.public_key()?)
    }

    pub fn sign_order(&self, params: &OrderParams) -> Result<StarkSignature> {
        self.check_network(params.network_id)?;
        let order = SignableOrder::from_params(params)?;
        debug!(market = %params.market, side = %params.side, "signing order");
        order.sign(self.stark_key("order signing")?)
    }

    pub fn sign_withdrawal(&self, params: &WithdrawalParams) -> Result<StarkSignature> {
        self.check_network(params.network_id)?;
        SignableWithdrawal::from_params(params)?.sign(self.stark_key("withdrawal signing")?)
    }

    pub fn sign_transfer(&self, params: &TransferParams) -> Result<StarkSignature> {
        self.check_network(params.network_id)?;
        SignableTransfer::from_params(params)?.sign(self.stark_key("transfer signing")?)
    }

    pub fn stark_public_key(&self) -> Result<StarkPublicKey> {
        Ok(self.stark_key("STARK public key")?.public_key()?)
    }

    fn stark_key(&self, capability: &'static str) -> Result<&StarkPrivateKey> {
        self.stark_key.as_ref().ok_or(Error::CapabilityUnavailable {
            capability,
            missing: MISSING_STARK_KEY,
        })
    }

    fn check_network(&self, network_id: NetworkId) -> Result<()> {
        if network_id != self.network_id {
            return Err(Error::Config {
                message: format!(
                    "action targets network {network_id} but the client is configured for {}",
                    self.network_id
                ),
            });
        }
        Ok(())
    }
}

/// Onboarding and STARK key recovery through the Ethereum signer.
#[derive(Clone)]
pub struct Onboarding {
    signer: Arc<dyn EthSigner>,
    network_id: NetworkId,
}

impl Onboarding {
    pub async fn address(&self) -> Result<Address> {
        Ok(self.signer.address().await?)
    }

    /// Signature submitted with the onboarding request.
    pub async fn sign_onboarding(&self) -> Result<TypedSignature> {
        self.sign_onboarding_with(SigningMethod::TypedData).await
    }

    /// Onboarding signature for wallets that only support `personal_sign`.
    pub async fn sign_onboarding_with(&self, method: SigningMethod) -> Result<TypedSignature> {
        Ok(OnboardingAction::Onboarding
            .sign_with(self.signer.as_ref(), self.network_id.chain_id(), method)
            .await?)
    }

    /// Derive the account's STARK key pair; deterministic per account and
    /// network.
    pub async fn derive_stark_key(&self) -> Result<StarkKeyPair> {
        Ok(derive_stark_key_pair(self.signer.as_ref(), self.network_id.chain_id()).await?)
    }

    pub fn verify_onboarding(&self, address: Address, signature: &TypedSignature) -> Result<bool> {
        Ok(OnboardingAction::Onboarding.verify(self.network_id.chain_id(), address, signature)?)
    }
}

/// API-key management requests signed by the Ethereum key.
#[derive(Clone)]
pub struct ApiKeys {
    signer: Arc<dyn EthSigner>,
    network_id: NetworkId,
}

impl ApiKeys {
    pub async fn sign_request(
        &self,
        method: &str,
        request_path: &str,
        body: &str,
        iso_timestamp: &str,
    ) -> Result<TypedSignature> {
        let action = ApiKeyAction::new(method, request_path, body, iso_timestamp)?;
        Ok(action
            .sign(self.signer.as_ref(), self.network_id.chain_id())
            .await?)
    }

    pub fn verify_request(
        &self,
        action: &ApiKeyAction,
        address: Address,
        signature: &TypedSignature,
    ) -> Result<bool> {
        Ok(action.verify(self.network_id.chain_id(), address, signature)?)
    }
}
