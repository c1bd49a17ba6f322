//! Ethereum-side authentication
//!
//! Ethereum signers (local key or delegated wallet), EIP-712 typed data,
//! onboarding and API-key actions, and STARK key derivation.

pub mod delegated;
pub mod error;
pub mod eth_signer;
pub mod key_derivation;
pub mod local;
pub mod onboarding;
pub mod typed_data;

pub use delegated::{DelegatedSigner, WalletProvider};
pub use error::{AuthError, Result};
pub use eth_signer::{
    prefixed_hash, recover_hash_signer, recover_signer, EthSigner, SignatureType, SigningMethod,
    TypedSignature,
};
pub use key_derivation::{
    derive_stark_key_pair, derive_stark_private_key, private_key_from_signature, StarkKeyPair,
};
pub use local::LocalKeySigner;
pub use onboarding::{ApiKeyAction, OnboardingAction, ONLY_SIGN_ON_DOMAIN_MAINNET};
pub use typed_data::{Eip712Domain, TypedDataMessage};
