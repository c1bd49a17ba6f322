//! Error types for Ethereum signing and key derivation.

use stark_crypto::CryptoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// No account connected, or the wallet provider failed.
    #[error("Ethereum signer unavailable: {message}")]
    SignerUnavailable { message: String },

    #[error("STARK key derivation failed: {message}")]
    Derivation { message: String },

    #[error("Invalid Ethereum key: {message}")]
    InvalidKey { message: String },

    #[error("Signing error: {message}")]
    Signing { message: String },

    /// Signature bytes that cannot be parsed or recovered.
    #[error("Invalid signature: {message}")]
    InvalidSignature { message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

pub type Result<T> = std::result::Result<T, AuthError>;
