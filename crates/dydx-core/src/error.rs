//! Error types for the exchange signing core.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A value does not fit the field layout (width, range, precision).
    #[error("Encoding error: {message}")]
    Encoding { message: String },

    /// A client module was accessed without the credentials it needs.
    #[error("{capability} is unavailable: missing {missing}")]
    CapabilityUnavailable {
        capability: &'static str,
        missing: &'static str,
    },

    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] config::ConfigError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Crypto(#[from] stark_crypto::CryptoError),

    #[error(transparent)]
    Auth(#[from] auth::AuthError),
}

impl Error {
    pub(crate) fn encoding(message: impl Into<String>) -> Self {
        Error::Encoding {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
