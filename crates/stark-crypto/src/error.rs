//! Error types for STARK curve operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid field operation, e.g. inverting zero.
    #[error("Arithmetic error: {message}")]
    Arithmetic { message: String },

    /// Private scalar outside `[1, n-1]`.
    #[error("Invalid private scalar: {message}")]
    InvalidScalar { message: String },

    /// Signature components out of range or unusable public key.
    #[error("Malformed signature: {message}")]
    MalformedSignature { message: String },

    /// Coordinates that do not satisfy the curve equation.
    #[error("Invalid curve point: {message}")]
    InvalidPoint { message: String },

    #[error("Invalid hex: {message}")]
    InvalidHex { message: String },

    /// Integer does not fit the expected range (field element, digest).
    #[error("Value out of range: {message}")]
    OutOfRange { message: String },
}

impl CryptoError {
    pub(crate) fn arithmetic(message: impl Into<String>) -> Self {
        CryptoError::Arithmetic {
            message: message.into(),
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        CryptoError::MalformedSignature {
            message: message.into(),
        }
    }

    pub(crate) fn out_of_range(message: impl Into<String>) -> Self {
        CryptoError::OutOfRange {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CryptoError>;
