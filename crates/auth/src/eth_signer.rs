//! Ethereum signer abstraction.
//!
//! The exchange needs an Ethereum account for two things: deriving the STARK
//! key and authenticating onboarding / API-key requests. Both go through
//! [`EthSigner`], implemented locally by [`crate::LocalKeySigner`] and
//! remotely by [`crate::DelegatedSigner`].

use alloy_primitives::{keccak256, Address, Signature, B256, U256};
use async_trait::async_trait;
use std::fmt;

use crate::error::{AuthError, Result};
use crate::typed_data::TypedDataMessage;

/// Length of a typed signature: `r (32) || s (32) || v (1) || type (1)`.
pub const TYPED_SIGNATURE_LEN: usize = 66;

/// Personal-message prefix for a 32-byte payload, length in decimal.
pub const PERSONAL_MESSAGE_PREFIX_DECIMAL: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Personal-message prefix for a 32-byte payload, length as a single byte.
pub const PERSONAL_MESSAGE_PREFIX_HEXADECIMAL: &[u8] = b"\x19Ethereum Signed Message:\n\x20";

/// How the signed payload was prefixed before hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SignatureType {
    /// Hash signed as is (EIP-712).
    NoPrepend = 0,
    /// Personal-sign prefix with a decimal length.
    Decimal = 1,
    /// Personal-sign prefix with a hexadecimal length.
    Hexadecimal = 2,
}

impl SignatureType {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

/// How an [`EthSigner`] signs a [`TypedDataMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SigningMethod {
    /// `eth_signTypedData_v4` over the EIP-712 digest.
    #[default]
    TypedData,
    /// `personal_sign` over the EIP-712 digest.
    Personal,
}

impl TryFrom<u8> for SignatureType {
    type Error = AuthError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(SignatureType::NoPrepend),
            1 => Ok(SignatureType::Decimal),
            2 => Ok(SignatureType::Hexadecimal),
            other => Err(AuthError::InvalidSignature {
                message: format!("unknown signature type {other}"),
            }),
        }
    }
}

/// Ethereum signature with a trailing signature-type byte.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypedSignature {
    bytes: [u8; TYPED_SIGNATURE_LEN],
}

impl TypedSignature {
    /// Build from a recoverable signature; `v` is written as `27 + parity`.
    pub fn from_signature(signature: &Signature, signature_type: SignatureType) -> Self {
        let mut bytes = [0u8; TYPED_SIGNATURE_LEN];
        bytes[..32].copy_from_slice(&signature.r().to_be_bytes::<32>());
        bytes[32..64].copy_from_slice(&signature.s().to_be_bytes::<32>());
        bytes[64] = 27 + signature.v() as u8;
        bytes[65] = signature_type.as_u8();
        Self { bytes }
    }

    /// Parse a 65-byte `r || s || v` signature as returned by wallets.
    /// `v` may be `0/1` or `27/28`.
    pub fn from_rsv_bytes(raw: &[u8], signature_type: SignatureType) -> Result<Self> {
        if raw.len() != 65 {
            return Err(AuthError::InvalidSignature {
                message: format!("expected 65 signature bytes, got {}", raw.len()),
            });
        }
        let mut bytes = [0u8; TYPED_SIGNATURE_LEN];
        bytes[..64].copy_from_slice(&raw[..64]);
        bytes[64] = match raw[64] {
            0 | 27 => 27,
            1 | 28 => 28,
            other => {
                return Err(AuthError::InvalidSignature {
                    message: format!("invalid recovery id {other}"),
                })
            }
        };
        bytes[65] = signature_type.as_u8();
        Ok(Self { bytes })
    }

    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        if raw.len() != TYPED_SIGNATURE_LEN {
            return Err(AuthError::InvalidSignature {
                message: format!(
                    "expected {TYPED_SIGNATURE_LEN} typed signature bytes, got {}",
                    raw.len()
                ),
            });
        }
        let signature_type = SignatureType::try_from(raw[65])?;
        Self::from_rsv_bytes(&raw[..65], signature_type)
    }

    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let digits = hex_str.trim().trim_start_matches("0x");
        let raw = hex::decode(digits).map_err(|e| AuthError::InvalidSignature {
            message: e.to_string(),
        })?;
        Self::from_bytes(&raw)
    }

    pub fn as_bytes(&self) -> &[u8; TYPED_SIGNATURE_LEN] {
        &self.bytes
    }

    pub fn r(&self) -> U256 {
        U256::from_be_slice(&self.bytes[..32])
    }

    pub fn s(&self) -> U256 {
        U256::from_be_slice(&self.bytes[32..64])
    }

    pub fn v(&self) -> u8 {
        self.bytes[64]
    }

    pub fn signature_type(&self) -> Result<SignatureType> {
        SignatureType::try_from(self.bytes[65])
    }

    /// The recoverable signature without the type byte.
    pub fn to_signature(&self) -> Signature {
        Signature::new(self.r(), self.s(), self.v() == 28)
    }

    /// `0x`-prefixed, 132 hex digits.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }
}

impl fmt::Debug for TypedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedSignature").field(&self.to_hex()).finish()
    }
}

impl fmt::Display for TypedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Anything able to sign typed data for an Ethereum account.
#[async_trait]
pub trait EthSigner: Send + Sync {
    /// Address of the signing account.
    async fn address(&self) -> Result<Address>;

    /// Sign typed data, returning a [`SignatureType::NoPrepend`] signature.
    async fn sign_typed_data(&self, message: &TypedDataMessage) -> Result<TypedSignature>;

    /// Sign the message's EIP-712 digest as a personal message, returning a
    /// [`SignatureType::Decimal`] signature.
    async fn sign_personal_message(&self, message: &TypedDataMessage) -> Result<TypedSignature>;

    async fn sign(
        &self,
        message: &TypedDataMessage,
        method: SigningMethod,
    ) -> Result<TypedSignature> {
        match method {
            SigningMethod::TypedData => self.sign_typed_data(message).await,
            SigningMethod::Personal => self.sign_personal_message(message).await,
        }
    }
}

/// The digest actually signed for `hash` under `signature_type`.
pub fn prefixed_hash(hash: &B256, signature_type: SignatureType) -> B256 {
    let prefix = match signature_type {
        SignatureType::NoPrepend => return *hash,
        SignatureType::Decimal => PERSONAL_MESSAGE_PREFIX_DECIMAL,
        SignatureType::Hexadecimal => PERSONAL_MESSAGE_PREFIX_HEXADECIMAL,
    };
    let mut data = Vec::with_capacity(prefix.len() + 32);
    data.extend_from_slice(prefix);
    data.extend_from_slice(hash.as_slice());
    keccak256(&data)
}

/// Recover the address that produced `signature` over `hash`, applying the
/// prefix named by the signature's type byte.
pub fn recover_hash_signer(hash: &B256, signature: &TypedSignature) -> Result<Address> {
    let digest = prefixed_hash(hash, signature.signature_type()?);
    signature
        .to_signature()
        .recover_address_from_prehash(&digest)
        .map_err(|e| AuthError::InvalidSignature {
            message: e.to_string(),
        })
}

/// Recover the address that produced `signature` over `message`.
pub fn recover_signer(message: &TypedDataMessage, signature: &TypedSignature) -> Result<Address> {
    recover_hash_signer(&message.signing_hash(), signature)
}
