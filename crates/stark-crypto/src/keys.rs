//! STARK key pairs.

use alloy_primitives::{keccak256, U256};
use rand::Rng;
use std::fmt;

use crate::curve::{CurvePoint, STARK_CURVE};
use crate::ecdsa::{self, StarkSignature};
use crate::error::{CryptoError, Result};
use crate::field::{parse_hex_u256, to_fixed_hex, to_minimal_hex, FieldElement, EC_ORDER};

/// A STARK private scalar in `[1, n - 1]`.
#[derive(Clone, PartialEq, Eq)]
pub struct StarkPrivateKey(U256);

impl StarkPrivateKey {
    pub fn new(scalar: U256) -> Result<Self> {
        if scalar.is_zero() || scalar >= EC_ORDER {
            return Err(CryptoError::InvalidScalar {
                message: "private key must be in [1, n-1]".to_string(),
            });
        }
        Ok(Self(scalar))
    }

    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let scalar = parse_hex_u256(hex_str).map_err(|_| CryptoError::InvalidScalar {
            message: "private key is not valid hex".to_string(),
        })?;
        Self::new(scalar)
    }

    /// Derive a key from arbitrary bytes: `keccak256(data) >> 5`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::new(U256::from_be_bytes(keccak256(data).0) >> 5)
    }

    /// Random key from the thread-local generator.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        loop {
            let bytes: [u8; 32] = rng.gen();
            let candidate = U256::from_be_bytes(bytes) >> 4;
            if let Ok(key) = Self::new(candidate) {
                return key;
            }
        }
    }

    pub fn secret_scalar(&self) -> U256 {
        self.0
    }

    /// `0x`-prefixed hex without leading zeros.
    pub fn to_hex(&self) -> String {
        to_minimal_hex(self.0)
    }

    pub fn to_fixed_hex(&self) -> String {
        to_fixed_hex(self.0)
    }

    pub fn public_key(&self) -> Result<StarkPublicKey> {
        match STARK_CURVE.mul_generator(self.0)? {
            CurvePoint::Affine { x, y } => Ok(StarkPublicKey {
                x,
                y,
                x_only: false,
            }),
            CurvePoint::Infinity => Err(CryptoError::InvalidScalar {
                message: "private key maps to the point at infinity".to_string(),
            }),
        }
    }

    pub fn sign(&self, msg_hash: &FieldElement) -> Result<StarkSignature> {
        ecdsa::sign(msg_hash, self)
    }

    pub fn sign_with_seed(&self, msg_hash: &FieldElement, seed: U256) -> Result<StarkSignature> {
        ecdsa::sign_with_seed(msg_hash, self, seed)
    }
}

impl fmt::Debug for StarkPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StarkPrivateKey([REDACTED])")
    }
}

/// Derive the private scalar for arbitrary seed bytes.
pub fn private_key_from_bytes(data: &[u8]) -> Result<StarkPrivateKey> {
    StarkPrivateKey::from_bytes(data)
}

/// A STARK public key. When built from the x-coordinate alone, verification
/// accepts signatures for either of the two matching points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarkPublicKey {
    x: U256,
    y: U256,
    x_only: bool,
}

impl StarkPublicKey {
    /// Build from the x-coordinate (the exchange's "STARK key").
    pub fn from_x(x: U256) -> Result<Self> {
        match STARK_CURVE.lift_x(x)? {
            CurvePoint::Affine { x, y } => Ok(Self { x, y, x_only: true }),
            CurvePoint::Infinity => Err(CryptoError::InvalidPoint {
                message: "x-coordinate lifts to infinity".to_string(),
            }),
        }
    }

    pub fn from_hex(x_hex: &str) -> Result<Self> {
        Self::from_x(parse_hex_u256(x_hex)?)
    }

    pub fn from_coordinates(x: U256, y: U256) -> Result<Self> {
        let point = CurvePoint::Affine { x, y };
        if !STARK_CURVE.is_on_curve(&point) {
            return Err(CryptoError::InvalidPoint {
                message: format!("(0x{x:x}, 0x{y:x}) is not on the curve"),
            });
        }
        Ok(Self {
            x,
            y,
            x_only: false,
        })
    }

    pub fn from_coordinates_hex(x_hex: &str, y_hex: &str) -> Result<Self> {
        Self::from_coordinates(parse_hex_u256(x_hex)?, parse_hex_u256(y_hex)?)
    }

    pub fn x(&self) -> U256 {
        self.x
    }

    pub fn y(&self) -> U256 {
        self.y
    }

    /// `0x`-prefixed x-coordinate without leading zeros.
    pub fn to_hex(&self) -> String {
        to_minimal_hex(self.x)
    }

    pub fn y_hex(&self) -> String {
        to_minimal_hex(self.y)
    }

    pub fn point(&self) -> CurvePoint {
        CurvePoint::Affine {
            x: self.x,
            y: self.y,
        }
    }

    /// Points a signature may have been produced for.
    pub(crate) fn candidate_points(&self) -> Vec<CurvePoint> {
        let point = self.point();
        if self.x_only {
            vec![point, STARK_CURVE.negate(&point)]
        } else {
            vec![point]
        }
    }

    pub fn verify(&self, msg_hash: &FieldElement, signature: &StarkSignature) -> Result<bool> {
        ecdsa::verify(msg_hash, signature, self)
    }
}

impl fmt::Display for StarkPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
