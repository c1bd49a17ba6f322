//! ECDSA over the STARK curve.

use alloy_primitives::{uint, U256};
use std::fmt;

use crate::curve::{CurvePoint, STARK_CURVE};
use crate::error::{CryptoError, Result};
use crate::field::{parse_hex_u256, to_fixed_hex, FieldElement, EC_ORDER, STARK_SCALAR_FIELD};
use crate::keys::{StarkPrivateKey, StarkPublicKey};
use crate::rfc6979::generate_k;

/// Upper bound (exclusive) for message hashes, `r` and `w`: `2^251`.
pub const SIGNATURE_BOUND: U256 =
    uint!(0x0800000000000000000000000000000000000000000000000000000000000000_U256);

/// A STARK ECDSA signature `(r, s)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StarkSignature {
    r: U256,
    s: U256,
}

impl StarkSignature {
    pub fn new(r: U256, s: U256) -> Self {
        Self { r, s }
    }

    pub fn r(&self) -> U256 {
        self.r
    }

    pub fn s(&self) -> U256 {
        self.s
    }

    /// `r` and `s` as 64 hex digits each, no prefix.
    pub fn to_hex(&self) -> String {
        format!("{}{}", to_fixed_hex(self.r), to_fixed_hex(self.s))
    }

    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let digits = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        if digits.len() != 128 {
            return Err(CryptoError::InvalidHex {
                message: format!("signature must be 128 hex digits, got {}", digits.len()),
            });
        }
        let (r, s) = digits.split_at(64);
        Ok(Self {
            r: parse_hex_u256(r)?,
            s: parse_hex_u256(s)?,
        })
    }
}

impl fmt::Display for StarkSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn check_message_hash(msg_hash: &FieldElement) -> Result<U256> {
    let z = msg_hash.as_u256();
    if z >= SIGNATURE_BOUND {
        return Err(CryptoError::out_of_range("message hash must be below 2^251"));
    }
    Ok(z)
}

/// Deterministic signature of `msg_hash`.
pub fn sign(msg_hash: &FieldElement, private_key: &StarkPrivateKey) -> Result<StarkSignature> {
    sign_inner(msg_hash, private_key, None)
}

/// Signature with `seed` mixed into the nonce as extra entropy.
pub fn sign_with_seed(
    msg_hash: &FieldElement,
    private_key: &StarkPrivateKey,
    seed: U256,
) -> Result<StarkSignature> {
    sign_inner(msg_hash, private_key, Some(seed))
}

fn sign_inner(
    msg_hash: &FieldElement,
    private_key: &StarkPrivateKey,
    mut seed: Option<U256>,
) -> Result<StarkSignature> {
    let z = check_message_hash(msg_hash)?;
    let d = private_key.secret_scalar();
    let n = STARK_SCALAR_FIELD;

    loop {
        let k = generate_k(d, z, seed)?;
        seed = Some(match seed {
            None => U256::from(1u8),
            Some(s) => s + U256::from(1u8),
        });

        let r = match STARK_CURVE.mul_generator(k)?.x() {
            Some(r) if !r.is_zero() && r < SIGNATURE_BOUND => r,
            _ => {
                tracing::trace!("r out of range, retrying with next seed");
                continue;
            }
        };

        let t = n.add(z, n.mul(r, d));
        if t.is_zero() {
            continue;
        }

        let w = n.mul(k, n.inv(t)?);
        if w.is_zero() || w >= SIGNATURE_BOUND {
            tracing::trace!("w out of range, retrying with next seed");
            continue;
        }

        let s = n.inv(w)?;
        return Ok(StarkSignature { r, s });
    }
}

/// Verify against a public key. An x-only key accepts either matching point.
pub fn verify(
    msg_hash: &FieldElement,
    signature: &StarkSignature,
    public_key: &StarkPublicKey,
) -> Result<bool> {
    for point in public_key.candidate_points() {
        if verify_point(msg_hash, signature, &point)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Verify against a raw curve point.
///
/// Returns `Ok(false)` for a well-formed signature that does not match, and
/// an error when `r`, `s` or the point are out of their valid ranges.
pub fn verify_point(
    msg_hash: &FieldElement,
    signature: &StarkSignature,
    public_point: &CurvePoint,
) -> Result<bool> {
    let z = check_message_hash(msg_hash)?;
    let StarkSignature { r, s } = *signature;

    if r.is_zero() || r >= SIGNATURE_BOUND {
        return Err(CryptoError::malformed("r must be in [1, 2^251)"));
    }
    if s.is_zero() || s >= EC_ORDER {
        return Err(CryptoError::malformed("s must be in [1, n)"));
    }
    if public_point.is_infinity() || !STARK_CURVE.is_on_curve(public_point) {
        return Err(CryptoError::malformed("public key is not a point on the curve"));
    }

    let n = STARK_SCALAR_FIELD;
    let w = n.inv(s)?;
    if w >= SIGNATURE_BOUND {
        return Ok(false);
    }

    let zg = STARK_CURVE.mul_generator(z)?;
    let rq = STARK_CURVE.scalar_mul(public_point, r)?;
    let sum = STARK_CURVE.point_add(&zg, &rq)?;
    if sum.is_infinity() {
        return Ok(false);
    }
    let result = STARK_CURVE.scalar_mul(&sum, w)?;
    Ok(result.x() == Some(r))
}
