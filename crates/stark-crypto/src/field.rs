//! Prime field arithmetic for the STARK curve.
//!
//! Arithmetic is done through an explicit [`PrimeField`] context instead of
//! any ambient modulus. Two contexts exist: the base field of the curve
//! ([`STARK_PRIME_FIELD`]) and the scalar field given by the curve order
//! ([`STARK_SCALAR_FIELD`]). Both are plain `const` values, so every
//! operation is a pure function of its inputs.

use alloy_primitives::{uint, U256};
use std::fmt;

use crate::error::{CryptoError, Result};

/// Field prime `p = 2^251 + 17 * 2^192 + 1`.
pub const FIELD_PRIME: U256 =
    uint!(0x0800000000000011000000000000000000000000000000000000000000000001_U256);

/// Order `n` of the STARK curve group.
pub const EC_ORDER: U256 =
    uint!(0x0800000000000010ffffffffffffffffb781126dcae7b2321e66a241adc64d2f_U256);

/// Base field of the curve.
pub const STARK_PRIME_FIELD: PrimeField = PrimeField::new(FIELD_PRIME);

/// Scalar field (integers modulo the curve order).
pub const STARK_SCALAR_FIELD: PrimeField = PrimeField::new(EC_ORDER);

/// Arithmetic context for integers modulo a prime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimeField {
    modulus: U256,
}

impl PrimeField {
    pub const fn new(modulus: U256) -> Self {
        Self { modulus }
    }

    pub fn modulus(&self) -> U256 {
        self.modulus
    }

    /// Reduce an arbitrary integer into `[0, modulus)`.
    pub fn reduce(&self, a: U256) -> U256 {
        a.reduce_mod(self.modulus)
    }

    pub fn add(&self, a: U256, b: U256) -> U256 {
        a.add_mod(b, self.modulus)
    }

    pub fn sub(&self, a: U256, b: U256) -> U256 {
        a.add_mod(self.neg(b), self.modulus)
    }

    pub fn neg(&self, a: U256) -> U256 {
        let a = self.reduce(a);
        if a.is_zero() {
            a
        } else {
            self.modulus - a
        }
    }

    pub fn mul(&self, a: U256, b: U256) -> U256 {
        a.mul_mod(b, self.modulus)
    }

    pub fn square(&self, a: U256) -> U256 {
        a.mul_mod(a, self.modulus)
    }

    pub fn pow(&self, a: U256, exponent: U256) -> U256 {
        a.pow_mod(exponent, self.modulus)
    }

    /// Multiplicative inverse. Fails for zero.
    pub fn inv(&self, a: U256) -> Result<U256> {
        self.reduce(a)
            .inv_mod(self.modulus)
            .ok_or_else(|| CryptoError::arithmetic("inverse of zero"))
    }

    /// `a / b` in the field.
    pub fn div(&self, a: U256, b: U256) -> Result<U256> {
        Ok(self.mul(a, self.inv(b)?))
    }

    /// Whether `a` is a non-zero quadratic residue.
    pub fn is_square(&self, a: U256) -> bool {
        let a = self.reduce(a);
        if a.is_zero() {
            return true;
        }
        let half = (self.modulus - U256::from(1u8)) >> 1;
        self.pow(a, half) == U256::from(1u8)
    }

    /// Square root by Tonelli-Shanks. Returns `None` for non-residues.
    ///
    /// The smaller of the two roots is not guaranteed; callers that care
    /// about the sign pick `r` or `modulus - r` themselves.
    pub fn sqrt(&self, a: U256) -> Option<U256> {
        let one = U256::from(1u8);
        let a = self.reduce(a);
        if a.is_zero() {
            return Some(a);
        }
        if !self.is_square(a) {
            return None;
        }

        // modulus - 1 = q * 2^s with q odd
        let mut q = self.modulus - one;
        let mut s = 0usize;
        while !q.bit(0) {
            q >>= 1;
            s += 1;
        }

        let mut z = U256::from(2u8);
        while self.is_square(z) {
            z += one;
        }

        let mut m = s;
        let mut c = self.pow(z, q);
        let mut t = self.pow(a, q);
        let mut r = self.pow(a, (q + one) >> 1);

        while t != one {
            let mut i = 0usize;
            let mut t2i = t;
            while t2i != one {
                t2i = self.square(t2i);
                i += 1;
                if i == m {
                    return None;
                }
            }
            let mut b = c;
            for _ in 0..(m - i - 1) {
                b = self.square(b);
            }
            m = i;
            c = self.square(b);
            t = self.mul(t, c);
            r = self.mul(r, b);
        }
        Some(r)
    }
}

/// An element of the STARK base field, always in `[0, p)`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FieldElement(U256);

impl FieldElement {
    pub const ZERO: Self = Self(U256::ZERO);
    pub const ONE: Self = Self(uint!(1_U256));

    /// Wrap a value already known to be below the prime.
    pub(crate) const fn from_raw(value: U256) -> Self {
        Self(value)
    }

    /// Create a field element, rejecting values `>= p`.
    pub fn new(value: U256) -> Result<Self> {
        if value >= FIELD_PRIME {
            return Err(CryptoError::out_of_range(format!(
                "0x{value:x} is not below the field prime"
            )));
        }
        Ok(Self(value))
    }

    /// Create a field element by reducing modulo `p`.
    pub fn reduce(value: U256) -> Self {
        Self(STARK_PRIME_FIELD.reduce(value))
    }

    pub fn from_be_bytes(bytes: [u8; 32]) -> Result<Self> {
        Self::new(U256::from_be_bytes(bytes))
    }

    /// Parse a hex string with optional `0x` prefix.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        Self::new(parse_hex_u256(hex_str)?)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.0.to_be_bytes::<32>()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `0x`-prefixed hex without leading zeros.
    pub fn to_hex(&self) -> String {
        to_minimal_hex(self.0)
    }

    /// 64 hex digits, no prefix.
    pub fn to_fixed_hex(&self) -> String {
        to_fixed_hex(self.0)
    }
}

impl From<u64> for FieldElement {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<u32> for FieldElement {
    fn from(value: u32) -> Self {
        Self(U256::from(value))
    }
}

impl TryFrom<U256> for FieldElement {
    type Error = CryptoError;

    fn try_from(value: U256) -> Result<Self> {
        Self::new(value)
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", self.to_hex())
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Parse a big-endian hex string (optional `0x`, odd length allowed).
pub fn parse_hex_u256(hex_str: &str) -> Result<U256> {
    let trimmed = hex_str.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() {
        return Err(CryptoError::InvalidHex {
            message: "empty hex string".to_string(),
        });
    }
    if digits.len() > 64 {
        return Err(CryptoError::InvalidHex {
            message: format!("hex value too large: {} digits", digits.len()),
        });
    }

    let padded = if digits.len() % 2 != 0 {
        format!("0{digits}")
    } else {
        digits.to_string()
    };
    let bytes = hex::decode(&padded).map_err(|e| CryptoError::InvalidHex {
        message: e.to_string(),
    })?;

    let mut buf = [0u8; 32];
    buf[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(U256::from_be_bytes(buf))
}

/// `0x`-prefixed hex without leading zeros (`0x0` for zero).
pub fn to_minimal_hex(value: U256) -> String {
    let fixed = to_fixed_hex(value);
    let trimmed = fixed.trim_start_matches('0');
    if trimmed.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{trimmed}")
    }
}

/// 64 lowercase hex digits without prefix.
pub fn to_fixed_hex(value: U256) -> String {
    hex::encode(value.to_be_bytes::<32>())
}

/// Big-endian bytes without leading zero bytes (empty for zero).
pub(crate) fn minimal_be_bytes(value: U256) -> Vec<u8> {
    let bytes = value.to_be_bytes::<32>();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    bytes[skip..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_wraps_around_prime() {
        let f = STARK_PRIME_FIELD;
        let max = FIELD_PRIME - U256::from(1u8);
        assert_eq!(f.add(max, U256::from(2u8)), U256::from(1u8));
    }

    #[test]
    fn test_sub_below_zero() {
        let f = STARK_PRIME_FIELD;
        assert_eq!(
            f.sub(U256::from(1u8), U256::from(2u8)),
            FIELD_PRIME - U256::from(1u8)
        );
        assert_eq!(f.neg(U256::ZERO), U256::ZERO);
    }

    #[test]
    fn test_inverse() {
        let f = STARK_PRIME_FIELD;
        let a = U256::from(123456789u64);
        let inv = f.inv(a).unwrap();
        assert_eq!(f.mul(a, inv), U256::from(1u8));

        let n = STARK_SCALAR_FIELD;
        let inv = n.inv(a).unwrap();
        assert_eq!(n.mul(a, inv), U256::from(1u8));
    }

    #[test]
    fn test_inverse_of_zero_fails() {
        let err = STARK_PRIME_FIELD.inv(U256::ZERO).unwrap_err();
        assert!(matches!(err, CryptoError::Arithmetic { .. }));

        // A multiple of the modulus is zero too.
        assert!(STARK_SCALAR_FIELD.inv(EC_ORDER).is_err());
    }

    #[test]
    fn test_sqrt() {
        let f = STARK_PRIME_FIELD;
        for v in [4u64, 9, 1_000_000, 987_654_321] {
            let a = f.square(U256::from(v));
            let r = f.sqrt(a).unwrap();
            assert_eq!(f.square(r), a);
        }
        // 3 is a non-residue for this prime.
        assert!(f.sqrt(U256::from(3u8)).is_none());
    }

    #[test]
    fn test_field_element_range() {
        assert!(FieldElement::new(FIELD_PRIME).is_err());
        assert!(FieldElement::new(FIELD_PRIME - U256::from(1u8)).is_ok());
        assert_eq!(FieldElement::reduce(FIELD_PRIME), FieldElement::ZERO);
    }

    #[test]
    fn test_hex_roundtrip() {
        let fe = FieldElement::from_hex("0x123abc").unwrap();
        assert_eq!(fe, FieldElement::from(0x123abcu64));
        assert_eq!(fe.to_hex(), "0x123abc");
        assert_eq!(fe.to_fixed_hex().len(), 64);
        assert_eq!(FieldElement::from_hex(&fe.to_fixed_hex()).unwrap(), fe);

        // Odd length, no prefix
        assert_eq!(FieldElement::from_hex("abc").unwrap(), FieldElement::from(0xabcu64));
        assert_eq!(FieldElement::ZERO.to_hex(), "0x0");
    }

    #[test]
    fn test_invalid_hex() {
        assert!(FieldElement::from_hex("").is_err());
        assert!(FieldElement::from_hex("0x").is_err());
        assert!(FieldElement::from_hex("0xzz").is_err());
        assert!(FieldElement::from_hex(&"f".repeat(65)).is_err());
    }

    #[test]
    fn test_minimal_be_bytes() {
        assert!(minimal_be_bytes(U256::ZERO).is_empty());
        assert_eq!(minimal_be_bytes(U256::from(0x0102u64)), vec![1, 2]);
    }
}
