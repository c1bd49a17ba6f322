//! Deterministic nonce generation (RFC 6979, HMAC-SHA256) for STARK ECDSA.

use alloy_primitives::U256;
use hmac::{Hmac, KeyInit, Mac};
use sha2::Sha256;

use crate::error::{CryptoError, Result};
use crate::field::{minimal_be_bytes, EC_ORDER};

type HmacSha256 = Hmac<Sha256>;

/// Bit length of the curve order.
const ORDER_BITS: usize = 252;

/// Produce the nonce `k` for signing `msg_hash` with `private_key`.
///
/// A digest whose bit length is at least 248 and ends 1 to 4 bits into its
/// last byte is shifted left by one nibble first, so that the byte string fed
/// to the HMAC matches other widely deployed STARK signers. A `seed` is mixed
/// in as extra entropy; `None` and `Some(0)` are equivalent.
pub fn generate_k(private_key: U256, msg_hash: U256, seed: Option<U256>) -> Result<U256> {
    let bits = msg_hash.bit_len();
    let msg_hash = if bits >= 248 && (1..=4).contains(&(bits % 8)) {
        msg_hash << 4
    } else {
        msg_hash
    };

    let data = minimal_be_bytes(msg_hash);
    let extra_entropy = seed.map(minimal_be_bytes).unwrap_or_default();
    generate_k_from_bytes(private_key, &data, &extra_entropy)
}

/// RFC 6979 section 3.2 over the STARK curve order.
fn generate_k_from_bytes(private_key: U256, data: &[u8], extra_entropy: &[u8]) -> Result<U256> {
    let x = private_key.to_be_bytes::<32>();
    let h1 = bits2octets(data);

    let mut v = [0x01u8; 32];
    let mut k = [0x00u8; 32];

    k = hmac(&k, &[&v, &[0x00], &x, &h1, extra_entropy])?;
    v = hmac(&k, &[&v])?;
    k = hmac(&k, &[&v, &[0x01], &x, &h1, extra_entropy])?;
    v = hmac(&k, &[&v])?;

    loop {
        v = hmac(&k, &[&v])?;
        let candidate = bits2int(&v);
        if !candidate.is_zero() && candidate < EC_ORDER {
            return Ok(candidate);
        }
        tracing::trace!("rfc6979 candidate rejected, regenerating");
        k = hmac(&k, &[&v, &[0x00]])?;
        v = hmac(&k, &[&v])?;
    }
}

/// Leftmost `ORDER_BITS` bits of `data` as an integer.
fn bits2int(data: &[u8]) -> U256 {
    let mut buf = [0u8; 32];
    let take = data.len().min(32);
    buf[32 - take..].copy_from_slice(&data[..take]);
    let value = U256::from_be_bytes(buf);
    let len_bits = data.len() * 8;
    if len_bits > ORDER_BITS {
        value >> (len_bits - ORDER_BITS)
    } else {
        value
    }
}

/// `bits2int(data) mod n` as 32 big-endian bytes.
fn bits2octets(data: &[u8]) -> [u8; 32] {
    let z1 = bits2int(data);
    let z2 = if z1 >= EC_ORDER { z1 - EC_ORDER } else { z1 };
    z2.to_be_bytes::<32>()
}

fn hmac(key: &[u8], parts: &[&[u8]]) -> Result<[u8; 32]> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| CryptoError::arithmetic(format!("failed to create HMAC: {e}")))?;
    for part in parts {
        mac.update(part);
    }
    let digest = mac.finalize().into_bytes();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let d = U256::from(0x1234_5678u64);
        let h = U256::from(0xdead_beefu64);
        let k1 = generate_k(d, h, None).unwrap();
        let k2 = generate_k(d, h, None).unwrap();
        assert_eq!(k1, k2);
        assert!(!k1.is_zero() && k1 < EC_ORDER);
    }

    #[test]
    fn test_seed_changes_nonce() {
        let d = U256::from(42u64);
        let h = U256::from(7u64);
        let base = generate_k(d, h, None).unwrap();
        assert_eq!(generate_k(d, h, Some(U256::ZERO)).unwrap(), base);
        assert_ne!(generate_k(d, h, Some(U256::from(1u8))).unwrap(), base);
    }

    #[test]
    fn test_bits2int_truncates_long_input() {
        let data = [0xffu8; 32];
        assert_eq!(bits2int(&data).bit_len(), ORDER_BITS);
        assert_eq!(bits2int(&[0x01, 0x02]), U256::from(0x0102u64));
    }

    #[test]
    fn test_bits2octets_reduces() {
        // 32 bytes are truncated to 252 bits, leaving exactly n.
        let shifted = (EC_ORDER << 4usize).to_be_bytes::<32>();
        assert_eq!(bits2octets(&shifted), [0u8; 32]);

        let plus_one = ((EC_ORDER + U256::from(1u8)) << 4usize).to_be_bytes::<32>();
        assert_eq!(bits2octets(&plus_one), U256::from(1u8).to_be_bytes::<32>());
    }
}
