//! Packing of fixed-width integers into a single field element.

use alloy_primitives::U256;
use stark_crypto::FieldElement;

use crate::error::{Error, Result};

/// Widest word the verifier accepts.
pub const MAX_PACKED_BITS: usize = 251;

/// Width of the leading action-type discriminator.
pub const PREFIX_BITS: usize = 10;

/// Concatenates `(value, width)` pairs, most significant first.
///
/// ```ignore
/// let word = BitPacker::new()
///     .push(6u64, PREFIX_BITS)?
///     .push(position_id, 64)?
///     .pad(49)?
///     .finish()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct BitPacker {
    value: U256,
    bits: usize,
}

impl BitPacker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` in `width` bits.
    pub fn push(self, value: u64, width: usize) -> Result<Self> {
        let value = U256::from(value);
        if value.bit_len() > width {
            return Err(Error::encoding(format!(
                "value {value} does not fit in {width} bits"
            )));
        }
        self.append(value, width)
    }

    /// Append `width` zero bits.
    pub fn pad(self, width: usize) -> Result<Self> {
        self.append(U256::ZERO, width)
    }

    fn append(self, value: U256, width: usize) -> Result<Self> {
        let bits = self.bits + width;
        if bits > MAX_PACKED_BITS {
            return Err(Error::encoding(format!(
                "packed word of {bits} bits exceeds {MAX_PACKED_BITS}"
            )));
        }
        Ok(Self {
            value: (self.value << width) | value,
            bits,
        })
    }

    pub fn bit_len(&self) -> usize {
        self.bits
    }

    pub fn finish(self) -> Result<FieldElement> {
        Ok(FieldElement::new(self.value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packs_most_significant_first() {
        let word = BitPacker::new()
            .push(0xabu64, 8)
            .unwrap()
            .push(0xcdu64, 8)
            .unwrap()
            .pad(4)
            .unwrap()
            .finish()
            .unwrap();
        assert_eq!(word.to_hex(), "0xabcd0");
    }

    #[test]
    fn test_value_wider_than_field() {
        let err = BitPacker::new().push(256u64, 8).unwrap_err();
        assert!(matches!(err, Error::Encoding { .. }));
        assert!(BitPacker::new().push(255u64, 8).is_ok());
    }

    #[test]
    fn test_total_width_limit() {
        let packer = BitPacker::new()
            .push(1u64, 64)
            .unwrap()
            .push(1u64, 64)
            .unwrap()
            .push(1u64, 64)
            .unwrap()
            .pad(59)
            .unwrap();
        assert_eq!(packer.bit_len(), MAX_PACKED_BITS);
        assert!(packer.pad(1).is_err());
    }
}
