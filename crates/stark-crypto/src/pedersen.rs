//! Pedersen hash over the STARK curve.
//!
//! `H(a, b) = [P0 + a_low*P1 + a_high*P2 + b_low*P3 + b_high*P4].x` where
//! `low` is the bottom 248 bits and `high` the remaining 4 bits of each input.

use alloy_primitives::{uint, U256};

use crate::curve::{CurvePoint, STARK_CURVE};
use crate::error::{CryptoError, Result};
use crate::field::FieldElement;

const LOW_BITS: usize = 248;
const HIGH_BITS: usize = 4;

const SHIFT_POINT: CurvePoint = CurvePoint::Affine {
    x: uint!(0x049ee3eba8c1600700ee1b87eb599f16716b0b1022947733551fde4050ca6804_U256),
    y: uint!(0x03ca0cfe4b3bc6ddf346d49d06ea0ed34e621062c0e056c1d0405d266e10268a_U256),
};

const P1: CurvePoint = CurvePoint::Affine {
    x: uint!(0x0234287dcbaffe7f969c748655fca9e58fa8120b6d56eb0c1080d17957ebe47b_U256),
    y: uint!(0x03b056f100f96fb21e889527d41f4e39940135dd7a6c94cc6ed0268ee89e5615_U256),
};

const P2: CurvePoint = CurvePoint::Affine {
    x: uint!(0x04fa56f376c83db33f9dab2656558f3399099ec1de5e3018b7a6932dba8aa378_U256),
    y: uint!(0x03fa0984c931c9e38113e0c0e47e4401562761f92a7a23b45168f4e80ff5b54d_U256),
};

const P3: CurvePoint = CurvePoint::Affine {
    x: uint!(0x04ba4cc166be8dec764910f75b45f74b40c690c74709e90f3aa372f0bd2d6997_U256),
    y: uint!(0x0040301cf5c1751f4b971e46c4ede85fcac5c59a5ce5ae7c48151f27b24b219c_U256),
};

const P4: CurvePoint = CurvePoint::Affine {
    x: uint!(0x054302dcb0e6cc1c6e44cca8f61a63bb2ca65048d53fb325d36ff12c49a58202_U256),
    y: uint!(0x01b77b3e37d13504b348046268d8ae25ce98ad783c25561a879dcc77e99c2426_U256),
};

fn low_mask() -> U256 {
    (U256::from(1u8) << LOW_BITS) - U256::from(1u8)
}

/// Pedersen hash of two field elements.
pub fn pedersen_hash(a: &FieldElement, b: &FieldElement) -> Result<FieldElement> {
    let curve = STARK_CURVE;
    let mask = low_mask();
    let mut acc = SHIFT_POINT;

    for (value, low_point, high_point) in [(a, &P1, &P2), (b, &P3, &P4)] {
        let v = value.as_u256();
        let low = curve.scalar_mul_bits(low_point, v & mask, LOW_BITS)?;
        let high = curve.scalar_mul_bits(high_point, v >> LOW_BITS, HIGH_BITS)?;
        acc = curve.point_add(&acc, &low)?;
        acc = curve.point_add(&acc, &high)?;
    }

    let x = acc
        .x()
        .ok_or_else(|| CryptoError::arithmetic("pedersen hash reached the point at infinity"))?;
    Ok(FieldElement::from_raw(x))
}

/// Left fold `H(H(H(e0, e1), e2), ...)`. A single element is returned as is.
pub fn pedersen_hash_chain(elements: &[FieldElement]) -> Result<FieldElement> {
    let (first, rest) = elements
        .split_first()
        .ok_or_else(|| CryptoError::arithmetic("cannot hash an empty element list"))?;
    rest.iter()
        .try_fold(*first, |acc, element| pedersen_hash(&acc, element))
}
