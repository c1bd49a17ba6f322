//! Fixed-point scaling of human amounts into integer quantums.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{Error, Result};

/// How a scaled amount with a fractional part is turned into an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Fractional results are rejected.
    Exact,
    Up,
    Down,
}

fn scale(resolution_exponent: u32) -> Result<Decimal> {
    10u64
        .checked_pow(resolution_exponent)
        .map(Decimal::from)
        .ok_or_else(|| Error::encoding(format!("resolution 10^{resolution_exponent} too large")))
}

/// `amount * 10^resolution_exponent` as a 64-bit quantum count.
pub fn to_quantums(amount: Decimal, resolution_exponent: u32, rounding: Rounding) -> Result<u64> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::encoding(format!("amount {amount} is negative")));
    }
    let scaled = amount
        .checked_mul(scale(resolution_exponent)?)
        .ok_or_else(|| Error::encoding(format!("amount {amount} overflows when scaled")))?;
    integral_u64(scaled, rounding)
}

pub fn to_quantums_exact(amount: Decimal, resolution_exponent: u32) -> Result<u64> {
    to_quantums(amount, resolution_exponent, Rounding::Exact)
}

pub fn to_quantums_round_up(amount: Decimal, resolution_exponent: u32) -> Result<u64> {
    to_quantums(amount, resolution_exponent, Rounding::Up)
}

pub fn to_quantums_round_down(amount: Decimal, resolution_exponent: u32) -> Result<u64> {
    to_quantums(amount, resolution_exponent, Rounding::Down)
}

/// Convert an already-scaled value to `u64` with the given rounding.
pub(crate) fn integral_u64(value: Decimal, rounding: Rounding) -> Result<u64> {
    let integral = match rounding {
        Rounding::Exact => {
            if !value.fract().is_zero() {
                return Err(Error::encoding(format!(
                    "{value} is not a whole number of quantums"
                )));
            }
            value
        }
        Rounding::Up => value.ceil(),
        Rounding::Down => value.floor(),
    };
    integral
        .to_u64()
        .ok_or_else(|| Error::encoding(format!("{integral} does not fit in 64 bits")))
}

/// Fee rate truncated to six decimal places.
pub fn truncate_fee_rate(limit_fee: Decimal) -> Decimal {
    limit_fee.round_dp_with_strategy(6, RoundingStrategy::ToZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_exact() {
        assert_eq!(to_quantums_exact(d("1.5"), 10).unwrap(), 15_000_000_000);
        assert_eq!(to_quantums_exact(d("145.0005"), 9).unwrap(), 145_000_500_000);
        assert!(matches!(
            to_quantums_exact(d("0.00000000001"), 10),
            Err(Error::Encoding { .. })
        ));
    }

    #[test]
    fn test_rounding_modes() {
        assert_eq!(to_quantums_round_up(d("0.0000001"), 6).unwrap(), 1);
        assert_eq!(to_quantums_round_down(d("0.0000009"), 6).unwrap(), 0);
        assert_eq!(to_quantums_round_up(d("2"), 6).unwrap(), 2_000_000);
    }

    #[test]
    fn test_width_boundary() {
        // u64::MAX quantums at resolution 0 fits; one more does not.
        assert_eq!(
            to_quantums_exact(Decimal::from(u64::MAX), 0).unwrap(),
            u64::MAX
        );
        let too_big = Decimal::from(u64::MAX) + Decimal::ONE;
        assert!(to_quantums_exact(too_big, 0).is_err());
    }

    #[test]
    fn test_negative_rejected() {
        assert!(to_quantums_round_down(d("-1"), 6).is_err());
    }

    #[test]
    fn test_truncate_fee_rate() {
        assert_eq!(truncate_fee_rate(d("0.0005")), d("0.0005"));
        assert_eq!(truncate_fee_rate(d("0.1234569")), d("0.123456"));
    }
}
