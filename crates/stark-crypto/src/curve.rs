//! Short Weierstrass curve `y^2 = x^3 + alpha*x + beta` over the STARK field.
//!
//! Points are kept in Jacobian coordinates during computation and converted
//! to affine form once at the end of every public operation.

use alloy_primitives::{uint, U256};

use crate::error::{CryptoError, Result};
use crate::field::{PrimeField, EC_ORDER, STARK_PRIME_FIELD};

pub const ALPHA: U256 = uint!(1_U256);

pub const BETA: U256 =
    uint!(0x06f21413efbe40de150e596d72f7a8c5609ad26c15c915c1f4cdfcb99cee9e89_U256);

pub const GENERATOR_X: U256 =
    uint!(0x01ef15c18599971b7beced415a40f0c7deacfd9b0d1819e03d723d8bc943cfca_U256);

pub const GENERATOR_Y: U256 =
    uint!(0x005668060aa49730b7be4801df46ec62de53ecd11abe43a32873000c36e8dc1f_U256);

/// Bit length covering every scalar below the curve order.
pub const SCALAR_BITS: usize = 252;

/// The STARK-friendly curve used by the exchange.
pub const STARK_CURVE: StarkCurve = StarkCurve {
    field: STARK_PRIME_FIELD,
    alpha: ALPHA,
    beta: BETA,
    order: EC_ORDER,
    generator: CurvePoint::Affine {
        x: GENERATOR_X,
        y: GENERATOR_Y,
    },
};

/// Point in affine form, or the point at infinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurvePoint {
    Infinity,
    Affine { x: U256, y: U256 },
}

impl CurvePoint {
    pub fn x(&self) -> Option<U256> {
        match self {
            CurvePoint::Infinity => None,
            CurvePoint::Affine { x, .. } => Some(*x),
        }
    }

    pub fn y(&self) -> Option<U256> {
        match self {
            CurvePoint::Infinity => None,
            CurvePoint::Affine { y, .. } => Some(*y),
        }
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self, CurvePoint::Infinity)
    }
}

/// Projective point `(X, Y, Z)` standing for `(X/Z^2, Y/Z^3)`; `Z = 0` is infinity.
#[derive(Debug, Clone, Copy)]
struct Jacobian {
    x: U256,
    y: U256,
    z: U256,
}

impl Jacobian {
    const INFINITY: Self = Self {
        x: U256::ZERO,
        y: uint!(1_U256),
        z: U256::ZERO,
    };

    fn from_affine(point: &CurvePoint) -> Self {
        match *point {
            CurvePoint::Infinity => Self::INFINITY,
            CurvePoint::Affine { x, y } => Self {
                x,
                y,
                z: uint!(1_U256),
            },
        }
    }

    fn is_infinity(&self) -> bool {
        self.z.is_zero()
    }
}

/// Swap `a` and `b` when `swap` is set, without branching on it.
fn conditional_swap(a: &mut Jacobian, b: &mut Jacobian, swap: bool) {
    let mask = 0u64.wrapping_sub(swap as u64);
    let swap_word = |p: &mut U256, q: &mut U256| {
        let mut pl = p.into_limbs();
        let mut ql = q.into_limbs();
        for (l, r) in pl.iter_mut().zip(ql.iter_mut()) {
            let t = (*l ^ *r) & mask;
            *l ^= t;
            *r ^= t;
        }
        *p = U256::from_limbs(pl);
        *q = U256::from_limbs(ql);
    };
    swap_word(&mut a.x, &mut b.x);
    swap_word(&mut a.y, &mut b.y);
    swap_word(&mut a.z, &mut b.z);
}

/// Curve parameters plus the group operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarkCurve {
    pub field: PrimeField,
    pub alpha: U256,
    pub beta: U256,
    pub order: U256,
    pub generator: CurvePoint,
}

impl StarkCurve {
    /// Whether the point satisfies the curve equation. Infinity is on the curve.
    pub fn is_on_curve(&self, point: &CurvePoint) -> bool {
        match *point {
            CurvePoint::Infinity => true,
            CurvePoint::Affine { x, y } => {
                let f = &self.field;
                if x >= f.modulus() || y >= f.modulus() {
                    return false;
                }
                f.square(y) == self.rhs(x)
            }
        }
    }

    /// `x^3 + alpha*x + beta`
    fn rhs(&self, x: U256) -> U256 {
        let f = &self.field;
        let x3 = f.mul(f.square(x), x);
        f.add(f.add(x3, f.mul(self.alpha, x)), self.beta)
    }

    /// Recover a point from its x-coordinate. Either of the two roots may be
    /// returned; [`StarkCurve::negate`] yields the other.
    pub fn lift_x(&self, x: U256) -> Result<CurvePoint> {
        if x >= self.field.modulus() {
            return Err(CryptoError::InvalidPoint {
                message: "x-coordinate is not below the field prime".to_string(),
            });
        }
        let y = self
            .field
            .sqrt(self.rhs(x))
            .ok_or_else(|| CryptoError::InvalidPoint {
                message: format!("no point with x = 0x{x:x}"),
            })?;
        Ok(CurvePoint::Affine { x, y })
    }

    pub fn negate(&self, point: &CurvePoint) -> CurvePoint {
        match *point {
            CurvePoint::Infinity => CurvePoint::Infinity,
            CurvePoint::Affine { x, y } => CurvePoint::Affine {
                x,
                y: self.field.neg(y),
            },
        }
    }

    pub fn point_add(&self, a: &CurvePoint, b: &CurvePoint) -> Result<CurvePoint> {
        let sum = self.jacobian_add(&Jacobian::from_affine(a), &Jacobian::from_affine(b));
        self.to_affine(&sum)
    }

    pub fn double(&self, point: &CurvePoint) -> Result<CurvePoint> {
        let doubled = self.jacobian_double(&Jacobian::from_affine(point));
        self.to_affine(&doubled)
    }

    /// `scalar * point`. The scalar is reduced modulo the group order first.
    ///
    /// The ladder runs over `k + 2n`, which has the same bit length for every
    /// `k < n`, so the step count does not depend on the scalar's leading
    /// zeros and the accumulator never starts at infinity.
    pub fn scalar_mul(&self, point: &CurvePoint, scalar: U256) -> Result<CurvePoint> {
        let padded = scalar.reduce_mod(self.order) + self.order + self.order;
        let product = self.ladder_from_top(&Jacobian::from_affine(point), padded);
        self.to_affine(&product)
    }

    /// `scalar * G`
    pub fn mul_generator(&self, scalar: U256) -> Result<CurvePoint> {
        self.scalar_mul(&self.generator, scalar)
    }

    /// Ladder over exactly `bits` bits of `scalar`. Higher bits must be zero.
    pub(crate) fn scalar_mul_bits(
        &self,
        point: &CurvePoint,
        scalar: U256,
        bits: usize,
    ) -> Result<CurvePoint> {
        if scalar.bit_len() > bits {
            return Err(CryptoError::out_of_range(format!(
                "scalar does not fit in {bits} bits"
            )));
        }
        let product = self.ladder(&Jacobian::from_affine(point), scalar, bits);
        self.to_affine(&product)
    }

    /// Montgomery ladder seeded with `(P, 2P)` from the top set bit of
    /// `scalar`; one addition and one doubling per remaining bit.
    fn ladder_from_top(&self, point: &Jacobian, scalar: U256) -> Jacobian {
        let mut r0 = *point;
        let mut r1 = self.jacobian_double(point);
        for i in (0..scalar.bit_len().saturating_sub(1)).rev() {
            let bit = scalar.bit(i);
            conditional_swap(&mut r0, &mut r1, bit);
            r1 = self.jacobian_add(&r0, &r1);
            r0 = self.jacobian_double(&r0);
            conditional_swap(&mut r0, &mut r1, bit);
        }
        r0
    }

    /// Montgomery ladder over a fixed number of bits for public scalars:
    /// one addition and one doubling per bit.
    fn ladder(&self, point: &Jacobian, scalar: U256, bits: usize) -> Jacobian {
        let mut r0 = Jacobian::INFINITY;
        let mut r1 = *point;
        for i in (0..bits).rev() {
            let bit = scalar.bit(i);
            conditional_swap(&mut r0, &mut r1, bit);
            r1 = self.jacobian_add(&r0, &r1);
            r0 = self.jacobian_double(&r0);
            conditional_swap(&mut r0, &mut r1, bit);
        }
        r0
    }

    fn jacobian_double(&self, p: &Jacobian) -> Jacobian {
        let f = &self.field;
        if p.is_infinity() || p.y.is_zero() {
            return Jacobian::INFINITY;
        }
        let xx = f.square(p.x);
        let yy = f.square(p.y);
        let yyyy = f.square(yy);
        let zz = f.square(p.z);

        // s = 4*x*y^2, m = 3*x^2 + alpha*z^4
        let s = f.mul(U256::from(4u8), f.mul(p.x, yy));
        let m = f.add(f.mul(U256::from(3u8), xx), f.mul(self.alpha, f.square(zz)));

        let x3 = f.sub(f.square(m), f.add(s, s));
        let y3 = f.sub(f.mul(m, f.sub(s, x3)), f.mul(U256::from(8u8), yyyy));
        let z3 = f.mul(U256::from(2u8), f.mul(p.y, p.z));
        Jacobian {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    fn jacobian_add(&self, p: &Jacobian, q: &Jacobian) -> Jacobian {
        let f = &self.field;
        if p.is_infinity() {
            return *q;
        }
        if q.is_infinity() {
            return *p;
        }

        let z1z1 = f.square(p.z);
        let z2z2 = f.square(q.z);
        let u1 = f.mul(p.x, z2z2);
        let u2 = f.mul(q.x, z1z1);
        let s1 = f.mul(p.y, f.mul(q.z, z2z2));
        let s2 = f.mul(q.y, f.mul(p.z, z1z1));

        if u1 == u2 {
            return if s1 == s2 {
                self.jacobian_double(p)
            } else {
                Jacobian::INFINITY
            };
        }

        let h = f.sub(u2, u1);
        let r = f.sub(s2, s1);
        let hh = f.square(h);
        let hhh = f.mul(h, hh);
        let u1hh = f.mul(u1, hh);

        let x3 = f.sub(f.sub(f.square(r), hhh), f.add(u1hh, u1hh));
        let y3 = f.sub(f.mul(r, f.sub(u1hh, x3)), f.mul(s1, hhh));
        let z3 = f.mul(h, f.mul(p.z, q.z));
        Jacobian {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    fn to_affine(&self, p: &Jacobian) -> Result<CurvePoint> {
        if p.is_infinity() {
            return Ok(CurvePoint::Infinity);
        }
        let f = &self.field;
        let z_inv = f.inv(p.z)?;
        let z_inv2 = f.square(z_inv);
        Ok(CurvePoint::Affine {
            x: f.mul(p.x, z_inv2),
            y: f.mul(p.y, f.mul(z_inv2, z_inv)),
        })
    }
}
