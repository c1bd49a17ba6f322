//! STARK curve primitives: field arithmetic, the Pedersen hash and ECDSA.
//!
//! Everything here is synchronous and free of shared state. The curve and
//! both prime fields are `const` values that each operation borrows.

pub mod curve;
pub mod ecdsa;
pub mod error;
pub mod field;
pub mod keys;
pub mod pedersen;
pub mod rfc6979;

pub use curve::{CurvePoint, StarkCurve, STARK_CURVE};
pub use ecdsa::{sign, sign_with_seed, verify, verify_point, StarkSignature, SIGNATURE_BOUND};
pub use error::{CryptoError, Result};
pub use field::{FieldElement, PrimeField, EC_ORDER, FIELD_PRIME, STARK_PRIME_FIELD, STARK_SCALAR_FIELD};
pub use keys::{private_key_from_bytes, StarkPrivateKey, StarkPublicKey};
pub use pedersen::{pedersen_hash, pedersen_hash_chain};

/// Re-exported so callers can build field elements without a direct dependency.
pub use alloy_primitives::U256;
