//! dydx-signer: dual STARK/Ethereum signing core for a dYdX perpetuals client
//!
//! This is the root crate that provides benchmark and integration-test access
//! to the internal crates. For actual functionality, use them directly:
//!
//! - `stark-crypto`: field arithmetic, Pedersen hash, STARK ECDSA
//! - `auth`: Ethereum signers, onboarding actions, STARK key derivation
//! - `dydx-core`: action encoding, signable façades, capability-gated client

// Re-export for benchmarks
pub use auth;
pub use dydx_core as core;
pub use stark_crypto as crypto;
