//! Deterministic STARK key derivation from an Ethereum signature.
//!
//! The Ethereum account signs the fixed [`OnboardingAction::StarkKey`]
//! message; the signature is hashed down to a STARK private scalar. The same
//! account on the same chain always recovers the same STARK key.

use alloy_primitives::{keccak256, U256};
use stark_crypto::{StarkPrivateKey, EC_ORDER};
use tracing::debug;

use crate::error::{AuthError, Result};
use crate::eth_signer::{EthSigner, TypedSignature};
use crate::onboarding::OnboardingAction;

/// A derived STARK key pair, public coordinates as `0x` hex.
#[derive(Debug, Clone)]
pub struct StarkKeyPair {
    pub private_key: StarkPrivateKey,
    /// x-coordinate, the "STARK key" registered with the exchange.
    pub public_key: String,
    pub public_key_y_coordinate: String,
}

/// Map a typed signature to a STARK private key.
///
/// `keccak256(signature) >> 5`, reduced modulo the curve order. A zero result
/// is rehashed with a big-endian counter appended until it is non-zero.
pub fn private_key_from_signature(signature: &TypedSignature) -> Result<StarkPrivateKey> {
    let bytes = signature.as_bytes();
    let mut scalar = hash_to_scalar(bytes);
    let mut counter: u32 = 0;

    while scalar.is_zero() {
        let mut data = bytes.to_vec();
        data.extend_from_slice(&counter.to_be_bytes());
        scalar = hash_to_scalar(&data);
        counter = counter.checked_add(1).ok_or_else(|| AuthError::Derivation {
            message: "exhausted counter while deriving a non-zero key".to_string(),
        })?;
    }

    Ok(StarkPrivateKey::new(scalar)?)
}

fn hash_to_scalar(data: &[u8]) -> U256 {
    (U256::from_be_bytes(keccak256(data).0) >> 5usize).reduce_mod(EC_ORDER)
}

/// Sign the STARK key action on `chain_id` and derive the private key.
pub async fn derive_stark_private_key(
    signer: &dyn EthSigner,
    chain_id: u64,
) -> Result<StarkPrivateKey> {
    let signature = OnboardingAction::StarkKey
        .sign(signer, chain_id)
        .await
        .map_err(|e| AuthError::Derivation {
            message: format!("failed to sign STARK key action: {e}"),
        })?;

    private_key_from_signature(&signature)
}

/// Derive the private key and its public coordinates.
pub async fn derive_stark_key_pair(signer: &dyn EthSigner, chain_id: u64) -> Result<StarkKeyPair> {
    let private_key = derive_stark_private_key(signer, chain_id).await?;
    let public = private_key.public_key()?;

    debug!(chain_id, public_key = %public, "derived STARK key pair");

    Ok(StarkKeyPair {
        private_key,
        public_key: public.to_hex(),
        public_key_y_coordinate: public.y_hex(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegated::{DelegatedSigner, MockWalletProvider};
    use crate::local::LocalKeySigner;

    const TEST_PRIVATE_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn signer() -> LocalKeySigner {
        LocalKeySigner::from_private_key(TEST_PRIVATE_KEY).unwrap()
    }

    #[tokio::test]
    async fn test_known_derivations() {
        let signer = signer();
        let cases = [
            (1, "0x281bdf39d7883124bce35ff39820d0827750f88c76dba46f3163c3c2aa940c0"),
            (3, "0x4dc8ec5cb5ed3b8ae0120346384a33faaa3a67a3107b219b7078573c9c9a545"),
            (5, "0x78caa96b08391112567252c75cb6ad6efe5a2f23847a474dfd1c51e041d2726"),
        ];
        for (chain_id, expected) in cases {
            let key = derive_stark_private_key(&signer, chain_id).await.unwrap();
            assert_eq!(key.to_hex(), expected, "chain {chain_id}");
        }
    }

    #[tokio::test]
    async fn test_key_pair_public_coordinates() {
        let pair = derive_stark_key_pair(&signer(), 1).await.unwrap();
        assert_eq!(
            pair.public_key,
            "0x4592a3349e3f71c1ff99d613492b73552af0df8fa72e7459975bff56db6ee87"
        );

        let ropsten = derive_stark_key_pair(&signer(), 3).await.unwrap();
        assert_eq!(
            ropsten.public_key,
            "0x340d1263ab2e889719d5737015826389ff7649d5d5fdac30d5b36e6d511dc6d"
        );
    }

    #[tokio::test]
    async fn test_derivation_is_deterministic_and_network_sensitive() {
        let signer = signer();
        let a = derive_stark_private_key(&signer, 3).await.unwrap();
        let b = derive_stark_private_key(&signer, 3).await.unwrap();
        let c = derive_stark_private_key(&signer, 1).await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_key_from_signature_vector() {
        let sig = TypedSignature::from_hex(
            "0x31f0ace9d6a42ff0e956a8be78b917a938e136a55fae863ed5fadee2c4692bc6\
             1553f2e2cd881d26cef089558378226ef27a78a934513e61bb1249e73de19ab51c00",
        )
        .unwrap();
        assert_eq!(
            private_key_from_signature(&sig).unwrap().to_hex(),
            "0x281bdf39d7883124bce35ff39820d0827750f88c76dba46f3163c3c2aa940c0"
        );
    }

    #[tokio::test]
    async fn test_signer_failure_maps_to_derivation_error() {
        let mut provider = MockWalletProvider::new();
        provider.expect_accounts().returning(|| Ok(vec![]));

        let signer = DelegatedSigner::new(provider);
        let err = derive_stark_private_key(&signer, 1).await.unwrap_err();
        assert!(matches!(err, AuthError::Derivation { .. }));
    }
}
