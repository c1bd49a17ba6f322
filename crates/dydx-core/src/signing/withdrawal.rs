//! Collateral withdrawals.
//!
//! Field layout (prefix 6):
//!
//! ```text
//! [collateral_asset, packed]
//! packed = 6 (10) | position (64) | nonce (32) | quantums (64) | expiration_hours (32) | 0 (49)
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stark_crypto::FieldElement;

use super::packing::{BitPacker, PREFIX_BITS};
use super::quantums::to_quantums_exact;
use super::Signable;
use crate::constants::{NetworkId, COLLATERAL_RESOLUTION_EXPONENT};
use crate::error::Result;
use crate::helpers::{epoch_seconds_to_hours, nonce_from_client_id};

const WITHDRAWAL_PREFIX: u64 = 6;
const WITHDRAWAL_PADDING_BITS: usize = 49;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalParams {
    pub network_id: NetworkId,
    pub position_id: u64,
    /// USDC amount.
    pub human_amount: Decimal,
    pub client_id: String,
    pub expiration_epoch_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignableWithdrawal {
    network_id: NetworkId,
    position_id: u64,
    quantums_amount: u64,
    nonce: u32,
    expiration_epoch_hours: u64,
}

impl SignableWithdrawal {
    pub fn from_params(params: &WithdrawalParams) -> Result<Self> {
        Ok(Self {
            network_id: params.network_id,
            position_id: params.position_id,
            quantums_amount: to_quantums_exact(params.human_amount, COLLATERAL_RESOLUTION_EXPONENT)?,
            nonce: nonce_from_client_id(&params.client_id),
            expiration_epoch_hours: epoch_seconds_to_hours(params.expiration_epoch_seconds),
        })
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }

    pub fn quantums_amount(&self) -> u64 {
        self.quantums_amount
    }

    pub fn nonce(&self) -> u32 {
        self.nonce
    }

    pub fn expiration_epoch_hours(&self) -> u64 {
        self.expiration_epoch_hours
    }
}

impl Signable for SignableWithdrawal {
    fn action(&self) -> &'static str {
        "withdrawal"
    }

    fn field_elements(&self) -> Result<Vec<FieldElement>> {
        let packed = BitPacker::new()
            .push(WITHDRAWAL_PREFIX, PREFIX_BITS)?
            .push(self.position_id, 64)?
            .push(u64::from(self.nonce), 32)?
            .push(self.quantums_amount, 64)?
            .push(self.expiration_epoch_hours, 32)?
            .pad(WITHDRAWAL_PADDING_BITS)?
            .finish()?;

        Ok(vec![self.network_id.collateral_asset_id(), packed])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use stark_crypto::StarkPrivateKey;
    use std::str::FromStr;

    const MOCK_PRIVATE_KEY: &str =
        "0x58c7d5a90b1776bde86ebac077e053ed85b0f7164f53b080304a531947f46e3";

    fn params() -> WithdrawalParams {
        WithdrawalParams {
            network_id: NetworkId::Ropsten,
            position_id: 12345,
            human_amount: Decimal::from_str("49.478023").unwrap(),
            client_id: "This is an ID that the client came up with to describe this withdrawal"
                .to_string(),
            expiration_epoch_seconds: 1_600_316_155,
        }
    }

    #[test]
    fn test_withdrawal_encoding() {
        let withdrawal = SignableWithdrawal::from_params(&params()).unwrap();
        assert_eq!(withdrawal.quantums_amount(), 49_478_023);
        assert_eq!(withdrawal.nonce(), 3_041_881_664);
        assert_eq!(withdrawal.expiration_epoch_hours(), 444_533);

        let elements = withdrawal.field_elements().unwrap();
        assert_eq!(elements[0], NetworkId::Ropsten.collateral_asset_id());
        assert_eq!(
            elements[1].to_hex(),
            "0xc00000000000060736a9edc800000000005e5f30e000d90ea000000000000"
        );
        assert_eq!(
            withdrawal.message_hash().unwrap().to_hex(),
            "0x51584df27a5a6dbb53ab759ed193f16684013bbab180c53f240b80a03326e89"
        );
    }

    #[test]
    fn test_reference_client_signature() {
        let key = StarkPrivateKey::from_hex(MOCK_PRIVATE_KEY).unwrap();
        let withdrawal = SignableWithdrawal::from_params(&params()).unwrap();
        let signature = withdrawal.sign(&key).unwrap();
        assert_eq!(
            signature.to_hex(),
            "05e48c33f8205a5359c95f1bd7385c1c1f587e338a514298c07634c0b6c952ba\
             0687d6980502a5d7fa84ef6fdc00104db22c43c7fb83e88ca84f19faa9ee3de1"
        );
        assert!(withdrawal
            .verify(&key.public_key().unwrap(), &signature)
            .unwrap());
    }

    #[test]
    fn test_precision_beyond_resolution_rejected() {
        let mut p = params();
        p.human_amount = Decimal::from_str("1.0000001").unwrap();
        assert!(matches!(
            SignableWithdrawal::from_params(&p),
            Err(Error::Encoding { .. })
        ));
    }
}
