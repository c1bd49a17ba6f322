//! Transfers between positions.
//!
//! Field layout (prefix 4):
//!
//! ```text
//! [collateral_asset, fee_asset = 0, receiver_public_key, part2, part3]
//! part2 = sender (64) | receiver (64) | fee_position = sender (64) | nonce (32)
//! part3 = 4 (10) | quantums (64) | max_fee = 0 (64) | expiration_hours (32) | 0 (81)
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

const TRANSFER_PREFIX: u64 = 4;
const TRANSFER_PADDING_BITS: usize = 81;
const TRANSFER_MAX_AMOUNT_FEE: u64 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferParams {
    pub network_id: NetworkId,
    pub sender_position_id: u64,
    pub receiver_position_id: u64,
    /// STARK key (x-coordinate) of the receiver, hex.
    pub receiver_public_key: String,
    /// USDC amount.
    pub human_amount: Decimal,
    pub client_id: String,
    pub expiration_epoch_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignableTransfer {
    network_id: NetworkId,
    sender_position_id: u64,
    receiver_position_id: u64,
    receiver_public_key: FieldElement,
    quantums_amount: u64,
    nonce: u32,
    expiration_epoch_hours: u64,
}

impl SignableTransfer {
    pub fn from_params(params: &TransferParams) -> Result<Self> {
        Ok(Self {
            network_id: params.network_id,
            sender_position_id: params.sender_position_id,
            receiver_position_id: params.receiver_position_id,
            receiver_public_key: FieldElement::from_hex(&params.receiver_public_key)?,
            quantums_amount: to_quantums_exact(params.human_amount, COLLATERAL_RESOLUTION_EXPONENT)?,
            nonce: nonce_from_client_id(&params.client_id),
            expiration_epoch_hours: epoch_seconds_to_hours(params.expiration_epoch_seconds),
        })
    }

    pub fn quantums_amount(&self) -> u64 {
        self.quantums_amount
    }

    pub fn nonce(&self) -> u32 {
        self.nonce
    }
}

impl Signable for SignableTransfer {
    fn action(&self) -> &'static str {
        "transfer"
    }

    fn field_elements(&self) -> Result<Vec<FieldElement>> {
        // The sender's position pays the (zero) fee.
        let part2 = BitPacker::new()
            .push(self.sender_position_id, 64)?
            .push(self.receiver_position_id, 64)?
            .push(self.sender_position_id, 64)?
            .push(u64::from(self.nonce), 32)?
            .finish()?;

        let part3 = BitPacker::new()
            .push(TRANSFER_PREFIX, PREFIX_BITS)?
            .push(self.quantums_amount, 64)?
            .push(TRANSFER_MAX_AMOUNT_FEE, 64)?
            .push(self.expiration_epoch_hours, 32)?
            .pad(TRANSFER_PADDING_BITS)?
            .finish()?;

        Ok(vec![
            self.network_id.collateral_asset_id(),
            FieldElement::ZERO,
            self.receiver_public_key,
            part2,
            part3,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stark_crypto::StarkPrivateKey;
    use std::str::FromStr;

    const MOCK_PRIVATE_KEY: &str =
        "0x58c7d5a90b1776bde86ebac077e053ed85b0f7164f53b080304a531947f46e3";
    const MOCK_PUBLIC_KEY: &str =
        "0x3b865a18323b8d147a12c556bfb1d502516c325b1477a23ba6c77af31f020fd";

    fn params() -> TransferParams {
        TransferParams {
            network_id: NetworkId::Ropsten,
            sender_position_id: 12345,
            receiver_position_id: 67890,
            receiver_public_key: MOCK_PUBLIC_KEY.to_string(),
            human_amount: Decimal::from_str("49.478023").unwrap(),
            client_id: "This is an ID that the client came up with to describe this transfer"
                .to_string(),
            expiration_epoch_seconds: 1_600_316_155,
        }
    }

    #[test]
    fn test_transfer_hash() {
        let transfer = SignableTransfer::from_params(&params()).unwrap();
        assert_eq!(transfer.nonce(), 1_723_841_828);
        let elements = transfer.field_elements().unwrap();
        assert_eq!(elements[1], FieldElement::ZERO);
        assert_eq!(elements[2].to_hex(), MOCK_PUBLIC_KEY);
        assert_eq!(
            transfer.message_hash().unwrap().to_hex(),
            "0x36f2ea3745cf336355d805f89306dd59b9740e046720467e0c5f6f31df4cf52"
        );
    }

    #[test]
    fn test_transfer_signature() {
        let key = StarkPrivateKey::from_hex(MOCK_PRIVATE_KEY).unwrap();
        let transfer = SignableTransfer::from_params(&params()).unwrap();
        let signature = transfer.sign(&key).unwrap();
        assert_eq!(
            signature.to_hex(),
            "0038743e24f3d739de9a78957b1637df4a797f5357825ee6a0e399db3fc222a4\
             066154f179021d62d4c0c3bfc69673345308dbc371b6f8cec2b23af64896adc1"
        );
        assert!(transfer.verify(&key.public_key().unwrap(), &signature).unwrap());
    }

    #[test]
    fn test_invalid_receiver_key() {
        let mut p = params();
        p.receiver_public_key = "not hex".to_string();
        assert!(SignableTransfer::from_params(&p).is_err());
    }
}
