//! STARK signing of exchange actions.
//!
//! Each action is turned into an ordered list of field elements whose
//! Pedersen chain is the message hash the STARK key signs.
//!
//! # Architecture
//!
//! ```text
//! OrderParams / WithdrawalParams / TransferParams / ApiRequestParams
//!       │
//!       ▼
//! Signable façade ── quantums + BitPacker ──► [FieldElement; n]
//!       │                                          │
//!       │                                   pedersen_hash_chain
//!       │                                          ▼
//!       └──────────── StarkPrivateKey ──────► StarkSignature
//! ```
//!
//! # Example
//!
//! ```ignore
//! use dydx_core::signing::{OrderSide, Signable, SignableOrder};
//! use dydx_core::NetworkId;
//!
//! let order = SignableOrder::builder(NetworkId::Mainnet)
//!     .market("BTC-USD")
//!     .side(OrderSide::Buy)
//!     .position_id(12345)
//!     .size(Decimal::new(15, 1))
//!     .price(Decimal::new(5000025, 2))
//!     .limit_fee(Decimal::new(5, 4))
//!     .client_id("my-order-1")
//!     .expiration(1_700_000_000)
//!     .build()?;
//!
//! let signature = order.sign(&stark_key)?;
//! ```

pub mod api_request;
pub mod order;
pub mod packing;
pub mod quantums;
pub mod transfer;
pub mod withdrawal;

use stark_crypto::{pedersen_hash_chain, FieldElement, StarkPrivateKey, StarkPublicKey, StarkSignature};
use tracing::debug;

use crate::error::Result;

pub use api_request::{ApiRequestParams, RequestMethod, SignableApiRequest};
pub use order::{OrderBuilder, OrderParams, OrderSide, SignableOrder};
pub use packing::BitPacker;
pub use transfer::{SignableTransfer, TransferParams};
pub use withdrawal::{SignableWithdrawal, WithdrawalParams};

/// An action the STARK key can sign.
pub trait Signable {
    /// Short name used in logs.
    fn action(&self) -> &'static str;

    /// Canonical field-element encoding of the action.
    fn field_elements(&self) -> Result<Vec<FieldElement>>;

    /// Left-fold Pedersen hash of [`Signable::field_elements`].
    fn message_hash(&self) -> Result<FieldElement> {
        let hash = pedersen_hash_chain(&self.field_elements()?)?;
        debug!(action = self.action(), hash = %hash, "computed STARK message hash");
        Ok(hash)
    }

    fn sign(&self, private_key: &StarkPrivateKey) -> Result<StarkSignature> {
        Ok(private_key.sign(&self.message_hash()?)?)
    }

    /// `Ok(false)` for a signature that does not match; errors for malformed input.
    fn verify(&self, public_key: &StarkPublicKey, signature: &StarkSignature) -> Result<bool> {
        Ok(public_key.verify(&self.message_hash()?, signature)?)
    }
}
