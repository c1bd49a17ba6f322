//! dYdX signing core
//!
//! Encodes exchange actions into STARK field elements, signs them with the
//! account's STARK key, and gates each client capability on the credentials
//! it needs.

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod helpers;
pub mod signing;

pub use client::{ApiKeys, Client, Onboarding, Private, Public};
pub use config::{ClientConfig, Credentials};
pub use constants::{Market, NetworkId, MARKETS};
pub use error::{Error, Result};
pub use helpers::{generate_random_client_id, nonce_from_client_id};
pub use signing::{
    ApiRequestParams, OrderBuilder, OrderParams, OrderSide, RequestMethod, Signable,
    SignableApiRequest, SignableOrder, SignableTransfer, SignableWithdrawal, TransferParams,
    WithdrawalParams,
};
