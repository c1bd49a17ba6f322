//! Limit orders.
//!
//! Field layout (prefix 3):
//!
//! ```text
//! [asset_sell, asset_buy, asset_fee, part1, part2]
//! part1 = q_sell (64) | q_buy (64) | q_fee (64) | nonce (32)
//! part2 = 3 (10) | position (64) x 3 | expiration_hours (32) | 0 (17)
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stark_crypto::FieldElement;
use std::fmt;
use std::str::FromStr;

use super::packing::{BitPacker, PREFIX_BITS};
use super::quantums::{integral_u64, to_quantums_exact, truncate_fee_rate, Rounding};
use super::Signable;
use crate::constants::{
    Market, NetworkId, COLLATERAL_RESOLUTION_EXPONENT, ORDER_SIGNATURE_EXPIRATION_BUFFER_HOURS,
};
use crate::error::{Error, Result};
use crate::helpers::{epoch_seconds_to_hours, iso_to_epoch_hours, nonce_from_client_id};

const ORDER_PREFIX: u64 = 3;
const ORDER_PADDING_BITS: usize = 17;

/// Order side. A buy sells collateral for the synthetic asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }

    /// Buys round the collateral cost up, sells round the proceeds down.
    fn collateral_rounding(&self) -> Rounding {
        match self {
            OrderSide::Buy => Rounding::Up,
            OrderSide::Sell => Rounding::Down,
        }
    }
}

impl FromStr for OrderSide {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Ok(OrderSide::Buy),
            "SELL" => Ok(OrderSide::Sell),
            other => Err(Error::encoding(format!("unknown order side {other}"))),
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable order parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderParams {
    pub network_id: NetworkId,
    pub market: String,
    pub side: OrderSide,
    pub position_id: u64,
    pub human_size: Decimal,
    pub human_price: Decimal,
    pub limit_fee: Decimal,
    pub client_id: String,
    pub expiration_epoch_seconds: u64,
}

/// An order reduced to quantums, ready to hash and sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignableOrder {
    network_id: NetworkId,
    side: OrderSide,
    position_id: u64,
    synthetic_asset_id: FieldElement,
    collateral_asset_id: FieldElement,
    quantums_synthetic: u64,
    quantums_collateral: u64,
    quantums_fee: u64,
    nonce: u32,
    expiration_epoch_hours: u64,
}

impl SignableOrder {
    pub fn builder(network_id: NetworkId) -> OrderBuilder {
        OrderBuilder::new(network_id)
    }

    pub fn from_params(params: &OrderParams) -> Result<Self> {
        OrderBuilder::new(params.network_id)
            .market(params.market.as_str())
            .side(params.side)
            .position_id(params.position_id)
            .size(params.human_size)
            .price(params.human_price)
            .limit_fee(params.limit_fee)
            .client_id(&params.client_id)
            .expiration(params.expiration_epoch_seconds)
            .build()
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }

    pub fn side(&self) -> OrderSide {
        self.side
    }

    pub fn position_id(&self) -> u64 {
        self.position_id
    }

    pub fn quantums_synthetic(&self) -> u64 {
        self.quantums_synthetic
    }

    pub fn quantums_collateral(&self) -> u64 {
        self.quantums_collateral
    }

    pub fn quantums_fee(&self) -> u64 {
        self.quantums_fee
    }

    pub fn nonce(&self) -> u32 {
        self.nonce
    }

    /// Signed expiration, including the signature buffer.
    pub fn expiration_epoch_hours(&self) -> u64 {
        self.expiration_epoch_hours
    }

    /// `(asset_sell, asset_buy, quantums_sell, quantums_buy)`
    fn legs(&self) -> (FieldElement, FieldElement, u64, u64) {
        match self.side {
            OrderSide::Buy => (
                self.collateral_asset_id,
                self.synthetic_asset_id,
                self.quantums_collateral,
                self.quantums_synthetic,
            ),
            OrderSide::Sell => (
                self.synthetic_asset_id,
                self.collateral_asset_id,
                self.quantums_synthetic,
                self.quantums_collateral,
            ),
        }
    }
}

impl Signable for SignableOrder {
    fn action(&self) -> &'static str {
        "order"
    }

    fn field_elements(&self) -> Result<Vec<FieldElement>> {
        let (asset_sell, asset_buy, quantums_sell, quantums_buy) = self.legs();

        let part1 = BitPacker::new()
            .push(quantums_sell, 64)?
            .push(quantums_buy, 64)?
            .push(self.quantums_fee, 64)?
            .push(u64::from(self.nonce), 32)?
            .finish()?;

        let part2 = BitPacker::new()
            .push(ORDER_PREFIX, PREFIX_BITS)?
            .push(self.position_id, 64)?
            .push(self.position_id, 64)?
            .push(self.position_id, 64)?
            .push(self.expiration_epoch_hours, 32)?
            .pad(ORDER_PADDING_BITS)?
            .finish()?;

        Ok(vec![
            asset_sell,
            asset_buy,
            self.collateral_asset_id,
            part1,
            part2,
        ])
    }
}

/// Builder for [`SignableOrder`] with a fluent API.
#[derive(Debug, Clone)]
pub struct OrderBuilder {
    network_id: NetworkId,
    market: Option<String>,
    side: OrderSide,
    position_id: Option<u64>,
    size: Option<Decimal>,
    price: Option<Decimal>,
    limit_fee: Option<Decimal>,
    nonce: Option<u32>,
    expiration: Option<Expiration>,
}

#[derive(Debug, Clone)]
enum Expiration {
    Seconds(u64),
    Iso(String),
}

impl Expiration {
    fn epoch_hours(&self) -> Result<u64> {
        match self {
            Expiration::Seconds(seconds) => Ok(epoch_seconds_to_hours(*seconds)),
            Expiration::Iso(iso) => iso_to_epoch_hours(iso),
        }
    }
}

impl OrderBuilder {
    pub fn new(network_id: NetworkId) -> Self {
        Self {
            network_id,
            market: None,
            side: OrderSide::Buy,
            position_id: None,
            size: None,
            price: None,
            limit_fee: None,
            nonce: None,
            expiration: None,
        }
    }

    /// Market symbol, e.g. `BTC-USD`.
    pub fn market(mut self, market: impl Into<String>) -> Self {
        self.market = Some(market.into());
        self
    }

    pub fn side(mut self, side: OrderSide) -> Self {
        self.side = side;
        self
    }

    pub fn position_id(mut self, position_id: u64) -> Self {
        self.position_id = Some(position_id);
        self
    }

    /// Size in units of the synthetic asset.
    pub fn size(mut self, size: Decimal) -> Self {
        self.size = Some(size);
        self
    }

    /// Limit price in USD.
    pub fn price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Maximum fee as a fraction of the collateral amount.
    pub fn limit_fee(mut self, limit_fee: Decimal) -> Self {
        self.limit_fee = Some(limit_fee);
        self
    }

    /// Set the nonce directly.
    pub fn nonce(mut self, nonce: u32) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Derive the nonce from a client id.
    pub fn client_id(mut self, client_id: &str) -> Self {
        self.nonce = Some(nonce_from_client_id(client_id));
        self
    }

    /// Absolute expiration in seconds since epoch.
    pub fn expiration(mut self, epoch_seconds: u64) -> Self {
        self.expiration = Some(Expiration::Seconds(epoch_seconds));
        self
    }

    /// Absolute expiration as an ISO-8601 timestamp.
    pub fn expiration_iso(mut self, iso: &str) -> Self {
        self.expiration = Some(Expiration::Iso(iso.to_string()));
        self
    }

    /// Build the order, quantizing every amount.
    ///
    /// Fails with [`Error::Encoding`] when a required field is missing, the
    /// size is finer than the market resolution, or a value exceeds its width.
    pub fn build(self) -> Result<SignableOrder> {
        let market_symbol = self.market.ok_or_else(|| missing("market"))?;
        let position_id = self.position_id.ok_or_else(|| missing("position_id"))?;
        let size = self.size.ok_or_else(|| missing("size"))?;
        let price = self.price.ok_or_else(|| missing("price"))?;
        let limit_fee = self.limit_fee.ok_or_else(|| missing("limit_fee"))?;
        let nonce = self.nonce.ok_or_else(|| missing("nonce or client_id"))?;
        let expiration_hours = self
            .expiration
            .ok_or_else(|| missing("expiration"))?
            .epoch_hours()?;

        if price.is_sign_negative() || limit_fee.is_sign_negative() {
            return Err(Error::encoding("price and limit fee must not be negative"));
        }

        let market = Market::from_symbol(&market_symbol)?;
        let quantums_synthetic = to_quantums_exact(size, market.resolution_exponent)?;

        let collateral_scale = Decimal::from(10u64.pow(COLLATERAL_RESOLUTION_EXPONENT));
        let cost = size
            .checked_mul(price)
            .and_then(|c| c.checked_mul(collateral_scale))
            .ok_or_else(|| Error::encoding("order cost overflows"))?;
        let quantums_collateral = integral_u64(cost, self.side.collateral_rounding())?;

        let fee = truncate_fee_rate(limit_fee)
            .checked_mul(Decimal::from(quantums_collateral))
            .ok_or_else(|| Error::encoding("order fee overflows"))?;
        let quantums_fee = integral_u64(fee, Rounding::Up)?;

        let expiration_epoch_hours = expiration_hours + ORDER_SIGNATURE_EXPIRATION_BUFFER_HOURS;

        Ok(SignableOrder {
            network_id: self.network_id,
            side: self.side,
            position_id,
            synthetic_asset_id: market.synthetic_asset_id()?,
            collateral_asset_id: self.network_id.collateral_asset_id(),
            quantums_synthetic,
            quantums_collateral,
            quantums_fee,
            nonce,
            expiration_epoch_hours,
        })
    }
}

fn missing(field: &str) -> Error {
    Error::encoding(format!("order is missing {field}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stark_crypto::{StarkPrivateKey, StarkSignature};

    const MOCK_PRIVATE_KEY: &str =
        "0x58c7d5a90b1776bde86ebac077e053ed85b0f7164f53b080304a531947f46e3";

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn key() -> StarkPrivateKey {
        StarkPrivateKey::from_hex(MOCK_PRIVATE_KEY).unwrap()
    }

    fn btc_order(side: OrderSide) -> SignableOrder {
        SignableOrder::builder(NetworkId::Mainnet)
            .market("BTC-USD")
            .side(side)
            .position_id(12345)
            .size(d("1.5"))
            .price(d("50000.25"))
            .limit_fee(d("0.0005"))
            .nonce(42)
            .expiration(1_700_000_000)
            .build()
            .unwrap()
    }

    fn reference_params(network_id: NetworkId) -> OrderParams {
        OrderParams {
            network_id,
            market: "ETH-USD".to_string(),
            side: OrderSide::Buy,
            position_id: 12345,
            human_size: d("145.0005"),
            human_price: d("350.00067"),
            limit_fee: d("0.125"),
            client_id: "This is an ID that the client came up with to describe this order"
                .to_string(),
            expiration_epoch_seconds: 1_600_316_155,
        }
    }

    #[test]
    fn test_btc_order_quantums() {
        let order = btc_order(OrderSide::Buy);
        assert_eq!(order.quantums_synthetic(), 15_000_000_000);
        assert_eq!(order.quantums_collateral(), 75_000_375_000);
        assert_eq!(order.quantums_fee(), 37_500_188);
        assert_eq!(order.expiration_epoch_hours(), 472_391);
    }

    #[test]
    fn test_btc_order_encoding() {
        let elements = btc_order(OrderSide::Buy).field_elements().unwrap();
        assert_eq!(elements.len(), 5);
        assert_eq!(elements[0], NetworkId::Mainnet.collateral_asset_id());
        assert_eq!(elements[1].to_hex(), "0x4254432d3130000000000000000000");
        assert_eq!(elements[2], NetworkId::Mainnet.collateral_asset_id());
        assert_eq!(
            elements[3].to_hex(),
            "0x11765ee6d8000000037e11d60000000000023c351c0000002a"
        );
        assert_eq!(
            elements[4].to_hex(),
            "0x6000000000000607200000000000060720000000000006072000e6a8e0000"
        );
    }

    #[test]
    fn test_btc_order_hash_and_signature() {
        let order = btc_order(OrderSide::Buy);
        assert_eq!(
            order.message_hash().unwrap().to_hex(),
            "0x7a311ff153d4ef43b939d4f3e3dcda7ec225445c4b34f3d1f43a9373331c540"
        );
        let signature = order.sign(&key()).unwrap();
        assert_eq!(
            signature.to_hex(),
            "05795bec71cde66038993532696808579c28bf86d3e8b3d843bf1a85a1284b17\
             02259eca757ae11b04a528a5f09a0df8b1849f8250fe4b5b9b1863bfd6c5d68b"
        );
        assert!(order.verify(&key().public_key().unwrap(), &signature).unwrap());
    }

    #[test]
    fn test_sell_swaps_legs() {
        let sell = btc_order(OrderSide::Sell);
        let elements = sell.field_elements().unwrap();
        assert_eq!(elements[0].to_hex(), "0x4254432d3130000000000000000000");
        assert_eq!(elements[1], NetworkId::Mainnet.collateral_asset_id());
        assert_eq!(
            sell.message_hash().unwrap().to_hex(),
            "0x4d23dc8c3fa6fc5ce04cb29ae25df96bcc41df070b06c761f22478c0c7ae5cb"
        );
    }

    #[test]
    fn test_reference_client_signature() {
        let order = SignableOrder::from_params(&reference_params(NetworkId::Ropsten)).unwrap();
        assert_eq!(order.quantums_synthetic(), 145_000_500_000);
        assert_eq!(order.quantums_collateral(), 50_750_272_151);
        assert_eq!(order.quantums_fee(), 6_343_784_019);
        assert_eq!(order.nonce(), 3_780_429_809);
        assert_eq!(order.expiration_epoch_hours(), 444_701);

        let signature = order.sign(&key()).unwrap();
        assert_eq!(
            signature.to_hex(),
            "00cecbe513ecdbf782cd02b2a5efb03e58d5f63d15f2b840e9bc0029af04e8dd\
             0090b822b16f50b2120e4ea9852b340f7936ff6069d02acca02f2ed03029ace5"
        );
    }

    #[test]
    fn test_reference_client_signature_mainnet() {
        let order = SignableOrder::from_params(&reference_params(NetworkId::Mainnet)).unwrap();
        let expected = StarkSignature::from_hex(
            "023e5e21b01530bf738ba46d93b0970c5abe6fdd3b55758ada056c0ca3b8bee3\
             056b984070ae9c32e3c32b3a31d236f3f9f8d3080bb5f63cf68dc61b696243da",
        )
        .unwrap();
        assert_eq!(order.sign(&key()).unwrap(), expected);
    }

    #[test]
    fn test_iso_expiration_matches_seconds() {
        let from_iso = SignableOrder::builder(NetworkId::Ropsten)
            .market("ETH-USD")
            .position_id(12345)
            .size(d("145.0005"))
            .price(d("350.00067"))
            .limit_fee(d("0.125"))
            .client_id("This is an ID that the client came up with to describe this order")
            .expiration_iso("2020-09-17T04:15:55.028Z")
            .build()
            .unwrap();
        let from_params = SignableOrder::from_params(&reference_params(NetworkId::Ropsten)).unwrap();
        assert_eq!(from_iso, from_params);
    }

    fn expiring_at(iso: &str) -> SignableOrder {
        SignableOrder::builder(NetworkId::Ropsten)
            .market("ETH-USD")
            .position_id(12345)
            .size(d("145.0005"))
            .price(d("350.00067"))
            .limit_fee(d("0.125"))
            .nonce(1)
            .expiration_iso(iso)
            .build()
            .unwrap()
    }

    #[test]
    fn test_iso_expiration_rounds_fraction_up() {
        assert_eq!(
            expiring_at("2020-09-17T04:00:00.000Z").expiration_epoch_hours(),
            444_700
        );
        assert_eq!(
            expiring_at("2020-09-17T04:00:00.500Z").expiration_epoch_hours(),
            444_701
        );
    }

    fn order_sized(size: Decimal, price: Decimal) -> Result<SignableOrder> {
        SignableOrder::builder(NetworkId::Mainnet)
            .market("BTC-USD")
            .position_id(1)
            .size(size)
            .price(price)
            .limit_fee(d("0"))
            .nonce(1)
            .expiration(1_700_000_000)
            .build()
    }

    #[test]
    fn test_size_overflow_rejected() {
        assert!(matches!(
            order_sized(d("2000000000"), d("1")),
            Err(Error::Encoding { .. })
        ));
        assert!(matches!(
            order_sized(Decimal::MAX, d("1")),
            Err(Error::Encoding { .. })
        ));
    }

    #[test]
    fn test_price_overflow_rejected() {
        assert!(matches!(
            order_sized(d("1"), d("100000000000000")),
            Err(Error::Encoding { .. })
        ));
        assert!(order_sized(d("1"), d("50000")).is_ok());
    }

    #[test]
    fn test_wrong_key_does_not_verify() {
        let order = btc_order(OrderSide::Buy);
        let signature = order.sign(&key()).unwrap();
        let other = StarkPrivateKey::from_bytes(b"another key").unwrap();
        assert!(!order.verify(&other.public_key().unwrap(), &signature).unwrap());
    }

    #[test]
    fn test_size_finer_than_resolution() {
        let result = SignableOrder::builder(NetworkId::Mainnet)
            .market("BTC-USD")
            .position_id(1)
            .size(d("0.00000000001"))
            .price(d("1"))
            .limit_fee(d("0"))
            .nonce(1)
            .expiration(1_700_000_000)
            .build();
        assert!(matches!(result, Err(Error::Encoding { .. })));
    }

    #[test]
    fn test_missing_fields() {
        let result = SignableOrder::builder(NetworkId::Mainnet)
            .market("BTC-USD")
            .build();
        assert!(matches!(result, Err(Error::Encoding { .. })));
    }

    #[test]
    fn test_expiration_beyond_32_bits() {
        let order = SignableOrder::builder(NetworkId::Mainnet)
            .market("BTC-USD")
            .position_id(1)
            .size(d("1"))
            .price(d("1"))
            .limit_fee(d("0"))
            .nonce(1)
            .expiration(u64::from(u32::MAX) * 3600)
            .build()
            .unwrap();
        assert!(matches!(
            order.field_elements(),
            Err(Error::Encoding { .. })
        ));
    }

    #[test]
    fn test_side_parsing() {
        assert_eq!(OrderSide::from_str("buy").unwrap(), OrderSide::Buy);
        assert_eq!(OrderSide::Sell.to_string(), "SELL");
        assert!(OrderSide::from_str("hold").is_err());
    }
}
