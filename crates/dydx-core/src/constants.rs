//! Protocol constants: networks, markets and asset resolutions.

use alloy_primitives::{uint, U256};
use serde::{Deserialize, Serialize};
use stark_crypto::FieldElement;
use std::fmt;

use crate::error::{Error, Result};

/// Decimal exponent of the USDC collateral asset.
pub const COLLATERAL_RESOLUTION_EXPONENT: u32 = 6;

/// Hours added to an order's expiration before it is signed.
pub const ORDER_SIGNATURE_EXPIRATION_BUFFER_HOURS: u64 = 24 * 7;

pub const ONE_HOUR_IN_SECONDS: u64 = 60 * 60;

const COLLATERAL_ASSET_ID_MAINNET: U256 =
    uint!(0x02893294412a4c8f915f75892b395ebbf6859ec246ec365c3b1f56f47c3a0a5d_U256);
const COLLATERAL_ASSET_ID_ROPSTEN: U256 =
    uint!(0x02c04d8b650f44092278a7cb1e1028c82025dff622db96c934b611b84cc8de5a_U256);
const COLLATERAL_ASSET_ID_GOERLI: U256 =
    uint!(0x03bda2b4764039f2df44a00a9cf1d1569a83f95406a983ce4beb95791c376008_U256);

/// Ethereum networks the exchange is deployed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum NetworkId {
    #[default]
    Mainnet,
    Ropsten,
    Goerli,
}

impl NetworkId {
    pub fn chain_id(&self) -> u64 {
        match self {
            NetworkId::Mainnet => 1,
            NetworkId::Ropsten => 3,
            NetworkId::Goerli => 5,
        }
    }

    pub fn from_chain_id(chain_id: u64) -> Result<Self> {
        match chain_id {
            1 => Ok(NetworkId::Mainnet),
            3 => Ok(NetworkId::Ropsten),
            5 => Ok(NetworkId::Goerli),
            other => Err(Error::Config {
                message: format!("unsupported network id {other}"),
            }),
        }
    }

    /// STARK asset id of the USDC collateral on this network.
    pub fn collateral_asset_id(&self) -> FieldElement {
        let id = match self {
            NetworkId::Mainnet => COLLATERAL_ASSET_ID_MAINNET,
            NetworkId::Ropsten => COLLATERAL_ASSET_ID_ROPSTEN,
            NetworkId::Goerli => COLLATERAL_ASSET_ID_GOERLI,
        };
        FieldElement::reduce(id)
    }
}

impl TryFrom<u64> for NetworkId {
    type Error = Error;

    fn try_from(chain_id: u64) -> Result<Self> {
        Self::from_chain_id(chain_id)
    }
}

impl From<NetworkId> for u64 {
    fn from(network: NetworkId) -> Self {
        network.chain_id()
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.chain_id())
    }
}

/// A perpetual market quoted in USD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Market {
    /// e.g. `BTC-USD`
    pub symbol: &'static str,
    /// Synthetic asset, e.g. `BTC`
    pub asset: &'static str,
    /// Quantums per unit are `10^resolution_exponent`.
    pub resolution_exponent: u32,
}

impl Market {
    /// Look up a market by symbol (`BTC-USD`, case-insensitive).
    pub fn from_symbol(symbol: &str) -> Result<&'static Market> {
        MARKETS
            .iter()
            .find(|m| m.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| Error::encoding(format!("unknown market {symbol}")))
    }

    /// Synthetic asset id: ASCII `"<ASSET>-<exponent>"` right-padded to 15 bytes.
    pub fn synthetic_asset_id(&self) -> Result<FieldElement> {
        let label = format!("{}-{}", self.asset, self.resolution_exponent);
        let bytes = label.as_bytes();
        if bytes.len() > 15 {
            return Err(Error::encoding(format!("asset label {label} exceeds 15 bytes")));
        }
        let mut buf = [0u8; 32];
        buf[17..17 + bytes.len()].copy_from_slice(bytes);
        Ok(FieldElement::reduce(U256::from_be_bytes(buf)))
    }
}

macro_rules! markets {
    ($(($asset:literal, $exp:literal)),* $(,)?) => {
        &[$(Market {
            symbol: concat!($asset, "-USD"),
            asset: $asset,
            resolution_exponent: $exp,
        }),*]
    };
}

/// Markets with their synthetic resolutions.
pub const MARKETS: &[Market] = markets![
    ("BTC", 10),
    ("ETH", 9),
    ("LINK", 7),
    ("AAVE", 8),
    ("UNI", 7),
    ("SUSHI", 7),
    ("SOL", 7),
    ("YFI", 10),
    ("1INCH", 7),
    ("AVAX", 7),
    ("SNX", 7),
    ("CRV", 6),
    ("UMA", 7),
    ("DOT", 7),
    ("DOGE", 5),
    ("MATIC", 6),
    ("MKR", 9),
    ("FIL", 7),
    ("ADA", 6),
    ("ATOM", 7),
    ("COMP", 8),
    ("BCH", 8),
    ("LTC", 8),
    ("EOS", 6),
    ("ALGO", 6),
    ("ZRX", 6),
    ("XMR", 8),
    ("ZEC", 8),
    ("ENJ", 6),
    ("ETC", 7),
    ("XLM", 5),
    ("TRX", 4),
    ("XTZ", 6),
    ("HNT", 7),
    ("ICP", 7),
    ("RUNE", 6),
    ("LUNA", 6),
    ("NEAR", 6),
    ("AR", 7),
    ("FLOW", 7),
    ("PERP", 6),
    ("REN", 5),
    ("CELO", 6),
    ("KSM", 8),
    ("BAL", 7),
    ("BNT", 6),
    ("MIR", 6),
    ("SRM", 6),
    ("LON", 6),
    ("DODO", 6),
    ("ALPHA", 5),
    ("WNXM", 7),
    ("XCH", 8),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_asset_ids() {
        let cases = [
            ("BTC-USD", "0x4254432d3130000000000000000000"),
            ("ETH-USD", "0x4554482d3900000000000000000000"),
            ("1INCH-USD", "0x31494e43482d370000000000000000"),
        ];
        for (symbol, expected) in cases {
            let market = Market::from_symbol(symbol).unwrap();
            assert_eq!(market.synthetic_asset_id().unwrap().to_hex(), expected);
        }
    }

    #[test]
    fn test_market_lookup() {
        assert_eq!(Market::from_symbol("btc-usd").unwrap().resolution_exponent, 10);
        assert!(matches!(
            Market::from_symbol("FOO-USD"),
            Err(Error::Encoding { .. })
        ));
        assert_eq!(MARKETS.len(), 53);
    }

    #[test]
    fn test_network_ids() {
        assert_eq!(NetworkId::from_chain_id(3).unwrap(), NetworkId::Ropsten);
        assert!(NetworkId::from_chain_id(42).is_err());
        assert_eq!(
            NetworkId::Mainnet.collateral_asset_id().to_hex(),
            "0x2893294412a4c8f915f75892b395ebbf6859ec246ec365c3b1f56f47c3a0a5d"
        );
        assert_ne!(
            NetworkId::Mainnet.collateral_asset_id(),
            NetworkId::Ropsten.collateral_asset_id()
        );
    }

    #[test]
    fn test_network_id_serde() {
        let json = serde_json::to_string(&NetworkId::Goerli).unwrap();
        assert_eq!(json, "5");
        let parsed: NetworkId = serde_json::from_str("3").unwrap();
        assert_eq!(parsed, NetworkId::Ropsten);
        assert!(serde_json::from_str::<NetworkId>("2").is_err());
    }
}
