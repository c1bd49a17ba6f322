//! Client configuration.

use crate::constants::NetworkId;
use crate::{Error, Result};
use serde::Deserialize;
use std::env;
use std::fmt;
use url::Url;

pub const DEFAULT_HOST: &str = "https://api.dydx.exchange";
pub const DEFAULT_API_TIMEOUT_MS: u64 = 3000;

/// Client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub network_id: NetworkId,
    #[serde(default = "default_api_timeout_ms")]
    pub api_timeout_ms: u64,
    #[serde(default)]
    pub credentials: Credentials,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_api_timeout_ms() -> u64 {
    DEFAULT_API_TIMEOUT_MS
}

/// Secret material. Every field is optional; the client only builds the
/// modules whose credentials are present.
#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    /// STARK key that signs orders, withdrawals and transfers.
    pub stark_private_key: Option<String>,
    /// STARK key that signs API requests.
    pub api_private_key: Option<String>,
    /// Ethereum key for onboarding and API-key management.
    pub eth_private_key: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(value: &Option<String>) -> &'static str {
            if value.is_some() {
                "<redacted>"
            } else {
                "<unset>"
            }
        }
        f.debug_struct("Credentials")
            .field("stark_private_key", &redact(&self.stark_private_key))
            .field("api_private_key", &redact(&self.api_private_key))
            .field("eth_private_key", &redact(&self.eth_private_key))
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            network_id: NetworkId::default(),
            api_timeout_ms: DEFAULT_API_TIMEOUT_MS,
            credentials: Credentials::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, network_id: NetworkId) -> Result<Self> {
        Self {
            host: host.into(),
            network_id,
            ..Self::default()
        }
        .validated()
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Load configuration from environment variables.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let network_id = match env::var("DYDX_NETWORK_ID") {
            Ok(raw) => {
                let chain_id: u64 = raw.parse().map_err(|_| Error::Config {
                    message: format!("DYDX_NETWORK_ID is not a number: {raw}"),
                })?;
                NetworkId::from_chain_id(chain_id)?
            }
            Err(_) => NetworkId::default(),
        };

        let api_timeout_ms = match env::var("DYDX_API_TIMEOUT_MS") {
            Ok(raw) => parse_timeout_ms(&raw)?,
            Err(_) => DEFAULT_API_TIMEOUT_MS,
        };

        Self {
            host: env::var("DYDX_HOST").unwrap_or_else(|_| default_host()),
            network_id,
            api_timeout_ms,
            credentials: Credentials {
                stark_private_key: env::var("DYDX_STARK_PRIVATE_KEY").ok(),
                api_private_key: env::var("DYDX_API_PRIVATE_KEY").ok(),
                eth_private_key: env::var("ETH_PRIVATE_KEY").ok(),
            },
        }
        .validated()
    }

    /// Load configuration from a file, overlaid with `DYDX_*` variables
    /// (`DYDX_CREDENTIALS__STARK_PRIVATE_KEY` for nested keys).
    #[allow(clippy::result_large_err)]
    pub fn from_file(path: &str) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("DYDX")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        config.validated()
    }

    fn validated(mut self) -> Result<Self> {
        let trimmed = self.host.trim_end_matches('/').to_string();
        Url::parse(&trimmed).map_err(|e| Error::Config {
            message: format!("invalid host {trimmed}: {e}"),
        })?;
        self.host = trimmed;
        Ok(self)
    }
}

fn parse_timeout_ms(raw: &str) -> Result<u64> {
    raw.trim().parse().map_err(|_| Error::Config {
        message: format!("DYDX_API_TIMEOUT_MS is not a number: {raw}"),
    })
}
