//! STARK-signed API requests.
//!
//! Field layout (version 1):
//!
//! ```text
//! [1, method, keccak_felt(request_path), keccak_felt(body), timestamp_seconds]
//! ```

use alloy_primitives::{keccak256, U256};
use serde::{Deserialize, Serialize};
use stark_crypto::FieldElement;
use std::fmt;
use std::str::FromStr;

use super::Signable;
use crate::error::{Error, Result};
use crate::helpers::iso_to_epoch_seconds;

const API_REQUEST_VERSION: u64 = 1;

/// HTTP method, encoded by its discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl RequestMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Delete => "DELETE",
        }
    }

    pub fn code(&self) -> u64 {
        *self as u64
    }
}

impl FromStr for RequestMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(RequestMethod::Get),
            "POST" => Ok(RequestMethod::Post),
            "PUT" => Ok(RequestMethod::Put),
            "DELETE" => Ok(RequestMethod::Delete),
            other => Err(Error::encoding(format!("unsupported request method {other}"))),
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequestParams {
    pub method: RequestMethod,
    /// Path including the query string, e.g. `/v3/orders?market=BTC-USD`.
    pub request_path: String,
    /// Serialized JSON body, empty for requests without one.
    pub body: String,
    pub iso_timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignableApiRequest {
    method: RequestMethod,
    request_path: String,
    body: String,
    timestamp_seconds: u64,
}

impl SignableApiRequest {
    pub fn new(
        method: RequestMethod,
        request_path: impl Into<String>,
        body: impl Into<String>,
        iso_timestamp: &str,
    ) -> Result<Self> {
        let seconds = iso_to_epoch_seconds(iso_timestamp)?;
        let timestamp_seconds = u64::try_from(seconds).map_err(|_| {
            Error::encoding(format!("timestamp {iso_timestamp} is before the epoch"))
        })?;
        Ok(Self {
            method,
            request_path: request_path.into(),
            body: body.into(),
            timestamp_seconds,
        })
    }

    pub fn from_params(params: &ApiRequestParams) -> Result<Self> {
        Self::new(
            params.method,
            params.request_path.as_str(),
            params.body.as_str(),
            &params.iso_timestamp,
        )
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }

    pub fn request_path(&self) -> &str {
        &self.request_path
    }

    pub fn timestamp_seconds(&self) -> u64 {
        self.timestamp_seconds
    }
}

/// Keccak-256 of `text`, shifted into the field.
fn keccak_felt(text: &str) -> Result<FieldElement> {
    let digest = U256::from_be_bytes(keccak256(text.as_bytes()).0);
    Ok(FieldElement::new(digest >> 5)?)
}

impl Signable for SignableApiRequest {
    fn action(&self) -> &'static str {
        "api_request"
    }

    fn field_elements(&self) -> Result<Vec<FieldElement>> {
        Ok(vec![
            FieldElement::from(API_REQUEST_VERSION),
            FieldElement::from(self.method.code()),
            keccak_felt(&self.request_path)?,
            keccak_felt(&self.body)?,
            FieldElement::from(self.timestamp_seconds),
        ])
    }
}
