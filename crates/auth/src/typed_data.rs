//! EIP-712 typed data with string-typed struct fields.
//!
//! Every message the exchange asks a wallet to sign is a flat struct named
//! `dYdX` whose members are all `string`, under a domain without a
//! verifying contract. That keeps encoding to a hash per field.

use alloy_primitives::{keccak256, B256, U256};
use alloy_sol_types::SolValue;
use serde_json::{json, Map, Value};

use crate::error::Result;

/// Domain name shared by all exchange messages.
pub const DOMAIN_NAME: &str = "dYdX";

/// Domain version shared by all exchange messages.
pub const DOMAIN_VERSION: &str = "1.0";

/// Primary type of all exchange messages.
pub const PRIMARY_TYPE: &str = "dYdX";

const DOMAIN_TYPE: &str = "EIP712Domain(string name,string version,uint256 chainId)";

/// EIP-712 domain `{name, version, chainId}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip712Domain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
}

impl Eip712Domain {
    /// The exchange domain on `chain_id`.
    pub fn dydx(chain_id: u64) -> Self {
        Self {
            name: DOMAIN_NAME.to_string(),
            version: DOMAIN_VERSION.to_string(),
            chain_id,
        }
    }

    /// Compute the EIP-712 domain separator hash.
    pub fn separator(&self) -> B256 {
        let domain_type_hash = keccak256(DOMAIN_TYPE.as_bytes());
        let name_hash = keccak256(self.name.as_bytes());
        let version_hash = keccak256(self.version.as_bytes());

        let encoded = (
            domain_type_hash,
            name_hash,
            version_hash,
            U256::from(self.chain_id),
        )
            .abi_encode_packed();

        keccak256(&encoded)
    }

    fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "version": self.version,
            "chainId": self.chain_id,
        })
    }
}

/// A typed-data message: domain plus ordered `(field, value)` string members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedDataMessage {
    domain: Eip712Domain,
    primary_type: String,
    fields: Vec<(String, String)>,
}

impl TypedDataMessage {
    pub fn new(domain: Eip712Domain, primary_type: impl Into<String>) -> Self {
        Self {
            domain,
            primary_type: primary_type.into(),
            fields: Vec::new(),
        }
    }

    /// Append a `string` member. Order matters for the type hash.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn domain(&self) -> &Eip712Domain {
        &self.domain
    }

    pub fn chain_id(&self) -> u64 {
        self.domain.chain_id
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Value of a member by name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// e.g. `dYdX(string action,string onlySignOn)`
    pub fn type_string(&self) -> String {
        let members: Vec<String> = self
            .fields
            .iter()
            .map(|(name, _)| format!("string {name}"))
            .collect();
        format!("{}({})", self.primary_type, members.join(","))
    }

    pub fn struct_hash(&self) -> B256 {
        let mut encoded = Vec::with_capacity(32 * (self.fields.len() + 1));
        encoded.extend_from_slice(keccak256(self.type_string().as_bytes()).as_slice());
        for (_, value) in &self.fields {
            encoded.extend_from_slice(keccak256(value.as_bytes()).as_slice());
        }
        keccak256(&encoded)
    }

    /// `keccak256("\x19\x01" ++ domainSeparator ++ structHash)`
    pub fn signing_hash(&self) -> B256 {
        let prefix = [0x19u8, 0x01];
        let data = (prefix, self.domain.separator(), self.struct_hash()).abi_encode_packed();
        keccak256(&data)
    }

    /// Payload for `eth_signTypedData_v4`.
    pub fn to_json(&self) -> Value {
        let members: Vec<Value> = self
            .fields
            .iter()
            .map(|(name, _)| json!({ "name": name, "type": "string" }))
            .collect();

        let mut message = Map::new();
        for (name, value) in &self.fields {
            message.insert(name.clone(), Value::String(value.clone()));
        }

        let mut types = Map::new();
        types.insert(
            "EIP712Domain".to_string(),
            json!([
                { "name": "name", "type": "string" },
                { "name": "version", "type": "string" },
                { "name": "chainId", "type": "uint256" },
            ]),
        );
        types.insert(self.primary_type.clone(), Value::Array(members));

        json!({
            "types": types,
            "domain": self.domain.to_json(),
            "primaryType": self.primary_type,
            "message": message,
        })
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_json())?)
    }
}
