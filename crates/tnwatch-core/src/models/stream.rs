//! Stream identity models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

const STREAM_ID_PREFIX: &str = "st";
const STREAM_ID_LEN: usize = 32;
const ADDRESS_HEX_LEN: usize = 40;

/// Identifier of a stream on the network: `st` + 30 lowercase hex chars
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StreamId(String);

impl StreamId {
    /// Parse an already-formed stream id
    pub fn parse(raw: &str) -> Result<Self> {
        if Self::is_well_formed(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(Error::InvalidStreamId(raw.to_string()))
        }
    }

    /// Derive a stream id from a human-readable stream name
    pub fn generate(name: &str) -> Self {
        let digest = hex::encode(Sha256::digest(name.as_bytes()));
        let tail_len = STREAM_ID_LEN - STREAM_ID_PREFIX.len();
        Self(format!("{STREAM_ID_PREFIX}{}", &digest[..tail_len]))
    }

    /// Use `raw` verbatim when it is a stream id, otherwise derive one from it
    pub fn from_id_or_name(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::InvalidStreamId(raw.to_string()));
        }
        if Self::is_well_formed(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Ok(Self::generate(raw))
        }
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_well_formed(raw: &str) -> bool {
        raw.len() == STREAM_ID_LEN
            && raw.starts_with(STREAM_ID_PREFIX)
            && raw[STREAM_ID_PREFIX.len()..]
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for StreamId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<StreamId> for String {
    fn from(id: StreamId) -> Self {
        id.0
    }
}

/// Address of the account that publishes a stream
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderAddress(String);

impl ProviderAddress {
    /// The lowercase `0x`-prefixed address
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ProviderAddress {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let hex_part = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| Error::invalid_address(raw, "missing 0x prefix"))?;

        if hex_part.len() != ADDRESS_HEX_LEN {
            return Err(Error::invalid_address(
                raw,
                format!("expected {ADDRESS_HEX_LEN} hex characters, got {}", hex_part.len()),
            ));
        }
        if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::invalid_address(raw, "contains non-hex characters"));
        }

        Ok(Self(format!("0x{}", hex_part.to_ascii_lowercase())))
    }
}

impl fmt::Display for ProviderAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProviderAddress {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ProviderAddress> for String {
    fn from(address: ProviderAddress) -> Self {
        address.0
    }
}

/// A stream on the network, scoped by its provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamLocator {
    /// Stream identifier
    pub stream_id: StreamId,
    /// Publisher of the stream
    pub data_provider: ProviderAddress,
}

impl StreamLocator {
    /// Build a locator from configured strings
    pub fn from_config(stream: &str, provider: &str) -> Result<Self> {
        Ok(Self {
            stream_id: StreamId::from_id_or_name(stream)?,
            data_provider: provider.parse()?,
        })
    }
}

impl fmt::Display for StreamLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.stream_id, self.data_provider)
    }
}

/// Whether a stream holds measurements or is derived from other streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    /// Holds raw measurements
    Primitive,
    /// Weighted composition of other streams
    Composed,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive => f.write_str("primitive"),
            Self::Composed => f.write_str("composed"),
        }
    }
}
