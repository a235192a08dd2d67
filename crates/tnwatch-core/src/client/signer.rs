//! Request signing with the secp256k1 private key
//!
//! The sender is identified by its Ethereum address and every request body is
//! signed as an EIP-191 personal message.

use std::fmt;

use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::PublicKey;
use sha3::{Digest, Keccak256};

use crate::credential::Credential;
use crate::error::{Error, Result};

const ADDRESS_LEN: usize = 20;
const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Signs request bodies on behalf of the credential holder
#[derive(Clone)]
pub struct Signer {
    key: SigningKey,
    address: String,
}

impl Signer {
    /// Decode a hex private key (an optional `0x` prefix is accepted)
    pub fn from_credential(credential: &Credential) -> Result<Self> {
        let raw = credential.expose();
        let hex_part = raw.strip_prefix("0x").unwrap_or(raw);

        let bytes = hex::decode(hex_part)
            .map_err(|e| Error::client_init(format!("Failed to create private key: {e}")))?;
        let key = SigningKey::from_slice(&bytes)
            .map_err(|e| Error::client_init(format!("Failed to create private key: {e}")))?;
        let address = address_of(&key);

        Ok(Self { key, address })
    }

    /// Lowercase `0x`-prefixed address of the key
    pub fn address(&self) -> &str {
        &self.address
    }

    /// 65-byte `r || s || v` signature over the personal message `body`, hex encoded
    pub fn sign(&self, body: &[u8]) -> Result<String> {
        let digest = personal_message_hash(body);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| Error::client_init(format!("Failed to sign request: {e}")))?;

        let mut bytes = signature.to_bytes().to_vec();
        bytes.push(recovery_id.to_byte() + 27);
        Ok(format!("0x{}", hex::encode(bytes)))
    }
}

/// keccak256 of the uncompressed public key, last 20 bytes
fn address_of(key: &SigningKey) -> String {
    let point = PublicKey::from(key.verifying_key()).to_encoded_point(false);
    let digest = Keccak256::digest(&point.as_bytes()[1..]);
    format!("0x{}", hex::encode(&digest[digest.len() - ADDRESS_LEN..]))
}

fn personal_message_hash(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.address)
            .finish()
    }
}
