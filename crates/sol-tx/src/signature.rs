//! 64-byte Ed25519 signatures.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::address::Address;
use crate::error::SerializeError;

/// An Ed25519 signature as it appears on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; 64]);

impl Signature {
    pub const LEN: usize = 64;

    pub const fn new_from_array(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn from_base58(text: &str) -> Result<Self, SerializeError> {
        let bytes = bs58::decode(text)
            .into_vec()
            .map_err(|e| SerializeError::Malformed(format!("signature base58: {e}")))?;
        let bytes: [u8; 64] = bytes.try_into().map_err(|v: Vec<u8>| {
            SerializeError::Malformed(format!("signature must be 64 bytes, got {}", v.len()))
        })?;
        Ok(Self(bytes))
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    pub const fn to_bytes(self) -> [u8; 64] {
        self.0
    }

    pub fn as_array(&self) -> &[u8; 64] {
        &self.0
    }

    /// The all-zero placeholder written for a missing signature.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Strict Ed25519 verification of `message` against `signer`.
    ///
    /// An address that is not a valid public key (e.g. a PDA) never verifies.
    pub fn verify(&self, message: &[u8], signer: &Address) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(signer.as_array()) else {
            return false;
        };
        let signature = ed25519_dalek::Signature::from_bytes(&self.0);
        key.verify_strict(message, &signature).is_ok()
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self([0u8; 64])
    }
}

impl From<[u8; 64]> for Signature {
    fn from(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }
}

impl From<ed25519_dalek::Signature> for Signature {
    fn from(signature: ed25519_dalek::Signature) -> Self {
        Self(signature.to_bytes())
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Signature {
    type Err = SerializeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_base58())
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_base58(&text).map_err(serde::de::Error::custom)
    }
}
