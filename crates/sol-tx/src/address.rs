//! Account and program addresses.
//!
//! An address is 32 raw bytes, usually an Ed25519 public key, but also a
//! program-derived address or a blockhash. Its text form is the Base58
//! encoding of those bytes using the Bitcoin alphabet (what the `bs58`
//! crate uses by default). There is no checksum and no hashing step.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::curve::{self, YDecoding};
use crate::error::AddressError;

/// A 32-byte ledger address.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 32]);

impl Address {
    pub const LEN: usize = 32;

    pub const fn new_from_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a Base58 address.
    ///
    /// Whitespace is not trimmed; any character outside the Base58 alphabet
    /// is an encoding error, and the decoded value must be exactly 32 bytes.
    pub fn from_base58(text: &str) -> Result<Self, AddressError> {
        let bytes = bs58::decode(text)
            .into_vec()
            .map_err(|e| AddressError::InvalidEncoding(e.to_string()))?;
        Self::try_from(bytes.as_slice())
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    pub const fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    pub fn as_array(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether these bytes decode to a point on the Ed25519 curve, i.e.
    /// whether a private key could exist for this address.
    pub fn is_on_curve(&self) -> bool {
        curve::is_on_curve(&self.0, YDecoding::default())
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = AddressError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; 32]>::try_from(bytes)
            .map(Self)
            .map_err(|_| AddressError::WrongLength(bytes.len()))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_base58())
    }
}

impl From<Address> for sol_layout::Value {
    fn from(address: Address) -> Self {
        sol_layout::Value::Bytes(address.0.to_vec())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_base58(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The System Program address is 32 zero bytes, which encodes to
    /// "11111111111111111111111111111111" in Base58.
    #[test]
    fn system_program_address() {
        let addr = Address::new_from_array([0u8; 32]);
        assert_eq!(addr.to_base58(), "11111111111111111111111111111111");
    }

    #[test]
    fn roundtrip_encode_decode() {
        let text = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
        let addr = Address::from_base58(text).unwrap();
        assert_eq!(addr.to_base58(), text);
    }

    #[test]
    fn random_addresses_roundtrip() {
        for _ in 0..200 {
            let addr = Address::new_from_array(rand::random());
            assert_eq!(Address::from_base58(&addr.to_base58()).unwrap(), addr);
        }
    }

    #[test]
    fn leading_zero_bytes_survive_roundtrip() {
        let mut bytes = [0xffu8; 32];
        bytes[..4].copy_from_slice(&[0, 0, 0, 0]);
        let addr = Address::new_from_array(bytes);
        assert_eq!(Address::from_base58(&addr.to_base58()).unwrap(), addr);
    }

    #[test]
    fn garbage_is_invalid_encoding() {
        let err = Address::from_base58("not-a-valid-address!!!").unwrap_err();
        assert!(matches!(err, AddressError::InvalidEncoding(_)));
    }

    #[test]
    fn zero_and_capital_o_are_not_in_the_alphabet() {
        assert!(matches!(
            Address::from_base58("0000000000000000000000000000000O"),
            Err(AddressError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn surrounding_whitespace_is_rejected() {
        let padded = " TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
        assert!(matches!(
            Address::from_base58(padded),
            Err(AddressError::InvalidEncoding(_))
        ));
        let trailing = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA\n";
        assert!(matches!(
            Address::from_base58(trailing),
            Err(AddressError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn too_short_is_wrong_length() {
        // "1" decodes to a single zero byte.
        assert_eq!(
            Address::from_base58("1").unwrap_err(),
            AddressError::WrongLength(1)
        );
    }

    #[test]
    fn empty_is_wrong_length() {
        assert_eq!(
            Address::from_base58("").unwrap_err(),
            AddressError::WrongLength(0)
        );
    }

    #[test]
    fn too_long_is_wrong_length() {
        let text = bs58::encode([7u8; 33]).into_string();
        assert_eq!(
            Address::from_base58(&text).unwrap_err(),
            AddressError::WrongLength(33)
        );
    }

    #[test]
    fn try_from_slice_checks_length() {
        assert!(Address::try_from(&[1u8; 32][..]).is_ok());
        assert_eq!(
            Address::try_from(&[1u8; 16][..]).unwrap_err(),
            AddressError::WrongLength(16)
        );
    }

    #[test]
    fn equality_is_bytewise() {
        let a = Address::new_from_array([5u8; 32]);
        let b: Address = a.to_base58().parse().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Address::new_from_array([6u8; 32]));
    }

    #[test]
    fn display_and_debug() {
        let addr = Address::default();
        assert_eq!(addr.to_string(), "11111111111111111111111111111111");
        assert_eq!(
            format!("{addr:?}"),
            "Address(11111111111111111111111111111111)"
        );
    }

    #[test]
    fn well_known_address_decodes_to_32_bytes() {
        // Memo Program v2
        let addr = Address::from_base58("MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr").unwrap();
        assert_eq!(addr.as_ref().len(), 32);
    }

    #[test]
    fn serde_uses_base58_string() {
        let addr = Address::from_base58("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA").unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
        assert!(serde_json::from_str::<Address>("\"1\"").is_err());
    }
}
