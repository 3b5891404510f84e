//! Signing keys.
//!
//! [`Signer`] is the seam between transaction assembly and the signature
//! primitive: the transaction only needs an address and a way to sign the
//! exact message bytes. [`Keypair`] is the in-process Ed25519
//! implementation backed by `ed25519-dalek`; hardware wallets or remote
//! signers implement the trait themselves.

use std::fmt;

use ed25519_dalek::{Signer as _, SigningKey};
use zeroize::{Zeroize, Zeroizing};

use crate::address::Address;
use crate::error::{KeypairError, SignError};
use crate::signature::Signature;

/// Anything that can produce a signature for an address.
pub trait Signer {
    fn address(&self) -> Address;

    fn try_sign_message(&self, message: &[u8]) -> Result<Signature, SignError>;
}

/// An Ed25519 keypair.
///
/// The 64-byte form is `secret_seed || public_key`, which is what the
/// ledger CLI writes to keypair JSON files and what wallets export as a
/// Base58 "private key".
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    pub const SECRET_LEN: usize = 32;
    pub const KEYPAIR_LEN: usize = 64;

    /// Fresh keypair from the operating system RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut rand::rngs::OsRng),
        }
    }

    /// Build a keypair from the 32-byte secret seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let mut seed = *seed;
        let signing_key = SigningKey::from_bytes(&seed);
        seed.zeroize();
        Self { signing_key }
    }

    /// Build a keypair from a 64-character hex encoding of the secret seed.
    pub fn from_hex_private_key(private_key_hex: &str) -> Result<Self, KeypairError> {
        if private_key_hex.len() != Self::SECRET_LEN * 2 {
            return Err(KeypairError::InvalidSecretKey(format!(
                "expected {} hex characters, got {}",
                Self::SECRET_LEN * 2,
                private_key_hex.len()
            )));
        }
        let bytes = Zeroizing::new(
            hex::decode(private_key_hex)
                .map_err(|e| KeypairError::InvalidSecretKey(format!("hex decode failed: {e}")))?,
        );
        Self::from_secret_slice(&bytes)
    }

    /// Build a keypair from `secret || public`, rejecting a public half that
    /// does not belong to the secret.
    pub fn from_bytes(bytes: &[u8; 64]) -> Result<Self, KeypairError> {
        let signing_key =
            SigningKey::from_keypair_bytes(bytes).map_err(|_| KeypairError::PublicKeyMismatch)?;
        Ok(Self { signing_key })
    }

    /// Parse a JSON array of 64 byte values.
    pub fn from_json(json: &str) -> Result<Self, KeypairError> {
        let bytes: Zeroizing<Vec<u8>> = Zeroizing::new(
            serde_json::from_str(json)
                .map_err(|e| KeypairError::InvalidSecretKey(format!("json parse failed: {e}")))?,
        );
        Self::from_keypair_slice(&bytes)
    }

    /// Parse the Base58 encoding of the 64-byte keypair.
    pub fn from_base58_string(text: &str) -> Result<Self, KeypairError> {
        let bytes = Zeroizing::new(
            bs58::decode(text)
                .into_vec()
                .map_err(|e| KeypairError::InvalidSecretKey(format!("base58 decode failed: {e}")))?,
        );
        Self::from_keypair_slice(&bytes)
    }

    pub fn to_base58_string(&self) -> String {
        let bytes = Zeroizing::new(self.to_bytes());
        bs58::encode(&bytes[..]).into_string()
    }

    /// JSON byte-array form, the inverse of [`Keypair::from_json`].
    pub fn to_json(&self) -> String {
        let bytes = Zeroizing::new(self.to_bytes().to_vec());
        let parts: Vec<String> = bytes.iter().map(u8::to_string).collect();
        format!("[{}]", parts.join(","))
    }

    /// `secret || public`. Callers own the zeroization of the result.
    pub fn to_bytes(&self) -> [u8; 64] {
        self.signing_key.to_keypair_bytes()
    }

    pub fn address(&self) -> Address {
        Address::new_from_array(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign_message(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message).into()
    }

    fn from_secret_slice(bytes: &[u8]) -> Result<Self, KeypairError> {
        let seed: &[u8; 32] = bytes.try_into().map_err(|_| {
            KeypairError::InvalidSecretKey(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self::from_seed(seed))
    }

    fn from_keypair_slice(bytes: &[u8]) -> Result<Self, KeypairError> {
        let pair: &[u8; 64] = bytes.try_into().map_err(|_| {
            KeypairError::InvalidSecretKey(format!("expected 64 bytes, got {}", bytes.len()))
        })?;
        Self::from_bytes(pair)
    }
}

impl Signer for Keypair {
    fn address(&self) -> Address {
        Keypair::address(self)
    }

    fn try_sign_message(&self, message: &[u8]) -> Result<Signature, SignError> {
        Ok(self.sign_message(message))
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_is_the_public_key() {
        let keypair = Keypair::from_seed(&[0x42u8; 32]);
        let expected = SigningKey::from_bytes(&[0x42u8; 32]).verifying_key().to_bytes();
        assert_eq!(keypair.address().to_bytes(), expected);
        assert!(keypair.address().is_on_curve());
    }

    #[test]
    fn generated_keypairs_differ() {
        assert_ne!(Keypair::generate().address(), Keypair::generate().address());
    }

    #[test]
    fn signatures_verify_and_are_deterministic() {
        let keypair = Keypair::from_seed(&[7u8; 32]);
        let a = keypair.sign_message(b"message");
        let b = keypair.try_sign_message(b"message").unwrap();
        assert_eq!(a, b);
        assert!(a.verify(b"message", &keypair.address()));
    }

    #[test]
    fn hex_private_key() {
        let hex_key = "42".repeat(32);
        let keypair = Keypair::from_hex_private_key(&hex_key).unwrap();
        assert_eq!(keypair.address(), Keypair::from_seed(&[0x42u8; 32]).address());
    }

    #[test]
    fn hex_private_key_rejects_bad_input() {
        assert!(Keypair::from_hex_private_key("abcd").is_err());
        assert!(Keypair::from_hex_private_key(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn bytes_roundtrip() {
        let keypair = Keypair::generate();
        let restored = Keypair::from_bytes(&keypair.to_bytes()).unwrap();
        assert_eq!(restored.address(), keypair.address());
    }

    #[test]
    fn mismatched_public_half_is_rejected() {
        let mut bytes = Keypair::from_seed(&[1u8; 32]).to_bytes();
        bytes[63] ^= 0xff;
        assert_eq!(
            Keypair::from_bytes(&bytes).unwrap_err(),
            KeypairError::PublicKeyMismatch
        );
    }

    #[test]
    fn json_roundtrip() {
        let keypair = Keypair::from_seed(&[9u8; 32]);
        let json = keypair.to_json();
        assert!(json.starts_with("[9,9,9,"));
        let restored = Keypair::from_json(&json).unwrap();
        assert_eq!(restored.address(), keypair.address());
    }

    #[test]
    fn json_with_wrong_length_fails() {
        let err = Keypair::from_json("[1,2,3]").unwrap_err();
        assert_eq!(
            err,
            KeypairError::InvalidSecretKey("expected 64 bytes, got 3".into())
        );
        assert!(Keypair::from_json("not json").is_err());
    }

    #[test]
    fn base58_roundtrip() {
        let keypair = Keypair::from_seed(&[3u8; 32]);
        let text = keypair.to_base58_string();
        let restored = Keypair::from_base58_string(&text).unwrap();
        assert_eq!(restored.address(), keypair.address());
    }

    #[test]
    fn debug_does_not_leak_the_secret() {
        let keypair = Keypair::from_seed(&[0xABu8; 32]);
        let debug = format!("{keypair:?}");
        assert!(debug.contains("Keypair"));
        assert!(!debug.contains("171, 171"));
    }
}
