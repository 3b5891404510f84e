use sol_layout::LayoutError;
use thiserror::Error;

use crate::address::Address;

/// Malformed address input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid base58 encoding: {0}")]
    InvalidEncoding(String),

    #[error("wrong address length: expected 32 bytes, got {0}")]
    WrongLength(usize),
}

/// Program-derived address search failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DerivationError {
    #[error("seed {index} is {len} bytes, the maximum is 32")]
    SeedTooLong { index: usize, len: usize },

    #[error("too many seeds: {0}, the maximum is 16 including the bump seed")]
    TooManySeeds(usize),

    #[error("derived address lies on the ed25519 curve")]
    OnCurve,

    #[error("no bump seed produced an off-curve address")]
    Exhausted,
}

/// Message assembly failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("recent blockhash not set")]
    MissingBlockhash,

    #[error("fee payer not set")]
    MissingFeePayer,

    #[error("signer {0} is not a required signer of the compiled message")]
    UnknownSigner(Address),

    #[error("account {0} is missing from the account key table")]
    UnknownAccount(Address),

    #[error("too many accounts: {0}, at most 256 can be indexed")]
    TooManyAccounts(usize),

    #[error("instruction data is {0} bytes, which cannot be length-prefixed")]
    InstructionDataTooLarge(usize),
}

/// Signing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignError {
    #[error("no signers supplied")]
    NoSigners,

    #[error("signer {0} is not a required signer of this transaction")]
    UnknownSigner(Address),

    #[error("signature from {0} does not verify against the message")]
    InvalidSignature(Address),

    #[error("signing primitive failed: {0}")]
    Signing(String),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Wire serialization and deserialization failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
    #[error("missing signature for required signer {0}")]
    MissingSignature(Address),

    #[error("signature for {0} does not verify against the message")]
    InvalidSignature(Address),

    #[error("transaction is {size} bytes, the maximum is {max}")]
    PacketTooLarge { size: usize, max: usize },

    #[error("malformed wire data: {0}")]
    Malformed(String),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Key material parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeypairError {
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("public key does not match the secret key")]
    PublicKeyMismatch,
}

/// Any failure raised by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Derivation(#[from] DerivationError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Sign(#[from] SignError),

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error(transparent)]
    Keypair(#[from] KeypairError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_wrong_length() {
        let err = AddressError::WrongLength(31);
        assert_eq!(
            err.to_string(),
            "wrong address length: expected 32 bytes, got 31"
        );
    }

    #[test]
    fn display_seed_too_long() {
        let err = DerivationError::SeedTooLong { index: 1, len: 33 };
        assert_eq!(err.to_string(), "seed 1 is 33 bytes, the maximum is 32");
    }

    #[test]
    fn display_unknown_signer_uses_base58() {
        let err = CompileError::UnknownSigner(Address::default());
        assert_eq!(
            err.to_string(),
            "signer 11111111111111111111111111111111 is not a required signer of the compiled message"
        );
    }

    #[test]
    fn display_packet_too_large() {
        let err = SerializeError::PacketTooLarge {
            size: 1300,
            max: 1232,
        };
        assert_eq!(err.to_string(), "transaction is 1300 bytes, the maximum is 1232");
    }

    #[test]
    fn compile_error_is_transparent_inside_sign_error() {
        let err = SignError::from(CompileError::MissingFeePayer);
        assert_eq!(err.to_string(), "fee payer not set");
    }

    #[test]
    fn top_level_error_wraps_every_category() {
        let errors: Vec<Error> = vec![
            LayoutError::LengthOverflow.into(),
            AddressError::WrongLength(1).into(),
            DerivationError::Exhausted.into(),
            CompileError::MissingBlockhash.into(),
            SignError::NoSigners.into(),
            SerializeError::Malformed("x".into()).into(),
            KeypairError::PublicKeyMismatch.into(),
        ];
        assert_eq!(errors.len(), 7);
        assert!(matches!(errors[3], Error::Compile(CompileError::MissingBlockhash)));
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(SignError::NoSigners);
        assert!(err.to_string().contains("no signers"));
    }
}
