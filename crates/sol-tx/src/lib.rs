//! Transaction assembly for Solana-style ledgers.
//!
//! This crate turns instructions into the canonical message that signers
//! sign, keeps the signature table in account-key order, and serializes
//! the result into the compact wire format nodes accept. It also derives
//! program-derived addresses, which needs an Ed25519 curve membership test.
//!
//! Nothing here performs I/O. Blockhashes come from the caller and the
//! serialized bytes (or their base64 form) go back to the caller's RPC
//! client. Signing goes through the [`Signer`] trait; [`Keypair`] is the
//! `ed25519-dalek` implementation.

pub mod address;
pub mod config;
pub mod curve;
pub mod error;
pub mod instruction;
pub mod keypair;
pub mod lookup_table;
pub mod message;
pub mod pda;
pub mod programs;
pub mod signature;
pub mod transaction;

mod wire;

pub use address::Address;
pub use config::{SerializeConfig, PACKET_DATA_SIZE};
pub use curve::{is_on_curve, YDecoding};
pub use error::{
    AddressError, CompileError, DerivationError, Error, KeypairError, SerializeError, SignError,
};
pub use instruction::{AccountMeta, CompiledInstruction, Instruction};
pub use keypair::{Keypair, Signer};
pub use lookup_table::LookupTableState;
pub use message::{Message, MessageHeader};
pub use pda::{
    associated_token_address, create_program_address, find_program_address,
    ProgramDerivedAddress,
};
pub use programs::ProgramRegistry;
pub use signature::Signature;
pub use sol_layout::{self as layout, LayoutError};
pub use transaction::{sign_raw_transaction, SignatureEntry, Transaction};
