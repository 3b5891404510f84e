//! Transactions: a compiled message plus one signature slot per signer.
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-length
//!   signatures              64 bytes * num_signatures
//!   message                 see `message`
//! ```
//!
//! A [`Transaction`] keeps the caller's instructions, fee payer and
//! blockhash and compiles them into a [`Message`] on demand. The signature
//! table is a `Vec<Option<Signature>>` indexed like the signer prefix of
//! the account keys. Whenever recompilation changes the signer list or the
//! message bytes, every slot is cleared, so a signature over a stale
//! message can never be serialized.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::debug;
use sol_layout::encode_length_into;

use crate::address::Address;
use crate::config::SerializeConfig;
use crate::error::{CompileError, Error, SerializeError, SignError};
use crate::instruction::Instruction;
use crate::keypair::Signer;
use crate::message::Message;
use crate::signature::Signature;
use crate::wire::Reader;

/// A signer's slot in the signature table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureEntry {
    pub signer: Address,
    pub signature: Option<Signature>,
}

#[derive(Debug, Clone)]
struct Compiled {
    message: Message,
    bytes: Vec<u8>,
}

impl Compiled {
    fn from_message(message: Message) -> Result<Self, CompileError> {
        let bytes = message.serialize()?;
        Ok(Self { message, bytes })
    }

    fn same_as(&self, other: &Compiled) -> bool {
        self.message.signer_keys() == other.message.signer_keys() && self.bytes == other.bytes
    }
}

#[derive(Debug, Clone, Default)]
pub struct Transaction {
    instructions: Vec<Instruction>,
    fee_payer: Option<Address>,
    recent_blockhash: Option<Address>,
    signers: Vec<Address>,
    compiled: Option<Compiled>,
    signatures: Vec<Option<Signature>>,
    dirty: bool,
}

impl Transaction {
    pub fn new(instructions: Vec<Instruction>, fee_payer: Address, recent_blockhash: Address) -> Self {
        Self {
            instructions,
            fee_payer: Some(fee_payer),
            recent_blockhash: Some(recent_blockhash),
            dirty: true,
            ..Self::default()
        }
    }

    pub fn add_instruction(&mut self, instruction: Instruction) -> &mut Self {
        self.instructions.push(instruction);
        self.dirty = true;
        self
    }

    pub fn set_fee_payer(&mut self, fee_payer: Address) -> &mut Self {
        self.fee_payer = Some(fee_payer);
        self.dirty = true;
        self
    }

    pub fn set_recent_blockhash(&mut self, recent_blockhash: Address) -> &mut Self {
        self.recent_blockhash = Some(recent_blockhash);
        self.dirty = true;
        self
    }

    /// Require a signature from `address` even if no instruction names it.
    pub fn add_signer(&mut self, address: Address) -> &mut Self {
        if !self.signers.contains(&address) {
            self.signers.push(address);
            self.dirty = true;
        }
        self
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn fee_payer(&self) -> Option<&Address> {
        self.fee_payer.as_ref()
    }

    pub fn recent_blockhash(&self) -> Option<&Address> {
        self.recent_blockhash.as_ref()
    }

    /// Compile the message if anything changed since the last compilation.
    pub fn compile(&mut self) -> Result<&Message, CompileError> {
        Ok(&self.ensure_compiled()?.0.message)
    }

    /// The exact bytes every signer signs.
    pub fn message_data(&mut self) -> Result<Vec<u8>, CompileError> {
        Ok(self.ensure_compiled()?.0.bytes.clone())
    }

    fn ensure_compiled(
        &mut self,
    ) -> Result<(&Compiled, &mut Vec<Option<Signature>>), CompileError> {
        let current = match self.compiled.take() {
            Some(current) if !self.dirty => current,
            previous => {
                let fresh = Message::compile(
                    &self.instructions,
                    self.fee_payer.as_ref(),
                    self.recent_blockhash.as_ref(),
                    &self.signers,
                )
                .and_then(Compiled::from_message);
                let fresh = match fresh {
                    Ok(fresh) => fresh,
                    Err(e) => {
                        self.compiled = previous;
                        return Err(e);
                    }
                };

                let unchanged = previous.as_ref().is_some_and(|old| old.same_as(&fresh));
                if !unchanged {
                    let dropped = self.signatures.iter().filter(|s| s.is_some()).count();
                    if dropped > 0 {
                        debug!("message changed, discarding {dropped} signatures");
                    }
                    self.signatures = vec![None; fresh.message.signer_keys().len()];
                }
                self.dirty = false;
                fresh
            }
        };
        let compiled: &Compiled = self.compiled.insert(current);
        Ok((compiled, &mut self.signatures))
    }

    /// Sign the compiled message with every signer in `signers`.
    ///
    /// Either every signer's slot is filled or, on error, none is.
    pub fn sign(&mut self, signers: &[&dyn Signer]) -> Result<(), SignError> {
        if signers.is_empty() {
            return Err(SignError::NoSigners);
        }

        let (compiled, slots) = self.ensure_compiled()?;
        let mut produced = Vec::with_capacity(signers.len());
        for signer in signers {
            let address = signer.address();
            let index = compiled
                .message
                .signer_keys()
                .iter()
                .position(|k| *k == address)
                .ok_or(SignError::UnknownSigner(address))?;
            let signature = signer.try_sign_message(&compiled.bytes)?;
            produced.push((index, signature));
        }

        for (index, signature) in produced {
            slots[index] = Some(signature);
        }
        debug!("signed transaction with {} signers", signers.len());
        Ok(())
    }

    /// Store a signature produced elsewhere, after checking it.
    pub fn add_signature(&mut self, signer: &Address, signature: Signature) -> Result<(), SignError> {
        let (compiled, slots) = self.ensure_compiled()?;
        let index = compiled
            .message
            .signer_keys()
            .iter()
            .position(|k| k == signer)
            .ok_or(SignError::UnknownSigner(*signer))?;
        if !signature.verify(&compiled.bytes, signer) {
            return Err(SignError::InvalidSignature(*signer));
        }
        slots[index] = Some(signature);
        Ok(())
    }

    /// Signature slots from the last compilation, in signer order.
    pub fn signatures(&self) -> &[Option<Signature>] {
        &self.signatures
    }

    /// Pair each required signer with its slot. Empty before the first
    /// compilation.
    pub fn signature_entries(&self) -> Vec<SignatureEntry> {
        let Some(compiled) = &self.compiled else {
            return Vec::new();
        };
        compiled
            .message
            .signer_keys()
            .iter()
            .zip(&self.signatures)
            .map(|(signer, signature)| SignatureEntry {
                signer: *signer,
                signature: *signature,
            })
            .collect()
    }

    /// Whether every slot holds a signature that verifies.
    pub fn verify_signatures(&mut self) -> Result<bool, CompileError> {
        let (compiled, slots) = self.ensure_compiled()?;
        Ok(compiled
            .message
            .signer_keys()
            .iter()
            .zip(slots.iter())
            .all(|(signer, signature)| {
                signature.is_some_and(|s| s.verify(&compiled.bytes, signer))
            }))
    }

    /// The fee payer's signature, which identifies the transaction on chain.
    pub fn id(&self) -> Option<Signature> {
        self.signatures.first().copied().flatten()
    }

    /// Emit the wire bytes.
    pub fn serialize(&mut self, config: &SerializeConfig) -> Result<Vec<u8>, SerializeError> {
        let (compiled, slots) = self.ensure_compiled()?;
        let signer_keys = compiled.message.signer_keys();

        let mut wire = Vec::with_capacity(3 + signer_keys.len() * Signature::LEN + compiled.bytes.len());
        // At most 256 signers, so the count always fits.
        let count = u16::try_from(signer_keys.len())
            .map_err(|_| CompileError::TooManyAccounts(signer_keys.len()))?;
        encode_length_into(count, &mut wire);

        for (signer, slot) in signer_keys.iter().zip(slots.iter()) {
            let signature = match slot {
                Some(signature) => {
                    if config.verify_signatures && !signature.verify(&compiled.bytes, signer) {
                        return Err(SerializeError::InvalidSignature(*signer));
                    }
                    *signature
                }
                None if config.require_all_signatures => {
                    return Err(SerializeError::MissingSignature(*signer));
                }
                None => Signature::default(),
            };
            wire.extend_from_slice(signature.as_ref());
        }
        wire.extend_from_slice(&compiled.bytes);

        if wire.len() > config.max_packet_size {
            return Err(SerializeError::PacketTooLarge {
                size: wire.len(),
                max: config.max_packet_size,
            });
        }

        debug!(
            "serialized transaction: {} bytes, {} signatures",
            wire.len(),
            signer_keys.len()
        );
        Ok(wire)
    }

    /// [`serialize`](Self::serialize) as standard base64, the form RPC
    /// nodes accept for broadcast.
    pub fn serialize_base64(&mut self, config: &SerializeConfig) -> Result<String, SerializeError> {
        Ok(STANDARD.encode(self.serialize(config)?))
    }

    /// Parse wire bytes. All-zero signature slots decode as empty.
    ///
    /// The message is kept byte-for-byte; it is only recompiled if the
    /// caller changes the instructions, fee payer, blockhash or signers.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, SerializeError> {
        let mut reader = Reader::new(bytes);

        let num_signatures = reader.length()?;
        let mut signatures = Vec::with_capacity(num_signatures.min(256));
        for _ in 0..num_signatures {
            let signature = Signature::new_from_array(reader.array("signature")?);
            signatures.push((!signature.is_zero()).then_some(signature));
        }

        let message_start = reader.position();
        let message = Message::read(&mut reader)?;
        reader.finish("transaction")?;

        if num_signatures != message.signer_keys().len() {
            return Err(SerializeError::Malformed(format!(
                "{num_signatures} signatures for {} required signers",
                message.signer_keys().len()
            )));
        }

        Ok(Self {
            instructions: message.decompile_instructions()?,
            fee_payer: message.fee_payer().copied(),
            recent_blockhash: Some(message.recent_blockhash),
            signers: message.signer_keys().to_vec(),
            compiled: Some(Compiled {
                bytes: bytes[message_start..].to_vec(),
                message,
            }),
            signatures,
            dirty: false,
        })
    }
}

/// Fill `signer`'s slot in an already serialized transaction.
///
/// The message bytes are left untouched and other signers' slots are
/// copied through as they are, so this works for transactions built by
/// another party that are only partially signed.
pub fn sign_raw_transaction(raw: &[u8], signer: &dyn Signer) -> Result<Vec<u8>, Error> {
    let mut transaction = Transaction::deserialize(raw)?;
    transaction.sign(&[signer])?;
    let config = SerializeConfig {
        require_all_signatures: false,
        verify_signatures: false,
        max_packet_size: usize::MAX,
    };
    Ok(transaction.serialize(&config)?)
}
