//! The signed body of a transaction.
//!
//! ```text
//! Message:
//!   num_required_signatures   u8
//!   num_readonly_signed       u8
//!   num_readonly_unsigned     u8
//!   num_accounts              compact-length
//!   account_keys              32 bytes * num_accounts
//!   recent_blockhash          32 bytes
//!   num_instructions          compact-length
//!   instructions[]            see `instruction`
//! ```
//!
//! Account keys are ordered writable signers, read-only signers, writable
//! non-signers, read-only non-signers. The fee payer is always key 0.

use log::debug;
use serde::{Deserialize, Serialize};
use sol_layout::encode_length_into;

use crate::address::Address;
use crate::error::{CompileError, SerializeError};
use crate::instruction::{AccountMeta, CompiledInstruction, Instruction};
use crate::wire::Reader;

/// Most keys a `u8` index can address.
pub const MAX_ACCOUNT_KEYS: usize = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<Address>,
    pub recent_blockhash: Address,
    pub instructions: Vec<CompiledInstruction>,
}

/// An account key with its merged permission bits.
#[derive(Debug, Clone, Copy)]
struct KeyEntry {
    address: Address,
    is_signer: bool,
    is_writable: bool,
}

impl Message {
    /// Merge `instructions` into a canonical message.
    ///
    /// `signers` are addresses the caller intends to sign with. Any of them
    /// that no instruction references is added as a read-only signer.
    pub fn compile(
        instructions: &[Instruction],
        fee_payer: Option<&Address>,
        recent_blockhash: Option<&Address>,
        signers: &[Address],
    ) -> Result<Self, CompileError> {
        let recent_blockhash = *recent_blockhash.ok_or(CompileError::MissingBlockhash)?;
        let fee_payer = *fee_payer.ok_or(CompileError::MissingFeePayer)?;

        for ix in instructions {
            if ix.data.len() > usize::from(u16::MAX) {
                return Err(CompileError::InstructionDataTooLarge(ix.data.len()));
            }
        }

        let mut entries: Vec<KeyEntry> = Vec::new();
        let mut upsert = |address: Address, is_signer: bool, is_writable: bool| {
            if let Some(entry) = entries.iter_mut().find(|e| e.address == address) {
                entry.is_signer |= is_signer;
                entry.is_writable |= is_writable;
            } else {
                entries.push(KeyEntry {
                    address,
                    is_signer,
                    is_writable,
                });
            }
        };

        // Accounts of every instruction first, then the programs themselves
        // as read-only keys so they can be indexed too.
        for ix in instructions {
            for meta in &ix.accounts {
                upsert(meta.address, meta.is_signer, meta.is_writable);
            }
        }
        for ix in instructions {
            upsert(ix.program, false, false);
        }
        for signer in signers {
            upsert(*signer, true, false);
        }

        // The fee payer is re-inserted at the front whatever its flags were.
        entries.retain(|e| e.address != fee_payer);

        // Stable: equal keys keep first-seen order.
        entries.sort_by_key(|e| (!e.is_signer, !e.is_writable));

        entries.insert(
            0,
            KeyEntry {
                address: fee_payer,
                is_signer: true,
                is_writable: true,
            },
        );

        if entries.len() > MAX_ACCOUNT_KEYS {
            return Err(CompileError::TooManyAccounts(entries.len()));
        }

        let count = |pred: fn(&KeyEntry) -> bool| -> Result<u8, CompileError> {
            let n = entries.iter().filter(|e| pred(e)).count();
            u8::try_from(n).map_err(|_| CompileError::TooManyAccounts(entries.len()))
        };
        let header = MessageHeader {
            num_required_signatures: count(|e| e.is_signer)?,
            num_readonly_signed_accounts: count(|e| e.is_signer && !e.is_writable)?,
            num_readonly_unsigned_accounts: count(|e| !e.is_signer && !e.is_writable)?,
        };

        let account_keys: Vec<Address> = entries.iter().map(|e| e.address).collect();
        let instructions = instructions
            .iter()
            .map(|ix| ix.compile(&account_keys))
            .collect::<Result<Vec<_>, _>>()?;

        let message = Self {
            header,
            account_keys,
            recent_blockhash,
            instructions,
        };

        for signer in signers {
            if !message.signer_keys().contains(signer) {
                return Err(CompileError::UnknownSigner(*signer));
            }
        }

        debug!(
            "compiled message: {} accounts, {} signers ({} read-only), {} read-only unsigned, {} instructions",
            message.account_keys.len(),
            header.num_required_signatures,
            header.num_readonly_signed_accounts,
            header.num_readonly_unsigned_accounts,
            message.instructions.len(),
        );

        Ok(message)
    }

    /// The exact bytes that get signed.
    pub fn serialize(&self) -> Result<Vec<u8>, CompileError> {
        let num_keys = u16::try_from(self.account_keys.len())
            .map_err(|_| CompileError::TooManyAccounts(self.account_keys.len()))?;
        let num_instructions = u16::try_from(self.instructions.len())
            .map_err(|_| CompileError::TooManyAccounts(self.instructions.len()))?;

        let mut buf = Vec::with_capacity(
            3 + 3 + self.account_keys.len() * Address::LEN + Address::LEN + 3,
        );

        buf.push(self.header.num_required_signatures);
        buf.push(self.header.num_readonly_signed_accounts);
        buf.push(self.header.num_readonly_unsigned_accounts);

        encode_length_into(num_keys, &mut buf);
        for key in &self.account_keys {
            buf.extend_from_slice(key.as_ref());
        }

        buf.extend_from_slice(self.recent_blockhash.as_ref());

        encode_length_into(num_instructions, &mut buf);
        for ix in &self.instructions {
            ix.serialize_into(&mut buf)?;
        }

        Ok(buf)
    }

    /// Parse a message, rejecting trailing bytes.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, SerializeError> {
        let mut reader = Reader::new(bytes);
        let message = Self::read(&mut reader)?;
        reader.finish("message")?;
        Ok(message)
    }

    pub(crate) fn read(reader: &mut Reader<'_>) -> Result<Self, SerializeError> {
        let header = MessageHeader {
            num_required_signatures: reader.u8("num_required_signatures")?,
            num_readonly_signed_accounts: reader.u8("num_readonly_signed_accounts")?,
            num_readonly_unsigned_accounts: reader.u8("num_readonly_unsigned_accounts")?,
        };

        let num_keys = reader.length()?;
        let mut account_keys = Vec::with_capacity(num_keys.min(MAX_ACCOUNT_KEYS));
        for _ in 0..num_keys {
            account_keys.push(Address::new_from_array(reader.array("account key")?));
        }

        let recent_blockhash = Address::new_from_array(reader.array("recent blockhash")?);

        let num_instructions = reader.length()?;
        let mut instructions = Vec::new();
        for _ in 0..num_instructions {
            instructions.push(CompiledInstruction::read(reader)?);
        }

        let message = Self {
            header,
            account_keys,
            recent_blockhash,
            instructions,
        };
        message.validate()?;
        Ok(message)
    }

    fn validate(&self) -> Result<(), SerializeError> {
        let total = self.account_keys.len();
        let signers = usize::from(self.header.num_required_signatures);

        if total > MAX_ACCOUNT_KEYS {
            return Err(SerializeError::Malformed(format!(
                "{total} account keys, at most {MAX_ACCOUNT_KEYS} are addressable"
            )));
        }
        if signers == 0 {
            return Err(SerializeError::Malformed(
                "message has no fee payer signature".into(),
            ));
        }
        if signers > total {
            return Err(SerializeError::Malformed(format!(
                "{signers} required signatures but only {total} account keys"
            )));
        }
        if usize::from(self.header.num_readonly_signed_accounts) >= signers {
            return Err(SerializeError::Malformed(
                "fee payer must be a writable signer".into(),
            ));
        }
        if usize::from(self.header.num_readonly_unsigned_accounts) > total - signers {
            return Err(SerializeError::Malformed(
                "read-only unsigned count exceeds non-signer keys".into(),
            ));
        }
        for (i, ix) in self.instructions.iter().enumerate() {
            let out_of_range = std::iter::once(&ix.program_id_index)
                .chain(&ix.account_indices)
                .find(|idx| usize::from(**idx) >= total);
            if let Some(idx) = out_of_range {
                return Err(SerializeError::Malformed(format!(
                    "instruction {i} references account index {idx} of {total}"
                )));
            }
        }
        Ok(())
    }

    /// The keys that must sign, in signature-slot order.
    pub fn signer_keys(&self) -> &[Address] {
        let n = usize::from(self.header.num_required_signatures).min(self.account_keys.len());
        &self.account_keys[..n]
    }

    pub fn fee_payer(&self) -> Option<&Address> {
        self.account_keys.first()
    }

    pub fn is_signer(&self, index: usize) -> bool {
        index < usize::from(self.header.num_required_signatures)
    }

    pub fn is_writable(&self, index: usize) -> bool {
        let signers = usize::from(self.header.num_required_signatures);
        if index >= self.account_keys.len() {
            false
        } else if index < signers {
            index < signers.saturating_sub(usize::from(self.header.num_readonly_signed_accounts))
        } else {
            index
                < self
                    .account_keys
                    .len()
                    .saturating_sub(usize::from(self.header.num_readonly_unsigned_accounts))
        }
    }

    /// Rebuild address-based instructions from the compiled form.
    ///
    /// Account flags come from the header, so they reflect the merged
    /// permissions rather than what each original instruction asked for.
    pub fn decompile_instructions(&self) -> Result<Vec<Instruction>, SerializeError> {
        let key = |index: u8| -> Result<Address, SerializeError> {
            self.account_keys
                .get(usize::from(index))
                .copied()
                .ok_or_else(|| SerializeError::Malformed(format!("account index {index} out of range")))
        };

        self.instructions
            .iter()
            .map(|ix| -> Result<Instruction, SerializeError> {
                let accounts = ix
                    .account_indices
                    .iter()
                    .map(|&index| -> Result<AccountMeta, SerializeError> {
                        Ok(AccountMeta {
                            address: key(index)?,
                            is_signer: self.is_signer(usize::from(index)),
                            is_writable: self.is_writable(usize::from(index)),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Instruction::new(key(ix.program_id_index)?, accounts, ix.data.clone()))
            })
            .collect()
    }
}
