//! Instructions before and after compilation.
//!
//! An [`Instruction`] names its program and accounts by address. Once the
//! message compiler has fixed the account table, each instruction becomes a
//! [`CompiledInstruction`] that refers to accounts by `u8` index:
//!
//! ```text
//! program_id_index   u8
//! num_accounts       compact-length
//! account_indices    u8 * num_accounts
//! data_len           compact-length
//! data               u8 * data_len
//! ```

use serde::{Deserialize, Serialize};
use sol_layout::{encode_length_into, Layout, LayoutError, Record};

use crate::address::Address;
use crate::error::{CompileError, SerializeError};
use crate::wire::Reader;

/// A single account reference in an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountMeta {
    pub address: Address,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    /// A writable account.
    pub fn new(address: Address, is_signer: bool) -> Self {
        Self {
            address,
            is_signer,
            is_writable: true,
        }
    }

    /// A read-only account.
    pub fn new_readonly(address: Address, is_signer: bool) -> Self {
        Self {
            address,
            is_signer,
            is_writable: false,
        }
    }
}

/// A call into one program. Account order is significant: it is the order
/// of the compiled index list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub program: Address,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

impl Instruction {
    pub fn new(program: Address, accounts: Vec<AccountMeta>, data: Vec<u8>) -> Self {
        Self {
            program,
            accounts,
            data,
        }
    }

    /// Build an instruction whose payload is `record` encoded with `layout`.
    pub fn with_layout(
        program: Address,
        accounts: Vec<AccountMeta>,
        layout: &Layout,
        record: &Record,
    ) -> Result<Self, LayoutError> {
        Ok(Self::new(program, accounts, layout.encode(record)?))
    }

    /// Replace addresses with their positions in `account_keys`.
    pub fn compile(&self, account_keys: &[Address]) -> Result<CompiledInstruction, CompileError> {
        let program_id_index = index_of(account_keys, &self.program)?;
        let account_indices = self
            .accounts
            .iter()
            .map(|meta| index_of(account_keys, &meta.address))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompiledInstruction {
            program_id_index,
            account_indices,
            data: self.data.clone(),
        })
    }

    /// Compile against `account_keys` and emit the wire bytes.
    pub fn serialize(&self, account_keys: &[Address]) -> Result<Vec<u8>, CompileError> {
        let mut out = Vec::new();
        self.compile(account_keys)?.serialize_into(&mut out)?;
        Ok(out)
    }
}

fn index_of(account_keys: &[Address], address: &Address) -> Result<u8, CompileError> {
    let position = account_keys
        .iter()
        .position(|k| k == address)
        .ok_or(CompileError::UnknownAccount(*address))?;
    u8::try_from(position).map_err(|_| CompileError::TooManyAccounts(account_keys.len()))
}

/// An instruction whose accounts are indices into a message's account table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

impl CompiledInstruction {
    pub fn serialize_into(&self, out: &mut Vec<u8>) -> Result<(), CompileError> {
        let num_accounts = u16::try_from(self.account_indices.len())
            .map_err(|_| CompileError::TooManyAccounts(self.account_indices.len()))?;
        let data_len = u16::try_from(self.data.len())
            .map_err(|_| CompileError::InstructionDataTooLarge(self.data.len()))?;

        out.push(self.program_id_index);
        encode_length_into(num_accounts, out);
        out.extend_from_slice(&self.account_indices);
        encode_length_into(data_len, out);
        out.extend_from_slice(&self.data);
        Ok(())
    }

    pub(crate) fn read(reader: &mut Reader<'_>) -> Result<Self, SerializeError> {
        let program_id_index = reader.u8("program id index")?;
        let num_accounts = reader.length()?;
        let account_indices = reader.bytes(num_accounts, "account indices")?.to_vec();
        let data_len = reader.length()?;
        let data = reader.bytes(data_len, "instruction data")?.to_vec();
        Ok(Self {
            program_id_index,
            account_indices,
            data,
        })
    }

    /// The program this instruction invokes, if the index is in range.
    pub fn program_id<'a>(&self, account_keys: &'a [Address]) -> Option<&'a Address> {
        account_keys.get(usize::from(self.program_id_index))
    }
}
