//! Well-known program addresses.
//!
//! The constants are raw byte arrays so that no Base58 parsing happens at
//! runtime. [`ProgramRegistry`] maps logical names to addresses; build it
//! once and pass it by reference.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::address::Address;

// ---------------------------------------------------------------------------
// Program IDs
// ---------------------------------------------------------------------------

/// `11111111111111111111111111111111`
pub const SYSTEM_PROGRAM_ID: Address = Address::new_from_array([0u8; 32]);

/// `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM_ID: Address = Address::new_from_array([
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb, 0x79, 0xac,
    0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85, 0x7e, 0xff, 0x00, 0xa9,
]);

/// `TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb`
pub const TOKEN_2022_PROGRAM_ID: Address = Address::new_from_array([
    0x06, 0xdd, 0xf6, 0xe1, 0xee, 0x75, 0x8f, 0xde, 0x18, 0x42, 0x5d, 0xbc, 0xe4, 0x6c, 0xcd, 0xda,
    0xb6, 0x1a, 0xfc, 0x4d, 0x83, 0xb9, 0x0d, 0x27, 0xfe, 0xbd, 0xf9, 0x28, 0xd8, 0xa1, 0x8b, 0xfc,
]);

/// `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Address = Address::new_from_array([
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e, 0x0d, 0x83,
    0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8, 0xdb, 0xe9, 0xf8, 0x59,
]);

/// `MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr`
pub const MEMO_PROGRAM_ID: Address = Address::new_from_array([
    0x05, 0x4a, 0x53, 0x5a, 0x99, 0x29, 0x21, 0x06, 0x4d, 0x24, 0xe8, 0x71, 0x60, 0xda, 0x38, 0x7c,
    0x7c, 0x35, 0xb5, 0xdd, 0xbc, 0x92, 0xbb, 0x81, 0xe4, 0x1f, 0xa8, 0x40, 0x41, 0x05, 0x44, 0x8d,
]);

/// `ComputeBudget111111111111111111111111111111`
pub const COMPUTE_BUDGET_PROGRAM_ID: Address = Address::new_from_array([
    0x03, 0x06, 0x46, 0x6f, 0xe5, 0x21, 0x17, 0x32, 0xff, 0xec, 0xad, 0xba, 0x72, 0xc3, 0x9b, 0xe7,
    0xbc, 0x8c, 0xe5, 0xbb, 0xc5, 0xf7, 0x12, 0x6b, 0x2c, 0x43, 0x9b, 0x3a, 0x40, 0x00, 0x00, 0x00,
]);

/// `AddressLookupTab1e1111111111111111111111111`
pub const ADDRESS_LOOKUP_TABLE_PROGRAM_ID: Address = Address::new_from_array([
    0x02, 0x77, 0xa6, 0xaf, 0x97, 0x33, 0x9b, 0x7a, 0xc8, 0x8d, 0x18, 0x92, 0xc9, 0x04, 0x46, 0xf5,
    0x00, 0x02, 0x30, 0x92, 0x66, 0xf6, 0x2e, 0x53, 0xc1, 0x18, 0x24, 0x49, 0x82, 0x00, 0x00, 0x00,
]);

/// `Stake11111111111111111111111111111111111111`
pub const STAKE_PROGRAM_ID: Address = Address::new_from_array([
    0x06, 0xa1, 0xd8, 0x17, 0x91, 0x37, 0x54, 0x2a, 0x98, 0x34, 0x37, 0xbd, 0xfe, 0x2a, 0x7a, 0xb2,
    0x55, 0x7f, 0x53, 0x5c, 0x8a, 0x78, 0x72, 0x2b, 0x68, 0xa4, 0x9d, 0xc0, 0x00, 0x00, 0x00, 0x00,
]);

/// `Vote111111111111111111111111111111111111111`
pub const VOTE_PROGRAM_ID: Address = Address::new_from_array([
    0x07, 0x61, 0x48, 0x1d, 0x35, 0x74, 0x74, 0xbb, 0x7c, 0x4d, 0x76, 0x24, 0xeb, 0xd3, 0xbd, 0xb3,
    0xd8, 0x35, 0x5e, 0x73, 0xd1, 0x10, 0x43, 0xfc, 0x0d, 0xa3, 0x53, 0x80, 0x00, 0x00, 0x00, 0x00,
]);

/// `SysvarRent111111111111111111111111111111111`
pub const SYSVAR_RENT_ID: Address = Address::new_from_array([
    0x06, 0xa7, 0xd5, 0x17, 0x19, 0x2c, 0x5c, 0x51, 0x21, 0x8c, 0xc9, 0x4c, 0x3d, 0x4a, 0xf1, 0x7f,
    0x58, 0xda, 0xee, 0x08, 0x9b, 0xa1, 0xfd, 0x44, 0xe3, 0xdb, 0xd9, 0x8a, 0x00, 0x00, 0x00, 0x00,
]);

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Immutable map from logical program name to address.
///
/// Serializes as a JSON object of name to Base58 address, so a host can
/// load overrides for a test cluster from its config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramRegistry {
    programs: BTreeMap<String, Address>,
}

impl ProgramRegistry {
    pub const SYSTEM: &'static str = "system";
    pub const TOKEN: &'static str = "token";
    pub const TOKEN_2022: &'static str = "token_2022";
    pub const ASSOCIATED_TOKEN: &'static str = "associated_token";
    pub const MEMO: &'static str = "memo";
    pub const COMPUTE_BUDGET: &'static str = "compute_budget";
    pub const ADDRESS_LOOKUP_TABLE: &'static str = "address_lookup_table";
    pub const STAKE: &'static str = "stake";
    pub const VOTE: &'static str = "vote";
    pub const SYSVAR_RENT: &'static str = "sysvar_rent";

    /// The mainnet program set.
    pub fn well_known() -> Self {
        let programs = [
            (Self::SYSTEM, SYSTEM_PROGRAM_ID),
            (Self::TOKEN, TOKEN_PROGRAM_ID),
            (Self::TOKEN_2022, TOKEN_2022_PROGRAM_ID),
            (Self::ASSOCIATED_TOKEN, ASSOCIATED_TOKEN_PROGRAM_ID),
            (Self::MEMO, MEMO_PROGRAM_ID),
            (Self::COMPUTE_BUDGET, COMPUTE_BUDGET_PROGRAM_ID),
            (Self::ADDRESS_LOOKUP_TABLE, ADDRESS_LOOKUP_TABLE_PROGRAM_ID),
            (Self::STAKE, STAKE_PROGRAM_ID),
            (Self::VOTE, VOTE_PROGRAM_ID),
            (Self::SYSVAR_RENT, SYSVAR_RENT_ID),
        ]
        .into_iter()
        .map(|(name, address)| (name.to_string(), address))
        .collect();

        Self { programs }
    }

    /// Add or override an entry (e.g. a program deployed to a test cluster).
    pub fn with(mut self, name: impl Into<String>, address: Address) -> Self {
        self.programs.insert(name.into(), address);
        self
    }

    pub fn get(&self, name: &str) -> Option<Address> {
        self.programs.get(name).copied()
    }

    /// Reverse lookup, mostly useful for logging.
    pub fn name_of(&self, address: &Address) -> Option<&str> {
        self.programs
            .iter()
            .find(|(_, a)| *a == address)
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn system_program(&self) -> Address {
        self.get(Self::SYSTEM).unwrap_or(SYSTEM_PROGRAM_ID)
    }

    pub fn token_program(&self) -> Address {
        self.get(Self::TOKEN).unwrap_or(TOKEN_PROGRAM_ID)
    }

    pub fn associated_token_program(&self) -> Address {
        self.get(Self::ASSOCIATED_TOKEN)
            .unwrap_or(ASSOCIATED_TOKEN_PROGRAM_ID)
    }
}

impl Default for ProgramRegistry {
    fn default() -> Self {
        Self::well_known()
    }
}
