//! Address lookup table account data.
//!
//! RPC nodes return the raw account bytes; the layout is a fixed 56-byte
//! header followed by the table's addresses:
//!
//! ```text
//! last_extended_slot            u64
//! last_extended_block_height    u64
//! deactivation_slot             u64   (u64::MAX while active)
//! authority                     32 bytes (zero once frozen)
//! addresses                     32 bytes * n
//! ```

use serde::{Deserialize, Serialize};
use sol_layout::{Layout, LayoutError, Record};

use crate::address::Address;

const LAST_EXTENDED_SLOT: &str = "last_extended_slot";
const LAST_EXTENDED_BLOCK_HEIGHT: &str = "last_extended_block_height";
const DEACTIVATION_SLOT: &str = "deactivation_slot";
const AUTHORITY: &str = "authority";

/// Decoded lookup table state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTableState {
    pub last_extended_slot: u64,
    pub last_extended_block_height: u64,
    /// `None` while the table is active.
    pub deactivation_slot: Option<u64>,
    /// `None` once the table is frozen.
    pub authority: Option<Address>,
    pub addresses: Vec<Address>,
}

impl LookupTableState {
    pub fn header_layout() -> Layout {
        Layout::new()
            .u64(LAST_EXTENDED_SLOT)
            .u64(LAST_EXTENDED_BLOCK_HEIGHT)
            .u64(DEACTIVATION_SLOT)
            .blob(AUTHORITY, Address::LEN)
    }

    pub fn decode(data: &[u8]) -> Result<Self, LayoutError> {
        let (header, tail) = Self::header_layout().decode_prefix(data)?;

        let leftover = tail.len() % Address::LEN;
        if leftover != 0 {
            return Err(LayoutError::Truncated {
                field: "addresses".into(),
                needed: Address::LEN,
                remaining: leftover,
            });
        }

        let deactivation_slot = get_u64(&header, DEACTIVATION_SLOT)?;
        let authority = header
            .get_bytes(AUTHORITY)
            .ok_or_else(|| LayoutError::MissingField(AUTHORITY.into()))?;
        let authority = <[u8; 32]>::try_from(authority).map_err(|_| LayoutError::BlobLength {
            field: AUTHORITY.into(),
            expected: Address::LEN,
            actual: authority.len(),
        })?;

        let addresses = tail
            .chunks_exact(Address::LEN)
            .map(|chunk| {
                let mut bytes = [0u8; 32];
                bytes.copy_from_slice(chunk);
                Address::new_from_array(bytes)
            })
            .collect();

        Ok(Self {
            last_extended_slot: get_u64(&header, LAST_EXTENDED_SLOT)?,
            last_extended_block_height: get_u64(&header, LAST_EXTENDED_BLOCK_HEIGHT)?,
            deactivation_slot: (deactivation_slot != u64::MAX).then_some(deactivation_slot),
            authority: (authority != [0u8; 32]).then(|| Address::new_from_array(authority)),
            addresses,
        })
    }

    pub fn is_active(&self) -> bool {
        self.deactivation_slot.is_none()
    }
}

fn get_u64(record: &Record, name: &str) -> Result<u64, LayoutError> {
    record
        .get_u64(name)
        .ok_or_else(|| LayoutError::MissingField(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(deactivation: u64, authority: [u8; 32], addresses: &[[u8; 32]]) -> Vec<u8> {
        let record = Record::new()
            .with(LAST_EXTENDED_SLOT, 250_000_000u64)
            .with(LAST_EXTENDED_BLOCK_HEIGHT, 230_000_000u64)
            .with(DEACTIVATION_SLOT, deactivation)
            .with(AUTHORITY, authority);
        let mut data = LookupTableState::header_layout().encode(&record).unwrap();
        for address in addresses {
            data.extend_from_slice(address);
        }
        data
    }

    #[test]
    fn header_is_56_bytes() {
        assert_eq!(LookupTableState::header_layout().span(), 56);
    }

    #[test]
    fn decode_active_table() {
        let data = encode(u64::MAX, [7u8; 32], &[[1u8; 32], [2u8; 32]]);
        let state = LookupTableState::decode(&data).unwrap();
        assert_eq!(state.last_extended_slot, 250_000_000);
        assert_eq!(state.last_extended_block_height, 230_000_000);
        assert_eq!(state.deactivation_slot, None);
        assert!(state.is_active());
        assert_eq!(state.authority, Some(Address::new_from_array([7u8; 32])));
        assert_eq!(
            state.addresses,
            vec![Address::new_from_array([1u8; 32]), Address::new_from_array([2u8; 32])]
        );
    }

    #[test]
    fn decode_frozen_deactivated_table() {
        let data = encode(1234, [0u8; 32], &[]);
        let state = LookupTableState::decode(&data).unwrap();
        assert_eq!(state.deactivation_slot, Some(1234));
        assert!(!state.is_active());
        assert_eq!(state.authority, None);
        assert!(state.addresses.is_empty());
    }

    #[test]
    fn short_header_is_truncated() {
        let data = encode(u64::MAX, [7u8; 32], &[]);
        assert!(matches!(
            LookupTableState::decode(&data[..40]),
            Err(LayoutError::Truncated { .. })
        ));
    }

    #[test]
    fn partial_trailing_address_is_rejected() {
        let mut data = encode(u64::MAX, [7u8; 32], &[[1u8; 32]]);
        data.extend_from_slice(&[9u8; 5]);
        assert_eq!(
            LookupTableState::decode(&data).unwrap_err(),
            LayoutError::Truncated {
                field: "addresses".into(),
                needed: 32,
                remaining: 5,
            }
        );
    }
}
