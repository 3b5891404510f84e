//! Program-derived addresses.
//!
//! A PDA is `SHA-256(seed_0 || ... || seed_n || bump || program_id ||
//! "ProgramDerivedAddress")` for the highest bump seed (255 counting down)
//! whose hash is NOT a point on the Ed25519 curve. Being off-curve
//! guarantees that no private key exists for the address, so only the
//! owning program can sign for it.

use log::{debug, trace};
use sha2::{Digest, Sha256};

use crate::address::Address;
use crate::curve::{self, YDecoding};
use crate::error::DerivationError;
use crate::programs::ProgramRegistry;

/// Maximum length of a single seed.
pub const MAX_SEED_LEN: usize = 32;

/// Maximum number of seeds, the bump seed included.
pub const MAX_SEEDS: usize = 16;

/// Domain separator appended to every PDA hash.
pub const PDA_MARKER: &[u8; 21] = b"ProgramDerivedAddress";

/// The result of a PDA search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramDerivedAddress {
    pub address: Address,
    pub bump_seed: u8,
}

fn check_seeds(seeds: &[&[u8]]) -> Result<(), DerivationError> {
    if seeds.len() > MAX_SEEDS {
        return Err(DerivationError::TooManySeeds(seeds.len()));
    }
    for (index, seed) in seeds.iter().enumerate() {
        if seed.len() > MAX_SEED_LEN {
            return Err(DerivationError::SeedTooLong {
                index,
                len: seed.len(),
            });
        }
    }
    Ok(())
}

fn hash_candidate(seeds: &[&[u8]], bump: Option<u8>, program_id: &Address) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    if let Some(bump) = bump {
        hasher.update([bump]);
    }
    hasher.update(program_id);
    hasher.update(PDA_MARKER);
    hasher.finalize().into()
}

/// Compute the address for exactly these seeds (bump seed already
/// included), failing if the hash lands on the curve.
pub fn create_program_address(
    seeds: &[&[u8]],
    program_id: &Address,
) -> Result<Address, DerivationError> {
    create_program_address_with(seeds, program_id, YDecoding::default())
}

pub fn create_program_address_with(
    seeds: &[&[u8]],
    program_id: &Address,
    mode: YDecoding,
) -> Result<Address, DerivationError> {
    check_seeds(seeds)?;
    let hash = hash_candidate(seeds, None, program_id);
    if curve::is_on_curve(&hash, mode) {
        return Err(DerivationError::OnCurve);
    }
    Ok(Address::new_from_array(hash))
}

/// Search bump seeds 255 down to 0 for the first off-curve address.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Address,
) -> Result<ProgramDerivedAddress, DerivationError> {
    find_program_address_with(seeds, program_id, YDecoding::default())
}

pub fn find_program_address_with(
    seeds: &[&[u8]],
    program_id: &Address,
    mode: YDecoding,
) -> Result<ProgramDerivedAddress, DerivationError> {
    // Leave room for the bump seed.
    if seeds.len() >= MAX_SEEDS {
        return Err(DerivationError::TooManySeeds(seeds.len() + 1));
    }
    check_seeds(seeds)?;

    for bump in (0u8..=255).rev() {
        let hash = hash_candidate(seeds, Some(bump), program_id);

        if curve::is_on_curve(&hash, mode) {
            trace!("bump {bump} lands on curve for program {program_id}");
            continue;
        }

        let address = Address::new_from_array(hash);
        debug!("derived {address} with bump {bump} for program {program_id}");
        return Ok(ProgramDerivedAddress {
            address,
            bump_seed: bump,
        });
    }

    Err(DerivationError::Exhausted)
}

/// Derive the associated token account for `owner` and `mint`.
///
/// Seeds are `[owner, token_program, mint]`, owned by the associated token
/// program taken from `programs`.
pub fn associated_token_address(
    owner: &Address,
    mint: &Address,
    token_program: &Address,
    programs: &ProgramRegistry,
) -> Result<ProgramDerivedAddress, DerivationError> {
    find_program_address(
        &[owner.as_ref(), token_program.as_ref(), mint.as_ref()],
        &programs.associated_token_program(),
    )
}
