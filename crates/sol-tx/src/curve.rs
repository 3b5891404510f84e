//! Ed25519 curve membership.
//!
//! The signature scheme works on the twisted Edwards curve
//!
//! ```text
//! -x^2 + y^2 = 1 + d*x^2*y^2    over GF(p), p = 2^255 - 19
//! d = -121665 / 121666
//! ```
//!
//! A compressed point stores `y` as 255 little-endian bits plus the sign of
//! `x` in bit 255. Solving the curve equation for `x` gives
//! `x^2 = (y^2 - 1) / (d*y^2 + 1)`, so 32 bytes name a curve point exactly
//! when that quotient is a square mod p.
//!
//! Program-derived addresses must fail this test, since an on-curve address
//! could have a private key.

use std::sync::OnceLock;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

/// How the 32 input bytes become the `y` coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YDecoding {
    /// Clear bit 255 (the sign of `x`) and reduce the remaining 255 bits
    /// mod p. This is what point decompression does.
    #[default]
    ClearSignBit,
    /// Reduce all 256 bits mod p without clearing the sign bit.
    FullWidth,
}

struct CurveParams {
    p: BigUint,
    d: BigUint,
    /// p - 2, the Fermat inverse exponent.
    inverse_exp: BigUint,
    /// (p - 1) / 2, the Euler criterion exponent.
    euler_exp: BigUint,
}

fn params() -> &'static CurveParams {
    static PARAMS: OnceLock<CurveParams> = OnceLock::new();
    PARAMS.get_or_init(|| {
        let p = (BigUint::one() << 255u32) - BigUint::from(19u32);
        let inverse_exp = &p - BigUint::from(2u32);
        let euler_exp = (&p - BigUint::one()) >> 1u32;
        let inv_121666 = BigUint::from(121_666u32).modpow(&inverse_exp, &p);
        let d = ((&p - BigUint::from(121_665u32)) * inv_121666) % &p;
        CurveParams {
            p,
            d,
            inverse_exp,
            euler_exp,
        }
    })
}

/// Interpret `bytes` as a field element according to `mode`.
fn decode_y(bytes: &[u8; 32], mode: YDecoding) -> BigUint {
    let mut le = *bytes;
    if mode == YDecoding::ClearSignBit {
        le[31] &= 0x7f;
    }
    BigUint::from_bytes_le(&le) % &params().p
}

/// Whether `bytes` is a valid compressed Ed25519 point.
///
/// Total over all 2^256 inputs: never panics, never errors.
pub fn is_on_curve(bytes: &[u8; 32], mode: YDecoding) -> bool {
    let CurveParams {
        p,
        d,
        inverse_exp,
        euler_exp,
    } = params();

    let y = decode_y(bytes, mode);
    let y2 = (&y * &y) % p;
    let numerator = (&y2 + p - BigUint::one()) % p;
    let denominator = (d * &y2 + BigUint::one()) % p;

    if denominator.is_zero() {
        return false;
    }

    let x2 = (numerator * denominator.modpow(inverse_exp, p)) % p;

    // y = +-1 gives x = 0, which is a point (the identity when y = 1).
    if x2.is_zero() {
        return true;
    }

    x2.modpow(euler_exp, p).is_one()
}
