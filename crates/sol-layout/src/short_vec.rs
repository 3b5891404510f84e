//! Compact-length encoding.
//!
//! Every list on the wire (signatures, account keys, instructions, account
//! indices, instruction data) is prefixed with its length encoded 7 bits per
//! byte, least significant group first, with the high bit of each byte set
//! when another byte follows:
//!
//! ```text
//! 0x0000..=0x007f   1 byte
//! 0x0080..=0x3fff   2 bytes
//! 0x4000..=0xffff   3 bytes
//! ```
//!
//! Lengths are capped at `u16::MAX`, so an encoding never exceeds three bytes.

use crate::error::LayoutError;

/// Maximum number of bytes a compact length occupies.
pub const MAX_ENCODING_LENGTH: usize = 3;

/// Encode `len` as a compact length.
pub fn encode_length(len: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_ENCODING_LENGTH);
    encode_length_into(len, &mut out);
    out
}

/// Append the compact encoding of `len` to `out`.
pub fn encode_length_into(len: u16, out: &mut Vec<u8>) {
    let mut rem = u32::from(len);
    loop {
        let mut byte = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if rem == 0 {
            break;
        }
    }
}

/// Decode a compact length from the front of `data`.
///
/// Returns `(length, bytes_consumed)`. Rejects truncated input, values that
/// do not fit in a `u16`, and encodings padded with a redundant zero group.
pub fn decode_length(data: &[u8]) -> Result<(u16, usize), LayoutError> {
    let mut value: u32 = 0;

    for (i, &byte) in data.iter().take(MAX_ENCODING_LENGTH).enumerate() {
        value |= u32::from(byte & 0x7f) << (7 * i);

        if byte & 0x80 == 0 {
            if byte == 0 && i > 0 {
                return Err(LayoutError::NonCanonicalLength);
            }
            let len = u16::try_from(value).map_err(|_| LayoutError::LengthOverflow)?;
            return Ok((len, i + 1));
        }

        if i + 1 == MAX_ENCODING_LENGTH {
            return Err(LayoutError::LengthOverflow);
        }
    }

    Err(LayoutError::Truncated {
        field: "compact length".into(),
        needed: 1,
        remaining: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- Encoding -----------------------------------------------------------

    #[test]
    fn encode_zero() {
        assert_eq!(encode_length(0), vec![0x00]);
    }

    #[test]
    fn encode_one_byte_max() {
        assert_eq!(encode_length(0x7f), vec![0x7f]);
    }

    #[test]
    fn encode_boundary_128() {
        assert_eq!(encode_length(0x80), vec![0x80, 0x01]);
    }

    #[test]
    fn encode_two_byte_max() {
        assert_eq!(encode_length(0x3fff), vec![0xff, 0x7f]);
    }

    #[test]
    fn encode_boundary_16384() {
        assert_eq!(encode_length(0x4000), vec![0x80, 0x80, 0x01]);
    }

    #[test]
    fn encode_u16_max() {
        assert_eq!(encode_length(u16::MAX), vec![0xff, 0xff, 0x03]);
    }

    #[test]
    fn encode_into_appends() {
        let mut out = vec![0xaa];
        encode_length_into(300, &mut out);
        assert_eq!(out, vec![0xaa, 0xac, 0x02]);
    }

    // -- Decoding -----------------------------------------------------------

    #[test]
    fn decode_reports_bytes_consumed() {
        assert_eq!(decode_length(&[0x05, 0xff]).unwrap(), (5, 1));
        assert_eq!(decode_length(&[0x80, 0x01, 0xff]).unwrap(), (128, 2));
        assert_eq!(decode_length(&[0xff, 0xff, 0x03]).unwrap(), (u16::MAX, 3));
    }

    #[test]
    fn decode_matches_encode() {
        for len in [0u16, 1, 127, 128, 255, 256, 1232, 16383, 16384, u16::MAX] {
            let encoded = encode_length(len);
            assert_eq!(decode_length(&encoded).unwrap(), (len, encoded.len()));
        }
    }

    #[test]
    fn decode_random_lengths() {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let len: u16 = rng.gen();
            let encoded = encode_length(len);
            assert_eq!(decode_length(&encoded).unwrap().0, len);
        }
    }

    #[test]
    fn decode_empty_is_truncated() {
        assert!(matches!(
            decode_length(&[]),
            Err(LayoutError::Truncated { .. })
        ));
    }

    #[test]
    fn decode_dangling_continuation_is_truncated() {
        assert!(matches!(
            decode_length(&[0x80]),
            Err(LayoutError::Truncated { .. })
        ));
        assert!(matches!(
            decode_length(&[0x80, 0x80]),
            Err(LayoutError::Truncated { .. })
        ));
    }

    #[test]
    fn decode_overflow_is_rejected() {
        // 0x10000 does not fit in a u16.
        assert_eq!(
            decode_length(&[0x80, 0x80, 0x04]),
            Err(LayoutError::LengthOverflow)
        );
        // A fourth byte is never allowed.
        assert_eq!(
            decode_length(&[0x80, 0x80, 0x80, 0x01]),
            Err(LayoutError::LengthOverflow)
        );
    }

    #[test]
    fn decode_non_canonical_is_rejected() {
        assert_eq!(
            decode_length(&[0x81, 0x00]),
            Err(LayoutError::NonCanonicalLength)
        );
        assert_eq!(
            decode_length(&[0x80, 0x80, 0x00]),
            Err(LayoutError::NonCanonicalLength)
        );
    }
}
