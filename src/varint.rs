/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Unsigned LEB128 varints: little-endian base-128, least-significant group
//! first, continuation bit set on every byte but the last.

use crate::error::VarintError;

/// Maximum encoded length of a 64-bit varint.
pub const MAX_LEN: usize = 10;

/// Encodes `x` as a varint, writing 1..=10 bytes into `out` and returning the
/// number of bytes written. Never fails.
#[inline]
pub fn encode(mut x: u64, out: &mut [u8; MAX_LEN]) -> usize {
    let mut i = 0;
    loop {
        let mut byte = (x & 0x7f) as u8;
        x >>= 7;
        if x != 0 {
            byte |= 0x80;
        }
        out[i] = byte;
        i += 1;
        if x == 0 {
            break;
        }
    }
    i
}

/// Decodes one varint from the front of `bytes`.
///
/// Returns:
/// - `Ok(Some((value, bytes_read)))` on success,
/// - `Ok(None)` if `bytes` is empty (end-of-stream at a varint boundary,
///   not an error),
/// - `Err(VarintError::TruncatedInput)` if `bytes` ends mid-varint,
/// - `Err(VarintError::Overflow)` if the 10th byte still has its
///   continuation bit set, or its payload exceeds 1.
#[inline]
pub fn decode(bytes: &[u8]) -> Result<Option<(u64, usize)>, VarintError> {
    if bytes.is_empty() {
        return Ok(None);
    }
    let mut value: u64 = 0;
    for (i, &byte) in bytes.iter().take(MAX_LEN).enumerate() {
        let payload = (byte & 0x7f) as u64;
        if i == MAX_LEN - 1 && (byte & 0x80 != 0 || payload > 1) {
            return Err(VarintError::Overflow);
        }
        value |= payload << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(Some((value, i + 1)));
        }
    }
    Err(VarintError::TruncatedInput)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(x: u64) {
        let mut buf = [0u8; MAX_LEN];
        let len = encode(x, &mut buf);
        assert!((1..=MAX_LEN).contains(&len));
        let (decoded, read) = decode(&buf[..len]).unwrap().expect("non-empty input");
        assert_eq!(decoded, x, "roundtrip mismatch for {x}");
        assert_eq!(read, len);
    }

    #[test]
    fn roundtrip_small_values() {
        for x in 0..1000u64 {
            roundtrip(x);
        }
    }

    #[test]
    fn roundtrip_boundaries() {
        for shift in 0..64 {
            let x = 1u64 << shift;
            roundtrip(x);
            roundtrip(x.wrapping_sub(1));
            roundtrip(x.wrapping_add(1));
        }
        roundtrip(u64::MAX);
        roundtrip(0);
    }

    #[test]
    fn encode_length_grows_every_seven_bits() {
        let mut buf = [0u8; MAX_LEN];
        assert_eq!(encode(0, &mut buf), 1);
        assert_eq!(encode(0x7f, &mut buf), 1);
        assert_eq!(encode(0x80, &mut buf), 2);
        assert_eq!(encode(u64::MAX, &mut buf), 10);
    }

    #[test]
    fn decode_empty_is_end_of_stream() {
        assert_eq!(decode(&[]).unwrap(), None);
    }

    #[test]
    fn decode_truncated_mid_sequence_errors() {
        // 0x80 has its continuation bit set but nothing follows.
        assert_eq!(decode(&[0x80]), Err(VarintError::TruncatedInput));
        assert_eq!(decode(&[0xff; 9]), Err(VarintError::TruncatedInput));
    }

    #[test]
    fn decode_tenth_byte_overflow() {
        // Nine continuation bytes of all-payload-bits plus a 10th with the
        // continuation bit still set must overflow.
        let mut bytes = [0xffu8; MAX_LEN];
        bytes[9] = 0x80; // continuation bit set on the 10th byte
        assert_eq!(decode(&bytes), Err(VarintError::Overflow));
    }

    #[test]
    fn decode_tenth_byte_excess_payload_bits() {
        let mut bytes = [0xffu8; MAX_LEN];
        bytes[9] = 0x02; // terminates, but payload > 1
        assert_eq!(decode(&bytes), Err(VarintError::Overflow));
    }

    #[test]
    fn decode_tenth_byte_exact_max() {
        let mut buf = [0u8; MAX_LEN];
        let len = encode(u64::MAX, &mut buf);
        assert_eq!(len, MAX_LEN);
        assert_eq!(buf[9], 0x01);
        let (decoded, read) = decode(&buf).unwrap().unwrap();
        assert_eq!(decoded, u64::MAX);
        assert_eq!(read, MAX_LEN);
    }
}
