//! Prefix matching against a Base58-encoded address payload.
//!
//! Fully Base58-encoding a candidate payload just to check a short prefix
//! costs roughly 52 digits' worth of per-byte division. [`matches_fast`]
//! instead groups the payload into base-58⁴ limbs and only extracts the
//! leading digits the pattern actually needs. [`matches_generic`] does the
//! naive full encode-then-compare and exists purely so tests can check the
//! two methods never disagree.

#![forbid(unsafe_code)]

use crate::address::{base58_encode, ALPHABET};

const LIMB_BASE: u32 = 58 * 58 * 58 * 58; // 11,316,496
const MAX_LIMBS: usize = 13; // ceil(38 bytes worth of base58 digits / 4)

const fn build_decode_table() -> [i8; 256] {
    let mut table = [-1i8; 256];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as i8;
        i += 1;
    }
    table
}

const DECODE: [i8; 256] = build_decode_table();

fn decode_char(c: u8) -> Option<u8> {
    let v = DECODE[c as usize];
    if v < 0 {
        None
    } else {
        Some(v as u8)
    }
}

/// Does pattern character `want` match address digit value `have`? Under
/// case-insensitive mode a letter also matches whichever digit its
/// opposite-case form decodes to.
fn char_matches(want: u8, have: u8, case_insensitive: bool) -> bool {
    if decode_char(want) == Some(have) {
        return true;
    }
    if case_insensitive {
        let flipped = if want.is_ascii_lowercase() {
            want.to_ascii_uppercase()
        } else if want.is_ascii_uppercase() {
            want.to_ascii_lowercase()
        } else {
            return false;
        };
        return decode_char(flipped) == Some(have);
    }
    false
}

/// Convert `bytes` (already stripped of leading zero bytes) into little-endian
/// base-58⁴ limbs, most-significant limb stored at `limbs[MAX_LIMBS - length]`.
/// Mirrors the byte-at-a-time "multiply by 256, add carry" conversion
/// [`crate::address::base58_encode`] uses, just with a wider digit base.
fn bytes_to_limbs(bytes: &[u8]) -> ([u32; MAX_LIMBS], usize) {
    let mut limbs = [0u32; MAX_LIMBS];
    let mut length = 0usize;
    for &byte in bytes {
        let mut carry = byte as u64;
        let mut i = 0usize;
        for slot in limbs.iter_mut().rev() {
            if carry == 0 && i >= length {
                break;
            }
            carry += 256 * (*slot as u64);
            *slot = (carry % LIMB_BASE as u64) as u32;
            carry /= LIMB_BASE as u64;
            i += 1;
        }
        length = i;
    }
    (limbs, length)
}

/// How many Base58 digits `value` needs (1..=4), with no leading zero digits.
fn top_limb_digit_count(value: u32) -> usize {
    if value < 58 {
        1
    } else if value < 58 * 58 {
        2
    } else if value < 58 * 58 * 58 {
        3
    } else {
        4
    }
}

const DIVISORS: [u32; 4] = [58 * 58 * 58, 58 * 58, 58, 1];

/// Extract digit `index` (0 = most significant) of a 4-digit base-58 limb.
fn limb_digit(limb: u32, index: usize) -> u8 {
    ((limb / DIVISORS[index]) % 58) as u8
}

/// The Base58 digit value at position `k` (0 = most significant) within the
/// non-zero-byte-prefix portion of the payload, or `None` past the end.
fn digit_at(limbs: &[u32; MAX_LIMBS], length: usize, top_digit_count: usize, k: usize) -> Option<u8> {
    if length == 0 {
        return None;
    }
    let total = top_digit_count + 4 * (length - 1);
    if k >= total {
        return None;
    }
    let top_index = MAX_LIMBS - length;
    if k < top_digit_count {
        let within = (4 - top_digit_count) + k;
        Some(limb_digit(limbs[top_index], within))
    } else {
        let rem = k - top_digit_count;
        let limb_offset = rem / 4;
        let within = rem % 4;
        Some(limb_digit(limbs[top_index + 1 + limb_offset], within))
    }
}

/// Does the Base58 encoding of `payload` start with `pattern`?
///
/// Computes only the leading digits `pattern` needs, via grouped base-58⁴
/// limbs, instead of encoding the whole 38-byte payload.
pub fn matches_fast(payload: &[u8; 38], pattern: &[u8], case_insensitive: bool) -> bool {
    let zeros = payload.iter().take_while(|&&b| b == 0).count();
    let (limbs, length) = bytes_to_limbs(&payload[zeros..]);
    let top_digit_count = if length == 0 {
        0
    } else {
        top_limb_digit_count(limbs[MAX_LIMBS - length])
    };
    let total_digits = if length == 0 { 0 } else { top_digit_count + 4 * (length - 1) };
    let total_len = zeros + total_digits;

    if pattern.len() > total_len {
        return false;
    }

    for (p, &want) in pattern.iter().enumerate() {
        let have = if p < zeros {
            0u8 // '1'
        } else {
            match digit_at(&limbs, length, top_digit_count, p - zeros) {
                Some(d) => d,
                None => return false,
            }
        };
        if !char_matches(want, have, case_insensitive) {
            return false;
        }
    }
    true
}

/// Reference implementation: fully Base58-encode `payload`, then compare its
/// prefix against `pattern`. Kept only so tests can check [`matches_fast`]
/// never disagrees with it.
pub fn matches_generic(payload: &[u8; 38], pattern: &[u8], case_insensitive: bool) -> bool {
    let encoded = base58_encode(payload);
    let encoded_bytes = encoded.as_bytes();
    if pattern.len() > encoded_bytes.len() {
        return false;
    }
    for (&want, &have) in pattern.iter().zip(encoded_bytes.iter()) {
        let have_digit = match decode_char(have) {
            Some(d) => d,
            None => return false,
        };
        if !char_matches(want, have_digit, case_insensitive) {
            return false;
        }
    }
    true
}
