//! Base58 (Bitcoin alphabet) encoding and Ergo P2PK address construction.
//!
//! Full Base58 encoding is not on the hot search path — per-candidate
//! prefix checks go through [`crate::matcher`]'s grouped-limb comparison
//! instead. This module's `base58_encode` exists for reconstructing and
//! verifying confirmed hits on the host, so it's free to use `String`/`Vec`.

#![forbid(unsafe_code)]

use crate::hash::blake2b::{blake2b_256, Blake2bError};

/// Bitcoin's Base58 alphabet: digits 0, letters O/I/l are excluded.
pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Ergo mainnet P2PK address prefix byte (network = mainnet, type = P2PK).
pub const MAINNET_P2PK_PREFIX: u8 = 0x01;

/// The unencoded address payload length: 1-byte prefix + 33-byte compressed
/// pubkey + 4-byte checksum.
pub const PAYLOAD_LEN: usize = 38;

/// Errors from address construction.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    /// Propagated from the checksum hash.
    #[error(transparent)]
    Checksum(#[from] Blake2bError),
}

/// Encode `bytes` as Base58, per the standard leading-zero-byte /
/// repeated-division-by-58 algorithm.
pub fn base58_encode(bytes: &[u8]) -> String {
    let zeroes = bytes.iter().take_while(|&&b| b == 0).count();
    let input = &bytes[zeroes..];
    let size = input.len() * 138 / 100 + 1;
    let mut b58 = vec![0u8; size];
    let mut length = 0usize;
    for &byte in input {
        let mut carry = byte as u32;
        let mut i = 0usize;
        for slot in b58.iter_mut().rev() {
            if carry == 0 && i >= length {
                break;
            }
            carry += 256 * (*slot as u32);
            *slot = (carry % 58) as u8;
            carry /= 58;
            i += 1;
        }
        length = i;
    }
    let mut start = size - length;
    while start < size && b58[start] == 0 {
        start += 1;
    }
    let mut result = String::with_capacity(zeroes + (size - start));
    for _ in 0..zeroes {
        result.push('1');
    }
    for &digit in &b58[start..] {
        result.push(ALPHABET[digit as usize] as char);
    }
    result
}

/// Build the 38-byte Ergo P2PK address payload: `prefix || pubkey || checksum`,
/// where `checksum = Blake2b-256(prefix || pubkey)[..4]`.
pub fn build_payload(compressed_pubkey: &[u8; 33]) -> Result<[u8; PAYLOAD_LEN], AddressError> {
    let mut prefixed = [0u8; 34];
    prefixed[0] = MAINNET_P2PK_PREFIX;
    prefixed[1..].copy_from_slice(compressed_pubkey);
    let checksum = blake2b_256(&prefixed)?;

    let mut payload = [0u8; PAYLOAD_LEN];
    payload[..34].copy_from_slice(&prefixed);
    payload[34..].copy_from_slice(&checksum[..4]);
    Ok(payload)
}

/// Build the full Base58-encoded Ergo mainnet P2PK address for a compressed
/// public key.
pub fn ergo_p2pk_address(compressed_pubkey: &[u8; 33]) -> Result<String, AddressError> {
    let payload = build_payload(compressed_pubkey)?;
    Ok(base58_encode(&payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bip32, curve::JacobianPoint, mnemonic};

    #[test]
    fn base58_known_vectors() {
        assert_eq!(base58_encode(&[]), "");
        assert_eq!(base58_encode(&[0x00]), "1");
        assert_eq!(base58_encode(&[0x00, 0x00]), "11");
        assert_eq!(base58_encode(&[0x01]), "2");
        assert_eq!(base58_encode(&[0x39]), "z");
        assert_eq!(base58_encode(&[0x3A]), "21");
    }

    #[test]
    fn base58_alphabet_excludes_ambiguous_chars() {
        for forbidden in [b'0', b'O', b'I', b'l'] {
            assert!(!ALPHABET.contains(&forbidden));
        }
        assert_eq!(ALPHABET.len(), 58);
    }

    #[test]
    fn payload_layout_is_38_bytes_with_mainnet_prefix() {
        let pubkey = {
            let mut one = [0u8; 32];
            one[31] = 1;
            JacobianPoint::scalar_mul(&one).unwrap().to_compressed().unwrap()
        };
        let payload = build_payload(&pubkey).unwrap();
        assert_eq!(payload.len(), PAYLOAD_LEN);
        assert_eq!(payload[0], MAINNET_P2PK_PREFIX);
        assert_eq!(&payload[1..34], &pubkey[..]);
    }

    #[test]
    fn address_starts_with_nine_and_has_expected_second_char_range() {
        let pubkey = {
            let mut one = [0u8; 32];
            one[31] = 1;
            JacobianPoint::scalar_mul(&one).unwrap().to_compressed().unwrap()
        };
        let address = ergo_p2pk_address(&pubkey).unwrap();
        assert!(address.starts_with('9'));
        let second = address.as_bytes()[1] as char;
        assert!(
            "efghi".contains(second),
            "unexpected second character {second:?} in {address}"
        );
    }

    #[test]
    fn address_derivation_is_deterministic_end_to_end() {
        // entropy = 32 zero bytes, address index 0.
        let entropy = [0u8; mnemonic::ENTROPY_LEN];
        let words = mnemonic::entropy_to_mnemonic(&entropy);
        let seed_a = mnemonic::mnemonic_to_seed(&words).unwrap();
        let seed_b = mnemonic::mnemonic_to_seed(&words).unwrap();
        assert_eq!(seed_a, seed_b);

        let key_a = bip32::derive_ergo_address_key(&seed_a, 0).unwrap();
        let key_b = bip32::derive_ergo_address_key(&seed_b, 0).unwrap();
        assert_eq!(key_a, key_b);

        let pubkey = JacobianPoint::scalar_mul(&key_a).unwrap().to_compressed().unwrap();
        let address_a = ergo_p2pk_address(&pubkey).unwrap();
        let address_b = ergo_p2pk_address(&pubkey).unwrap();
        assert_eq!(address_a, address_b);
        assert!(address_a.starts_with('9'));
        assert!(address_a.len() >= 40 && address_a.len() <= 52);
        // Pinned reference vector: all-zero entropy, address index 0.
        assert_eq!(address_a, "9errK7Qa3oBVHbS4uGFPSe7ETvfHkZGcskV1gqGf6fqLUPAamo");
    }
}
