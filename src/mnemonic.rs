//! BIP-39 entropy -> mnemonic -> seed, fixed to 256-bit entropy and the
//! resulting 24-word English mnemonic (`ENT = 256`, `CS = ENT/32 = 8`,
//! `(ENT+CS)/11 = 24` words).
//!
//! The bit-packing here is a plain bit array rather than the windowed
//! byte-shift trick a register-constrained device kernel would use; on a
//! CPU this is clearer and produces bit-identical output.

#![forbid(unsafe_code)]

use crate::hash::sha256::sha256_short;
use crate::hash::sha512::sha512;
use crate::mac::{pbkdf2_hmac_sha512_one_block, MacError, BLOCK_LEN};
use crate::wordlist::{self, WORDS};

/// Entropy length this module accepts: 256 bits.
pub const ENTROPY_LEN: usize = 32;
/// Mnemonic length this module produces: 24 words.
pub const WORD_COUNT: usize = 24;
/// Upper bound on the serialized mnemonic phrase (24 words, each at most 8
/// bytes, space-separated): `24*8 + 23 = 215`, rounded up.
pub const MAX_PHRASE_LEN: usize = 256;

/// Errors from mnemonic parsing.
#[derive(Debug, thiserror::Error)]
pub enum MnemonicError {
    /// The word list did not have exactly [`WORD_COUNT`] entries.
    #[error("mnemonic must have exactly {WORD_COUNT} words, got {0}")]
    WrongWordCount(usize),
    /// A word was not found in the BIP-39 English wordlist.
    #[error("word {0:?} is not in the BIP-39 English wordlist")]
    UnknownWord(String),
    /// The trailing checksum byte didn't match the recomputed one.
    #[error("mnemonic checksum mismatch: computed {computed:#04x}, expected {expected:#04x}")]
    ChecksumMismatch {
        /// The checksum byte recomputed from the entropy.
        computed: u8,
        /// The checksum byte found in the mnemonic.
        expected: u8,
    },
}

/// Derive the 24-word mnemonic from 32 bytes of entropy.
///
/// `checksum = SHA-256(entropy)[0]`; the 264-bit string
/// `entropy || checksum` is split into twenty-four 11-bit big-endian
/// fields, each indexing [`WORDS`].
pub fn entropy_to_mnemonic(entropy: &[u8; ENTROPY_LEN]) -> [&'static str; WORD_COUNT] {
    let checksum_byte =
        sha256_short(entropy).expect("32-byte entropy always fits a single SHA-256 block")[0];

    let mut bits = [0u8; ENTROPY_LEN * 8 + 8];
    for i in 0..ENTROPY_LEN * 8 {
        bits[i] = (entropy[i / 8] >> (7 - i % 8)) & 1;
    }
    for i in 0..8 {
        bits[ENTROPY_LEN * 8 + i] = (checksum_byte >> (7 - i)) & 1;
    }

    let mut words = [""; WORD_COUNT];
    for (w, word_slot) in words.iter_mut().enumerate() {
        let mut idx: u16 = 0;
        for b in 0..11 {
            idx = (idx << 1) | bits[w * 11 + b] as u16;
        }
        *word_slot = WORDS[idx as usize];
    }
    words
}

/// Recover the original 32-byte entropy from a 24-word mnemonic, verifying
/// the checksum byte.
pub fn mnemonic_to_entropy(words: &[&str]) -> Result<[u8; ENTROPY_LEN], MnemonicError> {
    if words.len() != WORD_COUNT {
        return Err(MnemonicError::WrongWordCount(words.len()));
    }
    let mut bits = [0u8; ENTROPY_LEN * 8 + 8];
    for (w, word) in words.iter().enumerate() {
        let idx = wordlist::index_of(word)
            .ok_or_else(|| MnemonicError::UnknownWord((*word).to_string()))?;
        for b in 0..11 {
            bits[w * 11 + b] = ((idx >> (10 - b)) & 1) as u8;
        }
    }
    let mut entropy = [0u8; ENTROPY_LEN];
    for i in 0..ENTROPY_LEN * 8 {
        if bits[i] == 1 {
            entropy[i / 8] |= 1 << (7 - i % 8);
        }
    }
    let mut expected = 0u8;
    for b in 0..8 {
        expected = (expected << 1) | bits[ENTROPY_LEN * 8 + b];
    }
    let computed = sha256_short(&entropy)
        .expect("32-byte entropy always fits a single SHA-256 block")[0];
    if computed != expected {
        return Err(MnemonicError::ChecksumMismatch { computed, expected });
    }
    Ok(entropy)
}

/// Serialize a 24-word mnemonic into its canonical space-separated ASCII
/// form, without heap allocation.
pub fn mnemonic_phrase(words: &[&str; WORD_COUNT]) -> ([u8; MAX_PHRASE_LEN], usize) {
    let mut buf = [0u8; MAX_PHRASE_LEN];
    let mut len = 0;
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            buf[len] = b' ';
            len += 1;
        }
        let word_bytes = word.as_bytes();
        buf[len..len + word_bytes.len()].copy_from_slice(word_bytes);
        len += word_bytes.len();
    }
    (buf, len)
}

/// BIP-39 seed derivation: `PBKDF2-HMAC-SHA512(mnemonic, "mnemonic", 2048, 64)`.
///
/// Passphrase-protected seeds are out of scope for this crate (see the
/// module-level note in `lib.rs`); the salt is always the literal string
/// `"mnemonic"`.
///
/// A serialized 24-word phrase can exceed the 128-byte HMAC key bound (see
/// [`crate::mac::HmacSha512::new`]); per this crate's resolution of that
/// boundary case, a phrase over 128 bytes is first collapsed to 64 bytes via
/// a single SHA-512 pass before it's used as the PBKDF2 password.
pub fn mnemonic_to_seed(words: &[&str; WORD_COUNT]) -> Result<[u8; 64], MacError> {
    let (phrase_buf, phrase_len) = mnemonic_phrase(words);
    let phrase = &phrase_buf[..phrase_len];
    if phrase.len() > BLOCK_LEN {
        let prehashed = sha512(phrase);
        pbkdf2_hmac_sha512_one_block(&prehashed, b"mnemonic")
    } else {
        pbkdf2_hmac_sha512_one_block(phrase, b"mnemonic")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_entropy_matches_official_test_vector() {
        let entropy = [0u8; ENTROPY_LEN];
        let words = entropy_to_mnemonic(&entropy);
        // The official 256-bit all-zero-entropy vector is "abandon" x23
        // followed by "art".
        assert!(words[..23].iter().all(|&w| w == "abandon"));
        assert_eq!(words[23], "art");
    }

    #[test]
    fn seed_derivation_is_deterministic() {
        let entropy = [0u8; ENTROPY_LEN];
        let words = entropy_to_mnemonic(&entropy);
        let a = mnemonic_to_seed(&words).unwrap();
        let b = mnemonic_to_seed(&words).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_mnemonics_give_different_seeds() {
        let a = mnemonic_to_seed(&entropy_to_mnemonic(&[0x00; ENTROPY_LEN])).unwrap();
        let b = mnemonic_to_seed(&entropy_to_mnemonic(&[0x01; ENTROPY_LEN])).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn entropy_roundtrips_through_mnemonic() {
        let entropy = {
            let mut e = [0u8; ENTROPY_LEN];
            for (i, b) in e.iter_mut().enumerate() {
                *b = (i * 7 + 3) as u8;
            }
            e
        };
        let words = entropy_to_mnemonic(&entropy);
        let recovered = mnemonic_to_entropy(&words).unwrap();
        assert_eq!(entropy, recovered);
    }

    #[test]
    fn rejects_wrong_word_count() {
        let words = ["abandon"; 23];
        assert!(matches!(
            mnemonic_to_entropy(&words),
            Err(MnemonicError::WrongWordCount(23))
        ));
    }

    #[test]
    fn rejects_unknown_word() {
        let mut words = entropy_to_mnemonic(&[0u8; ENTROPY_LEN]);
        words[0] = "notabip39word";
        assert!(matches!(
            mnemonic_to_entropy(&words),
            Err(MnemonicError::UnknownWord(_))
        ));
    }

    #[test]
    fn rejects_bad_checksum() {
        let mut words = entropy_to_mnemonic(&[0u8; ENTROPY_LEN]);
        // Swap the last word for one that changes the checksum bits
        // without otherwise matching.
        words[23] = "zoo";
        assert!(matches!(
            mnemonic_to_entropy(&words),
            Err(MnemonicError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn phrase_serialization_has_no_trailing_space() {
        let words = entropy_to_mnemonic(&[0xAB; ENTROPY_LEN]);
        let (buf, len) = mnemonic_phrase(&words);
        let phrase = core::str::from_utf8(&buf[..len]).unwrap();
        assert!(!phrase.ends_with(' '));
        assert_eq!(phrase.split(' ').count(), WORD_COUNT);
    }
}
