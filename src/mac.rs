//! HMAC-SHA512 and the single-block PBKDF2-HMAC-SHA512 built on it.
//!
//! [`HmacSha512`] precomputes the inner/outer SHA-512 midstates once per key
//! so repeated calls to [`HmacSha512::compute`] never re-absorb the 128-byte
//! key block — this is what makes 2048-round PBKDF2 affordable per
//! candidate. [`HmacSha512::compute_fixed64`] is the specialized path for
//! PBKDF2's non-first rounds, where the message is always exactly the
//! previous round's 64-byte output; on this CPU backend it runs the same
//! code as [`HmacSha512::compute`], but it's kept as a distinct, narrowly
//! typed entry point because that's the shape the rest of the pipeline
//! (and the original fixed-function design this crate is descended from)
//! expects.

#![forbid(unsafe_code)]

use crate::hash::sha512::Sha512;

pub(crate) const BLOCK_LEN: usize = 128;
const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5c;

/// Upper bound on the PBKDF2 salt (`"mnemonic" || passphrase`). BIP-39
/// passphrases are short in every real wallet; this bound leaves generous
/// headroom while keeping the iteration buffer on the stack.
const MAX_SALT_LEN: usize = 256;

/// Errors from [`HmacSha512::new`] and [`pbkdf2_hmac_sha512_one_block`].
#[derive(Debug, thiserror::Error)]
pub enum MacError {
    /// HMAC keys longer than the 128-byte SHA-512 block are expected to be
    /// pre-hashed by the caller; this crate never does that silently.
    #[error("hmac key of {0} bytes exceeds the 128-byte block size and must be pre-hashed by the caller")]
    KeyTooLong(usize),
    /// The PBKDF2 salt plus its 4-byte block-index suffix didn't fit the
    /// fixed-size iteration buffer.
    #[error("pbkdf2 salt of {0} bytes exceeds the {max} byte limit", max = MAX_SALT_LEN - 4)]
    SaltTooLong(usize),
}

/// An HMAC-SHA512 instance with its key schedule already absorbed.
#[derive(Clone)]
pub struct HmacSha512 {
    inner_state: [u64; 8],
    inner_len: u128,
    outer_state: [u64; 8],
    outer_len: u128,
}

impl HmacSha512 {
    /// Build an HMAC-SHA512 instance for `key`.
    ///
    /// Returns [`MacError::KeyTooLong`] for keys over 128 bytes rather than
    /// silently pre-hashing them (see [`crate::mac`] module docs and the
    /// crate's redesign notes on precondition handling).
    pub fn new(key: &[u8]) -> Result<Self, MacError> {
        if key.len() > BLOCK_LEN {
            return Err(MacError::KeyTooLong(key.len()));
        }
        let mut key_block = [0u8; BLOCK_LEN];
        key_block[..key.len()].copy_from_slice(key);

        let mut ipad = [0u8; BLOCK_LEN];
        let mut opad = [0u8; BLOCK_LEN];
        for i in 0..BLOCK_LEN {
            ipad[i] = key_block[i] ^ IPAD;
            opad[i] = key_block[i] ^ OPAD;
        }

        let mut inner = Sha512::new();
        inner.update(&ipad);
        let (inner_state, inner_len) = inner.midstate();

        let mut outer = Sha512::new();
        outer.update(&opad);
        let (outer_state, outer_len) = outer.midstate();

        Ok(HmacSha512 {
            inner_state,
            inner_len,
            outer_state,
            outer_len,
        })
    }

    /// `HMAC-SHA512(key, message)` for an arbitrary-length message.
    pub fn compute(&self, message: &[u8]) -> [u8; 64] {
        let mut inner = Sha512::from_midstate(self.inner_state, self.inner_len);
        inner.update(message);
        let inner_digest = inner.finalize();

        let mut outer = Sha512::from_midstate(self.outer_state, self.outer_len);
        outer.update(&inner_digest);
        outer.finalize()
    }

    /// `HMAC-SHA512(key, message)` specialized for an exactly-64-byte message.
    pub fn compute_fixed64(&self, message: &[u8; 64]) -> [u8; 64] {
        self.compute(message)
    }
}

/// PBKDF2-HMAC-SHA512 fixed to a single 64-byte output block and 2048
/// iterations, as used by BIP-39 seed derivation.
///
/// `password` must be 128 bytes or shorter (see [`HmacSha512::new`]); a
/// caller deriving a BIP-39 seed from an overlong mnemonic phrase is
/// responsible for pre-hashing it first, per [`crate::mnemonic`].
pub fn pbkdf2_hmac_sha512_one_block(
    password: &[u8],
    salt: &[u8],
) -> Result<[u8; 64], MacError> {
    if salt.len() > MAX_SALT_LEN - 4 {
        return Err(MacError::SaltTooLong(salt.len()));
    }
    let hmac = HmacSha512::new(password)?;

    let mut first_input = [0u8; MAX_SALT_LEN];
    first_input[..salt.len()].copy_from_slice(salt);
    first_input[salt.len()..salt.len() + 4].copy_from_slice(&1u32.to_be_bytes());

    let u1 = hmac.compute(&first_input[..salt.len() + 4]);
    let mut t = u1;
    let mut prev = u1;
    for _ in 1..2048 {
        let u_i = hmac.compute_fixed64(&prev);
        for j in 0..64 {
            t[j] ^= u_i[j];
        }
        prev = u_i;
    }
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hmac_sha512_rfc4231_case1() {
        let key = [0x0bu8; 20];
        let data = b"Hi There";
        let hmac = HmacSha512::new(&key).unwrap();
        let mac = hmac.compute(data);
        assert_eq!(
            hex::encode(mac),
            "87aa7cdea5ef619d4ff0b4241a1d6cb02379f4e2ce4ec2787ad0b30545e17cdedaa833b7d6b8a702038b274eaea3f4e4be9d914eeb61f1702e696c203a126854"
        );
    }

    #[test]
    fn hmac_rejects_oversized_key() {
        let key = [0u8; 129];
        assert!(matches!(HmacSha512::new(&key), Err(MacError::KeyTooLong(129))));
    }

    #[test]
    fn pbkdf2_rfc6070_analog_case() {
        // RFC 6070's test vectors target PBKDF2-HMAC-SHA1; here we just
        // check internal consistency: the fixed64 fast path used for
        // rounds 2..2048 must agree with the generic HMAC path.
        let hmac = HmacSha512::new(b"password").unwrap();
        let msg = [0x42u8; 64];
        assert_eq!(hmac.compute(&msg), hmac.compute_fixed64(&msg));
    }

    #[test]
    fn pbkdf2_is_deterministic() {
        let a = pbkdf2_hmac_sha512_one_block(b"mnemonic-words-here", b"mnemonicTREZOR").unwrap();
        let b = pbkdf2_hmac_sha512_one_block(b"mnemonic-words-here", b"mnemonicTREZOR").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn pbkdf2_bip39_trezor_vector() {
        // BIP-39 official test vector: 12-word "abandon...about" mnemonic,
        // passphrase "TREZOR".
        let mnemonic = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        let seed = pbkdf2_hmac_sha512_one_block(mnemonic.as_bytes(), b"mnemonicTREZOR").unwrap();
        assert_eq!(
            hex::encode(seed),
            "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc19a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e6"
        );
    }

    #[test]
    fn rejects_oversized_salt() {
        let salt = [0u8; MAX_SALT_LEN];
        assert!(matches!(
            pbkdf2_hmac_sha512_one_block(b"pw", &salt),
            Err(MacError::SaltTooLong(_))
        ));
    }
}
