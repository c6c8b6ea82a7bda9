//! The secp256k1 scalar field `F_n`, where `n` is the order of the base point.
//!
//! Used exclusively by BIP-32 key-tweak arithmetic
//! ([`crate::bip32`]); scalar multiplication of curve points uses the raw
//! 256-bit integer value of a private key directly (see [`crate::curve`]),
//! never reducing it through this module first.

#![forbid(unsafe_code)]

use crate::limb::{self, Raw};

/// `n = 0xFFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFE BAAEDCE6 AF48A03B BFD25E8C D0364141`
const N: Raw = [
    0xBFD2_5E8C_D036_4141,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
];

/// `2^256 mod n`, used to fold carries/products back into 256 bits.
const C: Raw = [
    0x402D_A173_2FC9_BEBF,
    0x4551_2319_50B7_5FC4,
    0x0000_0000_0000_0001,
    0,
];

/// Errors surfaced by the checked scalar entry points.
#[derive(Debug, thiserror::Error)]
pub enum ScalarError {
    /// A derived scalar is `0`; per BIP-32 the caller must skip to the next
    /// index and retry.
    #[error("scalar addition produced zero, caller must retry with the next index")]
    Zero,
}

/// An element of `F_n`, always held in canonical form (`< n`).
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Scalar(Raw);

impl core::fmt::Debug for Scalar {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Scalar({})", hex::encode(self.to_be_bytes()))
    }
}

impl Scalar {
    /// The additive identity.
    pub const ZERO: Scalar = Scalar([0, 0, 0, 0]);

    /// Parse 32 big-endian bytes, reducing modulo `n` if the value is out of range.
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        let raw = limb::from_be_bytes(bytes);
        Scalar(limb::canonicalize(raw, &N))
    }

    /// Serialize to 32 big-endian bytes.
    pub fn to_be_bytes(self) -> [u8; 32] {
        limb::to_be_bytes(&self.0)
    }

    /// `true` if a 32-byte big-endian value is a valid private-key scalar,
    /// i.e. nonzero and strictly less than `n`.
    pub fn is_valid_private_key(bytes: &[u8; 32]) -> bool {
        let raw = limb::from_be_bytes(bytes);
        !limb::is_zero(&raw) && !limb::ge(&raw, &N)
    }

    /// `true` if this is the additive identity.
    pub fn is_zero(self) -> bool {
        limb::is_zero(&self.0)
    }

    /// `a + b mod n`.
    pub fn add(self, other: Scalar) -> Scalar {
        let (sum, carry) = limb::add_raw(&self.0, &other.0);
        let wide = [sum[0], sum[1], sum[2], sum[3], carry, 0, 0, 0];
        Scalar(limb::reduce(wide, &N, &C))
    }

    /// `a + b mod n`, returning [`ScalarError::Zero`] if the result wraps to zero.
    ///
    /// This is the entry point BIP-32 child derivation uses: `IL + k_par mod n`
    /// must be checked for a zero result before the child key is accepted.
    pub fn add_checked(self, other: Scalar) -> Result<Scalar, ScalarError> {
        let result = self.add(other);
        if result.is_zero() {
            Err(ScalarError::Zero)
        } else {
            Ok(result)
        }
    }

    /// `a - b mod n`.
    pub fn sub(self, other: Scalar) -> Scalar {
        let (diff, borrow) = limb::sub_raw(&self.0, &other.0);
        if borrow == 0 {
            Scalar(diff)
        } else {
            let (wrapped, _carry) = limb::add_raw(&diff, &N);
            Scalar(wrapped)
        }
    }

    /// `-a mod n`.
    pub fn negate(self) -> Scalar {
        if self.is_zero() {
            self
        } else {
            let (d, _borrow) = limb::sub_raw(&N, &self.0);
            Scalar(d)
        }
    }

    /// `a * b mod n`.
    ///
    /// Not used by BIP-32 derivation (which is addition-only); provided for
    /// self-tests and callers outside the hot search path.
    pub fn mul(self, other: Scalar) -> Scalar {
        Scalar(limb::reduce(limb::mul_wide(&self.0, &other.0), &N, &C))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sc(hex_str: &str) -> Scalar {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(format!("{hex_str:0>64}"), &mut bytes).unwrap();
        Scalar::from_be_bytes(&bytes)
    }

    #[test]
    fn add_wraps_at_n() {
        let n_minus_1 = sc("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364140");
        let two = sc("2");
        assert_eq!(n_minus_1.add(two), sc("1"));
    }

    #[test]
    fn add_checked_rejects_zero() {
        let n_minus_1 = sc("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364140");
        let one = sc("1");
        assert!(matches!(n_minus_1.add_checked(one), Err(ScalarError::Zero)));
    }

    #[test]
    fn sub_underflows_to_n() {
        let n_minus_1 = sc("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364140");
        assert_eq!(Scalar::ZERO.sub(sc("1")), n_minus_1);
    }

    #[test]
    fn negate_is_involution() {
        let a = sc("1234567890ABCDEF");
        assert_eq!(a.negate().negate(), a);
    }

    #[test]
    fn from_be_bytes_reduces_n_to_zero() {
        let n_bytes = {
            let mut bytes = [0u8; 32];
            hex::decode_to_slice(
                "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141",
                &mut bytes,
            )
            .unwrap();
            bytes
        };
        assert_eq!(Scalar::from_be_bytes(&n_bytes), Scalar::ZERO);
    }

    #[test]
    fn private_key_validity() {
        assert!(!Scalar::is_valid_private_key(&[0u8; 32]));
        let mut one = [0u8; 32];
        one[31] = 1;
        assert!(Scalar::is_valid_private_key(&one));
    }
}
