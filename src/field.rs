//! The secp256k1 base field `F_p`, `p = 2^256 - 2^32 - 977`.
//!
//! Arithmetic is built on the generic 4x64-limb machinery in
//! [`crate::limb`]; this module only supplies the modulus and the folding
//! constant `c = 2^256 mod p = 2^32 + 977`.

#![forbid(unsafe_code)]

use crate::limb::{self, Raw};

/// `p = 0xFFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFE FFFFFC2F`
const P: Raw = [
    0xFFFF_FFFE_FFFF_FC2F,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
];

/// `2^256 mod p = 2^32 + 977`
const C: Raw = [0x0000_0001_0000_03D1, 0, 0, 0];

/// `p - 2`, the Fermat exponent used by [`FieldElement::invert`].
const P_MINUS_2: Raw = [
    0xFFFF_FFFE_FFFF_FC2D,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
];

/// Errors surfaced by the checked field entry points.
///
/// With 64-bit limbs and `u128` column accumulators a single multiplication
/// can never overflow the 512-bit product buffer, so [`FieldError::Overflow`]
/// is unreachable in practice; the variant exists only so this module's
/// public surface matches the checked/unchecked pairing used throughout the
/// rest of the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    /// A multiplication step produced a result wider than the reduction
    /// buffer can represent.
    #[error("field element multiplication overflowed the reduction buffer")]
    Overflow,
}

/// An element of `F_p`, always held in canonical form (`< p`).
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct FieldElement(Raw);

impl core::fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "FieldElement({})", hex::encode(self.to_be_bytes()))
    }
}

impl FieldElement {
    /// The additive identity.
    pub const ZERO: FieldElement = FieldElement([0, 0, 0, 0]);
    /// The multiplicative identity.
    pub const ONE: FieldElement = FieldElement([1, 0, 0, 0]);

    /// Parse 32 big-endian bytes, reducing modulo `p` if the value is out of range.
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        let raw = limb::from_be_bytes(bytes);
        FieldElement(limb::canonicalize(raw, &P))
    }

    /// Serialize to 32 big-endian bytes.
    pub fn to_be_bytes(self) -> [u8; 32] {
        limb::to_be_bytes(&self.0)
    }

    /// `true` if this element is the additive identity.
    pub fn is_zero(self) -> bool {
        limb::is_zero(&self.0)
    }

    /// `a + b mod p`.
    pub fn add(self, other: FieldElement) -> FieldElement {
        let (sum, carry) = limb::add_raw(&self.0, &other.0);
        let wide = [sum[0], sum[1], sum[2], sum[3], carry, 0, 0, 0];
        FieldElement(limb::reduce(wide, &P, &C))
    }

    /// `a - b mod p`.
    pub fn sub(self, other: FieldElement) -> FieldElement {
        let (diff, borrow) = limb::sub_raw(&self.0, &other.0);
        if borrow == 0 {
            FieldElement(diff)
        } else {
            let (wrapped, _carry) = limb::add_raw(&diff, &P);
            FieldElement(wrapped)
        }
    }

    /// `-a mod p`.
    pub fn negate(self) -> FieldElement {
        if self.is_zero() {
            self
        } else {
            let (d, _borrow) = limb::sub_raw(&P, &self.0);
            FieldElement(d)
        }
    }

    /// `a * b mod p`.
    pub fn mul(self, other: FieldElement) -> FieldElement {
        FieldElement(limb::reduce(limb::mul_wide(&self.0, &other.0), &P, &C))
    }

    /// `a * b mod p`, never returning `Err` (see [`FieldError::Overflow`]).
    pub fn mul_checked(self, other: FieldElement) -> Result<FieldElement, FieldError> {
        Ok(self.mul(other))
    }

    /// `a^2 mod p`.
    pub fn square(self) -> FieldElement {
        self.mul(self)
    }

    /// `a^-1 mod p` via Fermat's little theorem (`a^(p-2)`); `0` maps to `0`.
    pub fn invert(self) -> FieldElement {
        if self.is_zero() {
            return FieldElement::ZERO;
        }
        let mut result = FieldElement::ONE;
        for limb_idx in (0..4).rev() {
            let word = P_MINUS_2[limb_idx];
            for bit in (0..64).rev() {
                result = result.square();
                if (word >> bit) & 1 == 1 {
                    result = result.mul(self);
                }
            }
        }
        result
    }

    /// `true` if the canonical representation's least significant bit is `1`.
    pub fn is_odd(self) -> bool {
        self.0[0] & 1 == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fe(hex_str: &str) -> FieldElement {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(format!("{hex_str:0>64}"), &mut bytes).unwrap();
        FieldElement::from_be_bytes(&bytes)
    }

    #[test]
    fn zero_and_one_roundtrip() {
        assert_eq!(FieldElement::ZERO.to_be_bytes(), [0u8; 32]);
        let mut one = [0u8; 32];
        one[31] = 1;
        assert_eq!(FieldElement::ONE.to_be_bytes(), one);
    }

    #[test]
    fn add_wraps_at_p() {
        // p - 1 + 2 = 1 (mod p)
        let p_minus_1 = fe("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2E");
        let two = fe("2");
        assert_eq!(p_minus_1.add(two), FieldElement::ONE);
    }

    #[test]
    fn sub_underflows_to_p() {
        let zero = FieldElement::ZERO;
        let one = FieldElement::ONE;
        let p_minus_1 = fe("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2E");
        assert_eq!(zero.sub(one), p_minus_1);
    }

    #[test]
    fn negate_is_involution() {
        let a = fe("1234567890ABCDEF");
        assert_eq!(a.negate().negate(), a);
        assert_eq!(a.add(a.negate()), FieldElement::ZERO);
    }

    #[test]
    fn mul_identity() {
        let a = fe("DEADBEEFCAFEF00D");
        assert_eq!(a.mul(FieldElement::ONE), a);
        assert_eq!(a.mul(FieldElement::ZERO), FieldElement::ZERO);
    }

    #[test]
    fn square_matches_self_mul() {
        let a = fe("2");
        assert_eq!(a.square(), fe("4"));
    }

    #[test]
    fn invert_roundtrips() {
        let a = fe("2");
        let inv = a.invert();
        assert_eq!(a.mul(inv), FieldElement::ONE);
        assert_eq!(FieldElement::ZERO.invert(), FieldElement::ZERO);
    }

    #[test]
    fn from_be_bytes_reduces_out_of_range_input() {
        // p itself must canonicalize to 0.
        let p_bytes = limb::to_be_bytes(&P);
        assert_eq!(FieldElement::from_be_bytes(&p_bytes), FieldElement::ZERO);
    }
}
