//! secp256k1 point arithmetic in Jacobian coordinates (`a = 0`, `b = 7`).
//!
//! Scalar multiplication is used exactly once per candidate key (the
//! derived private key times the base point), so this module favors a
//! simple, obviously-correct double-and-add over constant-time or
//! windowed variants; side-channel resistance is explicitly out of scope
//! (searching for a vanity prefix is not a secret-dependent operation
//! worth protecting against timing attacks).

#![forbid(unsafe_code)]

use crate::field::FieldElement as Fe;

/// `Gx`, the x-coordinate of the secp256k1 base point.
const GX: [u8; 32] = [
    0x79, 0xBE, 0x66, 0x7E, 0xF9, 0xDC, 0xBB, 0xAC, 0x55, 0xA0, 0x62, 0x95, 0xCE, 0x87, 0x0B, 0x07,
    0x02, 0x9B, 0xFC, 0xDB, 0x2D, 0xCE, 0x28, 0xD9, 0x59, 0xF2, 0x81, 0x5B, 0x16, 0xF8, 0x17, 0x98,
];

/// `Gy`, the y-coordinate of the secp256k1 base point.
const GY: [u8; 32] = [
    0x48, 0x3A, 0xDA, 0x77, 0x26, 0xA3, 0xC4, 0x65, 0x5D, 0xA4, 0xFB, 0xFC, 0x0E, 0x11, 0x08, 0xA8,
    0xFD, 0x17, 0xB4, 0x48, 0xA6, 0x85, 0x54, 0x19, 0x9C, 0x47, 0xD0, 0x8F, 0xFB, 0x10, 0xD4, 0xB8,
];

/// A secp256k1 point in Jacobian coordinates. `Z == 0` represents the point
/// at infinity, canonically stored as `(1, 1, 0)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct JacobianPoint {
    x: Fe,
    y: Fe,
    z: Fe,
}

/// Errors surfaced by curve operations.
#[derive(Debug, thiserror::Error)]
pub enum CurveError {
    /// Scalar multiplication was asked to multiply by the zero scalar.
    /// BIP-32 derivation must reject a zero child-key scalar before it
    /// ever reaches this module (see [`crate::scalar::Scalar::add_checked`]).
    #[error("scalar multiplication input was the zero scalar")]
    ZeroScalar,
}

impl JacobianPoint {
    /// The canonical point at infinity.
    pub fn infinity() -> JacobianPoint {
        JacobianPoint {
            x: Fe::ONE,
            y: Fe::ONE,
            z: Fe::ZERO,
        }
    }

    /// The secp256k1 base point `G`.
    pub fn generator() -> JacobianPoint {
        JacobianPoint {
            x: Fe::from_be_bytes(&GX),
            y: Fe::from_be_bytes(&GY),
            z: Fe::ONE,
        }
    }

    /// `true` if this is the point at infinity.
    pub fn is_infinity(&self) -> bool {
        self.z.is_zero()
    }

    /// Point doubling for `a = 0` curves:
    /// `S = 4XY², M = 3X², X₃ = M² − 2S, Y₃ = M(S − X₃) − 8Y⁴, Z₃ = 2YZ`.
    pub fn double(&self) -> JacobianPoint {
        let xx = self.x.square();
        let yy = self.y.square();
        let yyyy = yy.square();

        let xy2 = self.x.mul(yy);
        let two_xy2 = xy2.add(xy2);
        let s = two_xy2.add(two_xy2);

        let m = xx.add(xx).add(xx);

        let two_s = s.add(s);
        let x3 = m.square().sub(two_s);

        let two_yyyy = yyyy.add(yyyy);
        let four_yyyy = two_yyyy.add(two_yyyy);
        let eight_yyyy = four_yyyy.add(four_yyyy);
        let y3 = m.mul(s.sub(x3)).sub(eight_yyyy);

        let two_y = self.y.add(self.y);
        let z3 = two_y.mul(self.z);

        JacobianPoint { x: x3, y: y3, z: z3 }
    }

    /// General Jacobian point addition (add-2007-bl), with explicit
    /// handling of infinity operands, equal-point doubling, and
    /// point/negation cancellation.
    pub fn add(&self, other: &JacobianPoint) -> JacobianPoint {
        if self.is_infinity() {
            return *other;
        }
        if other.is_infinity() {
            return *self;
        }

        let z1z1 = self.z.square();
        let z2z2 = other.z.square();
        let u1 = self.x.mul(z2z2);
        let u2 = other.x.mul(z1z1);
        let z1_cubed = z1z1.mul(self.z);
        let z2_cubed = z2z2.mul(other.z);
        let s1 = self.y.mul(z2_cubed);
        let s2 = other.y.mul(z1_cubed);

        if u1 == u2 {
            return if s1 == s2 {
                self.double()
            } else {
                JacobianPoint::infinity()
            };
        }

        let h = u2.sub(u1);
        let r = s2.sub(s1);
        let h2 = h.square();
        let h3 = h2.mul(h);
        let u1h2 = u1.mul(h2);

        let x3 = r.square().sub(h3).sub(u1h2).sub(u1h2);
        let y3 = r.mul(u1h2.sub(x3)).sub(s1.mul(h3));
        let z3 = h.mul(self.z).mul(other.z);

        JacobianPoint { x: x3, y: y3, z: z3 }
    }

    /// `scalar * G`, via MSB-first double-and-add over the 256-bit scalar.
    ///
    /// The exact bit iteration order is an implementation detail that does
    /// not affect the resulting point; this crate scans from the most
    /// significant bit down, which is the conventional textbook order.
    pub fn scalar_mul(scalar: &[u8; 32]) -> Result<JacobianPoint, CurveError> {
        if scalar.iter().all(|&b| b == 0) {
            return Err(CurveError::ZeroScalar);
        }
        let base = JacobianPoint::generator();
        let mut acc = JacobianPoint::infinity();
        for byte in scalar.iter() {
            for bit in (0..8).rev() {
                acc = acc.double();
                if (byte >> bit) & 1 == 1 {
                    acc = acc.add(&base);
                }
            }
        }
        Ok(acc)
    }

    /// Convert to affine `(x, y)` coordinates, or `None` for infinity.
    pub fn to_affine(&self) -> Option<(Fe, Fe)> {
        if self.is_infinity() {
            return None;
        }
        let zinv = self.z.invert();
        let zinv2 = zinv.square();
        let zinv3 = zinv2.mul(zinv);
        Some((self.x.mul(zinv2), self.y.mul(zinv3)))
    }

    /// 33-byte SEC1 compressed public key encoding, or `None` for infinity.
    pub fn to_compressed(&self) -> Option<[u8; 33]> {
        let (x, y) = self.to_affine()?;
        let mut out = [0u8; 33];
        out[0] = if y.is_odd() { 0x03 } else { 0x02 };
        out[1..].copy_from_slice(&x.to_be_bytes());
        Some(out)
    }

    /// `true` if the affine coordinates satisfy `y² = x³ + 7`. Used only by
    /// tests and debug assertions.
    pub fn is_on_curve(&self) -> bool {
        match self.to_affine() {
            None => true,
            Some((x, y)) => {
                let mut seven_bytes = [0u8; 32];
                seven_bytes[31] = 7;
                let seven = Fe::from_be_bytes(&seven_bytes);
                let lhs = y.square();
                let rhs = x.square().mul(x).add(seven);
                lhs == rhs
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_is_on_curve() {
        assert!(JacobianPoint::generator().is_on_curve());
    }

    #[test]
    fn double_generator_is_on_curve() {
        let g2 = JacobianPoint::generator().double();
        assert!(g2.is_on_curve());
    }

    #[test]
    fn add_generator_to_itself_matches_double() {
        let g = JacobianPoint::generator();
        assert_eq!(g.add(&g), g.double());
    }

    #[test]
    fn add_infinity_is_identity() {
        let g = JacobianPoint::generator();
        let inf = JacobianPoint::infinity();
        assert_eq!(g.add(&inf), g);
        assert_eq!(inf.add(&g), g);
    }

    #[test]
    fn scalar_mul_one_is_generator() {
        let mut one = [0u8; 32];
        one[31] = 1;
        let p = JacobianPoint::scalar_mul(&one).unwrap();
        assert_eq!(p, JacobianPoint::generator());
    }

    #[test]
    fn scalar_mul_two_matches_double() {
        let mut two = [0u8; 32];
        two[31] = 2;
        let p = JacobianPoint::scalar_mul(&two).unwrap();
        assert_eq!(p, JacobianPoint::generator().double());
    }

    #[test]
    fn scalar_mul_rejects_zero() {
        let zero = [0u8; 32];
        assert!(matches!(
            JacobianPoint::scalar_mul(&zero),
            Err(CurveError::ZeroScalar)
        ));
    }

    #[test]
    fn known_keypair_compressed_pubkey() {
        // privkey = 1 -> pubkey is G itself, compressed form is well known.
        let mut one = [0u8; 32];
        one[31] = 1;
        let p = JacobianPoint::scalar_mul(&one).unwrap();
        let compressed = p.to_compressed().unwrap();
        assert_eq!(
            hex::encode(compressed),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
    }

    #[test]
    fn scalar_mul_is_additive() {
        // 3*G == G + G + G
        let mut three = [0u8; 32];
        three[31] = 3;
        let by_scalar = JacobianPoint::scalar_mul(&three).unwrap();
        let g = JacobianPoint::generator();
        let by_add = g.add(&g).add(&g);
        assert_eq!(by_scalar, by_add);
    }
}
