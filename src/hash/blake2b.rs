//! BLAKE2b-256, restricted to single-block (<= 128 byte) messages, per RFC 7693.
//!
//! The only caller is the Ergo address checksum (Base58Check-style, first 4
//! bytes of `BLAKE2b-256(version || hash-digest)`), whose input is always a
//! handful of bytes, so a single 128-byte compression block covers every
//! real input; unkeyed, 32-byte digest output only.

#![forbid(unsafe_code)]

/// The largest message length [`blake2b_256`] accepts: one 128-byte block.
pub const MAX_SHORT_LEN: usize = 128;

/// Errors from [`blake2b_256`].
#[derive(Debug, thiserror::Error)]
pub enum Blake2bError {
    /// The message did not fit in a single 128-byte block.
    #[error("blake2b_256 input of {0} bytes exceeds the {MAX_SHORT_LEN}-byte single-block limit")]
    TooLong(usize),
}

const IV: [u64; 8] = [
    0x6a09e667f3bcc908, 0xbb67ae8584caa73b, 0x3c6ef372fe94f82b, 0xa54ff53a5f1d36f1,
    0x510e527fade682d1, 0x9b05688c2b3e6c1f, 0x1f83d9abfb41bd6b, 0x5be0cd19137e2179,
];

const SIGMA: [[usize; 16]; 10] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
    [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
    [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
    [9, 0, 5, 7, 2, 4, 10, 15, 14, 1, 11, 12, 6, 8, 3, 13],
    [2, 12, 6, 10, 0, 11, 8, 3, 4, 13, 7, 5, 15, 14, 1, 9],
    [12, 5, 1, 15, 14, 13, 4, 10, 0, 7, 6, 3, 9, 2, 8, 11],
    [13, 11, 7, 14, 12, 1, 3, 9, 5, 0, 15, 4, 8, 6, 2, 10],
    [6, 15, 14, 9, 11, 3, 0, 8, 12, 2, 13, 7, 1, 4, 10, 5],
    [10, 2, 8, 4, 7, 6, 1, 5, 15, 11, 9, 14, 3, 12, 13, 0],
];

#[inline]
fn g(v: &mut [u64; 16], a: usize, b: usize, c: usize, d: usize, x: u64, y: u64) {
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(x);
    v[d] = (v[d] ^ v[a]).rotate_right(32);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(24);
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(y);
    v[d] = (v[d] ^ v[a]).rotate_right(16);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(63);
}

fn compress(h: &mut [u64; 8], m: &[u64; 16], t: u64, final_block: bool) {
    let mut v = [0u64; 16];
    v[..8].copy_from_slice(h);
    v[8..].copy_from_slice(&IV);
    v[12] ^= t;
    // the message never exceeds 128 bytes, so the counter's high word is
    // always zero and v[13] is left untouched.
    if final_block {
        v[14] = !v[14];
    }
    for round in 0..12 {
        let s = &SIGMA[round % 10];
        g(&mut v, 0, 4, 8, 12, m[s[0]], m[s[1]]);
        g(&mut v, 1, 5, 9, 13, m[s[2]], m[s[3]]);
        g(&mut v, 2, 6, 10, 14, m[s[4]], m[s[5]]);
        g(&mut v, 3, 7, 11, 15, m[s[6]], m[s[7]]);
        g(&mut v, 0, 5, 10, 15, m[s[8]], m[s[9]]);
        g(&mut v, 1, 6, 11, 12, m[s[10]], m[s[11]]);
        g(&mut v, 2, 7, 8, 13, m[s[12]], m[s[13]]);
        g(&mut v, 3, 4, 9, 14, m[s[14]], m[s[15]]);
    }
    for i in 0..8 {
        h[i] ^= v[i] ^ v[i + 8];
    }
}

/// BLAKE2b-256 (32-byte digest, unkeyed) of a message no longer than
/// [`MAX_SHORT_LEN`] bytes.
pub fn blake2b_256(message: &[u8]) -> Result<[u8; 32], Blake2bError> {
    if message.len() > MAX_SHORT_LEN {
        return Err(Blake2bError::TooLong(message.len()));
    }
    let mut h = IV;
    h[0] ^= 0x0101_0000 ^ 32; // fanout=1, depth=1, no key, 32-byte digest

    let mut block = [0u8; MAX_SHORT_LEN];
    block[..message.len()].copy_from_slice(message);
    let mut m = [0u64; 16];
    for i in 0..16 {
        m[i] = u64::from_le_bytes(block[i * 8..i * 8 + 8].try_into().unwrap());
    }
    compress(&mut h, &m, message.len() as u64, true);

    let mut out = [0u8; 32];
    for i in 0..4 {
        out[i * 8..i * 8 + 8].copy_from_slice(&h[i].to_le_bytes());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_message() {
        let digest = blake2b_256(b"").unwrap();
        assert_eq!(
            hex::encode(digest),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );
    }

    #[test]
    fn abc() {
        let digest = blake2b_256(b"abc").unwrap();
        assert_eq!(
            hex::encode(digest),
            "bddd813c634239723171ef3fee98579b94964e3bb1cb3e427262c8c068d52319"
        );
    }

    #[test]
    fn rejects_overlong_input() {
        let message = [0u8; MAX_SHORT_LEN + 1];
        assert!(matches!(
            blake2b_256(&message),
            Err(Blake2bError::TooLong(129))
        ));
    }

    #[test]
    fn accepts_boundary_length() {
        let message = [0u8; MAX_SHORT_LEN];
        assert!(blake2b_256(&message).is_ok());
    }
}
