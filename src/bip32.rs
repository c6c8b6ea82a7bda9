//! BIP-32 hierarchical deterministic key derivation, fixed to the Ergo
//! wallet path `m/44'/429'/0'/0/<address_index>` (SLIP-44 coin type 429).
//!
//! Only the private-key derivation side is implemented — this pipeline
//! never needs to derive child keys from an extended public key.

#![forbid(unsafe_code)]

use crate::curve::{CurveError, JacobianPoint};
use crate::mac::{HmacSha512, MacError};
use crate::scalar::{Scalar, ScalarError};

/// Set on a child index to request hardened derivation (BIP-32 `'` suffix).
pub const HARDENED_OFFSET: u32 = 0x8000_0000;
/// Ergo's SLIP-44 coin type.
pub const ERGO_COIN_TYPE: u32 = 429;

/// Errors from key derivation.
#[derive(Debug, thiserror::Error)]
pub enum Bip32Error {
    /// Propagated from the underlying HMAC.
    #[error(transparent)]
    Mac(#[from] MacError),
    /// Propagated from scalar addition (zero child key).
    #[error(transparent)]
    Scalar(#[from] ScalarError),
    /// Propagated from curve arithmetic.
    #[error(transparent)]
    Curve(#[from] CurveError),
    /// `I_L` from the HMAC output was `>= n` or the master key was `0`;
    /// per BIP-32 the caller must discard this index and try the next one.
    #[error("derived key material was invalid (I_L out of range or key was zero)")]
    InvalidKey,
}

/// An extended private key: a 32-byte private key plus its 32-byte chain code.
#[derive(Copy, Clone)]
pub struct ExtendedKey {
    /// The 32-byte private key scalar.
    pub private_key: [u8; 32],
    /// The 32-byte chain code used to derive this node's children.
    pub chain_code: [u8; 32],
}

impl ExtendedKey {
    /// Derive the BIP-32 master key from a 64-byte BIP-39 seed:
    /// `I = HMAC-SHA512(key = "Bitcoin seed", data = seed)`,
    /// `I_L` is the master private key, `I_R` is the master chain code.
    pub fn master(seed: &[u8; 64]) -> Result<ExtendedKey, Bip32Error> {
        let hmac = HmacSha512::new(b"Bitcoin seed")?;
        let i = hmac.compute(seed);
        let il: [u8; 32] = i[..32].try_into().unwrap();
        let ir: [u8; 32] = i[32..].try_into().unwrap();
        if !Scalar::is_valid_private_key(&il) {
            return Err(Bip32Error::InvalidKey);
        }
        Ok(ExtendedKey {
            private_key: il,
            chain_code: ir,
        })
    }

    /// Derive child `index` (hardened if `index >= HARDENED_OFFSET`).
    pub fn derive_child(&self, index: u32) -> Result<ExtendedKey, Bip32Error> {
        let hardened = index >= HARDENED_OFFSET;
        let mut data = [0u8; 37];
        if hardened {
            data[0] = 0x00;
            data[1..33].copy_from_slice(&self.private_key);
        } else {
            let point = JacobianPoint::scalar_mul(&self.private_key)?;
            let compressed = point.to_compressed().ok_or(Bip32Error::InvalidKey)?;
            data[..33].copy_from_slice(&compressed);
        }
        data[33..].copy_from_slice(&index.to_be_bytes());

        let hmac = HmacSha512::new(&self.chain_code)?;
        let i = hmac.compute(&data);
        let il: [u8; 32] = i[..32].try_into().unwrap();
        let ir: [u8; 32] = i[32..].try_into().unwrap();

        if !Scalar::is_valid_private_key(&il) {
            return Err(Bip32Error::InvalidKey);
        }
        let il_scalar = Scalar::from_be_bytes(&il);
        let parent_scalar = Scalar::from_be_bytes(&self.private_key);
        let child_scalar = il_scalar.add_checked(parent_scalar)?;

        Ok(ExtendedKey {
            private_key: child_scalar.to_be_bytes(),
            chain_code: ir,
        })
    }
}

/// Derive the `m/44'/429'/0'/0` node ("Ergo, account 0, external chain")
/// shared by every address index in a search.
pub fn derive_ergo_account_node(seed: &[u8; 64]) -> Result<ExtendedKey, Bip32Error> {
    let master = ExtendedKey::master(seed)?;
    let purpose = master.derive_child(44 | HARDENED_OFFSET)?;
    let coin = purpose.derive_child(ERGO_COIN_TYPE | HARDENED_OFFSET)?;
    let account = coin.derive_child(HARDENED_OFFSET)?;
    account.derive_child(0)
}

/// Derive the private key at `m/44'/429'/0'/0/<address_index>`.
pub fn derive_ergo_address_key(
    seed: &[u8; 64],
    address_index: u32,
) -> Result<[u8; 32], Bip32Error> {
    let change = derive_ergo_account_node(seed)?;
    let leaf = change.derive_child(address_index)?;
    Ok(leaf.private_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_from_bytes(fill: u8) -> [u8; 64] {
        [fill; 64]
    }

    #[test]
    fn master_derivation_is_deterministic() {
        let seed = seed_from_bytes(0x42);
        let a = ExtendedKey::master(&seed).unwrap();
        let b = ExtendedKey::master(&seed).unwrap();
        assert_eq!(a.private_key, b.private_key);
        assert_eq!(a.chain_code, b.chain_code);
    }

    #[test]
    fn different_seeds_give_different_master_keys() {
        let a = ExtendedKey::master(&seed_from_bytes(0x01)).unwrap();
        let b = ExtendedKey::master(&seed_from_bytes(0x02)).unwrap();
        assert_ne!(a.private_key, b.private_key);
    }

    #[test]
    fn hardened_and_normal_children_differ() {
        let master = ExtendedKey::master(&seed_from_bytes(0x55)).unwrap();
        let hardened = master.derive_child(0 | HARDENED_OFFSET).unwrap();
        let normal = master.derive_child(0).unwrap();
        assert_ne!(hardened.private_key, normal.private_key);
    }

    #[test]
    fn successive_address_indices_give_different_keys() {
        let seed = seed_from_bytes(0x77);
        let change = derive_ergo_account_node(&seed).unwrap();
        let k0 = change.derive_child(0).unwrap();
        let k1 = change.derive_child(1).unwrap();
        assert_ne!(k0.private_key, k1.private_key);
        assert_ne!(k0.chain_code, k1.chain_code);
    }

    #[test]
    fn address_key_derivation_is_deterministic() {
        let seed = seed_from_bytes(0x99);
        let a = derive_ergo_address_key(&seed, 3).unwrap();
        let b = derive_ergo_address_key(&seed, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn derived_private_keys_are_valid_scalars() {
        let seed = seed_from_bytes(0xAA);
        for i in 0..8u32 {
            let key = derive_ergo_address_key(&seed, i).unwrap();
            assert!(Scalar::is_valid_private_key(&key));
        }
    }
}
