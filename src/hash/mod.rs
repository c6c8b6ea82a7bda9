//! From-scratch hash primitives used by the key-derivation pipeline.
//!
//! Every function here operates on fixed-size stack buffers and performs no
//! heap allocation. Each is scoped to exactly the input sizes the pipeline
//! needs (documented per-function); callers outside those bounds get a typed
//! error rather than silent truncation.

/// Blake2b-256, used for the Ergo address checksum and work-item entropy.
pub mod blake2b;
/// SHA-256, used for the BIP-39 mnemonic checksum byte.
pub mod sha256;
/// SHA-512, used by HMAC-SHA512 and PBKDF2.
pub mod sha512;

/// Blake2b-256 over an arbitrary-length message. Re-exported from [`blake2b`].
pub use blake2b::blake2b_256;
/// SHA-256 over an arbitrary-length message. Re-exported from [`sha256`].
pub use sha256::sha256_short;
/// A resumable SHA-512 hasher. Re-exported from [`sha512`].
pub use sha512::Sha512;
