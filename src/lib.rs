//! Crate root: public surface for deterministic Ergo P2PK vanity address
//! search.
//!
//! This module is the **single canonical entry-point** for downstream users
//! of the library. It re-exports the search pipeline's modules, from the
//! lowest-level fixed-width arithmetic primitives up through the host
//! controller that schedules batches across worker threads.
//!
//! ## Invariants
//!
//! - **No passphrases, no alternative derivation paths, no alternative
//!   address types.** This crate is fixed to 256-bit-entropy BIP-39, the
//!   `m/44'/429'/0'/0/<address_index>` derivation path, and Ergo mainnet
//!   P2PK addresses. See the module docs on [`mnemonic`] and [`bip32`].
//! - **No heap allocation on the per-candidate hot path.** [`kernel`]'s
//!   [`kernel::search_work_item`] and everything it calls (entropy, mnemonic
//!   words, seed, key derivation, curve arithmetic, the grouped prefix
//!   matcher) work entirely on fixed-size stack buffers. Only the host
//!   controller and the full [`address::base58_encode`] path — both off the
//!   hot path — allocate.
//! - **Unsafe-free.** Every module in this crate forbids `unsafe`.
//! - **Precise errors, never silent zeros.** Precondition violations on
//!   narrow device-style primitives (oversized HMAC keys, malformed
//!   patterns, invalid search configuration) surface as typed `Err` values.
//!   Only astronomically rare in-pipeline derivation rejections (invalid
//!   `I_L`, a zero child key, a point at infinity) are silently skipped in
//!   place, exactly as BIP-32 itself specifies.

#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms)]

/// Fixed-width 256-bit unsigned integer limb arithmetic shared by [`field`]
/// and [`scalar`].
pub(crate) mod limb;
/// The secp256k1 base field.
pub mod field;
/// The secp256k1 scalar field (private key / BIP-32 tweak arithmetic).
pub mod scalar;
/// Hand-rolled SHA-256, SHA-512, and Blake2b-256, as used by the BIP-39 and
/// address-checksum paths.
pub mod hash;
/// HMAC-SHA512 and single-block PBKDF2-HMAC-SHA512.
pub mod mac;
/// secp256k1 point arithmetic in Jacobian coordinates.
pub mod curve;
/// The BIP-39 English wordlist and its binary-search lookup.
pub mod wordlist;
/// BIP-39 entropy/mnemonic/seed conversions, fixed to 256-bit entropy.
pub mod mnemonic;
/// BIP-32 hierarchical key derivation, fixed to the Ergo wallet path.
pub mod bip32;
/// Base58 encoding and Ergo P2PK address construction.
pub mod address;
/// Vanity prefix patterns: parsing, validation, and the fast grouped-limb
/// matcher.
pub mod pattern;
/// Grouped base58⁴-limb prefix matching, used by [`kernel`] on the hot path.
pub mod matcher;
/// The per-work-item search pipeline and its fixed-layout hit record.
pub mod kernel;
/// Host-side batch scheduling, hit re-verification, and termination.
pub mod controller;

/// Build the full Base58-encoded Ergo mainnet P2PK address for a compressed
/// public key. Re-exported from [`address`] for convenience.
pub use crate::address::ergo_p2pk_address;
/// Errors from address construction. Re-exported from [`address`].
pub use crate::address::AddressError;
/// Drives one search. Re-exported from [`controller`].
pub use crate::controller::Controller;
/// Errors from validating a search configuration. Re-exported from
/// [`controller`].
pub use crate::controller::ConfigError;
/// A verified vanity match. Re-exported from [`controller`].
pub use crate::controller::Match;
/// A validated search configuration. Re-exported from [`controller`].
pub use crate::controller::SearchConfig;
/// Builder for [`SearchConfig`]. Re-exported from [`controller`].
pub use crate::controller::SearchConfigBuilder;
/// The result of a completed or stopped search. Re-exported from
/// [`controller`].
pub use crate::controller::SearchOutcome;
/// Why a search stopped. Re-exported from [`controller`].
pub use crate::controller::StopReason;
/// A single validated prefix pattern. Re-exported from [`pattern`].
pub use crate::pattern::Pattern;
/// Errors from validating a prefix pattern. Re-exported from [`pattern`].
pub use crate::pattern::PatternError;
/// A validated set of prefix patterns. Re-exported from [`pattern`].
pub use crate::pattern::PatternSet;
