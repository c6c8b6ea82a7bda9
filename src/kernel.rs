//! Per-work-item search pipeline: entropy → mnemonic → seed → BIP-32 →
//! pubkey → address → prefix match, plus the fixed-layout hit record a
//! matching work item emits.
//!
//! A work item never allocates and never communicates with any other work
//! item except through the shared hit buffer passed in by the caller.

#![forbid(unsafe_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::address::build_payload;
use crate::bip32::derive_ergo_account_node;
use crate::curve::JacobianPoint;
use crate::hash::blake2b::blake2b_256;
use crate::matcher::matches_fast;
use crate::mnemonic::{entropy_to_mnemonic, mnemonic_to_seed, ENTROPY_LEN};
use crate::pattern::PatternSet;

/// Per-batch capacity of the shared hit buffer.
pub const MAX_HITS: usize = 1024;

/// A matched address, exactly as a work item emits it: 64 bytes, 16-byte
/// aligned.
#[repr(C, align(16))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HitRecord {
    /// The work item's 32-byte entropy, as eight little-endian words.
    pub entropy_words: [u32; 8],
    /// The work item's global id within its batch.
    pub work_item_id: u32,
    /// Which address index (0..num_indices) matched.
    pub address_index: u32,
    /// Which pattern in the set matched.
    pub pattern_index: u32,
    reserved: [u32; 5],
}

impl HitRecord {
    fn new(
        entropy: &[u8; ENTROPY_LEN],
        work_item_id: u32,
        address_index: u32,
        pattern_index: u32,
    ) -> HitRecord {
        let mut entropy_words = [0u32; 8];
        for (i, word) in entropy_words.iter_mut().enumerate() {
            *word = u32::from_le_bytes(entropy[i * 4..i * 4 + 4].try_into().unwrap());
        }
        HitRecord {
            entropy_words,
            work_item_id,
            address_index,
            pattern_index,
            reserved: [0; 5],
        }
    }

    /// Reconstruct the 32-byte entropy this hit was derived from.
    pub fn entropy(&self) -> [u8; ENTROPY_LEN] {
        let mut out = [0u8; ENTROPY_LEN];
        for (i, word) in self.entropy_words.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&word.to_le_bytes());
        }
        out
    }
}

/// Derive a work item's 32-byte entropy: `Blake2b-256(salt || LE64(counter)
/// || LE32(gid))`, where `counter = counter_start + gid`.
fn work_item_entropy(salt: &[u8; 32], counter_start: u64, gid: u32) -> [u8; ENTROPY_LEN] {
    let counter = counter_start.wrapping_add(gid as u64);
    let mut message = [0u8; 44];
    message[..32].copy_from_slice(salt);
    message[32..40].copy_from_slice(&counter.to_le_bytes());
    message[40..44].copy_from_slice(&gid.to_le_bytes());
    blake2b_256(&message).expect("a 44-byte message always fits a single Blake2b block")
}

/// Claim the next slot in the shared hit buffer and record `hit`. Slots
/// beyond `hits.len()` are claimed (so the caller can detect overflow from
/// `hit_count`) but not written.
fn emit_hit(hit_count: &AtomicU32, hits: &[Mutex<Option<HitRecord>>], hit: HitRecord) {
    let idx = hit_count.fetch_add(1, Ordering::SeqCst) as usize;
    if idx < hits.len() {
        let mut slot = hits[idx].lock().expect("hit slot mutex poisoned");
        *slot = Some(hit);
    }
}

/// Run the full pipeline for one `(gid, counter_start)` pair: derive
/// entropy, mnemonic, seed, and the shared Ergo external chain node, then
/// walk `0..num_indices` address indices looking for the first pattern
/// match. Emits at most one hit, with deterministic `(address_index,
/// pattern_index)` priority — the lowest address index wins, and within
/// that index, the earliest matching pattern in the set wins.
///
/// Derivation rejections (an invalid `IL`, a zero child key, a point at
/// infinity) are astronomically rare and are skipped in place rather than
/// surfaced as errors — the work item simply moves on to the next index.
pub fn search_work_item(
    salt: &[u8; 32],
    counter_start: u64,
    gid: u32,
    patterns: &PatternSet,
    num_indices: u32,
    hit_count: &AtomicU32,
    hits: &[Mutex<Option<HitRecord>>],
) {
    let entropy = work_item_entropy(salt, counter_start, gid);
    let words = entropy_to_mnemonic(&entropy);
    let seed = match mnemonic_to_seed(&words) {
        Ok(seed) => seed,
        Err(_) => return,
    };
    let external_chain = match derive_ergo_account_node(&seed) {
        Ok(node) => node,
        Err(_) => return,
    };

    for j in 0..num_indices {
        let child = match external_chain.derive_child(j) {
            Ok(child) => child,
            Err(_) => continue,
        };
        let point = match JacobianPoint::scalar_mul(&child.private_key) {
            Ok(point) => point,
            Err(_) => continue,
        };
        let pubkey = match point.to_compressed() {
            Some(pubkey) => pubkey,
            None => continue,
        };
        let payload = match build_payload(&pubkey) {
            Ok(payload) => payload,
            Err(_) => continue,
        };

        for (p, pattern) in patterns.patterns().iter().enumerate() {
            if matches_fast(&payload, pattern.as_bytes(), patterns.is_case_insensitive()) {
                let hit = HitRecord::new(&entropy, gid, j, p as u32);
                emit_hit(hit_count, hits, hit);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit_buffer(n: usize) -> Vec<Mutex<Option<HitRecord>>> {
        (0..n).map(|_| Mutex::new(None)).collect()
    }

    #[test]
    fn unmatchable_pattern_never_emits_a_hit() {
        let salt = [0x11u8; 32];
        let patterns = PatternSet::new(&["9zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz"], false).unwrap();
        let hit_count = AtomicU32::new(0);
        let hits = hit_buffer(4);

        for gid in 0..8u32 {
            search_work_item(&salt, 0, gid, &patterns, 2, &hit_count, &hits);
        }
        assert_eq!(hit_count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn every_work_item_matches_the_empty_length_pattern() {
        // A single "9" pattern matches any valid P2PK address's first
        // character, so every work item should hit on address index 0.
        let salt = [0x22u8; 32];
        let patterns = PatternSet::new(&["9"], false).unwrap();
        let hit_count = AtomicU32::new(0);
        let hits = hit_buffer(16);

        for gid in 0..8u32 {
            search_work_item(&salt, 0, gid, &patterns, 1, &hit_count, &hits);
        }
        assert_eq!(hit_count.load(Ordering::SeqCst), 8);
        for slot in &hits[..8] {
            let hit = slot.lock().unwrap();
            assert!(hit.is_some());
            assert_eq!(hit.unwrap().address_index, 0);
            assert_eq!(hit.unwrap().pattern_index, 0);
        }
    }

    #[test]
    fn hit_entropy_roundtrips_through_the_record() {
        let salt = [0x33u8; 32];
        let patterns = PatternSet::new(&["9"], false).unwrap();
        let hit_count = AtomicU32::new(0);
        let hits = hit_buffer(4);

        search_work_item(&salt, 7, 2, &patterns, 1, &hit_count, &hits);
        assert_eq!(hit_count.load(Ordering::SeqCst), 1);
        let hit = hits[0].lock().unwrap().unwrap();
        assert_eq!(hit.entropy(), work_item_entropy(&salt, 7, 2));
        assert_eq!(hit.work_item_id, 2);
    }

    #[test]
    fn distinct_work_items_derive_distinct_entropy() {
        let salt = [0x44u8; 32];
        let a = work_item_entropy(&salt, 0, 0);
        let b = work_item_entropy(&salt, 0, 1);
        let c = work_item_entropy(&salt, 1, 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn hit_record_is_64_bytes() {
        assert_eq!(std::mem::size_of::<HitRecord>(), 64);
        assert_eq!(std::mem::align_of::<HitRecord>(), 16);
    }
}
