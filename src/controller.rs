//! Host controller: search configuration, batch scheduling across worker
//! threads, the counter sweep, hit re-verification, and termination.
//!
//! Everything here is ordinary host-side Rust — threads, logging,
//! allocation — unlike the allocation-free device code in [`crate::kernel`]
//! and below it.

#![forbid(unsafe_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{info, warn};

use crate::address::{build_payload, ergo_p2pk_address};
use crate::bip32::derive_ergo_account_node;
use crate::curve::JacobianPoint;
use crate::kernel::{search_work_item, HitRecord, MAX_HITS};
use crate::matcher::matches_fast;
use crate::mnemonic::{entropy_to_mnemonic, mnemonic_phrase, mnemonic_to_seed};
use crate::pattern::{PatternError, PatternSet};

/// Per-worker work items launched per batch round, absent an explicit
/// override: 2¹⁸.
pub const DEFAULT_BATCH_SIZE: u32 = 1 << 18;

/// Errors from validating a [`SearchConfigBuilder`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `num_indices` was outside the allowed `1..100` range.
    #[error("num_indices must be in 1..100, got {0}")]
    NumIndicesOutOfRange(u32),
    /// `max_results` was zero.
    #[error("max_results must be at least 1")]
    MaxResultsZero,
    /// `workers` was zero.
    #[error("worker count must be at least 1")]
    NoWorkers,
    /// Propagated from pattern-set validation.
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// A validated, immutable search configuration.
#[derive(Debug)]
pub struct SearchConfig {
    patterns: PatternSet,
    num_indices: u32,
    batch_size: u32,
    workers: usize,
    max_results: usize,
    deadline: Option<Duration>,
}

/// Ergonomic constructor for [`SearchConfig`].
pub struct SearchConfigBuilder {
    patterns: Vec<String>,
    case_insensitive: bool,
    num_indices: u32,
    batch_size: u32,
    workers: usize,
    max_results: usize,
    deadline: Option<Duration>,
}

impl SearchConfigBuilder {
    /// Start a builder with the defaults: no patterns, case-sensitive,
    /// `num_indices = 1`, [`DEFAULT_BATCH_SIZE`], one worker,
    /// `max_results = 1`, no deadline.
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
            case_insensitive: false,
            num_indices: 1,
            batch_size: DEFAULT_BATCH_SIZE,
            workers: 1,
            max_results: 1,
            deadline: None,
        }
    }

    /// Add one prefix pattern.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Add several prefix patterns at once.
    pub fn patterns(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Match letters regardless of Base58 case (see [`crate::pattern`]).
    pub fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    /// How many address indices (`0..num_indices`) to try per candidate seed.
    pub fn num_indices(mut self, n: u32) -> Self {
        self.num_indices = n;
        self
    }

    /// Work items launched per worker per batch round.
    pub fn batch_size(mut self, n: u32) -> Self {
        self.batch_size = n.max(1);
        self
    }

    /// Worker threads to run concurrently.
    pub fn workers(mut self, n: usize) -> Self {
        self.workers = n;
        self
    }

    /// Stop after this many verified matches.
    pub fn max_results(mut self, n: usize) -> Self {
        self.max_results = n;
        self
    }

    /// Stop after this much wall-clock time, regardless of match count.
    pub fn deadline(mut self, d: Duration) -> Self {
        self.deadline = Some(d);
        self
    }

    /// Validate the accumulated settings into a [`SearchConfig`].
    pub fn build(self) -> Result<SearchConfig, ConfigError> {
        if !(1..100).contains(&self.num_indices) {
            return Err(ConfigError::NumIndicesOutOfRange(self.num_indices));
        }
        if self.max_results == 0 {
            return Err(ConfigError::MaxResultsZero);
        }
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        let raw: Vec<&str> = self.patterns.iter().map(String::as_str).collect();
        let patterns = PatternSet::new(&raw, self.case_insensitive)?;

        Ok(SearchConfig {
            patterns,
            num_indices: self.num_indices,
            batch_size: self.batch_size,
            workers: self.workers,
            max_results: self.max_results,
            deadline: self.deadline,
        })
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A verified vanity match, host re-derived end to end.
#[derive(Clone, Debug)]
pub struct Match {
    /// The 24-word BIP-39 mnemonic phrase this match was derived from.
    pub mnemonic: String,
    /// The 64-byte BIP-39 seed derived from the mnemonic.
    pub seed: [u8; 64],
    /// The matched address's private key.
    pub private_key: [u8; 32],
    /// The matched address's 33-byte compressed public key.
    pub compressed_pubkey: [u8; 33],
    /// The matched Base58-encoded Ergo mainnet P2PK address.
    pub address: String,
    /// The BIP-32 address index (`m/44'/429'/0'/0/<address_index>`) that matched.
    pub address_index: u32,
    /// Index into the search's pattern set of the pattern that matched.
    pub pattern_index: u32,
}

/// Why a search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured `max_results` was reached.
    MaxResults,
    /// The configured deadline elapsed.
    Deadline,
    /// The caller set the cancellation flag.
    Cancelled,
}

/// Diagnostics from one batch round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    /// Hits claimed in the shared buffer this round, capped at [`MAX_HITS`].
    pub hits_recorded: usize,
    /// Of those, how many survived host re-derivation and are real matches.
    pub hits_reverified: usize,
    /// Whether more hits were claimed this round than [`MAX_HITS`] could hold.
    pub overflowed: bool,
}

/// The result of a completed or stopped search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Every verified match found before the search stopped.
    pub matches: Vec<Match>,
    /// Why the search stopped.
    pub stop_reason: StopReason,
}

/// Drives one search: owns the salt, the counter sweep, and the result
/// accumulator. Lives for exactly one search.
pub struct Controller {
    config: SearchConfig,
    salt: [u8; 32],
    counter_start: u64,
    cancelled: Arc<AtomicBool>,
}

impl Controller {
    /// Build a controller with a freshly drawn CSPRNG salt.
    pub fn new(config: SearchConfig) -> Controller {
        let mut rng = StdRng::from_entropy();
        Controller::with_rng(config, &mut rng)
    }

    /// Build a controller with a salt drawn from the given RNG, for
    /// deterministic tests.
    pub fn with_rng(config: SearchConfig, rng: &mut impl RngCore) -> Controller {
        let mut salt = [0u8; 32];
        rng.fill_bytes(&mut salt);
        Controller {
            config,
            salt,
            counter_start: 0,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A clone of the cancellation flag, for a caller to set from another
    /// thread (signal handler, UI cancel button, ...).
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// This search's salt.
    pub fn salt(&self) -> [u8; 32] {
        self.salt
    }

    /// The next batch round's starting counter.
    pub fn counter_start(&self) -> u64 {
        self.counter_start
    }

    /// Run batches until `max_results` matches are verified, the deadline
    /// elapses, or the caller cancels. Checked once per batch boundary, not
    /// mid-batch.
    pub fn run(&mut self) -> SearchOutcome {
        let start = Instant::now();
        let mut matches = Vec::new();

        let stop_reason = loop {
            if let Some(deadline) = self.config.deadline {
                if start.elapsed() >= deadline {
                    break StopReason::Deadline;
                }
            }
            if self.cancelled.load(Ordering::SeqCst) {
                break StopReason::Cancelled;
            }
            if matches.len() >= self.config.max_results {
                break StopReason::MaxResults;
            }

            let report = self.run_batch(&mut matches);
            if report.overflowed {
                warn!(
                    counter_start = self.counter_start,
                    hits_recorded = report.hits_recorded,
                    "hit buffer overflowed this batch; pattern is likely too short"
                );
            }
            info!(
                counter_start = self.counter_start,
                matches_so_far = matches.len(),
                hits_this_batch = report.hits_reverified,
                "batch complete"
            );

            self.counter_start = self
                .counter_start
                .wrapping_add(self.config.batch_size as u64 * self.config.workers as u64);
        };

        SearchOutcome {
            matches,
            stop_reason,
        }
    }

    fn run_batch(&self, matches: &mut Vec<Match>) -> BatchReport {
        let hit_count = AtomicU32::new(0);
        let hits: Vec<Mutex<Option<HitRecord>>> = (0..MAX_HITS).map(|_| Mutex::new(None)).collect();

        let salt = self.salt;
        let counter_start = self.counter_start;
        let batch_size = self.config.batch_size;
        let patterns = &self.config.patterns;
        let num_indices = self.config.num_indices;
        let hit_count_ref = &hit_count;
        let hits_ref = &hits;

        std::thread::scope(|scope| {
            for worker in 0..self.config.workers {
                let worker_counter_start = counter_start.wrapping_add(worker as u64 * batch_size as u64);
                scope.spawn(move || {
                    for local_gid in 0..batch_size {
                        search_work_item(
                            &salt,
                            worker_counter_start,
                            local_gid,
                            patterns,
                            num_indices,
                            hit_count_ref,
                            hits_ref,
                        );
                    }
                });
            }
        });

        let recorded = hit_count.load(Ordering::SeqCst) as usize;
        let overflowed = recorded > MAX_HITS;
        let usable = recorded.min(MAX_HITS);

        let mut reverified = 0;
        for slot in hits.iter().take(usable) {
            let maybe_hit = *slot.lock().expect("hit slot mutex poisoned");
            if let Some(hit) = maybe_hit {
                match self.reverify(&hit) {
                    Some(m) => {
                        matches.push(m);
                        reverified += 1;
                    }
                    None => warn!(
                        work_item_id = hit.work_item_id,
                        address_index = hit.address_index,
                        pattern_index = hit.pattern_index,
                        "hit failed host re-verification, discarding"
                    ),
                }
            }
        }

        BatchReport {
            hits_recorded: usable,
            hits_reverified: reverified,
            overflowed,
        }
    }

    /// Reconstruct a hit's full pipeline on the host and confirm the prefix
    /// still matches. Returns `None` on any derivation failure or a
    /// non-reproducing match — both indicate a kernel bug, never a caller
    /// error.
    fn reverify(&self, hit: &HitRecord) -> Option<Match> {
        let entropy = hit.entropy();
        let words = entropy_to_mnemonic(&entropy);
        let seed = mnemonic_to_seed(&words).ok()?;
        let chain = derive_ergo_account_node(&seed).ok()?;
        let child = chain.derive_child(hit.address_index).ok()?;
        let point = JacobianPoint::scalar_mul(&child.private_key).ok()?;
        let pubkey = point.to_compressed()?;
        let payload = build_payload(&pubkey).ok()?;

        let pattern = self.config.patterns.patterns().get(hit.pattern_index as usize)?;
        if !matches_fast(&payload, pattern.as_bytes(), self.config.patterns.is_case_insensitive()) {
            return None;
        }

        let address = ergo_p2pk_address(&pubkey).ok()?;
        let (phrase_buf, phrase_len) = mnemonic_phrase(&words);
        let mnemonic = core::str::from_utf8(&phrase_buf[..phrase_len]).ok()?.to_string();

        Some(Match {
            mnemonic,
            seed,
            private_key: child.private_key,
            compressed_pubkey: pubkey,
            address,
            address_index: hit.address_index,
            pattern_index: hit.pattern_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_rng() -> StdRng {
        StdRng::seed_from_u64(0xC0FFEE)
    }

    #[test]
    fn rejects_num_indices_out_of_range() {
        let err = SearchConfigBuilder::new()
            .pattern("9err")
            .num_indices(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::NumIndicesOutOfRange(0)));
    }

    #[test]
    fn rejects_zero_max_results() {
        let err = SearchConfigBuilder::new()
            .pattern("9err")
            .max_results(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MaxResultsZero));
    }

    #[test]
    fn rejects_zero_workers() {
        let err = SearchConfigBuilder::new()
            .pattern("9err")
            .workers(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::NoWorkers));
    }

    #[test]
    fn rejects_empty_pattern_set() {
        let err = SearchConfigBuilder::new().build().unwrap_err();
        assert!(matches!(err, ConfigError::Pattern(PatternError::Empty)));
    }

    #[test]
    fn with_rng_is_deterministic_given_the_same_seed() {
        let config_a = SearchConfigBuilder::new().pattern("9").build().unwrap();
        let config_b = SearchConfigBuilder::new().pattern("9").build().unwrap();
        let a = Controller::with_rng(config_a, &mut seeded_rng());
        let b = Controller::with_rng(config_b, &mut seeded_rng());
        assert_eq!(a.salt(), b.salt());
    }

    #[test]
    fn stops_on_max_results_with_universal_pattern() {
        // "9" matches every P2PK address's first character, so the very
        // first work item of the first batch always hits.
        let config = SearchConfigBuilder::new()
            .pattern("9")
            .num_indices(1)
            .batch_size(4)
            .workers(1)
            .max_results(1)
            .deadline(Duration::from_secs(30))
            .build()
            .unwrap();
        let mut controller = Controller::with_rng(config, &mut seeded_rng());
        let outcome = controller.run();

        assert_eq!(outcome.stop_reason, StopReason::MaxResults);
        assert_eq!(outcome.matches.len(), 1);
        let m = &outcome.matches[0];
        assert!(m.address.starts_with('9'));
        assert_eq!(m.pattern_index, 0);
        assert_eq!(m.mnemonic.split(' ').count(), 24);
    }

    #[test]
    fn pre_cancelled_controller_stops_before_any_batch() {
        let config = SearchConfigBuilder::new()
            .pattern("9err")
            .max_results(1000)
            .build()
            .unwrap();
        let mut controller = Controller::with_rng(config, &mut seeded_rng());
        controller.cancel_flag().store(true, Ordering::SeqCst);

        let outcome = controller.run();
        assert_eq!(outcome.stop_reason, StopReason::Cancelled);
        assert!(outcome.matches.is_empty());
        assert_eq!(controller.counter_start(), 0);
    }

    #[test]
    fn zero_deadline_stops_before_any_batch() {
        let config = SearchConfigBuilder::new()
            .pattern("9err")
            .max_results(1000)
            .deadline(Duration::from_nanos(0))
            .build()
            .unwrap();
        let mut controller = Controller::with_rng(config, &mut seeded_rng());

        let outcome = controller.run();
        assert_eq!(outcome.stop_reason, StopReason::Deadline);
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn counter_start_advances_by_batch_size_times_workers() {
        let config = SearchConfigBuilder::new()
            .pattern("9")
            .num_indices(1)
            .batch_size(2)
            .workers(3)
            .max_results(1)
            .deadline(Duration::from_secs(30))
            .build()
            .unwrap();
        let mut controller = Controller::with_rng(config, &mut seeded_rng());
        controller.run();
        assert_eq!(controller.counter_start(), 2 * 3);
    }
}
