//! Validated pattern-set type shared by [`crate::matcher`], [`crate::kernel`],
//! and [`crate::controller`].
//!
//! Validation happens once, on the host, when a search is configured;
//! everything downstream trusts a `PatternSet` to already satisfy its
//! invariants.

#![forbid(unsafe_code)]

use crate::address::ALPHABET;

/// Maximum number of patterns in a single search.
pub const MAX_PATTERNS: usize = 64;
/// Maximum length of a single pattern, in bytes.
pub const MAX_PATTERN_LEN: usize = 32;
/// Maximum combined length of all patterns, in bytes.
pub const MAX_TOTAL_BYTES: usize = 1024;

/// Second-character range forced by the compressed pubkey prefix byte
/// (`0x02`/`0x03`): see [`crate::address`] for why.
const ALLOWED_SECOND_CHARS: &[u8] = b"efghi";

/// Errors from validating a candidate prefix pattern or pattern set.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PatternError {
    /// The pattern set supplied to [`PatternSet::new`] was empty.
    #[error("pattern set must contain at least one pattern")]
    Empty,
    /// More than [`MAX_PATTERNS`] patterns were supplied.
    #[error("pattern set holds {0} patterns, limit is {MAX_PATTERNS}")]
    TooManyPatterns(usize),
    /// A single pattern string was empty.
    #[error("pattern is empty")]
    EmptyPattern,
    /// A single pattern exceeded [`MAX_PATTERN_LEN`] bytes.
    #[error("pattern is {0} bytes long, limit is {MAX_PATTERN_LEN}")]
    PatternTooLong(usize),
    /// The combined byte length of every pattern in the set exceeded
    /// [`MAX_TOTAL_BYTES`].
    #[error("pattern set totals {0} bytes, limit is {MAX_TOTAL_BYTES}")]
    TotalBytesExceeded(usize),
    /// A pattern byte at the given offset is not in the Base58 alphabet.
    #[error("pattern byte {0:#04x} at offset {1} is not a valid Base58 character")]
    InvalidBase58Char(u8, usize),
    /// A pattern's first character was not `'9'`, the only possible leading
    /// character of a mainnet P2PK address.
    #[error("pattern must start with '9' (mainnet P2PK prefix), got {0:?}")]
    BadFirstChar(char),
    /// A pattern's second character is outside the range a mainnet P2PK
    /// address can ever produce.
    #[error("pattern's second character {0:?} can never appear in a P2PK address")]
    BadSecondChar(char),
}

/// A single validated prefix pattern: ASCII bytes, 1..=32 long, satisfying
/// the Base58-alphabet / first-char / second-char rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    bytes: [u8; MAX_PATTERN_LEN],
    len: u8,
}

impl Pattern {
    /// Validate and normalize a raw prefix string. When `case_insensitive`
    /// is set the pattern is lowercased before storage (letters only;
    /// Base58 digits and the fixed '9' are unaffected).
    pub fn new(raw: &str, case_insensitive: bool) -> Result<Pattern, PatternError> {
        let src = raw.as_bytes();
        if src.is_empty() {
            return Err(PatternError::EmptyPattern);
        }
        if src.len() > MAX_PATTERN_LEN {
            return Err(PatternError::PatternTooLong(src.len()));
        }
        for (i, &b) in src.iter().enumerate() {
            if !ALPHABET.contains(&b) {
                return Err(PatternError::InvalidBase58Char(b, i));
            }
        }
        if src[0] != b'9' {
            return Err(PatternError::BadFirstChar(src[0] as char));
        }
        if src.len() > 1 {
            let second = src[1];
            let lowered = second.to_ascii_lowercase();
            if !ALLOWED_SECOND_CHARS.contains(&lowered) {
                return Err(PatternError::BadSecondChar(second as char));
            }
        }

        let mut bytes = [0u8; MAX_PATTERN_LEN];
        for (i, &b) in src.iter().enumerate() {
            bytes[i] = if case_insensitive {
                b.to_ascii_lowercase()
            } else {
                b
            };
        }
        Ok(Pattern {
            bytes,
            len: src.len() as u8,
        })
    }

    /// The pattern's bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// The pattern's length in bytes.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Always `false`: [`Pattern::new`] never produces an empty pattern.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// A validated, ordered set of up to [`MAX_PATTERNS`] prefix patterns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
    case_insensitive: bool,
}

impl PatternSet {
    /// Validate a batch of raw prefix strings into a `PatternSet`.
    pub fn new(raw_patterns: &[&str], case_insensitive: bool) -> Result<PatternSet, PatternError> {
        if raw_patterns.is_empty() {
            return Err(PatternError::Empty);
        }
        if raw_patterns.len() > MAX_PATTERNS {
            return Err(PatternError::TooManyPatterns(raw_patterns.len()));
        }

        let mut patterns = Vec::with_capacity(raw_patterns.len());
        let mut total = 0usize;
        for raw in raw_patterns {
            let pattern = Pattern::new(raw, case_insensitive)?;
            total += pattern.len();
            if total > MAX_TOTAL_BYTES {
                return Err(PatternError::TotalBytesExceeded(total));
            }
            patterns.push(pattern);
        }

        Ok(PatternSet {
            patterns,
            case_insensitive,
        })
    }

    /// The validated patterns, in the order they were supplied.
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Whether matching should be performed case-insensitively.
    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Number of patterns in the set.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Always `false`: [`PatternSet::new`] rejects an empty pattern list.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
