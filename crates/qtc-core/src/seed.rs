//! Seed phrase management
//!
//! Handles seed phrase generation from entropy, parsing and validation.
//!
//! Generation draws word indices by rejection sampling over a bounded byte
//! stream: the 16 entropy bytes first, then `SHA-256(domain ‖ entropy ‖ n)`
//! blocks. Bytes at or above the largest multiple of the wordlist length
//! are skipped (no modulo bias) and so are indices already chosen.

use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::entropy::{EntropyError, EntropySource};
use crate::wordlist::{self, WORDLIST, WORDLIST_LEN};

/// Words per seed phrase
pub const SEED_WORD_COUNT: usize = 12;

/// Entropy consumed per generated phrase
pub const ENTROPY_LEN: usize = 16;

/// Expansion blocks after the raw entropy bytes (16 × 32 candidate bytes)
const MAX_EXPANSION_BLOCKS: u32 = 16;

const STREAM_DOMAIN: &[u8] = b"qtc-seed-stream";

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Invalid seed phrase: {0}")]
    InvalidSeedPhrase(String),
    #[error("Entropy stream exhausted before 12 unique words were drawn")]
    EntropyExhausted,
    #[error(transparent)]
    Entropy(#[from] EntropyError),
}

/// A 12-word seed phrase.
///
/// Words are stored as references into the wordlist, so the phrase is
/// always normalized (lowercase, single spaces).
#[derive(Clone, PartialEq, Eq)]
pub struct SeedPhrase {
    words: Vec<&'static str>,
}

impl SeedPhrase {
    /// Generate a fresh phrase from a secure entropy source.
    pub fn generate<E: EntropySource + ?Sized>(source: &mut E) -> Result<Self, SeedError> {
        let bytes = source.random_bytes(ENTROPY_LEN)?;
        let mut entropy = Zeroizing::new([0u8; ENTROPY_LEN]);
        entropy.copy_from_slice(&bytes);
        generate_seed_phrase(&entropy)
    }

    /// Parse and validate a phrase typed by the user.
    pub fn parse(phrase: &str) -> Result<Self, SeedError> {
        parse_seed_phrase(phrase)
    }

    /// The words in order.
    pub fn words(&self) -> &[&'static str] {
        &self.words
    }

    /// Canonical text form: lowercase words joined by single spaces.
    pub fn to_phrase(&self) -> Zeroizing<String> {
        Zeroizing::new(self.words.join(" "))
    }

    /// Whether any word repeats. Generated phrases never do.
    pub fn has_duplicates(&self) -> bool {
        self.words
            .iter()
            .enumerate()
            .any(|(i, w)| self.words[..i].contains(w))
    }
}

impl fmt::Debug for SeedPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SeedPhrase([REDACTED; {}])", self.words.len())
    }
}

/// Build a seed phrase from 16 bytes of entropy.
///
/// Deterministic: the same entropy always yields the same phrase.
pub fn generate_seed_phrase(entropy: &[u8; ENTROPY_LEN]) -> Result<SeedPhrase, SeedError> {
    // Largest multiple of the wordlist length that fits in a byte
    let limit = 256 - (256 % WORDLIST_LEN);
    let mut chosen: Vec<usize> = Vec::with_capacity(SEED_WORD_COUNT);

    let take = |byte: u8, chosen: &mut Vec<usize>| {
        let value = byte as usize;
        if value >= limit {
            return;
        }
        let index = value % WORDLIST_LEN;
        if !chosen.contains(&index) {
            chosen.push(index);
        }
    };

    for &byte in entropy.iter() {
        if chosen.len() == SEED_WORD_COUNT {
            break;
        }
        take(byte, &mut chosen);
    }

    let mut counter = 0u32;
    while chosen.len() < SEED_WORD_COUNT {
        if counter >= MAX_EXPANSION_BLOCKS {
            return Err(SeedError::EntropyExhausted);
        }
        let mut hasher = Sha256::new();
        hasher.update(STREAM_DOMAIN);
        hasher.update(entropy);
        hasher.update(counter.to_be_bytes());
        let mut block = Zeroizing::new([0u8; 32]);
        block.copy_from_slice(&hasher.finalize());
        counter += 1;

        for &byte in block.iter() {
            if chosen.len() == SEED_WORD_COUNT {
                break;
            }
            take(byte, &mut chosen);
        }
    }

    Ok(SeedPhrase {
        words: chosen.into_iter().map(|i| WORDLIST[i]).collect(),
    })
}

/// Parse a phrase from words.
///
/// Accepts any whitespace between words and any letter case. Repeated
/// words are accepted.
pub fn parse_seed_phrase(phrase: &str) -> Result<SeedPhrase, SeedError> {
    let tokens: Vec<&str> = phrase.split_whitespace().collect();
    if tokens.len() != SEED_WORD_COUNT {
        return Err(SeedError::InvalidSeedPhrase(format!(
            "expected {} words, got {}",
            SEED_WORD_COUNT,
            tokens.len()
        )));
    }

    let mut words = Vec::with_capacity(SEED_WORD_COUNT);
    for (position, token) in tokens.iter().enumerate() {
        let word = wordlist::index_of(token)
            .and_then(wordlist::word_at)
            .ok_or_else(|| {
                SeedError::InvalidSeedPhrase(format!(
                    "word {} is not in the wordlist",
                    position + 1
                ))
            })?;
        words.push(word);
    }

    Ok(SeedPhrase { words })
}

/// True iff `phrase` has exactly 12 whitespace-separated words, all in the
/// wordlist (case-insensitive).
pub fn is_valid_seed_phrase(phrase: &str) -> bool {
    parse_seed_phrase(phrase).is_ok()
}
