//! Company name matching
//!
//! A queried company name and the name displayed on a supplier page rarely
//! agree character for character: legal suffixes come and go, words get
//! reordered, and transliteration adds noise. Names are therefore compared as
//! sets of normalized tokens with a small stop-word list.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::record::NA;

/// Words that carry no identity for a supplier name
const STOP_WORDS: &[&str] = &[
    "pvt",
    "ltd",
    "limited",
    "industries",
    "industry",
    "company",
    "co",
    "traders",
    "suppliers",
    "india",
    "ind",
];

/// Tokens of this length or shorter are dropped
const MIN_TOKEN_LEN: usize = 2;

/// Minimum shared tokens for a match when the input is not a subset
const MIN_OVERLAP: usize = 2;

/// Normalize a company name into its set of identifying tokens.
///
/// Lowercases, strips everything but ASCII letters, digits and spaces, then
/// drops stop-words and tokens of two characters or fewer.
pub fn tokenize(name: &str) -> BTreeSet<String> {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ')
        .collect();

    cleaned
        .split_whitespace()
        .filter(|w| w.len() > MIN_TOKEN_LEN && !STOP_WORDS.contains(w))
        .map(String::from)
        .collect()
}

/// Does the candidate page name refer to the queried company?
///
/// True when the two token sets share at least two tokens, or when every
/// token of the input appears in the candidate.
pub fn matches(input_name: &str, candidate_name: &str) -> bool {
    match_report(input_name, candidate_name).matched
}

/// Full breakdown of a name comparison
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub input_tokens: BTreeSet<String>,
    pub candidate_tokens: BTreeSet<String>,
    pub overlap: BTreeSet<String>,
    pub is_subset: bool,
    pub matched: bool,
}

/// Compare two names and keep the intermediate token sets
pub fn match_report(input_name: &str, candidate_name: &str) -> MatchReport {
    let input = input_name.trim();
    let candidate = candidate_name.trim();

    if input.is_empty() || candidate.is_empty() || candidate == NA {
        return MatchReport {
            input_tokens: BTreeSet::new(),
            candidate_tokens: BTreeSet::new(),
            overlap: BTreeSet::new(),
            is_subset: false,
            matched: false,
        };
    }

    let input_tokens = tokenize(input);
    let candidate_tokens = tokenize(candidate);
    let overlap: BTreeSet<String> = input_tokens
        .intersection(&candidate_tokens)
        .cloned()
        .collect();
    let is_subset = input_tokens.is_subset(&candidate_tokens);
    let matched = overlap.len() >= MIN_OVERLAP || is_subset;

    debug!(
        input = input,
        candidate = candidate,
        overlap = overlap.len(),
        is_subset,
        matched,
        "name match"
    );

    MatchReport {
        input_tokens,
        candidate_tokens,
        overlap,
        is_subset,
        matched,
    }
}
