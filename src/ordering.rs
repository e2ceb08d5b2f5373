//! Storage-order normalization of word analyses.
//!
//! Both LTR and RTL sentences are ordered by ascending character offset in the stored string,
//! which is logical reading order for every script. Visual right-to-left layout is left to the
//! renderer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analysis::WordAnalysis;
use crate::textutil::nth_char_offset_of;

/// How repeated tokens are mapped onto their occurrences in the sentence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingStrategy {
    /// Every analysis of a repeated token gets the token's first occurrence.
    #[default]
    FirstOccurrence,
    /// The i-th analysis of a repeated token takes its i-th occurrence.
    Incremental,
}

impl OrderingStrategy {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "first_occurrence" | "first" => Some(Self::FirstOccurrence),
            "incremental" => Some(Self::Incremental),
            _ => None,
        }
    }
}

/// Offset of the `nth` occurrence of `word`: exact match first, then a case-insensitive match
/// when lowercasing keeps char positions stable.
fn locate(sentence: &str, folded_sentence: Option<&str>, word: &str, nth: usize) -> Option<usize> {
    let word = word.trim();
    if word.is_empty() {
        return None;
    }
    if let Some(off) = nth_char_offset_of(sentence, word, nth) {
        return Some(off);
    }
    let folded = folded_sentence?;
    nth_char_offset_of(folded, &word.to_lowercase(), nth)
}

pub fn assign_offsets(sentence: &str, words: &mut [WordAnalysis], strategy: OrderingStrategy) {
    let lowered = sentence.to_lowercase();
    let folded = (lowered.chars().count() == sentence.chars().count()).then_some(lowered.as_str());
    let mut seen: HashMap<String, usize> = HashMap::new();
    for w in words.iter_mut() {
        let nth = match strategy {
            OrderingStrategy::FirstOccurrence => 0,
            OrderingStrategy::Incremental => {
                let slot = seen.entry(w.word.trim().to_lowercase()).or_insert(0);
                let n = *slot;
                *slot += 1;
                n
            }
        };
        w.offset = locate(sentence, folded, &w.word, nth);
    }
}

/// Assigns offsets and stable-sorts ascending; unknown offsets go last in their original order.
pub fn normalize_order(sentence: &str, words: &mut [WordAnalysis], strategy: OrderingStrategy) {
    assign_offsets(sentence, words, strategy);
    words.sort_by_key(|w| w.offset.unwrap_or(usize::MAX));
}
