use std::collections::HashMap;

use serde::Serialize;

use crate::ordering::{normalize_order, OrderingStrategy};
use crate::taxonomy::{LanguageProfile, RoleTag, Segmentation};
use crate::textutil::{fold, is_han, word_tokens};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Validated,
    NeedsRetry,
    Fallback,
}

impl AnalysisStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisStatus::Validated => "validated",
            AnalysisStatus::NeedsRetry => "needs_retry",
            AnalysisStatus::Fallback => "fallback",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WordAnalysis {
    pub word: String,
    pub gloss: String,
    pub role: &'static str,
    pub color: &'static str,
    /// What the model actually wrote before classification.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub raw_role: String,
    /// First-occurrence char offset inside the owning sentence; `None` sorts last.
    #[serde(skip)]
    pub offset: Option<usize>,
}

impl WordAnalysis {
    #[must_use]
    pub fn new(word: &str, gloss: &str, tag: &RoleTag, raw_role: &str) -> Self {
        Self {
            word: word.trim().to_string(),
            gloss: gloss.trim().to_string(),
            role: tag.id,
            color: tag.color,
            raw_role: raw_role.trim().to_string(),
            offset: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SentenceAnalysis {
    pub sentence: String,
    pub target_word: String,
    pub words: Vec<WordAnalysis>,
    pub confidence: f64,
    pub status: AnalysisStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    pub attempts: u32,
}

impl SentenceAnalysis {
    /// Degraded analysis used once retries are exhausted: every word `other`, the gloss is the
    /// model's last gloss for that word when one was seen, otherwise the word itself. Never
    /// empty: text without word units (blank included) becomes a single `other` entry.
    #[must_use]
    pub fn fallback(
        sentence: &str,
        target_word: &str,
        profile: &LanguageProfile,
        seen_glosses: &HashMap<String, String>,
        strategy: OrderingStrategy,
    ) -> Self {
        let other = profile.other();
        let mut units = segment_words(sentence, profile.segmentation);
        if units.is_empty() {
            units.push(sentence.trim());
        }
        let mut words: Vec<WordAnalysis> = units
            .into_iter()
            .map(|w| {
                let gloss = seen_glosses
                    .get(&fold(w))
                    .filter(|g| !g.trim().is_empty())
                    .map(String::as_str)
                    .unwrap_or(w);
                WordAnalysis::new(w, gloss, other, "")
            })
            .collect();
        normalize_order(sentence, &mut words, strategy);
        Self {
            sentence: sentence.to_string(),
            target_word: target_word.to_string(),
            words,
            confidence: 0.0,
            status: AnalysisStatus::Fallback,
            flags: Vec::new(),
            attempts: 0,
        }
    }
}

/// Units a sentence is expected to be analysed into. Han runs split one character per unit;
/// everything else splits into word tokens.
#[must_use]
pub fn segment_words(sentence: &str, segmentation: Segmentation) -> Vec<&str> {
    let tokens = word_tokens(sentence);
    if segmentation == Segmentation::Whitespace {
        return tokens;
    }
    let mut out = Vec::new();
    for tok in tokens {
        let mut run_start: Option<usize> = None;
        for (i, ch) in tok.char_indices() {
            if is_han(ch) {
                if let Some(s) = run_start.take() {
                    out.push(&tok[s..i]);
                }
                out.push(&tok[i..i + ch.len_utf8()]);
            } else if run_start.is_none() {
                run_start = Some(i);
            }
        }
        if let Some(s) = run_start {
            out.push(&tok[s..]);
        }
    }
    out
}
