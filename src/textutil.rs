use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\p{M}\p{N}]+(?:['’\-][\p{L}\p{M}\p{N}]+)*").expect("word regex")
});
static LEXICAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}]").expect("lexical regex"));

/// Writing systems the taxonomies know how to police.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Script {
    Latin,
    Devanagari,
    Arabic,
    Han,
}

impl Script {
    #[must_use]
    pub fn contains(self, ch: char) -> bool {
        match self {
            Script::Latin => is_latin(ch),
            Script::Devanagari => is_devanagari(ch),
            Script::Arabic => is_arabic(ch),
            Script::Han => is_han(ch),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Script::Latin => "latin",
            Script::Devanagari => "devanagari",
            Script::Arabic => "arabic",
            Script::Han => "han",
        }
    }
}

/// Word-like runs of a sentence (letters, marks, digits; inner apostrophes and hyphens kept).
#[must_use]
pub fn word_tokens(text: &str) -> Vec<&str> {
    WORD_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Lowercased form used when comparing model output against the source sentence.
#[must_use]
pub fn fold(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Sentence identity used when the model echoes a sentence back: case, spacing and punctuation
/// are ignored.
#[must_use]
pub fn same_sentence(a: &str, b: &str) -> bool {
    let fa: Vec<String> = word_tokens(a).into_iter().map(fold).collect();
    let fb: Vec<String> = word_tokens(b).into_iter().map(fold).collect();
    !fa.is_empty() && fa == fb
}

/// True when the text carries at least one letter or digit (pure punctuation is not lexical).
#[must_use]
pub fn is_lexical(text: &str) -> bool {
    LEXICAL_RE.is_match(text)
}

/// Character (not byte) offset of the first occurrence of `needle` in `haystack`.
#[must_use]
pub fn char_offset_of(haystack: &str, needle: &str) -> Option<usize> {
    nth_char_offset_of(haystack, needle, 0)
}

/// Character offset of the `n`-th (0-based, non-overlapping) occurrence of `needle`.
#[must_use]
pub fn nth_char_offset_of(haystack: &str, needle: &str, n: usize) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let (byte_idx, _) = haystack.match_indices(needle).nth(n)?;
    Some(haystack[..byte_idx].chars().count())
}

/// Characters that never count against script conformance: combining diacritics shared by
/// several scripts and zero-width joiners.
#[must_use]
pub fn is_script_neutral(ch: char) -> bool {
    let u = ch as u32;
    (0x0300..=0x036F).contains(&u) || u == 0x200C || u == 0x200D || u == 0x00B7
}

#[must_use]
pub fn is_letter_like(ch: char) -> bool {
    ch.is_alphabetic() || is_mark(ch)
}

fn is_mark(ch: char) -> bool {
    let u = ch as u32;
    (0x0300..=0x036F).contains(&u)
        || (0x0900..=0x0903).contains(&u)
        || (0x093A..=0x094F).contains(&u)
        || (0x0951..=0x0957).contains(&u)
        || (0x0962..=0x0963).contains(&u)
        || (0x064B..=0x065F).contains(&u)
        || u == 0x0670
}

pub fn is_latin(ch: char) -> bool {
    let u = ch as u32;
    ch.is_ascii_alphabetic()
        || ((0x00C0..=0x024F).contains(&u) && u != 0x00D7 && u != 0x00F7)
        || (0x1E00..=0x1EFF).contains(&u)
}

pub fn is_devanagari(ch: char) -> bool {
    let u = ch as u32;
    (0x0900..=0x097F).contains(&u) || (0xA8E0..=0xA8FF).contains(&u)
}

pub fn is_arabic(ch: char) -> bool {
    let u = ch as u32;
    (0x0600..=0x06FF).contains(&u)
        || (0x0750..=0x077F).contains(&u)
        || (0x08A0..=0x08FF).contains(&u)
        || (0xFB50..=0xFDFF).contains(&u)
        || (0xFE70..=0xFEFF).contains(&u)
}

pub fn is_han(ch: char) -> bool {
    let u = ch as u32;
    (0x3400..=0x4DBF).contains(&u)
        || (0x4E00..=0x9FFF).contains(&u)
        || (0xF900..=0xFAFF).contains(&u)
        || (0x20000..=0x2A6DF).contains(&u)
        || (0x2A700..=0x2B73F).contains(&u)
        || (0x2B740..=0x2B81F).contains(&u)
        || (0x2B820..=0x2CEAF).contains(&u)
        || (0x2CEB0..=0x2EBEF).contains(&u)
}
