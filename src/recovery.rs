//! Getting a usable `batch_results` document out of whatever the model actually sent back.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

static FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_\-]*[ \t]*\r?\n?(.*?)(?:```|\z)").expect("fence regex")
});
static TRAILING_COMMA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",(\s*[}\]])").expect("trailing comma regex"));
static UNQUOTED_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|[{,]\s*)([A-Za-z_][A-Za-z0-9_]*)(\s*):").expect("unquoted key regex")
});
static PY_TRUE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bTrue\b").expect("true regex"));
static PY_FALSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bFalse\b").expect("false regex"));
static PY_NONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bNone\b").expect("none regex"));

/// Which step of the recovery ladder produced the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStrategy {
    Direct,
    Fenced,
    Repaired,
    Extracted,
    ExtractedRepaired,
    /// Complete items cut out of a truncated `batch_results` array.
    Salvaged,
}

impl RecoveryStrategy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RecoveryStrategy::Direct => "direct",
            RecoveryStrategy::Fenced => "fenced",
            RecoveryStrategy::Repaired => "repaired",
            RecoveryStrategy::Extracted => "extracted",
            RecoveryStrategy::ExtractedRepaired => "extracted_repaired",
            RecoveryStrategy::Salvaged => "salvaged",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RecoveryError {
    #[error("empty model response")]
    Empty,
    #[error("model response is truncated")]
    Truncated,
    #[error("no JSON value in model response")]
    NoJson,
    #[error("JSON has no batch_results array")]
    WrongShape,
    #[error("unparseable JSON: {0}")]
    Malformed(String),
}

impl RecoveryError {
    /// Retrying with a larger output budget may help.
    #[must_use]
    pub fn wants_more_tokens(&self) -> bool {
        matches!(self, RecoveryError::Truncated)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Recovered {
    /// Always an object holding a `batch_results` array.
    pub value: Value,
    pub strategy: RecoveryStrategy,
}

impl Recovered {
    #[must_use]
    pub fn items(&self) -> Vec<BatchItem> {
        parse_batch_items(&self.value)
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct WordItem {
    #[serde(alias = "token")]
    pub word: String,
    #[serde(alias = "meaning", alias = "gloss")]
    pub individual_meaning: String,
    #[serde(alias = "role", alias = "pos")]
    pub grammatical_role: String,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct BatchItem {
    #[serde(alias = "index")]
    pub sentence_index: Option<Value>,
    pub sentence: String,
    #[serde(alias = "analysis")]
    pub words: Vec<WordItem>,
}

impl BatchItem {
    /// 1-based index as echoed by the model; accepts numbers and numeric strings.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self.sentence_index.as_ref()? {
            Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Items that deserialize cleanly; a malformed item is skipped instead of sinking the batch.
#[must_use]
pub fn parse_batch_items(value: &Value) -> Vec<BatchItem> {
    let Some(items) = value.get("batch_results").and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter(|v| v.is_object())
        .filter_map(|v| serde_json::from_value::<BatchItem>(v.clone()).ok())
        .collect()
}

pub fn recover_batch_json(raw: &str) -> Result<Recovered, RecoveryError> {
    let text = raw.trim().trim_start_matches('\u{feff}').trim();
    if text.is_empty() {
        return Err(RecoveryError::Empty);
    }

    let mut saw_wrong_shape = false;
    let mut last_error: Option<String> = None;
    let mut attempt = |candidate: &str, strategy: RecoveryStrategy| -> Option<Recovered> {
        match serde_json::from_str::<Value>(candidate) {
            Ok(v) => match into_batch_shape(v) {
                Some(value) => Some(Recovered { value, strategy }),
                None => {
                    saw_wrong_shape = true;
                    None
                }
            },
            Err(e) => {
                last_error = Some(e.to_string());
                None
            }
        }
    };

    if let Some(r) = attempt(text, RecoveryStrategy::Direct) {
        return Ok(r);
    }

    let fenced = fence_interior(text);
    if let Some(inner) = fenced {
        if let Some(r) = attempt(inner, RecoveryStrategy::Fenced) {
            return Ok(r);
        }
    }

    let body = fenced.unwrap_or(text);
    let repaired = repair_json(body);
    if repaired != body {
        if let Some(r) = attempt(&repaired, RecoveryStrategy::Repaired) {
            return Ok(r);
        }
    }

    let anchors = extraction_anchors(body);
    for &start in &anchors {
        if let Some(value) = value_at(body, start).and_then(into_batch_shape) {
            return Ok(Recovered {
                value,
                strategy: RecoveryStrategy::Extracted,
            });
        }
    }
    for &start in &anchors {
        if let Some(slice) = balanced_slice_at(body, start) {
            if let Some(r) = attempt(&repair_json(slice), RecoveryStrategy::ExtractedRepaired) {
                return Ok(r);
            }
        }
    }

    if is_truncated(body) {
        if let Some(value) = salvage_truncated(body) {
            return Ok(Recovered {
                value,
                strategy: RecoveryStrategy::Salvaged,
            });
        }
        return Err(RecoveryError::Truncated);
    }
    if saw_wrong_shape {
        return Err(RecoveryError::WrongShape);
    }
    if !body.contains(['{', '[']) {
        return Err(RecoveryError::NoJson);
    }
    Err(RecoveryError::Malformed(
        last_error.unwrap_or_else(|| "json_parse_failed".to_string()),
    ))
}

/// Interior of the first markdown fence. An unclosed fence runs to the end of the text.
fn fence_interior(text: &str) -> Option<&str> {
    let caps = FENCE_RE.captures(text)?;
    let inner = caps.get(1)?.as_str().trim();
    (!inner.is_empty()).then_some(inner)
}

/// Accepts `{"batch_results": [...]}`, a bare array of items, a single `{"words": [...]}` item,
/// or an object carrying the items under a near-miss key.
fn into_batch_shape(v: Value) -> Option<Value> {
    match v {
        Value::Object(mut map) => {
            if let Some(results) = map.get("batch_results") {
                return results.is_array().then(|| Value::Object(map));
            }
            if map.get("words").is_some_and(Value::is_array) {
                return Some(json!({ "batch_results": [Value::Object(map)] }));
            }
            for key in ["results", "sentences", "analyses"] {
                if map.get(key).is_some_and(Value::is_array) {
                    let items = map.remove(key)?;
                    return Some(json!({ "batch_results": items }));
                }
            }
            None
        }
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
            Some(json!({ "batch_results": items }))
        }
        _ => None,
    }
}

/// Calls `f` on every stretch of text that lies outside JSON string literals.
fn map_outside_strings(text: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut seg_start = 0;
    let mut in_string = false;
    let mut escaped = false;
    for (i, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
                out.push_str(&text[seg_start..=i]);
                seg_start = i + 1;
            }
        } else if ch == '"' {
            out.push_str(&f(&text[seg_start..i]));
            seg_start = i;
            in_string = true;
        }
    }
    if in_string {
        out.push_str(&text[seg_start..]);
    } else {
        out.push_str(&f(&text[seg_start..]));
    }
    out
}

/// Regex-level repairs of the usual LLM JSON mistakes. String contents are never touched.
#[must_use]
pub fn repair_json(text: &str) -> String {
    let fixed = map_outside_strings(text, |seg| {
        let seg = PY_TRUE_RE.replace_all(seg, "true");
        let seg = PY_FALSE_RE.replace_all(&seg, "false");
        let seg = PY_NONE_RE.replace_all(&seg, "null");
        let seg = UNQUOTED_KEY_RE.replace_all(&seg, "$1\"$2\"$3:");
        seg.into_owned()
    });
    let fixed = insert_missing_commas(&fixed);
    // Trailing commas can straddle a string boundary only in invalid input, so a second pass over
    // the already comma-fixed text is enough.
    map_outside_strings(&fixed, |seg| TRAILING_COMMA_RE.replace_all(seg, "$1").into_owned())
}

/// `} {`, `] [`, `"a" "b"` and `1 "b"` patterns get the comma the model forgot.
fn insert_missing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut in_string = false;
    let mut escaped = false;
    let mut prev_value_end = false;
    for ch in text.chars() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
                prev_value_end = true;
            }
            continue;
        }
        if ch.is_whitespace() {
            out.push(ch);
            continue;
        }
        let starts_value = matches!(ch, '{' | '[' | '"');
        if starts_value && prev_value_end {
            // Place the comma right after the previous value, before any whitespace.
            let trimmed_len = out.trim_end().len();
            out.insert(trimmed_len, ',');
        }
        out.push(ch);
        if ch == '"' {
            in_string = true;
            prev_value_end = false;
        } else {
            prev_value_end =
                matches!(ch, '}' | ']') || ch.is_ascii_digit() || ch == 'e' || ch == 'l';
        }
    }
    out
}

fn first_opener(text: &str) -> Option<usize> {
    text.find(['{', '['])
}

/// Where an embedded value may start, in text order: the first `{`, plus any `[` ahead of it
/// (a bare item array, or prose like `sentences [1-8]` that fails to parse and is skipped).
/// Without a `{` only the first `[` is tried.
fn extraction_anchors(text: &str) -> Vec<usize> {
    const MAX_ANCHORS: usize = 8;
    let Some(brace) = text.find('{') else {
        return text.find('[').into_iter().collect();
    };
    let mut anchors: Vec<usize> = text[..brace]
        .match_indices('[')
        .map(|(i, _)| i)
        .take(MAX_ANCHORS - 1)
        .collect();
    anchors.push(brace);
    anchors
}

/// Parses the JSON value starting at `start`, ignoring whatever trails it.
fn value_at(text: &str, start: usize) -> Option<Value> {
    let mut de = serde_json::Deserializer::from_str(&text[start..]);
    Value::deserialize(&mut de).ok()
}

/// From the opener at `start` to its matching closer, respecting string literals and escapes.
fn balanced_slice_at(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..start + i + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Unterminated string or unclosed brackets after the first opener.
#[must_use]
pub fn is_truncated(text: &str) -> bool {
    let Some(start) = first_opener(text) else {
        return false;
    };
    let mut depth = 0i64;
    let mut in_string = false;
    let mut escaped = false;
    for ch in text[start..].chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => depth -= 1,
            _ => {}
        }
    }
    in_string || depth > 0
}

/// Complete objects at the top level of a cut-off `batch_results` array.
fn salvage_truncated(text: &str) -> Option<Value> {
    let key = text.find("\"batch_results\"")?;
    let open = key + text[key..].find('[')?;
    let mut items = Vec::new();
    let mut rest = &text[open + 1..];
    loop {
        let Some(obj_start) = rest.find('{') else {
            break;
        };
        let Some(obj) = balanced_slice_at(rest, obj_start) else {
            break;
        };
        let parsed = serde_json::from_str::<Value>(obj)
            .ok()
            .or_else(|| serde_json::from_str::<Value>(&repair_json(obj)).ok());
        if let Some(v) = parsed.filter(Value::is_object) {
            items.push(v);
        }
        rest = &rest[obj_start + obj.len()..];
    }
    (!items.is_empty()).then(|| json!({ "batch_results": items }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = r#"{"batch_results":[{"sentence_index":1,"sentence":"Yo como pan.","words":[{"word":"Yo","individual_meaning":"I","grammatical_role":"personal pronoun"}]}]}"#;

    fn strategy_of(text: &str) -> RecoveryStrategy {
        recover_batch_json(text).expect("recovered").strategy
    }

    #[test]
    fn well_formed_input_is_returned_unchanged() {
        let r = recover_batch_json(GOOD).expect("direct");
        assert_eq!(r.strategy, RecoveryStrategy::Direct);
        assert_eq!(r.value, serde_json::from_str::<Value>(GOOD).expect("json"));
        let items = r.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].index(), Some(1));
        assert_eq!(items[0].words[0].grammatical_role, "personal pronoun");
    }

    #[test]
    fn fenced_with_trailing_comma() {
        let text = "Here you go:\n```json\n{\"batch_results\": [{\"sentence_index\": 1, \"words\": [{\"word\": \"a\",},],},]}\n```\nThanks!";
        let r = recover_batch_json(text).expect("recovered");
        assert_eq!(r.strategy, RecoveryStrategy::Repaired);
        assert_eq!(r.items()[0].words[0].word, "a");
    }

    #[test]
    fn plain_fence_parses_interior() {
        let text = format!("```json\n{GOOD}\n```");
        assert_eq!(strategy_of(&text), RecoveryStrategy::Fenced);
        let unclosed = format!("```\n{GOOD}");
        assert_eq!(strategy_of(&unclosed), RecoveryStrategy::Fenced);
    }

    #[test]
    fn missing_commas_and_unquoted_keys() {
        let text = r#"{batch_results: [{"sentence_index": 1 "words": [{"word": "x" "grammatical_role": "noun"} {"word": "y", grammatical_role: "verb"}]}]}"#;
        let r = recover_batch_json(text).expect("recovered");
        assert_eq!(r.strategy, RecoveryStrategy::Repaired);
        let items = r.items();
        assert_eq!(items[0].words.len(), 2);
        assert_eq!(items[0].words[1].grammatical_role, "verb");
    }

    #[test]
    fn repairs_leave_string_contents_alone() {
        let text = r#"{"a": "keep, } this True", "b": True,}"#;
        assert_eq!(repair_json(text), r#"{"a": "keep, } this True", "b": true}"#);
    }

    #[test]
    fn prose_around_object_is_extracted() {
        let text = format!("Sure! The analysis is {GOOD} Hope this helps {{not json}}");
        assert_eq!(strategy_of(&text), RecoveryStrategy::Extracted);
    }

    #[test]
    fn bracketed_prose_before_object_is_skipped() {
        let text = format!("Analysis for sentences [1-8]: {GOOD}");
        let r = recover_batch_json(&text).expect("recovered");
        assert_eq!(r.strategy, RecoveryStrategy::Extracted);
        assert_eq!(r.items()[0].sentence, "Yo como pan.");

        let noted = format!("Notes [1] and [2] below.\n{GOOD}\n[end]");
        assert_eq!(strategy_of(&noted), RecoveryStrategy::Extracted);

        let array = r#"Sentences [1-2]: [{"sentence_index": 1, "words": []}, {"sentence_index": 2, "words": []}]"#;
        assert_eq!(recover_batch_json(array).expect("array").items().len(), 2);
    }

    #[test]
    fn extracted_then_repaired() {
        let text = r#"Result: {"batch_results": [{"sentence_index": 1, "words": [],}]} trailing {"#;
        assert_eq!(strategy_of(text), RecoveryStrategy::ExtractedRepaired);
    }

    #[test]
    fn bare_array_and_single_item_are_wrapped() {
        let arr = r#"[{"sentence_index": 1, "words": []}, {"sentence_index": 2, "words": []}]"#;
        let r = recover_batch_json(arr).expect("array");
        assert_eq!(r.items().len(), 2);
        let single = r#"{"sentence": "x", "words": [{"word": "x"}]}"#;
        assert_eq!(recover_batch_json(single).expect("single").items().len(), 1);
    }

    #[test]
    fn truncated_output_is_salvaged_or_reported() {
        let cut = r#"{"batch_results": [{"sentence_index": 1, "words": [{"word": "a"}]}, {"sentence_index": 2, "words": [{"word": "b", "individual_mea"#;
        let r = recover_batch_json(cut).expect("salvaged");
        assert_eq!(r.strategy, RecoveryStrategy::Salvaged);
        assert_eq!(r.items().len(), 1);

        let hopeless = r#"{"batch_results": [{"sentence_index": 1, "words": [{"wo"#;
        assert_eq!(recover_batch_json(hopeless), Err(RecoveryError::Truncated));
        assert!(RecoveryError::Truncated.wants_more_tokens());
    }

    #[test]
    fn explicit_failures() {
        assert_eq!(recover_batch_json("   "), Err(RecoveryError::Empty));
        assert_eq!(
            recover_batch_json("I cannot help with that."),
            Err(RecoveryError::NoJson)
        );
        assert_eq!(
            recover_batch_json(r#"{"answer": 42}"#),
            Err(RecoveryError::WrongShape)
        );
        assert!(matches!(
            recover_batch_json("{ this is : not ] json }"),
            Err(RecoveryError::Malformed(_))
        ));
    }

    #[test]
    fn index_accepts_strings() {
        let item: BatchItem =
            serde_json::from_value(json!({"sentence_index": "3", "words": []})).expect("item");
        assert_eq!(item.index(), Some(3));
    }
}
