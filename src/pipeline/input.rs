use std::path::Path;

use anyhow::{anyhow, Context};

use super::analyzer::SentenceInput;

/// `sentence<TAB>target_word` per line. Blank lines and `#` comments are skipped; the target column
/// is optional.
pub fn parse_sentences_tsv(text: &str) -> anyhow::Result<Vec<SentenceInput>> {
    let mut out = Vec::new();
    for (lineno, line) in text.trim_start_matches('\u{feff}').lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let mut cols = line.split('\t');
        let sentence = cols.next().unwrap_or_default().trim();
        let target = cols.next().unwrap_or_default().trim();
        if cols.next().is_some() {
            return Err(anyhow!(
                "line {}: expected `sentence<TAB>target_word`, found more columns",
                lineno + 1
            ));
        }
        if sentence.is_empty() {
            return Err(anyhow!("line {}: empty sentence", lineno + 1));
        }
        out.push(SentenceInput::new(sentence, target));
    }
    Ok(out)
}

pub fn read_sentences_tsv(path: &Path) -> anyhow::Result<Vec<SentenceInput>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read input: {}", path.display()))?;
    parse_sentences_tsv(&text).with_context(|| format!("parse input: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_and_skips_comments() {
        let rows = parse_sentences_tsv("\u{feff}# deck 1\nYo como pan.\tpan\r\n\nवह जाती है\n")
            .expect("tsv");
        assert_eq!(
            rows,
            vec![
                SentenceInput::new("Yo como pan.", "pan"),
                SentenceInput::new("वह जाती है", ""),
            ]
        );
    }

    #[test]
    fn rejects_extra_columns_and_empty_sentences() {
        let err = parse_sentences_tsv("a\tb\tc\n").expect_err("columns");
        assert!(err.to_string().contains("line 1"));
        assert!(parse_sentences_tsv("ok\n\tword\n").is_err());
    }
}
