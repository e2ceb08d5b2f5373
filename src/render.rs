use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;

use crate::analysis::{AnalysisStatus, SentenceAnalysis, WordAnalysis};
use crate::taxonomy::{Complexity, LanguageProfile, Segmentation};

/// What deck packaging consumes for one sentence.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedSentence {
    pub html: String,
    pub confidence: f64,
    pub status: AnalysisStatus,
}

/// One inline-styled span; the role and gloss ride along in `title`.
#[must_use]
pub fn render_word(word: &WordAnalysis) -> String {
    let title = if word.gloss.is_empty() {
        word.role.replace('_', " ")
    } else {
        format!("{}: {}", word.role.replace('_', " "), word.gloss)
    };
    format!(
        r#"<span style="color: {color}; font-weight: bold;" title="{title}">{text}</span>"#,
        color = word.color,
        title = encode_double_quoted_attribute(&title),
        text = encode_text(&word.word),
    )
}

/// Spans in storage order. RTL languages get an isolating `dir="rtl"` wrapper so the browser lays
/// the same order out right to left.
#[must_use]
pub fn render_sentence(profile: &LanguageProfile, analysis: &SentenceAnalysis) -> RenderedSentence {
    let sep = match profile.segmentation {
        Segmentation::Whitespace => " ",
        Segmentation::Character => "",
    };
    let spans: Vec<String> = analysis.words.iter().map(render_word).collect();
    let joined = spans.join(sep);
    let html = if profile.is_rtl() {
        format!(
            r#"<span dir="rtl" style="direction: rtl; unicode-bidi: isolate;">{joined}</span>"#
        )
    } else {
        joined
    };
    RenderedSentence {
        html,
        confidence: analysis.confidence,
        status: analysis.status,
    }
}

/// Left-to-right on-screen order of the words.
#[must_use]
pub fn visual_order<'w>(
    profile: &LanguageProfile,
    words: &'w [WordAnalysis],
) -> Vec<&'w WordAnalysis> {
    let mut out: Vec<&WordAnalysis> = words.iter().collect();
    if profile.is_rtl() {
        out.reverse();
    }
    out
}

/// Colored label per tag taught at `level`, catch-all last.
#[must_use]
pub fn render_legend(profile: &LanguageProfile, level: Complexity) -> String {
    profile
        .eligible_tags(level)
        .map(|t| {
            format!(
                r#"<span style="background-color: {}; color: #ffffff; padding: 0 4px; border-radius: 3px;">{}</span>"#,
                t.color,
                encode_text(&t.id.replace('_', " "))
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Self-contained page for eyeballing a run.
#[must_use]
pub fn render_preview_page(
    profile: &LanguageProfile,
    level: Complexity,
    analyses: &[SentenceAnalysis],
) -> String {
    let mut html = String::new();
    html.push_str(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8" />
<title>grammar-lens preview</title>
</head>
<body style="font-family: system-ui, sans-serif; margin: 20px;">
"#,
    );
    html.push_str(&format!(
        "<h1 style=\"font-size: 1.2em;\">{} ({})</h1>\n<p>{}</p>\n",
        encode_text(profile.name),
        profile.code,
        render_legend(profile, level)
    ));
    html.push_str("<table style=\"border-collapse: collapse; width: 100%;\">\n");
    for (i, a) in analyses.iter().enumerate() {
        let rendered = render_sentence(profile, a);
        html.push_str(&format!(
            "<tr><td style=\"padding: 6px 8px; color: #888888;\">{}</td><td style=\"padding: 6px 8px; font-size: 1.4em;\">{}</td><td style=\"padding: 6px 8px;\">{}</td><td style=\"padding: 6px 8px;\">{:.2}</td></tr>\n",
            i + 1,
            rendered.html,
            a.status.as_str(),
            rendered.confidence
        ));
    }
    html.push_str("</table>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::registry;

    fn word(text: &str, gloss: &str, role: &'static str, color: &'static str) -> WordAnalysis {
        WordAnalysis {
            word: text.to_string(),
            gloss: gloss.to_string(),
            role,
            color,
            raw_role: String::new(),
            offset: None,
        }
    }

    fn sentence(words: Vec<WordAnalysis>) -> SentenceAnalysis {
        SentenceAnalysis {
            sentence: String::new(),
            target_word: String::new(),
            words,
            confidence: 0.9,
            status: AnalysisStatus::Validated,
            flags: Vec::new(),
            attempts: 1,
        }
    }

    #[test]
    fn word_span_is_escaped_and_inline_styled() {
        let html = render_word(&word("<b>", "a \"tag\"", "noun", "#2e86c1"));
        assert_eq!(
            html,
            r#"<span style="color: #2e86c1; font-weight: bold;" title="noun: a &quot;tag&quot;">&lt;b&gt;</span>"#
        );
        assert!(!html.contains("class="));
    }

    #[test]
    fn ltr_sentence_has_no_direction_wrapper() {
        let es = registry().expect("registry").get("es").expect("es");
        let r = render_sentence(
            es,
            &sentence(vec![
                word("Yo", "I", "personal_pronoun", "#9b59b6"),
                word("como", "eat", "verb", "#c0392b"),
            ]),
        );
        assert!(!r.html.contains("dir="));
        assert_eq!(r.html.matches("<span").count(), 2);
        assert!(r.html.find("Yo").expect("Yo") < r.html.find("como").expect("como"));
        assert_eq!(r.status, AnalysisStatus::Validated);
    }

    #[test]
    fn rtl_sentence_keeps_storage_order_inside_isolate() {
        let ar = registry().expect("registry").get("ar").expect("ar");
        let words = vec![
            word("أنا", "I", "personal_pronoun", "#9b59b6"),
            word("أقرأ", "read", "verb", "#c0392b"),
        ];
        let r = render_sentence(ar, &sentence(words.clone()));
        assert!(r.html.starts_with(r#"<span dir="rtl""#));
        assert!(r.html.find("أنا").expect("first") < r.html.find("أقرأ").expect("second"));

        let visual: Vec<&str> = visual_order(ar, &words)
            .iter()
            .map(|w| w.word.as_str())
            .collect();
        assert_eq!(visual, vec!["أقرأ", "أنا"]);
    }

    #[test]
    fn legend_follows_level() {
        let hi = registry().expect("registry").get("hi").expect("hi");
        let beginner = render_legend(hi, Complexity::Beginner);
        let advanced = render_legend(hi, Complexity::Advanced);
        assert!(!beginner.contains("light verb"));
        assert!(advanced.contains("light verb"));
        assert!(beginner.ends_with(">other</span>"));
    }

    #[test]
    fn chinese_spans_are_not_space_separated() {
        let zh = registry().expect("registry").get("zh").expect("zh");
        let r = render_sentence(
            zh,
            &sentence(vec![
                word("我", "I", "pronoun", "#8e44ad"),
                word("好", "good", "adjective", "#27ae60"),
            ]),
        );
        assert!(r.html.contains("</span><span"));
    }
}
