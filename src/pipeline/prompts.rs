use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};

use crate::config::AppConfig;
use crate::taxonomy::{Complexity, LanguageProfile, Segmentation};

pub const DEFAULT_PROMPTS_DIR: &str = "prompts";
pub const DEFAULT_BATCH_ANALYSIS: &str = "batch_analysis.txt";

#[derive(Clone, Debug)]
pub struct PromptSet {
    pub batch_analysis: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            batch_analysis: DEFAULT_BATCH_ANALYSIS_TEXT.to_string(),
        }
    }
}

impl PromptSet {
    /// Templates named in `[prompts]`, relative to the config file. A key that is not configured
    /// keeps the built-in template; a configured file that is missing is an error.
    pub fn load(config_path: &Path, cfg: &AppConfig) -> anyhow::Result<Self> {
        let config_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
        let mut set = Self::default();
        if let Some(rel) = cfg.prompts.batch_analysis.as_deref() {
            set.batch_analysis = read_prompt(config_dir, "batch_analysis", rel)?;
        }
        Ok(set)
    }
}

fn read_prompt(config_dir: &Path, key: &str, rel: &str) -> anyhow::Result<String> {
    let mut p = PathBuf::from(rel.trim());
    if p.is_relative() {
        p = config_dir.join(&p);
    }
    if !p.exists() {
        return Err(anyhow!(
            "prompt file not found for {key}: {} (run: grammar-lens --init-config)",
            p.display()
        ));
    }
    let text =
        std::fs::read_to_string(&p).with_context(|| format!("read prompt: {}", p.display()))?;
    if text.trim().is_empty() {
        return Err(anyhow!("prompt file is empty for {key}: {}", p.display()));
    }
    Ok(text)
}

pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (k, v) in vars {
        let pat = format!("{{{{{k}}}}}");
        out = out.replace(&pat, v);
    }
    out
}

pub fn default_prompt_files() -> Vec<(&'static str, &'static str)> {
    vec![(DEFAULT_BATCH_ANALYSIS, DEFAULT_BATCH_ANALYSIS_TEXT)]
}

/// One numbered entry per sentence, numbering starts at 1.
#[must_use]
pub fn sentence_block(sentences: &[(&str, &str)]) -> String {
    let mut out = String::new();
    for (i, (sentence, target)) in sentences.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, sentence.trim()));
        if !target.trim().is_empty() {
            out.push_str(&format!("   target word: {}\n", target.trim()));
        }
    }
    out
}

/// Fills the batch template for one model call.
#[must_use]
pub fn build_batch_prompt(
    template: &str,
    profile: &LanguageProfile,
    level: Complexity,
    sentences: &[(&str, &str)],
) -> String {
    let roles: Vec<&str> = profile.eligible_tags(level).map(|t| t.id).collect();
    let reading_order = if profile.is_rtl() {
        "List words in the order they are written in the sentence (first written word first, right to left as read)."
    } else {
        "List words in the order they appear in the sentence."
    };
    let units = match profile.segmentation {
        Segmentation::Whitespace => "Analyse every word; split attached clitics into their own entries when they carry a separate role.",
        Segmentation::Character => "The text has no spaces: split it into words yourself and analyse every word; do not skip any character.",
    };
    render_template(
        template,
        &[
            ("language_name", profile.name),
            ("language_code", profile.code),
            ("level", level.as_str()),
            ("role_list", &roles.join(", ")),
            ("reading_order", reading_order),
            ("units", units),
            ("count", &sentences.len().to_string()),
            ("sentences", sentence_block(sentences).trim_end()),
        ],
    )
}

pub const DEFAULT_BATCH_ANALYSIS_TEXT: &str = r#"You are a grammar tutor for {{language_name}} ({{language_code}}) learners at {{level}} level.
Analyse each of the {{count}} sentences below word by word.

Rules:
- {{units}}
- {{reading_order}}
- Copy each word exactly as written in the sentence (same script, same spelling).
- individual_meaning: a short English gloss of the word in this sentence, with grammatical context in parentheses when useful.
- grammatical_role: exactly one of: {{role_list}}
- Use lowercase underscore_separated role names only.
- Return STRICT JSON only (one JSON object). No markdown. No extra text.

Schema:
{"batch_results":[{"sentence_index":1,"sentence":"...","words":[{"word":"...","individual_meaning":"...","grammatical_role":"..."}]}]}

SENTENCES:
{{sentences}}"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::taxonomy::registry;

    #[test]
    fn template_variables_are_replaced() {
        assert_eq!(render_template("{{a}}-{{b}}-{{a}}", &[("a", "x"), ("b", "y")]), "x-y-x");
        assert_eq!(render_template("{{missing}}", &[]), "{{missing}}");
    }

    #[test]
    fn batch_prompt_lists_roles_for_the_level_and_numbers_sentences() {
        let hi = registry().expect("registry").get("hi").expect("hi");
        let prompt = build_batch_prompt(
            DEFAULT_BATCH_ANALYSIS_TEXT,
            hi,
            Complexity::Beginner,
            &[("मैं खाता हूं", "खाता"), ("वह जाती है", "")],
        );
        assert!(!prompt.contains("{{"));
        assert!(prompt.contains("1. मैं खाता हूं\n   target word: खाता\n2. वह जाती है"));
        assert!(prompt.contains("personal_pronoun") || prompt.contains("pronoun"));
        assert!(!prompt.contains("light_verb"));
        assert!(prompt.contains("\"batch_results\""));
    }

    #[test]
    fn rtl_prompt_explains_reading_order() {
        let ar = registry().expect("registry").get("ar").expect("ar");
        let prompt = build_batch_prompt(
            DEFAULT_BATCH_ANALYSIS_TEXT,
            ar,
            Complexity::Advanced,
            &[("أنا أقرأ", "")],
        );
        assert!(prompt.contains("right to left"));
    }

    #[test]
    fn configured_prompt_file_overrides_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("prompts")).expect("mkdir");
        std::fs::write(dir.path().join("prompts/mine.txt"), "custom {{sentences}}").expect("write");
        let cfg = parse_config("[prompts]\nbatch_analysis = \"prompts/mine.txt\"\n").expect("cfg");
        let set = PromptSet::load(&dir.path().join("grammar-lens.toml"), &cfg).expect("load");
        assert_eq!(set.batch_analysis, "custom {{sentences}}");

        let cfg = parse_config("[prompts]\nbatch_analysis = \"prompts/nope.txt\"\n").expect("cfg");
        let err =
            PromptSet::load(&dir.path().join("grammar-lens.toml"), &cfg).expect_err("missing");
        assert!(err.to_string().contains("--init-config"));

        let set = PromptSet::load(&dir.path().join("grammar-lens.toml"), &AppConfig::default())
            .expect("default");
        assert_eq!(set.batch_analysis, DEFAULT_BATCH_ANALYSIS_TEXT);
    }
}
