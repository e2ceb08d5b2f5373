use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::validator::ScoreWeights;

pub const DEFAULT_CONFIG_FILE: &str = "grammar-lens.toml";
pub const CONFIG_ENV_VAR: &str = "GRAMMAR_LENS_CONFIG";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub model: ModelSection,
    #[serde(default)]
    pub prompts: PromptsSection,
    #[serde(default)]
    pub weights: ScoreWeights,
}

/// Every field is optional; unset values fall back to the engine defaults.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct EngineSection {
    #[serde(default)]
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub max_retries: Option<u32>,

    #[serde(default)]
    pub backoff_initial_ms: Option<u64>,
    #[serde(default)]
    pub backoff_max_ms: Option<u64>,
    #[serde(default)]
    pub backoff_factor: Option<f64>,

    #[serde(default)]
    pub accept_threshold: Option<f64>,
    /// "beginner", "intermediate" or "advanced".
    #[serde(default)]
    pub complexity: Option<String>,
    /// "first_occurrence" or "incremental".
    #[serde(default)]
    pub ordering: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,

    #[serde(default)]
    pub per_sentence_tokens: Option<u32>,
    #[serde(default)]
    pub min_max_tokens: Option<u32>,
    #[serde(default)]
    pub max_max_tokens: Option<u32>,
    #[serde(default)]
    pub retry_token_growth: Option<f64>,

    #[serde(default)]
    pub base_timeout_secs: Option<u64>,
    #[serde(default)]
    pub min_tokens_per_sec: Option<u32>,

    #[serde(default)]
    pub trace_dir: Option<String>,
    #[serde(default)]
    pub trace_prompts: Option<bool>,
    #[serde(default)]
    pub log_max_chars: Option<usize>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ModelSection {
    /// "command" (default) or "replay".
    #[serde(default)]
    pub backend: Option<String>,
    /// argv of the external model command; the prompt is written to its stdin.
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default)]
    pub replay_dir: Option<PathBuf>,
    /// When set, live replies are also stored here in replay layout.
    #[serde(default)]
    pub record_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct PromptsSection {
    #[serde(default)]
    pub batch_analysis: Option<String>,
}

/// Config file from the current directory, `workdir` or the executable's directory, each searched
/// upwards.
pub fn find_default_config(workdir: &Path, filename: &str) -> Option<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(p) = find_file_upwards(&cwd, filename, 8) {
            return Some(p);
        }
    }
    if let Some(p) = find_file_upwards(workdir, filename, 8) {
        return Some(p);
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            if let Some(p) = find_file_upwards(dir, filename, 10) {
                return Some(p);
            }
        }
    }
    None
}

pub fn find_file_upwards(start_dir: &Path, filename: &str, max_levels: usize) -> Option<PathBuf> {
    let mut dir = start_dir;
    for _ in 0..=max_levels {
        let candidate = dir.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
    None
}

pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    parse_config(&text)
}

pub fn parse_config(text: &str) -> anyhow::Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(text).context("parse config toml")?;
    Ok(cfg)
}

/// `rel` resolved against the directory holding `config_path` unless already absolute.
#[must_use]
pub fn resolve_relative(config_path: &Path, rel: &Path) -> PathBuf {
    if rel.is_absolute() {
        return rel.to_path_buf();
    }
    config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(rel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_are_optional() {
        let cfg = parse_config("").expect("empty config");
        assert!(cfg.engine.batch_size.is_none());
        assert!(cfg.model.command.is_empty());
        assert_eq!(cfg.weights, ScoreWeights::default());
    }

    #[test]
    fn parses_all_sections() {
        let cfg = parse_config(
            r#"
[engine]
batch_size = 8
ordering = "incremental"
backoff_factor = 3.0

[model]
backend = "replay"
command = ["llm", "--json"]
replay_dir = "replies"

[prompts]
batch_analysis = "prompts/custom.txt"

[weights]
coverage = 0.5
"#,
        )
        .expect("config");
        assert_eq!(cfg.engine.batch_size, Some(8));
        assert_eq!(cfg.engine.ordering.as_deref(), Some("incremental"));
        assert_eq!(cfg.model.command, vec!["llm".to_string(), "--json".to_string()]);
        assert_eq!(cfg.prompts.batch_analysis.as_deref(), Some("prompts/custom.txt"));
        assert_eq!(cfg.weights.coverage, 0.5);
        assert_eq!(cfg.weights.script, ScoreWeights::default().script);
    }

    #[test]
    fn unknown_types_are_errors() {
        assert!(parse_config("[engine]\nbatch_size = \"many\"\n").is_err());
    }

    #[test]
    fn finds_config_in_parent_directories() {
        let root = tempfile::tempdir().expect("tempdir");
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).expect("mkdir");
        std::fs::write(root.path().join(DEFAULT_CONFIG_FILE), "").expect("write");
        let found = find_file_upwards(&nested, DEFAULT_CONFIG_FILE, 4).expect("found");
        assert_eq!(found, root.path().join(DEFAULT_CONFIG_FILE));
        assert!(find_file_upwards(&nested, DEFAULT_CONFIG_FILE, 1).is_none());
    }

    #[test]
    fn relative_paths_follow_the_config_file() {
        let cfg = Path::new("/etc/gl/grammar-lens.toml");
        assert_eq!(
            resolve_relative(cfg, Path::new("prompts/a.txt")),
            PathBuf::from("/etc/gl/prompts/a.txt")
        );
        assert_eq!(resolve_relative(cfg, Path::new("/abs")), PathBuf::from("/abs"));
    }
}
