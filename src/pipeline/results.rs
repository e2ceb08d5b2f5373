use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::analysis::SentenceAnalysis;
use crate::render::render_sentence;
use crate::taxonomy::{Complexity, LanguageProfile};

use super::analyzer::{BatchOutcome, BatchStats};

pub const RESULTS_SCHEMA: &str = "grammar_lens.results.v1";

#[derive(Clone, Debug, Serialize)]
pub struct ResultsFile {
    #[serde(rename = "schema")]
    pub schema_version: String,
    pub language: String,
    pub level: String,
    pub model: String,
    pub stats: BatchStats,
    pub sentences: Vec<SentenceRecord>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SentenceRecord {
    #[serde(flatten)]
    pub analysis: SentenceAnalysis,
    /// Colored spans ready for the deck.
    pub html: String,
}

#[must_use]
pub fn build_results(
    profile: &LanguageProfile,
    level: Complexity,
    model: &str,
    outcome: &BatchOutcome,
) -> ResultsFile {
    let sentences = outcome
        .analyses
        .iter()
        .map(|a| SentenceRecord {
            analysis: a.clone(),
            html: render_sentence(profile, a).html,
        })
        .collect();
    ResultsFile {
        schema_version: RESULTS_SCHEMA.to_string(),
        language: profile.code.to_string(),
        level: level.as_str().to_string(),
        model: model.to_string(),
        stats: outcome.stats.clone(),
        sentences,
    }
}

pub fn write_results_file(path: &Path, results: &ResultsFile) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(results).context("serialize results")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }
    std::fs::write(path, json).with_context(|| format!("write results: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::ordering::OrderingStrategy;
    use crate::taxonomy::registry;

    #[test]
    fn results_file_carries_schema_stats_and_html() {
        let es = registry().expect("registry").get("es").expect("es");
        let analysis = SentenceAnalysis::fallback(
            "Yo como pan.",
            "pan",
            es,
            &HashMap::new(),
            OrderingStrategy::FirstOccurrence,
        );
        let outcome = BatchOutcome {
            analyses: vec![analysis],
            stats: BatchStats {
                sentences: 1,
                fallback: 1,
                ..BatchStats::default()
            },
        };
        let results = build_results(es, Complexity::Beginner, "replay", &outcome);
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out").join("results.json");
        write_results_file(&path, &results).expect("write");

        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
        assert_eq!(v["schema"], RESULTS_SCHEMA);
        assert_eq!(v["language"], "es");
        assert_eq!(v["stats"]["fallback"], 1);
        let s = &v["sentences"][0];
        assert_eq!(s["status"], "fallback");
        assert_eq!(s["target_word"], "pan");
        assert_eq!(s["words"][0]["role"], "other");
        assert!(s["html"].as_str().expect("html").contains("<span"));
        assert!(s.get("flags").is_none());
    }
}
