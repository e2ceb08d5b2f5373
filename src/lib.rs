//! Word-level grammar analysis of example sentences for language-learning flashcards.
//!
//! A language model is asked for per-word roles and glosses in batches; the replies are recovered,
//! mapped onto each language's closed role taxonomy, put back into reading order, validated, and
//! retried or degraded until every sentence has an analysis.

pub mod analysis;
pub mod classifier;
pub mod config;
pub mod models;
pub mod ordering;
pub mod pipeline;
pub mod progress;
pub mod recovery;
pub mod render;
pub mod taxonomy;
pub mod textutil;
pub mod validator;

pub use analysis::{AnalysisStatus, SentenceAnalysis, WordAnalysis};
pub use pipeline::{AnalyzeError, BatchAnalyzer, BatchOutcome, BatchStats, SentenceInput};
pub use taxonomy::{registry, Complexity, LanguageProfile};
