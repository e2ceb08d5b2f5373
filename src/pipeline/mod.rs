mod analyzer;
pub mod backoff;
mod config;
mod input;
pub mod prompts;
mod results;
mod trace;

pub use analyzer::{AnalyzeError, BatchAnalyzer, BatchOutcome, BatchStats, SentenceInput};
pub use backoff::{BackoffPolicy, CancelToken, Pause, ThreadPause};
pub use config::{
    init_default_config, AnalyzerSettings, CliOverrides, EngineConfig, ModelBackend, TimeoutPolicy,
    TokenBudget,
};
pub use input::{parse_sentences_tsv, read_sentences_tsv};
pub use results::{build_results, write_results_file, ResultsFile, SentenceRecord, RESULTS_SCHEMA};
pub use trace::TraceWriter;
