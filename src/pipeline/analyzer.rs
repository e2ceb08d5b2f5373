use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::analysis::{segment_words, AnalysisStatus, SentenceAnalysis, WordAnalysis};
use crate::classifier::RoleClassifier;
use crate::models::{prompt_fingerprint, ChatModel, ModelRequest};
use crate::ordering::{normalize_order, OrderingStrategy};
use crate::progress::ConsoleProgress;
use crate::recovery::{recover_batch_json, BatchItem, RecoveryStrategy};
use crate::taxonomy::{registry, LanguageProfile, TaxonomyError};
use crate::textutil::{fold, is_lexical, same_sentence};
use crate::validator::{ValidationReport, Validator};

use super::backoff::{CancelToken, Pause, ThreadPause};
use super::config::{AnalyzerSettings, EngineConfig};
use super::prompts::{build_batch_prompt, DEFAULT_BATCH_ANALYSIS_TEXT};
use super::trace::TraceWriter;

/// One sentence to analyse and the word it is meant to teach (may be empty).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentenceInput {
    pub sentence: String,
    pub target_word: String,
}

impl SentenceInput {
    pub fn new(sentence: impl Into<String>, target_word: impl Into<String>) -> Self {
        Self {
            sentence: sentence.into(),
            target_word: target_word.into(),
        }
    }
}

impl From<(&str, &str)> for SentenceInput {
    fn from((sentence, target_word): (&str, &str)) -> Self {
        Self::new(sentence, target_word)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("analysis cancelled")]
    Cancelled,
    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BatchStats {
    pub sentences: usize,
    pub batches: usize,
    pub model_calls: usize,
    pub retries: usize,
    pub validated: usize,
    pub fallback: usize,
    /// Sentences without lexical content; they never reach the model.
    pub skipped: usize,
    pub model_errors: usize,
    pub recovery_failures: usize,
    pub truncated: usize,
    pub strategies: BTreeMap<&'static str, usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub analyses: Vec<SentenceAnalysis>,
    pub stats: BatchStats,
}

enum SlotState {
    Pending,
    AwaitingModel,
    NeedsRetry { flags: Vec<String> },
    Validated(SentenceAnalysis),
    Fallback(SentenceAnalysis),
}

/// Per-sentence progress through the retry loop. Transitions only happen from the state that
/// allows them; anything else is ignored.
struct Slot<'i> {
    input: &'i SentenceInput,
    state: SlotState,
    attempts: u32,
    /// `max_tokens` of the last call this sentence rode in; retries never ask for less.
    last_max_tokens: u32,
    seen_glosses: HashMap<String, String>,
}

impl<'i> Slot<'i> {
    fn new(
        input: &'i SentenceInput,
        profile: &LanguageProfile,
        ordering: OrderingStrategy,
    ) -> Self {
        let mut slot = Self {
            input,
            state: SlotState::Pending,
            attempts: 0,
            last_max_tokens: 0,
            seen_glosses: HashMap::new(),
        };
        let lexical = segment_words(&input.sentence, profile.segmentation)
            .into_iter()
            .any(is_lexical);
        if !lexical {
            let mut a = slot.fallback(profile, ordering);
            a.flags.push("no_lexical_content".to_string());
            slot.state = SlotState::Fallback(a);
        }
        slot
    }

    fn is_open(&self) -> bool {
        matches!(self.state, SlotState::Pending | SlotState::NeedsRetry { .. })
    }

    fn submit(&mut self, max_tokens: u32) {
        if self.is_open() {
            self.state = SlotState::AwaitingModel;
            self.attempts += 1;
            self.last_max_tokens = max_tokens;
        }
    }

    fn accept(&mut self, words: Vec<WordAnalysis>, report: &ValidationReport) {
        if !matches!(self.state, SlotState::AwaitingModel) {
            return;
        }
        self.state = SlotState::Validated(SentenceAnalysis {
            sentence: self.input.sentence.clone(),
            target_word: self.input.target_word.clone(),
            words,
            confidence: report.confidence,
            status: AnalysisStatus::Validated,
            flags: report.soft_flags.clone(),
            attempts: self.attempts,
        });
    }

    fn reject(&mut self, flags: Vec<String>) {
        if matches!(self.state, SlotState::AwaitingModel) {
            self.state = SlotState::NeedsRetry { flags };
        }
    }

    fn remember_glosses(&mut self, words: &[WordAnalysis]) {
        for w in words {
            if !w.gloss.trim().is_empty() && fold(&w.gloss) != fold(&w.word) {
                self.seen_glosses.insert(fold(&w.word), w.gloss.clone());
            }
        }
    }

    fn fallback(&self, profile: &LanguageProfile, ordering: OrderingStrategy) -> SentenceAnalysis {
        let mut a = SentenceAnalysis::fallback(
            &self.input.sentence,
            &self.input.target_word,
            profile,
            &self.seen_glosses,
            ordering,
        );
        a.attempts = self.attempts;
        a
    }

    /// Final analysis; anything not validated by now degrades to the fallback.
    fn finish(mut self, profile: &LanguageProfile, ordering: OrderingStrategy) -> SentenceAnalysis {
        let flags = match std::mem::replace(&mut self.state, SlotState::Pending) {
            SlotState::Validated(a) | SlotState::Fallback(a) => return a,
            SlotState::NeedsRetry { flags } => flags,
            SlotState::Pending | SlotState::AwaitingModel => Vec::new(),
        };
        let mut a = self.fallback(profile, ordering);
        a.flags = flags;
        a
    }
}

/// Drives batched model calls for one language run: prompt, recover, classify, order, validate,
/// retry what failed in smaller batches, fall back when retries run out.
pub struct BatchAnalyzer<M, P = ThreadPause> {
    model: M,
    settings: AnalyzerSettings,
    template: String,
    progress: ConsoleProgress,
    trace: TraceWriter,
    pause: P,
    cancel: CancelToken,
    batch_seq: usize,
}

impl<M: ChatModel> BatchAnalyzer<M, ThreadPause> {
    pub fn new(model: M, settings: AnalyzerSettings) -> Self {
        Self {
            model,
            settings,
            template: DEFAULT_BATCH_ANALYSIS_TEXT.to_string(),
            progress: ConsoleProgress::disabled(),
            trace: TraceWriter::disabled(),
            pause: ThreadPause,
            cancel: CancelToken::new(),
            batch_seq: 0,
        }
    }

    /// Analyzer wired the way the config file and command line asked for.
    pub fn from_config(
        cfg: &EngineConfig,
        model: M,
        progress: ConsoleProgress,
    ) -> anyhow::Result<Self> {
        let trace = TraceWriter::new(cfg.trace_dir.clone(), cfg.trace_prompts)?;
        Ok(Self::new(model, cfg.settings.clone())
            .with_prompt_template(cfg.prompts.batch_analysis.clone())
            .with_progress(progress.with_max_chars(cfg.log_max_chars))
            .with_trace(trace))
    }
}

impl<M: ChatModel, P: Pause> BatchAnalyzer<M, P> {
    #[must_use]
    pub fn with_progress(mut self, progress: ConsoleProgress) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn with_trace(mut self, trace: TraceWriter) -> Self {
        self.trace = trace;
        self
    }

    #[must_use]
    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_pause<Q: Pause>(self, pause: Q) -> BatchAnalyzer<M, Q> {
        BatchAnalyzer {
            model: self.model,
            settings: self.settings,
            template: self.template,
            progress: self.progress,
            trace: self.trace,
            pause,
            cancel: self.cancel,
            batch_seq: self.batch_seq,
        }
    }

    /// Exactly one analysis per input, in input order.
    pub fn analyze(
        &mut self,
        language: &str,
        inputs: &[SentenceInput],
    ) -> Result<Vec<SentenceAnalysis>, AnalyzeError> {
        Ok(self.analyze_with_stats(language, inputs)?.analyses)
    }

    pub fn analyze_with_stats(
        &mut self,
        language: &str,
        inputs: &[SentenceInput],
    ) -> Result<BatchOutcome, AnalyzeError> {
        let profile = registry()?
            .get(language)
            .ok_or_else(|| AnalyzeError::UnsupportedLanguage(language.to_string()))?;
        self.analyze_profile(profile, inputs)
    }

    /// Same as [`Self::analyze_with_stats`] for a profile that is not in the built-in registry.
    pub fn analyze_profile(
        &mut self,
        profile: &LanguageProfile,
        inputs: &[SentenceInput],
    ) -> Result<BatchOutcome, AnalyzeError> {
        let mut stats = BatchStats {
            sentences: inputs.len(),
            ..BatchStats::default()
        };
        let batch_size = self.settings.batch_size.max(1);
        let total = inputs.len().div_ceil(batch_size);
        self.progress.info(format!(
            "Analyze {} sentence(s): language={} level={} batches={total}",
            inputs.len(),
            profile.code,
            self.settings.level.as_str()
        ));

        let mut analyses = Vec::with_capacity(inputs.len());
        for (b, chunk) in inputs.chunks(batch_size).enumerate() {
            stats.batches += 1;
            analyses.extend(self.run_batch(profile, chunk, &mut stats)?);
            self.progress.progress("Batches", b + 1, total);
        }

        for a in &analyses {
            match a.status {
                AnalysisStatus::Validated => stats.validated += 1,
                AnalysisStatus::Fallback => stats.fallback += 1,
                AnalysisStatus::NeedsRetry => {}
            }
        }
        self.progress.info(format!(
            "Done: validated={} fallback={} model_calls={} retries={}",
            stats.validated, stats.fallback, stats.model_calls, stats.retries
        ));
        Ok(BatchOutcome { analyses, stats })
    }

    fn run_batch(
        &mut self,
        profile: &LanguageProfile,
        inputs: &[SentenceInput],
        stats: &mut BatchStats,
    ) -> Result<Vec<SentenceAnalysis>, AnalyzeError> {
        let ordering = self.settings.ordering;
        let mut slots: Vec<Slot> = inputs
            .iter()
            .map(|input| Slot::new(input, profile, ordering))
            .collect();
        stats.skipped += slots.iter().filter(|s| !s.is_open()).count();

        let classifier = RoleClassifier::new(profile, self.settings.level);
        let validator = Validator::new(profile)
            .with_level(self.settings.level)
            .with_weights(self.settings.weights)
            .with_threshold(self.settings.accept_threshold);

        for attempt in 0..=self.settings.max_retries {
            let open: Vec<usize> = slots
                .iter()
                .enumerate()
                .filter(|(_, s)| s.is_open())
                .map(|(i, _)| i)
                .collect();
            if open.is_empty() {
                break;
            }
            if self.cancel.is_cancelled() {
                return Err(AnalyzeError::Cancelled);
            }
            if attempt > 0 {
                stats.retries += 1;
                let delay = self.settings.backoff.delay_for(attempt);
                self.progress.info(format!(
                    "Retry {attempt}/{}: {} sentence(s) after {:.1}s",
                    self.settings.max_retries,
                    open.len(),
                    delay.as_secs_f64()
                ));
                self.pause.pause(delay);
            }

            let chunk_size = self
                .settings
                .batch_size
                .checked_shr(attempt)
                .unwrap_or(0)
                .max(1);
            for group in open.chunks(chunk_size) {
                if self.cancel.is_cancelled() {
                    return Err(AnalyzeError::Cancelled);
                }
                self.call_group(
                    profile,
                    &classifier,
                    &validator,
                    &mut slots,
                    group,
                    attempt,
                    stats,
                );
            }
        }

        Ok(slots
            .into_iter()
            .map(|s| s.finish(profile, ordering))
            .collect())
    }

    #[allow(clippy::too_many_arguments)]
    fn call_group(
        &mut self,
        profile: &LanguageProfile,
        classifier: &RoleClassifier<'_>,
        validator: &Validator<'_>,
        slots: &mut [Slot<'_>],
        group: &[usize],
        attempt: u32,
        stats: &mut BatchStats,
    ) {
        let inputs: Vec<&SentenceInput> = group.iter().map(|&i| slots[i].input).collect();
        let pairs: Vec<(&str, &str)> = inputs
            .iter()
            .map(|s| (s.sentence.as_str(), s.target_word.as_str()))
            .collect();
        let prompt = build_batch_prompt(&self.template, profile, self.settings.level, &pairs);
        let previous = group.iter().map(|&i| slots[i].last_max_tokens).max().unwrap_or(0);
        let tokens = &self.settings.tokens;
        let max_tokens = tokens
            .max_tokens_for(group.len(), attempt)
            .max(tokens.grown_from(previous));
        let req = ModelRequest {
            prompt,
            max_tokens,
            timeout: self.settings.timeouts.timeout_for(max_tokens),
            temperature: self.settings.temperature,
        };
        let fp = prompt_fingerprint(&req.prompt);
        self.batch_seq += 1;
        let seq = self.batch_seq;
        self.trace_text(seq, attempt, &fp, "prompt", &req.prompt);

        for &i in group {
            slots[i].submit(max_tokens);
        }
        stats.model_calls += 1;
        self.progress.info(format!(
            "Model call #{seq} ({}): {} sentence(s), max_tokens={max_tokens}",
            self.model.name(),
            group.len()
        ));

        let reply = match self.model.complete(&req) {
            Ok(r) => r,
            Err(e) => {
                stats.model_errors += 1;
                self.progress.warn(format!("Model call #{seq} failed: {e}"));
                for &i in group {
                    slots[i].reject(vec!["model_error".to_string()]);
                }
                return;
            }
        };
        self.trace_text(seq, attempt, &fp, "response", &reply);

        let recovered = match recover_batch_json(&reply) {
            Ok(r) => r,
            Err(e) => {
                stats.recovery_failures += 1;
                if e.wants_more_tokens() {
                    stats.truncated += 1;
                }
                self.progress.warn(format!(
                    "Model call #{seq}: {e}; response head: {}",
                    self.progress.clip(&reply)
                ));
                for &i in group {
                    slots[i].reject(vec![format!("recovery:{}", recovery_flag(&e))]);
                }
                return;
            }
        };
        *stats.strategies.entry(recovered.strategy.as_str()).or_insert(0) += 1;
        if recovered.strategy != RecoveryStrategy::Direct {
            self.progress.info(format!(
                "Model call #{seq}: recovered JSON via {}",
                recovered.strategy.as_str()
            ));
        }

        let items = recovered.items();
        let matched = match_items(&inputs, &items);
        let mut log = format!("RECOVERY: {}\n\n", recovered.strategy.as_str());
        for (pos, &i) in group.iter().enumerate() {
            log.push_str(&format!("[{}] {}\n", pos + 1, inputs[pos].sentence));
            let Some(item) = matched[pos] else {
                log.push_str("VALIDATION:\n- no result for this sentence\n\n");
                slots[i].reject(vec!["no_result".to_string()]);
                continue;
            };
            let words = candidate_words(
                classifier,
                item,
                &inputs[pos].sentence,
                self.settings.ordering,
            );
            let report = validator.check(&inputs[pos].sentence, &inputs[pos].target_word, &words);
            log.push_str(&report.render_block());
            log.push('\n');
            slots[i].remember_glosses(&words);
            if report.is_valid(validator.threshold()) {
                slots[i].accept(words, &report);
            } else {
                slots[i].reject(report.flags());
            }
        }
        self.trace_text(seq, attempt, &fp, "validation", &log);
    }

    fn trace_text(&self, seq: usize, attempt: u32, fp: &str, kind: &str, text: &str) {
        if let Err(e) = self.trace.write_batch_text(seq, attempt, fp, kind, text) {
            self.progress.warn(format!("trace: {e:#}"));
        }
    }
}

fn recovery_flag(e: &crate::recovery::RecoveryError) -> &'static str {
    use crate::recovery::RecoveryError;
    match e {
        RecoveryError::Empty => "empty",
        RecoveryError::Truncated => "truncated",
        RecoveryError::NoJson => "no_json",
        RecoveryError::WrongShape => "wrong_shape",
        RecoveryError::Malformed(_) => "malformed",
    }
}

/// Classified and reordered words of one model item.
fn candidate_words(
    classifier: &RoleClassifier<'_>,
    item: &BatchItem,
    sentence: &str,
    ordering: OrderingStrategy,
) -> Vec<WordAnalysis> {
    let mut words: Vec<WordAnalysis> = item
        .words
        .iter()
        .filter(|w| !w.word.trim().is_empty())
        .map(|w| {
            WordAnalysis::new(
                &w.word,
                &w.individual_meaning,
                classifier.classify(&w.grammatical_role),
                &w.grammatical_role,
            )
        })
        .collect();
    normalize_order(sentence, &mut words, ordering);
    words
}

/// Pairs model items with the prompt's sentences: by 1-based index when the echoed sentence agrees,
/// otherwise by sentence text. An item with neither index nor sentence is taken positionally when
/// the item count matches.
fn match_items<'a>(
    inputs: &[&SentenceInput],
    items: &'a [BatchItem],
) -> Vec<Option<&'a BatchItem>> {
    let mut out: Vec<Option<&BatchItem>> = vec![None; inputs.len()];
    let mut leftovers: Vec<(usize, &BatchItem)> = Vec::new();
    for (pos, item) in items.iter().enumerate() {
        let by_index = item
            .index()
            .filter(|i| (1..=inputs.len()).contains(i))
            .map(|i| i - 1)
            .filter(|&p| out[p].is_none())
            .filter(|&p| {
                item.sentence.trim().is_empty()
                    || same_sentence(&item.sentence, &inputs[p].sentence)
            });
        match by_index {
            Some(p) => out[p] = Some(item),
            None => leftovers.push((pos, item)),
        }
    }
    for (pos, item) in leftovers {
        if item.sentence.trim().is_empty() {
            if item.index().is_none() && items.len() == inputs.len() && out[pos].is_none() {
                out[pos] = Some(item);
            }
            continue;
        }
        if let Some(p) = (0..inputs.len())
            .find(|&p| out[p].is_none() && same_sentence(&item.sentence, &inputs[p].sentence))
        {
            out[p] = Some(item);
        }
    }
    out
}
