use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context};

use crate::config::{
    find_default_config, load_config, resolve_relative, AppConfig, EngineSection, CONFIG_ENV_VAR,
    DEFAULT_CONFIG_FILE,
};
use crate::models::{ChatModel, CommandModel, RecordingModel, ReplayModel};
use crate::ordering::OrderingStrategy;
use crate::pipeline::backoff::BackoffPolicy;
use crate::pipeline::prompts::{default_prompt_files, PromptSet, DEFAULT_PROMPTS_DIR};
use crate::taxonomy::Complexity;
use crate::validator::{ScoreWeights, ACCEPT_THRESHOLD};

/// `max_tokens` for a model call, growing with the number of sentences and with each retry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TokenBudget {
    pub per_sentence: u32,
    pub min: u32,
    pub max: u32,
    pub growth: f64,
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self {
            per_sentence: 400,
            min: 1024,
            max: 16384,
            growth: 1.5,
        }
    }
}

impl TokenBudget {
    #[must_use]
    pub fn max_tokens_for(&self, sentences: usize, attempt: u32) -> u32 {
        let lo = self.min.min(self.max);
        let base = u64::from(self.per_sentence)
            .saturating_mul(sentences as u64)
            .clamp(u64::from(lo), u64::from(self.max)) as f64;
        let growth = if self.growth.is_finite() && self.growth >= 1.0 {
            self.growth
        } else {
            1.0
        };
        let grown = base * growth.powi(i32::try_from(attempt).unwrap_or(i32::MAX));
        if !grown.is_finite() || grown >= f64::from(u32::MAX) {
            return u32::MAX;
        }
        grown.round() as u32
    }

    /// One growth step above a previous call's budget; 0 stays 0.
    #[must_use]
    pub fn grown_from(&self, previous: u32) -> u32 {
        let growth = if self.growth.is_finite() && self.growth > 1.0 {
            self.growth
        } else {
            1.0
        };
        let grown = (f64::from(previous) * growth).ceil();
        if grown >= f64::from(u32::MAX) {
            return u32::MAX;
        }
        (grown as u32).max(previous)
    }
}

/// A call gets at least `base`, more when the requested output would take longer to generate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeoutPolicy {
    pub base: Duration,
    pub min_tokens_per_sec: u32,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(60),
            min_tokens_per_sec: 20,
        }
    }
}

impl TimeoutPolicy {
    #[must_use]
    pub fn timeout_for(&self, max_tokens: u32) -> Duration {
        let tps = self.min_tokens_per_sec.max(1);
        let implied = Duration::from_secs_f64(f64::from(max_tokens) / f64::from(tps));
        self.base.max(implied)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnalyzerSettings {
    pub batch_size: usize,
    pub max_retries: u32,
    pub backoff: BackoffPolicy,
    pub accept_threshold: f64,
    pub level: Complexity,
    pub ordering: OrderingStrategy,
    pub temperature: f32,
    pub tokens: TokenBudget,
    pub timeouts: TimeoutPolicy,
    pub weights: ScoreWeights,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            batch_size: 16,
            max_retries: 2,
            backoff: BackoffPolicy::default(),
            accept_threshold: ACCEPT_THRESHOLD,
            level: Complexity::default(),
            ordering: OrderingStrategy::FirstOccurrence,
            temperature: 0.2,
            tokens: TokenBudget::default(),
            timeouts: TimeoutPolicy::default(),
            weights: ScoreWeights::default(),
        }
    }
}

impl AnalyzerSettings {
    /// Defaults overlaid with whatever `[engine]` sets.
    pub fn from_section(engine: &EngineSection, weights: ScoreWeights) -> anyhow::Result<Self> {
        let d = Self::default();
        let level = match engine.complexity.as_deref() {
            Some(s) => {
                Complexity::parse(s).ok_or_else(|| anyhow!("unknown complexity level: {s}"))?
            }
            None => d.level,
        };
        let ordering = match engine.ordering.as_deref() {
            Some(s) => OrderingStrategy::parse(s)
                .ok_or_else(|| anyhow!("unknown ordering strategy: {s}"))?,
            None => d.ordering,
        };
        let backoff = BackoffPolicy {
            initial: engine
                .backoff_initial_ms
                .map(Duration::from_millis)
                .unwrap_or(d.backoff.initial),
            max: engine
                .backoff_max_ms
                .map(Duration::from_millis)
                .unwrap_or(d.backoff.max),
            factor: engine.backoff_factor.unwrap_or(d.backoff.factor),
        };
        let tokens = TokenBudget {
            per_sentence: engine.per_sentence_tokens.unwrap_or(d.tokens.per_sentence),
            min: engine.min_max_tokens.unwrap_or(d.tokens.min),
            max: engine.max_max_tokens.unwrap_or(d.tokens.max),
            growth: engine.retry_token_growth.unwrap_or(d.tokens.growth),
        };
        let timeouts = TimeoutPolicy {
            base: engine
                .base_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(d.timeouts.base),
            min_tokens_per_sec: engine.min_tokens_per_sec.unwrap_or(d.timeouts.min_tokens_per_sec),
        };
        Ok(Self {
            batch_size: engine.batch_size.unwrap_or(d.batch_size).max(1),
            max_retries: engine.max_retries.unwrap_or(d.max_retries),
            backoff,
            accept_threshold: engine
                .accept_threshold
                .unwrap_or(d.accept_threshold)
                .clamp(0.0, 1.0),
            level,
            ordering,
            temperature: engine.temperature.unwrap_or(d.temperature),
            tokens,
            timeouts,
            weights,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ModelBackend {
    Command {
        argv: Vec<String>,
        record_dir: Option<PathBuf>,
    },
    Replay {
        dir: PathBuf,
    },
}

impl ModelBackend {
    pub fn open(&self) -> anyhow::Result<Box<dyn ChatModel>> {
        match self {
            ModelBackend::Command { argv, record_dir } => {
                let live = CommandModel::new(argv).context("model command")?;
                match record_dir {
                    Some(dir) => {
                        let rec = RecordingModel::new(live, dir.clone())
                            .with_context(|| format!("create record dir: {}", dir.display()))?;
                        Ok(Box::new(rec))
                    }
                    None => Ok(Box::new(live)),
                }
            }
            ModelBackend::Replay { dir } => {
                if !dir.is_dir() {
                    return Err(anyhow!("replay dir not found: {}", dir.display()));
                }
                Ok(Box::new(ReplayModel::new(dir.clone())))
            }
        }
    }
}

/// Command-line values that win over the config file.
#[derive(Clone, Debug, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub level: Option<String>,
    pub ordering: Option<String>,
    pub batch_size: Option<usize>,
    pub max_retries: Option<u32>,
    pub model_command: Option<Vec<String>>,
    pub replay_dir: Option<PathBuf>,
    pub record_dir: Option<PathBuf>,
    pub trace_dir: Option<PathBuf>,
    pub no_trace: bool,
}

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub workdir: PathBuf,
    pub config_path: PathBuf,
    pub settings: AnalyzerSettings,
    pub model: ModelBackend,
    pub trace_dir: PathBuf,
    pub trace_prompts: bool,
    pub log_max_chars: usize,
    pub prompts: PromptSet,
}

impl EngineConfig {
    pub fn from_paths_and_args(
        input: &Path,
        output: &Path,
        overrides: CliOverrides,
    ) -> anyhow::Result<Self> {
        let workdir = input
            .parent()
            .map(|p| p.to_path_buf())
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from("."));
        let workdir = workdir.canonicalize().unwrap_or(workdir);

        let cfg_file = overrides
            .config_path
            .clone()
            .or_else(|| std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from))
            .or_else(|| find_default_config(&workdir, DEFAULT_CONFIG_FILE));

        let mut file_cfg = AppConfig::default();
        if let Some(p) = cfg_file.as_ref() {
            if p.exists() {
                file_cfg = load_config(p)?;
            } else if overrides.config_path.is_some() {
                return Err(anyhow!("config not found: {}", p.display()));
            }
        }
        let cfg_path = cfg_file.unwrap_or_else(|| workdir.join(DEFAULT_CONFIG_FILE));

        let mut engine = file_cfg.engine.clone();
        if let Some(level) = overrides.level.clone() {
            engine.complexity = Some(level);
        }
        if let Some(ordering) = overrides.ordering.clone() {
            engine.ordering = Some(ordering);
        }
        if overrides.batch_size.is_some() {
            engine.batch_size = overrides.batch_size;
        }
        if overrides.max_retries.is_some() {
            engine.max_retries = overrides.max_retries;
        }
        let settings = AnalyzerSettings::from_section(&engine, file_cfg.weights)
            .with_context(|| format!("engine settings (config={})", cfg_path.display()))?;

        let model = resolve_model(&file_cfg, &cfg_path, &overrides)?;

        let output_dir = output
            .parent()
            .map(|p| p.to_path_buf())
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| workdir.clone());
        let trace_dir = match overrides.trace_dir.clone() {
            Some(p) => p,
            None => {
                let rel = engine.trace_dir.clone().unwrap_or_else(|| "_trace".to_string());
                if Path::new(&rel).is_absolute() {
                    PathBuf::from(rel)
                } else {
                    output_dir.join(rel)
                }
            }
        };
        let trace_prompts = !overrides.no_trace && engine.trace_prompts.unwrap_or(true);
        let log_max_chars = engine.log_max_chars.unwrap_or(240);

        let prompts = PromptSet::load(&cfg_path, &file_cfg).context("load prompts")?;

        Ok(Self {
            workdir,
            config_path: cfg_path,
            settings,
            model,
            trace_dir,
            trace_prompts,
            log_max_chars,
            prompts,
        })
    }
}

fn resolve_model(
    cfg: &AppConfig,
    cfg_path: &Path,
    overrides: &CliOverrides,
) -> anyhow::Result<ModelBackend> {
    if let Some(dir) = overrides.replay_dir.clone() {
        return Ok(ModelBackend::Replay { dir });
    }
    let record_dir = overrides
        .record_dir
        .clone()
        .or_else(|| cfg.model.record_dir.as_ref().map(|p| resolve_relative(cfg_path, p)));
    if let Some(argv) = overrides.model_command.clone() {
        return Ok(ModelBackend::Command { argv, record_dir });
    }
    match cfg
        .model
        .backend
        .as_deref()
        .unwrap_or("command")
        .trim()
        .to_ascii_lowercase()
        .as_str()
    {
        "replay" => {
            let dir = cfg
                .model
                .replay_dir
                .as_ref()
                .map(|p| resolve_relative(cfg_path, p))
                .ok_or_else(|| {
                    anyhow!(
                        "[model] backend = \"replay\" needs replay_dir (config={})",
                        cfg_path.display()
                    )
                })?;
            Ok(ModelBackend::Replay { dir })
        }
        "command" => {
            if cfg.model.command.is_empty() {
                return Err(anyhow!(
                    "no model command configured: set [model] command in {} or pass --model-cmd",
                    cfg_path.display()
                ));
            }
            Ok(ModelBackend::Command {
                argv: cfg.model.command.clone(),
                record_dir,
            })
        }
        other => Err(anyhow!("unknown model backend: {other}")),
    }
}

pub fn init_default_config(dir: &Path, force: bool) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create config dir: {}", dir.display()))?;
    let cfg_path = dir.join(DEFAULT_CONFIG_FILE);

    let prompts_dir = dir.join(DEFAULT_PROMPTS_DIR);
    std::fs::create_dir_all(&prompts_dir)
        .with_context(|| format!("create prompts dir: {}", prompts_dir.display()))?;

    for (fname, body) in default_prompt_files() {
        let p = prompts_dir.join(fname);
        if p.exists() && !force {
            continue;
        }
        std::fs::write(&p, body).with_context(|| format!("write prompt: {}", p.display()))?;
    }

    if cfg_path.exists() && !force {
        return Ok(cfg_path);
    }
    std::fs::write(&cfg_path, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("write config: {}", cfg_path.display()))?;
    Ok(cfg_path)
}

const DEFAULT_CONFIG_TOML: &str = r#"[engine]
batch_size = 16
max_retries = 2

# Exponential backoff between retries: 1s, 2s, 4s ... capped.
backoff_initial_ms = 1000
backoff_max_ms = 30000
backoff_factor = 2.0

accept_threshold = 0.85
complexity = "intermediate"
# "first_occurrence" or "incremental" (repeated words take successive positions).
ordering = "first_occurrence"
temperature = 0.2

# max_tokens = clamp(per_sentence_tokens * sentences, min_max_tokens, max_max_tokens) * retry_token_growth^attempt
per_sentence_tokens = 400
min_max_tokens = 1024
max_max_tokens = 16384
retry_token_growth = 1.5

# Call timeout = max(base_timeout_secs, max_tokens / min_tokens_per_sec)
base_timeout_secs = 60
min_tokens_per_sec = 20

trace_dir = "_trace"
trace_prompts = true
log_max_chars = 240

[model]
# "command": the prompt is piped to stdin of the command, the reply is read from stdout.
# GRAMMAR_LENS_MAX_TOKENS and GRAMMAR_LENS_TEMPERATURE are set in its environment.
backend = "command"
command = ["llm", "-m", "gpt-4o-mini"]
# record_dir = "replies"

# "replay": answer from files named <sha256(prompt)>.txt.
# backend = "replay"
# replay_dir = "replies"

[prompts]
batch_analysis = "prompts/batch_analysis.txt"

[weights]
coverage = 0.35
script = 0.20
gloss = 0.20
markers = 0.15
roles = 0.10
"#;
