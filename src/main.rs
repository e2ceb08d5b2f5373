use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{CommandFactory, Parser};

use grammar_lens::pipeline::{
    build_results, init_default_config, read_sentences_tsv, write_results_file, BatchAnalyzer,
    CliOverrides, EngineConfig,
};
use grammar_lens::progress::ConsoleProgress;
use grammar_lens::render::render_preview_page;
use grammar_lens::taxonomy::{registry, Complexity};

#[derive(Parser, Debug)]
#[command(name = "grammar-lens")]
#[command(
    about = "Color-coded word-by-word grammar analysis of example sentences via an LLM",
    long_about = None
)]
struct Args {
    /// Generate default config + prompt files, then exit
    #[arg(long)]
    init_config: bool,

    /// Directory to write config/prompt files (default: current directory)
    #[arg(long, value_name = "DIR")]
    init_config_dir: Option<PathBuf>,

    /// Overwrite existing config/prompt files when used with --init-config
    #[arg(long)]
    force: bool,

    /// Print the built-in languages and their tag counts, then exit
    #[arg(long)]
    list_languages: bool,

    /// Validate every built-in taxonomy, then exit
    #[arg(long)]
    check_taxonomies: bool,

    /// Input TSV: `sentence<TAB>target_word` per line
    #[arg(value_name = "TSV")]
    input: Option<PathBuf>,

    /// Output JSON (default: <input_stem>.grammar.json)
    #[arg(short, long, value_name = "JSON")]
    output: Option<PathBuf>,

    /// Also write a standalone HTML preview
    #[arg(long, value_name = "HTML")]
    html: Option<PathBuf>,

    /// Language code of the sentences (hi, ar, es, zh)
    #[arg(short, long)]
    lang: Option<String>,

    /// Complexity level: beginner, intermediate or advanced
    #[arg(long)]
    level: Option<String>,

    /// Repeated-word ordering: first_occurrence or incremental
    #[arg(long)]
    ordering: Option<String>,

    /// Sentences per model call
    #[arg(long)]
    batch_size: Option<usize>,

    /// Retry rounds before falling back
    #[arg(long)]
    max_retries: Option<u32>,

    /// Config file path (default: search for grammar-lens.toml upwards)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Answer from recorded responses in DIR instead of calling a model
    #[arg(long, value_name = "DIR")]
    replay_dir: Option<PathBuf>,

    /// Store every live model reply in DIR (replayable with --replay-dir)
    #[arg(long, value_name = "DIR")]
    record_dir: Option<PathBuf>,

    /// Trace directory (default: <output_dir>/_trace)
    #[arg(long, value_name = "DIR")]
    trace_dir: Option<PathBuf>,

    /// Do not write prompt/response traces
    #[arg(long)]
    no_trace: bool,

    /// Only print errors
    #[arg(short, long)]
    quiet: bool,

    /// Model command and its arguments (prompt on stdin, reply on stdout); must come last
    #[arg(long, num_args = 1.., allow_hyphen_values = true, value_name = "ARGV")]
    model_cmd: Option<Vec<String>>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let progress = ConsoleProgress::new(!args.quiet);

    if args.init_config {
        let dir = args
            .init_config_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        let cfg_path = init_default_config(&dir, args.force).context("init default config")?;
        eprintln!("Wrote config: {}", cfg_path.display());
        return Ok(());
    }

    if args.check_taxonomies {
        let reg = registry().context("built-in taxonomies")?;
        for p in reg.profiles() {
            println!("{}: ok ({} tags)", p.code, p.tags().len());
        }
        return Ok(());
    }

    if args.list_languages {
        let reg = registry().context("built-in taxonomies")?;
        println!("code\tname\tdirection\tbeginner\tintermediate\tadvanced");
        for p in reg.profiles() {
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                p.code,
                p.name,
                p.direction.as_str(),
                p.eligible_tags(Complexity::Beginner).count(),
                p.eligible_tags(Complexity::Intermediate).count(),
                p.eligible_tags(Complexity::Advanced).count()
            );
        }
        return Ok(());
    }

    let input = match args.input {
        Some(p) => p,
        None => {
            let mut cmd = Args::command();
            cmd.print_help().context("print help")?;
            eprintln!(
                "\n\nUSAGE:\n  grammar-lens --lang hi sentences.tsv\n\nTIPS:\n  - Run `grammar-lens --init-config` once to get grammar-lens.toml and prompts/.\n  - Default config search: grammar-lens.toml (upwards), or set GRAMMAR_LENS_CONFIG.\n"
            );
            return Ok(());
        }
    };
    let lang = args
        .lang
        .clone()
        .ok_or_else(|| anyhow!("missing --lang (one of: {})", language_codes()))?;
    let profile = registry()
        .context("built-in taxonomies")?
        .get(&lang)
        .ok_or_else(|| anyhow!("unsupported language: {lang} (one of: {})", language_codes()))?;
    let output = match args.output {
        Some(p) => p,
        None => {
            let stem = input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("sentences")
                .to_string();
            input.with_file_name(format!("{stem}.grammar.json"))
        }
    };

    let cfg = EngineConfig::from_paths_and_args(
        &input,
        &output,
        CliOverrides {
            config_path: args.config,
            level: args.level,
            ordering: args.ordering,
            batch_size: args.batch_size,
            max_retries: args.max_retries,
            model_command: args.model_cmd,
            replay_dir: args.replay_dir,
            record_dir: args.record_dir,
            trace_dir: args.trace_dir,
            no_trace: args.no_trace,
        },
    )
    .context("build config")?;

    let inputs = read_sentences_tsv(&input)?;
    progress.info(format!("Read {} sentence(s): {}", inputs.len(), input.display()));

    let model = cfg.model.open()?;
    let model_name = model.name().to_string();
    let level = cfg.settings.level;
    let mut analyzer = BatchAnalyzer::from_config(&cfg, model, progress.clone())?;
    let outcome = analyzer
        .analyze_with_stats(profile.code, &inputs)
        .context("analyze sentences")?;

    let results = build_results(profile, level, &model_name, &outcome);
    write_results_file(&output, &results)?;
    progress.info(format!("Wrote results: {}", output.display()));

    if let Some(html) = args.html {
        let page = render_preview_page(profile, level, &outcome.analyses);
        std::fs::write(&html, page).with_context(|| format!("write preview: {}", html.display()))?;
        progress.info(format!("Wrote preview: {}", html.display()));
    }
    Ok(())
}

fn language_codes() -> String {
    registry()
        .map(|r| r.codes().collect::<Vec<_>>().join(", "))
        .unwrap_or_default()
}
