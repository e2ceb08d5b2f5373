use std::collections::HashMap;
use std::time::Duration;

use serde_json::{json, Value};

use grammar_lens::models::{FnModel, ModelError, ModelRequest, RecordingModel, ReplayModel};
use grammar_lens::pipeline::{AnalyzerSettings, CancelToken, Pause};
use grammar_lens::render::{render_sentence, visual_order};
use grammar_lens::{registry, AnalysisStatus, AnalyzeError, BatchAnalyzer, SentenceInput};

type Words = Vec<(&'static str, &'static str, &'static str)>;

#[derive(Default)]
struct RecordingPause(Vec<Duration>);

impl Pause for RecordingPause {
    fn pause(&mut self, d: Duration) {
        self.0.push(d);
    }
}

/// Sentences listed in a batch prompt, in prompt order.
fn prompt_sentences(prompt: &str) -> Vec<String> {
    let Some((_, block)) = prompt.split_once("SENTENCES:") else {
        return Vec::new();
    };
    block
        .lines()
        .filter_map(|line| {
            let (num, rest) = line.split_once(". ")?;
            num.trim().parse::<usize>().ok()?;
            Some(rest.trim().to_string())
        })
        .collect()
}

/// `batch_results` for every prompt sentence the script knows; unknown sentences are left out.
fn scripted_reply(prompt: &str, script: &HashMap<&str, Words>) -> String {
    let items: Vec<Value> = prompt_sentences(prompt)
        .iter()
        .enumerate()
        .filter_map(|(i, s)| {
            let words = script.get(s.as_str())?;
            Some(json!({
                "sentence_index": i + 1,
                "sentence": s,
                "words": words
                    .iter()
                    .map(|(w, g, r)| {
                        json!({"word": w, "individual_meaning": g, "grammatical_role": r})
                    })
                    .collect::<Vec<_>>(),
            }))
        })
        .collect();
    json!({ "batch_results": items }).to_string()
}

fn no_pause_settings() -> AnalyzerSettings {
    AnalyzerSettings {
        backoff: grammar_lens::pipeline::BackoffPolicy {
            initial: Duration::ZERO,
            max: Duration::ZERO,
            factor: 2.0,
        },
        ..AnalyzerSettings::default()
    }
}

const HINDI: &str = "मैं अच्छी किताब पढ़ रहा हूं";

fn hindi_script() -> HashMap<&'static str, Words> {
    let mut script = HashMap::new();
    // Deliberately out of reading order.
    script.insert(
        HINDI,
        vec![
            ("हूं", "am (first person copula)", "auxiliary verb"),
            ("किताब", "book (feminine noun)", "noun"),
            ("मैं", "I (subject, first person)", "personal pronoun"),
            ("रहा", "progressive marker (masculine)", "auxiliary verb"),
            ("अच्छी", "good (feminine)", "adjective"),
            ("पढ़", "read (verb stem)", "verb"),
        ],
    );
    script
}

#[test]
fn hindi_sentence_is_validated_in_reading_order() {
    let script = hindi_script();
    let model = FnModel::new("scripted", |req: &ModelRequest| {
        Ok(scripted_reply(&req.prompt, &script))
    });
    let mut analyzer = BatchAnalyzer::new(model, no_pause_settings());
    let out = analyzer
        .analyze("hi", &[SentenceInput::new(HINDI, "किताब")])
        .expect("analyze");

    assert_eq!(out.len(), 1);
    let a = &out[0];
    assert_eq!(a.status, AnalysisStatus::Validated, "{:?}", a.flags);
    assert!(a.confidence >= 0.85);
    assert_eq!(a.attempts, 1);
    let order: Vec<&str> = a.words.iter().map(|w| w.word.as_str()).collect();
    assert_eq!(order, vec!["मैं", "अच्छी", "किताब", "पढ़", "रहा", "हूं"]);
    assert_eq!(a.words[0].role, "personal_pronoun");
    assert_eq!(a.words[4].role, "auxiliary_verb");
    assert_eq!(a.words[5].role, "auxiliary_verb");
    let hi = registry().expect("registry").get("hi").expect("hi");
    assert_eq!(a.words[0].color, hi.color_of("personal_pronoun"));
}

#[test]
fn arabic_keeps_storage_order_and_renders_right_to_left() {
    let sentence = "أنا أقرأ كتابا في المكتبة";
    let mut script: HashMap<&str, Words> = HashMap::new();
    script.insert(
        sentence,
        vec![
            ("المكتبة", "the library (object of preposition)", "noun"),
            ("في", "in (location)", "preposition"),
            ("أنا", "I (subject pronoun)", "personal pronoun"),
            ("كتابا", "a book (accusative)", "noun"),
            ("أقرأ", "I read (present tense)", "verb"),
        ],
    );
    let model = FnModel::new("scripted", |req: &ModelRequest| {
        Ok(scripted_reply(&req.prompt, &script))
    });
    let mut analyzer = BatchAnalyzer::new(model, no_pause_settings());
    let out = analyzer
        .analyze("ar", &[SentenceInput::new(sentence, "كتابا")])
        .expect("analyze");
    let a = &out[0];
    assert_eq!(a.status, AnalysisStatus::Validated, "{:?}", a.flags);
    assert_eq!(a.words.first().map(|w| w.word.as_str()), Some("أنا"));
    assert_eq!(a.words.last().map(|w| w.word.as_str()), Some("المكتبة"));

    let ar = registry().expect("registry").get("ar").expect("ar");
    let visual: Vec<&str> = visual_order(ar, &a.words).iter().map(|w| w.word.as_str()).collect();
    assert_eq!(visual.first().copied(), Some("المكتبة"));
    let rendered = render_sentence(ar, a);
    assert!(rendered.html.contains(r#"dir="rtl""#));
    assert_eq!(rendered.status, AnalysisStatus::Validated);
}

#[test]
fn fenced_reply_with_trailing_commas_is_recovered() {
    let reply = "Sure! Here is the analysis:\n```json\n{\"batch_results\": [{\"sentence_index\": 1, \"sentence\": \"Yo como pan.\", \"words\": [\
{\"word\": \"Yo\", \"individual_meaning\": \"I (subject pronoun)\", \"grammatical_role\": \"personal pronoun\"},\
{\"word\": \"como\", \"individual_meaning\": \"eat (first person)\", \"grammatical_role\": \"verb\"},\
{\"word\": \"pan\", \"individual_meaning\": \"bread (object)\", \"grammatical_role\": \"noun\"},\
]},],}\n```";
    let model = FnModel::new("fenced", |_: &ModelRequest| Ok(reply.to_string()));
    let mut analyzer = BatchAnalyzer::new(model, no_pause_settings());
    let outcome = analyzer
        .analyze_with_stats("es", &[SentenceInput::new("Yo como pan.", "pan")])
        .expect("analyze");
    assert_eq!(outcome.analyses[0].status, AnalysisStatus::Validated);
    assert_eq!(outcome.stats.model_calls, 1);
    assert_eq!(outcome.stats.retries, 0);
    assert_eq!(outcome.stats.strategies.get("repaired"), Some(&1));
}

fn spanish_script() -> HashMap<&'static str, Words> {
    let mut s: HashMap<&str, Words> = HashMap::new();
    s.insert(
        "Yo como pan.",
        vec![
            ("Yo", "I (subject pronoun)", "personal pronoun"),
            ("como", "eat (first person)", "verb"),
            ("pan", "bread (object)", "noun"),
        ],
    );
    s.insert(
        "Tú bebes agua.",
        vec![
            ("Tú", "you (informal subject)", "personal pronoun"),
            ("bebes", "drink (second person)", "verb"),
            ("agua", "water (object)", "noun"),
        ],
    );
    s.insert(
        "Ella lee libros.",
        vec![
            ("Ella", "she (subject pronoun)", "personal pronoun"),
            ("lee", "reads (third person)", "verb"),
            ("libros", "books (plural noun)", "noun"),
        ],
    );
    s.insert(
        "Nosotros vivimos aquí.",
        vec![
            ("Nosotros", "we (subject pronoun)", "personal pronoun"),
            ("vivimos", "live (first person plural)", "verb"),
            ("aquí", "here (place)", "adverb"),
        ],
    );
    s.insert(
        "Ellos cantan bien.",
        vec![
            ("Ellos", "they (subject pronoun)", "personal pronoun"),
            ("cantan", "sing (third person plural)", "verb"),
            ("bien", "well (manner)", "adverb"),
        ],
    );
    s.insert(
        "Juan escribe cartas.",
        vec![
            ("Juan", "Juan (a name)", "proper noun"),
            ("escribe", "writes (third person)", "verb"),
            ("cartas", "letters (plural noun)", "noun"),
        ],
    );
    s
}

const SPANISH: [(&str, &str); 8] = [
    ("Yo como pan.", "pan"),
    ("Tú bebes agua.", "agua"),
    ("Ella lee libros.", "libros"),
    ("Nosotros vivimos aquí.", "aquí"),
    ("María corre rápido.", "rápido"),
    ("Ellos cantan bien.", "bien"),
    ("Juan escribe cartas.", "cartas"),
    ("Pedro duerme mucho.", "mucho"),
];

#[test]
fn unanswered_sentences_are_retried_in_a_small_batch_then_fall_back() {
    let script = spanish_script();
    let mut prompts: Vec<String> = Vec::new();
    let mut pause = RecordingPause::default();
    let inputs: Vec<SentenceInput> = SPANISH.iter().map(|&p| SentenceInput::from(p)).collect();

    let model = FnModel::new("scripted", |req: &ModelRequest| {
        prompts.push(req.prompt.clone());
        Ok(scripted_reply(&req.prompt, &script))
    });
    let mut analyzer =
        BatchAnalyzer::new(model, AnalyzerSettings::default()).with_pause(&mut pause);
    let outcome = analyzer.analyze_with_stats("es", &inputs).expect("analyze");
    drop(analyzer);

    assert_eq!(outcome.analyses.len(), 8);
    for (a, (sentence, _)) in outcome.analyses.iter().zip(SPANISH.iter()) {
        assert_eq!(a.sentence, *sentence);
    }
    let sizes: Vec<usize> = prompts.iter().map(|p| prompt_sentences(p).len()).collect();
    assert_eq!(sizes[0], 8);
    assert!(sizes[1..].iter().all(|n| *n <= 2), "{sizes:?}");
    assert_eq!(
        prompt_sentences(&prompts[1]),
        vec!["María corre rápido.".to_string(), "Pedro duerme mucho.".to_string()]
    );

    assert_eq!(outcome.stats.validated, 6);
    assert_eq!(outcome.stats.fallback, 2);
    assert_eq!(outcome.stats.retries, 2);
    for i in [4, 7] {
        let a = &outcome.analyses[i];
        assert_eq!(a.status, AnalysisStatus::Fallback);
        assert_eq!(a.confidence, 0.0);
        assert_eq!(a.attempts, 3);
        assert!(a.words.iter().all(|w| w.role == "other"));
        assert_eq!(a.flags, vec!["no_result".to_string()]);
    }
    assert!(outcome.analyses[6].words.iter().any(|w| w.role == "proper_noun"));

    // 1s before the first retry, doubling after.
    assert_eq!(pause.0, vec![Duration::from_secs(1), Duration::from_secs(2)]);
}

#[test]
fn backoff_is_capped() {
    let mut pause = RecordingPause::default();
    let model = FnModel::new("down", |_: &ModelRequest| {
        Err(ModelError::Backend("503".to_string()))
    });
    let settings = AnalyzerSettings {
        max_retries: 7,
        ..AnalyzerSettings::default()
    };
    let mut analyzer = BatchAnalyzer::new(model, settings).with_pause(&mut pause);
    let out = analyzer
        .analyze("es", &[SentenceInput::new("Yo como pan.", "pan")])
        .expect("analyze");
    drop(analyzer);
    assert_eq!(out[0].status, AnalysisStatus::Fallback);
    let secs: Vec<u64> = pause.0.iter().map(Duration::as_secs).collect();
    assert_eq!(secs, vec![1, 2, 4, 8, 16, 30, 30]);
}

#[test]
fn glosses_seen_on_failed_attempts_survive_into_the_fallback() {
    // Missing "pan" every time: never validates, but "como" keeps its gloss.
    let reply = json!({"batch_results": [{"sentence_index": 1, "words": [
        {"word": "Yo", "individual_meaning": "I (subject)", "grammatical_role": "personal pronoun"},
        {"word": "como", "individual_meaning": "eat (first person)", "grammatical_role": "verb"},
    ]}]})
    .to_string();
    let model = FnModel::new("partial", |_: &ModelRequest| Ok(reply.clone()));
    let mut analyzer = BatchAnalyzer::new(model, no_pause_settings());
    let out = analyzer
        .analyze("es", &[SentenceInput::new("Yo como pan.", "pan")])
        .expect("analyze");
    let a = &out[0];
    assert_eq!(a.status, AnalysisStatus::Fallback);
    assert!(a.flags.contains(&"missing_tokens".to_string()));
    let glosses: Vec<(&str, &str)> = a
        .words
        .iter()
        .map(|w| (w.word.as_str(), w.gloss.as_str()))
        .collect();
    assert_eq!(
        glosses,
        vec![("Yo", "I (subject)"), ("como", "eat (first person)"), ("pan", "pan")]
    );
}

#[test]
fn every_input_gets_exactly_one_result_in_order() {
    let inputs: Vec<SentenceInput> = (0..37)
        .map(|i| SentenceInput::new(format!("Frase número {i}."), ""))
        .collect();
    let mut calls = 0usize;
    let model = FnModel::new("refuses", |_: &ModelRequest| {
        calls += 1;
        Ok("I'm sorry, I can't help with that.".to_string())
    });
    let settings = AnalyzerSettings {
        max_retries: 0,
        ..no_pause_settings()
    };
    let mut analyzer = BatchAnalyzer::new(model, settings);
    let outcome = analyzer.analyze_with_stats("es", &inputs).expect("analyze");
    drop(analyzer);

    assert_eq!(outcome.analyses.len(), inputs.len());
    for (a, input) in outcome.analyses.iter().zip(&inputs) {
        assert_eq!(a.sentence, input.sentence);
        assert_eq!(a.status, AnalysisStatus::Fallback);
        assert!(!a.words.is_empty());
    }
    assert_eq!(outcome.stats.batches, 3);
    assert_eq!(calls, 3);
    assert_eq!(outcome.stats.recovery_failures, 3);
}

#[test]
fn cancellation_returns_no_partial_result() {
    let token = CancelToken::new();
    let trigger = token.clone();
    let model = FnModel::new("cancels", move |_: &ModelRequest| {
        trigger.cancel();
        Ok("not json".to_string())
    });
    let mut analyzer = BatchAnalyzer::new(model, no_pause_settings()).with_cancel(token);
    let res = analyzer.analyze("es", &[SentenceInput::new("Yo como pan.", "pan")]);
    assert!(matches!(res, Err(AnalyzeError::Cancelled)));

    let token = CancelToken::new();
    token.cancel();
    let mut calls = 0;
    let model = FnModel::new("never", |_: &ModelRequest| {
        calls += 1;
        Ok(String::new())
    });
    let mut analyzer = BatchAnalyzer::new(model, no_pause_settings()).with_cancel(token);
    assert!(matches!(
        analyzer.analyze("hi", &[SentenceInput::new(HINDI, "")]),
        Err(AnalyzeError::Cancelled)
    ));
    drop(analyzer);
    assert_eq!(calls, 0);
}

#[test]
fn unsupported_language_is_a_caller_error() {
    let model = FnModel::new("never", |_: &ModelRequest| Ok(String::new()));
    let mut analyzer = BatchAnalyzer::new(model, no_pause_settings());
    assert!(matches!(
        analyzer.analyze("tlh", &[SentenceInput::new("nuqneH", "")]),
        Err(AnalyzeError::UnsupportedLanguage(_))
    ));
    // Region subtags resolve to the base language.
    let out = analyzer.analyze("es-MX", &[]).expect("empty input");
    assert!(out.is_empty());
}

#[test]
fn recorded_run_replays_identically() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = hindi_script();
    let live = FnModel::new("scripted", |req: &ModelRequest| {
        Ok(scripted_reply(&req.prompt, &script))
    });
    let recorder = RecordingModel::new(live, dir.path()).expect("recorder");
    let inputs = [SentenceInput::new(HINDI, "किताब")];

    let mut analyzer = BatchAnalyzer::new(recorder, no_pause_settings());
    let first = analyzer.analyze("hi", &inputs).expect("live");

    let mut replay = BatchAnalyzer::new(ReplayModel::new(dir.path()), no_pause_settings());
    let second = replay.analyze("hi", &inputs).expect("replay");
    assert_eq!(first, second);
}
