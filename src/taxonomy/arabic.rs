use super::Complexity::{Advanced, Beginner, Intermediate};
use super::{LanguageSpec, MarkerRule, ScriptDirection, Segmentation, TagSpec};
use crate::textutil::Script;

const TAGS: &[TagSpec] = &[
    TagSpec {
        id: "personal_pronoun",
        color: "#9b59b6",
        parent: Some("pronoun"),
        level: Beginner,
        english: &["personal pronoun", "independent pronoun", "subject pronoun"],
        native: &["ضمير منفصل"],
        romanized: &["damir munfasil"],
    },
    TagSpec {
        id: "attached_pronoun",
        color: "#c39bd3",
        parent: Some("pronoun"),
        level: Intermediate,
        english: &["attached pronoun", "suffix pronoun", "pronominal suffix", "possessive suffix"],
        native: &["ضمير متصل"],
        romanized: &["damir muttasil"],
    },
    TagSpec {
        id: "demonstrative_pronoun",
        color: "#a569bd",
        parent: Some("pronoun"),
        level: Intermediate,
        english: &["demonstrative"],
        native: &["اسم إشارة"],
        romanized: &["ism ishara"],
    },
    TagSpec {
        id: "relative_pronoun",
        color: "#7d3c98",
        parent: Some("pronoun"),
        level: Advanced,
        english: &["relative"],
        native: &["اسم موصول"],
        romanized: &["ism mawsul"],
    },
    TagSpec {
        id: "pronoun",
        color: "#8e44ad",
        parent: None,
        level: Beginner,
        english: &["pronoun"],
        native: &["ضمير"],
        romanized: &["damir"],
    },
    TagSpec {
        id: "proper_noun",
        color: "#1b4f72",
        parent: Some("noun"),
        level: Intermediate,
        english: &["proper noun"],
        native: &["اسم علم"],
        romanized: &["ism alam"],
    },
    TagSpec {
        id: "verbal_noun",
        color: "#5dade2",
        parent: Some("noun"),
        level: Advanced,
        english: &["verbal noun", "masdar"],
        native: &["مصدر"],
        romanized: &[],
    },
    TagSpec {
        id: "noun",
        color: "#2e86c1",
        parent: None,
        level: Beginner,
        english: &["noun"],
        native: &["اسم"],
        romanized: &["ism"],
    },
    TagSpec {
        id: "auxiliary_verb",
        color: "#e74c3c",
        parent: Some("verb"),
        level: Intermediate,
        english: &["auxiliary", "copula"],
        native: &["فعل ناقص"],
        romanized: &["naqis"],
    },
    TagSpec {
        id: "adverb",
        color: "#d35400",
        parent: None,
        level: Beginner,
        english: &["adverb"],
        native: &["ظرف"],
        romanized: &["zarf"],
    },
    TagSpec {
        id: "verb",
        color: "#c0392b",
        parent: None,
        level: Beginner,
        english: &["verb"],
        native: &["فعل"],
        romanized: &["fi'l"],
    },
    TagSpec {
        id: "adjective",
        color: "#27ae60",
        parent: None,
        level: Beginner,
        english: &["adjective"],
        native: &["صفة", "نعت"],
        romanized: &["sifa"],
    },
    TagSpec {
        id: "preposition",
        color: "#f39c12",
        parent: None,
        level: Beginner,
        english: &["preposition"],
        native: &["حرف جر"],
        romanized: &["harf jarr"],
    },
    TagSpec {
        id: "conjunction",
        color: "#16a085",
        parent: None,
        level: Beginner,
        english: &["conjunction"],
        native: &["حرف عطف"],
        romanized: &["harf atf"],
    },
    TagSpec {
        id: "negation",
        color: "#b03a2e",
        parent: None,
        level: Beginner,
        english: &["negation", "negative"],
        native: &["نفي"],
        romanized: &["nafy"],
    },
    TagSpec {
        id: "interrogative_particle",
        color: "#dc7633",
        parent: Some("particle"),
        level: Intermediate,
        english: &["interrogative", "question particle"],
        native: &["استفهام"],
        romanized: &["istifham"],
    },
    TagSpec {
        id: "vocative_particle",
        color: "#e59866",
        parent: Some("particle"),
        level: Advanced,
        english: &["vocative"],
        native: &["نداء"],
        romanized: &["nida"],
    },
    TagSpec {
        id: "definite_article",
        color: "#5d6d7e",
        parent: Some("particle"),
        level: Beginner,
        english: &["definite article"],
        native: &["أداة التعريف", "ال التعريف"],
        romanized: &["al ta'rif"],
    },
    TagSpec {
        id: "particle",
        color: "#a04000",
        parent: None,
        level: Beginner,
        english: &["particle"],
        native: &["حرف"],
        romanized: &["harf"],
    },
    TagSpec {
        id: "numeral",
        color: "#117864",
        parent: None,
        level: Beginner,
        english: &["numeral", "number"],
        native: &["عدد"],
        romanized: &["adad"],
    },
    TagSpec {
        id: "interjection",
        color: "#f1c40f",
        parent: None,
        level: Intermediate,
        english: &["interjection", "exclamation"],
        native: &["تعجب"],
        romanized: &["ta'ajjub"],
    },
    TagSpec {
        id: "other",
        color: "#95a5a6",
        parent: None,
        level: Beginner,
        english: &["other", "unknown"],
        native: &["أخرى"],
        romanized: &["ukhra"],
    },
];

const MARKERS: &[MarkerRule] = &[
    MarkerRule::RoleOf {
        name: "negator",
        triggers: &["لا", "لم", "لن"],
        roles: &["negation", "particle"],
    },
    MarkerRule::RoleOf {
        name: "laysa",
        triggers: &["ليس", "ليست"],
        roles: &["negation", "auxiliary_verb", "verb"],
    },
    MarkerRule::RoleOf {
        name: "preposition",
        triggers: &["في", "من", "إلى", "على", "عن"],
        roles: &["preposition", "particle"],
    },
    MarkerRule::RoleOf {
        name: "wa_conjunction",
        triggers: &["و"],
        roles: &["conjunction", "particle"],
    },
    MarkerRule::RoleOf {
        name: "detached_article",
        triggers: &["ال"],
        roles: &["definite_article", "particle"],
    },
];

pub const ARABIC: LanguageSpec = LanguageSpec {
    code: "ar",
    name: "Arabic",
    direction: ScriptDirection::Rtl,
    segmentation: Segmentation::Whitespace,
    scripts: &[Script::Arabic],
    accepts_romanization: false,
    tags: TAGS,
    repairs: &[
        ("ضمير_ضمير", "ضمير"),
        ("dameer", "damir"),
        ("harf_al_jarr", "harf_jarr"),
        ("fiil", "fi'l"),
        ("fi'il", "fi'l"),
    ],
    heuristics: &[
        ("subject", "noun"),
        ("object", "noun"),
        ("مبتدأ", "noun"),
        ("خبر", "noun"),
        ("فاعل", "noun"),
        ("question", "interrogative_particle"),
        ("modifier", "adjective"),
        ("tense", "auxiliary_verb"),
        ("marker", "particle"),
    ],
    markers: MARKERS,
};
