use super::Complexity::{Advanced, Beginner, Intermediate};
use super::{LanguageSpec, MarkerRule, ScriptDirection, Segmentation, TagSpec};
use crate::textutil::Script;

const TAGS: &[TagSpec] = &[
    TagSpec {
        id: "indefinite_article",
        color: "#85929e",
        parent: Some("article"),
        level: Beginner,
        english: &["indefinite article"],
        native: &["artículo indefinido", "artículo indeterminado"],
        romanized: &[],
    },
    TagSpec {
        id: "definite_article",
        color: "#5d6d7e",
        parent: Some("article"),
        level: Beginner,
        english: &["definite article"],
        native: &["artículo definido", "artículo determinado"],
        romanized: &[],
    },
    TagSpec {
        id: "article",
        color: "#34495e",
        parent: None,
        level: Beginner,
        english: &["article", "determiner"],
        native: &["artículo", "determinante"],
        romanized: &[],
    },
    TagSpec {
        id: "personal_pronoun",
        color: "#9b59b6",
        parent: Some("pronoun"),
        level: Beginner,
        english: &["personal pronoun", "subject pronoun"],
        native: &["pronombre personal", "pronombre sujeto"],
        romanized: &[],
    },
    TagSpec {
        id: "reflexive_pronoun",
        color: "#7d3c98",
        parent: Some("pronoun"),
        level: Advanced,
        english: &["reflexive"],
        native: &["reflexivo"],
        romanized: &[],
    },
    TagSpec {
        id: "object_pronoun",
        color: "#c39bd3",
        parent: Some("pronoun"),
        level: Intermediate,
        english: &["object pronoun", "clitic"],
        native: &["pronombre de objeto", "pronombre átono", "clítico"],
        romanized: &[],
    },
    TagSpec {
        id: "demonstrative_pronoun",
        color: "#a569bd",
        parent: Some("pronoun"),
        level: Intermediate,
        english: &["demonstrative"],
        native: &["demostrativo"],
        romanized: &[],
    },
    TagSpec {
        id: "pronoun",
        color: "#8e44ad",
        parent: None,
        level: Beginner,
        english: &["pronoun"],
        native: &["pronombre"],
        romanized: &[],
    },
    TagSpec {
        id: "proper_noun",
        color: "#1b4f72",
        parent: Some("noun"),
        level: Intermediate,
        english: &["proper noun"],
        native: &["nombre propio", "sustantivo propio"],
        romanized: &[],
    },
    TagSpec {
        id: "noun",
        color: "#2e86c1",
        parent: None,
        level: Beginner,
        english: &["noun"],
        native: &["sustantivo", "nombre"],
        romanized: &[],
    },
    TagSpec {
        id: "auxiliary_verb",
        color: "#e74c3c",
        parent: Some("verb"),
        level: Beginner,
        english: &["auxiliary", "aux", "copula"],
        native: &["verbo auxiliar", "auxiliar"],
        romanized: &[],
    },
    TagSpec {
        id: "gerund",
        color: "#cd6155",
        parent: Some("verb"),
        level: Intermediate,
        english: &["gerund"],
        native: &["gerundio"],
        romanized: &[],
    },
    TagSpec {
        id: "past_participle",
        color: "#f1948a",
        parent: Some("verb"),
        level: Intermediate,
        english: &["participle"],
        native: &["participio"],
        romanized: &[],
    },
    TagSpec {
        id: "infinitive",
        color: "#d98880",
        parent: Some("verb"),
        level: Beginner,
        english: &["infinitive"],
        native: &["infinitivo"],
        romanized: &[],
    },
    TagSpec {
        id: "adverb",
        color: "#d35400",
        parent: None,
        level: Beginner,
        english: &["adverb"],
        native: &["adverbio"],
        romanized: &[],
    },
    TagSpec {
        id: "verb",
        color: "#c0392b",
        parent: None,
        level: Beginner,
        english: &["verb"],
        native: &["verbo"],
        romanized: &[],
    },
    TagSpec {
        id: "possessive_adjective",
        color: "#52be80",
        parent: Some("adjective"),
        level: Intermediate,
        english: &["possessive"],
        native: &["adjetivo posesivo", "posesivo"],
        romanized: &[],
    },
    TagSpec {
        id: "adjective",
        color: "#27ae60",
        parent: None,
        level: Beginner,
        english: &["adjective"],
        native: &["adjetivo"],
        romanized: &[],
    },
    TagSpec {
        id: "contraction",
        color: "#f8c471",
        parent: Some("preposition"),
        level: Intermediate,
        english: &["contraction"],
        native: &["contracción"],
        romanized: &[],
    },
    TagSpec {
        id: "preposition",
        color: "#f39c12",
        parent: None,
        level: Beginner,
        english: &["preposition"],
        native: &["preposición"],
        romanized: &[],
    },
    TagSpec {
        id: "conjunction",
        color: "#16a085",
        parent: None,
        level: Beginner,
        english: &["conjunction"],
        native: &["conjunción"],
        romanized: &[],
    },
    TagSpec {
        id: "negation",
        color: "#b03a2e",
        parent: None,
        level: Beginner,
        english: &["negation", "negative"],
        native: &["negación"],
        romanized: &[],
    },
    TagSpec {
        id: "numeral",
        color: "#117864",
        parent: None,
        level: Beginner,
        english: &["numeral", "number", "cardinal"],
        native: &["número"],
        romanized: &[],
    },
    TagSpec {
        id: "interjection",
        color: "#f1c40f",
        parent: None,
        level: Intermediate,
        english: &["interjection", "exclamation"],
        native: &["interjección"],
        romanized: &[],
    },
    TagSpec {
        id: "other",
        color: "#95a5a6",
        parent: None,
        level: Beginner,
        english: &["other", "unknown"],
        native: &["otro"],
        romanized: &[],
    },
];

const MARKERS: &[MarkerRule] = &[
    MarkerRule::RoleOf {
        name: "definite_article",
        triggers: &["el", "los", "las"],
        roles: &["definite_article", "article"],
    },
    MarkerRule::RoleOf {
        name: "la",
        triggers: &["la"],
        roles: &["definite_article", "article", "object_pronoun", "pronoun"],
    },
    MarkerRule::RoleOf {
        name: "indefinite_article",
        triggers: &["un", "una", "unos", "unas"],
        roles: &["indefinite_article", "article", "numeral"],
    },
    MarkerRule::RoleOf {
        name: "negator",
        triggers: &["no", "nunca", "jamás"],
        roles: &["negation", "adverb"],
    },
    MarkerRule::RoleOf {
        name: "contraction",
        triggers: &["al", "del"],
        roles: &["contraction", "preposition"],
    },
    MarkerRule::Requires {
        name: "perfect_needs_participle",
        when_any: &["he", "has", "ha", "hemos", "habéis", "han"],
        expect_any: &[],
        expect_suffixes: &["ado", "ido", "ído", "to", "cho", "so"],
    },
];

pub const SPANISH: LanguageSpec = LanguageSpec {
    code: "es",
    name: "Spanish",
    direction: ScriptDirection::Ltr,
    segmentation: Segmentation::Whitespace,
    scripts: &[Script::Latin],
    accepts_romanization: false,
    tags: TAGS,
    repairs: &[
        ("sustantivo_sustantivo", "sustantivo"),
        ("verbo_verbo", "verbo"),
        ("articulo", "artículo"),
        ("preposicion", "preposición"),
        ("conjuncion", "conjunción"),
        ("negacion", "negación"),
        ("interjeccion", "interjección"),
        ("contraccion", "contracción"),
        ("numero", "número"),
    ],
    heuristics: &[
        ("subject", "noun"),
        ("sujeto", "noun"),
        ("object", "noun"),
        ("objeto", "noun"),
        ("modifier", "adjective"),
        ("tense", "auxiliary_verb"),
        ("interrogative", "pronoun"),
    ],
    markers: MARKERS,
};
