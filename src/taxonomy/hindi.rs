use super::Complexity::{Advanced, Beginner, Intermediate};
use super::{LanguageSpec, MarkerRule, ScriptDirection, Segmentation, TagSpec};
use crate::textutil::Script;

const TAGS: &[TagSpec] = &[
    TagSpec {
        id: "personal_pronoun",
        color: "#9b59b6",
        parent: Some("pronoun"),
        level: Beginner,
        english: &["personal pronoun", "subject pronoun"],
        native: &["पुरुषवाचक सर्वनाम"],
        romanized: &["purushvachak", "purushvachak sarvanam"],
    },
    TagSpec {
        id: "demonstrative_pronoun",
        color: "#a569bd",
        parent: Some("pronoun"),
        level: Intermediate,
        english: &["demonstrative"],
        native: &["निश्चयवाचक सर्वनाम", "संकेतवाचक"],
        romanized: &["nishchayvachak"],
    },
    TagSpec {
        id: "interrogative_pronoun",
        color: "#bb8fce",
        parent: Some("pronoun"),
        level: Intermediate,
        english: &["interrogative", "question word"],
        native: &["प्रश्नवाचक सर्वनाम", "प्रश्नवाचक"],
        romanized: &["prashnavachak"],
    },
    TagSpec {
        id: "reflexive_pronoun",
        color: "#7d3c98",
        parent: Some("pronoun"),
        level: Advanced,
        english: &["reflexive"],
        native: &["निजवाचक सर्वनाम", "निजवाचक"],
        romanized: &["nijvachak"],
    },
    TagSpec {
        id: "pronoun",
        color: "#8e44ad",
        parent: None,
        level: Beginner,
        english: &["pronoun"],
        native: &["सर्वनाम"],
        romanized: &["sarvanam"],
    },
    TagSpec {
        id: "proper_noun",
        color: "#1b4f72",
        parent: Some("noun"),
        level: Intermediate,
        english: &["proper noun"],
        native: &["व्यक्तिवाचक संज्ञा"],
        romanized: &["vyaktivachak"],
    },
    TagSpec {
        id: "noun",
        color: "#2e86c1",
        parent: None,
        level: Beginner,
        english: &["noun"],
        native: &["संज्ञा"],
        romanized: &["sangya", "sanjna"],
    },
    TagSpec {
        id: "auxiliary_verb",
        color: "#e74c3c",
        parent: Some("verb"),
        level: Beginner,
        english: &["auxiliary", "aux", "helping verb", "copula"],
        native: &["सहायक क्रिया", "सहायक"],
        romanized: &["sahayak"],
    },
    TagSpec {
        id: "light_verb",
        color: "#922b21",
        parent: Some("verb"),
        level: Advanced,
        english: &["light verb", "compound verb", "vector verb"],
        native: &["संयुक्त क्रिया"],
        romanized: &["sanyukt"],
    },
    TagSpec {
        id: "infinitive",
        color: "#cd6155",
        parent: Some("verb"),
        level: Advanced,
        english: &["infinitive", "gerund"],
        native: &["क्रियार्थक"],
        romanized: &["kriyarthak"],
    },
    TagSpec {
        id: "participle",
        color: "#f1948a",
        parent: Some("verb"),
        level: Advanced,
        english: &["participle"],
        native: &["कृदंत"],
        romanized: &["kridant"],
    },
    TagSpec {
        id: "adverb",
        color: "#d35400",
        parent: None,
        level: Beginner,
        english: &["adverb"],
        native: &["क्रियाविशेषण"],
        romanized: &["kriyavisheshan"],
    },
    TagSpec {
        id: "verb",
        color: "#c0392b",
        parent: None,
        level: Beginner,
        english: &["verb"],
        native: &["क्रिया"],
        romanized: &["kriya"],
    },
    TagSpec {
        id: "adjective",
        color: "#27ae60",
        parent: None,
        level: Beginner,
        english: &["adjective"],
        native: &["विशेषण"],
        romanized: &["visheshan"],
    },
    TagSpec {
        id: "postposition",
        color: "#f39c12",
        parent: None,
        level: Beginner,
        english: &["postposition", "case marker"],
        native: &["परसर्ग", "कारक"],
        romanized: &["parsarg", "karak"],
    },
    TagSpec {
        id: "conjunction",
        color: "#16a085",
        parent: None,
        level: Beginner,
        english: &["conjunction"],
        native: &["समुच्चयबोधक", "योजक"],
        romanized: &["samuchchayabodhak"],
    },
    TagSpec {
        id: "negation",
        color: "#b03a2e",
        parent: None,
        level: Beginner,
        english: &["negation", "negative"],
        native: &["निषेधवाचक", "नकारात्मक"],
        romanized: &["nishedh"],
    },
    TagSpec {
        id: "particle",
        color: "#a04000",
        parent: None,
        level: Intermediate,
        english: &["particle", "emphatic"],
        native: &["निपात"],
        romanized: &["nipat"],
    },
    TagSpec {
        id: "interjection",
        color: "#f1c40f",
        parent: None,
        level: Intermediate,
        english: &["interjection", "exclamation"],
        native: &["विस्मयादिबोधक"],
        romanized: &["vismayadibodhak"],
    },
    TagSpec {
        id: "numeral",
        color: "#117864",
        parent: None,
        level: Beginner,
        english: &["numeral", "number"],
        native: &["संख्यावाचक"],
        romanized: &["sankhyavachak"],
    },
    TagSpec {
        id: "other",
        color: "#95a5a6",
        parent: None,
        level: Beginner,
        english: &["other", "unknown"],
        native: &["अन्य"],
        romanized: &["anya"],
    },
];

const MARKERS: &[MarkerRule] = &[
    MarkerRule::RoleOf {
        name: "progressive_auxiliary",
        triggers: &["रहा", "रही", "रहे"],
        roles: &["auxiliary_verb"],
    },
    MarkerRule::RoleOf {
        name: "case_marker",
        triggers: &["ने", "को", "से", "में"],
        roles: &["postposition"],
    },
    MarkerRule::RoleOf {
        name: "negator",
        triggers: &["नहीं", "न", "मत"],
        roles: &["negation", "particle", "adverb"],
    },
    MarkerRule::Requires {
        name: "progressive_needs_copula",
        when_any: &["रहा", "रही", "रहे"],
        expect_any: &[
            "हूं", "हूँ", "है", "हैं", "हो", "था", "थी", "थे", "होगा", "होगी", "होंगे",
        ],
        expect_suffixes: &[],
    },
];

pub const HINDI: LanguageSpec = LanguageSpec {
    code: "hi",
    name: "Hindi",
    direction: ScriptDirection::Ltr,
    segmentation: Segmentation::Whitespace,
    scripts: &[Script::Devanagari],
    accepts_romanization: false,
    tags: TAGS,
    repairs: &[
        ("सहायक_सहायक", "सहायक"),
        ("संज्ञा_संज्ञा", "संज्ञा"),
        ("sarvnaam", "sarvanam"),
        ("sarvnam", "sarvanam"),
        ("kriyaa", "kriya"),
        ("sanggya", "sangya"),
    ],
    heuristics: &[
        ("subject", "noun"),
        ("object", "noun"),
        ("कर्ता", "noun"),
        ("tense", "auxiliary_verb"),
        ("aspect", "auxiliary_verb"),
        ("progressive", "auxiliary_verb"),
        ("continuous", "auxiliary_verb"),
        ("case", "postposition"),
        ("marker", "postposition"),
        ("modifier", "adjective"),
        ("question", "interrogative_pronoun"),
    ],
    markers: MARKERS,
};
