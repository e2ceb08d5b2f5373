use super::Complexity::{Advanced, Beginner, Intermediate};
use super::{LanguageSpec, MarkerRule, ScriptDirection, Segmentation, TagSpec};
use crate::textutil::Script;

const TAGS: &[TagSpec] = &[
    TagSpec {
        id: "personal_pronoun",
        color: "#9b59b6",
        parent: Some("pronoun"),
        level: Beginner,
        english: &["personal pronoun"],
        native: &["人称代词"],
        romanized: &["rencheng daici"],
    },
    TagSpec {
        id: "demonstrative_pronoun",
        color: "#a569bd",
        parent: Some("pronoun"),
        level: Intermediate,
        english: &["demonstrative"],
        native: &["指示代词"],
        romanized: &["zhishi daici"],
    },
    TagSpec {
        id: "interrogative_pronoun",
        color: "#bb8fce",
        parent: Some("pronoun"),
        level: Intermediate,
        english: &["interrogative pronoun", "question word"],
        native: &["疑问代词"],
        romanized: &["yiwen daici"],
    },
    TagSpec {
        id: "pronoun",
        color: "#8e44ad",
        parent: None,
        level: Beginner,
        english: &["pronoun"],
        native: &["代词"],
        romanized: &["daici"],
    },
    TagSpec {
        id: "proper_noun",
        color: "#1b4f72",
        parent: Some("noun"),
        level: Intermediate,
        english: &["proper noun"],
        native: &["专有名词"],
        romanized: &["zhuanyou mingci"],
    },
    TagSpec {
        id: "localizer",
        color: "#85c1e9",
        parent: Some("noun"),
        level: Advanced,
        english: &["localizer", "locative"],
        native: &["方位词"],
        romanized: &["fangweici"],
    },
    TagSpec {
        id: "noun",
        color: "#2e86c1",
        parent: None,
        level: Beginner,
        english: &["noun"],
        native: &["名词"],
        romanized: &["mingci"],
    },
    TagSpec {
        id: "measure_word",
        color: "#148f77",
        parent: None,
        level: Beginner,
        english: &["measure word", "classifier"],
        native: &["量词"],
        romanized: &["liangci"],
    },
    TagSpec {
        id: "modal_verb",
        color: "#e74c3c",
        parent: Some("verb"),
        level: Intermediate,
        english: &["modal verb", "modal auxiliary", "auxiliary"],
        native: &["能愿动词", "助动词"],
        romanized: &["zhudongci"],
    },
    TagSpec {
        id: "adverb",
        color: "#d35400",
        parent: None,
        level: Beginner,
        english: &["adverb"],
        native: &["副词"],
        romanized: &["fuci"],
    },
    TagSpec {
        id: "verb",
        color: "#c0392b",
        parent: None,
        level: Beginner,
        english: &["verb"],
        native: &["动词"],
        romanized: &["dongci"],
    },
    TagSpec {
        id: "adjective",
        color: "#27ae60",
        parent: None,
        level: Beginner,
        english: &["adjective"],
        native: &["形容词"],
        romanized: &["xingrongci"],
    },
    TagSpec {
        id: "aspect_marker",
        color: "#e67e22",
        parent: Some("particle"),
        level: Intermediate,
        english: &["aspect marker", "aspect particle", "aspectual"],
        native: &["动态助词"],
        romanized: &["dongtai zhuci"],
    },
    TagSpec {
        id: "structural_particle",
        color: "#dc7633",
        parent: Some("particle"),
        level: Intermediate,
        english: &["structural"],
        native: &["结构助词"],
        romanized: &["jiegou zhuci"],
    },
    TagSpec {
        id: "modal_particle",
        color: "#e59866",
        parent: Some("particle"),
        level: Intermediate,
        english: &["modal particle", "final particle", "question particle"],
        native: &["语气助词", "语气词"],
        romanized: &["yuqi zhuci", "yuqici"],
    },
    TagSpec {
        id: "particle",
        color: "#a04000",
        parent: None,
        level: Beginner,
        english: &["particle"],
        native: &["助词"],
        romanized: &["zhuci"],
    },
    TagSpec {
        id: "preposition",
        color: "#f39c12",
        parent: None,
        level: Beginner,
        english: &["preposition"],
        native: &["介词"],
        romanized: &["jieci"],
    },
    TagSpec {
        id: "conjunction",
        color: "#16a085",
        parent: None,
        level: Beginner,
        english: &["conjunction"],
        native: &["连词"],
        romanized: &["lianci"],
    },
    TagSpec {
        id: "negation",
        color: "#b03a2e",
        parent: None,
        level: Beginner,
        english: &["negation", "negative"],
        native: &["否定词"],
        romanized: &["fouding"],
    },
    TagSpec {
        id: "numeral",
        color: "#117864",
        parent: None,
        level: Beginner,
        english: &["numeral", "number"],
        native: &["数词"],
        romanized: &["shuci"],
    },
    TagSpec {
        id: "interjection",
        color: "#f1c40f",
        parent: None,
        level: Intermediate,
        english: &["interjection", "exclamation"],
        native: &["叹词"],
        romanized: &["tanci"],
    },
    TagSpec {
        id: "other",
        color: "#95a5a6",
        parent: None,
        level: Beginner,
        english: &["other", "unknown"],
        native: &["其他"],
        romanized: &["qita"],
    },
];

const MARKERS: &[MarkerRule] = &[
    MarkerRule::RoleOf {
        name: "aspect",
        triggers: &["了", "着", "过"],
        roles: &["aspect_marker", "modal_particle", "particle", "verb"],
    },
    MarkerRule::RoleOf {
        name: "de",
        triggers: &["的", "地", "得"],
        roles: &["structural_particle", "particle", "modal_verb", "verb"],
    },
    MarkerRule::RoleOf {
        name: "sentence_final",
        triggers: &["吗", "呢", "吧"],
        roles: &["modal_particle", "particle"],
    },
    MarkerRule::RoleOf {
        name: "negator",
        triggers: &["不", "没"],
        roles: &["negation", "adverb"],
    },
];

pub const CHINESE: LanguageSpec = LanguageSpec {
    code: "zh",
    name: "Mandarin Chinese",
    direction: ScriptDirection::Ltr,
    segmentation: Segmentation::Character,
    scripts: &[Script::Han],
    accepts_romanization: true,
    tags: TAGS,
    repairs: &[
        ("名词名词", "名词"),
        ("动词动词", "动词"),
        ("ming_ci", "mingci"),
        ("dong_ci", "dongci"),
        ("zhu_ci", "zhuci"),
        ("liang_ci", "liangci"),
        ("dai_ci", "daici"),
        ("fu_ci", "fuci"),
        ("xing_rong_ci", "xingrongci"),
        ("jie_ci", "jieci"),
        ("lian_ci", "lianci"),
    ],
    heuristics: &[
        ("subject", "noun"),
        ("object", "noun"),
        ("主语", "noun"),
        ("宾语", "noun"),
        ("question", "modal_particle"),
        ("modifier", "adjective"),
        ("tense", "aspect_marker"),
        ("aspect", "aspect_marker"),
        ("progressive", "aspect_marker"),
        ("continuous", "aspect_marker"),
        ("marker", "particle"),
    ],
    markers: MARKERS,
};
