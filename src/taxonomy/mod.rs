//! Per-language grammatical role taxonomies.
//!
//! Each language declares its tags in precedence order: a narrower tag (`personal_pronoun`) is
//! listed before every broader tag it could be confused with (`pronoun`). The classifier walks the
//! list front to back, so the order is load-bearing and is validated once when the registry is
//! built.

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::textutil::Script;

mod arabic;
mod chinese;
mod hindi;
mod spanish;

pub const CATCH_ALL: &str = "other";
pub const MIN_TAGS: usize = 15;
pub const MAX_TAGS: usize = 25;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptDirection {
    Ltr,
    Rtl,
}

impl ScriptDirection {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScriptDirection::Ltr => "ltr",
            ScriptDirection::Rtl => "rtl",
        }
    }
}

/// How a sentence splits into words: on whitespace, or not at all (one glyph per unit).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segmentation {
    Whitespace,
    Character,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Complexity {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Complexity::Beginner => "beginner",
            Complexity::Intermediate => "intermediate",
            Complexity::Advanced => "advanced",
        }
    }
}

/// Static declaration of one tag, as written in the per-language data modules.
#[derive(Clone, Copy, Debug)]
pub struct TagSpec {
    pub id: &'static str,
    pub color: &'static str,
    pub parent: Option<&'static str>,
    pub level: Complexity,
    pub english: &'static [&'static str],
    pub native: &'static [&'static str],
    pub romanized: &'static [&'static str],
}

#[derive(Clone, Copy, Debug)]
pub enum MarkerRule {
    /// Whenever one of `triggers` is analysed as a word, its role must be one of `roles`.
    RoleOf {
        name: &'static str,
        triggers: &'static [&'static str],
        roles: &'static [&'static str],
    },
    /// When the sentence contains one of `when_any`, it must also contain one of `expect_any` or a
    /// word ending in one of `expect_suffixes`.
    Requires {
        name: &'static str,
        when_any: &'static [&'static str],
        expect_any: &'static [&'static str],
        expect_suffixes: &'static [&'static str],
    },
}

impl MarkerRule {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            MarkerRule::RoleOf { name, .. } | MarkerRule::Requires { name, .. } => name,
        }
    }
}

/// Static declaration of a whole language.
#[derive(Clone, Copy, Debug)]
pub struct LanguageSpec {
    pub code: &'static str,
    pub name: &'static str,
    pub direction: ScriptDirection,
    pub segmentation: Segmentation,
    pub scripts: &'static [Script],
    pub accepts_romanization: bool,
    pub tags: &'static [TagSpec],
    pub repairs: &'static [(&'static str, &'static str)],
    /// Substring fallbacks, first hit wins: specific needles go before generic ones like `marker`.
    pub heuristics: &'static [(&'static str, &'static str)],
    pub markers: &'static [MarkerRule],
}

#[derive(Clone, Debug)]
pub struct RoleTag {
    pub id: &'static str,
    pub color: &'static str,
    pub rank: usize,
    pub parent: Option<&'static str>,
    pub min_level: Complexity,
    keywords: Vec<String>,
}

impl RoleTag {
    fn from_spec(spec: &TagSpec, rank: usize) -> Self {
        let mut keywords: Vec<String> = Vec::new();
        let sources = std::iter::once(spec.id)
            .chain(spec.english.iter().copied())
            .chain(spec.native.iter().copied())
            .chain(spec.romanized.iter().copied());
        for kw in sources {
            let kw = normalize_keyword(kw);
            if !kw.is_empty() && !keywords.contains(&kw) {
                keywords.push(kw);
            }
        }
        Self {
            id: spec.id,
            color: spec.color,
            rank,
            parent: spec.parent,
            min_level: spec.level,
            keywords,
        }
    }

    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// True when the already-normalized role string mentions one of this tag's keywords.
    #[must_use]
    pub fn matches(&self, normalized_role: &str) -> bool {
        self.keywords.iter().any(|kw| normalized_role.contains(kw.as_str()))
    }

    #[must_use]
    pub fn eligible_at(&self, level: Complexity) -> bool {
        self.min_level <= level
    }
}

/// Lowercase, and fold spaces and hyphens into single underscores.
#[must_use]
pub fn normalize_keyword(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for ch in raw.trim().chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_sep = !out.is_empty();
            continue;
        }
        if pending_sep {
            out.push('_');
            pending_sep = false;
        }
        for lc in ch.to_lowercase() {
            out.push(lc);
        }
    }
    out
}

#[derive(Clone, Debug)]
pub struct LanguageProfile {
    pub code: &'static str,
    pub name: &'static str,
    pub direction: ScriptDirection,
    pub segmentation: Segmentation,
    pub scripts: Vec<Script>,
    pub accepts_romanization: bool,
    tags: Vec<RoleTag>,
    pub repairs: &'static [(&'static str, &'static str)],
    pub heuristics: &'static [(&'static str, &'static str)],
    pub markers: &'static [MarkerRule],
}

impl LanguageProfile {
    pub fn build(spec: &LanguageSpec) -> Result<Self, TaxonomyError> {
        validate_spec(spec)?;
        let tags = spec
            .tags
            .iter()
            .enumerate()
            .map(|(rank, t)| RoleTag::from_spec(t, rank))
            .collect();
        Ok(Self {
            code: spec.code,
            name: spec.name,
            direction: spec.direction,
            segmentation: spec.segmentation,
            scripts: spec.scripts.to_vec(),
            accepts_romanization: spec.accepts_romanization,
            tags,
            repairs: spec.repairs,
            heuristics: spec.heuristics,
            markers: spec.markers,
        })
    }

    /// Tags in precedence order (children first, `other` last).
    #[must_use]
    pub fn tags(&self) -> &[RoleTag] {
        &self.tags
    }

    #[must_use]
    pub fn tag(&self, id: &str) -> Option<&RoleTag> {
        self.tags.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn other(&self) -> &RoleTag {
        // `validate_spec` guarantees the catch-all is present and last.
        &self.tags[self.tags.len() - 1]
    }

    #[must_use]
    pub fn color_of(&self, id: &str) -> &'static str {
        self.tag(id).unwrap_or_else(|| self.other()).color
    }

    pub fn eligible_tags(&self, level: Complexity) -> impl Iterator<Item = &RoleTag> + '_ {
        self.tags.iter().filter(move |t| t.eligible_at(level))
    }

    #[must_use]
    pub fn is_rtl(&self) -> bool {
        self.direction == ScriptDirection::Rtl
    }

    /// Whether `ch` is acceptable inside a word of this language.
    #[must_use]
    pub fn allows_char(&self, ch: char) -> bool {
        if self.scripts.iter().any(|s| s.contains(ch)) {
            return true;
        }
        self.accepts_romanization && Script::Latin.contains(ch)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TaxonomyError {
    #[error("[{lang}] duplicate tag id: {tag}")]
    DuplicateTag { lang: &'static str, tag: &'static str },
    #[error("[{lang}] tag {tag} declares unknown parent {parent}")]
    UnknownParent {
        lang: &'static str,
        tag: &'static str,
        parent: &'static str,
    },
    #[error("[{lang}] child tag {child} must precede parent {parent}")]
    ChildAfterParent {
        lang: &'static str,
        child: &'static str,
        parent: &'static str,
    },
    #[error("[{lang}] catch-all tag `other` missing or not last")]
    CatchAll { lang: &'static str },
    #[error("[{lang}] tag {tag} has invalid color {color} (want #rrggbb)")]
    InvalidColor {
        lang: &'static str,
        tag: &'static str,
        color: &'static str,
    },
    #[error("[{lang}] {count} tags declared (want 15..=25)")]
    TagCount { lang: &'static str, count: usize },
    #[error("[{lang}] {context} refers to unknown tag {tag}")]
    UnknownTagReference {
        lang: &'static str,
        context: String,
        tag: &'static str,
    },
    #[error("duplicate language code: {0}")]
    DuplicateLanguage(&'static str),
}

/// Load-time invariants. Any failure here would silently corrupt every classification for the
/// language, so registry construction refuses to continue.
pub fn validate_spec(spec: &LanguageSpec) -> Result<(), TaxonomyError> {
    let lang = spec.code;
    let count = spec.tags.len();
    if !(MIN_TAGS..=MAX_TAGS).contains(&count) {
        return Err(TaxonomyError::TagCount { lang, count });
    }

    let mut seen: HashSet<&'static str> = HashSet::new();
    for t in spec.tags {
        if !seen.insert(t.id) {
            return Err(TaxonomyError::DuplicateTag { lang, tag: t.id });
        }
        if !is_hex_color(t.color) {
            return Err(TaxonomyError::InvalidColor {
                lang,
                tag: t.id,
                color: t.color,
            });
        }
    }
    if spec.tags.last().map(|t| t.id) != Some(CATCH_ALL) {
        return Err(TaxonomyError::CatchAll { lang });
    }

    let rank_of = |id: &str| spec.tags.iter().position(|t| t.id == id);
    for (rank, t) in spec.tags.iter().enumerate() {
        let Some(parent) = t.parent else {
            continue;
        };
        let Some(parent_rank) = rank_of(parent) else {
            return Err(TaxonomyError::UnknownParent {
                lang,
                tag: t.id,
                parent,
            });
        };
        if rank >= parent_rank {
            return Err(TaxonomyError::ChildAfterParent {
                lang,
                child: t.id,
                parent,
            });
        }
    }

    // Implicit pairs: an id that contains another id would be shadowed by it under substring
    // matching, so the longer one must come first.
    for (i, a) in spec.tags.iter().enumerate() {
        for (j, b) in spec.tags.iter().enumerate() {
            if i == j || b.id == CATCH_ALL {
                continue;
            }
            if a.id.contains(b.id) && i > j {
                return Err(TaxonomyError::ChildAfterParent {
                    lang,
                    child: a.id,
                    parent: b.id,
                });
            }
        }
    }

    for (needle, tag) in spec.heuristics {
        if rank_of(tag).is_none() {
            return Err(TaxonomyError::UnknownTagReference {
                lang,
                context: format!("heuristic `{needle}`"),
                tag,
            });
        }
    }
    for rule in spec.markers {
        if let MarkerRule::RoleOf { name, roles, .. } = rule {
            for tag in roles.iter() {
                if rank_of(tag).is_none() {
                    return Err(TaxonomyError::UnknownTagReference {
                        lang,
                        context: format!("marker rule `{name}`"),
                        tag,
                    });
                }
            }
        }
    }
    Ok(())
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

pub const BUILTIN_LANGUAGES: [&LanguageSpec; 4] = [
    &hindi::HINDI,
    &arabic::ARABIC,
    &spanish::SPANISH,
    &chinese::CHINESE,
];

/// Immutable profiles keyed by language code.
#[derive(Clone, Debug)]
pub struct LanguageRegistry {
    profiles: BTreeMap<&'static str, LanguageProfile>,
}

impl LanguageRegistry {
    pub fn from_specs(specs: &[&LanguageSpec]) -> Result<Self, TaxonomyError> {
        let mut profiles = BTreeMap::new();
        for spec in specs {
            let profile = LanguageProfile::build(spec)?;
            if profiles.insert(spec.code, profile).is_some() {
                return Err(TaxonomyError::DuplicateLanguage(spec.code));
            }
        }
        Ok(Self { profiles })
    }

    pub fn builtin() -> Result<Self, TaxonomyError> {
        Self::from_specs(&BUILTIN_LANGUAGES)
    }

    /// Looks up `hi`, `HI`, `hi-IN` and `hi_IN` alike.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&LanguageProfile> {
        let code = code.trim().to_ascii_lowercase();
        let primary = code.split(['-', '_']).next().unwrap_or("");
        self.profiles.get(primary)
    }

    pub fn codes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.profiles.keys().copied()
    }

    pub fn profiles(&self) -> impl Iterator<Item = &LanguageProfile> {
        self.profiles.values()
    }
}

static REGISTRY: Lazy<Result<LanguageRegistry, TaxonomyError>> =
    Lazy::new(LanguageRegistry::builtin);

/// Process-wide registry of the built-in languages, built on first use.
pub fn registry() -> Result<&'static LanguageRegistry, TaxonomyError> {
    REGISTRY.as_ref().map_err(Clone::clone)
}
