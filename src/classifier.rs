use crate::taxonomy::{normalize_keyword, Complexity, LanguageProfile, RoleTag};

/// Maps free-text grammatical roles onto one tag of a language's closed set.
#[derive(Clone, Copy, Debug)]
pub struct RoleClassifier<'a> {
    profile: &'a LanguageProfile,
    level: Complexity,
}

impl<'a> RoleClassifier<'a> {
    #[must_use]
    pub fn new(profile: &'a LanguageProfile, level: Complexity) -> Self {
        Self { profile, level }
    }

    #[must_use]
    pub fn profile(&self) -> &'a LanguageProfile {
        self.profile
    }

    #[must_use]
    pub fn level(&self) -> Complexity {
        self.level
    }

    /// Always returns a tag; `other` when nothing in the taxonomy fits.
    #[must_use]
    pub fn classify(&self, raw_role: &str) -> &'a RoleTag {
        let role = normalize_role(self.profile, raw_role);
        if role.is_empty() {
            return self.profile.other();
        }

        if let Some(tag) = self.profile.tags().iter().find(|t| t.matches(&role)) {
            return self.gate(tag);
        }

        for (needle, tag_id) in self.profile.heuristics {
            if role.contains(needle) {
                if let Some(tag) = self.profile.tag(tag_id) {
                    return self.gate(tag);
                }
            }
        }
        self.profile.other()
    }

    /// Nearest ancestor (self included) that is taught at this level.
    fn gate(&self, tag: &'a RoleTag) -> &'a RoleTag {
        let mut cur = Some(tag);
        while let Some(t) = cur {
            if t.eligible_at(self.level) {
                return t;
            }
            cur = t.parent.and_then(|p| self.profile.tag(p));
        }
        self.profile.other()
    }
}

/// Keyword-normalized role string with hallucination artifacts repaired.
#[must_use]
pub fn normalize_role(profile: &LanguageProfile, raw: &str) -> String {
    let mut role = collapse_duplicates(&normalize_keyword(raw));
    for (from, to) in profile.repairs {
        if role.contains(from) {
            role = role.replace(from, to);
        }
    }
    role
}

/// `noun_noun` -> `noun`, `adj_adjective` -> `adjective`, `pronounpronoun` -> `pronoun`.
fn collapse_duplicates(role: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    for seg in role.split('_').filter(|s| !s.is_empty()) {
        let seg = halve_doubled(seg);
        match parts.last_mut() {
            Some(prev) if *prev == seg => {}
            Some(prev) if prev.chars().count() >= 2 && seg.starts_with(prev.as_str()) => {
                *prev = seg.to_string();
            }
            _ => parts.push(seg.to_string()),
        }
    }
    parts.join("_")
}

fn halve_doubled(seg: &str) -> &str {
    let n = seg.chars().count();
    if n < 4 || n % 2 != 0 {
        return seg;
    }
    let mid = seg
        .char_indices()
        .nth(n / 2)
        .map(|(i, _)| i)
        .unwrap_or(seg.len());
    let (a, b) = seg.split_at(mid);
    if a == b {
        a
    } else {
        seg
    }
}
