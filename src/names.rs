use std::collections::HashMap;

use once_cell::sync::Lazy;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Clubs that show up under different spellings across sources (historical
/// renames, short forms). Keyed by the spelling as scraped, value is the
/// canonical name the stadium roster uses.
static TEAM_CANON: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Athletic Bilbao", "Athletic Club"),
        ("Albacete BP", "Albacete Balompié"),
        ("Albacete", "Albacete Balompié"),
        ("R. Racing Club", "Real Racing Club"),
        ("Racing", "Real Racing Club"),
    ])
});

/// Normalized spellings mapped to the normalized key the stadium roster
/// actually indexes under. Consulted by the resolver only after the direct
/// team lookup misses.
static TEAM_INDEX_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("real racing club", "r. racing club"),
        ("albacete balompie", "albacete bp"),
        ("athletic bilbao", "athletic club"),
    ])
});

/// Canonical join key for entity names: NFD-decompose, drop diacritic marks,
/// lowercase, trim and collapse internal whitespace. Two names refer to the
/// same entity iff their keys compare equal. Empty input stays empty and
/// callers must treat an empty key as "no match".
pub fn normalize(raw: &str) -> String {
    let stripped: String = raw.nfd().filter(|ch| !is_combining_mark(*ch)).collect();
    let lowered = stripped.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for word in lowered.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Resolve a raw team spelling to its canonical roster name. Applied before
/// normalization so that sources using old club names join correctly.
pub fn canonical_team(raw: &str) -> &str {
    TEAM_CANON.get(raw.trim()).copied().unwrap_or(raw)
}

/// The join key used for team lookups everywhere in the pipeline.
pub fn team_key(raw: &str) -> String {
    normalize(canonical_team(raw))
}

/// Fallback spelling for a normalized team key that missed the stadium index.
pub fn index_alias(normalized: &str) -> Option<&'static str> {
    TEAM_INDEX_ALIASES.get(normalized).copied()
}
