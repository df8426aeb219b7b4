use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Canonicalizes a raw country name: lowercased, trimmed, internal
/// whitespace / hyphens / apostrophes replaced with underscores, asterisks
/// stripped. Idempotent.
pub fn normalize_country_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| *c != '*')
        .map(|c| match c {
            ' ' | '-' | '\'' => '_',
            _ => c.to_ascii_lowercase(),
        })
        .collect()
}

/// One raw-variant-to-canonical-name mapping. Raw side is matched after
/// normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasEntry {
    pub raw: String,
    pub canonical: String,
}

/// Declarative table of country aliases. Collapses differently-punctuated
/// source rows (the two Congo entries) and renames awkward source names
/// ("Korea, South" becomes "south_korea").
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    map: HashMap<String, String>,
}

impl AliasTable {
    pub fn new(entries: &[AliasEntry]) -> Self {
        let map = entries
            .iter()
            .map(|e| {
                (
                    normalize_country_name(&e.raw),
                    normalize_country_name(&e.canonical),
                )
            })
            .collect();
        Self { map }
    }

    /// Canonical name for a raw country string: normalized, then mapped
    /// through the alias table.
    pub fn canonical(&self, raw: &str) -> String {
        let normalized = normalize_country_name(raw);
        match self.map.get(&normalized) {
            Some(canonical) => canonical.clone(),
            None => normalized,
        }
    }
}

pub fn default_aliases() -> Vec<AliasEntry> {
    [
        ("congo_(brazzaville)", "congo"),
        ("congo_(kinshasa)", "congo"),
        ("korea,_south", "south_korea"),
    ]
    .iter()
    .map(|(raw, canonical)| AliasEntry {
        raw: raw.to_string(),
        canonical: canonical.to_string(),
    })
    .collect()
}
