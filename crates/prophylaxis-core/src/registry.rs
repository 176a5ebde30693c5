//! Drug profile registry.
//!
//! Handles:
//! - Alias lookup (aimovig→erenumab, ajovy→fremanezumab)
//! - Name matching against free-form medication entries
//! - Context checks that separate real administrations from incidental mentions
//! - The prophylaxis keyword list used to tell acute from preventive medication

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

/// Shortest medication name allowed to match as a substring of an alias.
const MIN_REVERSE_MATCH_LEN: usize = 3;

/// Characters searched on each side of an alias for context words.
const CONTEXT_RADIUS: usize = 40;

/// Minimum Jaro-Winkler similarity for a typo suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.88;

/// Words indicating the drug was actually administered.
const ADMINISTRATION_VERBS: &[&str] = &[
    "gespritzt",
    "spritze",
    "injiziert",
    "injektion",
    "injection",
    "injected",
    "inject",
    "autoinjektor",
    "autoinjector",
    "verabreicht",
    "administered",
    "genommen",
    "taken",
    "took",
    "gesetzt",
    "bekommen",
    "erhalten",
    "received",
];

/// Words indicating the drug was only talked about.
const INCIDENTAL_MARKERS: &[&str] = &[
    "termin",
    "appointment",
    "rezept",
    "prescription",
    "apotheke",
    "pharmacy",
    "bestellt",
    "ordered",
    "vergessen",
    "forgot",
    "morgen",
    "tomorrow",
    "nächste",
    "next",
];

/// Stems of preventive migraine medications. Everything else counts as acute.
const PROPHYLAXIS_KEYWORDS: &[&str] = &[
    // CGRP antibodies
    "erenumab",
    "aimovig",
    "fremanezumab",
    "ajovy",
    "galcanezumab",
    "emgality",
    "eptinezumab",
    "vyepti",
    // Anticonvulsants
    "topiramat",
    "topamax",
    "valproat",
    "valproin",
    "depakine",
    // Beta-blockers
    "metoprolol",
    "propranolol",
    "bisoprolol",
    // Tricyclics
    "amitriptylin",
    "nortriptylin",
    // Calcium channel / ARB
    "flunarizin",
    "sibelium",
    "candesartan",
    // Botulinum toxin
    "botox",
    "botulinum",
    "onabotulinumtoxin",
];

/// How a drug mention in free text reads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MentionContext {
    /// An administration verb appears near the name
    Administration,
    /// Only appointment/prescription wording appears near the name
    Incidental,
    /// Neither
    Unspecified,
}

/// Static profile of one prophylactic agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrugProfile {
    /// Canonical lowercase ID
    pub id: String,
    pub display_name: String,
    /// Lowercase names, generic and brand
    pub aliases: Vec<String>,
    /// Typical dosing interval, informational only
    pub typical_interval_days: Option<u32>,
    pub administration_verbs: Vec<String>,
    pub incidental_markers: Vec<String>,
}

impl DrugProfile {
    fn new(id: &str, display_name: &str, aliases: &[&str], interval: Option<u32>) -> Self {
        let mut all_aliases = vec![id.to_lowercase()];
        all_aliases.extend(aliases.iter().map(|a| a.to_lowercase()));
        all_aliases.dedup();
        Self {
            id: id.to_lowercase(),
            display_name: display_name.to_string(),
            aliases: all_aliases,
            typical_interval_days: interval,
            administration_verbs: ADMINISTRATION_VERBS.iter().map(|v| v.to_string()).collect(),
            incidental_markers: INCIDENTAL_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Profile for a drug the registry does not know; its ID is its only alias.
    pub fn fallback(id: &str) -> Self {
        Self::new(id.trim(), id.trim(), &[], None)
    }

    /// Case-insensitive substring match in either direction.
    pub fn matches_name(&self, name: &str) -> bool {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }
        let reverse_allowed = needle.chars().count() >= MIN_REVERSE_MATCH_LEN;
        self.aliases.iter().any(|alias| {
            needle.contains(alias.as_str()) || (reverse_allowed && alias.contains(needle.as_str()))
        })
    }

    pub fn matches_any(&self, names: &[String]) -> bool {
        names.iter().any(|n| self.matches_name(n))
    }

    /// Classify the wording around each alias occurrence. `None` if not mentioned.
    pub fn mention_context(&self, text: &str) -> Option<MentionContext> {
        let lower = text.to_lowercase();
        let mut mentioned = false;
        let mut incidental = false;

        for alias in &self.aliases {
            for (pos, _) in lower.match_indices(alias.as_str()) {
                mentioned = true;
                let window = context_window(&lower, pos, alias.len());
                if self.administration_verbs.iter().any(|v| window.contains(v.as_str())) {
                    return Some(MentionContext::Administration);
                }
                if self.incidental_markers.iter().any(|m| window.contains(m.as_str())) {
                    incidental = true;
                }
            }
        }

        match (mentioned, incidental) {
            (false, _) => None,
            (true, true) => Some(MentionContext::Incidental),
            (true, false) => Some(MentionContext::Unspecified),
        }
    }
}

/// Slice of `text` around a match, snapped to char boundaries.
fn context_window(text: &str, pos: usize, len: usize) -> &str {
    let mut start = pos.saturating_sub(CONTEXT_RADIUS);
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (pos + len + CONTEXT_RADIUS).min(text.len());
    while !text.is_char_boundary(end) {
        end += 1;
    }
    &text[start..end]
}

/// Whether a medication name is a known preventive agent.
pub fn is_prophylactic_medication(name: &str) -> bool {
    let lower = name.to_lowercase();
    PROPHYLAXIS_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Catalog of known prophylactic drugs.
pub struct DrugRegistry {
    profiles: BTreeMap<String, DrugProfile>,
    /// Alias → canonical ID
    alias_index: HashMap<String, String>,
}

impl Default for DrugRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DrugRegistry {
    /// Create a registry with the built-in profiles.
    pub fn new() -> Self {
        let mut registry = Self {
            profiles: BTreeMap::new(),
            alias_index: HashMap::new(),
        };
        for profile in Self::default_profiles() {
            registry.add_profile(profile);
        }
        registry
    }

    /// Add or replace a profile.
    pub fn add_profile(&mut self, profile: DrugProfile) {
        for alias in &profile.aliases {
            self.alias_index.insert(alias.clone(), profile.id.clone());
        }
        self.profiles.insert(profile.id.clone(), profile);
    }

    pub fn get(&self, id: &str) -> Option<&DrugProfile> {
        self.profiles.get(&id.trim().to_lowercase())
    }

    /// Known profile, or a fallback whose only alias is the ID.
    pub fn profile_or_fallback(&self, id: &str) -> DrugProfile {
        self.get(id)
            .cloned()
            .unwrap_or_else(|| DrugProfile::fallback(id))
    }

    /// Exact, case-insensitive alias lookup.
    pub fn find_by_alias(&self, name: &str) -> Option<&DrugProfile> {
        let id = self.alias_index.get(&name.trim().to_lowercase())?;
        self.profiles.get(id)
    }

    /// Alias lookup that tolerates typos ("aimovic", "emgalty").
    pub fn suggest(&self, name: &str) -> Option<&DrugProfile> {
        if let Some(profile) = self.find_by_alias(name) {
            return Some(profile);
        }
        let query = name.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        let mut best: Option<(&DrugProfile, f64)> = None;
        for profile in self.profiles.values() {
            for alias in &profile.aliases {
                let similarity = jaro_winkler(&query, alias);
                if similarity >= SUGGESTION_THRESHOLD
                    && best.map_or(true, |(_, score)| similarity > score)
                {
                    best = Some((profile, similarity));
                }
            }
        }
        best.map(|(profile, _)| profile)
    }

    /// All profiles, ordered by ID.
    pub fn profiles(&self) -> impl Iterator<Item = &DrugProfile> {
        self.profiles.values()
    }

    fn default_profiles() -> Vec<DrugProfile> {
        vec![
            // CGRP receptor antibody
            DrugProfile::new("erenumab", "Erenumab (Aimovig)", &["aimovig"], Some(28)),
            // CGRP ligand antibodies
            DrugProfile::new("fremanezumab", "Fremanezumab (Ajovy)", &["ajovy"], Some(28)),
            DrugProfile::new("galcanezumab", "Galcanezumab (Emgality)", &["emgality"], Some(28)),
            {
                let mut vyepti =
                    DrugProfile::new("eptinezumab", "Eptinezumab (Vyepti)", &["vyepti"], Some(84));
                vyepti
                    .administration_verbs
                    .extend(["infusion".to_string(), "infundiert".to_string()]);
                vyepti
            },
            DrugProfile::new(
                "onabotulinumtoxina",
                "OnabotulinumtoxinA (Botox)",
                &["botox", "botulinumtoxin", "botulinum"],
                Some(84),
            ),
        ]
    }
}
