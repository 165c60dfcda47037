//! Kingdom inference from resource titles.
//!
//! Feed items do not declare a taxonomic scope, but most dataset titles
//! mention one ("Flora of ...", "Bird survey ..."). The classifier scans a
//! fixed keyword list per kingdom; when nothing matches, the per-source
//! default applies (herbarium feeds default to Plantae, faunistic feeds to
//! Animalia).

use crate::models::Kingdom;

/// Plantae keywords, scanned first and in this order.
const PLANTAE_KEYWORDS: &[&str] = &[
    "flora",
    "plant",
    "botanic",
    "herb",
    "tree",
    "flower",
    "leaf",
    "seed",
    "pollen",
    "algae",
    "moss",
    "fern",
    "grass",
    "fungi",
    "mushroom",
    "lichen",
    "bryophyte",
    "pteridophyte",
    "gymnosperm",
    "angiosperm",
];

/// Animalia keywords, scanned only when no Plantae keyword hits.
const ANIMALIA_KEYWORDS: &[&str] = &[
    "fauna",
    "animal",
    "bird",
    "mammal",
    "fish",
    "insect",
    "beetle",
    "butterfly",
    "spider",
    "reptile",
    "amphibian",
    "mollusk",
    "arthropod",
    "vertebrate",
    "invertebrate",
    "zoo",
];

/// Classifies titles into [`Kingdom`]s via case-insensitive substring
/// matching against its owned keyword sets.
#[derive(Debug, Clone)]
pub struct KingdomClassifier {
    plantae: Vec<String>,
    animalia: Vec<String>,
}

impl KingdomClassifier {
    /// Build a classifier with custom keyword sets. Keywords are matched
    /// against the lower-cased title, so they should be lower-case.
    pub fn new(plantae: Vec<String>, animalia: Vec<String>) -> Self {
        Self { plantae, animalia }
    }

    /// Infer the kingdom for a title, falling back to `default_kingdom`.
    ///
    /// Plantae keywords are scanned first, in listed order; the first
    /// substring hit wins. A title containing keywords from both sets is
    /// therefore always Plantae. Empty titles short-circuit to the default.
    pub fn classify(&self, title: &str, default_kingdom: Kingdom) -> Kingdom {
        if title.is_empty() {
            return default_kingdom;
        }

        let title_lower = title.to_lowercase();

        for keyword in &self.plantae {
            if title_lower.contains(keyword.as_str()) {
                return Kingdom::Plantae;
            }
        }

        for keyword in &self.animalia {
            if title_lower.contains(keyword.as_str()) {
                return Kingdom::Animalia;
            }
        }

        default_kingdom
    }
}

impl Default for KingdomClassifier {
    fn default() -> Self {
        Self::new(
            PLANTAE_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            ANIMALIA_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        )
    }
}
