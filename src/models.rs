//! Core data models used throughout ipt-recon.
//!
//! These types represent the feed items, harvested resources, and catalog
//! records that flow through the reconciliation pipeline.

use serde::Deserialize;

/// Raw item parsed from a feed source before annotation.
#[derive(Debug, Clone, Default)]
pub struct RawFeedItem {
    pub title: String,
    pub link: String,
    pub guid: String,
    pub description: String,
    /// Feed-native publication date, kept unparsed.
    pub published_at: String,
}

/// Coarse taxonomic classification inferred from a resource title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Kingdom {
    Plantae,
    Animalia,
}

impl Kingdom {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kingdom::Plantae => "Plantae",
            Kingdom::Animalia => "Animalia",
        }
    }
}

impl std::fmt::Display for Kingdom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A feed item annotated with its originating source and derived fields.
///
/// Constructed once per item during ingestion; the derived `tag` and
/// `kingdom` fields are computed exactly once at construction.
#[derive(Debug, Clone)]
pub struct HarvestedResource {
    pub title: String,
    pub link: String,
    pub guid: String,
    pub description: String,
    pub published_at: String,
    /// Stable identifier extracted from the link (or guid); may be empty.
    pub tag: String,
    /// Inferred kingdom; always populated via the source's default.
    pub kingdom: Kingdom,
    pub source_id: String,
    pub source_base_url: String,
}

/// One row from the canonical reference catalog. Read-only snapshot.
#[derive(Debug, Clone)]
pub struct ReferenceRecord {
    pub record_id: String,
    pub name: String,
    /// May be empty when the catalog row carries no tag.
    pub tag: String,
}

/// Column descriptor from the catalog table schema. Reporting only.
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub id: String,
    pub label: String,
    pub col_type: String,
}

/// Match strategies, in the fixed order they are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    TagExact,
    TitleNormalizedExact,
    TitleSimilarity,
}

impl MatchStrategy {
    /// All strategies in attempt order.
    pub const ALL: [MatchStrategy; 3] = [
        MatchStrategy::TagExact,
        MatchStrategy::TitleNormalizedExact,
        MatchStrategy::TitleSimilarity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrategy::TagExact => "tag_exact",
            MatchStrategy::TitleNormalizedExact => "title_normalized_exact",
            MatchStrategy::TitleSimilarity => "title_similarity",
        }
    }
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of attempting to reconcile one harvested resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched {
        strategy: MatchStrategy,
        record_id: String,
    },
    Unmatched,
}

/// A harvested resource with no corresponding catalog record.
///
/// `attempted_strategies` exists purely for diagnostics.
#[derive(Debug, Clone)]
pub struct MissingResource {
    pub resource: HarvestedResource,
    pub attempted_strategies: Vec<MatchStrategy>,
}
