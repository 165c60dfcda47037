//! Three-tier record matching against the reference index.
//!
//! For each harvested resource the engine tries, in fixed priority order:
//!
//! 1. **tag_exact**: the extracted tag is present in the catalog.
//! 2. **title_normalized_exact**: the version-stripped, normalized title
//!    equals a normalized catalog name.
//! 3. **title_similarity**: the normalized title is within a fixed
//!    similarity threshold of a catalog name. The index is scanned in
//!    stored order and the first candidate at or above the threshold wins;
//!    there is no search for a global best.
//!
//! The fuzzy tier catches records stored under a different identifier or
//! re-published with an edited title. Similarity is the
//! longest-matching-block sequence ratio (Ratcliff/Obershelp), 1.0
//! meaning identical.

use crate::index::ReferenceIndex;
use crate::models::{HarvestedResource, MatchOutcome, MatchStrategy, MissingResource};
use crate::normalize::{normalize, strip_version_suffix};

/// Minimum similarity ratio for a title_similarity match. Fixed policy
/// constant; not configurable.
pub const SIMILARITY_THRESHOLD: f64 = 0.90;

/// The tiered matching engine. Holds the similarity threshold so tests can
/// probe threshold behavior; production paths use [`Default`].
#[derive(Debug, Clone)]
pub struct MatchingEngine {
    threshold: f64,
}

impl MatchingEngine {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Attempt to reconcile one harvested resource against the index.
    pub fn match_resource(
        &self,
        resource: &HarvestedResource,
        index: &ReferenceIndex,
    ) -> MatchOutcome {
        // Strategy 1: exact tag membership.
        if !resource.tag.is_empty() {
            if let Some(record) = index.record_by_tag(&resource.tag) {
                return MatchOutcome::Matched {
                    strategy: MatchStrategy::TagExact,
                    record_id: record.record_id.clone(),
                };
            }
        }

        let normalized_title = normalize(&strip_version_suffix(&resource.title));

        // Strategy 2: exact normalized-title equality.
        if !normalized_title.is_empty() {
            if let Some(record) = index.record_by_normalized_title(&normalized_title) {
                return MatchOutcome::Matched {
                    strategy: MatchStrategy::TitleNormalizedExact,
                    record_id: record.record_id.clone(),
                };
            }

            // Strategy 3: first catalog title at or above the threshold,
            // in stored order.
            for (candidate, record) in index.normalized_titles() {
                if similarity_ratio(&normalized_title, candidate) >= self.threshold {
                    return MatchOutcome::Matched {
                        strategy: MatchStrategy::TitleSimilarity,
                        record_id: record.record_id.clone(),
                    };
                }
            }
        }

        MatchOutcome::Unmatched
    }

    /// Reconcile a harvested batch, returning the unmatched resources in
    /// input order. Each missing resource carries the full ordered list of
    /// attempted strategies for diagnostics.
    pub fn reconcile(
        &self,
        harvested: &[HarvestedResource],
        index: &ReferenceIndex,
    ) -> Vec<MissingResource> {
        let mut missing = Vec::new();

        for resource in harvested {
            if let MatchOutcome::Unmatched = self.match_resource(resource, index) {
                missing.push(MissingResource {
                    resource: resource.clone(),
                    attempted_strategies: MatchStrategy::ALL.to_vec(),
                });
            }
        }

        missing
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new(SIMILARITY_THRESHOLD)
    }
}

/// Whether two titles refer to the same dataset.
///
/// Safe to call with raw titles: both inputs are independently
/// version-stripped and normalized before an exact-equality check, so
/// already-normalized strings do not drift on re-normalization. Falls back
/// to the similarity ratio against `threshold`.
pub fn titles_are_similar(a: &str, b: &str, threshold: f64) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }

    let norm_a = normalize(&strip_version_suffix(a));
    let norm_b = normalize(&strip_version_suffix(b));

    if norm_a == norm_b {
        return true;
    }

    similarity_ratio(&norm_a, &norm_b) >= threshold
}

/// Longest-matching-block sequence similarity (Ratcliff/Obershelp).
///
/// `2.0 * M / T` where `M` is the total size of the matching blocks and
/// `T` the combined length of both inputs. Ranges 0.0–1.0; two empty
/// strings are identical (1.0).
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matches = matching_block_len(&a, &b);
    2.0 * matches as f64 / total as f64
}

/// Total matched characters: find the longest common block, then recurse
/// into the unmatched regions on either side.
fn matching_block_len(a: &[char], b: &[char]) -> usize {
    let (a_start, b_start, len) = longest_match(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_block_len(&a[..a_start], &b[..b_start])
        + matching_block_len(&a[a_start + len..], &b[b_start + len..])
}

/// Longest common contiguous block between `a` and `b`, preferring the
/// earliest occurrence in `a`, then in `b`.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    use std::collections::HashMap;

    let mut positions_in_b: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &ch) in b.iter().enumerate() {
        positions_in_b.entry(ch).or_default().push(j);
    }

    let (mut best_a, mut best_b, mut best_len) = (0usize, 0usize, 0usize);
    // run_lengths[j] = length of the common run ending at a[i], b[j].
    let mut run_lengths: HashMap<usize, usize> = HashMap::new();

    for (i, ch) in a.iter().enumerate() {
        let mut next_runs: HashMap<usize, usize> = HashMap::new();
        if let Some(js) = positions_in_b.get(ch) {
            for &j in js {
                let run = if j == 0 {
                    1
                } else {
                    run_lengths.get(&(j - 1)).copied().unwrap_or(0) + 1
                };
                next_runs.insert(j, run);
                if run > best_len {
                    best_a = i + 1 - run;
                    best_b = j + 1 - run;
                    best_len = run;
                }
            }
        }
        run_lengths = next_runs;
    }

    (best_a, best_b, best_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ReferenceIndex;
    use crate::models::{Kingdom, ReferenceRecord};

    fn resource(title: &str, tag: &str) -> HarvestedResource {
        HarvestedResource {
            title: title.to_string(),
            link: String::new(),
            guid: String::new(),
            description: String::new(),
            published_at: String::new(),
            tag: tag.to_string(),
            kingdom: Kingdom::Animalia,
            source_id: "test".to_string(),
            source_base_url: String::new(),
        }
    }

    fn record(id: &str, name: &str, tag: &str) -> ReferenceRecord {
        ReferenceRecord {
            record_id: id.to_string(),
            name: name.to_string(),
            tag: tag.to_string(),
        }
    }

    #[test]
    fn identical_strings_ratio_one() {
        assert_eq!(similarity_ratio("fish survey", "fish survey"), 1.0);
        assert_eq!(similarity_ratio("", ""), 1.0);
    }

    #[test]
    fn disjoint_strings_ratio_zero() {
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
        assert_eq!(similarity_ratio("abc", ""), 0.0);
    }

    #[test]
    fn near_identical_titles_score_high() {
        let ratio = similarity_ratio("beetle catalog of rio", "beetle catalogue of rio");
        assert!(ratio >= 0.90, "ratio was {}", ratio);
        assert!(ratio < 1.0);
    }

    #[test]
    fn distinct_titles_score_below_threshold() {
        let ratio = similarity_ratio("flora of amazonia", "bird survey of chile");
        assert!(ratio < SIMILARITY_THRESHOLD, "ratio was {}", ratio);
    }

    #[test]
    fn tag_match_wins_regardless_of_title() {
        let index = ReferenceIndex::build(&[record("7", "Completely Different Name", "hhm")]);
        let engine = MatchingEngine::default();
        let outcome = engine.match_resource(&resource("Fish Survey", "hhm"), &index);
        assert_eq!(
            outcome,
            MatchOutcome::Matched {
                strategy: MatchStrategy::TagExact,
                record_id: "7".to_string(),
            }
        );
    }

    #[test]
    fn version_suffix_matches_exact_title() {
        let index = ReferenceIndex::build(&[record("3", "Fish Survey", "")]);
        let engine = MatchingEngine::default();
        let outcome = engine.match_resource(&resource("Fish Survey - Version 2.0", ""), &index);
        assert_eq!(
            outcome,
            MatchOutcome::Matched {
                strategy: MatchStrategy::TitleNormalizedExact,
                record_id: "3".to_string(),
            }
        );
    }

    #[test]
    fn similar_title_matches_fuzzy_tier() {
        let index = ReferenceIndex::build(&[record("5", "Beetle Catalogue of Rio", "")]);
        let outcome = MatchingEngine::default()
            .match_resource(&resource("Beetle Catalog of Rio", ""), &index);
        assert_eq!(
            outcome,
            MatchOutcome::Matched {
                strategy: MatchStrategy::TitleSimilarity,
                record_id: "5".to_string(),
            }
        );

        // Lowering the threshold below the measured ratio must not change
        // the outcome for this fixed pair.
        let outcome = MatchingEngine::new(0.80)
            .match_resource(&resource("Beetle Catalog of Rio", ""), &index);
        assert!(matches!(
            outcome,
            MatchOutcome::Matched {
                strategy: MatchStrategy::TitleSimilarity,
                ..
            }
        ));
    }

    #[test]
    fn first_candidate_above_threshold_wins() {
        // Both records clear the threshold; the earlier-indexed one is
        // chosen even though the later one is the exact-er fit.
        let index = ReferenceIndex::build(&[
            record("1", "Beetle Catalogue of Rio", ""),
            record("2", "Beetle Catalog of Rios", ""),
        ]);
        let outcome = MatchingEngine::default()
            .match_resource(&resource("Beetle Catalog of Rio", ""), &index);
        assert_eq!(
            outcome,
            MatchOutcome::Matched {
                strategy: MatchStrategy::TitleSimilarity,
                record_id: "1".to_string(),
            }
        );
    }

    #[test]
    fn empty_harvested_set_yields_empty_missing_list() {
        let index = ReferenceIndex::build(&[record("1", "Flora of Rio", "a")]);
        let missing = MatchingEngine::default().reconcile(&[], &index);
        assert!(missing.is_empty());
    }

    #[test]
    fn empty_index_yields_all_missing_with_all_strategies() {
        let index = ReferenceIndex::build(&[]);
        let harvested = vec![resource("Fish Survey", "hhm"), resource("Flora of Rio", "")];
        let missing = MatchingEngine::default().reconcile(&harvested, &index);
        assert_eq!(missing.len(), 2);
        for m in &missing {
            assert_eq!(m.attempted_strategies, MatchStrategy::ALL.to_vec());
        }
        // Input order is preserved.
        assert_eq!(missing[0].resource.title, "Fish Survey");
        assert_eq!(missing[1].resource.title, "Flora of Rio");
    }

    #[test]
    fn empty_title_and_tag_is_unmatched_without_fuzzy_scan() {
        let index = ReferenceIndex::build(&[record("1", "Flora of Rio", "a")]);
        let outcome = MatchingEngine::default().match_resource(&resource("", ""), &index);
        assert_eq!(outcome, MatchOutcome::Unmatched);
    }

    #[test]
    fn titles_are_similar_accepts_raw_titles() {
        assert!(titles_are_similar(
            "Fish Survey - Version 2.0",
            "Fish  Survey",
            SIMILARITY_THRESHOLD
        ));
        assert!(titles_are_similar(
            "Beetle Catalog of Rio",
            "Beetle Catalogue of Rio",
            SIMILARITY_THRESHOLD
        ));
        assert!(!titles_are_similar("Fish Survey", "", SIMILARITY_THRESHOLD));
        assert!(!titles_are_similar(
            "Flora of Amazonia",
            "Bird Survey of Chile",
            SIMILARITY_THRESHOLD
        ));
    }
}
