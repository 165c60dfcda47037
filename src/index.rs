//! Lookup structures over the reference catalog.
//!
//! Built once per run from the catalog snapshot, then read-only. Holds an
//! exact tag set, a tag → record map, and a normalized-name → record table
//! that preserves catalog insertion order. The similarity strategy scans
//! that table in stored order and stops at the first hit, so ordering is
//! part of the observable behavior.
//!
//! Duplicate tags or names in the catalog silently overwrite earlier
//! entries (last write wins, original position kept); duplicates are not
//! an error.

use std::collections::{HashMap, HashSet};

use crate::models::ReferenceRecord;
use crate::normalize::normalize;

/// In-memory index over one run's reference catalog.
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    tag_set: HashSet<String>,
    by_tag: HashMap<String, ReferenceRecord>,
    by_normalized_title: HashMap<String, ReferenceRecord>,
    /// Normalized-title keys in first-insertion order.
    title_order: Vec<String>,
}

impl ReferenceIndex {
    /// Build the index from catalog records, in input order.
    ///
    /// Records with an empty tag are skipped for the tag tables; names are
    /// normalized (no version-stripping, catalog names are assumed clean)
    /// and skipped when normalization is empty, so the title table never
    /// holds an empty key.
    pub fn build(records: &[ReferenceRecord]) -> Self {
        let mut index = ReferenceIndex::default();

        for record in records {
            if !record.tag.is_empty() {
                index.tag_set.insert(record.tag.clone());
                index.by_tag.insert(record.tag.clone(), record.clone());
            }

            if !record.name.is_empty() {
                let normalized = normalize(&record.name);
                if !normalized.is_empty() {
                    if index
                        .by_normalized_title
                        .insert(normalized.clone(), record.clone())
                        .is_none()
                    {
                        index.title_order.push(normalized);
                    }
                }
            }
        }

        index
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        self.tag_set.contains(tag)
    }

    pub fn record_by_tag(&self, tag: &str) -> Option<&ReferenceRecord> {
        self.by_tag.get(tag)
    }

    pub fn record_by_normalized_title(&self, normalized: &str) -> Option<&ReferenceRecord> {
        self.by_normalized_title.get(normalized)
    }

    /// Normalized titles with their records, in stored (insertion) order.
    pub fn normalized_titles(&self) -> impl Iterator<Item = (&str, &ReferenceRecord)> {
        self.title_order.iter().map(move |key| {
            let record = &self.by_normalized_title[key];
            (key.as_str(), record)
        })
    }

    pub fn tag_count(&self) -> usize {
        self.tag_set.len()
    }

    pub fn title_count(&self) -> usize {
        self.by_normalized_title.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str, tag: &str) -> ReferenceRecord {
        ReferenceRecord {
            record_id: id.to_string(),
            name: name.to_string(),
            tag: tag.to_string(),
        }
    }

    #[test]
    fn indexes_tags_and_titles() {
        let index = ReferenceIndex::build(&[
            record("1", "Flora of Rio", "hhm"),
            record("2", "Bird Survey", ""),
        ]);
        assert!(index.contains_tag("hhm"));
        assert!(!index.contains_tag(""));
        assert_eq!(index.tag_count(), 1);
        assert_eq!(index.title_count(), 2);
        assert_eq!(
            index
                .record_by_normalized_title("bird survey")
                .map(|r| r.record_id.as_str()),
            Some("2")
        );
    }

    #[test]
    fn titles_are_normalized_without_version_stripping() {
        let index = ReferenceIndex::build(&[record("1", "Flora Version 2", "")]);
        // Catalog names keep their version text; only normalization applies.
        assert!(index.record_by_normalized_title("flora version 2").is_some());
    }

    #[test]
    fn empty_and_whitespace_names_are_skipped() {
        let index = ReferenceIndex::build(&[
            record("1", "", "a"),
            record("2", "   ", "b"),
            record("3", "...", "c"),
        ]);
        assert_eq!(index.title_count(), 0);
        assert!(index.record_by_normalized_title("").is_none());
    }

    #[test]
    fn duplicate_keys_last_write_wins_position_kept() {
        let index = ReferenceIndex::build(&[
            record("1", "Flora of Rio", "dup"),
            record("2", "Bird Survey", ""),
            record("3", "Flora of Rio", "dup"),
        ]);
        assert_eq!(
            index.record_by_tag("dup").map(|r| r.record_id.as_str()),
            Some("3")
        );
        assert_eq!(
            index
                .record_by_normalized_title("flora of rio")
                .map(|r| r.record_id.as_str()),
            Some("3")
        );
        // Overwriting keeps the key's original slot in the scan order.
        let order: Vec<&str> = index.normalized_titles().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["flora of rio", "bird survey"]);
    }
}
