// 🔍 Deduplication Engine - one entry per member id
// First occurrence wins; later repeats are reported and dropped

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ============================================================================
// DUPLICATE MATCH RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateMatch {
    /// Index of the occurrence that is kept
    pub kept_index: usize,

    /// Index of the repeat that is dropped
    pub duplicate_index: usize,

    pub id: String,

    /// Human-readable reason
    pub reason: String,
}

// ============================================================================
// DEDUPLICATION ENGINE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct DeduplicationEngine;

impl DeduplicationEngine {
    pub fn new() -> Self {
        DeduplicationEngine
    }

    /// Every repeated id, in the order the repeats appear
    pub fn find_duplicates<S: AsRef<str>>(&self, ids: &[S]) -> Vec<DuplicateMatch> {
        let mut first_seen: HashMap<&str, usize> = HashMap::new();
        let mut matches = Vec::new();

        for (index, id) in ids.iter().enumerate() {
            let id = id.as_ref();
            match first_seen.get(id) {
                Some(&kept_index) => matches.push(DuplicateMatch {
                    kept_index,
                    duplicate_index: index,
                    id: id.to_string(),
                    reason: format!("Duplicate id {}: first seen at #{}, again at #{}", id, kept_index, index),
                }),
                None => {
                    first_seen.insert(id, index);
                }
            }
        }

        matches
    }

    /// Keep the first occurrence of every id, preserving order
    pub fn dedupe<T, F>(&self, items: Vec<T>, id_of: F) -> Vec<T>
    where
        F: Fn(&T) -> &str,
    {
        let ids: Vec<&str> = items.iter().map(&id_of).collect();
        let dropped: HashSet<usize> = self
            .find_duplicates(ids.as_slice())
            .into_iter()
            .map(|m| {
                log::debug!("{}", m.reason);
                m.duplicate_index
            })
            .collect();

        items
            .into_iter()
            .enumerate()
            .filter(|(index, _)| !dropped.contains(index))
            .map(|(_, item)| item)
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
