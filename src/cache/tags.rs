//! Tag Index Module
//!
//! Inverted `tag -> keys` index used for bulk invalidation.

use std::collections::{HashMap, HashSet};

// == Tag Index ==
/// Maps every tag to the set of keys whose entries currently carry it.
///
/// The store updates this index on every write and removal, so it always
/// mirrors the tag sets of the live entries. Tags with no remaining keys are
/// dropped from the map.
#[derive(Debug, Default)]
pub struct TagIndex {
    keys_by_tag: HashMap<String, HashSet<String>>,
}

impl TagIndex {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Insert ==
    /// Records that `key` carries every tag in `tags`.
    pub fn insert<'a, I>(&mut self, key: &str, tags: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        for tag in tags {
            self.keys_by_tag
                .entry(tag.clone())
                .or_default()
                .insert(key.to_string());
        }
    }

    // == Remove ==
    /// Forgets `key` under each of `tags`.
    pub fn remove<'a, I>(&mut self, key: &str, tags: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        for tag in tags {
            if let Some(keys) = self.keys_by_tag.get_mut(tag.as_str()) {
                keys.remove(key);
                if keys.is_empty() {
                    self.keys_by_tag.remove(tag.as_str());
                }
            }
        }
    }

    // == Keys For Tag ==
    /// Returns the keys carrying `tag` (empty if none).
    pub fn keys_for(&self, tag: &str) -> Vec<String> {
        self.keys_by_tag
            .get(tag)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.keys_by_tag.clear();
    }

    /// Number of distinct tags with at least one key.
    pub fn tag_count(&self) -> usize {
        self.keys_by_tag.len()
    }

    /// Checks whether `key` is indexed under `tag`.
    #[cfg(test)]
    pub(crate) fn contains(&self, tag: &str, key: &str) -> bool {
        self.keys_by_tag
            .get(tag)
            .is_some_and(|keys| keys.contains(key))
    }
}
