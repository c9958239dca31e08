// src/product/dedup.rs
// Remembers which items this run already emitted. One registry per run;
// nothing is persisted between runs.

use dashmap::DashSet;

#[derive(Debug, Default)]
pub struct DedupRegistry {
    seen: DashSet<String>,
}

impl DedupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Returns true exactly once per id: the first caller records it, every
    // later caller (on any page, in any task) gets false.
    pub fn should_emit(&self, item_id: &str) -> bool {
        if self.seen.contains(item_id) {
            return false;
        }
        self.seen.insert(item_id.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }
}
