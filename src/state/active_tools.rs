use crate::render::RenderedFragment;
use std::collections::HashMap;

pub const DEFAULT_MAX_ACTIVE_TOOLS: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTool {
    pub fragment: RenderedFragment,
    pub call_id: Option<String>,
    /// Monotonic per index; larger means more recently recorded.
    pub sequence: u64,
}

/// Latest invocation fragment per tool name. Last write wins.
#[derive(Debug, Clone)]
pub struct ActiveToolIndex {
    entries: HashMap<String, ActiveTool>,
    next_sequence: u64,
    // 0 = unbounded
    max_entries: usize,
}

impl Default for ActiveToolIndex {
    fn default() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ACTIVE_TOOLS)
    }
}

impl ActiveToolIndex {
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            next_sequence: 0,
            max_entries,
        }
    }

    pub fn unbounded() -> Self {
        Self::with_max_entries(0)
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Index `fragment` under `name`, returning the entry it replaced.
    pub fn record(
        &mut self,
        name: &str,
        call_id: Option<String>,
        fragment: RenderedFragment,
    ) -> Option<ActiveTool> {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let replaced = self.entries.insert(
            name.to_string(),
            ActiveTool {
                fragment,
                call_id,
                sequence,
            },
        );
        if replaced.is_none() {
            self.evict_over_capacity();
        }
        replaced
    }

    fn evict_over_capacity(&mut self) {
        if self.max_entries == 0 {
            return;
        }
        while self.entries.len() > self.max_entries {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.sequence)
                .map(|(name, _)| name.clone())
            else {
                break;
            };
            self.entries.remove(&oldest);
            tracing::debug!(tool = %oldest, max_entries = self.max_entries, "evicted oldest active tool");
        }
    }

    pub fn get(&self, name: &str) -> Option<&ActiveTool> {
        self.entries.get(name)
    }

    pub fn fragment(&self, name: &str) -> Option<&RenderedFragment> {
        self.entries.get(name).map(|entry| &entry.fragment)
    }

    /// Lets later logic swap the indexed fragment in place.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ActiveTool> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ActiveTool> {
        self.entries.remove(name)
    }

    /// Remove `name` only if its call id matches. A `None` id matches any entry.
    pub fn remove_matching(&mut self, name: &str, call_id: Option<&str>) -> Option<ActiveTool> {
        let matches = match (call_id, self.entries.get(name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(id), Some(entry)) => entry.call_id.as_deref() == Some(id),
        };
        if matches {
            self.entries.remove(name)
        } else {
            None
        }
    }

    /// Tool names from oldest to newest.
    pub fn names(&self) -> Vec<&str> {
        let mut entries: Vec<(&String, &ActiveTool)> = self.entries.iter().collect();
        entries.sort_by_key(|(_, entry)| entry.sequence);
        entries.into_iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{CodeBlock, Segment};

    fn fragment(body: &str) -> RenderedFragment {
        RenderedFragment::invocation(
            "Tool: t".to_string(),
            vec![Segment::Code(CodeBlock::json(body))],
            "--:--:--".to_string(),
        )
    }

    #[test]
    fn test_record_is_last_write_wins() {
        let mut index = ActiveToolIndex::default();

        assert!(index.record("search", None, fragment("1")).is_none());
        let replaced = index.record("search", None, fragment("2"));

        assert_eq!(replaced.map(|entry| entry.fragment), Some(fragment("1")));
        assert_eq!(index.len(), 1);
        assert_eq!(index.fragment("search"), Some(&fragment("2")));
    }

    #[test]
    fn test_capacity_evicts_oldest_name() {
        let mut index = ActiveToolIndex::with_max_entries(2);
        index.record("a", None, fragment("a"));
        index.record("b", None, fragment("b"));
        // Refreshing "a" makes "b" the oldest.
        index.record("a", None, fragment("a2"));
        index.record("c", None, fragment("c"));

        assert_eq!(index.names(), vec!["a", "c"]);
        assert!(!index.contains("b"));
    }

    #[test]
    fn test_unbounded_index_keeps_everything() {
        let mut index = ActiveToolIndex::unbounded();
        for i in 0..1000 {
            index.record(&format!("tool-{i}"), None, fragment("x"));
        }
        assert_eq!(index.len(), 1000);
        assert_eq!(index.names().first().copied(), Some("tool-0"));
    }

    #[test]
    fn test_get_mut_replaces_fragment_in_place() {
        let mut index = ActiveToolIndex::default();
        index.record("search", Some("call-1".to_string()), fragment("pending"));
        index.record("ls", None, fragment("ls"));

        if let Some(entry) = index.get_mut("search") {
            entry.fragment = fragment("done");
        }

        let entry = index.get("search").expect("search still indexed");
        assert_eq!(entry.fragment, fragment("done"));
        assert_eq!(entry.call_id.as_deref(), Some("call-1"));
        assert_eq!(entry.sequence, 0);
        assert_eq!(index.names(), vec!["search", "ls"]);
        assert!(index.get_mut("missing").is_none());
    }

    #[test]
    fn test_remove_matching_respects_call_id() {
        let mut index = ActiveToolIndex::default();
        index.record("search", Some("call-2".to_string()), fragment("2"));

        assert!(index.remove_matching("search", Some("call-1")).is_none());
        assert!(index.contains("search"));

        let removed = index.remove_matching("search", Some("call-2"));
        assert_eq!(removed.and_then(|entry| entry.call_id), Some("call-2".to_string()));
        assert!(index.is_empty());

        index.record("ls", None, fragment("ls"));
        assert!(index.remove_matching("ls", Some("call-9")).is_none());
        assert!(index.remove_matching("ls", None).is_some());
        assert!(index.remove_matching("missing", None).is_none());
    }
}
