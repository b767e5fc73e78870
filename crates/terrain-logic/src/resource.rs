//! Line-oriented `key=value` resource parsing.
//!
//! The game text lives in a single properties-style resource. Keys encode a
//! hierarchical path with `.` (`mission.<charId>.<missionId>.nom`). The
//! position at which a key first appears is significant: the catalog infers
//! which power a mission unlocks from what follows its title, so entries are
//! kept as an explicit ordered sequence next to the key index.

use std::collections::{BTreeMap, HashMap};

/// Path delimiter inside keys.
pub const DELIMITER: char = '.';

/// Prefix marking a comment line.
pub const COMMENT_PREFIX: char = '#';

/// Split a single resource line into `(key, value)`.
///
/// Returns `None` for blank lines, comments, lines without `=` and lines with
/// an empty key. The value is everything after the first `=`, trimmed.
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}

/// Ordered flat mapping of resource keys to values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceStore {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse resource text. Malformed lines are skipped; a duplicate key
    /// overwrites the earlier value but keeps the earlier position.
    pub fn parse(text: &str) -> Self {
        let mut store = Self::new();
        for line in text.split('\n') {
            if let Some((key, value)) = parse_line(line) {
                store.insert(key, value);
            }
        }
        store
    }

    /// Insert or overwrite a key.
    pub fn insert(&mut self, key: &str, value: &str) {
        match self.index.get(key) {
            Some(&pos) => self.entries[pos].1 = value.to_string(),
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), value.to_string()));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&pos| self.entries[pos].1.as_str())
    }

    /// Position of a key in encounter order.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// All entries in encounter order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries strictly after `position`, in encounter order.
    pub fn entries_after(&self, position: usize) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .skip(position + 1)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries whose key starts with `prefix`, in encounter order.
    pub fn entries_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.entries().filter(move |(k, _)| k.starts_with(prefix))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tree view of the store, grouping keys by their path segments.
    pub fn nest(&self) -> ResourceNode {
        nest(self)
    }
}

/// Node of the nested resource tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceNode {
    Leaf(String),
    Branch(BTreeMap<String, ResourceNode>),
}

impl ResourceNode {
    pub fn empty() -> Self {
        Self::Branch(BTreeMap::new())
    }

    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            Self::Leaf(value) => Some(value),
            Self::Branch(_) => None,
        }
    }

    pub fn children(&self) -> Option<&BTreeMap<String, ResourceNode>> {
        match self {
            Self::Branch(children) => Some(children),
            Self::Leaf(_) => None,
        }
    }

    pub fn get(&self, segment: &str) -> Option<&ResourceNode> {
        self.children()?.get(segment)
    }

    /// Walk a path of segments from this node.
    pub fn get_path(&self, path: &[&str]) -> Option<&ResourceNode> {
        path.iter().try_fold(self, |node, segment| node.get(segment))
    }

    /// Leaf value at a path, if the path ends on a leaf.
    pub fn leaf_at(&self, path: &[&str]) -> Option<&str> {
        self.get_path(path)?.as_leaf()
    }

    /// Number of leaves below (and including) this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Branch(children) => children.values().map(ResourceNode::leaf_count).sum(),
        }
    }
}

/// Group flat keys into a tree.
///
/// `surnom.principal.johann=Yo` becomes `surnom → principal → johann = "Yo"`.
/// When a path is used both as a leaf and as an intermediate node, the later
/// key in encounter order wins.
pub fn nest(store: &ResourceStore) -> ResourceNode {
    let mut root: BTreeMap<String, ResourceNode> = BTreeMap::new();

    for (key, value) in store.entries() {
        let segments: Vec<&str> = key.split(DELIMITER).collect();
        let Some((last, path)) = segments.split_last() else {
            continue;
        };

        let mut current = &mut root;
        for segment in path {
            let node = current
                .entry((*segment).to_string())
                .or_insert_with(ResourceNode::empty);
            if let ResourceNode::Leaf(old) = node {
                log::warn!("resource key '{key}' replaces leaf value '{old}' at '{segment}'");
                *node = ResourceNode::empty();
            }
            let ResourceNode::Branch(children) = node else {
                unreachable!("leaf nodes are replaced by a branch above");
            };
            current = children;
        }

        if let Some(ResourceNode::Branch(_)) = current.get(*last) {
            log::warn!("resource key '{key}' replaces a branch with a leaf");
        }
        current.insert((*last).to_string(), ResourceNode::Leaf(value.to_string()));
    }

    ResourceNode::Branch(root)
}
