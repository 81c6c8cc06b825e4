//! Disjoint-set forest with path compression and union by rank

use indexmap::IndexMap;
use std::hash::Hash;

/// Union-find over arbitrary hashable keys.
///
/// Keys are numbered in first-insertion order and `groups` reports both the
/// groups and their members in that order, so results are deterministic.
#[derive(Debug, Clone)]
pub struct DisjointSet<T: Hash + Eq + Clone> {
    index: IndexMap<T, usize>,
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl<T: Hash + Eq + Clone> Default for DisjointSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Hash + Eq + Clone> DisjointSet<T> {
    pub fn new() -> Self {
        Self {
            index: IndexMap::new(),
            parent: Vec::new(),
            rank: Vec::new(),
        }
    }

    /// Build from pairs, uniting each pair
    pub fn from_pairs<I: IntoIterator<Item = (T, T)>>(pairs: I) -> Self {
        let mut set = Self::new();
        for (a, b) in pairs {
            set.union(a, b);
        }
        set
    }

    /// Add a key as its own singleton set if unseen; returns its slot
    pub fn insert(&mut self, key: T) -> usize {
        if let Some(&slot) = self.index.get(&key) {
            return slot;
        }
        let slot = self.parent.len();
        self.index.insert(key, slot);
        self.parent.push(slot);
        self.rank.push(0);
        slot
    }

    pub fn contains(&self, key: &T) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    fn find_slot(&mut self, slot: usize) -> usize {
        let mut root = slot;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut current = slot;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Root slot of `key`, or None when the key was never inserted
    pub fn find(&mut self, key: &T) -> Option<usize> {
        let slot = *self.index.get(key)?;
        Some(self.find_slot(slot))
    }

    pub fn union(&mut self, a: T, b: T) {
        let a = self.insert(a);
        let b = self.insert(b);
        let (ra, rb) = (self.find_slot(a), self.find_slot(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }

    pub fn same_set(&mut self, a: &T, b: &T) -> bool {
        match (self.find(a), self.find(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Groups in order of their first-inserted member
    pub fn groups(&mut self) -> Vec<Vec<T>> {
        let mut by_root: IndexMap<usize, Vec<T>> = IndexMap::new();
        let keys: Vec<(T, usize)> = self.index.iter().map(|(k, &s)| (k.clone(), s)).collect();
        for (key, slot) in keys {
            let root = self.find_slot(slot);
            by_root.entry(root).or_default().push(key);
        }
        by_root.into_values().collect()
    }

    /// Map every key to the 0-based position of its group in `groups()`
    pub fn group_index(&mut self) -> IndexMap<T, usize> {
        let mut result = IndexMap::new();
        for (i, group) in self.groups().into_iter().enumerate() {
            for key in group {
                result.insert(key, i);
            }
        }
        result
    }
}
