use std::collections::HashMap;
use std::hash::Hash;

/// Insertion-ordered collection with unique keys: a sequence plus a key index.
#[derive(Debug, Clone)]
pub struct OrderedSet<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash + Clone, V> OrderedSet<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Appends `value` unless `key` is already present. Returns whether it was inserted.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        true
    }

    /// Removes `key`, keeping the relative order of the remaining entries.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let position = self.index.remove(key)?;
        let (_, value) = self.entries.remove(position);
        for (k, _) in &self.entries[position..] {
            if let Some(i) = self.index.get_mut(k) {
                *i -= 1;
            }
        }
        Some(value)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<K: Eq + Hash + Clone, V> Default for OrderedSet<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
