use std::collections::HashMap;

use super::Value;

/// Key-value store addressed by dot-separated paths such as `"device.type"`.
///
/// Used for the extra parameters carried by a [`RuleContext`](super::RuleContext)
/// and, through its [`Tracker`](super::Tracker) impl, as an in-memory visit
/// store.
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    entries: HashMap<String, Entry>,
}

#[derive(Debug, Clone)]
enum Entry {
    Leaf(Value),
    Branch(HashMap<String, Entry>),
}

impl Parameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value at a dot-separated path, returning `self` for chaining.
    #[must_use]
    pub fn with(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.insert(path, value);
        self
    }

    /// Insert a value at a dot-separated path. Intermediate branches are
    /// created as needed; a leaf in the way is replaced by a branch.
    pub fn insert(&mut self, path: &str, value: impl Into<Value>) {
        let segments: Vec<&str> = path.split('.').collect();
        insert_at(&mut self.entries, &segments, value.into());
    }

    /// Look up a leaf value. Paths naming a branch return `None`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut map = &self.entries;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            match (map.get(segment)?, segments.peek()) {
                (Entry::Leaf(v), None) => return Some(v),
                (Entry::Branch(next), Some(_)) => map = next,
                _ => return None,
            }
        }
        None
    }

    /// Remove a leaf value, returning it if present.
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        let segments: Vec<&str> = path.split('.').collect();
        remove_at(&mut self.entries, &segments)
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn insert_at(map: &mut HashMap<String, Entry>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            map.insert((*last).to_owned(), Entry::Leaf(value));
        }
        [first, rest @ ..] => {
            let entry = map
                .entry((*first).to_owned())
                .or_insert_with(|| Entry::Branch(HashMap::new()));
            if let Entry::Leaf(_) = entry {
                *entry = Entry::Branch(HashMap::new());
            }
            if let Entry::Branch(next) = entry {
                insert_at(next, rest, value);
            }
        }
    }
}

fn remove_at(map: &mut HashMap<String, Entry>, segments: &[&str]) -> Option<Value> {
    match segments {
        [] => None,
        [last] => {
            if !matches!(map.get(*last)?, Entry::Leaf(_)) {
                return None;
            }
            match map.remove(*last) {
                Some(Entry::Leaf(v)) => Some(v),
                _ => None,
            }
        }
        [first, rest @ ..] => match map.get_mut(*first)? {
            Entry::Branch(next) => remove_at(next, rest),
            Entry::Leaf(_) => None,
        },
    }
}
