use indexmap::IndexMap;

use crate::component::Instance;

/// Name → instance registry for one component group.
///
/// Names are unique. Adding an existing name removes the old entry first and
/// appends the new one, so enumeration follows the insertion order of the
/// current members.
#[derive(Debug, Clone)]
pub struct Container<T = Instance> {
    entries: IndexMap<String, T>,
}

impl<T> Default for Container<T> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<T: Clone> Container<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Soft lookup; `None` when the name is not registered.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    /// Register `instance` under `name`, returning the entry it replaced.
    pub fn add(&mut self, name: impl Into<String>, instance: T) -> Option<T> {
        let name = name.into();
        let previous = self.entries.shift_remove(&name);
        self.entries.insert(name, instance);
        previous
    }

    pub fn remove(&mut self, name: &str) -> Option<T> {
        self.entries.shift_remove(name)
    }

    /// Snapshot of every `(name, instance)` pair in insertion order.
    pub fn get_all(&self) -> Vec<(String, T)> {
        self.entries
            .iter()
            .map(|(name, instance)| (name.clone(), instance.clone()))
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &T)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
