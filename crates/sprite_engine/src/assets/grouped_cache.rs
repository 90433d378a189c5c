//! Cache whose entries carry a group tag
//!
//! Groups are metadata: the reference is still the only identity key, so an
//! entry belongs to at most one group and a duplicate reference is rejected
//! regardless of the group it is offered under. Typical groups are "level-2"
//! or "menu", unloaded in one call when the scene that needed them ends.

use super::cache::{Cache, CacheError, Disposable, Factory, Referenced};
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

/// [`Cache`] plus per-entry group tags and bulk group operations
///
/// Every base cache operation is reachable through `Deref`.
pub struct GroupedCache<T> {
    cache: Cache<T>,
}

impl<T> GroupedCache<T> {
    /// Create an empty grouped cache with no factory
    pub fn new() -> Self {
        Self { cache: Cache::new() }
    }

    /// Create an empty grouped cache that disposes entries when they leave it
    pub fn disposing() -> Self
    where
        T: Disposable,
    {
        Self { cache: Cache::disposing() }
    }

    /// Set the factory used on misses
    pub fn with_factory(self, factory: impl Factory<T> + 'static) -> Self {
        Self { cache: self.cache.with_factory(factory) }
    }

    /// Set the name used in log messages
    pub fn with_label(self, label: impl Into<String>) -> Self {
        Self { cache: self.cache.with_label(label) }
    }

    /// Insert a self-referenced object tagged with `group`
    pub fn add_to_group(&mut self, object: T, group: &str) -> bool
    where
        T: Referenced,
    {
        let reference = object.reference().to_string();
        self.cache.insert_tagged(reference, object, Some(group.to_string()))
    }

    /// Insert `object` under `reference`, tagged with `group`
    pub fn insert_in_group(&mut self, reference: impl Into<String>, object: T, group: &str) -> bool {
        self.cache.insert_tagged(reference.into(), object, Some(group.to_string()))
    }

    /// Resolve `reference`, tagging the entry with `group` if this call creates it
    ///
    /// An entry that already exists keeps its original tag.
    pub fn get_in_group(&mut self, reference: &str, group: &str) -> Result<Rc<T>, CacheError> {
        self.cache.get_tagged(reference, Some(group))
    }

    /// Objects tagged with `group`, in insertion order
    pub fn entries_in_group(&self, group: &str) -> Vec<Rc<T>> {
        self.cache
            .entries()
            .filter(|(_, entry)| entry.group.as_deref() == Some(group))
            .map(|(_, entry)| Rc::clone(&entry.object))
            .collect()
    }

    /// Remove and dispose every entry tagged with `group`
    ///
    /// Returns the number of entries removed. Untagged entries and entries of
    /// other groups are left alone.
    pub fn remove_group(&mut self, group: &str) -> usize {
        let removed = self
            .cache
            .remove_where(|_, entry| entry.group.as_deref() == Some(group));
        if removed > 0 {
            log::debug!("{}: removed {} entries of group '{}'", self.cache.label(), removed, group);
        }
        removed
    }

    /// Group tag of `reference`, if cached and tagged
    pub fn group_of(&self, reference: &str) -> Option<&str> {
        self.cache.entry(reference).and_then(|entry| entry.group.as_deref())
    }

    /// Distinct group names, in order of first appearance
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for (_, entry) in self.cache.entries() {
            if let Some(group) = entry.group.as_deref() {
                if !groups.contains(&group) {
                    groups.push(group);
                }
            }
        }
        groups
    }
}

impl<T> Default for GroupedCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for GroupedCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupedCache")
            .field("cache", &self.cache)
            .field("groups", &self.groups())
            .finish()
    }
}

impl<T> Deref for GroupedCache<T> {
    type Target = Cache<T>;

    fn deref(&self) -> &Self::Target {
        &self.cache
    }
}

impl<T> DerefMut for GroupedCache<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.cache
    }
}
