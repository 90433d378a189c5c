//! Keyed resource cache
//!
//! Maps a reference string to a lazily constructed object. Lookups that miss
//! go through an injectable [`Factory`]; successful results are retained so
//! every later lookup of the same reference hands out the same object.
//!
//! Objects are handed out as `Rc<T>` handles. The cache keeps one handle of
//! its own, so [`Cache::holders`] reports how many handles callers still
//! hold and [`Cache::purge_unused`] evicts only entries nobody else uses.

use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Objects that carry their own cache key
pub trait Referenced {
    /// Stable key for the lifetime of the object
    fn reference(&self) -> &str;
}

/// Objects with an explicit teardown step
///
/// A disposing cache calls [`dispose`](Disposable::dispose) exactly once per
/// entry, when that entry is removed or the cache is cleared or dropped.
pub trait Disposable {
    /// Release whatever the object holds outside the process heap
    fn dispose(&self);
}

/// Produces an object for a reference on a cache miss
///
/// Factories should depend only on the reference they are given. Returning
/// `None` means the reference cannot be resolved.
pub trait Factory<T> {
    /// Build the object for `reference`
    fn create(&self, reference: &str) -> Option<T>;
}

impl<T, F> Factory<T> for F
where
    F: Fn(&str) -> Option<T>,
{
    fn create(&self, reference: &str) -> Option<T> {
        self(reference)
    }
}

/// Cache errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The factory could not produce an object for the reference
    #[error("No resource could be resolved for reference '{reference}'")]
    Resolution {
        /// Reference that failed to resolve
        reference: String,
    },
}

/// Stored object plus its optional group tag
pub(crate) struct CacheEntry<T> {
    pub(crate) object: Rc<T>,
    pub(crate) group: Option<String>,
}

/// Reference-keyed cache with lazy construction
///
/// Insertion order is preserved for enumeration.
pub struct Cache<T> {
    entries: IndexMap<String, CacheEntry<T>>,
    factory: Option<Box<dyn Factory<T>>>,
    disposer: Option<fn(&T)>,
    label: String,
}

impl<T> Cache<T> {
    /// Create an empty cache with no factory; every miss fails to resolve
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            factory: None,
            disposer: None,
            label: "cache".to_string(),
        }
    }

    /// Create an empty cache that disposes entries when they leave it
    pub fn disposing() -> Self
    where
        T: Disposable,
    {
        let dispose: fn(&T) = |object| object.dispose();
        let mut cache = Self::new();
        cache.disposer = Some(dispose);
        cache
    }

    /// Set the factory used on misses
    pub fn with_factory(mut self, factory: impl Factory<T> + 'static) -> Self {
        self.set_factory(factory);
        self
    }

    /// Set the name used in log messages
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Name used in log messages
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Replace the factory for future misses; existing entries are untouched
    pub fn set_factory(&mut self, factory: impl Factory<T> + 'static) {
        self.factory = Some(Box::new(factory));
    }

    /// Look up `reference`, constructing it through the factory on a miss
    ///
    /// A failed resolution creates no entry.
    pub fn get(&mut self, reference: &str) -> Result<Rc<T>, CacheError> {
        self.get_tagged(reference, None)
    }

    pub(crate) fn get_tagged(&mut self, reference: &str, group: Option<&str>) -> Result<Rc<T>, CacheError> {
        if let Some(entry) = self.entries.get(reference) {
            return Ok(Rc::clone(&entry.object));
        }

        let created = self.factory.as_ref().and_then(|factory| factory.create(reference));
        let Some(object) = created else {
            log::debug!("{}: could not resolve '{}'", self.label, reference);
            return Err(CacheError::Resolution {
                reference: reference.to_string(),
            });
        };

        log::debug!("{}: created '{}'", self.label, reference);
        let object = Rc::new(object);
        self.entries.insert(
            reference.to_string(),
            CacheEntry {
                object: Rc::clone(&object),
                group: group.map(str::to_string),
            },
        );
        Ok(object)
    }

    /// Look up `reference` without consulting the factory
    pub fn peek(&self, reference: &str) -> Option<Rc<T>> {
        self.entries.get(reference).map(|entry| Rc::clone(&entry.object))
    }

    /// Insert an object that knows its own reference
    ///
    /// Returns `false`, leaving the existing entry in place, if the reference
    /// is already cached.
    pub fn add(&mut self, object: T) -> bool
    where
        T: Referenced,
    {
        let reference = object.reference().to_string();
        self.insert_tagged(reference, object, None)
    }

    /// Insert `object` under `reference`; never overwrites
    pub fn insert(&mut self, reference: impl Into<String>, object: T) -> bool {
        self.insert_tagged(reference.into(), object, None)
    }

    pub(crate) fn insert_tagged(&mut self, reference: String, object: T, group: Option<String>) -> bool {
        if self.entries.contains_key(&reference) {
            log::debug!("{}: '{}' already cached, insert ignored", self.label, reference);
            return false;
        }
        self.entries.insert(
            reference,
            CacheEntry {
                object: Rc::new(object),
                group,
            },
        );
        true
    }

    /// Remove and dispose the entry for `reference`
    pub fn remove(&mut self, reference: &str) -> bool {
        match self.entries.shift_remove_entry(reference) {
            Some((key, entry)) => {
                self.dispose_entry(&key, &entry);
                true
            }
            None => false,
        }
    }

    /// Whether `reference` is cached
    pub fn contains(&self, reference: &str) -> bool {
        self.entries.contains_key(reference)
    }

    /// Dispose and remove every entry; the cache stays usable
    pub fn clear(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        log::debug!("{}: clearing {} entries", self.label, self.entries.len());
        let entries = std::mem::take(&mut self.entries);
        for (key, entry) in &entries {
            self.dispose_entry(key, entry);
        }
    }

    /// Number of handles to `reference` held outside the cache
    pub fn holders(&self, reference: &str) -> usize {
        self.entries
            .get(reference)
            .map_or(0, |entry| Rc::strong_count(&entry.object) - 1)
    }

    /// Remove and dispose every entry that no caller holds a handle to
    ///
    /// Returns the number of entries evicted.
    pub fn purge_unused(&mut self) -> usize {
        self.remove_where(|_, entry| Rc::strong_count(&entry.object) == 1)
    }

    pub(crate) fn remove_where<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&str, &CacheEntry<T>) -> bool,
    {
        let doomed: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, entry)| predicate(key, entry))
            .map(|(key, _)| key.clone())
            .collect();
        for reference in &doomed {
            self.remove(reference);
        }
        doomed.len()
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, &CacheEntry<T>)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    pub(crate) fn entry(&self, reference: &str) -> Option<&CacheEntry<T>> {
        self.entries.get(reference)
    }

    /// Cached references in insertion order
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Cached `(reference, object)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rc<T>)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), &entry.object))
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn dispose_entry(&self, reference: &str, entry: &CacheEntry<T>) {
        let Some(dispose) = self.disposer else {
            return;
        };
        let outstanding = Rc::strong_count(&entry.object) - 1;
        if outstanding > 0 {
            log::warn!(
                "{}: disposing '{}' while {} handle(s) are still held",
                self.label, reference, outstanding
            );
        }
        dispose(&entry.object);
    }
}

impl<T> Default for Cache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Cache<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> fmt::Debug for Cache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("label", &self.label)
            .field("references", &self.entries.keys().collect::<Vec<_>>())
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashSet;

    struct Texture {
        name: String,
        disposals: Rc<Cell<u32>>,
    }

    impl Referenced for Texture {
        fn reference(&self) -> &str {
            &self.name
        }
    }

    impl Disposable for Texture {
        fn dispose(&self) {
            self.disposals.set(self.disposals.get() + 1);
        }
    }

    fn texture(name: &str, disposals: &Rc<Cell<u32>>) -> Texture {
        Texture {
            name: name.to_string(),
            disposals: Rc::clone(disposals),
        }
    }

    #[test]
    fn test_factory_runs_once_per_reference() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut cache = Cache::new().with_factory(move |reference: &str| {
            counter.set(counter.get() + 1);
            Some(reference.len())
        });

        let first = cache.get("abc").unwrap();
        let second = cache.get("abc").unwrap();

        assert_eq!(*first, 3);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_failed_resolution_creates_no_entry() {
        let mut cache: Cache<u32> = Cache::new()
            .with_factory(|reference: &str| reference.parse().ok());

        let error = cache.get("not-a-number").unwrap_err();
        assert_eq!(
            error,
            CacheError::Resolution {
                reference: "not-a-number".to_string()
            }
        );
        assert!(!cache.contains("not-a-number"));
        assert_eq!(*cache.get("42").unwrap(), 42);
    }

    #[test]
    fn test_no_factory_fails_every_miss() {
        let mut cache: Cache<u8> = Cache::new();
        assert!(cache.get("anything").is_err());
        assert!(cache.insert("anything", 1));
        assert_eq!(*cache.get("anything").unwrap(), 1);
    }

    #[test]
    fn test_duplicates_never_overwrite() {
        let mut cache = Cache::new();
        assert!(cache.insert("player", 1));
        assert!(!cache.insert("player", 2));
        assert_eq!(*cache.peek("player").unwrap(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_at_most_one_entry_per_reference() {
        let mut cache = Cache::new().with_factory(|reference: &str| Some(reference.to_uppercase()));
        let script = ["a", "b", "a", "-a", "a", "c", "-b", "b", "b"];
        for step in script {
            match step.strip_prefix('-') {
                Some(reference) => {
                    cache.remove(reference);
                }
                None => {
                    cache.insert(step, step.to_string());
                    cache.get(step).unwrap();
                }
            }
            let unique: HashSet<&str> = cache.references().collect();
            assert_eq!(unique.len(), cache.len());
        }
        assert_eq!(cache.references().collect::<Vec<_>>(), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_set_factory_affects_only_future_misses() {
        let mut cache = Cache::new().with_factory(|_: &str| Some(1));
        let old = cache.get("x").unwrap();
        cache.set_factory(|_: &str| Some(2));
        assert_eq!(*cache.get("x").unwrap(), 1);
        assert_eq!(*cache.get("y").unwrap(), 2);
        assert_eq!(*old, 1);
    }

    #[test]
    fn test_remove_and_clear_dispose_once() {
        let disposals = Rc::new(Cell::new(0));
        let mut cache = Cache::disposing();
        assert!(cache.add(texture("ship", &disposals)));
        assert!(cache.add(texture("rock", &disposals)));
        assert!(!cache.add(texture("rock", &disposals)));

        assert!(cache.remove("ship"));
        assert!(!cache.remove("ship"));
        assert_eq!(disposals.get(), 1);

        cache.clear();
        assert_eq!(disposals.get(), 2);
        assert!(cache.is_empty());

        // Still usable after clear
        assert!(cache.add(texture("ship", &disposals)));
        drop(cache);
        assert_eq!(disposals.get(), 3);
    }

    #[test]
    fn test_holders_and_purge_unused() {
        let disposals = Rc::new(Cell::new(0));
        let mut cache = Cache::disposing();
        cache.add(texture("held", &disposals));
        cache.add(texture("idle", &disposals));

        let handle = cache.get("held").unwrap();
        assert_eq!(cache.holders("held"), 1);
        assert_eq!(cache.holders("idle"), 0);
        assert_eq!(cache.holders("missing"), 0);

        assert_eq!(cache.purge_unused(), 1);
        assert!(cache.contains("held"));
        assert!(!cache.contains("idle"));
        assert_eq!(disposals.get(), 1);

        drop(handle);
        assert_eq!(cache.purge_unused(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_iteration_in_insertion_order() {
        let mut cache = Cache::new();
        cache.insert("c", 3);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.remove("a");
        let pairs: Vec<(&str, i32)> = cache.iter().map(|(key, value)| (key, **value)).collect();
        assert_eq!(pairs, vec![("c", 3), ("b", 2)]);
    }
}
