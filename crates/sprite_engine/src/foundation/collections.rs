//! Specialized collection types
//!
//! [`LockingCollection`] is the ordered, duplicate-free container layers and
//! worlds keep their contents in. Render callbacks routinely add or remove
//! elements of the very collection being walked ("this sprite died"), so
//! structural changes made during a pass are buffered and applied when the
//! pass ends.
//!
//! The "lock" is a single-threaded reentrancy flag, not a mutex. All methods
//! take `&self`; a visited element may hold a reference to its own collection.

use std::cell::{Cell, RefCell};
use std::fmt;
use thiserror::Error;

/// Errors raised by mutation-safe collections
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CollectionError {
    /// `for_each` was called on a collection that is already being iterated
    #[error("nested iteration over a locked collection")]
    ReentrantIteration,
}

/// Changes recorded while the collection is locked
struct Pending<T> {
    adds: Vec<T>,
    removes: Vec<T>,
    clear: bool,
}

impl<T> Pending<T> {
    fn new() -> Self {
        Self {
            adds: Vec::new(),
            removes: Vec::new(),
            clear: false,
        }
    }

    fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.removes.is_empty() && !self.clear
    }
}

/// Ordered, duplicate-free sequence that tolerates mutation during iteration
///
/// Elements are compared with `PartialEq`; handle types that should compare
/// by identity (renderables, loops) implement it with pointer equality.
///
/// Reconciliation when a pass ends: pending removes are applied first, then
/// pending adds are appended in call order. An element both added and removed
/// during the same pass ends up absent.
pub struct LockingCollection<T> {
    committed: RefCell<Vec<T>>,
    pending: RefCell<Pending<T>>,
    locked: Cell<bool>,
}

impl<T: PartialEq> LockingCollection<T> {
    /// Create an empty collection
    pub fn new() -> Self {
        Self {
            committed: RefCell::new(Vec::new()),
            pending: RefCell::new(Pending::new()),
            locked: Cell::new(false),
        }
    }

    /// Add an element at the end
    ///
    /// Returns `false` if the element is already present (or already queued).
    /// While locked the element is queued and appears after the pass.
    pub fn add(&self, item: T) -> bool {
        if !self.locked.get() {
            let mut committed = self.committed.borrow_mut();
            if committed.contains(&item) {
                return false;
            }
            committed.push(item);
            return true;
        }

        let mut pending = self.pending.borrow_mut();
        let already_committed = !pending.clear && self.committed.borrow().contains(&item);
        if already_committed || pending.adds.contains(&item) || pending.removes.contains(&item) {
            return false;
        }
        pending.adds.push(item);
        true
    }

    /// Remove an element
    ///
    /// Returns whether the element was present (committed or queued). While
    /// locked the removal takes effect after the pass.
    pub fn remove(&self, item: &T) -> bool
    where
        T: Clone,
    {
        if !self.locked.get() {
            let mut committed = self.committed.borrow_mut();
            return match committed.iter().position(|existing| existing == item) {
                Some(index) => {
                    committed.remove(index);
                    true
                }
                None => false,
            };
        }

        let mut pending = self.pending.borrow_mut();
        let mut present = !pending.clear && self.committed.borrow().contains(item);
        if let Some(index) = pending.adds.iter().position(|queued| queued == item) {
            pending.adds.remove(index);
            present = true;
        }
        if present && !pending.removes.contains(item) {
            pending.removes.push(item.clone());
        }
        present
    }

    /// Remove every element (deferred while locked)
    pub fn clear(&self) {
        if self.locked.get() {
            let mut pending = self.pending.borrow_mut();
            pending.adds.clear();
            pending.removes.clear();
            pending.clear = true;
        } else {
            self.committed.borrow_mut().clear();
        }
    }

    /// Whether the committed sequence holds `item`
    ///
    /// Queued changes are not visible until the current pass ends.
    pub fn contains(&self, item: &T) -> bool {
        self.committed.borrow().contains(item)
    }

    /// Visit every element present when the call began, in order
    ///
    /// Elements added from inside `action` are not visited in this pass and
    /// removed elements are still visited; both changes apply once the pass
    /// completes. Calling `for_each` again from inside `action` fails with
    /// [`CollectionError::ReentrantIteration`].
    pub fn for_each<F>(&self, mut action: F) -> Result<(), CollectionError>
    where
        F: FnMut(&T),
    {
        self.try_for_each(|item| {
            action(item);
            Ok::<(), CollectionError>(())
        })
    }

    /// Like [`for_each`](Self::for_each) but stops at the first error
    ///
    /// Changes queued before the error are still applied.
    pub fn try_for_each<E, F>(&self, mut action: F) -> Result<(), E>
    where
        E: From<CollectionError>,
        F: FnMut(&T) -> Result<(), E>,
    {
        if self.locked.replace(true) {
            log::error!("LockingCollection: nested for_each rejected");
            return Err(CollectionError::ReentrantIteration.into());
        }

        // Declared before the borrow so it runs after the borrow is released,
        // on early return and on unwind alike.
        let _unlock = scopeguard::guard((), |()| self.unlock());
        let committed = self.committed.borrow();
        for item in committed.iter() {
            action(item)?;
        }
        Ok(())
    }

    /// Find the first committed element matching `predicate`
    pub fn find<P>(&self, mut predicate: P) -> Option<T>
    where
        T: Clone,
        P: FnMut(&T) -> bool,
    {
        self.committed.borrow().iter().find(|item| predicate(item)).cloned()
    }

    /// Find the first element queued for addition by the current pass
    pub fn find_pending<P>(&self, mut predicate: P) -> Option<T>
    where
        T: Clone,
        P: FnMut(&T) -> bool,
    {
        self.pending.borrow().adds.iter().find(|item| predicate(item)).cloned()
    }

    /// Copy of the committed sequence
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.committed.borrow().clone()
    }

    /// Number of committed elements
    pub fn len(&self) -> usize {
        self.committed.borrow().len()
    }

    /// Whether there are no committed elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a pass is currently in progress
    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }

    fn unlock(&self) {
        let mut pending = self.pending.borrow_mut();
        if !pending.is_empty() {
            let mut committed = self.committed.borrow_mut();
            if pending.clear {
                committed.clear();
                pending.clear = false;
            }
            for removed in pending.removes.drain(..) {
                committed.retain(|existing| *existing != removed);
            }
            for added in pending.adds.drain(..) {
                if !committed.contains(&added) {
                    committed.push(added);
                }
            }
        }
        self.locked.set(false);
    }
}

impl<T: PartialEq> Default for LockingCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> FromIterator<T> for LockingCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let collection = Self::new();
        for item in iter {
            collection.add(item);
        }
        collection
    }
}

impl<T: fmt::Debug> fmt::Debug for LockingCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockingCollection")
            .field("committed", &self.committed.borrow())
            .field("locked", &self.locked.get())
            .finish()
    }
}
