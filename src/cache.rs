//! A small thread-safe memo table.
//!
//! Every access goes through one [`parking_lot::Mutex`]; critical sections
//! are a single map operation, so a coarse lock is enough for the read-mostly,
//! build-time memoization this is used for. Entries never expire.

use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::Mutex;

/// A `K → V` map shared between threads.
///
/// `get` clones the value out, so keep `V` cheap to clone (`Arc<…>` for
/// anything heavy).
#[derive(Debug)]
pub struct Cache<K, V> {
    entries: Mutex<HashMap<K, V>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.lock().get(key).cloned()
    }

    /// Stores `value`, replacing any previous entry for `key`.
    pub fn set(&self, key: K, value: V) {
        self.entries.lock().insert(key, value);
    }

    /// Returns the cached value, computing and storing it first if absent.
    ///
    /// `init` runs while the lock is held; it must not touch this cache.
    pub fn get_or_insert_with(&self, key: K, init: impl FnOnce() -> V) -> V {
        self.entries.lock().entry(key).or_insert_with(init).clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// An independent copy with its own lock. The source is locked for the
/// duration of the copy.
impl<K, V> Clone for Cache<K, V>
where
    K: Clone,
    V: Clone,
{
    fn clone(&self) -> Self {
        let entries = self.entries.lock().clone();
        Self { entries: Mutex::new(entries) }
    }
}
