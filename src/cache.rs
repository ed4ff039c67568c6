//! Process-wide keyed cache with lazy, de-duplicated initialisation.
//!
//! Entries are created on first use and never evicted. When several threads
//! ask for the same missing key at once, one runs the initialiser and the
//! rest wait for its result.

use std::collections::HashMap;
use std::convert::Infallible;
use std::hash::Hash;

use eyre::Result;
use parking_lot::{Condvar, Mutex};

enum Slot<V> {
    Loading,
    Ready(V),
}

pub struct KeyedCache<K, V> {
    slots: Mutex<HashMap<K, Slot<V>>>,
    ready: Condvar,
}

impl<K, V> Default for KeyedCache<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            ready: Condvar::new(),
        }
    }
}

/// Removes a `Loading` slot if the initialiser fails or panics.
struct LoadingGuard<'a, K: Eq + Hash, V> {
    cache: &'a KeyedCache<K, V>,
    key: Option<K>,
}

impl<K: Eq + Hash, V> Drop for LoadingGuard<'_, K, V> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.cache.slots.lock().remove(&key);
            self.cache.ready.notify_all();
        }
    }
}

impl<K, V> KeyedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<V> {
        match self.slots.lock().get(key) {
            Some(Slot::Ready(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Number of initialised entries.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_or_init<F>(&self, key: K, init: F) -> V
    where
        F: FnOnce() -> V,
    {
        match self.init_with(key, || Ok::<V, Infallible>(init())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Returns the cached value for `key`, running `init` if it is missing.
    ///
    /// A failed initialisation leaves no entry behind, so the next caller
    /// retries.
    pub fn get_or_try_init<F>(&self, key: K, init: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        self.init_with(key, init)
    }

    fn init_with<F, E>(&self, key: K, init: F) -> std::result::Result<V, E>
    where
        F: FnOnce() -> std::result::Result<V, E>,
    {
        let mut slots = self.slots.lock();
        loop {
            match slots.get(&key) {
                Some(Slot::Ready(value)) => return Ok(value.clone()),
                Some(Slot::Loading) => self.ready.wait(&mut slots),
                None => break,
            }
        }
        slots.insert(key.clone(), Slot::Loading);
        drop(slots);

        let mut guard = LoadingGuard {
            cache: self,
            key: Some(key),
        };
        let value = init()?;

        if let Some(key) = guard.key.take() {
            self.slots.lock().insert(key, Slot::Ready(value.clone()));
            self.ready.notify_all();
        }
        Ok(value)
    }
}
