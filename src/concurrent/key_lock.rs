//! Per-key mutual exclusion.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

struct LockEntry {
    lock: Arc<AsyncMutex<()>>,
    nb_usage: usize,
}

/// Mutual exclusion keyed by arbitrary hashable values.
///
/// Tasks locking the same key serialize; tasks locking distinct keys only
/// contend on the short map-maintenance section. Per-key locks are created
/// on demand and removed as soon as their last user releases them, so the
/// map never grows beyond the set of currently used keys.
///
/// ```
/// use jstream::concurrent::KeyLockManager;
///
/// # async fn example(manager: &KeyLockManager<String>) {
/// let _guard = manager.lock("user-42".to_string()).await;
/// // critical section for key "user-42"
/// # }
/// ```
pub struct KeyLockManager<K> {
    entries: Mutex<HashMap<K, LockEntry>>,
}

impl<K> KeyLockManager<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        KeyLockManager {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Acquires the lock for the given key, waiting until it is free.
    pub async fn lock(&self, key: K) -> KeyLockGuard<'_, K> {
        let lock = self.load(&key);
        let guard = lock.lock_owned().await;
        KeyLockGuard {
            manager: self,
            key,
            guard: Some(guard),
        }
    }

    /// Attempts to acquire the lock for the given key without waiting.
    /// Returns `None` when another task currently holds it.
    pub fn try_lock(&self, key: K) -> Option<KeyLockGuard<'_, K>> {
        let lock = self.load(&key);
        match lock.try_lock_owned() {
            Ok(guard) => Some(KeyLockGuard {
                manager: self,
                key,
                guard: Some(guard),
            }),
            Err(_) => {
                self.release(&key);
                None
            }
        }
    }

    /// Registers one usage of the key and returns its lock, creating the
    /// entry when the key is not in use.
    fn load(&self, key: &K) -> Arc<AsyncMutex<()>> {
        let mut entries = self.lock_entries();
        match entries.get_mut(key) {
            Some(entry) => {
                entry.nb_usage += 1;
                Arc::clone(&entry.lock)
            }
            None => {
                let lock = Arc::new(AsyncMutex::new(()));
                entries.insert(
                    key.clone(),
                    LockEntry {
                        lock: Arc::clone(&lock),
                        nb_usage: 1,
                    },
                );
                lock
            }
        }
    }

    /// Unregisters one usage of the key, dropping the entry when it was the
    /// last one.
    fn release(&self, key: &K) {
        let mut entries = self.lock_entries();
        if let Some(entry) = entries.get_mut(key) {
            if entry.nb_usage == 1 {
                entries.remove(key);
            } else {
                entry.nb_usage -= 1;
            }
        }
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<K, LockEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of keys currently in use, for observability.
    pub fn active_keys(&self) -> usize {
        self.lock_entries().len()
    }
}

impl<K> Default for KeyLockManager<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard returned by [`KeyLockManager::lock`]; releases the key on
/// drop.
pub struct KeyLockGuard<'a, K>
where
    K: Eq + Hash + Clone,
{
    manager: &'a KeyLockManager<K>,
    key: K,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<K> Drop for KeyLockGuard<'_, K>
where
    K: Eq + Hash + Clone,
{
    fn drop(&mut self) {
        self.guard.take();
        self.manager.release(&self.key);
    }
}
