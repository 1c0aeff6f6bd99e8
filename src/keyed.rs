//! Keyed pool: one lazily created value per key

use dashmap::DashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

/// Hook that builds the value for a key the first time it is requested
pub trait KeyedFactory<K, T>: Send + Sync {
    fn create_object(&self, key: &K) -> T;
}

impl<K, T, F> KeyedFactory<K, T> for F
where
    F: Fn(&K) -> T + Send + Sync,
{
    fn create_object(&self, key: &K) -> T {
        self(key)
    }
}

/// Cache of at most one value per key, created on demand
///
/// Each value is built once and shared: every `get` for a key returns an
/// `Arc` to the same instance. Values are never evicted and there is no
/// release. Concurrent first
/// requests for the same key run the factory once; every caller gets the
/// value from that single run.
///
/// The factory runs while the key's shard is locked, so it must not call
/// back into the same keyed pool.
///
/// # Examples
///
/// ```
/// use stack_objectpool::KeyedPool;
/// use std::sync::Arc;
///
/// let pool: KeyedPool<String, String, _> =
///     KeyedPool::new(|name: &String| format!("connection to {name}"));
///
/// let a = pool.get(&"db".to_string());
/// let b = pool.get(&"db".to_string());
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(pool.len(), 1);
/// ```
pub struct KeyedPool<K, T, F> {
    values: DashMap<K, Arc<T>>,
    factory: F,
}

impl<K, T, F> KeyedPool<K, T, F>
where
    K: Eq + Hash + Clone,
    F: KeyedFactory<K, T>,
{
    /// Create an empty keyed pool around a creation hook
    pub fn new(factory: F) -> Self {
        Self {
            values: DashMap::new(),
            factory,
        }
    }

    /// Get the value for `key`, creating it on first request
    pub fn get(&self, key: &K) -> Arc<T> {
        if let Some(value) = self.values.get(key) {
            return Arc::clone(value.value());
        }

        self.values
            .entry(key.clone())
            .or_insert_with(|| {
                debug!("creating keyed pool entry");
                Arc::new(self.factory.create_object(key))
            })
            .value()
            .clone()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    /// Number of keys with a created value
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }
}

impl<K: Eq + Hash, T, F> fmt::Debug for KeyedPool<K, T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedPool")
            .field("len", &self.values.len())
            .finish()
    }
}
