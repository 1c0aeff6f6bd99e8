//! Process-wide default pools, one per pooled type

use crate::pool::Pool;

use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::OnceLock;
use tracing::debug;

type Registry = DashMap<TypeId, &'static (dyn Any + Send + Sync)>;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

impl<T: Send + 'static> Pool<T> {
    /// Shared pool for `T`, created on first access and kept until exit
    ///
    /// Creation happens at most once per type even under concurrent first
    /// access. The global pool is independent of pools built with
    /// [`Pool::new`], which remain the better choice for tests.
    ///
    /// # Examples
    ///
    /// ```
    /// use stack_objectpool::Pool;
    ///
    /// struct Scratch(Vec<u8>);
    ///
    /// Pool::<Scratch>::global().set_factory(|| Scratch(Vec::with_capacity(256)));
    /// let scratch = Pool::<Scratch>::global().acquire().unwrap();
    /// Pool::<Scratch>::global().release(scratch);
    ///
    /// assert!(std::ptr::eq(Pool::<Scratch>::global(), Pool::<Scratch>::global()));
    /// ```
    pub fn global() -> &'static Pool<T> {
        let registry = REGISTRY.get_or_init(DashMap::new);
        let type_id = TypeId::of::<T>();
        let existing = registry.get(&type_id).map(|entry| *entry.value());
        let entry = match existing {
            Some(entry) => entry,
            None => *registry.entry(type_id).or_insert_with(|| {
                debug!(type_name = std::any::type_name::<T>(), "creating global pool");
                let pool: &'static Pool<T> = Box::leak(Box::new(Pool::new()));
                pool as &'static (dyn Any + Send + Sync)
            }),
        };

        match entry.downcast_ref::<Pool<T>>() {
            Some(pool) => pool,
            None => unreachable!("global pool registered under a foreign TypeId"),
        }
    }
}
