//! Core LIFO object pool

use crate::config::{Factory, PoolConfiguration, DEFAULT_INITIAL_CAPACITY};
use crate::errors::{PoolError, PoolResult};
#[cfg(feature = "metrics")]
use crate::metrics::MetricsExporter;
use crate::metrics::{MetricsTracker, PoolMetrics};

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::task::JoinError;
use tracing::{debug, trace};

/// Thread-safe pool of reusable objects.
///
/// Released objects are kept on a stack and handed out most-recent first,
/// so a freshly acquired object is the one most likely to still be warm in
/// cache. When the stack is empty, `acquire` falls back to the configured
/// factory; the factory's output goes to the caller and is not stored.
///
/// The stored count is the length of the guarded buffer, so count and
/// contents are always updated together under the same lock.
///
/// # Examples
///
/// ```
/// use stack_objectpool::Pool;
///
/// let pool = Pool::with_factory(|| Vec::<u8>::with_capacity(4096));
///
/// let mut buffer = pool.acquire().unwrap();
/// buffer.extend_from_slice(b"hello");
/// buffer.clear();
/// pool.release(buffer);
///
/// assert_eq!(pool.count(), 1);
/// ```
pub struct Pool<T> {
    stack: Mutex<Vec<T>>,
    factory: RwLock<Option<Factory<T>>>,
    metrics: MetricsTracker,
}

impl<T> Pool<T> {
    /// Create an empty pool with the default capacity and no factory
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_CAPACITY)
    }

    /// Create an empty pool with room for `capacity` objects before it grows
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stack: Mutex::new(Vec::with_capacity(capacity)),
            factory: RwLock::new(None),
            metrics: MetricsTracker::new(),
        }
    }

    /// Create an empty pool that builds objects with `factory` when it runs dry
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let pool = Self::new();
        pool.set_factory(factory);
        pool
    }

    /// Create a pool from a configuration, running warm-up if requested
    ///
    /// Warm-up needs a factory; without one the warm-up size is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use stack_objectpool::{Pool, PoolConfiguration};
    ///
    /// let config = PoolConfiguration::new()
    ///     .with_initial_capacity(4)
    ///     .with_factory(|| String::from("fresh"))
    ///     .with_warmup(3);
    ///
    /// let pool = Pool::with_config(config);
    /// assert_eq!(pool.count(), 3);
    /// ```
    pub fn with_config(config: PoolConfiguration<T>) -> Self {
        let pool = Self::with_capacity(config.initial_capacity);
        *pool.factory.write() = config.factory;

        if let Some(size) = config.warmup_size
            && pool.warmup(size).is_err()
        {
            debug!(size, "warm-up skipped, no factory configured");
        }
        pool
    }

    /// Take an object from the pool, or build one with the factory
    ///
    /// Returns the most recently released object. On an empty pool the
    /// factory is invoked outside the pool lock and its result is returned
    /// without being stored, so `count()` is unchanged.
    ///
    /// # Errors
    ///
    /// [`PoolError::EmptyPoolNoFactory`] if the pool is empty and no factory
    /// is configured.
    pub fn acquire(&self) -> PoolResult<T> {
        if let Some(item) = self.pop() {
            return Ok(item);
        }

        let factory = self.empty_pool_factory()?;
        let item = factory();
        self.metrics.factory_created.fetch_add(1, Ordering::Relaxed);
        self.metrics.total_acquired.fetch_add(1, Ordering::Relaxed);
        Ok(item)
    }

    /// Try to acquire an object without surfacing the error
    pub fn try_acquire(&self) -> Option<T> {
        self.acquire().ok()
    }

    /// Hand an object back to the pool
    ///
    /// The buffer doubles when full (or grows to fit, whichever is larger);
    /// existing entries keep their positions. There is no upper bound.
    pub fn release(&self, item: T) {
        let count = {
            let mut stack = self.stack.lock();
            push_growing(&mut stack, item);
            stack.len()
        };
        self.metrics.total_released.fetch_add(1, Ordering::Relaxed);
        trace!(count, "object released");
    }

    /// Number of objects currently stored
    ///
    /// Only a snapshot: other threads may change it as soon as this returns.
    pub fn count(&self) -> usize {
        self.stack.lock().len()
    }

    /// Whether the pool currently stores no objects
    pub fn is_empty(&self) -> bool {
        self.stack.lock().is_empty()
    }

    /// Current buffer capacity
    pub fn capacity(&self) -> usize {
        self.stack.lock().capacity()
    }

    /// Set the factory used when `acquire` finds the pool empty
    ///
    /// Replaces any existing factory; the last writer wins.
    pub fn set_factory<F>(&self, factory: F)
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        *self.factory.write() = Some(Arc::new(factory));
    }

    /// Remove the factory, so acquiring from an empty pool fails again
    pub fn clear_factory(&self) {
        *self.factory.write() = None;
    }

    /// Get the configured factory, if any
    pub fn factory(&self) -> Option<Factory<T>> {
        self.factory.read().clone()
    }

    pub fn has_factory(&self) -> bool {
        self.factory.read().is_some()
    }

    /// Pre-populate the pool with `count` objects built by the factory
    ///
    /// Objects are built before the pool lock is taken and pushed in one
    /// critical section.
    ///
    /// # Errors
    ///
    /// [`PoolError::EmptyPoolNoFactory`] if no factory is configured.
    pub fn warmup(&self, count: usize) -> PoolResult<()> {
        let factory = self.factory().ok_or(PoolError::EmptyPoolNoFactory)?;
        let items: Vec<T> = (0..count).map(|_| factory()).collect();
        self.store_warmed(items);
        Ok(())
    }

    /// Get pool metrics
    pub fn get_metrics(&self) -> PoolMetrics {
        let (available, capacity) = {
            let stack = self.stack.lock();
            (stack.len(), stack.capacity())
        };
        self.metrics.get_metrics(available, capacity)
    }

    /// Export metrics
    pub fn export_metrics(&self) -> HashMap<String, String> {
        self.get_metrics().export()
    }

    /// Export metrics in Prometheus format
    #[cfg(feature = "metrics")]
    pub fn export_metrics_prometheus(
        &self,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> prometheus::Result<String> {
        MetricsExporter::export_prometheus(&self.get_metrics(), pool_name, tags)
    }

    fn pop(&self) -> Option<T> {
        let (item, count) = {
            let mut stack = self.stack.lock();
            let item = stack.pop()?;
            (item, stack.len())
        };
        self.metrics.total_acquired.fetch_add(1, Ordering::Relaxed);
        trace!(count, "object acquired from pool");
        Some(item)
    }

    fn empty_pool_factory(&self) -> PoolResult<Factory<T>> {
        match self.factory() {
            Some(factory) => {
                debug!("pool empty, building object with factory");
                Ok(factory)
            }
            None => {
                self.metrics.empty_failures.fetch_add(1, Ordering::Relaxed);
                debug!("pool empty and no factory configured");
                Err(PoolError::EmptyPoolNoFactory)
            }
        }
    }

    fn store_warmed(&self, items: Vec<T>) {
        let created = items.len();
        let count = {
            let mut stack = self.stack.lock();
            for item in items {
                push_growing(&mut stack, item);
            }
            stack.len()
        };
        self.metrics.factory_created.fetch_add(created, Ordering::Relaxed);
        debug!(created, count, "pool warmed up");
    }
}

impl<T: Send + 'static> Pool<T> {
    /// Acquire an object, running an empty-pool factory on the blocking pool
    ///
    /// Useful when the factory is expensive enough to stall an async worker.
    /// A panic inside the factory is resumed in the caller.
    ///
    /// # Errors
    ///
    /// [`PoolError::EmptyPoolNoFactory`] as for [`Pool::acquire`];
    /// [`PoolError::Cancelled`] if the runtime shuts down before the factory
    /// finishes.
    pub async fn acquire_async(&self) -> PoolResult<T> {
        if let Some(item) = self.pop() {
            return Ok(item);
        }

        let factory = self.empty_pool_factory()?;
        let item = run_blocking(move || factory()).await?;
        self.metrics.factory_created.fetch_add(1, Ordering::Relaxed);
        self.metrics.total_acquired.fetch_add(1, Ordering::Relaxed);
        Ok(item)
    }

    /// Warm up asynchronously, building objects on the blocking pool
    pub async fn warmup_async(&self, count: usize) -> PoolResult<()> {
        let factory = self.factory().ok_or(PoolError::EmptyPoolNoFactory)?;
        let items = run_blocking(move || (0..count).map(|_| factory()).collect::<Vec<T>>()).await?;
        self.store_warmed(items);
        Ok(())
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (count, capacity) = {
            let stack = self.stack.lock();
            (stack.len(), stack.capacity())
        };
        f.debug_struct("Pool")
            .field("count", &count)
            .field("capacity", &capacity)
            .field("has_factory", &self.has_factory())
            .finish()
    }
}

/// Push onto the stack, doubling capacity when it is full.
fn push_growing<T>(stack: &mut Vec<T>, item: T) {
    let needed = stack.len() + 1;
    let capacity = stack.capacity();
    if needed > capacity {
        let grown = capacity.saturating_mul(2).max(needed);
        stack.reserve_exact(grown - stack.len());
        debug!(from = capacity, to = stack.capacity(), "pool buffer grown");
    }
    stack.push(item);
}

async fn run_blocking<R, F>(work: F) -> PoolResult<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    join_outcome(tokio::task::spawn_blocking(work).await)
}

/// Map a finished blocking task to a pool result, resuming any panic.
fn join_outcome<R>(result: Result<R, JoinError>) -> PoolResult<R> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(_) => Err(PoolError::Cancelled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_release_then_acquire_is_lifo() {
        let pool = Pool::new();
        for i in 0..3 {
            pool.release(format!("Item{i}"));
        }
        assert_eq!(pool.count(), 3);

        for i in (0..3).rev() {
            assert_eq!(pool.acquire().unwrap(), format!("Item{i}"));
        }
        assert_eq!(pool.count(), 0);
    }

    #[test]
    fn test_empty_without_factory_fails() {
        let pool: Pool<u32> = Pool::new();
        assert_eq!(pool.acquire(), Err(PoolError::EmptyPoolNoFactory));
        assert!(pool.try_acquire().is_none());
        assert_eq!(pool.get_metrics().empty_failures, 2);
    }

    #[test]
    fn test_factory_result_is_not_stored() {
        let pool = Pool::with_factory(|| 42);
        assert_eq!(pool.acquire().unwrap(), 42);
        assert_eq!(pool.count(), 0);

        let metrics = pool.get_metrics();
        assert_eq!(metrics.factory_created, 1);
        assert_eq!(metrics.total_acquired, 1);
    }

    #[test]
    fn test_stored_objects_preferred_over_factory() {
        let pool = Pool::with_factory(|| 0);
        pool.release(7);
        assert_eq!(pool.acquire().unwrap(), 7);
        assert_eq!(pool.acquire().unwrap(), 0);
    }

    #[test]
    fn test_set_and_clear_factory() {
        let pool = Pool::new();
        assert!(!pool.has_factory());

        pool.set_factory(|| 1);
        pool.set_factory(|| 2);
        assert_eq!(pool.acquire().unwrap(), 2);
        assert_eq!((pool.factory().unwrap())(), 2);

        pool.clear_factory();
        assert!(pool.factory().is_none());
        assert_eq!(pool.acquire(), Err(PoolError::EmptyPoolNoFactory));
    }

    #[test]
    fn test_growth_preserves_contents() {
        let pool = Pool::new();
        assert_eq!(pool.capacity(), DEFAULT_INITIAL_CAPACITY);

        let items: Vec<Arc<usize>> = (0..15).map(Arc::new).collect();
        for item in &items {
            pool.release(Arc::clone(item));
        }
        assert_eq!(pool.count(), 15);
        assert!(pool.capacity() >= 20);

        for expected in items.iter().rev() {
            let got = pool.acquire().unwrap();
            assert!(Arc::ptr_eq(&got, expected));
        }
        assert!(pool.is_empty());
    }

    #[test]
    fn test_growth_from_zero_capacity() {
        let pool = Pool::with_capacity(0);
        pool.release(1u64);
        pool.release(2u64);
        pool.release(3u64);
        assert!(pool.capacity() >= 3);
        assert_eq!(pool.acquire().unwrap(), 3);
    }

    #[test]
    fn test_push_growing_doubles() {
        let mut stack: Vec<u64> = Vec::with_capacity(4);
        for i in 0..4 {
            push_growing(&mut stack, i);
        }
        assert_eq!(stack.capacity(), 4);

        push_growing(&mut stack, 4);
        assert!(stack.capacity() >= 8);
        assert_eq!(stack, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_config_warmup() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let config = PoolConfiguration::new()
            .with_initial_capacity(2)
            .with_factory(move || counter.fetch_add(1, Ordering::SeqCst))
            .with_warmup(5);

        let pool = Pool::with_config(config);
        assert_eq!(pool.count(), 5);
        assert_eq!(created.load(Ordering::SeqCst), 5);
        assert_eq!(pool.get_metrics().factory_created, 5);
        assert_eq!(pool.get_metrics().total_released, 0);
    }

    #[test]
    fn test_config_warmup_without_factory_is_ignored() {
        let pool: Pool<u8> = Pool::with_config(PoolConfiguration::new().with_warmup(3));
        assert_eq!(pool.count(), 0);
        assert_eq!(pool.warmup(1), Err(PoolError::EmptyPoolNoFactory));
    }

    #[test]
    fn test_count_tracks_releases_minus_acquires() {
        let pool = Pool::new();
        for i in 0..10 {
            pool.release(i);
        }
        for _ in 0..4 {
            pool.acquire().unwrap();
        }
        pool.release(99);
        assert_eq!(pool.count(), 7);
        assert_eq!(pool.acquire().unwrap(), 99);
    }

    #[test]
    fn test_concurrent_release_then_acquire() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 100;

        let pool = Pool::new();

        crossbeam::thread::scope(|s| {
            for t in 0..THREADS {
                let pool = &pool;
                s.spawn(move |_| {
                    for i in 0..PER_THREAD {
                        pool.release(t * PER_THREAD + i);
                    }
                });
            }
        })
        .unwrap();
        assert_eq!(pool.count(), THREADS * PER_THREAD);

        let acquired = crossbeam::thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let pool = &pool;
                    s.spawn(move |_| {
                        (0..PER_THREAD)
                            .map(|_| pool.acquire().unwrap())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect::<Vec<_>>()
        })
        .unwrap();

        assert_eq!(acquired.len(), THREADS * PER_THREAD);
        let unique: HashSet<_> = acquired.iter().copied().collect();
        assert_eq!(unique, (0..THREADS * PER_THREAD).collect::<HashSet<_>>());
        assert_eq!(pool.count(), 0);
    }

    #[test]
    fn test_concurrent_mixed_with_factory() {
        let pool = Pool::with_factory(|| 0usize);

        crossbeam::thread::scope(|s| {
            for _ in 0..4 {
                let pool = &pool;
                s.spawn(move |_| {
                    for _ in 0..250 {
                        let item = pool.acquire().unwrap();
                        pool.release(item + 1);
                    }
                });
            }
        })
        .unwrap();

        let metrics = pool.get_metrics();
        assert_eq!(metrics.total_acquired, 1000);
        assert_eq!(metrics.total_released, 1000);
        assert_eq!(pool.count(), metrics.factory_created);

        let uses: usize = (0..pool.count()).map(|_| pool.acquire().unwrap()).sum();
        assert_eq!(uses, 1000);
    }

    #[tokio::test]
    async fn test_acquire_async() {
        let pool = Pool::with_factory(|| String::from("built"));
        pool.release(String::from("pooled"));

        assert_eq!(pool.acquire_async().await.unwrap(), "pooled");
        assert_eq!(pool.acquire_async().await.unwrap(), "built");
        assert_eq!(pool.count(), 0);
    }

    #[tokio::test]
    async fn test_acquire_async_without_factory() {
        let pool: Pool<String> = Pool::new();
        assert_eq!(pool.acquire_async().await, Err(PoolError::EmptyPoolNoFactory));
    }

    #[tokio::test]
    #[should_panic(expected = "factory boom")]
    async fn test_acquire_async_resumes_factory_panic() {
        let pool = Pool::with_factory(|| -> u32 { panic!("factory boom") });
        let _ = pool.acquire_async().await;
    }

    #[tokio::test]
    async fn test_cancelled_blocking_task_maps_to_cancelled() {
        let handle = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            1u32
        });
        handle.abort();

        assert_eq!(join_outcome(handle.await), Err(PoolError::Cancelled));
    }

    #[tokio::test]
    async fn test_finished_blocking_task_passes_value_through() {
        let result = tokio::task::spawn_blocking(|| 5u32).await;
        assert_eq!(join_outcome(result), Ok(5));
    }

    #[tokio::test]
    async fn test_warmup_async() {
        let pool = Pool::with_factory(|| vec![0u8; 32]);
        pool.warmup_async(12).await.unwrap();
        assert_eq!(pool.count(), 12);
        assert!(pool.capacity() >= 12);
    }

    #[test]
    fn test_debug_output() {
        let pool = Pool::with_factory(|| 1);
        pool.release(2);
        let rendered = format!("{pool:?}");
        assert!(rendered.contains("count: 1"));
        assert!(rendered.contains("has_factory: true"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn acquires_mirror_releases(items in proptest::collection::vec(any::<i64>(), 0..200)) {
                let pool = Pool::with_capacity(3);
                for item in &items {
                    pool.release(*item);
                }
                prop_assert_eq!(pool.count(), items.len());

                let drained: Vec<i64> = (0..items.len()).map(|_| pool.acquire().unwrap()).collect();
                let expected: Vec<i64> = items.iter().rev().copied().collect();
                prop_assert_eq!(drained, expected);
                prop_assert_eq!(pool.acquire(), Err(PoolError::EmptyPoolNoFactory));
            }

            #[test]
            fn count_is_releases_minus_acquires(ops in proptest::collection::vec(any::<bool>(), 0..300)) {
                let pool = Pool::new();
                let mut expected = 0usize;
                for (i, release) in ops.into_iter().enumerate() {
                    if release || expected == 0 {
                        pool.release(i);
                        expected += 1;
                    } else {
                        pool.acquire().unwrap();
                        expected -= 1;
                    }
                }
                prop_assert_eq!(pool.count(), expected);
            }
        }
    }
}
