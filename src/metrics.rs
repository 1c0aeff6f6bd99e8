//! Metrics collection and export for object pools

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Metrics data for a pool
///
/// # Examples
///
/// ```
/// use stack_objectpool::Pool;
///
/// let pool = Pool::with_factory(|| vec![0u8; 16]);
/// pool.release(vec![1u8; 16]);
///
/// let first = pool.acquire().unwrap();
/// let second = pool.acquire().unwrap();
/// pool.release(first);
///
/// let metrics = pool.get_metrics();
/// assert_eq!(metrics.total_acquired, 2);
/// assert_eq!(metrics.factory_created, 1);
/// assert_eq!(metrics.available_objects, 1);
/// # drop(second);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "metrics", derive(serde::Serialize))]
pub struct PoolMetrics {
    /// Objects handed out, whether popped or freshly built
    pub total_acquired: usize,

    /// Objects handed back through `release` (warm-up not included)
    pub total_released: usize,

    /// Objects built by the factory, warm-up included
    pub factory_created: usize,

    /// Acquires that failed because the pool was empty with no factory
    pub empty_failures: usize,

    /// Objects currently stored in the pool
    pub available_objects: usize,

    /// Current buffer capacity
    pub capacity: usize,
}

impl PoolMetrics {
    /// Export metrics as a HashMap
    pub fn export(&self) -> HashMap<String, String> {
        let mut metrics = HashMap::new();
        metrics.insert("total_acquired".to_string(), self.total_acquired.to_string());
        metrics.insert("total_released".to_string(), self.total_released.to_string());
        metrics.insert("factory_created".to_string(), self.factory_created.to_string());
        metrics.insert("empty_failures".to_string(), self.empty_failures.to_string());
        metrics.insert("available_objects".to_string(), self.available_objects.to_string());
        metrics.insert("capacity".to_string(), self.capacity.to_string());
        metrics
    }
}

/// Metrics exporter for Prometheus format
#[cfg(feature = "metrics")]
pub struct MetricsExporter;

#[cfg(feature = "metrics")]
impl MetricsExporter {
    /// Export metrics in Prometheus exposition format
    ///
    /// Every series carries a `pool` label plus one label per tag. A tag
    /// named `pool` replaces the pool name label.
    ///
    /// # Examples
    ///
    /// ```
    /// use stack_objectpool::Pool;
    /// use std::collections::HashMap;
    ///
    /// let pool = Pool::new();
    /// pool.release(1u32);
    ///
    /// let mut tags = HashMap::new();
    /// tags.insert("service".to_string(), "api".to_string());
    ///
    /// let output = pool.export_metrics_prometheus("my_pool", Some(&tags)).unwrap();
    /// assert!(output.contains("objectpool_objects_available"));
    /// assert!(output.contains("service=\"api\""));
    /// ```
    pub fn export_prometheus(
        metrics: &PoolMetrics,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> prometheus::Result<String> {
        use prometheus::{Encoder, IntCounter, IntGauge, Opts, Registry, TextEncoder};

        let labels = Self::labels(pool_name, tags);
        let registry = Registry::new();
        let opts = |name: &str, help: &str| Opts::new(name, help).const_labels(labels.clone());

        let gauges = [
            ("objectpool_objects_available", "Objects currently stored in the pool", metrics.available_objects),
            ("objectpool_capacity", "Current buffer capacity", metrics.capacity),
        ];
        for (name, help, value) in gauges {
            let gauge = IntGauge::with_opts(opts(name, help))?;
            gauge.set(i64::try_from(value).unwrap_or(i64::MAX));
            registry.register(Box::new(gauge))?;
        }

        let counters = [
            ("objectpool_objects_acquired_total", "Total objects acquired", metrics.total_acquired),
            ("objectpool_objects_released_total", "Total objects released", metrics.total_released),
            ("objectpool_factory_created_total", "Objects built by the factory", metrics.factory_created),
            ("objectpool_empty_failures_total", "Acquires on an empty pool without a factory", metrics.empty_failures),
        ];
        for (name, help, value) in counters {
            let counter = IntCounter::with_opts(opts(name, help))?;
            counter.inc_by(value as u64);
            registry.register(Box::new(counter))?;
        }

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    fn labels(pool_name: &str, tags: Option<&HashMap<String, String>>) -> HashMap<String, String> {
        let mut labels = HashMap::from([("pool".to_string(), pool_name.to_string())]);
        if let Some(tags) = tags {
            labels.extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        labels
    }
}

/// Internal metrics tracker
#[derive(Debug, Default)]
pub(crate) struct MetricsTracker {
    pub total_acquired: AtomicUsize,
    pub total_released: AtomicUsize,
    pub factory_created: AtomicUsize,
    pub empty_failures: AtomicUsize,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_metrics(&self, available: usize, capacity: usize) -> PoolMetrics {
        PoolMetrics {
            total_acquired: self.total_acquired.load(Ordering::Relaxed),
            total_released: self.total_released.load(Ordering::Relaxed),
            factory_created: self.factory_created.load(Ordering::Relaxed),
            empty_failures: self.empty_failures.load(Ordering::Relaxed),
            available_objects: available,
            capacity,
        }
    }
}
