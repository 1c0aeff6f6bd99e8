//! # stack_objectpool
//!
//! Thread-safe pool that recycles expensive-to-construct objects so callers
//! can borrow and return them instead of allocating fresh ones.
//!
//! ## Features
//!
//! - LIFO reuse: the most recently released object is handed out first
//! - Optional factory used when the pool is empty
//! - Unbounded growth with a doubling buffer
//! - Opt-in process-wide pool per type via [`Pool::global`]
//! - Keyed pool creating at most one value per key
//! - Async acquire that builds objects on the blocking thread pool
//! - Metrics with Prometheus export (`metrics` feature)
//!
//! ## Quick Start
//!
//! ```rust
//! use stack_objectpool::Pool;
//!
//! let pool = Pool::with_factory(|| String::with_capacity(256));
//!
//! let mut s = pool.acquire().unwrap();
//! s.push_str("scratch");
//! s.clear();
//! pool.release(s);
//!
//! assert_eq!(pool.count(), 1);
//! ```

mod config;
mod errors;
mod global;
mod keyed;
mod metrics;
mod pool;

pub use config::{Factory, PoolConfiguration, DEFAULT_INITIAL_CAPACITY};
pub use errors::{PoolError, PoolResult};
pub use keyed::{KeyedFactory, KeyedPool};
#[cfg(feature = "metrics")]
pub use metrics::MetricsExporter;
pub use metrics::PoolMetrics;
pub use pool::Pool;
