//! Pool configuration options

use std::fmt;
use std::sync::Arc;

/// Number of slots a pool reserves when no capacity is given.
pub const DEFAULT_INITIAL_CAPACITY: usize = 10;

/// Shared zero-argument constructor used when the pool runs dry.
pub type Factory<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Configuration for object pool behavior
///
/// # Examples
///
/// ```
/// use stack_objectpool::PoolConfiguration;
///
/// let config = PoolConfiguration::new()
///     .with_initial_capacity(64)
///     .with_factory(|| String::with_capacity(1024))
///     .with_warmup(8);
///
/// assert_eq!(config.initial_capacity, 64);
/// assert_eq!(config.warmup_size, Some(8));
/// assert!(config.factory.is_some());
/// ```
#[derive(Clone)]
pub struct PoolConfiguration<T> {
    /// Number of slots reserved up front
    pub initial_capacity: usize,

    /// Constructor invoked when `acquire` finds the pool empty
    pub factory: Option<Factory<T>>,

    /// Number of objects to pre-create with the factory on construction
    pub warmup_size: Option<usize>,
}

impl<T> Default for PoolConfiguration<T> {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            factory: None,
            warmup_size: None,
        }
    }
}

impl<T> fmt::Debug for PoolConfiguration<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfiguration")
            .field("initial_capacity", &self.initial_capacity)
            .field("factory", &self.factory.as_ref().map(|_| "<fn>"))
            .field("warmup_size", &self.warmup_size)
            .finish()
    }
}

impl<T> PoolConfiguration<T> {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of slots reserved up front
    ///
    /// # Examples
    ///
    /// ```
    /// use stack_objectpool::PoolConfiguration;
    ///
    /// let config = PoolConfiguration::<Vec<u8>>::new().with_initial_capacity(3);
    /// assert_eq!(config.initial_capacity, 3);
    /// ```
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Set the factory used on empty-pool acquire
    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Set warm-up size
    pub fn with_warmup(mut self, size: usize) -> Self {
        self.warmup_size = Some(size);
        self
    }
}
