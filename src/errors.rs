//! Error types for the object pool

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// `acquire` found the pool empty and there is no factory to fall back on.
    #[error("Pool is empty and no factory is configured - set a factory or release objects first")]
    EmptyPoolNoFactory,

    /// The blocking task running the factory was cancelled before it finished.
    #[error("Operation was cancelled")]
    Cancelled,
}

pub type PoolResult<T> = Result<T, PoolError>;
