//! Plan persistence.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::codec::CodecError;
use crate::plan::Plan;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Plan not found: {0}")]
    NotFound(String),
    #[error("Plan codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Named plan storage backend.
///
/// Operations are promise-style: nothing happens until the returned future
/// is driven, and it completes on whichever thread drives it.
pub trait Storage: Send + Sync {
    /// Save a plan under `id`, replacing any previous one.
    fn save(&self, id: &str, plan: &Plan) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a plan.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Plan>>;

    /// Delete a plan. Deleting a missing plan is not an error.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all plan IDs.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a plan exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}
