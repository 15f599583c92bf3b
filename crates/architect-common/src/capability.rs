//! Capabilities injected into the pipeline from outside.
//!
//! The core never touches the filesystem or durable storage directly; it is
//! handed one implementation of each trait at construction time.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Writes bytes to a resolved path. Used only by the change ledger.
#[async_trait]
pub trait FileWriter: Send + Sync {
    async fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Durable key/value storage carrying one serialized value across a restart.
pub trait KeyValueStore: Send + Sync {
    fn store(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
