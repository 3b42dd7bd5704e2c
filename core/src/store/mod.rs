//! Object storage boundary for cached narration artifacts
//!
//! The cache talks to blob storage through the `ObjectStore` trait so the
//! core stays independent of the backing service. Not-found is normal
//! control flow (`Ok(None)`), never an error. Two backends ship here:
//! a DashMap-backed in-memory store for tests and dry runs, and a RocksDB
//! store for local persistence.

mod memory;
mod rocks;

pub use memory::MemoryStore;
pub use rocks::RocksStore;

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Metadata for a stored object, as returned by `head`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub path: String,
    pub size: u64,
    pub content_type: Option<String>,
    pub created_ms: i64,
}

/// Options for `put`. Overwrite is safe for content-addressed paths:
/// identical key implies identical content.
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    pub content_type: Option<String>,
    pub overwrite: bool,
}

impl PutOptions {
    pub fn audio() -> Self {
        Self {
            content_type: Some("audio/mpeg".to_string()),
            overwrite: true,
        }
    }

    pub fn json() -> Self {
        Self {
            content_type: Some("application/json".to_string()),
            overwrite: true,
        }
    }
}

/// Blob storage boundary.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Metadata for the object at `path`, or `None` if absent.
    async fn head(&self, path: &str) -> Result<Option<ObjectMeta>>;

    /// Paths of all objects whose path starts with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Object bytes, or `None` if absent.
    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>>;

    /// Store bytes at `path`, returning a URL for the stored object.
    /// With `overwrite` unset an existing object is left untouched.
    async fn put(&self, path: &str, bytes: Vec<u8>, opts: PutOptions) -> Result<String>;
}
