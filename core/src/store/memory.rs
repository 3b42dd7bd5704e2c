//! In-memory object store.
//!
//! Uses DashMap for concurrent access. Suitable for tests and the demo's
//! dry-run mode; nothing survives the process.

use super::{ObjectMeta, ObjectStore, PutOptions};
use crate::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use tracing::trace;

struct StoredObject {
    bytes: Vec<u8>,
    meta: ObjectMeta,
}

#[derive(Default)]
pub struct MemoryStore {
    objects: DashMap<String, StoredObject>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn url(path: &str) -> String {
        format!("memory://{path}")
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn head(&self, path: &str) -> Result<Option<ObjectMeta>> {
        Ok(self.objects.get(path).map(|o| o.meta.clone()))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut paths: Vec<String> = self
            .objects
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect();
        paths.sort();
        Ok(paths)
    }

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.objects.get(path).map(|o| o.bytes.clone()))
    }

    async fn put(&self, path: &str, bytes: Vec<u8>, opts: PutOptions) -> Result<String> {
        if !opts.overwrite && self.objects.contains_key(path) {
            return Ok(Self::url(path));
        }
        trace!(target: "store", path, size = bytes.len(), "put object");
        let meta = ObjectMeta {
            path: path.to_string(),
            size: bytes.len() as u64,
            content_type: opts.content_type,
            created_ms: chrono::Utc::now().timestamp_millis(),
        };
        self.objects
            .insert(path.to_string(), StoredObject { bytes, meta });
        Ok(Self::url(path))
    }
}
