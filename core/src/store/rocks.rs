//! RocksDB-backed object store for local persistence.

use super::{ObjectMeta, ObjectStore, PutOptions};
use crate::{LectorError, Result};
use async_trait::async_trait;
use rocksdb::{Direction, IteratorMode, Options, DB};
use std::path::Path;
use tracing::{info, trace};

const OBJ_PREFIX: &str = "obj:";
const META_PREFIX: &str = "meta:";

/// Persistent object store using RocksDB.
///
/// Object bytes live under `obj:{path}`, metadata as JSON under
/// `meta:{path}`; prefix listing walks the `obj:` keyspace.
pub struct RocksStore {
    db: DB,
}

impl RocksStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DB::open(&opts, path).map_err(|e| LectorError::Storage(e.to_string()))?;

        info!(target: "store", "RocksDB object store initialized");
        Ok(Self { db })
    }

    fn url(path: &str) -> String {
        format!("rocks://{path}")
    }
}

#[async_trait]
impl ObjectStore for RocksStore {
    async fn head(&self, path: &str) -> Result<Option<ObjectMeta>> {
        match self.db.get(format!("{META_PREFIX}{path}")) {
            Ok(Some(data)) => Ok(Some(serde_json::from_slice(&data)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(LectorError::Storage(e.to_string())),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let start = format!("{OBJ_PREFIX}{prefix}");
        let mut paths = Vec::new();
        let iter = self
            .db
            .iterator(IteratorMode::From(start.as_bytes(), Direction::Forward));
        for item in iter {
            let (key, _) = item.map_err(|e| LectorError::Storage(e.to_string()))?;
            let key = String::from_utf8_lossy(&key);
            if !key.starts_with(&start) {
                break;
            }
            paths.push(key[OBJ_PREFIX.len()..].to_string());
        }
        Ok(paths)
    }

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>> {
        self.db
            .get(format!("{OBJ_PREFIX}{path}"))
            .map_err(|e| LectorError::Storage(e.to_string()))
    }

    async fn put(&self, path: &str, bytes: Vec<u8>, opts: PutOptions) -> Result<String> {
        if !opts.overwrite && self.head(path).await?.is_some() {
            return Ok(Self::url(path));
        }
        trace!(target: "store", path, size = bytes.len(), "put object");
        let meta = ObjectMeta {
            path: path.to_string(),
            size: bytes.len() as u64,
            content_type: opts.content_type,
            created_ms: chrono::Utc::now().timestamp_millis(),
        };
        let mut batch = rocksdb::WriteBatch::default();
        batch.put(format!("{OBJ_PREFIX}{path}"), &bytes);
        batch.put(format!("{META_PREFIX}{path}"), serde_json::to_vec(&meta)?);
        self.db
            .write(batch)
            .map_err(|e| LectorError::Storage(e.to_string()))?;
        Ok(Self::url(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_head_get_survive_in_same_db() {
        let dir = tempfile::tempdir().unwrap();
        let store = RocksStore::new(dir.path()).unwrap();

        let url = store
            .put("alignments/doc/h1.json", b"{}".to_vec(), PutOptions::json())
            .await
            .unwrap();
        assert_eq!(url, "rocks://alignments/doc/h1.json");

        let meta = store.head("alignments/doc/h1.json").await.unwrap().unwrap();
        assert_eq!(meta.size, 2);
        assert_eq!(
            store.get("alignments/doc/h1.json").await.unwrap().unwrap(),
            b"{}".to_vec()
        );
        assert!(store.head("alignments/doc/h2.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_bounded_by_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = RocksStore::new(dir.path()).unwrap();

        store
            .put("audio/doc/h1.mp3", vec![0], PutOptions::audio())
            .await
            .unwrap();
        store
            .put("audio/doc/h2.mp3", vec![0], PutOptions::audio())
            .await
            .unwrap();
        store
            .put("audio/other/h3.mp3", vec![0], PutOptions::audio())
            .await
            .unwrap();

        let listed = store.list("audio/doc/").await.unwrap();
        assert_eq!(
            listed,
            vec!["audio/doc/h1.mp3".to_string(), "audio/doc/h2.mp3".to_string()]
        );
    }
}
