// Document assembly against real in-memory storage, plus failure-path
// behavior against a mocked store.

use async_trait::async_trait;
use lector_core::{
    content_hash, Alignment, CacheKey, LectorError, MemoryStore, ObjectMeta, ObjectStore,
    ParagraphCache, ParagraphInfo, PutOptions, Result,
};
use mockall::mock;
use std::sync::Arc;

fn paragraph(index: usize, text: &str) -> ParagraphInfo {
    ParagraphInfo {
        index,
        text: text.to_string(),
        hash: content_hash(text),
        character_count: text.chars().count(),
    }
}

/// Synthetic alignment with a uniform 0.1s per character.
fn spoken(text: &str) -> Alignment {
    let chars: Vec<char> = text.chars().collect();
    let starts: Vec<f64> = (0..chars.len()).map(|i| i as f64 * 0.1).collect();
    let ends: Vec<f64> = (1..=chars.len()).map(|i| i as f64 * 0.1).collect();
    Alignment::new(chars, starts, ends).unwrap()
}

fn memory_cache() -> (ParagraphCache, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (ParagraphCache::new(store.clone()), store)
}

#[tokio::test]
async fn test_fully_cached_document_is_stitched_in_order() {
    let (cache, _store) = memory_cache();
    let first = paragraph(0, "Hello there. ");
    let second = paragraph(1, "Goodbye now.");

    cache
        .write(
            &CacheKey::new("article", &first.hash),
            b"AUDIO-ONE".to_vec(),
            &spoken(&first.text),
        )
        .await
        .unwrap();
    cache
        .write(
            &CacheKey::new("article", &second.hash),
            b"AUDIO-TWO".to_vec(),
            &spoken(&second.text),
        )
        .await
        .unwrap();

    let doc = cache
        .read_document("article", &[first.clone(), second.clone()])
        .await
        .unwrap()
        .expect("fully cached document should assemble");

    assert_eq!(doc.audio, b"AUDIO-ONEAUDIO-TWO".to_vec());
    assert_eq!(doc.alignment.text(), "Hello there. Goodbye now.");
    assert!(doc.audio_url.starts_with("memory://"));

    // The second paragraph's times are shifted by the first's duration.
    let boundary = first.character_count;
    let first_duration = first.character_count as f64 * 0.1;
    assert!((doc.alignment.start_times[boundary] - first_duration).abs() < 1e-9);
    assert!(doc.alignment.validate().is_ok());
}

#[tokio::test]
async fn test_assembly_follows_slice_order_not_index_field() {
    // The index field is caller-supplied metadata; assembly must key off
    // the paragraph's position in the slice even when indices are
    // duplicated or out of range.
    let (cache, _store) = memory_cache();
    let first = paragraph(7, "Comes first. ");
    let second = paragraph(7, "Comes second.");

    for p in [&first, &second] {
        cache
            .write(
                &CacheKey::new("article", &p.hash),
                p.text.as_bytes().to_vec(),
                &spoken(&p.text),
            )
            .await
            .unwrap();
    }

    let doc = cache
        .read_document("article", &[first, second])
        .await
        .unwrap()
        .expect("duplicate index fields must not break assembly");
    assert_eq!(doc.alignment.text(), "Comes first. Comes second.");
    assert_eq!(doc.audio, b"Comes first. Comes second.".to_vec());
}

#[tokio::test]
async fn test_single_missing_paragraph_is_a_full_miss() {
    let (cache, _store) = memory_cache();
    let first = paragraph(0, "Cached text.");
    let second = paragraph(1, "Never synthesized.");

    cache
        .write(
            &CacheKey::new("article", &first.hash),
            b"AUDIO".to_vec(),
            &spoken(&first.text),
        )
        .await
        .unwrap();

    let doc = cache
        .read_document("article", &[first, second])
        .await
        .unwrap();
    assert!(doc.is_none());
}

#[tokio::test]
async fn test_empty_document_is_a_miss() {
    let (cache, _store) = memory_cache();
    assert!(cache.read_document("article", &[]).await.unwrap().is_none());
}

#[tokio::test]
async fn test_editing_one_paragraph_misses_only_that_paragraph() {
    let (cache, _store) = memory_cache();
    let original = paragraph(0, "First draft sentence.");
    let unchanged = paragraph(1, "Stable paragraph.");

    for p in [&original, &unchanged] {
        cache
            .write(
                &CacheKey::new("article", &p.hash),
                p.text.as_bytes().to_vec(),
                &spoken(&p.text),
            )
            .await
            .unwrap();
    }

    let edited = paragraph(0, "Second draft sentence.");
    assert!(!cache
        .is_cached(&CacheKey::new("article", &edited.hash))
        .await
        .unwrap());
    assert!(cache
        .is_cached(&CacheKey::new("article", &unchanged.hash))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_legacy_suffixed_paths_still_resolve() {
    let (cache, store) = memory_cache();
    let p = paragraph(0, "Old content.");
    let alignment_bytes = serde_json::to_vec(&spoken(&p.text)).unwrap();

    // Artifacts written by an earlier scheme carry a random suffix before
    // the extension; only the prefix and extension are predictable.
    store
        .put(
            &format!("audio/article/{}_a8f3.mp3", p.hash),
            b"LEGACY".to_vec(),
            PutOptions::audio(),
        )
        .await
        .unwrap();
    store
        .put(
            &format!("alignments/article/{}_a8f3.json", p.hash),
            alignment_bytes,
            PutOptions::json(),
        )
        .await
        .unwrap();

    let key = CacheKey::new("article", &p.hash);
    assert!(cache.is_cached(&key).await.unwrap());

    let doc = cache
        .read_document("article", &[p])
        .await
        .unwrap()
        .expect("legacy artifacts should assemble");
    assert_eq!(doc.audio, b"LEGACY".to_vec());
}

#[tokio::test]
async fn test_repeat_read_serves_memoized_manifest() {
    let (cache, store) = memory_cache();
    let p = paragraph(0, "Memoized paragraph.");
    let key = CacheKey::new("article", &p.hash);
    cache
        .write(&key, b"ORIGINAL".to_vec(), &spoken(&p.text))
        .await
        .unwrap();

    let first = cache
        .read_document("article", std::slice::from_ref(&p))
        .await
        .unwrap()
        .unwrap();

    // Corrupt the per-paragraph blob. The stitched result was memoized, so
    // a repeat read never touches the paragraph again.
    store
        .put(&key.audio_path, b"CORRUPTED".to_vec(), PutOptions::audio())
        .await
        .unwrap();

    let second = cache
        .read_document("article", &[p])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.audio, first.audio);
    assert_eq!(second.audio_url, first.audio_url);
}

mock! {
    Store {}

    #[async_trait]
    impl ObjectStore for Store {
        async fn head(&self, path: &str) -> Result<Option<ObjectMeta>>;
        async fn list(&self, prefix: &str) -> Result<Vec<String>>;
        async fn get(&self, path: &str) -> Result<Option<Vec<u8>>>;
        async fn put(&self, path: &str, bytes: Vec<u8>, opts: PutOptions) -> Result<String>;
    }
}

#[tokio::test]
async fn test_fetch_failure_degrades_to_miss() {
    // Every object reports present, but every read fails. The document
    // read must degrade to a miss, never surface partial audio or error.
    let mut store = MockStore::new();
    store.expect_head().returning(|path| {
        Ok(Some(ObjectMeta {
            path: path.to_string(),
            size: 1,
            content_type: None,
            created_ms: 0,
        }))
    });
    store
        .expect_get()
        .returning(|_| Err(LectorError::Storage("backend unavailable".to_string())));

    let cache = ParagraphCache::new(Arc::new(store));
    let doc = cache
        .read_document("article", &[paragraph(0, "Present but unreadable.")])
        .await
        .unwrap();
    assert!(doc.is_none());
}
