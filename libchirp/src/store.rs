//! Durable storage for the scheduled-post queue
//!
//! The queue is one JSON array document, exclusively owned by whichever
//! process is running. There is deliberately no cross-process locking or
//! versioning; concurrent writers racing on the same document is undefined
//! behavior and out of scope (run a single daemon instance). The trait seam
//! exists so a backend with real locking or a transactional file could be
//! substituted without touching delivery logic.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::types::ScheduledPost;

/// Storage interface for pending posts.
///
/// `load` immediately followed by `save` of the unmodified sequence must be
/// a no-op: the persisted form is lossless in field order and types.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Loads all pending posts, in document order. An absent document is an
    /// empty queue, not an error. A corrupt document is an error.
    async fn load(&self) -> Result<Vec<ScheduledPost>>;

    /// Overwrites the document with the given sequence. Last writer wins.
    async fn save(&self, posts: &[ScheduledPost]) -> Result<()>;

    /// Appends one post and persists.
    async fn append(&self, post: ScheduledPost) -> Result<()>;

    /// Removes the post with the given id and persists. Returns whether the
    /// id was present; all other entries keep their original order.
    async fn remove(&self, id: &str) -> Result<bool>;
}

/// The shipped backend: a single JSON document on the local filesystem.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn path_str(&self) -> String {
        self.path.display().to_string()
    }

    fn read_document(&self) -> Result<Vec<ScheduledPost>> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Read {
                    path: self.path_str(),
                    source: e,
                }
                .into())
            }
        };

        let posts = serde_json::from_slice(&data).map_err(|e| StoreError::Parse {
            path: self.path_str(),
            source: e,
        })?;

        Ok(posts)
    }

    /// Writes the document to a sibling temp file and renames it into place,
    /// so readers never observe a partially written document.
    fn write_document(&self, posts: &[ScheduledPost]) -> Result<()> {
        let io_err = |e: std::io::Error| StoreError::Write {
            path: self.path_str(),
            source: e,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let json = serde_json::to_vec_pretty(posts).map_err(|e| StoreError::Parse {
            path: self.path_str(),
            source: e,
        })?;

        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = std::fs::File::create(&tmp_path).map_err(io_err)?;
        file.write_all(&json).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);

        std::fs::rename(&tmp_path, &self.path).map_err(io_err)?;
        Ok(())
    }
}

#[async_trait]
impl QueueStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<ScheduledPost>> {
        self.read_document()
    }

    async fn save(&self, posts: &[ScheduledPost]) -> Result<()> {
        self.write_document(posts)
    }

    async fn append(&self, post: ScheduledPost) -> Result<()> {
        let mut posts = self.read_document()?;
        posts.push(post);
        self.write_document(&posts)
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        let mut posts = self.read_document()?;
        let before = posts.len();
        posts.retain(|p| p.id != id);

        if posts.len() == before {
            return Ok(false);
        }

        self.write_document(&posts)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use tempfile::TempDir;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn test_store() -> (TempDir, JsonFileStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("queue.json"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_load_missing_document_is_empty_queue() {
        let (_dir, store) = test_store();
        let posts = store.load().await.unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_append_then_load_round_trips() {
        let (_dir, store) = test_store();
        let post = ScheduledPost::new(
            "hello".to_string(),
            Some("/tmp/pic.png".to_string()),
            at(18, 0),
        );
        store.append(post.clone()).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, vec![post]);
    }

    #[tokio::test]
    async fn test_load_then_save_is_a_noop() {
        let (_dir, store) = test_store();
        for i in 0..3 {
            store
                .append(ScheduledPost::new(format!("post {}", i), None, at(18, i)))
                .await
                .unwrap();
        }

        let first = store.load().await.unwrap();
        store.save(&first).await.unwrap();
        let second = store.load().await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_remove_unknown_id_leaves_document_untouched() {
        let (_dir, store) = test_store();
        let post = ScheduledPost::new("keep me".to_string(), None, at(18, 0));
        store.append(post.clone()).await.unwrap();

        let found = store.remove("no-such-id").await.unwrap();
        assert!(!found);
        assert_eq!(store.load().await.unwrap(), vec![post]);
    }

    #[tokio::test]
    async fn test_remove_keeps_remaining_entries_in_order() {
        let (_dir, store) = test_store();
        let a = ScheduledPost::new("a".to_string(), None, at(18, 0));
        let b = ScheduledPost::new("b".to_string(), None, at(19, 0));
        let c = ScheduledPost::new("c".to_string(), None, at(20, 0));
        for post in [a.clone(), b.clone(), c.clone()] {
            store.append(post).await.unwrap();
        }

        let found = store.remove(&b.id).await.unwrap();
        assert!(found);
        assert_eq!(store.load().await.unwrap(), vec![a, c]);
    }

    #[tokio::test]
    async fn test_corrupt_document_is_an_error() {
        let (_dir, store) = test_store();
        std::fs::write(store.path(), b"{ not json").unwrap();

        let err = store.load().await.unwrap_err();
        let message = format!("{}", err);
        assert!(message.contains("Corrupt queue document"));
        assert!(message.contains("queue.json"));
    }

    #[tokio::test]
    async fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/dir/queue.json"));
        store
            .append(ScheduledPost::new("x".to_string(), None, at(18, 0)))
            .await
            .unwrap();
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind_after_save() {
        let (_dir, store) = test_store();
        store
            .append(ScheduledPost::new("x".to_string(), None, at(18, 0)))
            .await
            .unwrap();
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_document_is_a_json_array_with_contract_fields() {
        let (_dir, store) = test_store();
        store
            .append(ScheduledPost::new("hello".to_string(), None, at(18, 0)))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 1);
        assert_eq!(array[0]["text"], "hello");
        assert_eq!(array[0]["schedule_time"], "2024-06-01T18:00:00");
        assert!(array[0]["id"].is_string());
    }
}
