use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::memory::{IndexData, MemoryStore};
use super::{DocumentRecord, IndexEntry, IndexStats, SearchResult, VectorStore};
use crate::config::Similarity;
use crate::error::Result;

/// A [`MemoryStore`] that can be written to and restored from a JSON file.
///
/// Queries are served from memory; the file is only touched by `persist`,
/// `load`, `stats` and `clear`.
pub struct JsonStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            inner: MemoryStore::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn atomic_write(&self, data: &IndexData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("tmp");
        let json = serde_json::to_vec(data)?;
        fs::write(&temp_path, json)?;
        fs::rename(temp_path, &self.path)?;

        Ok(())
    }
}

#[async_trait]
impl VectorStore for JsonStore {
    async fn insert(&self, entries: Vec<IndexEntry>) -> Result<()> {
        self.inner.insert(entries).await
    }

    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        similarity: Similarity,
    ) -> Result<Vec<SearchResult>> {
        self.inner.search(query_vector, limit, similarity).await
    }

    async fn get(&self, id: &str) -> Result<Option<IndexEntry>> {
        self.inner.get(id).await
    }

    async fn entries(&self) -> Result<Vec<IndexEntry>> {
        self.inner.entries().await
    }

    async fn get_document(&self, source: &str) -> Result<Option<DocumentRecord>> {
        self.inner.get_document(source).await
    }

    async fn save_document(&self, record: DocumentRecord) -> Result<()> {
        self.inner.save_document(record).await
    }

    async fn list_documents(&self) -> Result<Vec<String>> {
        self.inner.list_documents().await
    }

    async fn len(&self) -> Result<usize> {
        self.inner.len().await
    }

    async fn revision(&self) -> Result<u64> {
        self.inner.revision().await
    }

    async fn persist(&self) -> Result<()> {
        let data = self.inner.read()?;
        self.atomic_write(&data)?;
        debug!(path = %self.path.display(), "index persisted");
        Ok(())
    }

    async fn load(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let content = fs::read(&self.path)?;
        let loaded: IndexData = serde_json::from_slice(&content)?;

        let mut data = self.inner.write()?;
        data.replace_with(loaded);
        info!(path = %self.path.display(), "index loaded");

        Ok(())
    }

    async fn stats(&self) -> Result<IndexStats> {
        let index_size = if self.path.exists() {
            fs::metadata(&self.path)?.len()
        } else {
            0
        };
        self.inner.stats_with_size(index_size)
    }

    async fn clear(&self) -> Result<()> {
        self.inner.clear().await?;

        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::store::Metadata;
    use chrono::Utc;

    fn entry(id: &str, vector: Vec<f32>) -> IndexEntry {
        IndexEntry {
            id: id.to_string(),
            document_id: "notes.md".to_string(),
            chunk_index: 0,
            start_index: 0,
            content: format!("text of {}", id),
            vector,
            metadata: Metadata::new(),
            hash: "0011223344556677".to_string(),
            added_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("index.json");

        let store = JsonStore::new(path.clone());
        store
            .insert(vec![entry("a", vec![1.0, 0.0]), entry("b", vec![0.0, 1.0])])
            .await
            .unwrap();
        store
            .save_document(DocumentRecord {
                source: "notes.md".to_string(),
                hash: "0011223344556677".to_string(),
                ingested_at: Utc::now(),
                entry_ids: vec!["a".to_string(), "b".to_string()],
            })
            .await
            .unwrap();
        store.persist().await.unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());

        let reopened = JsonStore::new(path);
        reopened.load().await.unwrap();
        assert_eq!(reopened.len().await.unwrap(), 2);
        assert_eq!(reopened.get("b").await.unwrap().unwrap().content, "text of b");
        assert_eq!(reopened.list_documents().await.unwrap(), vec!["notes.md"]);

        let results = reopened
            .search(&[0.0, 1.0], 1, Similarity::Cosine)
            .await
            .unwrap();
        assert_eq!(results[0].entry.id, "b");

        let stats = reopened.stats().await.unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.total_documents, 1);
        assert_eq!(stats.dimensions, Some(2));
        assert!(stats.index_size_bytes > 0);
    }

    #[tokio::test]
    async fn test_load_missing_file_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("index.json"));
        store.load().await.unwrap();
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        let store = JsonStore::new(path.clone());
        store.insert(vec![entry("a", vec![1.0])]).await.unwrap();
        store.persist().await.unwrap();

        store.clear().await.unwrap();
        assert!(!path.exists());
        assert_eq!(store.len().await.unwrap(), 0);
    }
}
