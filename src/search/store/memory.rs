use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{
    score_order, similarity_score, DocumentRecord, IndexEntry, IndexStats, SearchResult,
    VectorStore,
};
use crate::config::Similarity;
use crate::error::{RagError, Result};

#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct IndexData {
    entries: Vec<IndexEntry>,
    documents: BTreeMap<String, DocumentRecord>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
    #[serde(skip)]
    revision: u64,
}

impl IndexData {
    pub(super) fn dimensions(&self) -> Option<usize> {
        self.entries.first().map(|e| e.vector.len())
    }

    fn insert(&mut self, entries: Vec<IndexEntry>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        // Validate the whole batch before anything becomes visible
        let expected = self
            .dimensions()
            .unwrap_or_else(|| entries[0].vector.len());
        let mut batch_ids = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if entry.vector.len() != expected {
                return Err(RagError::DimensionMismatch {
                    expected,
                    actual: entry.vector.len(),
                });
            }
            if entry.vector.iter().any(|x| !x.is_finite()) {
                return Err(RagError::Store(format!(
                    "entry '{}' has a non-finite vector component",
                    entry.id
                )));
            }
            if self.positions.contains_key(&entry.id) || !batch_ids.insert(entry.id.as_str()) {
                return Err(RagError::Store(format!("duplicate entry id '{}'", entry.id)));
            }
        }

        for entry in entries {
            self.positions.insert(entry.id.clone(), self.entries.len());
            self.entries.push(entry);
        }
        self.revision += 1;
        Ok(())
    }

    fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        similarity: Similarity,
    ) -> Result<Vec<SearchResult>> {
        if limit == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }
        if query_vector.iter().any(|x| !x.is_finite()) {
            return Err(RagError::Store(
                "query vector has a non-finite component".to_string(),
            ));
        }
        if let Some(expected) = self.dimensions() {
            if query_vector.len() != expected {
                return Err(RagError::DimensionMismatch {
                    expected,
                    actual: query_vector.len(),
                });
            }
        }

        let mut results: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|entry| {
                let score = similarity_score(similarity, query_vector, &entry.vector);
                SearchResult::new(entry.clone(), score)
            })
            .collect();

        // sort_by is stable, so equal scores keep insertion order
        results.sort_by(|a, b| score_order(a.score, b.score));
        results.truncate(limit);
        Ok(results)
    }

    fn get(&self, id: &str) -> Option<&IndexEntry> {
        self.positions.get(id).and_then(|&pos| self.entries.get(pos))
    }

    fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.entries.iter().map(|e| e.added_at).max()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.documents.clear();
        self.positions.clear();
        self.revision += 1;
    }

    /// Swap in freshly deserialized data, keeping the revision moving forward.
    pub(super) fn replace_with(&mut self, mut loaded: IndexData) {
        loaded.positions = loaded
            .entries
            .iter()
            .enumerate()
            .map(|(pos, e)| (e.id.clone(), pos))
            .collect();
        loaded.revision = self.revision + 1;
        *self = loaded;
    }
}

/// In-process store with no durable backing. Dropped with its session.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<IndexData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn read(&self) -> Result<RwLockReadGuard<'_, IndexData>> {
        self.data.read().map_err(|e| RagError::Store(e.to_string()))
    }

    pub(super) fn write(&self) -> Result<RwLockWriteGuard<'_, IndexData>> {
        self.data.write().map_err(|e| RagError::Store(e.to_string()))
    }

    pub(super) fn stats_with_size(&self, index_size_bytes: u64) -> Result<IndexStats> {
        let data = self.read()?;
        Ok(IndexStats {
            total_documents: data.documents.len(),
            total_entries: data.entries.len(),
            dimensions: data.dimensions(),
            index_size_bytes,
            last_updated: data.last_updated(),
        })
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn insert(&self, entries: Vec<IndexEntry>) -> Result<()> {
        self.write()?.insert(entries)
    }

    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        similarity: Similarity,
    ) -> Result<Vec<SearchResult>> {
        self.read()?.search(query_vector, limit, similarity)
    }

    async fn get(&self, id: &str) -> Result<Option<IndexEntry>> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn entries(&self) -> Result<Vec<IndexEntry>> {
        Ok(self.read()?.entries.clone())
    }

    async fn get_document(&self, source: &str) -> Result<Option<DocumentRecord>> {
        Ok(self.read()?.documents.get(source).cloned())
    }

    async fn save_document(&self, record: DocumentRecord) -> Result<()> {
        self.write()?
            .documents
            .insert(record.source.clone(), record);
        Ok(())
    }

    async fn list_documents(&self) -> Result<Vec<String>> {
        Ok(self.read()?.documents.keys().cloned().collect())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.read()?.entries.len())
    }

    async fn revision(&self) -> Result<u64> {
        Ok(self.read()?.revision)
    }

    async fn persist(&self) -> Result<()> {
        Ok(())
    }

    async fn load(&self) -> Result<()> {
        Ok(())
    }

    async fn stats(&self) -> Result<IndexStats> {
        self.stats_with_size(0)
    }

    async fn clear(&self) -> Result<()> {
        self.write()?.clear();
        Ok(())
    }
}
