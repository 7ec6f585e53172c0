use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::chunker::{hash_content, Chunk, Chunker};
use super::embedder::Embedder;
use super::store::{Document, DocumentRecord, IndexEntry, VectorStore};
use crate::error::{RagError, Result};

pub const DEFAULT_BATCH_SIZE: usize = 32;

/// What happened to a document handed to [`Indexer::ingest`].
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// New entries were committed, in chunk order.
    Indexed { ids: Vec<String> },
    /// The source was already ingested with identical content.
    Unchanged,
}

impl IngestOutcome {
    pub fn ids(&self) -> &[String] {
        match self {
            Self::Indexed { ids } => ids,
            Self::Unchanged => &[],
        }
    }
}

pub struct Indexer {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    chunker: Chunker,
    batch_size: usize,
}

impl Indexer {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>, chunker: Chunker) -> Self {
        Self {
            store,
            embedder,
            chunker,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    /// Chunk, embed and commit one document.
    ///
    /// Entries are staged and committed in a single `insert`, so a failure
    /// anywhere leaves the index exactly as it was.
    pub async fn ingest(&self, document: &Document) -> Result<IngestOutcome> {
        self.ingest_inner(document).await.map_err(|e| {
            warn!(document = %document.source, error = %e, "ingestion failed");
            RagError::ingestion(&document.source, e)
        })
    }

    async fn ingest_inner(&self, document: &Document) -> Result<IngestOutcome> {
        let content_hash = hash_content(&document.text);

        if let Some(record) = self.store.get_document(&document.source).await? {
            if record.hash == content_hash {
                debug!(document = %document.source, "content unchanged, skipping");
                return Ok(IngestOutcome::Unchanged);
            }
        }

        let chunks = self.chunker.chunk_document(document);
        let entries = self.embed_chunks(chunks).await?;
        let ids: Vec<String> = entries.iter().map(|e| e.id.clone()).collect();

        self.store.insert(entries).await?;

        let mut entry_ids = self
            .store
            .get_document(&document.source)
            .await?
            .map(|r| r.entry_ids)
            .unwrap_or_default();
        entry_ids.extend(ids.iter().cloned());

        self.store
            .save_document(DocumentRecord {
                source: document.source.clone(),
                hash: content_hash,
                ingested_at: Utc::now(),
                entry_ids,
            })
            .await?;

        info!(document = %document.source, chunks = ids.len(), "ingested document");
        Ok(IngestOutcome::Indexed { ids })
    }

    /// Embed pre-split chunks and commit them in one `insert`, returning the
    /// assigned ids in chunk order. No document record is written, so these
    /// entries never take part in the unchanged-content check.
    pub async fn add(&self, chunks: Vec<Chunk>) -> Result<Vec<String>> {
        let label = chunks
            .first()
            .map(|c| c.document_id.clone())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| "<chunks>".to_string());

        let result = async {
            let entries = self.embed_chunks(chunks).await?;
            let ids: Vec<String> = entries.iter().map(|e| e.id.clone()).collect();
            self.store.insert(entries).await?;
            Ok::<_, RagError>(ids)
        }
        .await;

        match result {
            Ok(ids) => {
                debug!(document = %label, chunks = ids.len(), "added chunks");
                Ok(ids)
            }
            Err(e) => {
                warn!(document = %label, error = %e, "adding chunks failed");
                Err(RagError::ingestion(label, e))
            }
        }
    }

    /// Embed chunks in batches and assign fresh ids.
    async fn embed_chunks(&self, chunks: Vec<Chunk>) -> Result<Vec<IndexEntry>> {
        let mut entries = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;
            if embeddings.len() != batch.len() {
                return Err(RagError::Provider {
                    provider: "embedder".to_string(),
                    message: format!(
                        "expected {} embeddings, received {}",
                        batch.len(),
                        embeddings.len()
                    ),
                });
            }
            debug!(batch = batch.len(), "embedded chunk batch");

            for (chunk, vector) in batch.iter().zip(embeddings.into_iter()) {
                entries.push(IndexEntry {
                    id: Uuid::new_v4().to_string(),
                    document_id: chunk.document_id.clone(),
                    chunk_index: chunk.chunk_index,
                    start_index: chunk.start_index,
                    content: chunk.content.clone(),
                    vector,
                    metadata: chunk.metadata.clone(),
                    hash: chunk.hash.clone(),
                    added_at: Utc::now(),
                });
            }
        }

        Ok(entries)
    }
}
