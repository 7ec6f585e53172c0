use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tracing::debug;

use super::embedder::Embedder;
use super::hybrid::{normalize_weights, weighted_rank_fusion};
use super::lexical::{Bm25Index, Bm25Params};
use super::store::{SearchResult, VectorStore};
use crate::config::Similarity;
use crate::error::{RagError, Result};

/// Anything that can rank index entries for a query.
#[async_trait]
pub trait Retriever: Send + Sync {
    fn name(&self) -> &str;
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchResult>>;
}

/// Semantic retrieval: embed the query and scan the vector store.
pub struct VectorRetriever {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    similarity: Similarity,
}

impl VectorRetriever {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        similarity: Similarity,
    ) -> Self {
        Self {
            store,
            embedder,
            similarity,
        }
    }
}

#[async_trait]
impl Retriever for VectorRetriever {
    fn name(&self) -> &str {
        "semantic"
    }

    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 || self.store.len().await? == 0 {
            return Ok(Vec::new());
        }
        let query_vector = self.embedder.embed(query).await?;
        self.store.search(&query_vector, k, self.similarity).await
    }
}

/// BM25 retrieval over the store's entries.
///
/// The index is rebuilt wholesale whenever the store's revision moves.
pub struct LexicalRetriever {
    store: Arc<dyn VectorStore>,
    params: Bm25Params,
    cache: RwLock<Option<(u64, Arc<Bm25Index>)>>,
}

impl LexicalRetriever {
    pub fn new(store: Arc<dyn VectorStore>, params: Bm25Params) -> Self {
        Self {
            store,
            params,
            cache: RwLock::new(None),
        }
    }

    async fn index(&self) -> Result<Arc<Bm25Index>> {
        let revision = self.store.revision().await?;
        {
            let cache = self.cache.read().map_err(|e| RagError::Store(e.to_string()))?;
            if let Some((cached_revision, index)) = cache.as_ref() {
                if *cached_revision == revision {
                    return Ok(Arc::clone(index));
                }
            }
        }

        let entries = self.store.entries().await?;
        let index = Arc::new(Bm25Index::build(&entries, self.params));
        debug!(entries = index.len(), revision, "rebuilt BM25 index");

        let mut cache = self.cache.write().map_err(|e| RagError::Store(e.to_string()))?;
        *cache = Some((revision, Arc::clone(&index)));
        Ok(index)
    }
}

#[async_trait]
impl Retriever for LexicalRetriever {
    fn name(&self) -> &str {
        "lexical"
    }

    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        let index = self.index().await?;
        Ok(index.search(query, k))
    }
}

/// Fuses several retrievers with weighted reciprocal rank fusion.
pub struct EnsembleRetriever {
    retrievers: Vec<(Arc<dyn Retriever>, f32)>,
    rrf_k: f32,
    candidate_multiplier: usize,
}

impl EnsembleRetriever {
    /// Weights are normalised to sum to 1 and must all be positive.
    pub fn new(
        retrievers: Vec<(Arc<dyn Retriever>, f32)>,
        rrf_k: f32,
        candidate_multiplier: usize,
    ) -> Result<Self> {
        let weights: Vec<f32> = retrievers.iter().map(|(_, w)| *w).collect();
        let normalized = normalize_weights(&weights)?;
        let retrievers = retrievers
            .into_iter()
            .zip(normalized)
            .map(|((retriever, _), weight)| (retriever, weight))
            .collect();

        Ok(Self {
            retrievers,
            rrf_k,
            candidate_multiplier: candidate_multiplier.max(1),
        })
    }

    /// Equal weights for every retriever.
    pub fn equal(retrievers: Vec<Arc<dyn Retriever>>, rrf_k: f32) -> Result<Self> {
        let weighted = retrievers.into_iter().map(|r| (r, 1.0)).collect();
        Self::new(weighted, rrf_k, 1)
    }

    pub fn weights(&self) -> Vec<f32> {
        self.retrievers.iter().map(|(_, w)| *w).collect()
    }
}

#[async_trait]
impl Retriever for EnsembleRetriever {
    fn name(&self) -> &str {
        "ensemble"
    }

    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let candidates = k.saturating_mul(self.candidate_multiplier);
        let mut lists = Vec::with_capacity(self.retrievers.len());
        for (retriever, weight) in &self.retrievers {
            let results = retriever.retrieve(query, candidates).await?;
            debug!(
                retriever = retriever.name(),
                candidates = results.len(),
                "collected candidates"
            );
            lists.push((*weight, results));
        }

        Ok(weighted_rank_fusion(self.rrf_k, k, lists))
    }
}
