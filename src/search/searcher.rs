use std::sync::Arc;
use tracing::info;

use super::embedder::Embedder;
use super::lexical::Bm25Params;
use super::retriever::{EnsembleRetriever, LexicalRetriever, Retriever, VectorRetriever};
use super::store::{SearchResult, VectorStore};
use crate::config::SearchOptionsConfig;
use crate::error::{RagError, Result};

/// Query-side entry point: semantic, lexical or fused retrieval over one store.
///
/// Every failure is reported as [`RagError::RetrievalFailure`] so callers can
/// tell "nothing matched" apart from "could not search".
pub struct Searcher {
    semantic: Arc<dyn Retriever>,
    lexical: Arc<dyn Retriever>,
    ensemble: EnsembleRetriever,
    hybrid_enabled: bool,
}

impl Searcher {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        options: &SearchOptionsConfig,
        bm25: Bm25Params,
    ) -> Result<Self> {
        let semantic: Arc<dyn Retriever> = Arc::new(VectorRetriever::new(
            Arc::clone(&store),
            embedder,
            options.similarity,
        ));
        let lexical: Arc<dyn Retriever> = Arc::new(LexicalRetriever::new(store, bm25));
        let ensemble = EnsembleRetriever::new(
            vec![
                (Arc::clone(&semantic), options.semantic_weight),
                (Arc::clone(&lexical), options.lexical_weight),
            ],
            options.hybrid_k,
            options.candidate_multiplier,
        )?;

        Ok(Self {
            semantic,
            lexical,
            ensemble,
            hybrid_enabled: options.hybrid_enabled,
        })
    }

    pub fn hybrid_enabled(&self) -> bool {
        self.hybrid_enabled
    }

    /// Search with vector similarity only
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        self.run(self.semantic.as_ref(), query, limit).await
    }

    /// BM25 only
    pub async fn search_lexical(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        self.run(self.lexical.as_ref(), query, limit).await
    }

    /// Hybrid search: combines vector search with BM25 using weighted RRF
    pub async fn search_hybrid(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        self.run(&self.ensemble, query, limit).await
    }

    /// Smart search: uses hybrid if enabled, otherwise vector-only
    pub async fn smart_search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        if self.hybrid_enabled {
            self.search_hybrid(query, limit).await
        } else {
            self.search(query, limit).await
        }
    }

    async fn run(
        &self,
        retriever: &dyn Retriever,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let results = retriever
            .retrieve(query, limit)
            .await
            .map_err(|e| RagError::retrieval(query, e))?;
        info!(
            retriever = retriever.name(),
            results = results.len(),
            "query completed"
        );
        Ok(results)
    }
}
