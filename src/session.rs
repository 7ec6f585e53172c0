//! One retrieval-augmented Q&A session: an explicit owner for the index,
//! the embedder, the retrievers and the completion provider.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{RagError, Result};
use crate::llm::{create_completion_provider, CompletionProvider};
use crate::prompt::{source_labels, PromptAssembler};
use crate::search::{
    create_embedder, Bm25Params, Chunk, Chunker, Document, Embedder, IndexEntry, IndexStats,
    IngestOutcome, Indexer, JsonStore, SearchResult, Searcher, VectorStore,
};

/// The result of [`RagSession::ask`].
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub answer: String,
    pub reasoning: Option<String>,
    /// Passages that made it into the prompt, in rank order.
    pub sources: Vec<SearchResult>,
    /// How many retrieved passages fit the context budget.
    pub context_used: usize,
}

impl Answer {
    pub fn source_labels(&self) -> Vec<String> {
        source_labels(&self.sources)
    }
}

pub struct RagSession {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    indexer: Indexer,
    searcher: Searcher,
    assembler: PromptAssembler,
    completion: Option<Arc<dyn CompletionProvider>>,
    top_k: usize,
}

impl RagSession {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        completion: Option<Arc<dyn CompletionProvider>>,
        config: &Config,
    ) -> Result<Self> {
        config.validate()?;

        let chunker = Chunker::new(config.chunking.chunk_size, config.chunking.overlap)?;
        let indexer = Indexer::new(Arc::clone(&store), Arc::clone(&embedder), chunker)
            .with_batch_size(config.embedder.batch_size);
        let searcher = Searcher::new(
            Arc::clone(&store),
            Arc::clone(&embedder),
            &config.search,
            Bm25Params::from(&config.bm25),
        )?;
        let assembler = PromptAssembler::from_config(&config.prompt)?;

        Ok(Self {
            store,
            embedder,
            indexer,
            searcher,
            assembler,
            completion,
            top_k: config.search.top_k,
        })
    }

    /// Build a session over the persistent index described by `config`,
    /// restoring whatever was saved there.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store: Arc<dyn VectorStore> =
            Arc::new(JsonStore::new(config.storage.index_path.clone()));
        store.load().await?;

        let embedder: Arc<dyn Embedder> = Arc::from(create_embedder(&config.embedder)?);
        let completion: Arc<dyn CompletionProvider> =
            Arc::from(create_completion_provider(&config.llm)?);

        Self::new(store, embedder, Some(completion), config)
    }

    pub fn hybrid_enabled(&self) -> bool {
        self.searcher.hybrid_enabled()
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Fails fast when the embedding service is unreachable or the model
    /// is missing.
    pub async fn health_check(&self) -> Result<()> {
        self.embedder.health_check().await
    }

    pub async fn ingest(&self, document: Document) -> Result<IngestOutcome> {
        self.indexer.ingest(&document).await
    }

    pub async fn ingest_text(
        &self,
        source: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<IngestOutcome> {
        self.ingest(Document::new(source, text)).await
    }

    /// Index chunks produced outside the session, e.g. by [`Chunker::split`].
    pub async fn add(&self, chunks: Vec<Chunk>) -> Result<Vec<String>> {
        self.indexer.add(chunks).await
    }

    pub fn chunker(&self) -> &Chunker {
        self.indexer.chunker()
    }

    /// Semantic or hybrid search, following the session configuration.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        self.searcher.smart_search(query, k).await
    }

    pub async fn search_hybrid(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        self.searcher.search_hybrid(query, k).await
    }

    /// Retrieve context for `question` and have the completion provider
    /// answer from it.
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let retrieved = self.search(question, self.top_k).await?;
        self.answer_from(question, retrieved).await
    }

    /// Like [`ask`](Self::ask), but always fusing semantic and lexical results.
    pub async fn ask_hybrid(&self, question: &str) -> Result<Answer> {
        let retrieved = self.search_hybrid(question, self.top_k).await?;
        self.answer_from(question, retrieved).await
    }

    async fn answer_from(&self, question: &str, mut retrieved: Vec<SearchResult>) -> Result<Answer> {
        let completion = self.completion.as_ref().ok_or_else(|| {
            RagError::InvalidConfig("no completion provider configured".to_string())
        })?;

        let prompt = self.assembler.assemble(question, &retrieved);
        retrieved.truncate(prompt.passages_used);
        debug!(
            passages = prompt.passages_used,
            dropped = prompt.passages_dropped,
            "prompt assembled"
        );

        let completion = completion.complete(&prompt.text).await?;
        info!(
            passages = prompt.passages_used,
            reasoning = completion.reasoning.is_some(),
            "answered question"
        );

        Ok(Answer {
            answer: completion.answer,
            reasoning: completion.reasoning,
            sources: retrieved,
            context_used: prompt.passages_used,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Option<IndexEntry>> {
        self.store.get(id).await
    }

    pub async fn stats(&self) -> Result<IndexStats> {
        self.store.stats().await
    }

    pub async fn documents(&self) -> Result<Vec<String>> {
        self.store.list_documents().await
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await?;
        info!("session index cleared");
        Ok(())
    }

    pub async fn persist(&self) -> Result<()> {
        self.store.persist().await
    }
}
