pub mod chunker;
pub mod embedder;
pub mod hybrid;
pub mod indexer;
pub mod lexical;
pub mod retriever;
pub mod searcher;
pub mod store;

pub use chunker::{Chunk, Chunker};
pub use embedder::{create_embedder, Embedder, OllamaEmbedder};
pub use hybrid::{reciprocal_rank_fusion, weighted_rank_fusion, RRF_K};
pub use indexer::{IngestOutcome, Indexer};
pub use lexical::{tokenize, Bm25Index, Bm25Params};
pub use retriever::{EnsembleRetriever, LexicalRetriever, Retriever, VectorRetriever};
pub use searcher::Searcher;
pub use store::{
    Document, DocumentRecord, IndexEntry, IndexStats, JsonStore, MemoryStore, Metadata,
    SearchResult, VectorStore,
};
