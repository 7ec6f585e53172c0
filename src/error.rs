//! Error types shared by every stage of the retrieval pipeline.

use thiserror::Error;

/// Errors produced while ingesting, retrieving or answering.
#[derive(Debug, Error)]
pub enum RagError {
    /// Chunking, embedding or indexing a document failed. Nothing from the
    /// document was committed to the index.
    #[error("ingestion failed for document '{document}': {source}")]
    IngestionFailure {
        document: String,
        #[source]
        source: Box<RagError>,
    },

    /// Query-time embedding or index search failed.
    #[error("retrieval failed for query '{query}': {source}")]
    RetrievalFailure {
        query: String,
        #[source]
        source: Box<RagError>,
    },

    /// The embedding or completion service could not be reached.
    #[error("{service} is unavailable at {endpoint}: {message}")]
    ServiceUnavailable {
        service: String,
        endpoint: String,
        message: String,
    },

    /// The provider answered, but with an error or a malformed payload.
    #[error("{provider} error: {message}")]
    Provider { provider: String, message: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("vector dimension mismatch: index holds {expected}-d vectors, got {actual}-d")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("store error: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl RagError {
    pub fn ingestion(document: impl Into<String>, source: RagError) -> Self {
        Self::IngestionFailure {
            document: document.into(),
            source: Box::new(source),
        }
    }

    pub fn retrieval(query: impl Into<String>, source: RagError) -> Self {
        Self::RetrievalFailure {
            query: query.into(),
            source: Box::new(source),
        }
    }

    /// True when the root cause is an unreachable provider.
    pub fn is_service_unavailable(&self) -> bool {
        match self {
            Self::ServiceUnavailable { .. } => true,
            Self::IngestionFailure { source, .. } | Self::RetrievalFailure { source, .. } => {
                source.is_service_unavailable()
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, RagError>;
