use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Metadata = BTreeMap<String, String>;

/// A raw source unit: a PDF's extracted text, a web page, a transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub source: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// An embedded chunk stored in the vector index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexEntry {
    pub id: String,
    pub document_id: String,
    pub chunk_index: usize,
    pub start_index: usize,
    pub content: String,
    pub vector: Vec<f32>,
    pub metadata: Metadata,
    pub hash: String,
    pub added_at: DateTime<Utc>,
}

/// Bookkeeping for an ingested source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentRecord {
    pub source: String,
    pub hash: String,
    pub ingested_at: DateTime<Utc>,
    pub entry_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub entry: IndexEntry,
    pub score: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_documents: usize,
    pub total_entries: usize,
    pub dimensions: Option<usize>,
    pub index_size_bytes: u64,
    pub last_updated: Option<DateTime<Utc>>,
}

impl SearchResult {
    pub fn new(entry: IndexEntry, score: f32) -> Self {
        Self { entry, score }
    }
}
