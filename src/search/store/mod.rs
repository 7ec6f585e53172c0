mod json;
mod memory;
mod types;

pub use json::JsonStore;
pub use memory::MemoryStore;
pub use types::{Document, DocumentRecord, IndexEntry, IndexStats, Metadata, SearchResult};

use async_trait::async_trait;
use std::cmp::Ordering;

use crate::config::Similarity;
use crate::error::Result;

/// Session-scoped collection of embedded chunks.
///
/// Stores are append-only: `insert` commits a whole batch or nothing, and
/// only `clear` removes entries. Implementations decide whether `persist`
/// and `load` touch durable storage.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn insert(&self, entries: Vec<IndexEntry>) -> Result<()>;
    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        similarity: Similarity,
    ) -> Result<Vec<SearchResult>>;
    async fn get(&self, id: &str) -> Result<Option<IndexEntry>>;
    /// All entries in insertion order.
    async fn entries(&self) -> Result<Vec<IndexEntry>>;
    async fn get_document(&self, source: &str) -> Result<Option<DocumentRecord>>;
    async fn save_document(&self, record: DocumentRecord) -> Result<()>;
    async fn list_documents(&self) -> Result<Vec<String>>;
    async fn len(&self) -> Result<usize>;
    /// Changes whenever the entry set changes.
    async fn revision(&self) -> Result<u64>;
    async fn persist(&self) -> Result<()>;
    async fn load(&self) -> Result<()>;
    async fn stats(&self) -> Result<IndexStats>;
    async fn clear(&self) -> Result<()>;
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

pub fn similarity_score(similarity: Similarity, a: &[f32], b: &[f32]) -> f32 {
    match similarity {
        Similarity::Cosine => cosine_similarity(a, b),
        Similarity::Dot => dot_product(a, b),
    }
}

/// Descending score order for `sort_by`. NaN ranks below every real score
/// and the two zeros compare equal, so stable sorts keep their tie order.
pub(crate) fn score_order(a: f32, b: f32) -> Ordering {
    rankable(b).total_cmp(&rankable(a))
}

fn rankable(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else if score == 0.0 {
        0.0
    } else {
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_dot_product_ignores_magnitude_normalisation() {
        let a = vec![2.0, 0.0];
        let b = vec![3.0, 1.0];
        assert_eq!(dot_product(&a, &b), 6.0);
        assert_eq!(similarity_score(Similarity::Dot, &a, &b), 6.0);
        assert!((similarity_score(Similarity::Cosine, &a, &b) - 0.9487).abs() < 0.001);
    }

    #[test]
    fn test_score_order_puts_nan_last() {
        let mut scores = vec![0.2, f32::NAN, 0.9, -0.0, f32::NAN, 0.0, 0.5];
        scores.sort_by(|a, b| score_order(*a, *b));
        assert_eq!(&scores[..3], &[0.9, 0.5, 0.2]);
        // -0.0 and 0.0 tie, so their input order survives
        assert!(scores[3].is_sign_negative() && scores[3] == 0.0);
        assert!(scores[4] == 0.0 && scores[4].is_sign_positive());
        assert!(scores[5].is_nan() && scores[6].is_nan());
    }
}
