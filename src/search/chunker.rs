use sha2::{Digest, Sha256};

use super::store::{Document, Metadata};
use crate::error::{RagError, Result};

/// A window of a document's text, before embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub document_id: String,
    pub chunk_index: usize,
    /// Offset of the first character in the parent text, counted in chars
    pub start_index: usize,
    pub content: String,
    pub hash: String,
    pub metadata: Metadata,
}

impl Chunk {
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Fixed-size character window splitter with overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

impl Chunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::InvalidConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(RagError::InvalidConfig(format!(
                "overlap ({}) must be less than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split a document, tagging every chunk with the document's source and
    /// metadata plus its own `start_index`.
    pub fn chunk_document(&self, document: &Document) -> Vec<Chunk> {
        self.windows(&document.text)
            .into_iter()
            .enumerate()
            .map(|(chunk_index, (start_index, content))| {
                let mut metadata = document.metadata.clone();
                metadata.insert("start_index".to_string(), start_index.to_string());
                Chunk {
                    document_id: document.source.clone(),
                    chunk_index,
                    start_index,
                    hash: hash_content(content),
                    content: content.to_string(),
                    metadata,
                }
            })
            .collect()
    }

    /// Split bare text. Chunks carry an empty `document_id`.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        self.chunk_document(&Document::new("", text))
    }

    /// `(start_index, slice)` pairs. Start offsets are in chars, slices never
    /// cut a UTF-8 sequence.
    fn windows<'a>(&self, text: &'a str) -> Vec<(usize, &'a str)> {
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every char boundary, plus the end of the text
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        let total_chars = boundaries.len() - 1;

        let step = self.chunk_size - self.overlap;
        let mut windows = Vec::with_capacity(total_chars / step + 1);
        let mut start = 0;

        loop {
            let end = (start + self.chunk_size).min(total_chars);
            windows.push((start, &text[boundaries[start]..boundaries[end]]));

            if end == total_chars {
                break;
            }
            start += step;
        }

        windows
    }
}

pub(crate) fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_thousand_chars_gives_four_chunks() {
        let text: String = (0..3000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let chunks = Chunker::default().split(&text);

        let starts: Vec<usize> = chunks.iter().map(|c| c.start_index).collect();
        assert_eq!(starts, vec![0, 800, 1600, 2400]);
        assert_eq!(chunks[3].char_len(), 600);
        assert!(chunks[..3].iter().all(|c| c.char_len() == 1000));
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = Chunker::default().split("just a short note");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "just a short note");
        assert_eq!(chunks[0].start_index, 0);
    }

    #[test]
    fn test_exact_chunk_size_is_single_chunk() {
        let text = "x".repeat(1000);
        assert_eq!(Chunker::default().split(&text).len(), 1);
    }

    #[test]
    fn test_empty_text_gives_no_chunks() {
        assert!(Chunker::default().split("").is_empty());
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(Chunker::new(0, 0).is_err());
        assert!(Chunker::new(100, 100).is_err());
        assert!(Chunker::new(100, 150).is_err());
        assert!(Chunker::new(100, 99).is_ok());
    }

    #[test]
    fn test_multibyte_text_is_split_on_chars() {
        let text = "héllo wörld ✓ ".repeat(20);
        let chunker = Chunker::new(30, 10).unwrap();
        let chunks = chunker.split(&text);

        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let tail: String = pair[0].content.chars().skip(20).collect();
            let head: String = pair[1].content.chars().take(10).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_chunk_document_carries_metadata() {
        let doc = Document::new("report.pdf", "a".repeat(1500)).with_metadata("page", "2");
        let chunks = Chunker::default().chunk_document(&doc);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].document_id, "report.pdf");
        assert_eq!(chunks[1].chunk_index, 1);
        assert_eq!(chunks[1].metadata.get("page").map(String::as_str), Some("2"));
        assert_eq!(
            chunks[1].metadata.get("start_index").map(String::as_str),
            Some("800")
        );
    }

    #[test]
    fn test_hash_content() {
        let hash1 = hash_content("hello");
        let hash2 = hash_content("hello");
        let hash3 = hash_content("world");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
        assert_eq!(hash1.len(), 16);
    }
}
