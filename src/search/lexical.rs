//! Okapi BM25 over the entries of a store.
//!
//! The index is built in one pass from the full entry set and never updated
//! in place; callers rebuild it when the store changes.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use super::store::{score_order, IndexEntry, SearchResult};
use crate::config::Bm25Config;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid word regex"));

/// Split on Unicode word boundaries. No stemming.
pub fn tokenize(text: &str, lowercase: bool) -> Vec<String> {
    WORD.find_iter(text)
        .map(|m| {
            if lowercase {
                m.as_str().to_lowercase()
            } else {
                m.as_str().to_string()
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    pub k1: f32,
    pub b: f32,
    pub lowercase: bool,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: 1.5,
            b: 0.75,
            lowercase: true,
        }
    }
}

impl From<&Bm25Config> for Bm25Params {
    fn from(config: &Bm25Config) -> Self {
        Self {
            k1: config.k1,
            b: config.b,
            lowercase: config.lowercase,
        }
    }
}

#[derive(Debug)]
pub struct Bm25Index {
    params: Bm25Params,
    entries: Vec<IndexEntry>,
    /// term -> (entry position, term frequency), positions ascending
    postings: HashMap<String, Vec<(usize, u32)>>,
    doc_lengths: Vec<u32>,
    avg_doc_length: f32,
}

impl Bm25Index {
    pub fn build(entries: &[IndexEntry], params: Bm25Params) -> Self {
        let mut postings: HashMap<String, Vec<(usize, u32)>> = HashMap::new();
        let mut doc_lengths = Vec::with_capacity(entries.len());

        for (pos, entry) in entries.iter().enumerate() {
            let tokens = tokenize(&entry.content, params.lowercase);
            doc_lengths.push(tokens.len() as u32);

            let mut frequencies: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *frequencies.entry(token).or_insert(0) += 1;
            }
            for (term, tf) in frequencies {
                postings.entry(term).or_default().push((pos, tf));
            }
        }

        let total: u64 = doc_lengths.iter().map(|&l| l as u64).sum();
        let avg_doc_length = if doc_lengths.is_empty() {
            0.0
        } else {
            total as f32 / doc_lengths.len() as f32
        };

        Self {
            params,
            entries: entries.to_vec(),
            postings,
            doc_lengths,
            avg_doc_length,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn idf(&self, document_frequency: usize) -> f32 {
        let n = self.entries.len() as f32;
        let df = document_frequency as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// Top `limit` entries with a positive score, best first. Ties keep
    /// insertion order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        if limit == 0 || self.entries.is_empty() {
            return Vec::new();
        }

        let mut terms = tokenize(query, self.params.lowercase);
        terms.sort();
        terms.dedup();
        if terms.is_empty() {
            return Vec::new();
        }

        let Bm25Params { k1, b, .. } = self.params;
        let mut scores = vec![0.0f32; self.entries.len()];

        for term in &terms {
            let Some(postings) = self.postings.get(term) else {
                continue;
            };
            let idf = self.idf(postings.len());
            for &(pos, tf) in postings {
                let tf = tf as f32;
                let length_ratio = if self.avg_doc_length > 0.0 {
                    self.doc_lengths[pos] as f32 / self.avg_doc_length
                } else {
                    0.0
                };
                let norm = k1 * (1.0 - b + b * length_ratio);
                scores[pos] += idf * (tf * (k1 + 1.0)) / (tf + norm);
            }
        }

        let mut ranked: Vec<(usize, f32)> = scores
            .into_iter()
            .enumerate()
            .filter(|(_, score)| *score > 0.0)
            .collect();
        ranked.sort_by(|a, b| score_order(a.1, b.1));
        ranked.truncate(limit);

        ranked
            .into_iter()
            .map(|(pos, score)| SearchResult::new(self.entries[pos].clone(), score))
            .collect()
    }
}
