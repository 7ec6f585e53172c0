#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use ragline::llm::{split_reasoning, Completion, CompletionProvider};
use ragline::search::{tokenize, Embedder};
use ragline::{RagError, Result};

pub const VOCABULARY: [&str; 4] = ["zephyrium", "quasar", "nebula", "radiation"];

/// Embeds text as term counts over a small vocabulary plus a constant bias
/// dimension, so every vector is non-zero.
#[derive(Default)]
pub struct VocabularyEmbedder {
    pub calls: AtomicUsize,
    /// Fail every call from this (zero-based) call index onwards.
    pub fail_from: Option<usize>,
    pub offline: AtomicBool,
}

impl VocabularyEmbedder {
    pub fn failing_from(call: usize) -> Self {
        Self {
            fail_from: Some(call),
            ..Self::default()
        }
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let tokens = tokenize(text, true);
        let mut vector: Vec<f32> = VOCABULARY
            .iter()
            .map(|term| tokens.iter().filter(|t| t == term).count() as f32)
            .collect();
        vector.push(1.0);
        vector
    }

    fn check(&self) -> Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let failing = self.fail_from.is_some_and(|from| call >= from);
        if failing || self.offline.load(Ordering::SeqCst) {
            return Err(RagError::ServiceUnavailable {
                service: "Ollama".to_string(),
                endpoint: "http://127.0.0.1:1".to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Embedder for VocabularyEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.check()?;
        Ok(Self::vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.check()?;
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        VOCABULARY.len() + 1
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// Replies with a fixed raw model output and records every prompt.
pub struct ScriptedLlm {
    reply: String,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedLlm {
    async fn complete(&self, prompt: &str) -> Result<Completion> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(split_reasoning(&self.reply))
    }
}

/// Exactly 3000 chars of filler with `zephyrium` at offset 2000, which only
/// the window starting at 1600 covers in full.
pub fn zephyrium_document() -> String {
    let filler: String = "lorem ipsum ".repeat(300);
    let marker = " zephyrium ";
    let mut text = String::new();
    text.push_str(&filler[..2000]);
    text.push_str(marker);
    text.push_str(&filler[..3000 - 2000 - marker.len()]);
    assert_eq!(text.chars().count(), 3000);
    text
}
