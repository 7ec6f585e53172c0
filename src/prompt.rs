//! Turning retrieved passages and a question into a single prompt.

use tiktoken_rs::CoreBPE;
use tracing::debug;

use crate::config::PromptConfig;
use crate::error::{RagError, Result};
use crate::search::SearchResult;

pub const DEFAULT_TEMPLATE: &str = "\
You are an assistant for question-answering tasks. Use the following pieces of retrieved context to answer the question. If you don't know the answer, just say that you don't know. Use three sentences maximum and keep the answer concise.
Question: {question}
Context: {context}
Answer:
";

const QUESTION_SLOT: &str = "{question}";
const CONTEXT_SLOT: &str = "{context}";
const PASSAGE_SEPARATOR: &str = "\n\n";

/// A rendered prompt plus how many passages made it into the context.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPrompt {
    pub text: String,
    pub passages_used: usize,
    pub passages_dropped: usize,
}

pub struct PromptAssembler {
    template: String,
    max_context_tokens: Option<usize>,
    bpe: Option<CoreBPE>,
}

impl PromptAssembler {
    pub fn new(template: impl Into<String>, max_context_tokens: Option<usize>) -> Result<Self> {
        let template = template.into();
        for slot in [QUESTION_SLOT, CONTEXT_SLOT] {
            if !template.contains(slot) {
                return Err(RagError::InvalidConfig(format!(
                    "prompt template is missing the {} placeholder",
                    slot
                )));
            }
        }

        let bpe = match max_context_tokens {
            Some(_) => Some(tiktoken_rs::cl100k_base().map_err(|e| {
                RagError::InvalidConfig(format!("failed to load tokenizer: {}", e))
            })?),
            None => None,
        };

        Ok(Self {
            template,
            max_context_tokens,
            bpe,
        })
    }

    pub fn from_config(config: &PromptConfig) -> Result<Self> {
        Self::new(config.template.clone(), config.max_context_tokens)
    }

    pub fn build(&self, question: &str, retrieved: &[SearchResult]) -> String {
        self.assemble(question, retrieved).text
    }

    /// Render the template. With a token budget, the lowest-ranked passages
    /// are dropped until the context fits.
    pub fn assemble(&self, question: &str, retrieved: &[SearchResult]) -> AssembledPrompt {
        let mut passages: Vec<&str> = retrieved.iter().map(|r| r.entry.content.as_str()).collect();
        let total = passages.len();

        if let (Some(budget), Some(bpe)) = (self.max_context_tokens, self.bpe.as_ref()) {
            while !passages.is_empty() {
                let tokens = bpe
                    .encode_with_special_tokens(&passages.join(PASSAGE_SEPARATOR))
                    .len();
                if tokens <= budget {
                    break;
                }
                passages.pop();
            }
        }

        let context = passages.join(PASSAGE_SEPARATOR);
        let text = render(&self.template, question, &context);

        if passages.len() < total {
            debug!(
                kept = passages.len(),
                dropped = total - passages.len(),
                "trimmed context to token budget"
            );
        }

        AssembledPrompt {
            text,
            passages_used: passages.len(),
            passages_dropped: total - passages.len(),
        }
    }
}

/// Single pass over the template, so placeholder-like text inside the
/// question or the passages is never substituted again.
fn render(template: &str, question: &str, context: &str) -> String {
    let mut out = String::with_capacity(template.len() + question.len() + context.len());
    let mut rest = template;

    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix(QUESTION_SLOT) {
            out.push_str(question);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(CONTEXT_SLOT) {
            out.push_str(context);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}

/// Human-readable attribution for each passage: `Page N` when the passage
/// carries a zero-based `page` key, otherwise `Chunk N` by rank.
pub fn source_labels(retrieved: &[SearchResult]) -> Vec<String> {
    retrieved
        .iter()
        .enumerate()
        .map(|(i, result)| {
            match result
                .entry
                .metadata
                .get("page")
                .and_then(|p| p.parse::<usize>().ok())
            {
                Some(page) => format!("Page {}", page + 1),
                None => format!("Chunk {}", i + 1),
            }
        })
        .collect()
}
