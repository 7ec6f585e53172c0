//! Retrieval-augmented question answering over local documents.

pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
mod ollama;
pub mod prompt;
pub mod search;
pub mod session;
pub mod storage;

pub use config::Config;
pub use error::{RagError, Result};
pub use llm::{Completion, CompletionProvider};
pub use session::{Answer, RagSession};
