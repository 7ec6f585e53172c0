//! Separating a reasoning model's `<think>` section from its answer.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Completion;

const OPEN_TAG: &str = "<think>";

static THINK_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think>(.*?)</think>").expect("valid think regex"));

/// Split raw model output into reasoning and answer.
///
/// Every closed `<think>…</think>` block is removed from the answer and its
/// body kept as reasoning. An unterminated `<think>` takes the rest of the
/// text with it. The answer is trimmed.
pub fn split_reasoning(raw: &str) -> Completion {
    let mut notes: Vec<String> = THINK_BLOCK
        .captures_iter(raw)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect();
    let mut answer = THINK_BLOCK.replace_all(raw, "").into_owned();

    if let Some(pos) = answer.find(OPEN_TAG) {
        notes.push(answer[pos + OPEN_TAG.len()..].trim().to_string());
        answer.truncate(pos);
    }

    notes.retain(|n| !n.is_empty());
    let reasoning = if notes.is_empty() {
        None
    } else {
        Some(notes.join("\n\n"))
    };

    Completion {
        reasoning,
        answer: answer.trim().to_string(),
    }
}

/// The user-facing part of raw model output.
pub fn strip_reasoning(raw: &str) -> String {
    split_reasoning(raw).answer
}
