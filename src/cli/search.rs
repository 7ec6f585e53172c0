use anyhow::Result;
use console::{style, Emoji};
use serde::Serialize;

use crate::config::Config;
use crate::search::{Metadata, SearchResult};
use crate::session::{Answer, RagSession};

static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "");
static FILE: Emoji<'_, '_> = Emoji("📄 ", "");
static THINK: Emoji<'_, '_> = Emoji("💭 ", "");
static ANSWER: Emoji<'_, '_> = Emoji("💬 ", "");

const PREVIEW_CHARS: usize = 200;

/// `--json` view of a result: everything but the embedding.
#[derive(Debug, Serialize)]
struct SearchHit<'a> {
    id: &'a str,
    document_id: &'a str,
    chunk_index: usize,
    start_index: usize,
    content: &'a str,
    metadata: &'a Metadata,
    score: f32,
}

impl<'a> From<&'a SearchResult> for SearchHit<'a> {
    fn from(result: &'a SearchResult) -> Self {
        let entry = &result.entry;
        Self {
            id: &entry.id,
            document_id: &entry.document_id,
            chunk_index: entry.chunk_index,
            start_index: entry.start_index,
            content: &entry.content,
            metadata: &entry.metadata,
            score: result.score,
        }
    }
}

pub async fn run_search(
    config: &Config,
    query: &str,
    k: Option<usize>,
    hybrid: bool,
    json: bool,
) -> Result<()> {
    let session = RagSession::from_config(config).await?;
    let limit = k.unwrap_or(session.top_k());

    let results = if hybrid {
        session.search_hybrid(query, limit).await?
    } else {
        session.search(query, limit).await?
    };

    if json {
        let hits: Vec<SearchHit> = results.iter().map(SearchHit::from).collect();
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results found for: {}", style(query).italic());
        return Ok(());
    }

    println!(
        "\n{}Found {} results for: {}\n",
        SEARCH,
        style(results.len()).cyan(),
        style(query).yellow().bold()
    );
    for (i, result) in results.iter().enumerate() {
        print_result(i, result);
    }

    Ok(())
}

pub async fn run_ask(
    config: &Config,
    question: &str,
    hybrid: bool,
    show_reasoning: bool,
) -> Result<()> {
    let session = RagSession::from_config(config).await?;
    let answer = if hybrid {
        session.ask_hybrid(question).await?
    } else {
        session.ask(question).await?
    };

    print_answer(&answer, show_reasoning);
    Ok(())
}

pub(crate) fn print_result(i: usize, result: &SearchResult) {
    let entry = &result.entry;
    println!(
        "{} {}. {} {}",
        FILE,
        style(i + 1).dim(),
        style(&entry.document_id).green(),
        style(format!("(chunk {}, offset {})", entry.chunk_index, entry.start_index)).dim()
    );
    println!("   Score: {}", style(format!("{:.3}", result.score)).cyan());

    let preview = preview(&entry.content);
    if !preview.is_empty() {
        println!("   {}", style(preview).dim());
    }
    println!();
}

pub(crate) fn print_answer(answer: &Answer, show_reasoning: bool) {
    if show_reasoning {
        if let Some(reasoning) = &answer.reasoning {
            println!("\n{}{}", THINK, style("Reasoning").dim().bold());
            println!("{}", style(reasoning).dim());
        }
    }

    println!("\n{}{}\n", ANSWER, answer.answer);

    if !answer.sources.is_empty() {
        let labels = answer.source_labels();
        println!("{}", style("Sources:").bold());
        for (label, source) in labels.iter().zip(&answer.sources) {
            println!(
                "  - {} {}",
                style(label).cyan(),
                style(&source.entry.document_id).dim()
            );
        }
        println!();
    }
}

/// First few lines of a passage, cut at a char boundary.
fn preview(content: &str) -> String {
    let joined = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(5)
        .collect::<Vec<_>>()
        .join(" ");

    match joined.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &joined[..cut]),
        None => joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::IndexEntry;
    use chrono::Utc;

    #[test]
    fn test_json_hit_omits_vector() {
        let mut metadata = Metadata::new();
        metadata.insert("page".to_string(), "2".to_string());
        let result = SearchResult::new(
            IndexEntry {
                id: "id-1".to_string(),
                document_id: "guide.pdf".to_string(),
                chunk_index: 3,
                start_index: 2400,
                content: "passage".to_string(),
                vector: vec![0.25; 768],
                metadata,
                hash: "0011223344556677".to_string(),
                added_at: Utc::now(),
            },
            0.5,
        );

        let json = serde_json::to_value(SearchHit::from(&result)).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("vector"));
        assert_eq!(json["id"], "id-1");
        assert_eq!(json["document_id"], "guide.pdf");
        assert_eq!(json["chunk_index"], 3);
        assert_eq!(json["start_index"], 2400);
        assert_eq!(json["metadata"]["page"], "2");
        assert_eq!(json["score"], 0.5);
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let text = "é".repeat(300);
        let p = preview(&text);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_preview_skips_blank_lines() {
        assert_eq!(preview("first\n\n  second  \n"), "first second");
    }
}
