use std::collections::{HashMap, HashSet};

use super::store::{score_order, SearchResult};
use crate::error::{RagError, Result};

/// Default rank constant from the original RRF paper.
pub const RRF_K: f32 = 60.0;

/// Validate retriever weights and scale them to sum to 1.
pub fn normalize_weights(weights: &[f32]) -> Result<Vec<f32>> {
    if weights.is_empty() {
        return Err(RagError::InvalidConfig(
            "at least one retriever weight is required".to_string(),
        ));
    }
    if let Some(bad) = weights.iter().find(|w| !(w.is_finite() && **w > 0.0)) {
        return Err(RagError::InvalidConfig(format!(
            "retriever weights must be positive, got {}",
            bad
        )));
    }
    let total: f32 = weights.iter().sum();
    Ok(weights.iter().map(|w| w / total).collect())
}

/// Weighted Reciprocal Rank Fusion.
///
/// Each list contributes `weight / (k + rank)` (1-based rank) to every entry
/// it contains; an entry missing from a list gets nothing from it. Entries
/// repeated within one list only count at their best rank. Equal fused
/// scores keep first-seen order across the lists.
pub fn weighted_rank_fusion(
    k: f32,
    limit: usize,
    result_lists: Vec<(f32, Vec<SearchResult>)>,
) -> Vec<SearchResult> {
    let mut order: Vec<SearchResult> = Vec::new();
    let mut scores: Vec<f32> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (weight, list) in result_lists {
        let mut seen_in_list: HashSet<String> = HashSet::new();
        let mut rank = 0usize;
        for result in list {
            let id = result.entry.id.clone();
            if !seen_in_list.insert(id.clone()) {
                continue;
            }
            rank += 1;
            let contribution = weight / (k + rank as f32);

            match positions.get(&id) {
                Some(&pos) => scores[pos] += contribution,
                None => {
                    positions.insert(id, order.len());
                    order.push(result);
                    scores.push(contribution);
                }
            }
        }
    }

    let mut results: Vec<SearchResult> = order
        .into_iter()
        .zip(scores)
        .map(|(result, score)| SearchResult::new(result.entry, score))
        .collect();

    results.sort_by(|a, b| score_order(a.score, b.score));
    results.truncate(limit);
    results
}

/// Unweighted RRF: every list counts equally.
pub fn reciprocal_rank_fusion(
    k: f32,
    limit: usize,
    result_lists: Vec<Vec<SearchResult>>,
) -> Vec<SearchResult> {
    let lists = result_lists.into_iter().map(|list| (1.0, list)).collect();
    weighted_rank_fusion(k, limit, lists)
}
