use chrono::Utc;
use proptest::prelude::*;

use ragline::search::{
    reciprocal_rank_fusion, weighted_rank_fusion, Chunker, IndexEntry, Metadata, SearchResult,
    RRF_K,
};

fn result(id: usize) -> SearchResult {
    SearchResult::new(
        IndexEntry {
            id: format!("e{}", id),
            document_id: "doc".to_string(),
            chunk_index: id,
            start_index: 0,
            content: String::new(),
            vector: vec![1.0],
            metadata: Metadata::new(),
            hash: String::new(),
            added_at: Utc::now(),
        },
        0.0,
    )
}

fn ranking(ids: &[usize]) -> Vec<SearchResult> {
    ids.iter().map(|&id| result(id)).collect()
}

fn chunker_params() -> impl Strategy<Value = (usize, usize)> {
    (1usize..64).prop_flat_map(|size| (Just(size), 0..size))
}

proptest! {
    #[test]
    fn chunks_cover_the_whole_text(
        text in "[a-zé漢 \n]{0,400}",
        (size, overlap) in chunker_params(),
    ) {
        let chunker = Chunker::new(size, overlap).unwrap();
        let chunks = chunker.split(&text);
        let chars: Vec<char> = text.chars().collect();

        if chars.is_empty() {
            prop_assert!(chunks.is_empty());
        } else {
            prop_assert_eq!(chunks[0].start_index, 0);
            let last = chunks.last().unwrap();
            prop_assert_eq!(last.start_index + last.char_len(), chars.len());

            for chunk in &chunks {
                prop_assert!(chunk.char_len() <= size);
                let expected: String =
                    chars[chunk.start_index..chunk.start_index + chunk.char_len()].iter().collect();
                prop_assert_eq!(&chunk.content, &expected);
            }
        }
    }

    #[test]
    fn consecutive_chunks_share_exactly_the_overlap(
        text in "[a-z ]{1,400}",
        (size, overlap) in chunker_params(),
    ) {
        let chunks = Chunker::new(size, overlap).unwrap().split(&text);

        for pair in chunks.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            prop_assert_eq!(prev.char_len(), size);
            prop_assert_eq!(next.start_index, prev.start_index + size - overlap);

            let prev_tail: String = prev.content.chars().skip(size - overlap).collect();
            let next_head: String = next.content.chars().take(overlap).collect();
            prop_assert_eq!(prev_tail, next_head);
        }
    }

    /// Promoting an entry in one input ranking never lowers its fused rank.
    #[test]
    fn fusion_is_monotonic_in_input_rank(
        mut first in Just((0usize..12).collect::<Vec<_>>()).prop_shuffle(),
        second in Just((0usize..12).collect::<Vec<_>>()).prop_shuffle(),
        target in 0usize..12,
        w1 in 0.1f32..2.0,
        w2 in 0.1f32..2.0,
    ) {
        let fused_rank = |lists: Vec<(f32, Vec<SearchResult>)>| {
            weighted_rank_fusion(RRF_K, 12, lists)
                .iter()
                .position(|r| r.entry.chunk_index == target)
                .unwrap()
        };

        let before = fused_rank(vec![(w1, ranking(&first)), (w2, ranking(&second))]);

        let pos = first.iter().position(|&id| id == target).unwrap();
        if pos > 0 {
            first.swap(pos, pos - 1);
        }
        let after = fused_rank(vec![(w1, ranking(&first)), (w2, ranking(&second))]);

        prop_assert!(after <= before, "rank went from {} to {}", before, after);
    }

    /// An entry every list ranks first is ranked first after fusion,
    /// whatever the (positive) weights.
    #[test]
    fn unanimous_first_place_survives_fusion(
        tails in prop::collection::vec(prop::collection::vec(1usize..30, 0..12), 1..6),
        weights in prop::collection::vec(0.001f32..10.0, 6),
        k in 0.0f32..120.0,
        limit in 1usize..10,
    ) {
        let lists: Vec<(f32, Vec<SearchResult>)> = tails
            .iter()
            .zip(&weights)
            .map(|(tail, &w)| {
                let mut ids = vec![0usize];
                ids.extend(tail.iter().copied());
                (w, ranking(&ids))
            })
            .collect();

        let fused = weighted_rank_fusion(k, limit, lists);
        prop_assert_eq!(fused[0].entry.chunk_index, 0);
    }

    #[test]
    fn fusion_output_is_bounded_and_unique(
        lists in prop::collection::vec(prop::collection::vec(0usize..20, 0..15), 0..4),
        limit in 0usize..25,
    ) {
        let rankings = lists.iter().map(|ids| ranking(ids)).collect();
        let fused = reciprocal_rank_fusion(RRF_K, limit, rankings);

        let mut distinct: Vec<usize> = lists.iter().flatten().copied().collect();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(fused.len(), limit.min(distinct.len()));

        let mut ids: Vec<&str> = fused.iter().map(|r| r.entry.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), fused.len());

        for pair in fused.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }
}
