//! Diversity-aware selection

use std::collections::HashSet;

use super::types::Candidate;

/// Greedy two-pass selection capping result size while spreading across
/// distinct provenance keys.
///
/// Pass one admits at most one candidate per provenance key, in order.
/// Pass two backfills remaining slots by original rank. Output length is
/// `min(limit, input length)` and no product identifier appears twice.
pub fn select_diverse(candidates: Vec<Candidate>, limit: usize) -> Vec<Candidate> {
    if limit == 0 {
        return Vec::new();
    }

    let mut selected: Vec<Candidate> = Vec::with_capacity(limit.min(candidates.len()));
    let mut seen_keys: HashSet<String> = HashSet::new();
    let mut picked: HashSet<_> = HashSet::new();

    for candidate in &candidates {
        if selected.len() >= limit {
            break;
        }
        if !picked.contains(&candidate.product_id)
            && seen_keys.insert(candidate.provenance_key())
        {
            picked.insert(candidate.product_id);
            selected.push(candidate.clone());
        }
    }

    if selected.len() < limit {
        for candidate in candidates {
            if selected.len() >= limit {
                break;
            }
            if picked.insert(candidate.product_id) {
                selected.push(candidate);
            }
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::domain::product::ProductId;
    use crate::fusion::types::Strategy;

    use super::*;

    fn candidate(seed: u128, key: &str) -> Candidate {
        Candidate::new(ProductId(Uuid::from_u128(seed)), 0.5, Strategy::Semantic)
            .with_source_key(key)
    }

    #[test]
    fn first_pass_prefers_distinct_provenance() {
        let input = vec![
            candidate(1, "outdoor"),
            candidate(2, "outdoor"),
            candidate(3, "kitchen"),
            candidate(4, "fitness"),
        ];

        let selected = select_diverse(input, 3);
        let keys: Vec<String> = selected.iter().map(Candidate::provenance_key).collect();
        assert_eq!(keys, vec!["outdoor", "kitchen", "fitness"]);
    }

    #[test]
    fn second_pass_backfills_by_original_rank() {
        let input = vec![
            candidate(1, "outdoor"),
            candidate(2, "outdoor"),
            candidate(3, "outdoor"),
        ];

        let selected = select_diverse(input, 2);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].product_id, ProductId(Uuid::from_u128(1)));
        assert_eq!(selected[1].product_id, ProductId(Uuid::from_u128(2)));
    }

    #[test]
    fn output_length_is_min_of_limit_and_input() {
        let input = vec![candidate(1, "a"), candidate(2, "b")];
        assert_eq!(select_diverse(input.clone(), 10).len(), 2);
        assert_eq!(select_diverse(input, 1).len(), 1);
    }

    #[test]
    fn no_product_appears_twice() {
        let input = vec![
            candidate(1, "a"),
            candidate(1, "b"),
            candidate(2, "a"),
            candidate(3, "c"),
        ];

        let selected = select_diverse(input, 4);
        let mut ids: Vec<ProductId> = selected.iter().map(|c| c.product_id).collect();
        let before = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }
}
