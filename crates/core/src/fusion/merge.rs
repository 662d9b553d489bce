//! Weighted strategy merge and dedup

use std::collections::HashSet;

use super::types::{Candidate, StrategyOutcome};

/// Merges strategy outcomes into one candidate list.
///
/// Outcomes are concatenated in strategy-priority order; the first
/// occurrence of each product identifier wins entirely, later occurrences
/// are discarded rather than blended. With `weighted` set (hybrid
/// requests) each strategy's normalized scores are multiplied by its fixed
/// weight exactly once, at merge time.
pub fn merge_outcomes(mut outcomes: Vec<StrategyOutcome>, weighted: bool) -> Vec<Candidate> {
    outcomes.sort_by_key(|outcome| outcome.strategy.priority());

    let mut seen: HashSet<_> = HashSet::new();
    let mut merged = Vec::new();

    for outcome in outcomes {
        let weight = if weighted { outcome.strategy.hybrid_weight() } else { 1.0 };
        for mut candidate in outcome.candidates {
            if seen.insert(candidate.product_id) {
                candidate.normalized_score =
                    (candidate.normalized_score * weight).clamp(0.0, 1.0);
                merged.push(candidate);
            }
        }
    }

    merged
}

/// Stable descending sort by normalized score.
pub fn sort_by_score(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.normalized_score.partial_cmp(&a.normalized_score).unwrap_or(std::cmp::Ordering::Equal)
    });
}
