//! Score normalization, confidence bucketing, and semantic reranking

use super::types::Candidate;
use super::MIN_SCORE_SPREAD;

/// Rescales one strategy batch's raw scores into `[0, 1]`.
///
/// Raw scales differ per retrieval backend, so this must run once per
/// strategy call, before any cross-strategy weighting. Nearly-flat batches
/// pass through unchanged (clamped into range) to avoid amplifying
/// artificial spread.
pub fn normalize_scores(candidates: &mut [Candidate]) {
    if candidates.is_empty() {
        return;
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for candidate in candidates.iter() {
        min = min.min(candidate.raw_score);
        max = max.max(candidate.raw_score);
    }

    let spread = max - min;
    for candidate in candidates.iter_mut() {
        candidate.normalized_score = if spread > MIN_SCORE_SPREAD {
            (candidate.raw_score - min) / spread
        } else {
            // Flat batches keep their raw scores, but `normalized_score`
            // must still land in [0, 1]; the clamp only bites when the raw
            // scale was already out of range.
            candidate.raw_score.clamp(0.0, 1.0)
        };
    }
}

/// Coarsens a score in `[0, 1]` into one of four display-stable tiers.
pub fn bucketize_confidence(score: f64) -> f64 {
    if score > 0.8 {
        0.95
    } else if score > 0.6 {
        0.8
    } else if score > 0.4 {
        0.6
    } else {
        0.4
    }
}

/// Blends each candidate's similarity score with lexical term overlap
/// against the query and re-sorts descending.
///
/// The sort must be stable: ties keep prior relative order so downstream
/// diversity selection stays deterministic.
pub fn rerank_by_query(candidates: &mut [Candidate], query: &str) {
    let terms: Vec<String> =
        query.split_whitespace().map(|term| term.to_ascii_lowercase()).collect();

    for candidate in candidates.iter_mut() {
        let lexical = lexical_relevance(&candidate.indexed_text(), &terms);
        candidate.normalized_score = candidate.normalized_score * 0.7 + lexical * 0.3;
    }

    candidates.sort_by(|a, b| {
        b.normalized_score.partial_cmp(&a.normalized_score).unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Fraction of query terms found as substrings of the indexed text;
/// 0.0 for an empty query.
fn lexical_relevance(indexed_text: &str, terms: &[String]) -> f64 {
    if terms.is_empty() {
        return 0.0;
    }

    let hits = terms.iter().filter(|term| indexed_text.contains(term.as_str())).count();
    hits as f64 / terms.len() as f64
}
