//! Keyword-overlap semantic search
//!
//! Scores each catalog product by how many query terms hit its name,
//! category, brand, or tags. Raw scores land on an uncalibrated 0..N
//! scale; the engine normalizes them per batch.

use async_trait::async_trait;

use reko_core::{Candidate, CandidateSource, RetrievalError, SourceQuery, Strategy};

use crate::seeds;

const NAME_WEIGHT: f64 = 3.0;
const TAG_WEIGHT: f64 = 1.5;
const CATEGORY_WEIGHT: f64 = 1.0;

#[derive(Clone, Copy, Debug, Default)]
pub struct SemanticSearchSource;

#[async_trait]
impl CandidateSource for SemanticSearchSource {
    async fn retrieve(&self, query: &SourceQuery) -> Result<Vec<Candidate>, RetrievalError> {
        let text = match query.query_text.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Ok(Vec::new()),
        };
        let terms: Vec<String> =
            text.split_whitespace().map(str::to_ascii_lowercase).collect();

        let mut candidates: Vec<Candidate> = seeds::PRODUCTS
            .iter()
            .filter(|product| {
                query
                    .category
                    .as_deref()
                    .map(|category| product.category.eq_ignore_ascii_case(category))
                    .unwrap_or(true)
            })
            .filter_map(|product| {
                let name = product.name.to_ascii_lowercase();
                let mut score = 0.0;
                let mut matched = Vec::new();
                for term in &terms {
                    if name.contains(term.as_str()) {
                        score += NAME_WEIGHT;
                        matched.push(term.clone());
                    } else if product.tags.iter().any(|tag| tag.contains(term.as_str())) {
                        score += TAG_WEIGHT;
                        matched.push(term.clone());
                    } else if product.category.contains(term.as_str())
                        || product
                            .brand
                            .map(|brand| brand.eq_ignore_ascii_case(term))
                            .unwrap_or(false)
                    {
                        score += CATEGORY_WEIGHT;
                        matched.push(term.clone());
                    }
                }
                (score > 0.0).then(|| {
                    let mut candidate = Candidate::new(product.id, score, Strategy::Semantic)
                        .with_criteria(matched)
                        .with_source_key(product.category);
                    candidate
                        .metadata
                        .insert("indexed".to_owned(), product.searchable_text());
                    candidate
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.raw_score.partial_cmp(&a.raw_score).unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(query.limit);
        Ok(candidates)
    }
}
