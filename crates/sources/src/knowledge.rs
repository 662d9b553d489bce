//! Rule-based knowledge recommendations
//!
//! Profile-driven rules over the seed catalog: preferred categories set
//! the base score, brand and lifestyle affinity add on top, premium
//! customers get a nudge toward higher-end gear.

use async_trait::async_trait;

use reko_core::{Candidate, CandidateSource, RetrievalError, SourceQuery, Strategy};

use crate::seeds;

const CATEGORY_BASE: f64 = 5.0;
const BRAND_BONUS: f64 = 1.5;
const LIFESTYLE_BONUS: f64 = 1.0;
const PREMIUM_BONUS: f64 = 2.0;
const PREMIUM_PRICE_FLOOR: f64 = 100.0;

#[derive(Clone, Copy, Debug, Default)]
pub struct KnowledgeBaseSource;

#[async_trait]
impl CandidateSource for KnowledgeBaseSource {
    async fn retrieve(&self, query: &SourceQuery) -> Result<Vec<Candidate>, RetrievalError> {
        let profile = &query.customer;

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
                let mut score = 0.0;
                let mut matched = Vec::new();

                if profile.preferred_categories.contains(product.category) {
                    score += CATEGORY_BASE;
                    matched.push(format!("preferred category: {}", product.category));
                }
                if let Some(brand) = product.brand {
                    if profile.preferred_brands.iter().any(|b| b == brand) {
                        score += BRAND_BONUS;
                        matched.push(format!("preferred brand: {brand}"));
                    }
                }
                for tag in &profile.lifestyle_tags {
                    if product.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
                        score += LIFESTYLE_BONUS;
                        matched.push(format!("lifestyle: {tag}"));
                    }
                }
                if profile.premium && product.price >= PREMIUM_PRICE_FLOOR && score > 0.0 {
                    score += PREMIUM_BONUS;
                }

                (score > 0.0).then(|| {
                    Candidate::new(product.id, score, Strategy::KnowledgeBased)
                        .with_criteria(matched)
                        .with_source_key(product.category)
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

#[cfg(test)]
mod tests {
    use reko_core::CustomerProfile;

    use super::*;

    fn query_for(customer: CustomerProfile) -> SourceQuery {
        SourceQuery {
            customer,
            query_text: None,
            anchor: None,
            category: None,
            price_range: None,
            context: "general".to_owned(),
            limit: 10,
        }
    }

    #[tokio::test]
    async fn preferred_categories_drive_the_batch() {
        // cora prefers camping gear
        let candidates =
            KnowledgeBaseSource.retrieve(&query_for(seeds::customers().remove(2))).await.unwrap();
        assert!(!candidates.is_empty());
        assert!(candidates
            .iter()
            .all(|candidate| candidate.source_key.as_deref() == Some("camping")));
    }

    #[tokio::test]
    async fn premium_nudge_prefers_higher_end_gear() {
        // ava is premium with footwear+camping preferences
        let candidates =
            KnowledgeBaseSource.retrieve(&query_for(seeds::customers().remove(0))).await.unwrap();
        let top = &candidates[0];
        let product = seeds::find_product(top.product_id).unwrap();
        assert!(product.price >= PREMIUM_PRICE_FLOOR);
    }

    #[tokio::test]
    async fn matched_criteria_name_the_fired_rules() {
        let candidates =
            KnowledgeBaseSource.retrieve(&query_for(seeds::customers().remove(2))).await.unwrap();
        assert!(candidates[0]
            .matched_criteria
            .iter()
            .any(|criterion| criterion.starts_with("preferred category")));
    }
}
