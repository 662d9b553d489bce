//! Anchor-based vector similarity
//!
//! Static nearest-neighbor lists stand in for an embedding index. Each
//! anchor maps to precomputed neighbors with cosine-style raw scores.

use async_trait::async_trait;

use reko_core::{Candidate, CandidateSource, ProductId, RetrievalError, SourceQuery, Strategy};

use crate::seeds;

#[derive(Clone, Copy, Debug, Default)]
pub struct VectorSimilaritySource;

fn neighbors(anchor: ProductId) -> &'static [(ProductId, f64)] {
    if anchor == seeds::TRAIL_RUNNERS {
        &[
            (seeds::WOOL_SOCKS, 0.92),
            (seeds::HIKING_BOOTS, 0.88),
            (seeds::HEADLAMP, 0.61),
            (seeds::DAYPACK, 0.55),
        ]
    } else if anchor == seeds::HIKING_BOOTS {
        &[
            (seeds::TREKKING_POLES, 0.90),
            (seeds::WOOL_SOCKS, 0.87),
            (seeds::RAIN_JACKET, 0.74),
            (seeds::TRAIL_RUNNERS, 0.70),
        ]
    } else if anchor == seeds::ALPINE_TENT {
        &[
            (seeds::SLEEPING_BAG, 0.95),
            (seeds::CAMP_STOVE, 0.82),
            (seeds::HEADLAMP, 0.78),
            (seeds::COFFEE_PRESS, 0.50),
        ]
    } else if anchor == seeds::SLEEPING_BAG {
        &[
            (seeds::ALPINE_TENT, 0.95),
            (seeds::CAMP_STOVE, 0.70),
            (seeds::FLEECE_PULLOVER, 0.60),
        ]
    } else if anchor == seeds::RAIN_JACKET {
        &[
            (seeds::FLEECE_PULLOVER, 0.85),
            (seeds::HIKING_BOOTS, 0.72),
            (seeds::DAYPACK, 0.66),
        ]
    } else if anchor == seeds::YOGA_MAT {
        &[(seeds::WATER_BOTTLE, 0.80), (seeds::FLEECE_PULLOVER, 0.45)]
    } else {
        &[]
    }
}

#[async_trait]
impl CandidateSource for VectorSimilaritySource {
    async fn retrieve(&self, query: &SourceQuery) -> Result<Vec<Candidate>, RetrievalError> {
        let Some(anchor) = query.anchor else {
            return Ok(Vec::new());
        };

        let mut candidates: Vec<Candidate> = neighbors(anchor)
            .iter()
            .filter_map(|(id, score)| {
                let product = seeds::find_product(*id)?;
                if let Some(category) = query.category.as_deref() {
                    if !product.category.eq_ignore_ascii_case(category) {
                        return None;
                    }
                }
                Some(
                    Candidate::new(*id, *score, Strategy::Vector)
                        .with_criteria(vec![format!("similar to {}", anchor)])
                        .with_source_key(product.category),
                )
            })
            .collect();

        candidates.truncate(query.limit);
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use reko_core::CustomerProfile;
    use uuid::Uuid;

    use super::*;

    fn query_with_anchor(anchor: Option<ProductId>) -> SourceQuery {
        let customer: CustomerProfile = seeds::customers().remove(0);
        SourceQuery {
            customer,
            query_text: None,
            anchor,
            category: None,
            price_range: None,
            context: "general".to_owned(),
            limit: 10,
        }
    }

    #[tokio::test]
    async fn tent_neighborhood_is_camping_gear() {
        let candidates = VectorSimilaritySource
            .retrieve(&query_with_anchor(Some(seeds::ALPINE_TENT)))
            .await
            .unwrap();
        assert_eq!(candidates[0].product_id, seeds::SLEEPING_BAG);
        assert!(candidates.len() >= 3);
    }

    #[tokio::test]
    async fn unknown_anchor_yields_empty_batch() {
        let unknown = ProductId(Uuid::from_u128(0xdead_beef));
        let candidates =
            VectorSimilaritySource.retrieve(&query_with_anchor(Some(unknown))).await.unwrap();
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn missing_anchor_yields_empty_batch() {
        let candidates = VectorSimilaritySource.retrieve(&query_with_anchor(None)).await.unwrap();
        assert!(candidates.is_empty());
    }
}
