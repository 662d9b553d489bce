//! Co-purchase collaborative filtering
//!
//! A fixed co-purchase matrix over the seed catalog: counts of how often
//! two products landed in the same order. A customer's owned products
//! vote for their co-purchased neighbors; the aggregated count is the
//! raw score.

use std::collections::HashMap;

use async_trait::async_trait;

use reko_core::{Candidate, CandidateSource, ProductId, RetrievalError, SourceQuery, Strategy};

use crate::seeds;

#[derive(Clone, Copy, Debug, Default)]
pub struct CollaborativeSource;

fn co_purchases(owned: ProductId) -> &'static [(ProductId, u32)] {
    if owned == seeds::HIKING_BOOTS {
        &[(seeds::WOOL_SOCKS, 41), (seeds::TREKKING_POLES, 33), (seeds::RAIN_JACKET, 18)]
    } else if owned == seeds::ALPINE_TENT {
        &[
            (seeds::SLEEPING_BAG, 52),
            (seeds::CAMP_STOVE, 36),
            (seeds::HEADLAMP, 29),
            (seeds::COFFEE_PRESS, 12),
        ]
    } else if owned == seeds::YOGA_MAT {
        &[(seeds::WATER_BOTTLE, 21), (seeds::FLEECE_PULLOVER, 9)]
    } else if owned == seeds::TRAIL_RUNNERS {
        &[(seeds::WOOL_SOCKS, 38), (seeds::HEADLAMP, 11)]
    } else if owned == seeds::WOOL_SOCKS {
        &[(seeds::TRAIL_RUNNERS, 25), (seeds::HIKING_BOOTS, 22)]
    } else if owned == seeds::TREKKING_POLES {
        &[(seeds::HIKING_BOOTS, 19), (seeds::DAYPACK, 8)]
    } else if owned == seeds::CAMP_STOVE {
        &[(seeds::COFFEE_PRESS, 17), (seeds::ALPINE_TENT, 14)]
    } else if owned == seeds::HEADLAMP {
        &[(seeds::ALPINE_TENT, 9), (seeds::TRAIL_RUNNERS, 7)]
    } else {
        &[]
    }
}

#[async_trait]
impl CandidateSource for CollaborativeSource {
    async fn retrieve(&self, query: &SourceQuery) -> Result<Vec<Candidate>, RetrievalError> {
        let owned = query.customer.owned_products();
        let mut votes: HashMap<ProductId, u32> = HashMap::new();
        for product in &owned {
            for (neighbor, count) in co_purchases(*product) {
                if !owned.contains(neighbor) {
                    *votes.entry(*neighbor).or_default() += count;
                }
            }
        }

        let mut candidates: Vec<Candidate> = votes
            .into_iter()
            .filter_map(|(id, count)| {
                let product = seeds::find_product(id)?;
                if let Some(category) = query.category.as_deref() {
                    if !product.category.eq_ignore_ascii_case(category) {
                        return None;
                    }
                }
                Some(
                    Candidate::new(id, f64::from(count), Strategy::Collaborative)
                        .with_criteria(vec![format!("co-purchased {count} times")])
                        .with_source_key(product.category),
                )
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.raw_score.partial_cmp(&a.raw_score).unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(query.limit);
        Ok(candidates)
    }
}
