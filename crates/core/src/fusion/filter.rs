//! Declarative post-filtering

use std::collections::{HashMap, HashSet};

use crate::domain::customer::PriceRange;
use crate::domain::product::ProductId;

use super::types::Candidate;

/// Filters applied after fusion, in a fixed order: owned-product
/// exclusion, price range, explicit exclusions, then truncation to the
/// requested limit. Filtering never errors; an empty result is valid.
#[derive(Debug)]
pub struct PostFilter<'a> {
    pub owned: &'a HashSet<ProductId>,
    pub exclude_owned: bool,
    pub price_range: Option<PriceRange>,
    pub excluded: &'a [ProductId],
    pub limit: usize,
}

impl PostFilter<'_> {
    /// `prices` maps product id to catalog price; candidates the catalog
    /// could not price are not excluded by the range filter.
    pub fn apply(
        &self,
        mut candidates: Vec<Candidate>,
        prices: &HashMap<ProductId, f64>,
    ) -> Vec<Candidate> {
        if self.exclude_owned {
            candidates.retain(|candidate| !self.owned.contains(&candidate.product_id));
        }

        if let Some(range) = self.price_range {
            if range.is_bounded() {
                candidates.retain(|candidate| {
                    prices
                        .get(&candidate.product_id)
                        .map(|price| range.contains(*price))
                        .unwrap_or(true)
                });
            }
        }

        if !self.excluded.is_empty() {
            candidates.retain(|candidate| !self.excluded.contains(&candidate.product_id));
        }

        candidates.truncate(self.limit);
        candidates
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::fusion::types::Strategy;

    use super::*;

    fn id(seed: u128) -> ProductId {
        ProductId(Uuid::from_u128(seed))
    }

    fn candidates(seeds: &[u128]) -> Vec<Candidate> {
        seeds.iter().map(|seed| Candidate::new(id(*seed), 0.5, Strategy::Semantic)).collect()
    }

    #[test]
    fn owned_products_are_dropped_when_requested() {
        let owned: HashSet<ProductId> = [id(1)].into_iter().collect();
        let filter = PostFilter {
            owned: &owned,
            exclude_owned: true,
            price_range: None,
            excluded: &[],
            limit: 10,
        };

        let kept = filter.apply(candidates(&[1, 2]), &HashMap::new());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].product_id, id(2));
    }

    #[test]
    fn owned_products_survive_when_flag_is_off() {
        let owned: HashSet<ProductId> = [id(1)].into_iter().collect();
        let filter = PostFilter {
            owned: &owned,
            exclude_owned: false,
            price_range: None,
            excluded: &[],
            limit: 10,
        };

        assert_eq!(filter.apply(candidates(&[1, 2]), &HashMap::new()).len(), 2);
    }

    #[test]
    fn price_range_drops_outliers_but_keeps_unpriced() {
        let owned = HashSet::new();
        let filter = PostFilter {
            owned: &owned,
            exclude_owned: false,
            price_range: Some(PriceRange::new(Some(50.0), Some(100.0))),
            excluded: &[],
            limit: 10,
        };

        let prices: HashMap<ProductId, f64> =
            [(id(1), 75.0), (id(2), 150.0)].into_iter().collect();
        let kept = filter.apply(candidates(&[1, 2, 3]), &prices);
        let ids: Vec<ProductId> = kept.iter().map(|c| c.product_id).collect();
        assert_eq!(ids, vec![id(1), id(3)]);
    }

    #[test]
    fn explicit_exclusions_and_limit_apply_last() {
        let owned = HashSet::new();
        let excluded = [id(2)];
        let filter = PostFilter {
            owned: &owned,
            exclude_owned: false,
            price_range: None,
            excluded: &excluded,
            limit: 2,
        };

        let kept = filter.apply(candidates(&[1, 2, 3, 4]), &HashMap::new());
        let ids: Vec<ProductId> = kept.iter().map(|c| c.product_id).collect();
        assert_eq!(ids, vec![id(1), id(3)]);
    }
}
