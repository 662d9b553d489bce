//! In-memory product catalog

use std::collections::HashMap;

use async_trait::async_trait;

use reko_core::{Catalog, ProductId, ProductRecord};

use crate::seeds;

#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalog {
    records: HashMap<ProductId, ProductRecord>,
}

impl InMemoryCatalog {
    /// Catalog preloaded with the seed products.
    pub fn with_seed_data() -> Self {
        let mut catalog = Self::default();
        for product in seeds::PRODUCTS {
            catalog.insert(product.record());
        }
        catalog
    }

    pub fn insert(&mut self, record: ProductRecord) {
        self.records.insert(record.id, record);
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn resolve_by_ids(&self, ids: &[ProductId]) -> Vec<ProductRecord> {
        // Inactive products are treated as missing.
        ids.iter()
            .filter_map(|id| self.records.get(id))
            .filter(|record| record.active)
            .cloned()
            .collect()
    }
}
