//! In-memory profile store

use std::collections::HashMap;

use async_trait::async_trait;

use reko_core::{CustomerId, CustomerProfile, ProfileProvider, RetrievalError};

use crate::seeds;

#[derive(Clone, Debug, Default)]
pub struct InMemoryProfileProvider {
    profiles: HashMap<CustomerId, CustomerProfile>,
}

impl InMemoryProfileProvider {
    /// Provider preloaded with the seed customers.
    pub fn with_seed_data() -> Self {
        let mut provider = Self::default();
        for profile in seeds::customers() {
            provider.insert(profile);
        }
        provider
    }

    pub fn insert(&mut self, profile: CustomerProfile) {
        self.profiles.insert(profile.id.clone(), profile);
    }
}

#[async_trait]
impl ProfileProvider for InMemoryProfileProvider {
    async fn get_profile(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<CustomerProfile>, RetrievalError> {
        Ok(self.profiles.get(customer_id).cloned())
    }
}
