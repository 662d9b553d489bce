//! Collaborator contracts
//!
//! The engine consumes results; how each collaborator is invoked over the
//! wire is out of scope. All implementations are injected once at engine
//! construction, never resolved at runtime.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::customer::{CustomerId, CustomerProfile, PriceRange};
use crate::domain::product::{ProductId, ProductRecord};
use crate::errors::RetrievalError;
use crate::fusion::{Candidate, RecommendationType};

/// Request-specific parameters handed to a candidate source. One query is
/// built per fusion request and shared by every dispatched strategy; each
/// strategy reads only the fields it needs.
#[derive(Clone, Debug)]
pub struct SourceQuery {
    pub customer: CustomerProfile,
    pub query_text: Option<String>,
    pub anchor: Option<ProductId>,
    pub category: Option<String>,
    pub price_range: Option<PriceRange>,
    pub context: String,
    pub limit: usize,
}

/// Read-only customer profile lookup.
#[async_trait]
pub trait ProfileProvider: Send + Sync {
    /// `Ok(None)` means the customer does not exist; errors mean the
    /// backing store is unreachable.
    async fn get_profile(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<CustomerProfile>, RetrievalError>;
}

/// One retrieval strategy. Implementations return raw, strategy-native
/// scores; normalization happens in the engine.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn retrieve(&self, query: &SourceQuery) -> Result<Vec<Candidate>, RetrievalError>;
}

/// Product display-field resolution for final output hydration.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Unknown identifiers are simply absent from the result.
    async fn resolve_by_ids(&self, ids: &[ProductId]) -> Vec<ProductRecord>;
}

/// Generative text model used for explanation enrichment.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, RetrievalError>;
}

/// Fire-and-forget recommendation event.
#[derive(Clone, Debug)]
pub struct RecommendationEvent {
    pub customer_id: CustomerId,
    pub recommendation_type: RecommendationType,
    pub context: String,
    pub product_ids: Vec<ProductId>,
    pub session_id: Uuid,
}

/// Analytics egress. Failures are logged by the engine, never surfaced.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn log_recommendation(&self, event: RecommendationEvent) -> Result<(), RetrievalError>;
}
