//! Types for the fusion pipeline

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::customer::{CustomerId, PriceRange};
use crate::domain::product::ProductId;
use crate::errors::RetrievalError;

/// Which strategies a request fans out to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    Semantic,
    Vector,
    KnowledgeBased,
    Collaborative,
    Hybrid,
}

impl RecommendationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Semantic => "semantic",
            Self::Vector => "vector",
            Self::KnowledgeBased => "knowledge_based",
            Self::Collaborative => "collaborative",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for RecommendationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecommendationType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "semantic" => Ok(Self::Semantic),
            "vector" => Ok(Self::Vector),
            "knowledge" | "knowledge_based" | "knowledge-based" => Ok(Self::KnowledgeBased),
            "collaborative" => Ok(Self::Collaborative),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(format!(
                "unsupported recommendation type `{other}` (expected semantic|vector|knowledge_based|collaborative|hybrid)"
            )),
        }
    }
}

/// Closed set of retrieval strategies. Order of [`Strategy::PRIORITY`] is
/// the merge priority: on duplicate product identifiers the earlier
/// strategy wins entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Semantic,
    Vector,
    KnowledgeBased,
    Collaborative,
}

impl Strategy {
    pub const PRIORITY: [Strategy; 4] =
        [Self::Semantic, Self::Vector, Self::KnowledgeBased, Self::Collaborative];

    /// Fixed weight applied to this strategy's scores in a hybrid merge.
    pub fn hybrid_weight(self) -> f64 {
        match self {
            Self::Semantic => 0.4,
            Self::Vector => 0.3,
            Self::KnowledgeBased => 0.2,
            Self::Collaborative => 0.1,
        }
    }

    /// Position in the merge priority order; lower wins.
    pub fn priority(self) -> usize {
        Self::PRIORITY.iter().position(|candidate| *candidate == self).unwrap_or(usize::MAX)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Semantic => "semantic",
            Self::Vector => "vector",
            Self::KnowledgeBased => "knowledge_based",
            Self::Collaborative => "collaborative",
        }
    }

    /// Reason text used before (or without) explanation enrichment.
    pub fn default_reason(self) -> &'static str {
        match self {
            Self::Semantic => "Matches what you searched for",
            Self::Vector => "Similar to a product you were looking at",
            Self::KnowledgeBased => "Recommended for your profile and interests",
            Self::Collaborative => "Customers with similar purchases chose this",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scored product reference produced by one retrieval strategy, before
/// merging.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub product_id: ProductId,
    /// Strategy-native scale; not comparable across strategies.
    pub raw_score: f64,
    /// In `[0, 1]` after normalization, comparable within one batch.
    pub normalized_score: f64,
    pub strategy: Strategy,
    pub matched_criteria: Vec<String>,
    /// Provenance key for diversity grouping, typically the index or
    /// partition the candidate came from.
    pub source_key: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl Candidate {
    pub fn new(product_id: ProductId, raw_score: f64, strategy: Strategy) -> Self {
        Self {
            product_id,
            raw_score,
            normalized_score: 0.0,
            strategy,
            matched_criteria: Vec::new(),
            source_key: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_criteria(mut self, criteria: Vec<String>) -> Self {
        self.matched_criteria = criteria;
        self
    }

    pub fn with_source_key(mut self, key: impl Into<String>) -> Self {
        self.source_key = Some(key.into());
        self
    }

    /// Diversity grouping key: the source key, or a stable prefix of the
    /// product identifier when absent.
    pub fn provenance_key(&self) -> String {
        self.source_key.clone().unwrap_or_else(|| self.product_id.prefix())
    }

    /// Text the lexical reranker matches query terms against.
    pub fn indexed_text(&self) -> String {
        let mut parts: Vec<&str> =
            self.matched_criteria.iter().map(String::as_str).collect();
        parts.extend(self.metadata.values().map(String::as_str));
        parts.join(" ").to_ascii_lowercase()
    }
}

/// One fusion request; self-contained and stateless.
#[derive(Clone, Debug)]
pub struct FusionRequest {
    pub customer_id: CustomerId,
    pub recommendation_type: RecommendationType,
    /// Free-form tag used for prompt and retrieval context selection.
    pub context: String,
    pub query_text: Option<String>,
    pub anchor_product: Option<ProductId>,
    pub category: Option<String>,
    pub price_range: Option<PriceRange>,
    pub limit: usize,
    pub exclude_owned: bool,
    pub with_explanations: bool,
}

impl FusionRequest {
    pub fn new(customer_id: impl Into<String>, recommendation_type: RecommendationType) -> Self {
        Self {
            customer_id: CustomerId::new(customer_id),
            recommendation_type,
            context: "general".to_owned(),
            query_text: None,
            anchor_product: None,
            category: None,
            price_range: None,
            limit: super::DEFAULT_LIMIT,
            exclude_owned: true,
            with_explanations: false,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query_text = Some(query.into());
        self
    }

    pub fn with_anchor(mut self, anchor: ProductId) -> Self {
        self.anchor_product = Some(anchor);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_price_range(mut self, range: PriceRange) -> Self {
        self.price_range = Some(range);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_exclude_owned(mut self, exclude: bool) -> Self {
        self.exclude_owned = exclude;
        self
    }

    pub fn with_explanations(mut self, enabled: bool) -> Self {
        self.with_explanations = enabled;
        self
    }

    /// Requested limit clamped to `[1, MAX_LIMIT]`.
    pub fn clamped_limit(&self) -> usize {
        self.limit.clamp(1, super::MAX_LIMIT)
    }
}

/// Result of one strategy dispatch. Degradation is explicit so callers can
/// assert on graceful-degradation paths without scraping logs.
#[derive(Clone, Debug)]
pub struct StrategyOutcome {
    pub strategy: Strategy,
    pub candidates: Vec<Candidate>,
    pub degraded: bool,
    pub cause: Option<RetrievalError>,
}

impl StrategyOutcome {
    pub fn succeeded(strategy: Strategy, candidates: Vec<Candidate>) -> Self {
        Self { strategy, candidates, degraded: false, cause: None }
    }

    pub fn degraded(strategy: Strategy, cause: RetrievalError) -> Self {
        Self { strategy, candidates: Vec::new(), degraded: true, cause: Some(cause) }
    }
}

/// One enriched, ranked recommendation in the final output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub brand: Option<String>,
    pub price: f64,
    /// Final fused score in `[0, 1]`.
    pub score: f64,
    /// Coarse confidence tier, one of 0.4 / 0.6 / 0.8 / 0.95.
    pub confidence: f64,
    pub reason: String,
    pub strategy: Strategy,
    pub matched_criteria: Vec<String>,
}

/// Per-stage wall-clock breakdown in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTimings {
    pub retrieval_ms: u64,
    pub merge_ms: u64,
    pub filter_ms: u64,
    pub enrichment_ms: u64,
    pub total_ms: u64,
}

/// Final output of one fusion request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FusionResult {
    pub recommendations: Vec<Recommendation>,
    /// Strategies actually dispatched for this request, in priority order.
    pub strategies_used: Vec<Strategy>,
    /// Subset of `strategies_used` that errored or timed out.
    pub degraded_strategies: Vec<Strategy>,
    /// Candidates seen across all strategies before dedup and filtering.
    pub candidates_seen: usize,
    /// Overall confidence tier for the set; 0.0 when empty.
    pub confidence: f64,
    /// Whether explanation enrichment was applied.
    pub enriched: bool,
    pub timings: StageTimings,
    pub session_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_order_matches_hybrid_weights() {
        let weights: Vec<f64> =
            Strategy::PRIORITY.iter().map(|strategy| strategy.hybrid_weight()).collect();
        assert_eq!(weights, vec![0.4, 0.3, 0.2, 0.1]);
        assert!(Strategy::Semantic.priority() < Strategy::Collaborative.priority());
    }

    #[test]
    fn limit_clamps_to_valid_range() {
        let request = FusionRequest::new("c1", RecommendationType::Hybrid).with_limit(0);
        assert_eq!(request.clamped_limit(), 1);
        let request = FusionRequest::new("c1", RecommendationType::Hybrid).with_limit(500);
        assert_eq!(request.clamped_limit(), super::super::MAX_LIMIT);
        let request = FusionRequest::new("c1", RecommendationType::Hybrid);
        assert_eq!(request.clamped_limit(), super::super::DEFAULT_LIMIT);
    }

    #[test]
    fn provenance_key_falls_back_to_id_prefix() {
        let id = ProductId(uuid::Uuid::from_u128(0xabcd_ef01_0000_0000_0000_0000_0000_0000));
        let tagged = Candidate::new(id, 0.5, Strategy::Semantic).with_source_key("outdoor");
        assert_eq!(tagged.provenance_key(), "outdoor");
        let untagged = Candidate::new(id, 0.5, Strategy::Semantic);
        assert_eq!(untagged.provenance_key(), id.prefix());
    }

    #[test]
    fn recommendation_type_parses_aliases() {
        assert_eq!("knowledge-based".parse(), Ok(RecommendationType::KnowledgeBased));
        assert_eq!("HYBRID".parse(), Ok(RecommendationType::Hybrid));
        assert!("prophetic".parse::<RecommendationType>().is_err());
    }
}
