//! Fusion pipeline orchestration

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::domain::product::{ProductId, ProductRecord};
use crate::enrich;
use crate::errors::{FusionError, RetrievalError};
use crate::providers::{
    AnalyticsSink, CandidateSource, Catalog, ProfileProvider, RecommendationEvent, SourceQuery,
    TextGenerator,
};

use super::diversity::select_diverse;
use super::filter::PostFilter;
use super::merge::{merge_outcomes, sort_by_score};
use super::scoring::{bucketize_confidence, normalize_scores, rerank_by_query};
use super::types::{
    FusionRequest, FusionResult, Recommendation, RecommendationType, StageTimings, Strategy,
    StrategyOutcome,
};

/// Overfetch factor applied to the per-source limit so dedup and
/// filtering still leave enough candidates to fill the request.
const RETRIEVAL_HEADROOM: usize = 3;

/// Tunables resolved once at engine construction.
#[derive(Clone, Copy, Debug)]
pub struct EngineOptions {
    /// Per-strategy retrieval timeout.
    pub strategy_timeout: Duration,
    /// Timeout for the single explanation-generation call.
    pub enrichment_timeout: Duration,
    /// Run the diversity selector on the fused list. When off, only the
    /// semantic path diversifies (strategy-local, as originally built).
    pub diversify_after_merge: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            strategy_timeout: Duration::from_millis(2_000),
            enrichment_timeout: Duration::from_secs(15),
            diversify_after_merge: true,
        }
    }
}

impl EngineOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            strategy_timeout: Duration::from_millis(config.fusion.strategy_timeout_ms),
            enrichment_timeout: Duration::from_secs(config.llm.timeout_secs),
            diversify_after_merge: config.fusion.diversify_after_merge,
        }
    }
}

/// One candidate source per strategy variant, bound at construction.
#[derive(Clone)]
pub struct StrategySet {
    pub semantic: Arc<dyn CandidateSource>,
    pub vector: Arc<dyn CandidateSource>,
    pub knowledge_based: Arc<dyn CandidateSource>,
    pub collaborative: Arc<dyn CandidateSource>,
}

impl StrategySet {
    fn source(&self, strategy: Strategy) -> &Arc<dyn CandidateSource> {
        match strategy {
            Strategy::Semantic => &self.semantic,
            Strategy::Vector => &self.vector,
            Strategy::KnowledgeBased => &self.knowledge_based,
            Strategy::Collaborative => &self.collaborative,
        }
    }
}

/// The fusion engine. Stateless across requests; every collaborator is
/// injected and shared read-only.
pub struct FusionEngine {
    profiles: Arc<dyn ProfileProvider>,
    sources: StrategySet,
    catalog: Arc<dyn Catalog>,
    generator: Arc<dyn TextGenerator>,
    analytics: Arc<dyn AnalyticsSink>,
    options: EngineOptions,
}

impl FusionEngine {
    pub fn new(
        profiles: Arc<dyn ProfileProvider>,
        sources: StrategySet,
        catalog: Arc<dyn Catalog>,
        generator: Arc<dyn TextGenerator>,
        analytics: Arc<dyn AnalyticsSink>,
        options: EngineOptions,
    ) -> Self {
        Self { profiles, sources, catalog, generator, analytics, options }
    }

    /// Runs one fusion request end to end.
    ///
    /// Only invalid requests and unknown customer/anchor identifiers are
    /// rejected; every later stage degrades to a smaller but valid result.
    pub async fn recommend(&self, request: FusionRequest) -> Result<FusionResult, FusionError> {
        let started = Instant::now();
        validate_request(&request)?;

        let profile = self
            .profiles
            .get_profile(&request.customer_id)
            .await
            .map_err(|error| FusionError::ProfileUnavailable(error.to_string()))?
            .ok_or_else(|| FusionError::CustomerNotFound(request.customer_id.to_string()))?;

        if let Some(anchor) = request.anchor_product {
            if self.catalog.resolve_by_ids(&[anchor]).await.is_empty() {
                return Err(FusionError::AnchorNotFound(anchor));
            }
        }

        let limit = request.clamped_limit();
        let query = SourceQuery {
            customer: profile.clone(),
            query_text: request.query_text.clone(),
            anchor: request.anchor_product,
            category: request.category.clone(),
            price_range: request.price_range,
            context: request.context.clone(),
            limit: limit * RETRIEVAL_HEADROOM,
        };

        let retrieval_started = Instant::now();
        let outcomes = self.dispatch(request.recommendation_type, &query).await;
        let retrieval_ms = elapsed_ms(retrieval_started);

        let strategies_used: Vec<Strategy> =
            outcomes.iter().map(|outcome| outcome.strategy).collect();
        let degraded_strategies: Vec<Strategy> = outcomes
            .iter()
            .filter(|outcome| outcome.degraded)
            .map(|outcome| outcome.strategy)
            .collect();
        let candidates_seen: usize =
            outcomes.iter().map(|outcome| outcome.candidates.len()).sum();

        let merge_started = Instant::now();
        let weighted = request.recommendation_type == RecommendationType::Hybrid;
        let mut merged = merge_outcomes(outcomes, weighted);
        sort_by_score(&mut merged);

        let diversify = self.options.diversify_after_merge
            || request.recommendation_type == RecommendationType::Semantic;
        let selected = if diversify { select_diverse(merged, limit) } else { merged };
        let merge_ms = elapsed_ms(merge_started);

        let filter_started = Instant::now();
        let ids: Vec<ProductId> = selected.iter().map(|candidate| candidate.product_id).collect();
        let records: HashMap<ProductId, ProductRecord> = self
            .catalog
            .resolve_by_ids(&ids)
            .await
            .into_iter()
            .map(|record| (record.id, record))
            .collect();
        let prices: HashMap<ProductId, f64> =
            records.iter().map(|(id, record)| (*id, record.price)).collect();

        let owned = profile.owned_products();
        let excluded: Vec<ProductId> = request.anchor_product.into_iter().collect();
        let post_filter = PostFilter {
            owned: &owned,
            exclude_owned: request.exclude_owned,
            price_range: request.price_range,
            excluded: &excluded,
            limit,
        };
        let kept = post_filter.apply(selected, &prices);

        let mut recommendations: Vec<Recommendation> = kept
            .into_iter()
            .map(|candidate| {
                let record = records.get(&candidate.product_id);
                Recommendation {
                    product_id: candidate.product_id,
                    // Catalog misses keep identifier-only display data.
                    name: record
                        .map(|record| record.name.clone())
                        .unwrap_or_else(|| candidate.product_id.to_string()),
                    category: record
                        .map(|record| record.category.clone())
                        .unwrap_or_else(|| "uncategorized".to_owned()),
                    brand: record.and_then(|record| record.brand.clone()),
                    price: record.map(|record| record.price).unwrap_or(0.0),
                    score: candidate.normalized_score,
                    confidence: bucketize_confidence(candidate.normalized_score),
                    reason: candidate.strategy.default_reason().to_owned(),
                    strategy: candidate.strategy,
                    matched_criteria: candidate.matched_criteria,
                }
            })
            .collect();
        let filter_ms = elapsed_ms(filter_started);

        let enrichment_started = Instant::now();
        let mut enriched = false;
        if request.with_explanations && !recommendations.is_empty() {
            let outcome = enrich::enrich_with_explanations(
                recommendations,
                &profile,
                &request.context,
                self.generator.as_ref(),
                self.options.enrichment_timeout,
            )
            .await;
            recommendations = outcome.recommendations;
            enriched = outcome.enriched;
        }
        let enrichment_ms = elapsed_ms(enrichment_started);

        let confidence = overall_confidence(&recommendations);
        let session_id = Uuid::new_v4();
        self.log_analytics(&request, &recommendations, session_id);

        let result = FusionResult {
            recommendations,
            strategies_used,
            degraded_strategies,
            candidates_seen,
            confidence,
            enriched,
            timings: StageTimings {
                retrieval_ms,
                merge_ms,
                filter_ms,
                enrichment_ms,
                total_ms: elapsed_ms(started),
            },
            session_id,
        };

        info!(
            customer_id = %request.customer_id,
            recommendation_type = %request.recommendation_type,
            candidates_seen = result.candidates_seen,
            returned = result.recommendations.len(),
            degraded = result.degraded_strategies.len(),
            elapsed_ms = result.timings.total_ms,
            "fusion request complete"
        );

        Ok(result)
    }

    /// Runs the sources selected by the recommendation type. Hybrid
    /// requests fan out concurrently; the merge step is the barrier.
    async fn dispatch(
        &self,
        recommendation_type: RecommendationType,
        query: &SourceQuery,
    ) -> Vec<StrategyOutcome> {
        match recommendation_type {
            RecommendationType::Semantic => {
                vec![self.run_strategy(Strategy::Semantic, query).await]
            }
            RecommendationType::Vector => {
                vec![self.run_strategy(Strategy::Vector, query).await]
            }
            RecommendationType::KnowledgeBased => {
                vec![self.run_strategy(Strategy::KnowledgeBased, query).await]
            }
            RecommendationType::Collaborative => {
                vec![self.run_strategy(Strategy::Collaborative, query).await]
            }
            RecommendationType::Hybrid => self.fan_out(query).await,
        }
    }

    /// Hybrid fan-out: semantic only with a query, vector only with an
    /// anchor, knowledge-based and collaborative always attempted.
    async fn fan_out(&self, query: &SourceQuery) -> Vec<StrategyOutcome> {
        let semantic = async {
            match &query.query_text {
                Some(text) if !text.trim().is_empty() => {
                    Some(self.run_strategy(Strategy::Semantic, query).await)
                }
                _ => None,
            }
        };
        let vector = async {
            match query.anchor {
                Some(_) => Some(self.run_strategy(Strategy::Vector, query).await),
                None => None,
            }
        };
        let knowledge = async { Some(self.run_strategy(Strategy::KnowledgeBased, query).await) };
        let collaborative =
            async { Some(self.run_strategy(Strategy::Collaborative, query).await) };

        let (semantic, vector, knowledge, collaborative) =
            tokio::join!(semantic, vector, knowledge, collaborative);

        [semantic, vector, knowledge, collaborative].into_iter().flatten().collect()
    }

    /// One bounded strategy call. Errors and timeouts become degraded
    /// outcomes, never request failures.
    async fn run_strategy(&self, strategy: Strategy, query: &SourceQuery) -> StrategyOutcome {
        let source = self.sources.source(strategy);
        let timeout_ms = self.options.strategy_timeout.as_millis() as u64;

        match timeout(self.options.strategy_timeout, source.retrieve(query)).await {
            Ok(Ok(mut candidates)) => {
                normalize_scores(&mut candidates);
                if strategy == Strategy::Semantic {
                    if let Some(text) = &query.query_text {
                        rerank_by_query(&mut candidates, text);
                    }
                }
                debug!(strategy = %strategy, count = candidates.len(), "strategy retrieval complete");
                StrategyOutcome::succeeded(strategy, candidates)
            }
            Ok(Err(error)) => {
                warn!(strategy = %strategy, error = %error, "candidate source degraded to empty");
                StrategyOutcome::degraded(strategy, error)
            }
            Err(_) => {
                let error = RetrievalError::timeout(strategy.as_str(), timeout_ms);
                warn!(strategy = %strategy, timeout_ms, "candidate source timed out");
                StrategyOutcome::degraded(strategy, error)
            }
        }
    }

    /// Fire-and-forget analytics; failures are logged, never surfaced.
    fn log_analytics(
        &self,
        request: &FusionRequest,
        recommendations: &[Recommendation],
        session_id: Uuid,
    ) {
        let event = RecommendationEvent {
            customer_id: request.customer_id.clone(),
            recommendation_type: request.recommendation_type,
            context: request.context.clone(),
            product_ids: recommendations.iter().map(|r| r.product_id).collect(),
            session_id,
        };
        let sink = Arc::clone(&self.analytics);
        tokio::spawn(async move {
            if let Err(error) = sink.log_recommendation(event).await {
                warn!(error = %error, "analytics sink rejected recommendation event");
            }
        });
    }
}

fn validate_request(request: &FusionRequest) -> Result<(), FusionError> {
    match request.recommendation_type {
        RecommendationType::Semantic => {
            let missing = request
                .query_text
                .as_deref()
                .map(|text| text.trim().is_empty())
                .unwrap_or(true);
            if missing {
                return Err(FusionError::InvalidRequest(
                    "query text is required for semantic recommendations".to_owned(),
                ));
            }
        }
        RecommendationType::Vector => {
            if request.anchor_product.is_none() {
                return Err(FusionError::InvalidRequest(
                    "an anchor product is required for vector recommendations".to_owned(),
                ));
            }
        }
        _ => {}
    }
    Ok(())
}

fn overall_confidence(recommendations: &[Recommendation]) -> f64 {
    if recommendations.is_empty() {
        return 0.0;
    }
    let average = recommendations.iter().map(|r| r.score).sum::<f64>()
        / recommendations.len() as f64;
    bucketize_confidence(average)
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semantic_request_requires_query_text() {
        let request = FusionRequest::new("c1", RecommendationType::Semantic);
        assert!(matches!(validate_request(&request), Err(FusionError::InvalidRequest(_))));

        let request = request.with_query("   ");
        assert!(matches!(validate_request(&request), Err(FusionError::InvalidRequest(_))));

        let request =
            FusionRequest::new("c1", RecommendationType::Semantic).with_query("trail shoes");
        assert!(validate_request(&request).is_ok());
    }

    #[test]
    fn vector_request_requires_anchor() {
        let request = FusionRequest::new("c1", RecommendationType::Vector);
        assert!(matches!(validate_request(&request), Err(FusionError::InvalidRequest(_))));
    }

    #[test]
    fn hybrid_request_needs_neither_field() {
        let request = FusionRequest::new("c1", RecommendationType::Hybrid);
        assert!(validate_request(&request).is_ok());
    }

    #[test]
    fn empty_set_has_zero_confidence() {
        assert_eq!(overall_confidence(&[]), 0.0);
    }
}
