use clap::Args;
use uuid::Uuid;

use reko_core::config::AppConfig;
use reko_core::fusion::EngineOptions;
use reko_core::{
    FusionError, FusionRequest, FusionResult, PriceRange, ProductId, RecommendationType,
};
use reko_sources::reference_engine;

use super::CommandResult;

#[derive(Debug, Args)]
pub struct RecommendArgs {
    #[arg(help = "Customer identifier (seeded: ava, ben, cora)")]
    pub customer: String,

    #[arg(
        long = "type",
        value_name = "TYPE",
        default_value = "hybrid",
        help = "semantic | vector | knowledge_based | collaborative | hybrid"
    )]
    pub recommendation_type: RecommendationType,

    #[arg(long, help = "Search text (required for --type semantic)")]
    pub query: Option<String>,

    #[arg(long, value_name = "UUID", help = "Anchor product (required for --type vector)")]
    pub anchor: Option<Uuid>,

    #[arg(long, help = "Restrict candidates to one category")]
    pub category: Option<String>,

    #[arg(long, value_name = "PRICE")]
    pub min_price: Option<f64>,

    #[arg(long, value_name = "PRICE")]
    pub max_price: Option<f64>,

    #[arg(long, help = "Maximum number of recommendations")]
    pub limit: Option<usize>,

    #[arg(long, default_value = "general", help = "Request context tag, e.g. homepage")]
    pub context: String,

    #[arg(long, help = "Allow products the customer already owns")]
    pub include_owned: bool,

    #[arg(long, help = "Attach generated explanations")]
    pub explain: bool,

    #[arg(long, help = "Emit the full result as JSON")]
    pub json: bool,
}

pub async fn run(args: RecommendArgs, config: &AppConfig) -> CommandResult {
    let engine = reference_engine(EngineOptions::from_config(config));

    let mut request = FusionRequest::new(args.customer.clone(), args.recommendation_type)
        .with_context(args.context.clone())
        .with_limit(args.limit.unwrap_or(config.fusion.default_limit))
        .with_exclude_owned(!args.include_owned)
        .with_explanations(args.explain);
    if let Some(query) = args.query {
        request = request.with_query(query);
    }
    if let Some(anchor) = args.anchor {
        request = request.with_anchor(ProductId(anchor));
    }
    if let Some(category) = args.category {
        request = request.with_category(category);
    }
    if args.min_price.is_some() || args.max_price.is_some() {
        request = request.with_price_range(PriceRange::new(args.min_price, args.max_price));
    }

    match engine.recommend(request).await {
        Ok(result) if args.json => match serde_json::to_string_pretty(&result) {
            Ok(rendered) => CommandResult::success(rendered),
            Err(error) => CommandResult::failure(format!("serialization failed: {error}"), 1),
        },
        Ok(result) => CommandResult::success(render_human(&args.customer, &result)),
        Err(error @ FusionError::InvalidRequest(_)) => CommandResult::failure(error.to_string(), 2),
        Err(error) => CommandResult::failure(error.to_string(), 1),
    }
}

fn render_human(customer: &str, result: &FusionResult) -> String {
    let mut lines = vec![format!(
        "{} recommendation(s) for {customer} (confidence {:.2}, {} candidates seen, {} ms)",
        result.recommendations.len(),
        result.confidence,
        result.candidates_seen,
        result.timings.total_ms,
    )];

    if !result.degraded_strategies.is_empty() {
        let degraded: Vec<&str> =
            result.degraded_strategies.iter().map(|strategy| strategy.as_str()).collect();
        lines.push(format!("degraded strategies: {}", degraded.join(", ")));
    }

    for (index, recommendation) in result.recommendations.iter().enumerate() {
        lines.push(format!(
            "{:>2}. {} — ${:.2} [{} | score {:.2}]",
            index + 1,
            recommendation.name,
            recommendation.price,
            recommendation.strategy,
            recommendation.score,
        ));
        lines.push(format!("    {}", recommendation.reason));
    }

    if result.recommendations.is_empty() {
        lines.push("no candidates survived retrieval and filtering".to_owned());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use reko_core::{Recommendation, StageTimings, Strategy};

    use super::*;

    #[test]
    fn human_rendering_lists_degraded_strategies() {
        let result = FusionResult {
            recommendations: vec![Recommendation {
                product_id: ProductId(Uuid::from_u128(1)),
                name: "Trail Runner 2".to_owned(),
                category: "footwear".to_owned(),
                brand: Some("Cairn".to_owned()),
                price: 129.99,
                score: 0.82,
                confidence: 0.95,
                reason: "Matches what you searched for".to_owned(),
                strategy: Strategy::Semantic,
                matched_criteria: vec!["trail".to_owned()],
            }],
            strategies_used: vec![Strategy::Semantic, Strategy::Collaborative],
            degraded_strategies: vec![Strategy::Collaborative],
            candidates_seen: 7,
            confidence: 0.8,
            enriched: false,
            timings: StageTimings::default(),
            session_id: Uuid::from_u128(42),
        };

        let rendered = render_human("ava", &result);
        assert!(rendered.contains("degraded strategies: collaborative"));
        assert!(rendered.contains("Trail Runner 2"));
        assert!(rendered.contains("score 0.82"));
    }

    #[test]
    fn empty_result_renders_a_note_instead_of_rows() {
        let result = FusionResult {
            recommendations: Vec::new(),
            strategies_used: Vec::new(),
            degraded_strategies: Vec::new(),
            candidates_seen: 0,
            confidence: 0.0,
            enriched: false,
            timings: StageTimings::default(),
            session_id: Uuid::from_u128(42),
        };
        assert!(render_human("ben", &result).contains("no candidates survived"));
    }
}
