//! Deterministic reference implementations of the fusion collaborators
//!
//! Everything in this crate is in-memory and seeded: a small outdoor
//! commerce catalog, three customers, static similarity neighborhoods,
//! and a canned text generator. The same request always produces the
//! same result, which makes the full pipeline testable and the CLI
//! usable without any backing services.

use std::sync::Arc;

use reko_core::fusion::EngineOptions;
use reko_core::{FusionEngine, StrategySet};

mod analytics;
mod catalog;
mod collaborative;
mod generator;
mod knowledge;
mod profiles;
pub mod seeds;
mod semantic;
mod vector;

pub use analytics::TracingAnalyticsSink;
pub use catalog::InMemoryCatalog;
pub use collaborative::CollaborativeSource;
pub use generator::CannedTextGenerator;
pub use knowledge::KnowledgeBaseSource;
pub use profiles::InMemoryProfileProvider;
pub use semantic::SemanticSearchSource;
pub use vector::VectorSimilaritySource;

/// One candidate source per strategy, all seeded.
pub fn reference_sources() -> StrategySet {
    StrategySet {
        semantic: Arc::new(SemanticSearchSource),
        vector: Arc::new(VectorSimilaritySource),
        knowledge_based: Arc::new(KnowledgeBaseSource),
        collaborative: Arc::new(CollaborativeSource),
    }
}

/// A fully seeded engine, ready to serve requests.
pub fn reference_engine(options: EngineOptions) -> FusionEngine {
    FusionEngine::new(
        Arc::new(InMemoryProfileProvider::with_seed_data()),
        reference_sources(),
        Arc::new(InMemoryCatalog::with_seed_data()),
        Arc::new(CannedTextGenerator),
        Arc::new(TracingAnalyticsSink),
        options,
    )
}
