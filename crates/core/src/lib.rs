//! Recommendation fusion engine
//!
//! `reko-core` fuses candidates from several independent retrieval
//! strategies (semantic text search, vector similarity, knowledge-base
//! lookup, collaborative filtering) into one ranked, deduplicated,
//! filtered list of product recommendations, optionally enriched with
//! generated explanations.
//!
//! The engine owns no transport and no storage: every collaborator
//! (profile provider, candidate sources, catalog, text generator,
//! analytics sink) is injected through the traits in [`providers`].

pub mod config;
pub mod domain;
pub mod enrich;
pub mod errors;
pub mod extract;
pub mod fusion;
pub mod providers;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions};
pub use domain::customer::{ActivityEvent, ActivityKind, CustomerId, CustomerProfile, PriceRange, PurchaseRecord};
pub use domain::product::{ProductId, ProductRecord};
pub use errors::{FusionError, RetrievalError};
pub use fusion::{
    Candidate, FusionEngine, FusionRequest, FusionResult, Recommendation, RecommendationType,
    StageTimings, Strategy, StrategyOutcome, StrategySet,
};
pub use providers::{
    AnalyticsSink, CandidateSource, Catalog, ProfileProvider, RecommendationEvent, SourceQuery,
    TextGenerator,
};
