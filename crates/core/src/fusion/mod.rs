//! Multi-strategy recommendation fusion
//!
//! Pipeline: dispatch the candidate sources selected by the request's
//! recommendation type, normalize each batch, rerank the semantic batch
//! against the query, merge in strategy-priority order with first-seen
//! dedup, spread across provenance keys, post-filter, and optionally
//! attach generated explanations.

mod diversity;
mod engine;
mod filter;
mod merge;
mod scoring;
mod types;

pub use diversity::select_diverse;
pub use engine::{EngineOptions, FusionEngine, StrategySet};
pub use filter::PostFilter;
pub use merge::{merge_outcomes, sort_by_score};
pub use scoring::{bucketize_confidence, normalize_scores, rerank_by_query};
pub use types::{
    Candidate, FusionRequest, FusionResult, Recommendation, RecommendationType, StageTimings,
    Strategy, StrategyOutcome,
};

/// Default result limit when a request does not set one.
pub const DEFAULT_LIMIT: usize = 10;

/// Hard cap on the requested result limit.
pub const MAX_LIMIT: usize = 100;

/// Raw-score spread below which a batch is treated as flat and passed
/// through normalization unchanged.
pub const MIN_SCORE_SPREAD: f64 = 0.01;
