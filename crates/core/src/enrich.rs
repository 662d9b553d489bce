//! Explanation enrichment
//!
//! Best-effort enhancement: a single text-generation call after
//! filtering, merged back onto the ranked recommendations by product
//! identifier. Malformed replies, timeouts, and generator failures all
//! degrade to the pre-enrichment recommendations unchanged.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::customer::CustomerProfile;
use crate::extract::{bracket_slice, parse_canonical, strip_code_fence};
use crate::fusion::Recommendation;
use crate::providers::TextGenerator;

/// Outcome of the enrichment stage.
#[derive(Clone, Debug)]
pub struct EnrichmentOutcome {
    pub recommendations: Vec<Recommendation>,
    pub enriched: bool,
}

impl EnrichmentOutcome {
    fn unchanged(recommendations: Vec<Recommendation>) -> Self {
        Self { recommendations, enriched: false }
    }
}

/// One per-candidate entry in a well-formed generator reply.
#[derive(Debug, Deserialize)]
struct ExplanationEntry {
    product_id: String,
    reason: String,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Asks the generator for per-candidate reasons and optional confidence
/// overrides, bounded by `timeout`.
pub async fn enrich_with_explanations(
    recommendations: Vec<Recommendation>,
    profile: &CustomerProfile,
    context: &str,
    generator: &dyn TextGenerator,
    timeout: Duration,
) -> EnrichmentOutcome {
    if recommendations.is_empty() {
        return EnrichmentOutcome::unchanged(recommendations);
    }

    let prompt = build_prompt(profile, context, &recommendations);
    let reply = match tokio::time::timeout(timeout, generator.generate(&prompt)).await {
        Ok(Ok(reply)) => reply,
        Ok(Err(error)) => {
            warn!(error = %error, "explanation generator failed; keeping original reasons");
            return EnrichmentOutcome::unchanged(recommendations);
        }
        Err(_) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "explanation generation timed out");
            return EnrichmentOutcome::unchanged(recommendations);
        }
    };

    match parse_reply(&reply) {
        Some(entries) if !entries.is_empty() => {
            EnrichmentOutcome { recommendations: apply(recommendations, entries), enriched: true }
        }
        _ => {
            debug!("generator reply held no structured explanations; keeping originals");
            EnrichmentOutcome::unchanged(recommendations)
        }
    }
}

/// Natural-language prompt embedding a profile summary, the request
/// context, and per-candidate product facts.
fn build_prompt(
    profile: &CustomerProfile,
    context: &str,
    recommendations: &[Recommendation],
) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are explaining product recommendations to a shopper.\n\n");
    prompt.push_str(&format!("Customer: {}\n", profile_summary(profile)));
    prompt.push_str(&format!("Shopping context: {context}\n\nCandidates:\n"));

    for recommendation in recommendations {
        prompt.push_str(&format!(
            "- {}: {} ({}, ${:.2})\n",
            recommendation.product_id,
            recommendation.name,
            recommendation.category,
            recommendation.price,
        ));
    }

    prompt.push_str(
        "\nReply with a JSON array only. Each element: {\"product_id\": \"<id>\", \
         \"reason\": \"<one sentence>\", \"confidence\": <0.0-1.0>}.\n",
    );
    prompt
}

fn profile_summary(profile: &CustomerProfile) -> String {
    let tier = if profile.premium { "premium" } else { "standard" };
    let mut summary = format!(
        "{tier} customer, {} orders, ${:.0} lifetime spend",
        profile.order_count, profile.total_spend
    );
    if !profile.preferred_categories.is_empty() {
        let categories: Vec<&str> =
            profile.preferred_categories.iter().map(String::as_str).collect();
        summary.push_str(&format!(", prefers {}", categories.join("/")));
    }
    if !profile.lifestyle_tags.is_empty() {
        summary.push_str(&format!(", lifestyle: {}", profile.lifestyle_tags.join(", ")));
    }
    if let Some(search) = profile.last_search() {
        summary.push_str(&format!(", recently searched \"{search}\""));
    }
    summary
}

/// Strict-schema parse of the generator reply; `None` on anything that is
/// not a JSON array of explanation entries.
fn parse_reply(reply: &str) -> Option<Vec<ExplanationEntry>> {
    let body = strip_code_fence(reply).unwrap_or(reply);
    let slice = bracket_slice(body)?;
    serde_json::from_str(slice).ok()
}

/// Merges entries onto matching recommendations by identifier; unmatched
/// recommendations keep their pre-enrichment reason and confidence.
fn apply(
    mut recommendations: Vec<Recommendation>,
    entries: Vec<ExplanationEntry>,
) -> Vec<Recommendation> {
    for entry in entries {
        let Some(product_id) = parse_canonical(&entry.product_id) else {
            continue;
        };
        if let Some(target) =
            recommendations.iter_mut().find(|candidate| candidate.product_id == product_id)
        {
            if !entry.reason.trim().is_empty() {
                target.reason = entry.reason.trim().to_owned();
            }
            if let Some(confidence) = entry.confidence {
                if confidence.is_finite() {
                    target.confidence = confidence.clamp(0.0, 1.0);
                }
            }
        }
    }
    recommendations
}
