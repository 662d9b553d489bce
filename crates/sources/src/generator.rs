//! Canned text generator
//!
//! Stands in for a hosted language model. Scans the prompt for product
//! identifiers and answers with a fenced JSON array of explanations, the
//! shape the enrichment stage parses. Prompts without identifiers get a
//! prose reply, which exercises the degradation path.

use async_trait::async_trait;
use serde_json::json;

use reko_core::extract::extract_product_ids;
use reko_core::{RetrievalError, TextGenerator};

use crate::seeds;

const REASONS: &[&str] = &[
    "A dependable companion for the gear you already use",
    "Frequently chosen by customers with a similar setup",
    "Fills a gap in your current kit",
    "A solid match for your recent activity",
];

#[derive(Clone, Copy, Debug, Default)]
pub struct CannedTextGenerator;

#[async_trait]
impl TextGenerator for CannedTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, RetrievalError> {
        let ids = extract_product_ids(prompt);
        if ids.is_empty() {
            return Ok("I could not find any products to talk about in that request.".to_owned());
        }

        let entries: Vec<serde_json::Value> = ids
            .iter()
            .enumerate()
            .map(|(index, id)| {
                let reason = match seeds::find_product(*id) {
                    Some(product) => {
                        format!("{} rounds out your {} gear", product.name, product.category)
                    }
                    None => REASONS[index % REASONS.len()].to_owned(),
                };
                json!({
                    "product_id": id.to_string(),
                    "reason": reason,
                    "confidence": 0.9 - 0.05 * index as f64,
                })
            })
            .collect();

        Ok(format!("```json\n{}\n```", serde_json::Value::Array(entries)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_with_fenced_json_for_known_products() {
        let prompt = format!("Candidates:\n- {}: Alpine 2P Tent\n", seeds::ALPINE_TENT);
        let reply = CannedTextGenerator.generate(&prompt).await.unwrap();
        assert!(reply.starts_with("```json"));
        assert!(reply.contains("Alpine 2P Tent rounds out your camping gear"));
    }

    #[tokio::test]
    async fn replies_with_prose_when_no_identifiers_present() {
        let reply = CannedTextGenerator.generate("hello there").await.unwrap();
        assert!(!reply.contains('['));
    }
}
