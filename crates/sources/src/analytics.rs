//! Log-backed analytics sink

use async_trait::async_trait;
use tracing::info;

use reko_core::{AnalyticsSink, RecommendationEvent, RetrievalError};

/// Emits recommendation events as structured log lines.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAnalyticsSink;

#[async_trait]
impl AnalyticsSink for TracingAnalyticsSink {
    async fn log_recommendation(&self, event: RecommendationEvent) -> Result<(), RetrievalError> {
        info!(
            customer_id = %event.customer_id,
            recommendation_type = %event.recommendation_type,
            context = %event.context,
            served = event.product_ids.len(),
            session_id = %event.session_id,
            "recommendation event"
        );
        Ok(())
    }
}
