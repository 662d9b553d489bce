//! Customer profile model
//!
//! Loaded once per fusion request and read-only for the duration of the
//! pipeline.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::product::ProductId;

/// Opaque customer identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive price range preference or filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Both bounds are inclusive; a missing bound is unbounded.
    pub fn contains(&self, price: f64) -> bool {
        if let Some(min) = self.min {
            if price < min {
                return false;
            }
        }
        if let Some(max) = self.max {
            if price > max {
                return false;
            }
        }
        true
    }

    pub fn is_bounded(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

/// One line of purchase history, ordered oldest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub product_id: ProductId,
    pub category: String,
    pub unit_price: f64,
    pub quantity: u32,
    pub purchased_at: DateTime<Utc>,
}

/// Kind of recent activity event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    View,
    Search,
    CartAdd,
    Purchase,
}

/// A recent behavioral event, ordered oldest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    pub product_id: Option<ProductId>,
    pub search_text: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Customer data consumed by candidate sources and the explanation prompt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub id: CustomerId,
    pub total_spend: f64,
    pub order_count: u32,
    pub premium: bool,
    /// Preferred category identifiers; order irrelevant.
    pub preferred_categories: BTreeSet<String>,
    pub preferred_brands: Vec<String>,
    pub lifestyle_tags: Vec<String>,
    pub price_preference: Option<PriceRange>,
    pub purchases: Vec<PurchaseRecord>,
    pub recent_activity: Vec<ActivityEvent>,
}

impl CustomerProfile {
    /// Products the customer already owns, derived from purchase history.
    pub fn owned_products(&self) -> HashSet<ProductId> {
        self.purchases.iter().map(|purchase| purchase.product_id).collect()
    }

    /// Most recent search text, if any, newest first.
    pub fn last_search(&self) -> Option<&str> {
        self.recent_activity
            .iter()
            .rev()
            .filter(|event| event.kind == ActivityKind::Search)
            .find_map(|event| event.search_text.as_deref())
    }
}
