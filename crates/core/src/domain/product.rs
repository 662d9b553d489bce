use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque product identifier, canonical hyphenated UUID form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub Uuid);

impl ProductId {
    /// Stable prefix of the hyphenated form, used as a diversity grouping
    /// key when a candidate carries no source key.
    pub fn prefix(&self) -> String {
        let full = self.0.to_string();
        full[..8].to_owned()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ProductId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// Catalog record used to hydrate final recommendations with display fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub brand: Option<String>,
    pub price: f64,
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_first_uuid_segment() {
        let id = ProductId(Uuid::from_u128(0x0102_0304_0506_0708_090a_0b0c_0d0e_0f10));
        assert_eq!(id.prefix(), "01020304");
    }
}
