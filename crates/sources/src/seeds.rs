//! Seed dataset
//!
//! A small outdoor-and-lifestyle commerce catalog with three customers,
//! fixed identifiers, and fixed timestamps. Everything here is
//! deterministic so the reference stack produces the same output on
//! every run.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use reko_core::{
    ActivityEvent, ActivityKind, CustomerId, CustomerProfile, PriceRange, ProductId,
    ProductRecord, PurchaseRecord,
};

pub const TRAIL_RUNNERS: ProductId =
    ProductId(Uuid::from_u128(0x1a2b_3c4d_5e6f_4a01_8b01_aa11_bb22_cc01));
pub const HIKING_BOOTS: ProductId =
    ProductId(Uuid::from_u128(0x1a2b_3c4d_5e6f_4a02_8b02_aa11_bb22_cc02));
pub const RAIN_JACKET: ProductId =
    ProductId(Uuid::from_u128(0x1a2b_3c4d_5e6f_4a03_8b03_aa11_bb22_cc03));
pub const FLEECE_PULLOVER: ProductId =
    ProductId(Uuid::from_u128(0x1a2b_3c4d_5e6f_4a04_8b04_aa11_bb22_cc04));
pub const ALPINE_TENT: ProductId =
    ProductId(Uuid::from_u128(0x1a2b_3c4d_5e6f_4a05_8b05_aa11_bb22_cc05));
pub const SLEEPING_BAG: ProductId =
    ProductId(Uuid::from_u128(0x1a2b_3c4d_5e6f_4a06_8b06_aa11_bb22_cc06));
pub const HEADLAMP: ProductId =
    ProductId(Uuid::from_u128(0x1a2b_3c4d_5e6f_4a07_8b07_aa11_bb22_cc07));
pub const WATER_BOTTLE: ProductId =
    ProductId(Uuid::from_u128(0x1a2b_3c4d_5e6f_4a08_8b08_aa11_bb22_cc08));
pub const TREKKING_POLES: ProductId =
    ProductId(Uuid::from_u128(0x1a2b_3c4d_5e6f_4a09_8b09_aa11_bb22_cc09));
pub const YOGA_MAT: ProductId =
    ProductId(Uuid::from_u128(0x1a2b_3c4d_5e6f_4a0a_8b0a_aa11_bb22_cc0a));
pub const CAMP_STOVE: ProductId =
    ProductId(Uuid::from_u128(0x1a2b_3c4d_5e6f_4a0b_8b0b_aa11_bb22_cc0b));
pub const WOOL_SOCKS: ProductId =
    ProductId(Uuid::from_u128(0x1a2b_3c4d_5e6f_4a0c_8b0c_aa11_bb22_cc0c));
pub const DAYPACK: ProductId =
    ProductId(Uuid::from_u128(0x1a2b_3c4d_5e6f_4a0d_8b0d_aa11_bb22_cc0d));
pub const COFFEE_PRESS: ProductId =
    ProductId(Uuid::from_u128(0x1a2b_3c4d_5e6f_4a0e_8b0e_aa11_bb22_cc0e));

/// One seeded catalog entry plus the search tags the semantic source
/// indexes; the catalog trait only sees the [`ProductRecord`] view.
pub struct SeedProduct {
    pub id: ProductId,
    pub name: &'static str,
    pub category: &'static str,
    pub brand: Option<&'static str>,
    pub price: f64,
    pub tags: &'static [&'static str],
}

impl SeedProduct {
    pub fn record(&self) -> ProductRecord {
        ProductRecord {
            id: self.id,
            name: self.name.to_owned(),
            category: self.category.to_owned(),
            brand: self.brand.map(str::to_owned),
            price: self.price,
            active: true,
        }
    }

    /// Lowercased name, category, brand, and tags joined for matching.
    pub fn searchable_text(&self) -> String {
        let mut parts = vec![self.name.to_owned(), self.category.to_owned()];
        if let Some(brand) = self.brand {
            parts.push(brand.to_owned());
        }
        parts.extend(self.tags.iter().map(|tag| (*tag).to_owned()));
        parts.join(" ").to_ascii_lowercase()
    }
}

pub const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        id: TRAIL_RUNNERS,
        name: "Trail Runner 2",
        category: "footwear",
        brand: Some("Cairn"),
        price: 129.99,
        tags: &["trail", "running", "shoes", "grip", "lightweight"],
    },
    SeedProduct {
        id: HIKING_BOOTS,
        name: "Ridgeline Hiking Boots",
        category: "footwear",
        brand: Some("Cairn"),
        price: 179.99,
        tags: &["hiking", "boots", "waterproof", "ankle", "support"],
    },
    SeedProduct {
        id: RAIN_JACKET,
        name: "Stormshell Rain Jacket",
        category: "apparel",
        brand: Some("NorthCrag"),
        price: 149.50,
        tags: &["rain", "jacket", "waterproof", "shell", "hiking"],
    },
    SeedProduct {
        id: FLEECE_PULLOVER,
        name: "Basecamp Fleece Pullover",
        category: "apparel",
        brand: Some("NorthCrag"),
        price: 79.00,
        tags: &["fleece", "warm", "layer", "casual"],
    },
    SeedProduct {
        id: ALPINE_TENT,
        name: "Alpine 2P Tent",
        category: "camping",
        brand: Some("Tundra"),
        price: 289.00,
        tags: &["tent", "camping", "backpacking", "ultralight", "two-person"],
    },
    SeedProduct {
        id: SLEEPING_BAG,
        name: "Cocoon 15 Sleeping Bag",
        category: "camping",
        brand: Some("Tundra"),
        price: 199.00,
        tags: &["sleeping", "bag", "camping", "down", "cold-weather"],
    },
    SeedProduct {
        id: HEADLAMP,
        name: "Lumen Headlamp",
        category: "accessories",
        brand: Some("Spark"),
        price: 39.95,
        tags: &["headlamp", "light", "camping", "running", "night"],
    },
    SeedProduct {
        id: WATER_BOTTLE,
        name: "Cascade Insulated Bottle",
        category: "accessories",
        brand: Some("Spark"),
        price: 24.50,
        tags: &["water", "bottle", "insulated", "hydration"],
    },
    SeedProduct {
        id: TREKKING_POLES,
        name: "Summit Trekking Poles",
        category: "accessories",
        brand: Some("Cairn"),
        price: 89.00,
        tags: &["trekking", "poles", "hiking", "carbon"],
    },
    SeedProduct {
        id: YOGA_MAT,
        name: "Flow Yoga Mat",
        category: "fitness",
        brand: None,
        price: 45.00,
        tags: &["yoga", "mat", "fitness", "studio"],
    },
    SeedProduct {
        id: CAMP_STOVE,
        name: "Ember Camp Stove",
        category: "camping",
        brand: Some("Tundra"),
        price: 64.99,
        tags: &["stove", "camping", "cooking", "compact"],
    },
    SeedProduct {
        id: WOOL_SOCKS,
        name: "Meridian Wool Socks",
        category: "apparel",
        brand: Some("Cairn"),
        price: 18.00,
        tags: &["socks", "wool", "hiking", "running", "warm"],
    },
    SeedProduct {
        id: DAYPACK,
        name: "Switchback 28L Daypack",
        category: "accessories",
        brand: Some("NorthCrag"),
        price: 119.00,
        tags: &["daypack", "pack", "hiking", "commute"],
    },
    SeedProduct {
        id: COFFEE_PRESS,
        name: "Altitude Coffee Press",
        category: "camping",
        brand: None,
        price: 32.00,
        tags: &["coffee", "press", "camping", "morning"],
    },
];

pub fn find_product(id: ProductId) -> Option<&'static SeedProduct> {
    PRODUCTS.iter().find(|product| product.id == id)
}

fn seed_time(offset_days: i64) -> DateTime<Utc> {
    // Fixed epoch keeps the dataset byte-stable across runs.
    DateTime::from_timestamp(1_741_600_000 + offset_days * 86_400, 0).unwrap_or_default()
}

fn purchase(id: ProductId, offset_days: i64) -> PurchaseRecord {
    let (category, unit_price) = match find_product(id) {
        Some(product) => (product.category.to_owned(), product.price),
        None => ("unknown".to_owned(), 0.0),
    };
    PurchaseRecord { product_id: id, category, unit_price, quantity: 1, purchased_at: seed_time(offset_days) }
}

/// Three seeded customers: a premium hiker, a casual fitness shopper,
/// and a car camper.
pub fn customers() -> Vec<CustomerProfile> {
    vec![
        CustomerProfile {
            id: CustomerId::new("ava"),
            total_spend: 1240.0,
            order_count: 3,
            premium: true,
            preferred_categories: BTreeSet::from(["footwear".to_owned(), "camping".to_owned()]),
            preferred_brands: vec!["Cairn".to_owned()],
            lifestyle_tags: vec!["hiking".to_owned(), "backpacking".to_owned()],
            price_preference: Some(PriceRange::new(None, Some(300.0))),
            purchases: vec![
                purchase(HIKING_BOOTS, 0),
                purchase(WOOL_SOCKS, 12),
                purchase(TREKKING_POLES, 40),
            ],
            recent_activity: vec![
                ActivityEvent {
                    kind: ActivityKind::View,
                    product_id: Some(RAIN_JACKET),
                    search_text: None,
                    occurred_at: seed_time(58),
                },
                ActivityEvent {
                    kind: ActivityKind::Search,
                    product_id: None,
                    search_text: Some("ultralight tent".to_owned()),
                    occurred_at: seed_time(60),
                },
            ],
        },
        CustomerProfile {
            id: CustomerId::new("ben"),
            total_spend: 45.0,
            order_count: 1,
            premium: false,
            preferred_categories: BTreeSet::from(["fitness".to_owned()]),
            preferred_brands: Vec::new(),
            lifestyle_tags: vec!["yoga".to_owned()],
            price_preference: Some(PriceRange::new(None, Some(60.0))),
            purchases: vec![purchase(YOGA_MAT, 5)],
            recent_activity: Vec::new(),
        },
        CustomerProfile {
            id: CustomerId::new("cora"),
            total_spend: 620.0,
            order_count: 3,
            premium: false,
            preferred_categories: BTreeSet::from(["camping".to_owned()]),
            preferred_brands: vec!["Tundra".to_owned()],
            lifestyle_tags: vec!["camping".to_owned(), "car-camping".to_owned()],
            price_preference: None,
            purchases: vec![
                purchase(ALPINE_TENT, 2),
                purchase(CAMP_STOVE, 2),
                purchase(HEADLAMP, 20),
            ],
            recent_activity: vec![ActivityEvent {
                kind: ActivityKind::CartAdd,
                product_id: Some(SLEEPING_BAG),
                search_text: None,
                occurred_at: seed_time(25),
            }],
        },
    ]
}
