//! Marketplace product models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product categories offered in the listing form
pub const PRODUCT_CATEGORIES: [&str; 8] = [
    "Vegetables",
    "Fruits",
    "Grains",
    "Pulses",
    "Spices",
    "Dairy",
    "Organic",
    "Seeds",
];

/// Selling units offered in the listing form
pub const PRODUCT_UNITS: [&str; 6] = ["kg", "quintal", "ton", "piece", "dozen", "liter"];

/// A product listed by a seller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: Decimal,
    pub quantity: Decimal,
    pub unit: String,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
}

/// Price summary of the available listings in one category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryStats {
    pub category: String,
    pub average_price: Decimal,
    pub product_count: usize,
}

/// Listing status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Available,
    Reserved,
    Sold,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Available => "available",
            ProductStatus::Reserved => "reserved",
            ProductStatus::Sold => "sold",
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(ProductStatus::Available),
            "reserved" => Ok(ProductStatus::Reserved),
            "sold" => Ok(ProductStatus::Sold),
            other => Err(format!("unknown product status '{}'", other)),
        }
    }
}

impl Product {
    /// Case-insensitive search over name, category and description
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&term)
            || self.category.to_lowercase().contains(&term)
            || self
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&term))
                .unwrap_or(false)
    }
}
