//! Marketplace service: product listings

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    validate_category, validate_price, validate_quantity, validate_unit, CategoryStats, Product,
    ProductStatus,
};
use uuid::Uuid;

use super::check;
use crate::error::{AppError, AppResult};
use crate::realtime::{ChangeEvent, ChangeFeed, ChangeKind, Table};
use crate::store::{NewProduct, Store};

#[derive(Clone)]
pub struct MarketplaceService {
    store: Arc<dyn Store>,
    changes: ChangeFeed,
}

/// Input for listing a product
#[derive(Debug, Deserialize)]
pub struct AddProductInput {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: Decimal,
    pub quantity: Decimal,
    pub unit: String,
}

impl MarketplaceService {
    pub fn new(store: Arc<dyn Store>, changes: ChangeFeed) -> Self {
        Self { store, changes }
    }

    /// List a product for sale; the caller is the seller
    pub async fn add_product(&self, seller_id: Uuid, input: AddProductInput) -> AppResult<Product> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("name", "Product name cannot be empty"));
        }
        check("category", validate_category(&input.category))?;
        check("unit", validate_unit(&input.unit))?;
        check("price", validate_price(input.price))?;
        check("quantity", validate_quantity(input.quantity))?;

        let product = self
            .store
            .insert_product(NewProduct {
                seller_id,
                name: name.to_string(),
                description: input
                    .description
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty()),
                category: input.category,
                price: input.price,
                quantity: input.quantity,
                unit: input.unit,
            })
            .await?;

        tracing::info!(product_id = %product.id, seller_id = %seller_id, "product listed");
        self.changes.publish(
            ChangeEvent::new(Table::Products, ChangeKind::Insert, product.id)
                .with_column("seller_id", seller_id),
        );

        Ok(product)
    }

    /// Available products, newest first, optionally searched
    pub async fn list_available(&self, search: Option<&str>) -> AppResult<Vec<Product>> {
        let products = self
            .store
            .list_products_by_status(ProductStatus::Available)
            .await?;

        Ok(match search {
            Some(term) => products
                .into_iter()
                .filter(|p| p.matches_search(term))
                .collect(),
            None => products,
        })
    }

    /// Average price and listing count per category over available products,
    /// ordered by category name
    pub async fn category_stats(&self) -> AppResult<Vec<CategoryStats>> {
        let products = self
            .store
            .list_products_by_status(ProductStatus::Available)
            .await?;

        let mut totals: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();
        for product in products {
            let entry = totals.entry(product.category).or_insert((Decimal::ZERO, 0));
            entry.0 += product.price;
            entry.1 += 1;
        }

        Ok(totals
            .into_iter()
            .map(|(category, (total, count))| CategoryStats {
                category,
                average_price: (total / Decimal::from(count)).round_dp(2),
                product_count: count,
            })
            .collect())
    }

    /// The seller's own listings in any status
    pub async fn list_mine(&self, seller_id: Uuid) -> AppResult<Vec<Product>> {
        self.store.list_products_by_seller(seller_id).await
    }
}
