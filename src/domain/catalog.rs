use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::order::OrderError;

// ============================================================================
// Catalog Lookup - External Collaborator
// ============================================================================
//
// Product records live in the catalog subsystem; the order engine only reads
// them. Two reads matter here: the current price and availability flag at
// order-creation time (frozen into the order lines), and display fields
// (name, image, category) read live when an order is viewed.
//
// ============================================================================

/// Product view as exposed by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub available: bool,
    pub image: Option<String>,
    pub category: Option<String>,
}

#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Resolve a product id to its current catalog record, `None` if absent.
    async fn find_product(&self, product_id: Uuid) -> Result<Option<Product>, OrderError>;
}

// ============================================================================
// In-Memory Catalog
// ============================================================================

/// Map-backed catalog used by unit tests and the demo binary.
#[derive(Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, product: Product) {
        self.products
            .write()
            .expect("catalog lock poisoned")
            .insert(product.id, product);
    }

    pub fn set_price(&self, product_id: Uuid, price: Decimal) {
        if let Some(product) = self
            .products
            .write()
            .expect("catalog lock poisoned")
            .get_mut(&product_id)
        {
            product.price = price;
        }
    }

    pub fn set_available(&self, product_id: Uuid, available: bool) {
        if let Some(product) = self
            .products
            .write()
            .expect("catalog lock poisoned")
            .get_mut(&product_id)
        {
            product.available = available;
        }
    }
}

#[async_trait]
impl CatalogLookup for InMemoryCatalog {
    async fn find_product(&self, product_id: Uuid) -> Result<Option<Product>, OrderError> {
        Ok(self
            .products
            .read()
            .expect("catalog lock poisoned")
            .get(&product_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_product_reflects_latest_price() {
        let catalog = InMemoryCatalog::new();
        let id = Uuid::new_v4();
        catalog.insert(Product {
            id,
            name: "Burger".to_string(),
            price: Decimal::new(950, 2),
            available: true,
            image: None,
            category: Some("sandwiches".to_string()),
        });

        let before = catalog.find_product(id).await.unwrap().unwrap();
        assert_eq!(before.price, Decimal::new(950, 2));

        catalog.set_price(id, Decimal::new(1200, 2));
        let after = catalog.find_product(id).await.unwrap().unwrap();
        assert_eq!(after.price, Decimal::new(1200, 2));
    }

    #[tokio::test]
    async fn test_unknown_product_resolves_to_none() {
        let catalog = InMemoryCatalog::new();
        assert!(catalog
            .find_product(Uuid::new_v4())
            .await
            .unwrap()
            .is_none());
    }
}
