//! Product lookup collaborator.
//!
//! Catalog management lives outside the engine; carts only need to know whether
//! a product exists and what it costs right now.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use storefront_core::ProductId;

/// What the engine needs to know about a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub id: ProductId,
    pub title: String,
    /// Current price in smallest currency unit; `None` when unpriced.
    pub price: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Product lookup abstraction.
pub trait ProductCatalog: Send + Sync {
    /// Resolve a product; `Ok(None)` means it does not exist.
    fn resolve_product(&self, product_id: ProductId) -> Result<Option<ProductInfo>, CatalogError>;
}

impl<C> ProductCatalog for Arc<C>
where
    C: ProductCatalog + ?Sized,
{
    fn resolve_product(&self, product_id: ProductId) -> Result<Option<ProductInfo>, CatalogError> {
        (**self).resolve_product(product_id)
    }
}

/// In-memory catalog for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryProductCatalog {
    products: RwLock<HashMap<ProductId, ProductInfo>>,
}

impl InMemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    // Writes replace whole entries, so a poisoned map is still consistent.
    pub fn upsert(&self, product: ProductInfo) {
        self.products
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(product.id, product);
    }

    pub fn remove(&self, product_id: ProductId) {
        self.products
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&product_id);
    }

    pub fn list(&self) -> Vec<ProductInfo> {
        let map = self.products.read().unwrap_or_else(PoisonError::into_inner);
        let mut products: Vec<_> = map.values().cloned().collect();
        products.sort_by(|a, b| a.title.cmp(&b.title));
        products
    }
}

impl ProductCatalog for InMemoryProductCatalog {
    fn resolve_product(&self, product_id: ProductId) -> Result<Option<ProductInfo>, CatalogError> {
        let map = self.products.read().unwrap_or_else(PoisonError::into_inner);
        Ok(map.get(&product_id).cloned())
    }
}

/// A small starter catalog for local runs (prices in paise).
pub fn demo_products() -> Vec<ProductInfo> {
    [
        ("Wireless Headphones", Some(249_900)),
        ("Smart Watch", Some(499_900)),
        ("Running Shoes", Some(329_900)),
        ("Coffee Maker", Some(189_900)),
        ("Gift Card", None),
    ]
    .into_iter()
    .map(|(title, price)| ProductInfo {
        id: ProductId::new(),
        title: title.to_string(),
        price,
    })
    .collect()
}
