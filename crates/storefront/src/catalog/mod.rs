//! Read-only product directory.
//!
//! The catalog is a JSON array of products loaded once at startup. Handlers
//! and services depend on the [`ProductDirectory`] trait, so tests can supply
//! a fixed set of products without touching the filesystem.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use bazaar_core::{Amount, ProductId};

use crate::models::wire;

/// Path prefix for static assets served by the storefront.
pub const STATIC_PREFIX: &str = "/static/";

/// A catalog product.
///
/// Fields beyond id, name, price and image (description, category, ...) are
/// passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(deserialize_with = "wire::product_id")]
    pub id: ProductId,
    pub name: String,
    /// Unit price in whole currency units.
    pub price: Amount,
    #[serde(default)]
    pub image: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Product {
    /// Copy with the image path rooted under [`STATIC_PREFIX`].
    #[must_use]
    pub fn with_static_image(mut self) -> Self {
        if !self.image.starts_with(STATIC_PREFIX) {
            self.image = format!("{STATIC_PREFIX}{}", self.image.trim_start_matches('/'));
        }
        self
    }
}

/// Lookup interface over the product catalog.
pub trait ProductDirectory: Send + Sync {
    /// Find a product by id.
    fn get(&self, id: &ProductId) -> Option<&Product>;

    /// All products in catalog order.
    fn list(&self) -> &[Product];
}

/// Errors loading a catalog file.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate product id: {0}")]
    DuplicateId(ProductId),
}

/// A problem found by [`check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    DuplicateId(ProductId),
    NonPositivePrice(ProductId),
    BlankName(ProductId),
}

impl std::fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "{id}: duplicate product id"),
            Self::NonPositivePrice(id) => write!(f, "{id}: price must be positive"),
            Self::BlankName(id) => write!(f, "{id}: name is blank"),
        }
    }
}

/// Validate a product list without building a directory.
#[must_use]
pub fn check(products: &[Product]) -> Vec<CatalogIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for product in products {
        if !seen.insert(&product.id) {
            issues.push(CatalogIssue::DuplicateId(product.id.clone()));
        }
        if !product.price.is_positive() {
            issues.push(CatalogIssue::NonPositivePrice(product.id.clone()));
        }
        if product.name.trim().is_empty() {
            issues.push(CatalogIssue::BlankName(product.id.clone()));
        }
    }

    issues
}

/// Parse a catalog file into products.
///
/// # Errors
///
/// Returns `CatalogError::Io` or `CatalogError::Parse`.
pub fn read_products(path: &Path) -> Result<Vec<Product>, CatalogError> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// In-memory catalog keyed by product id.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl StaticCatalog {
    /// Build a catalog, rejecting duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` for the first repeated id.
    pub fn from_products(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            if index.insert(product.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId(product.id.clone()));
            }
        }
        Ok(Self { products, index })
    }

    /// Load a catalog from a JSON array file.
    ///
    /// # Errors
    ///
    /// Returns any [`CatalogError`].
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let catalog = Self::from_products(read_products(path)?)?;
        tracing::info!(
            path = %path.display(),
            products = catalog.products.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }
}

impl ProductDirectory for StaticCatalog {
    fn get(&self, id: &ProductId) -> Option<&Product> {
        self.index.get(id).and_then(|&i| self.products.get(i))
    }

    fn list(&self) -> &[Product] {
        &self.products
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"[
        {"id": "P1", "name": "Brass Diya", "price": 100, "image": "img/diya.jpg", "category": "decor"},
        {"id": 2, "name": "Cotton Dhurrie", "price": 1499, "image": "/static/img/dhurrie.jpg"}
    ]"#;

    fn catalog() -> StaticCatalog {
        StaticCatalog::from_products(serde_json::from_str(CATALOG).unwrap()).unwrap()
    }

    #[test]
    fn test_lookup_by_string_and_numeric_ids() {
        let catalog = catalog();

        assert_eq!(
            catalog.get(&ProductId::new("P1")).map(|p| p.price),
            Some(Amount::new(100))
        );
        assert_eq!(
            catalog.get(&ProductId::new("2")).map(|p| p.name.as_str()),
            Some("Cotton Dhurrie")
        );
        assert!(catalog.get(&ProductId::new("P9")).is_none());
        assert_eq!(catalog.list().len(), 2);
    }

    #[test]
    fn test_extra_fields_pass_through() {
        let catalog = catalog();
        let product = catalog.get(&ProductId::new("P1")).unwrap();
        let value = serde_json::to_value(product).unwrap();

        assert_eq!(value["category"], "decor");
    }

    #[test]
    fn test_static_image_normalization() {
        let catalog = catalog();
        let diya = catalog.get(&ProductId::new("P1")).cloned().unwrap();
        let dhurrie = catalog.get(&ProductId::new("2")).cloned().unwrap();

        assert_eq!(diya.with_static_image().image, "/static/img/diya.jpg");
        assert_eq!(dhurrie.with_static_image().image, "/static/img/dhurrie.jpg");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let products: Vec<Product> = serde_json::from_str(
            r#"[{"id": "P1", "name": "A", "price": 1}, {"id": "P1", "name": "B", "price": 2}]"#,
        )
        .unwrap();

        assert!(matches!(
            StaticCatalog::from_products(products.clone()),
            Err(CatalogError::DuplicateId(_))
        ));
        assert_eq!(
            check(&products),
            vec![CatalogIssue::DuplicateId(ProductId::new("P1"))]
        );
    }

    #[test]
    fn test_check_reports_bad_prices_and_names() {
        let products: Vec<Product> = serde_json::from_str(
            r#"[{"id": "P1", "name": " ", "price": 0}]"#,
        )
        .unwrap();

        assert_eq!(
            check(&products),
            vec![
                CatalogIssue::NonPositivePrice(ProductId::new("P1")),
                CatalogIssue::BlankName(ProductId::new("P1")),
            ]
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.json");
        std::fs::write(&path, CATALOG).unwrap();

        let catalog = StaticCatalog::load(&path).unwrap();
        assert_eq!(catalog.list().len(), 2);
    }
}
