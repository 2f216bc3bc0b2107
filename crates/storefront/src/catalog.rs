//! Product catalog loaded from a JSON file at startup.
//!
//! The catalog is the "shop" side of the storefront: it lists plants by
//! category and turns a product into a [`CartLineItem`] when a visitor adds
//! it to their cart.
//!
//! # File format
//!
//! ```json
//! {
//!   "categories": [
//!     {
//!       "name": "Flowering Plants",
//!       "products": [
//!         {
//!           "handle": "rose",
//!           "name": "Rose",
//!           "image": "/static/images/plant.svg",
//!           "description": "Classic garden rose.",
//!           "cost": "$15"
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Costs use the `$`-prefixed display format and are parsed into [`Price`]s
//! once, here.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use verdant_core::{CartLineItem, Price, PriceError};

/// Errors raised while loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid cost for {handle}: {source}")]
    InvalidCost {
        handle: String,
        #[source]
        source: PriceError,
    },
    #[error("duplicate product handle: {0}")]
    DuplicateHandle(String),
    #[error("duplicate product name: {0}")]
    DuplicateName(String),
}

/// A product that can be added to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub handle: String,
    pub name: String,
    pub image: String,
    pub description: String,
    pub cost: Price,
}

impl Product {
    /// A single unit of this product as a cart line.
    #[must_use]
    pub fn line_item(&self) -> CartLineItem {
        CartLineItem::new(self.name.clone(), self.image.clone(), self.cost)
    }
}

/// A named group of products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub products: Vec<Product>,
}

/// Read-only product catalog, cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: Arc<Vec<Category>>,
}

#[derive(Deserialize)]
struct RawCatalog {
    categories: Vec<RawCategory>,
}

#[derive(Deserialize)]
struct RawCategory {
    name: String,
    #[serde(default)]
    products: Vec<RawProduct>,
}

#[derive(Deserialize)]
struct RawProduct {
    handle: String,
    name: String,
    image: String,
    #[serde(default)]
    description: String,
    cost: String,
}

impl Catalog {
    /// Load the catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file is unreadable, malformed, has an
    /// unparseable cost, or repeats a handle or name.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            products = catalog.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse the catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// See [`Catalog::load`].
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(json)?;

        let categories = raw
            .categories
            .into_iter()
            .map(|category| -> Result<Category, CatalogError> {
                let products = category
                    .products
                    .into_iter()
                    .map(|p| -> Result<Product, CatalogError> {
                        let cost = Price::parse(&p.cost).map_err(|source| {
                            CatalogError::InvalidCost {
                                handle: p.handle.clone(),
                                source,
                            }
                        })?;
                        Ok(Product {
                            handle: p.handle,
                            name: p.name,
                            image: p.image,
                            description: p.description,
                            cost,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Category {
                    name: category.name,
                    products,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_categories(categories)
    }

    /// Build a catalog from already-parsed categories.
    ///
    /// Product names key cart lines, so they must be unique just like handles.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateHandle` or `DuplicateName`.
    pub fn from_categories(categories: Vec<Category>) -> Result<Self, CatalogError> {
        let mut handles = HashSet::new();
        let mut names = HashSet::new();

        for product in categories.iter().flat_map(|c| &c.products) {
            if !handles.insert(product.handle.as_str()) {
                return Err(CatalogError::DuplicateHandle(product.handle.clone()));
            }
            if !names.insert(product.name.as_str()) {
                return Err(CatalogError::DuplicateName(product.name.clone()));
            }
        }

        Ok(Self {
            categories: Arc::new(categories),
        })
    }

    /// Categories in file order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Find a product by handle.
    #[must_use]
    pub fn find(&self, handle: &str) -> Option<&Product> {
        self.products().find(|p| p.handle == handle)
    }

    /// All products across categories.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.categories.iter().flat_map(|c| c.products.iter())
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products().count()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products().next().is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "categories": [
            {
                "name": "Flowering Plants",
                "products": [
                    { "handle": "rose", "name": "Rose", "image": "/r.svg", "cost": "$15" },
                    { "handle": "tulip", "name": "Tulip", "image": "/t.svg", "cost": "$10" }
                ]
            },
            { "name": "Empty" }
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.categories().len(), 2);
        assert_eq!(catalog.len(), 2);

        let rose = catalog.find("rose").unwrap();
        assert_eq!(rose.cost.to_string(), "$15.00");
        assert!(rose.description.is_empty());
    }

    #[test]
    fn test_find_missing() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert!(catalog.find("orchid").is_none());
    }

    #[test]
    fn test_line_item_has_quantity_one() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let line = catalog.find("tulip").unwrap().line_item();
        assert_eq!(line.name, "Tulip");
        assert_eq!(line.quantity(), 1);
    }

    #[test]
    fn test_invalid_cost() {
        let json = r#"{ "categories": [ { "name": "X", "products": [
            { "handle": "bad", "name": "Bad", "image": "", "cost": "$free" }
        ] } ] }"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::InvalidCost { handle, .. }) if handle == "bad"
        ));
    }

    #[test]
    fn test_duplicate_handle() {
        let json = r#"{ "categories": [
            { "name": "A", "products": [ { "handle": "x", "name": "One", "image": "", "cost": "$1" } ] },
            { "name": "B", "products": [ { "handle": "x", "name": "Two", "image": "", "cost": "$1" } ] }
        ] }"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::DuplicateHandle(_))
        ));
    }

    #[test]
    fn test_duplicate_name() {
        let json = r#"{ "categories": [ { "name": "A", "products": [
            { "handle": "a", "name": "Same", "image": "", "cost": "$1" },
            { "handle": "b", "name": "Same", "image": "", "cost": "$2" }
        ] } ] }"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::DuplicateName(_))
        ));
    }

    #[test]
    fn test_bundled_catalog_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("content/catalog.json");
        let catalog = Catalog::load(&path).unwrap();
        assert!(!catalog.is_empty());
        assert!(catalog.find("rose").is_some());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Catalog::load(Path::new("/nonexistent/catalog.json")),
            Err(CatalogError::Io { .. })
        ));
    }
}
