//! Product catalog: categories, products, and pre-made plans.
//!
//! The catalog is immutable once built. It is either the built-in data or a
//! JSON document with the same shape as `GET /api/catalog`.

mod builtin;
pub mod model;

pub use model::{Plan, Product, ProductCategory, ProductKind, ProductOption};

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Validated catalog of categories and plans.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawCatalog")]
pub struct Catalog {
    categories: Vec<ProductCategory>,
    plans: Vec<Plan>,
}

#[derive(Deserialize)]
struct RawCatalog {
    categories: Vec<ProductCategory>,
    #[serde(default)]
    plans: Vec<Plan>,
}

impl TryFrom<RawCatalog> for Catalog {
    type Error = CatalogError;

    fn try_from(raw: RawCatalog) -> Result<Self, Self::Error> {
        Catalog::new(raw.categories, raw.plans)
    }
}

impl Catalog {
    /// Build a catalog, rejecting select products without options and
    /// duplicate product or plan ids.
    pub fn new(categories: Vec<ProductCategory>, plans: Vec<Plan>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for product in categories.iter().flat_map(|c| c.products.iter()) {
            if !seen.insert(product.id.as_str()) {
                return Err(CatalogError::DuplicateProduct {
                    product_id: product.id.clone(),
                });
            }
            if let ProductKind::Select { options } = &product.kind
                && options.is_empty()
            {
                return Err(CatalogError::EmptyOptions {
                    product_id: product.id.clone(),
                });
            }
        }

        let mut seen_plans = HashSet::new();
        for plan in &plans {
            if !seen_plans.insert(plan.id.as_str()) {
                return Err(CatalogError::DuplicatePlan {
                    plan_id: plan.id.clone(),
                });
            }
        }

        Ok(Self { categories, plans })
    }

    /// The catalog shipped with the service.
    pub fn builtin() -> Self {
        Self {
            categories: builtin::categories(),
            plans: builtin::plans(),
        }
    }

    /// Load a catalog from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&text)?;
        tracing::info!(
            path = %path.display(),
            categories = catalog.categories.len(),
            plans = catalog.plans.len(),
            "Loaded catalog from file"
        );
        Ok(catalog)
    }

    pub fn categories(&self) -> &[ProductCategory] {
        &self.categories
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    /// Find a product and the category that owns it.
    pub fn find_product(&self, product_id: &str) -> Option<(&ProductCategory, &Product)> {
        self.categories.iter().find_map(|category| {
            category
                .products
                .iter()
                .find(|p| p.id == product_id)
                .map(|p| (category, p))
        })
    }

    pub fn find_plan(&self, plan_id: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.id == plan_id)
    }

    /// All products across categories, in display order.
    pub fn products(&self) -> impl Iterator<Item = (&ProductCategory, &Product)> {
        self.categories
            .iter()
            .flat_map(|c| c.products.iter().map(move |p| (c, p)))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
