//! Product, category, and plan data models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One priced choice of a `select` product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    pub id: String,
    pub label: String,
    pub price: Decimal,
}

/// How a product is priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductKind {
    /// Flat price, included or excluded as a boolean.
    Switch,
    /// One of several mutually exclusive priced options.
    Select { options: Vec<ProductOption> },
}

impl ProductKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Switch => "switch",
            Self::Select { .. } => "select",
        }
    }
}

/// A product in the catalog.
///
/// For `select` products `price` is only a display fallback; the resolved
/// price of a line item always comes from the chosen option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(flatten)]
    pub kind: ProductKind,
}

impl Product {
    pub fn switch(id: &str, name: &str, description: &str, price: Decimal) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            price,
            kind: ProductKind::Switch,
        }
    }

    pub fn select(
        id: &str,
        name: &str,
        description: &str,
        price: Decimal,
        options: Vec<ProductOption>,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            price,
            kind: ProductKind::Select { options },
        }
    }

    /// Options of a `select` product; empty for `switch` products.
    pub fn options(&self) -> &[ProductOption] {
        match &self.kind {
            ProductKind::Switch => &[],
            ProductKind::Select { options } => options,
        }
    }

    pub fn find_option(&self, option_id: &str) -> Option<&ProductOption> {
        self.options().iter().find(|o| o.id == option_id)
    }

    /// The option used when nothing has been chosen yet (the first declared one).
    pub fn default_option(&self) -> Option<&ProductOption> {
        self.options().first()
    }
}

/// A display group of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: String,
    pub name: String,
    pub description: String,
    pub products: Vec<Product>,
}

/// A pre-made bundle sold at a fixed price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Authoritative price, regardless of what the bundled products add up to.
    pub price: Decimal,
    pub features: Vec<String>,
    pub product_ids: Vec<String>,
    #[serde(default)]
    pub is_popular: bool,
}
