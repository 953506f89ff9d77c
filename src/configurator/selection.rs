//! Line-item selection and pricing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Plan, Product, ProductCategory, ProductKind, ProductOption};
use crate::error::SelectionError;

/// One selected product contributing to the order total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedProduct {
    pub id: String,
    pub name: String,
    /// Resolved price: the flat price for switch products, the option's
    /// price for select products.
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<ProductOption>,
    /// Owning category id.
    pub category: String,
}

impl SelectedProduct {
    fn flat(category: &ProductCategory, product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            option: None,
            category: category.id.clone(),
        }
    }

    fn with_option(category: &ProductCategory, product: &Product, option: &ProductOption) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: option.price,
            option: Some(option.clone()),
            category: category.id.clone(),
        }
    }

    /// Line item for a product in its default state: the flat price for a
    /// switch product, the first declared option for a select product.
    pub fn default_for(category: &ProductCategory, product: &Product) -> Self {
        match product.default_option() {
            Some(option) => Self::with_option(category, product, option),
            None => Self::flat(category, product),
        }
    }
}

/// Sum of each line item's resolved price.
pub fn compute_total(items: &[SelectedProduct]) -> Decimal {
    items.iter().map(|item| item.price).sum()
}

/// Product selection keyed by product id.
///
/// Keeps first-insertion order; selecting a product again replaces its line
/// item in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    items: Vec<SelectedProduct>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<SelectedProduct>) -> Self {
        let mut selection = Self::new();
        for item in items {
            selection.upsert(item);
        }
        selection
    }

    pub fn items(&self) -> &[SelectedProduct] {
        &self.items
    }

    pub fn get(&self, product_id: &str) -> Option<&SelectedProduct> {
        self.items.iter().find(|i| i.id == product_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> Decimal {
        compute_total(&self.items)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn upsert(&mut self, item: SelectedProduct) {
        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    fn remove(&mut self, product_id: &str) {
        self.items.retain(|i| i.id != product_id);
    }

    /// Include or exclude a switch product. Idempotent.
    pub fn set_switch_product(
        &mut self,
        catalog: &Catalog,
        product_id: &str,
        enabled: bool,
    ) -> Result<(), SelectionError> {
        let (category, product) = lookup(catalog, product_id)?;
        if !matches!(product.kind, ProductKind::Switch) {
            return Err(SelectionError::WrongKind {
                product_id: product_id.to_string(),
                expected: "switch",
                actual: product.kind.as_str(),
            });
        }

        if enabled {
            self.upsert(SelectedProduct::flat(category, product));
        } else {
            self.remove(product_id);
        }
        Ok(())
    }

    /// Choose an option of a select product, replacing any earlier choice.
    ///
    /// An option id the product does not declare leaves the selection
    /// untouched and reports `UnknownOption`.
    pub fn set_select_option(
        &mut self,
        catalog: &Catalog,
        product_id: &str,
        option_id: &str,
    ) -> Result<(), SelectionError> {
        let (category, product) = lookup(catalog, product_id)?;
        if !matches!(product.kind, ProductKind::Select { .. }) {
            return Err(SelectionError::WrongKind {
                product_id: product_id.to_string(),
                expected: "select",
                actual: product.kind.as_str(),
            });
        }

        let option = product
            .find_option(option_id)
            .ok_or_else(|| SelectionError::UnknownOption {
                product_id: product_id.to_string(),
                option_id: option_id.to_string(),
            })?;
        self.upsert(SelectedProduct::with_option(category, product, option));
        Ok(())
    }
}

fn lookup<'a>(
    catalog: &'a Catalog,
    product_id: &str,
) -> Result<(&'a ProductCategory, &'a Product), SelectionError> {
    catalog
        .find_product(product_id)
        .ok_or_else(|| SelectionError::UnknownProduct {
            product_id: product_id.to_string(),
        })
}

/// Selection every select product starts with on the custom path: its first
/// option. Switch products start excluded.
pub fn default_selection(catalog: &Catalog) -> Selection {
    Selection::from_items(
        catalog
            .products()
            .filter(|(_, p)| matches!(p.kind, ProductKind::Select { .. }))
            .map(|(c, p)| SelectedProduct::default_for(c, p))
            .collect(),
    )
}

/// Line items a plan bundles, for display.
///
/// Product ids the catalog does not know are skipped. The plan's own price
/// remains the charged total; the sum of these items may differ.
pub fn expand_plan(catalog: &Catalog, plan: &Plan) -> Vec<SelectedProduct> {
    let items: Vec<SelectedProduct> = plan
        .product_ids
        .iter()
        .filter_map(|id| match catalog.find_product(id) {
            Some((category, product)) => Some(SelectedProduct::default_for(category, product)),
            None => {
                tracing::debug!(plan_id = %plan.id, product_id = %id, "Plan references product outside catalog");
                None
            }
        })
        .collect();

    let expanded_total = compute_total(&items);
    if expanded_total != plan.price {
        tracing::debug!(
            plan_id = %plan.id,
            plan_price = %plan.price,
            expanded_total = %expanded_total,
            "Plan price differs from sum of bundled products"
        );
    }
    items
}

/// Look up a plan and expand it.
pub fn expand_plan_by_id(
    catalog: &Catalog,
    plan_id: &str,
) -> Result<(Plan, Vec<SelectedProduct>), SelectionError> {
    let plan = catalog
        .find_plan(plan_id)
        .ok_or_else(|| SelectionError::UnknownPlan {
            plan_id: plan_id.to_string(),
        })?;
    Ok((plan.clone(), expand_plan(catalog, plan)))
}
