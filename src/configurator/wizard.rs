//! Wizard state machine: tracks which step of the configurator the user is on.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::WizardError;

use super::customer::CustomerInfo;
use super::selection::{Selection, SelectedProduct, default_selection, expand_plan_by_id};

/// The steps of the configurator.
///
/// customer → path-selection → {products | plans} → confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    #[default]
    Customer,
    PathSelection,
    Products,
    Plans,
    Confirmation,
}

impl WizardStep {
    /// Check if a forward transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: WizardStep) -> bool {
        use WizardStep::*;
        matches!(
            (self, target),
            (Customer, PathSelection)
                | (PathSelection, Products)
                | (PathSelection, Plans)
                | (Products, Confirmation)
                | (Plans, Confirmation)
        )
    }

    /// Whether the step needs a validated customer record.
    pub fn requires_customer(&self) -> bool {
        !matches!(self, Self::Customer)
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Customer => "customer",
            Self::PathSelection => "path-selection",
            Self::Products => "products",
            Self::Plans => "plans",
            Self::Confirmation => "confirmation",
        };
        write!(f, "{s}")
    }
}

/// Which branch the user picked on the path-selection step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathChoice {
    Custom,
    PreMade,
}

/// Which step produced the current selection. `back` from confirmation
/// returns there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionOrigin {
    Products,
    Plan { plan_id: String },
}

impl SelectionOrigin {
    fn step(&self) -> WizardStep {
        match self {
            Self::Products => WizardStep::Products,
            Self::Plan { .. } => WizardStep::Plans,
        }
    }
}

/// Full wizard state for one configurator session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wizard {
    pub step: WizardStep,
    pub customer: Option<CustomerInfo>,
    pub selection: Selection,
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<SelectionOrigin>,
    /// Set once an order for the confirmed selection went through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_url: Option<String>,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    fn invalid(&self, action: &str) -> WizardError {
        WizardError::InvalidTransition {
            step: self.step.to_string(),
            action: action.to_string(),
        }
    }

    fn expect_step(&self, step: WizardStep, action: &str) -> Result<(), WizardError> {
        if self.step == step {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    /// Advance to `target`: the move must be in the transition table and
    /// the customer guard must hold.
    fn enter(&mut self, target: WizardStep, action: &str) -> Result<WizardStep, WizardError> {
        if !self.step.can_transition_to(target) {
            return Err(self.invalid(action));
        }
        self.move_to(target)
    }

    fn move_to(&mut self, target: WizardStep) -> Result<WizardStep, WizardError> {
        if target.requires_customer() && self.customer.is_none() {
            return Err(WizardError::MissingCustomer {
                target: target.to_string(),
            });
        }
        tracing::debug!(from = %self.step, to = %target, "Wizard step change");
        self.step = target;
        Ok(target)
    }

    fn recompute_total(&mut self) {
        self.total = self.selection.total();
    }

    /// Confirmed line items, in selection order.
    pub fn line_items(&self) -> &[SelectedProduct] {
        self.selection.items()
    }

    /// Whether an order for the confirmed selection went through.
    pub fn is_complete(&self) -> bool {
        self.invoice_url.is_some()
    }

    /// customer → path-selection, storing the validated record.
    pub fn submit_customer(&mut self, info: CustomerInfo) -> Result<WizardStep, WizardError> {
        self.expect_step(WizardStep::Customer, "submit customer information")?;
        info.validate().map_err(WizardError::InvalidCustomer)?;
        self.customer = Some(info);
        self.enter(WizardStep::PathSelection, "submit customer information")
    }

    /// path-selection → products | plans.
    ///
    /// Entering products starts from the default selection (first option of
    /// every select product); entering plans clears any selection.
    pub fn choose_path(
        &mut self,
        catalog: &Catalog,
        path: PathChoice,
    ) -> Result<WizardStep, WizardError> {
        let target = match path {
            PathChoice::Custom => WizardStep::Products,
            PathChoice::PreMade => WizardStep::Plans,
        };
        let step = self.enter(target, "choose a path")?;
        self.selection = match path {
            PathChoice::Custom => default_selection(catalog),
            PathChoice::PreMade => Selection::new(),
        };
        self.origin = None;
        self.recompute_total();
        Ok(step)
    }

    /// Include or exclude a switch product while on the products step.
    pub fn set_switch_product(
        &mut self,
        catalog: &Catalog,
        product_id: &str,
        enabled: bool,
    ) -> Result<Decimal, WizardError> {
        self.expect_step(WizardStep::Products, "change products")?;
        self.selection
            .set_switch_product(catalog, product_id, enabled)?;
        self.recompute_total();
        Ok(self.total)
    }

    /// Choose an option of a select product while on the products step.
    pub fn set_select_option(
        &mut self,
        catalog: &Catalog,
        product_id: &str,
        option_id: &str,
    ) -> Result<Decimal, WizardError> {
        self.expect_step(WizardStep::Products, "change products")?;
        self.selection
            .set_select_option(catalog, product_id, option_id)?;
        self.recompute_total();
        Ok(self.total)
    }

    /// products → confirmation. Refused while the total is zero.
    pub fn submit_products(&mut self) -> Result<WizardStep, WizardError> {
        self.expect_step(WizardStep::Products, "submit products")?;
        if self.total.is_zero() {
            return Err(WizardError::EmptySelection);
        }
        let step = self.enter(WizardStep::Confirmation, "submit products")?;
        self.origin = Some(SelectionOrigin::Products);
        Ok(step)
    }

    /// plans → confirmation. The plan's fixed price becomes the total.
    pub fn select_plan(
        &mut self,
        catalog: &Catalog,
        plan_id: &str,
    ) -> Result<WizardStep, WizardError> {
        self.expect_step(WizardStep::Plans, "select a plan")?;
        let (plan, items) = expand_plan_by_id(catalog, plan_id)?;
        let step = self.enter(WizardStep::Confirmation, "select a plan")?;
        self.selection = Selection::from_items(items);
        self.total = plan.price;
        self.origin = Some(SelectionOrigin::Plan { plan_id: plan.id });
        Ok(step)
    }

    /// Return to the previous step on the path actually taken. Once the
    /// order went through only `restart` leaves confirmation.
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        if self.is_complete() {
            return Err(self.invalid("go back after the order was placed"));
        }
        let target = match self.step {
            WizardStep::Customer => return Err(self.invalid("go back")),
            WizardStep::PathSelection => WizardStep::Customer,
            WizardStep::Products | WizardStep::Plans => WizardStep::PathSelection,
            WizardStep::Confirmation => self
                .origin
                .as_ref()
                .map(SelectionOrigin::step)
                .unwrap_or(WizardStep::PathSelection),
        };
        let step = self.move_to(target)?;
        if step == WizardStep::Plans {
            // The plan is picked again from scratch.
            self.selection.clear();
            self.recompute_total();
            self.origin = None;
        }
        Ok(step)
    }

    /// Record a successful order for the confirmed selection.
    pub fn complete(&mut self, invoice_url: String) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Confirmation, "complete the order")?;
        if self.is_complete() {
            return Err(self.invalid("complete the order again"));
        }
        self.invoice_url = Some(invoice_url);
        Ok(())
    }

    /// Reset everything and return to the customer step.
    pub fn restart(&mut self) -> WizardStep {
        *self = Self::default();
        self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ana() -> CustomerInfo {
        CustomerInfo {
            name: "Ana Ruiz".to_string(),
            email: "ana@x.com".to_string(),
            phone: "+1234567".to_string(),
            company: "Acme".to_string(),
            country: "CO".to_string(),
            consent: true,
        }
    }

    fn at_path_selection() -> Wizard {
        let mut wizard = Wizard::new();
        wizard.submit_customer(ana()).unwrap();
        wizard
    }

    #[test]
    fn valid_transitions() {
        use WizardStep::*;
        let transitions = [
            (Customer, PathSelection),
            (PathSelection, Products),
            (PathSelection, Plans),
            (Products, Confirmation),
            (Plans, Confirmation),
        ];
        for (from, to) in transitions {
            assert!(from.can_transition_to(to), "{from} should transition to {to}");
        }
    }

    #[test]
    fn invalid_transitions() {
        use WizardStep::*;
        assert!(!Customer.can_transition_to(Products));
        assert!(!Customer.can_transition_to(Confirmation));
        assert!(!PathSelection.can_transition_to(Confirmation));
        assert!(!Products.can_transition_to(Plans));
        assert!(!Confirmation.can_transition_to(Customer));
        assert!(!Products.can_transition_to(Products));
    }

    #[test]
    fn display_matches_serde() {
        use WizardStep::*;
        for step in [Customer, PathSelection, Products, Plans, Confirmation] {
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(format!("\"{step}\""), json, "Display and serde should match for {step:?}");
        }
    }

    #[test]
    fn invalid_customer_keeps_step() {
        let mut wizard = Wizard::new();
        let err = wizard
            .submit_customer(CustomerInfo {
                email: "nope".to_string(),
                ..ana()
            })
            .unwrap_err();
        assert!(matches!(err, WizardError::InvalidCustomer(ref errors) if errors.len() == 1));
        assert_eq!(wizard.step, WizardStep::Customer);
        assert!(wizard.customer.is_none());
    }

    #[test]
    fn guarded_steps_require_customer() {
        let catalog = Catalog::builtin();
        // A state forged onto path-selection without a customer cannot move on.
        let mut wizard = Wizard {
            step: WizardStep::PathSelection,
            ..Wizard::default()
        };
        let err = wizard.choose_path(&catalog, PathChoice::Custom).unwrap_err();
        assert_eq!(
            err,
            WizardError::MissingCustomer {
                target: "products".to_string()
            }
        );
        let err = wizard.choose_path(&catalog, PathChoice::PreMade).unwrap_err();
        assert!(matches!(err, WizardError::MissingCustomer { .. }));
        assert_eq!(wizard.step, WizardStep::PathSelection);

        let mut wizard = Wizard {
            step: WizardStep::Plans,
            ..Wizard::default()
        };
        assert!(matches!(
            wizard.select_plan(&catalog, "plan-basico"),
            Err(WizardError::MissingCustomer { .. })
        ));
        assert!(wizard.selection.is_empty());
    }

    #[test]
    fn cannot_skip_steps() {
        let catalog = Catalog::builtin();
        let mut wizard = Wizard::new();
        assert!(matches!(
            wizard.choose_path(&catalog, PathChoice::Custom),
            Err(WizardError::InvalidTransition { .. })
        ));
        assert!(wizard.submit_products().is_err());
        assert!(wizard.select_plan(&catalog, "plan-basico").is_err());
        assert_eq!(wizard.step, WizardStep::Customer);
    }

    #[test]
    fn custom_path_computes_running_total() {
        let catalog = Catalog::builtin();
        let mut wizard = at_path_selection();
        wizard.choose_path(&catalog, PathChoice::Custom).unwrap();
        assert_eq!(wizard.step, WizardStep::Products);
        // Hosting starts on its first option.
        assert_eq!(wizard.total, dec!(100));

        wizard
            .set_switch_product(&catalog, "bot-atencion-cliente", true)
            .unwrap();
        let total = wizard
            .set_select_option(&catalog, "hosting", "hosting-profesional")
            .unwrap();
        assert_eq!(total, dec!(750));

        wizard.submit_products().unwrap();
        assert_eq!(wizard.step, WizardStep::Confirmation);
        assert_eq!(wizard.total, dec!(750));
        assert_eq!(wizard.origin, Some(SelectionOrigin::Products));
    }

    #[test]
    fn zero_total_blocks_confirmation() {
        let catalog = Catalog::builtin();
        let empty = Catalog::new(
            vec![catalog.categories()[0].clone()],
            vec![],
        )
        .unwrap();
        let mut wizard = at_path_selection();
        wizard.choose_path(&empty, PathChoice::Custom).unwrap();
        assert_eq!(wizard.submit_products().unwrap_err(), WizardError::EmptySelection);
        assert_eq!(wizard.step, WizardStep::Products);
    }

    #[test]
    fn selecting_plan_uses_plan_price() {
        let catalog = Catalog::builtin();
        let mut wizard = at_path_selection();
        wizard.choose_path(&catalog, PathChoice::PreMade).unwrap();
        wizard.select_plan(&catalog, "plan-profesional").unwrap();

        assert_eq!(wizard.step, WizardStep::Confirmation);
        assert_eq!(wizard.total, dec!(1600));
        assert_ne!(wizard.selection.total(), dec!(1600));
        assert_eq!(wizard.line_items().len(), 3);
    }

    #[test]
    fn unknown_plan_keeps_plans_step() {
        let catalog = Catalog::builtin();
        let mut wizard = at_path_selection();
        wizard.choose_path(&catalog, PathChoice::PreMade).unwrap();
        assert!(wizard.select_plan(&catalog, "plan-x").is_err());
        assert_eq!(wizard.step, WizardStep::Plans);
    }

    #[test]
    fn back_from_confirmation_returns_to_origin() {
        let catalog = Catalog::builtin();

        let mut wizard = at_path_selection();
        wizard.choose_path(&catalog, PathChoice::PreMade).unwrap();
        wizard.select_plan(&catalog, "plan-basico").unwrap();
        assert_eq!(wizard.back().unwrap(), WizardStep::Plans);
        assert!(wizard.selection.is_empty());
        assert_eq!(wizard.back().unwrap(), WizardStep::PathSelection);
        assert_eq!(wizard.back().unwrap(), WizardStep::Customer);
        assert!(wizard.back().is_err());

        let mut wizard = at_path_selection();
        wizard.choose_path(&catalog, PathChoice::Custom).unwrap();
        wizard.set_switch_product(&catalog, "bot-ventas", true).unwrap();
        wizard.submit_products().unwrap();
        assert_eq!(wizard.back().unwrap(), WizardStep::Products);
        // The free selection survives going back.
        assert!(wizard.selection.get("bot-ventas").is_some());
        assert_eq!(wizard.total, dec!(850));
    }

    #[test]
    fn restart_resets_everything() {
        let catalog = Catalog::builtin();
        let mut wizard = at_path_selection();
        wizard.choose_path(&catalog, PathChoice::Custom).unwrap();
        wizard.set_switch_product(&catalog, "gemini-pro", true).unwrap();
        wizard.submit_products().unwrap();
        wizard.complete("https://example.com/invoices/INV-1.pdf".to_string()).unwrap();

        assert_eq!(wizard.restart(), WizardStep::Customer);
        assert_eq!(wizard, Wizard::default());
        assert!(wizard.customer.is_none());
        assert!(wizard.selection.is_empty());
        assert_eq!(wizard.total, Decimal::ZERO);
    }

    #[test]
    fn completed_order_only_allows_restart() {
        let catalog = Catalog::builtin();
        let mut wizard = at_path_selection();
        wizard.choose_path(&catalog, PathChoice::PreMade).unwrap();
        wizard.select_plan(&catalog, "plan-basico").unwrap();
        wizard.complete("https://example.com/invoices/INV-1.pdf".to_string()).unwrap();
        assert!(wizard.is_complete());

        assert!(matches!(wizard.back(), Err(WizardError::InvalidTransition { .. })));
        assert!(matches!(
            wizard.complete("https://example.com/invoices/INV-2.pdf".to_string()),
            Err(WizardError::InvalidTransition { .. })
        ));
        assert_eq!(wizard.step, WizardStep::Confirmation);
        assert_eq!(
            wizard.invoice_url.as_deref(),
            Some("https://example.com/invoices/INV-1.pdf")
        );

        wizard.restart();
        assert!(!wizard.is_complete());
    }

    #[test]
    fn forged_step_cannot_jump_the_table() {
        // Confirmation is only reachable from products or plans.
        let mut wizard = Wizard {
            step: WizardStep::Customer,
            customer: Some(ana()),
            ..Wizard::default()
        };
        assert!(matches!(
            wizard.enter(WizardStep::Confirmation, "confirm"),
            Err(WizardError::InvalidTransition { .. })
        ));
        assert_eq!(wizard.step, WizardStep::Customer);
        assert_eq!(
            wizard.enter(WizardStep::PathSelection, "continue").unwrap(),
            WizardStep::PathSelection
        );
    }

    #[test]
    fn unknown_option_surfaces_but_keeps_total() {
        let catalog = Catalog::builtin();
        let mut wizard = at_path_selection();
        wizard.choose_path(&catalog, PathChoice::Custom).unwrap();
        let err = wizard
            .set_select_option(&catalog, "hosting", "hosting-lunar")
            .unwrap_err();
        assert!(matches!(err, WizardError::Selection(_)));
        assert_eq!(wizard.total, dec!(100));
    }

    #[test]
    fn wizard_serializes_camel_case() {
        let wizard = at_path_selection();
        let json = serde_json::to_value(&wizard).unwrap();
        assert_eq!(json["step"], "path-selection");
        assert_eq!(json["customer"]["name"], "Ana Ruiz");
        assert!(json["selection"].as_array().unwrap().is_empty());
        assert!(json.get("invoiceUrl").is_none());
    }
}
