//! Configurator: the customer → path → products/plans → confirmation wizard.
//!
//! The wizard is an explicit state machine over a customer record and a
//! product selection. Every mutation goes through a transition method that
//! checks the current step and the customer guard, and recomputes the total.

pub mod customer;
pub mod selection;
pub mod session;
pub mod wizard;

pub use customer::CustomerInfo;
pub use selection::{Selection, SelectedProduct, compute_total, expand_plan};
pub use session::{DEFAULT_SESSION_TTL, SessionStore};
pub use wizard::{PathChoice, SelectionOrigin, Wizard, WizardStep};
